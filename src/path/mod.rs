mod intersection;
mod segment;

pub use intersection::Intersection;
pub use segment::{PathSegment, SegmentVertexEntry};

use tracing::debug;

use crate::error::{PathError, Result};
use crate::math::Point3;
use crate::operations::{Degeneracy, FrameOptions};

use intersection::find_intersections;

/// A set of segments over a shared vertex array.
///
/// Segments refer to vertices by index, so several segments may pass
/// through the same vertex; such vertices are tracked as
/// [`Intersection`]s. Every mutation keeps all indices valid and
/// recomputes the derived state (lengths, bounds, normals) of the segments
/// it affects. A failed mutation leaves the path unchanged.
#[derive(Debug, Default)]
pub struct Path {
    vertices: Vec<Point3>,
    segments: Vec<PathSegment>,
    intersections: Vec<Intersection>,
    options: FrameOptions,
}

impl Path {
    /// Creates a new, empty path with default frame options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new, empty path whose segments are solved with `options`.
    ///
    /// Each segment's own `flip_normals` and `flat` flags override the
    /// corresponding fields of `options`.
    #[must_use]
    pub fn with_options(options: FrameOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Returns the frame options applied to every segment.
    #[must_use]
    pub fn options(&self) -> &FrameOptions {
        &self.options
    }

    // --- Vertex operations ---

    /// Returns all vertex positions, indexed by vertex index.
    #[must_use]
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// Appends a vertex and returns its index.
    pub fn add_vertex(&mut self, point: Point3) -> usize {
        self.vertices.push(point);
        debug!(index = self.vertices.len() - 1, "added path vertex");
        self.vertices.len() - 1
    }

    /// Returns the vertex at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    pub fn vertex(&self, index: usize) -> Result<&Point3> {
        self.vertices.get(index).ok_or_else(|| {
            PathError::VertexOutOfRange {
                index,
                len: self.vertices.len(),
            }
            .into()
        })
    }

    /// Moves a vertex and recomputes every segment passing through it.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range or a recompute fails.
    pub fn set_vertex(&mut self, index: usize, point: Point3) -> Result<()> {
        self.vertex(index)?;
        let mut vertices = self.vertices.clone();
        vertices[index] = point;

        let mut segments = self.segments.clone();
        for segment in segments.iter_mut().filter(|s| s.references(index)) {
            rebuild(segment, &vertices, &self.options)?;
        }

        self.vertices = vertices;
        self.segments = segments;
        debug!(index, "moved path vertex");
        Ok(())
    }

    /// Removes a vertex, returning its position.
    ///
    /// Entries referencing the vertex are dropped from their segments and
    /// every higher index shifts down by one. Segments that lose an entry
    /// are recomputed; segments left without entries are removed.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range or a recompute fails.
    pub fn remove_vertex(&mut self, index: usize) -> Result<Point3> {
        self.vertex(index)?;
        let mut vertices = self.vertices.clone();
        let removed = vertices.remove(index);

        let mut segments = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            let mut segment = segment.clone();
            let touched = segment.forget_vertex(index);
            if segment.is_empty() {
                continue;
            }
            if touched {
                rebuild(&mut segment, &vertices, &self.options)?;
            }
            segments.push(segment);
        }

        let dropped = self.segments.len() - segments.len();
        self.vertices = vertices;
        self.segments = segments;
        self.rebuild_intersections();
        debug!(index, dropped_segments = dropped, "removed path vertex");
        Ok(removed)
    }

    // --- Segment operations ---

    /// Returns all segments in insertion order.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns the segment at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    pub fn segment(&self, index: usize) -> Result<&PathSegment> {
        self.segments.get(index).ok_or_else(|| {
            PathError::SegmentOutOfRange {
                index,
                len: self.segments.len(),
            }
            .into()
        })
    }

    /// Validates, solves and stores a segment, returning its index.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is empty, references a vertex that
    /// does not exist, or cannot be solved.
    pub fn add_segment(&mut self, mut segment: PathSegment) -> Result<usize> {
        if segment.is_empty() {
            return Err(PathError::EmptySegment.into());
        }
        rebuild(&mut segment, &self.vertices, &self.options)?;
        self.segments.push(segment);
        self.rebuild_intersections();
        let index = self.segments.len() - 1;
        debug!(index, "added path segment");
        Ok(index)
    }

    /// Adds a segment through existing vertices, estimating tangents from
    /// their positions.
    ///
    /// # Errors
    ///
    /// Returns an error if an index is out of range, tangents cannot be
    /// estimated, or the segment cannot be solved.
    pub fn add_segment_through(
        &mut self,
        vertices: &[usize],
        flip_normals: bool,
        flat: bool,
    ) -> Result<usize> {
        let positions = vertices
            .iter()
            .map(|&i| self.vertex(i).copied())
            .collect::<Result<Vec<_>>>()?;
        let segment = PathSegment::from_positions(vertices, &positions)?
            .with_flip_normals(flip_normals)
            .with_flat(flat);
        self.add_segment(segment)
    }

    /// Removes and returns a segment; intersections are rebuilt.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    pub fn remove_segment(&mut self, index: usize) -> Result<PathSegment> {
        self.segment(index)?;
        let segment = self.segments.remove(index);
        self.rebuild_intersections();
        debug!(index, "removed path segment");
        Ok(segment)
    }

    /// Resolves the position of every entry of a segment.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    pub fn segment_positions(&self, index: usize) -> Result<Vec<Point3>> {
        resolve(self.segment(index)?, &self.vertices)
    }

    /// Sets a segment's `flip_normals` flag, recomputing it if the flag changed.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range or the recompute fails.
    pub fn set_flip_normals(&mut self, index: usize, flip_normals: bool) -> Result<()> {
        let mut segment = self.segment(index)?.clone();
        if segment.set_flip_normals(flip_normals) {
            self.replace_segment(index, segment)?;
        }
        Ok(())
    }

    /// Sets a segment's `flat` flag, recomputing it if the flag changed.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range or the recompute fails.
    pub fn set_flat(&mut self, index: usize, flat: bool) -> Result<()> {
        let mut segment = self.segment(index)?.clone();
        if segment.set_flat(flat) {
            self.replace_segment(index, segment)?;
        }
        Ok(())
    }

    /// Recomputes one segment, returning the entries that needed a fallback.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range or the recompute fails.
    pub fn recalculate_segment(&mut self, index: usize) -> Result<Vec<Degeneracy>> {
        let segment = self.segment(index)?.clone();
        self.replace_segment(index, segment)
    }

    /// Recomputes every segment, returning `(segment, degeneracy)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if any recompute fails; no segment is updated then.
    pub fn recalculate_all(&mut self) -> Result<Vec<(usize, Degeneracy)>> {
        let mut segments = self.segments.clone();
        let mut found = Vec::new();
        for (index, segment) in segments.iter_mut().enumerate() {
            found.extend(
                rebuild(segment, &self.vertices, &self.options)?
                    .into_iter()
                    .map(|d| (index, d)),
            );
        }
        self.segments = segments;
        debug!(
            segments = self.segments.len(),
            degeneracies = found.len(),
            "recalculated path"
        );
        Ok(found)
    }

    fn replace_segment(
        &mut self,
        index: usize,
        mut segment: PathSegment,
    ) -> Result<Vec<Degeneracy>> {
        let degeneracies = rebuild(&mut segment, &self.vertices, &self.options)?;
        self.segments[index] = segment;
        debug!(index, "recalculated path segment");
        Ok(degeneracies)
    }

    // --- Intersection operations ---

    /// Returns the intersections derived from shared vertices.
    #[must_use]
    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }

    /// Returns the intersection at `vertex`, if two or more segments share it.
    #[must_use]
    pub fn intersection_at(&self, vertex: usize) -> Option<&Intersection> {
        self.intersections.iter().find(|i| i.vertex == vertex)
    }

    /// Recomputes the intersection records from the current segments.
    pub fn rebuild_intersections(&mut self) {
        self.intersections = find_intersections(&self.segments);
    }
}

/// Looks up the position of every entry of `segment` in `vertices`.
fn resolve(segment: &PathSegment, vertices: &[Point3]) -> Result<Vec<Point3>> {
    let mut positions = Vec::with_capacity(segment.len());
    for index in segment.vertex_indices() {
        let point = vertices.get(index).ok_or(PathError::VertexOutOfRange {
            index,
            len: vertices.len(),
        })?;
        positions.push(*point);
    }
    Ok(positions)
}

/// Recomputes metrics and normals of `segment` against `vertices`.
fn rebuild(
    segment: &mut PathSegment,
    vertices: &[Point3],
    options: &FrameOptions,
) -> Result<Vec<Degeneracy>> {
    let positions = resolve(segment, vertices)?;
    segment.update_metrics(&positions)?;
    segment.recalculate(&positions, options)
}
