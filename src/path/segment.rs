use crate::error::{OperationError, PathError, Result};
use crate::geometry::Aabb;
use crate::math::{Point3, Vector3};
use crate::operations::{Degeneracy, EstimateTangents, FrameOptions, FrameSolution, PathFrameSolver};

/// A segment's view of one path vertex.
///
/// `tangent` is authored input; `normal` and `length` are derived by
/// [`PathSegment::recalculate`] and [`PathSegment::update_metrics`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentVertexEntry {
    /// Index into the owning path's vertex array.
    pub vertex: usize,
    /// Direction of travel at this vertex.
    pub tangent: Vector3,
    /// Computed orientation vector, orthogonal to `tangent`.
    pub normal: Vector3,
    /// Cumulative arc length from the segment start.
    pub length: f64,
}

impl SegmentVertexEntry {
    /// Creates an entry with no derived state yet.
    #[must_use]
    pub fn new(vertex: usize, tangent: Vector3) -> Self {
        Self {
            vertex,
            tangent,
            normal: Vector3::zeros(),
            length: 0.0,
        }
    }
}

/// An ordered run of path vertices with per-vertex frames.
///
/// The segment stores vertex indices only; every method that needs
/// geometry takes the resolved positions, one per entry.
#[derive(Debug, Clone, Default)]
pub struct PathSegment {
    entries: Vec<SegmentVertexEntry>,
    length: f64,
    bounds: Option<Aabb>,
    flip_normals: bool,
    flat: bool,
}

impl PathSegment {
    /// Creates a segment from authored entries.
    #[must_use]
    pub fn new(entries: Vec<SegmentVertexEntry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    /// Creates a segment over `vertices` with tangents estimated from `positions`.
    ///
    /// # Errors
    ///
    /// Returns an error if the counts differ or tangents cannot be estimated
    /// (fewer than 2 points, or all points coincident).
    pub fn from_positions(vertices: &[usize], positions: &[Point3]) -> Result<Self> {
        check_count(vertices.len(), positions.len())?;
        let tangents = EstimateTangents::new(positions).execute()?;
        let entries = vertices
            .iter()
            .zip(tangents)
            .map(|(&vertex, tangent)| SegmentVertexEntry::new(vertex, tangent))
            .collect();
        Ok(Self::new(entries))
    }

    /// Sets the flip flag, returning the segment for chaining.
    #[must_use]
    pub fn with_flip_normals(mut self, flip_normals: bool) -> Self {
        self.flip_normals = flip_normals;
        self
    }

    /// Sets the flat flag, returning the segment for chaining.
    #[must_use]
    pub fn with_flat(mut self, flat: bool) -> Self {
        self.flat = flat;
        self
    }

    /// Returns the per-vertex entries in path order.
    #[must_use]
    pub fn entries(&self) -> &[SegmentVertexEntry] {
        &self.entries
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the segment has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total arc length, valid after [`Self::update_metrics`].
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Bounding box of the entry positions, valid after [`Self::update_metrics`].
    #[must_use]
    pub fn bounds(&self) -> Option<&Aabb> {
        self.bounds.as_ref()
    }

    /// Returns `true` if normals are negated after solving.
    #[must_use]
    pub fn flip_normals(&self) -> bool {
        self.flip_normals
    }

    /// Returns `true` if every normal uses the planar formula.
    #[must_use]
    pub fn flat(&self) -> bool {
        self.flat
    }

    /// Sets the flip flag. Returns `true` if it changed.
    ///
    /// Normals are stale until the next [`Self::recalculate`].
    pub fn set_flip_normals(&mut self, flip_normals: bool) -> bool {
        std::mem::replace(&mut self.flip_normals, flip_normals) != flip_normals
    }

    /// Sets the flat flag. Returns `true` if it changed.
    ///
    /// Normals are stale until the next [`Self::recalculate`].
    pub fn set_flat(&mut self, flat: bool) -> bool {
        std::mem::replace(&mut self.flat, flat) != flat
    }

    /// Vertex indices in entry order.
    pub fn vertex_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|e| e.vertex)
    }

    /// Returns `true` if any entry references `vertex`.
    #[must_use]
    pub fn references(&self, vertex: usize) -> bool {
        self.entries.iter().any(|e| e.vertex == vertex)
    }

    /// Returns a copy of the entry tangents.
    #[must_use]
    pub fn tangents(&self) -> Vec<Vector3> {
        self.entries.iter().map(|e| e.tangent).collect()
    }

    /// Returns a copy of the solved entry normals.
    #[must_use]
    pub fn normals(&self) -> Vec<Vector3> {
        self.entries.iter().map(|e| e.normal).collect()
    }

    /// Merges this segment's flags into `base`.
    #[must_use]
    pub fn frame_options(&self, base: &FrameOptions) -> FrameOptions {
        FrameOptions {
            flip_normals: self.flip_normals,
            flat: self.flat,
            ..*base
        }
    }

    /// Computes normals without touching the entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is empty, `positions` has the wrong
    /// length, or the solver rejects a degenerate entry.
    pub fn solve(&self, positions: &[Point3], base: &FrameOptions) -> Result<FrameSolution> {
        if self.entries.is_empty() {
            return Err(PathError::EmptySegment.into());
        }
        check_count(self.entries.len(), positions.len())?;
        let tangents = self.tangents();
        PathFrameSolver::new(&tangents, positions, self.frame_options(base)).execute()
    }

    /// Recomputes every entry's normal in place.
    ///
    /// Returns the entries that needed a fallback normal.
    ///
    /// # Errors
    ///
    /// See [`Self::solve`]. On error the entries are left unchanged.
    pub fn recalculate(
        &mut self,
        positions: &[Point3],
        base: &FrameOptions,
    ) -> Result<Vec<Degeneracy>> {
        let solution = self.solve(positions, base)?;
        for (entry, normal) in self.entries.iter_mut().zip(solution.normals) {
            entry.normal = normal;
        }
        Ok(solution.degeneracies)
    }

    /// Recomputes cumulative entry lengths, total length and bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if `positions` has the wrong length.
    pub fn update_metrics(&mut self, positions: &[Point3]) -> Result<()> {
        check_count(self.entries.len(), positions.len())?;

        let mut total = 0.0;
        for (i, entry) in self.entries.iter_mut().enumerate() {
            if i > 0 {
                total += (positions[i] - positions[i - 1]).norm();
            }
            entry.length = total;
        }
        self.length = total;
        self.bounds = Aabb::from_points(positions);
        Ok(())
    }

    /// Drops entries referencing `removed` and shifts higher indices down.
    ///
    /// Returns `true` if any entry was dropped.
    pub(crate) fn forget_vertex(&mut self, removed: usize) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.vertex != removed);
        for entry in &mut self.entries {
            if entry.vertex > removed {
                entry.vertex -= 1;
            }
        }
        self.entries.len() != before
    }
}

fn check_count(entries: usize, positions: usize) -> Result<()> {
    if entries == positions {
        Ok(())
    } else {
        Err(OperationError::InvalidInput(format!(
            "{entries} segment entries but {positions} positions"
        ))
        .into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn straight() -> (PathSegment, Vec<Point3>) {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 3.0),
            Point3::new(0.0, 4.0, 3.0),
        ];
        let segment = PathSegment::from_positions(&[0, 1, 2], &positions).unwrap();
        (segment, positions)
    }

    #[test]
    fn update_metrics_accumulates_length() {
        let (mut segment, positions) = straight();
        segment.update_metrics(&positions).unwrap();

        let lengths: Vec<f64> = segment.entries().iter().map(|e| e.length).collect();
        assert_relative_eq!(lengths[0], 0.0);
        assert_relative_eq!(lengths[1], 3.0);
        assert_relative_eq!(lengths[2], 7.0);
        assert_relative_eq!(segment.length(), 7.0);

        let bounds = segment.bounds().unwrap();
        assert_eq!(bounds.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.max, Point3::new(0.0, 4.0, 3.0));
    }

    #[test]
    fn recalculate_writes_normals() {
        let (mut segment, positions) = straight();
        let degeneracies = segment
            .recalculate(&positions, &FrameOptions::default())
            .unwrap();
        assert!(degeneracies.is_empty());
        for entry in segment.entries() {
            assert_relative_eq!(entry.normal.norm(), 1.0, epsilon = 1e-9);
            assert!(entry.normal.dot(&entry.tangent).abs() < 1e-9);
        }
        assert_relative_eq!(
            segment.entries()[0].normal,
            Vector3::new(-1.0, 0.0, 0.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn flags_feed_frame_options() {
        let (segment, positions) = straight();
        let segment = segment.with_flip_normals(true).with_flat(true);
        let options = segment.frame_options(&FrameOptions::default());
        assert!(options.flip_normals);
        assert!(options.flat);

        let solution = segment.solve(&positions, &FrameOptions::default()).unwrap();
        assert_relative_eq!(solution.normals[0], Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn set_flags_report_change() {
        let mut segment = PathSegment::default();
        assert!(segment.set_flip_normals(true));
        assert!(!segment.set_flip_normals(true));
        assert!(segment.set_flat(true));
        assert!(!segment.set_flat(true));
    }

    #[test]
    fn position_count_mismatch_fails() {
        let (mut segment, positions) = straight();
        assert!(segment
            .recalculate(&positions[..2], &FrameOptions::default())
            .is_err());
        assert!(segment.update_metrics(&positions[..1]).is_err());
    }

    #[test]
    fn empty_segment_cannot_be_solved() {
        let segment = PathSegment::default();
        assert!(segment.solve(&[], &FrameOptions::default()).is_err());
    }

    #[test]
    fn forget_vertex_shifts_indices() {
        let mut segment = PathSegment::new(vec![
            SegmentVertexEntry::new(1, Vector3::z()),
            SegmentVertexEntry::new(3, Vector3::z()),
            SegmentVertexEntry::new(4, Vector3::z()),
        ]);
        assert!(segment.forget_vertex(3));
        assert_eq!(segment.vertex_indices().collect::<Vec<_>>(), vec![1, 3]);

        assert!(!segment.forget_vertex(0));
        assert_eq!(segment.vertex_indices().collect::<Vec<_>>(), vec![0, 2]);
    }
}
