use crate::error::{Result, TessellationError};
use crate::math::vector_3d::unit;
use crate::math::{Point2, Point3, Vector3};
use crate::path::Path;

use super::ribbon_style::RibbonStyle;
use super::TriangleMesh;

/// Generates a ribbon triangle mesh from a polyline and its per-vertex normals.
///
/// Each polyline vertex `p` with normal `n` produces a left vertex at
/// `p + n * w/2` and a right vertex at `p - n * w/2`. At interior vertices the
/// offset is stretched by the miter scale of the turn within the ribbon plane
/// (capped by the style's miter limit) so the ribbon keeps its width through
/// corners. Surface normals are
/// `n × tangent`; UVs run `u = 0` (left) to `u = 1` (right) across and
/// `v = 0..1` by arc length along.
#[derive(Debug)]
pub struct TessellateRibbon {
    points: Vec<Point3>,
    normals: Vec<Vector3>,
    style: RibbonStyle,
}

impl TessellateRibbon {
    /// Creates a new ribbon tessellation operation.
    #[must_use]
    pub fn new(points: Vec<Point3>, normals: Vec<Vector3>, style: RibbonStyle) -> Self {
        Self {
            points,
            normals,
            style,
        }
    }

    /// Creates a ribbon over a solved path segment.
    ///
    /// # Errors
    ///
    /// Returns an error if `segment` is out of range.
    pub fn from_segment(path: &Path, segment: usize, style: RibbonStyle) -> Result<Self> {
        let points = path.segment_positions(segment)?;
        let normals = path.segment(segment)?.normals();
        Ok(Self::new(points, normals, style))
    }

    /// Executes the tessellation, producing a ribbon mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 2 points are provided, the normal count
    /// differs from the point count, consecutive points are coincident, or a
    /// normal is parallel to the local direction of travel.
    #[allow(clippy::cast_possible_truncation)]
    pub fn execute(&self) -> Result<TriangleMesh> {
        let n = self.points.len();
        if n < 2 {
            return Err(TessellationError::InvalidParameters(
                "at least 2 points are required for ribbon tessellation".to_owned(),
            )
            .into());
        }
        if self.normals.len() != n {
            return Err(TessellationError::InvalidParameters(format!(
                "{n} points but {} normals",
                self.normals.len()
            ))
            .into());
        }

        let directions = (0..n - 1)
            .map(|i| self.segment_direction(i, i + 1))
            .collect::<Result<Vec<_>>>()?;

        let half_w = self.style.half_width();
        let arc_lengths = self.cumulative_arc_lengths();
        let total_length = arc_lengths[n - 1];
        let inv_total = if total_length > f64::EPSILON {
            1.0 / total_length
        } else {
            0.0
        };

        let mut vertices = Vec::with_capacity(n * 2);
        let mut normals = Vec::with_capacity(n * 2);
        let mut uvs = Vec::with_capacity(n * 2);

        for i in 0..n {
            let p = self.points[i];
            let side = self.normals[i];

            let tangent = if i == 0 {
                directions[0]
            } else if i == n - 1 {
                directions[n - 2]
            } else {
                average_direction(directions[i - 1], directions[i])
            };

            let surface = unit(&side.cross(&tangent)).ok_or_else(|| {
                TessellationError::InvalidParameters(format!(
                    "normal at point {i} is parallel to the direction of travel"
                ))
            })?;

            let scale = if i == 0 || i == n - 1 {
                1.0
            } else {
                self.miter_scale(directions[i - 1], directions[i], &surface)
            };

            let off = side * half_w * scale;
            let v = arc_lengths[i] * inv_total;
            vertices.extend_from_slice(&[p + off, p - off]);
            normals.extend_from_slice(&[surface, surface]);
            uvs.extend_from_slice(&[Point2::new(0.0, v), Point2::new(1.0, v)]);
        }

        let mut indices = Vec::with_capacity((n - 1) * 2);
        for i in 0..n - 1 {
            let left = (i * 2) as u32;
            let right = left + 1;
            let next_left = left + 2;
            let next_right = left + 3;
            indices.push([left, next_left, right]);
            indices.push([right, next_left, next_right]);
        }

        Ok(TriangleMesh {
            vertices,
            normals,
            uvs,
            indices,
        })
    }

    /// Miter stretch for the turn from `d_prev` to `d_next`, measured in the
    /// ribbon plane (the part of the turn along `surface` bends the ribbon
    /// without narrowing it).
    fn miter_scale(&self, d_prev: Vector3, d_next: Vector3, surface: &Vector3) -> f64 {
        let (Some(a), Some(b)) = (
            unit(&(d_prev - surface * surface.dot(&d_prev))),
            unit(&(d_next - surface * surface.dot(&d_next))),
        ) else {
            return 1.0;
        };
        let cos_half = f64::midpoint(1.0, a.dot(&b)).max(0.0).sqrt();
        let miter_scale = if cos_half > f64::EPSILON {
            1.0 / cos_half
        } else {
            f64::MAX
        };
        miter_scale.min(self.style.miter_limit())
    }

    /// Computes the normalized direction from point `a` to point `b`.
    fn segment_direction(&self, a: usize, b: usize) -> Result<Vector3> {
        let d = self.points[b] - self.points[a];
        let len = d.norm();
        if len < f64::EPSILON {
            return Err(TessellationError::InvalidParameters(format!(
                "zero-length segment between points {a} and {b}"
            ))
            .into());
        }
        Ok(d / len)
    }

    /// Returns cumulative arc lengths at each vertex.
    fn cumulative_arc_lengths(&self) -> Vec<f64> {
        let n = self.points.len();
        let mut lengths = Vec::with_capacity(n);
        lengths.push(0.0);
        for i in 1..n {
            let seg_len = (self.points[i] - self.points[i - 1]).norm();
            lengths.push(lengths[i - 1] + seg_len);
        }
        lengths
    }
}

/// Returns the normalized average of two direction vectors.
fn average_direction(a: Vector3, b: Vector3) -> Vector3 {
    let avg = a + b;
    let len = avg.norm();
    if len < f64::EPSILON {
        // Opposite directions: fall back to the first direction.
        a
    } else {
        avg / len
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::{FrameOptions, PathFrameSolver};
    use approx::assert_relative_eq;

    fn style(width: f64) -> RibbonStyle {
        RibbonStyle::new(width).unwrap()
    }

    #[test]
    fn straight_ribbon_two_points() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 10.0)];
        let normals = vec![Vector3::new(-1.0, 0.0, 0.0); 2];
        let mesh = TessellateRibbon::new(points, normals, style(2.0))
            .execute()
            .unwrap();

        // 2 points -> 4 vertices, 2 triangles
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 2);
        assert_relative_eq!(mesh.vertices[0], Point3::new(-1.0, 0.0, 0.0));
        assert_relative_eq!(mesh.vertices[1], Point3::new(1.0, 0.0, 0.0));
        let spread = (mesh.vertices[1] - mesh.vertices[0]).norm();
        assert!((spread - 2.0).abs() < 1e-10, "total width should be 2.0");
    }

    #[test]
    fn surface_normals_point_up_for_horizontal_ribbon() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 5.0)];
        let normals = vec![Vector3::new(-1.0, 0.0, 0.0); 2];
        let mesh = TessellateRibbon::new(points, normals, style(1.0))
            .execute()
            .unwrap();
        for normal in &mesh.normals {
            assert_relative_eq!(*normal, Vector3::y(), epsilon = 1e-12);
        }
    }

    #[test]
    fn winding_matches_surface_normal() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 5.0)];
        let normals = vec![Vector3::new(-1.0, 0.0, 0.0); 2];
        let mesh = TessellateRibbon::new(points, normals, style(1.0))
            .execute()
            .unwrap();
        for tri in &mesh.indices {
            let [a, b, c] = tri.map(|i| mesh.vertices[i as usize]);
            let face = (b - a).cross(&(c - a));
            assert!(face.dot(&Vector3::y()) > 0.0);
        }
    }

    #[test]
    fn corner_keeps_width_with_miter() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
        ];
        let tangents = vec![
            Vector3::z(),
            Vector3::new(1.0, 0.0, 1.0).normalize(),
            Vector3::x(),
        ];
        let solution = PathFrameSolver::new(&tangents, &points, FrameOptions::default())
            .execute()
            .unwrap();
        let mesh = TessellateRibbon::new(points, solution.normals, style(1.0))
            .execute()
            .unwrap();

        assert_eq!(mesh.vertices.len(), 6);
        assert_eq!(mesh.indices.len(), 4);
        // Outer corner sits where both offset edges meet.
        assert_relative_eq!(mesh.vertices[2], Point3::new(-0.5, 0.0, 1.5), epsilon = 1e-9);
        assert_relative_eq!(mesh.vertices[3], Point3::new(0.5, 0.0, 0.5), epsilon = 1e-9);
    }

    #[test]
    fn pitch_bend_does_not_widen_ribbon() {
        // Turns from +Z to +Y about the ribbon's own width axis.
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let normals = vec![Vector3::new(-1.0, 0.0, 0.0); 3];
        let mesh = TessellateRibbon::new(points, normals, style(1.0))
            .execute()
            .unwrap();

        let width = (mesh.vertices[3] - mesh.vertices[2]).norm();
        assert_relative_eq!(width, 1.0, epsilon = 1e-12);
        assert_relative_eq!(mesh.vertices[2], Point3::new(-0.5, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn miter_limit_caps_hairpin() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 4.0),
            Point3::new(0.2, 0.0, 0.0),
        ];
        let normals = vec![Vector3::new(-1.0, 0.0, 0.0); 3];
        let mesh = TessellateRibbon::new(points, normals, style(1.0))
            .execute()
            .unwrap();
        let offset = (mesh.vertices[2] - Point3::new(0.0, 0.0, 4.0)).norm();
        assert!(offset <= 0.5 * 2.0 + 1e-12);
    }

    #[test]
    fn uvs_range() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 5.0),
            Point3::new(0.0, 0.0, 10.0),
        ];
        let normals = vec![Vector3::new(-1.0, 0.0, 0.0); 3];
        let mesh = TessellateRibbon::new(points, normals, style(1.0))
            .execute()
            .unwrap();

        // First pair: V=0
        assert!((mesh.uvs[0].y).abs() < 1e-10);
        assert!((mesh.uvs[1].y).abs() < 1e-10);
        // Middle pair: V=0.5
        assert!((mesh.uvs[2].y - 0.5).abs() < 1e-10);
        // Last pair: V=1
        assert!((mesh.uvs[4].y - 1.0).abs() < 1e-10);
        assert!((mesh.uvs[5].y - 1.0).abs() < 1e-10);
        // U: left=0, right=1
        assert!((mesh.uvs[0].x).abs() < 1e-10);
        assert!((mesh.uvs[1].x - 1.0).abs() < 1e-10);
    }

    #[test]
    fn from_segment_uses_solved_normals() {
        let mut path = Path::new();
        for p in [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, 2.0),
        ] {
            path.add_vertex(p);
        }
        let index = path.add_segment_through(&[0, 1, 2], true, false).unwrap();
        let mesh = TessellateRibbon::from_segment(&path, index, style(2.0))
            .unwrap()
            .execute()
            .unwrap();

        // Flipped normals: left side is +X, surface faces down.
        assert_relative_eq!(mesh.vertices[0], Point3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(mesh.normals[0], -Vector3::y(), epsilon = 1e-12);
        assert!(TessellateRibbon::from_segment(&path, 1, style(2.0)).is_err());
    }

    #[test]
    fn too_few_points_fails() {
        let op = TessellateRibbon::new(vec![Point3::origin()], vec![Vector3::x()], style(1.0));
        assert!(op.execute().is_err());
    }

    #[test]
    fn normal_count_mismatch_fails() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let op = TessellateRibbon::new(points, vec![Vector3::z()], style(1.0));
        assert!(op.execute().is_err());
    }

    #[test]
    fn zero_length_segment_fails() {
        let points = vec![Point3::new(1.0, 2.0, 0.0), Point3::new(1.0, 2.0, 0.0)];
        let op = TessellateRibbon::new(points, vec![Vector3::z(); 2], style(1.0));
        assert!(op.execute().is_err());
    }

    #[test]
    fn normal_along_travel_fails() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let op = TessellateRibbon::new(points, vec![Vector3::x(); 2], style(1.0));
        assert!(op.execute().is_err());
    }
}
