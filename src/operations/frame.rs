use std::fmt;

use tracing::warn;

use crate::error::{GeometryError, OperationError, Result};
use crate::math::vector_3d::{any_perpendicular, orthogonal_component, planar_normal, reflect, unit};
use crate::math::{Point3, Vector3, WORLD_UP};

/// What the solver does when an entry's normal cannot be transported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DegeneracyPolicy {
    /// Substitute a fallback normal, record the entry, and keep going.
    #[default]
    Fallback,
    /// Abort with [`GeometryError::DegenerateSegment`] on the first occurrence.
    Reject,
}

/// Parameters controlling normal computation for one segment.
#[derive(Debug, Clone, Copy)]
pub struct FrameOptions {
    /// World up direction used by the planar formula.
    pub up: Vector3,
    /// Negate every output normal.
    pub flip_normals: bool,
    /// Use the planar formula at every entry instead of transporting.
    pub flat: bool,
    /// Handling of degenerate geometry.
    pub policy: DegeneracyPolicy,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            up: WORLD_UP,
            flip_normals: false,
            flat: false,
            policy: DegeneracyPolicy::Fallback,
        }
    }
}

/// Why an entry's normal had to be repaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegeneracyKind {
    /// The entry sits on the same position as its predecessor.
    CoincidentPositions,
    /// The tangent is parallel to the up direction, so `tangent × up` vanishes.
    TangentParallelToUp,
    /// The transported normal could not be normalized.
    CollapsedNormal,
}

impl fmt::Display for DegeneracyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::CoincidentPositions => "coincident consecutive positions",
            Self::TangentParallelToUp => "tangent parallel to up direction",
            Self::CollapsedNormal => "transported normal collapsed",
        };
        f.write_str(msg)
    }
}

/// A repaired entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Degeneracy {
    /// Entry index within the segment.
    pub index: usize,
    pub kind: DegeneracyKind,
}

/// Output of [`PathFrameSolver::execute`].
#[derive(Debug, Clone, Default)]
pub struct FrameSolution {
    /// One unit normal per entry.
    pub normals: Vec<Vector3>,
    /// Entries that needed a fallback, in index order.
    pub degeneracies: Vec<Degeneracy>,
}

/// Computes a twist-minimized normal at every vertex of a polyline.
///
/// The first entry (or every entry in flat mode) takes the planar normal
/// `normalize(tangent × up)`. Later entries transport the previous frame
/// with two Householder reflections: first across the plane orthogonal to
/// the chord between the two positions, then across the plane orthogonal to
/// the difference between the current tangent and the reflected previous
/// tangent. The reflected rotation axis `r` gives the normal
/// `normalize(r × tangent)` and is carried to the next entry.
#[derive(Debug)]
pub struct PathFrameSolver<'a> {
    tangents: &'a [Vector3],
    positions: &'a [Point3],
    options: FrameOptions,
}

impl<'a> PathFrameSolver<'a> {
    /// Creates a new solver over per-entry tangents and resolved positions.
    #[must_use]
    pub fn new(tangents: &'a [Vector3], positions: &'a [Point3], options: FrameOptions) -> Self {
        Self {
            tangents,
            positions,
            options,
        }
    }

    /// Executes the pass.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no entries, if tangent and position
    /// counts differ, or if `up` is zero or non-finite. With [`DegeneracyPolicy::Reject`]
    /// any degenerate entry is an error as well.
    pub fn execute(&self) -> Result<FrameSolution> {
        let n = self.tangents.len();
        if n == 0 {
            return Err(OperationError::InvalidInput(
                "at least one entry is required for frame computation".to_owned(),
            )
            .into());
        }
        if self.positions.len() != n {
            return Err(OperationError::InvalidInput(format!(
                "{n} tangents but {} positions",
                self.positions.len()
            ))
            .into());
        }
        if unit(&self.options.up).is_none() {
            return Err(GeometryError::ZeroVector.into());
        }

        let up = self.options.up;
        let mut normals: Vec<Vector3> = Vec::with_capacity(n);
        let mut degeneracies = Vec::new();
        let mut rotation = Vector3::zeros();
        // Last entry with a usable tangent; transport starts from it.
        let mut carried_tangent = Vector3::zeros();
        let mut carried_position = self.positions[0];

        for i in 0..n {
            let tangent = self.tangents[i];
            let usable = unit(&tangent).is_some();

            let transported = if i == 0 || self.options.flat {
                match planar_normal(&tangent, &up) {
                    Some(normal) => Some(normal),
                    None => {
                        let kind = if usable {
                            DegeneracyKind::TangentParallelToUp
                        } else {
                            DegeneracyKind::CollapsedNormal
                        };
                        self.note(i, kind, &mut degeneracies)?;
                        None
                    }
                }
            } else {
                let offset = self.positions[i] - carried_position;

                let (r, t) = match (reflect(&rotation, &offset), reflect(&carried_tangent, &offset)) {
                    (Some(r), Some(t)) => (r, t),
                    _ => {
                        self.note(i, DegeneracyKind::CoincidentPositions, &mut degeneracies)?;
                        (rotation, carried_tangent)
                    }
                };

                // Tangents already aligned after the first reflection: keep `r`.
                let final_rotation = reflect(&r, &(tangent - t)).unwrap_or(r);

                match unit(&final_rotation.cross(&tangent)) {
                    Some(normal) => {
                        rotation = final_rotation;
                        Some(normal)
                    }
                    None => {
                        self.note(i, DegeneracyKind::CollapsedNormal, &mut degeneracies)?;
                        None
                    }
                }
            };

            let normal = match transported {
                Some(normal) if i > 0 && !self.options.flat => normal,
                Some(normal) => {
                    rotation = tangent.cross(&normal);
                    normal
                }
                // No direction at this entry: repeat the previous normal and
                // keep the carried frame for the next usable entry.
                None => match normals.last() {
                    Some(previous) if !usable => *previous,
                    previous => {
                        let normal = fallback_normal(&tangent, &up, previous);
                        rotation = tangent.cross(&normal);
                        normal
                    }
                },
            };

            if usable || i == 0 {
                carried_tangent = tangent;
                carried_position = self.positions[i];
            }
            normals.push(normal);
        }

        if self.options.flip_normals {
            for normal in &mut normals {
                *normal = -*normal;
            }
        }

        Ok(FrameSolution {
            normals,
            degeneracies,
        })
    }

    fn note(&self, index: usize, kind: DegeneracyKind, out: &mut Vec<Degeneracy>) -> Result<()> {
        if self.options.policy == DegeneracyPolicy::Reject {
            return Err(GeometryError::DegenerateSegment { index, kind }.into());
        }
        warn!(index, %kind, "degenerate path geometry, substituting fallback normal");
        out.push(Degeneracy { index, kind });
        Ok(())
    }
}

/// Planar normal, else the previous normal made orthogonal to `tangent`,
/// else any perpendicular of `tangent`. Only used when `tangent` has a
/// direction or there is no previous normal.
fn fallback_normal(tangent: &Vector3, up: &Vector3, previous: Option<&Vector3>) -> Vector3 {
    planar_normal(tangent, up)
        .or_else(|| previous.and_then(|prev| orthogonal_component(prev, tangent)))
        .unwrap_or_else(|| any_perpendicular(tangent))
}
