//! Rotation-minimizing frames and ribbon geometry for authored 3D paths.
//!
//! A [`Path`] owns a vertex array and a set of [`PathSegment`]s that refer to
//! it by index. Each segment carries a tangent per vertex; the
//! [`PathFrameSolver`] derives a twist-minimized normal for every vertex by
//! double-reflection transport, and [`TessellateRibbon`] turns a solved
//! segment into a triangle strip.

pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod path;
pub mod tessellation;

pub use error::{PathframeError, Result};
pub use operations::{FrameOptions, FrameSolution, PathFrameSolver};
pub use path::{Intersection, Path, PathSegment, SegmentVertexEntry};
pub use tessellation::{RibbonStyle, TessellateRibbon, TriangleMesh};
