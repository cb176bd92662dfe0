pub mod frame;
mod tangent;

pub use frame::{
    Degeneracy, DegeneracyKind, DegeneracyPolicy, FrameOptions, FrameSolution, PathFrameSolver,
};
pub use tangent::EstimateTangents;
