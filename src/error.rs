use thiserror::Error;

use crate::operations::frame::DegeneracyKind;

/// Top-level error type for the pathframe crate.
#[derive(Debug, Error)]
pub enum PathframeError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("zero-length vector")]
    ZeroVector,

    #[error("degenerate segment at entry {index}: {kind}")]
    DegenerateSegment { index: usize, kind: DegeneracyKind },
}

/// Errors related to path bookkeeping.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("vertex index {index} is out of range (path has {len} vertices)")]
    VertexOutOfRange { index: usize, len: usize },

    #[error("segment index {index} is out of range (path has {len} segments)")]
    SegmentOutOfRange { index: usize, len: usize },

    #[error("segment has no entries")]
    EmptySegment,
}

/// Errors related to operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors related to tessellation.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("invalid tessellation parameters: {0}")]
    InvalidParameters(String),
}

/// Convenience type alias for results using [`PathframeError`].
pub type Result<T> = std::result::Result<T, PathframeError>;
