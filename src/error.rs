use thiserror::Error;

/// Top-level error type for the trackgate kernel.
#[derive(Debug, Error)]
pub enum TrackgateError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

/// Errors related to geometric inputs and computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("boundary needs at least {min} points, got {got}")]
    TooFewPoints { min: usize, got: usize },

    #[error("zero-length vector")]
    ZeroVector,

    #[error("height sample rejected: {0}")]
    HeightSample(String),
}

/// Errors raised while constructing the gate sequence.
#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("windowed boundary extraction is only implemented for closed boundaries")]
    OpenBoundaryUnsupported,

    #[error(
        "gate placement exploded: midpoint ({x}, {y}) left the track bounds \
         x [{x_min}, {x_max}], y [{y_min}, {y_max}]"
    )]
    Exploded {
        x: f64,
        y: f64,
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
    },

    #[error("start line was not crossed during gate construction")]
    StartLineNotCrossed,

    #[error("finish line was not crossed during gate construction")]
    FinishLineNotCrossed,

    #[error("gate placement solver stalled after {max_iters} iterations")]
    SolverStalled { max_iters: usize },
}

/// Convenience type alias for results using [`TrackgateError`].
pub type Result<T> = std::result::Result<T, TrackgateError>;
