use thiserror::Error;

#[derive(Debug, Error)]
pub enum CurveError {
    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Fit not well determined: basis matrix has rank {rank}, {required} control points requested")]
    FitNotWellDetermined { rank: usize, required: usize },

    #[error("Tolerance violation: {0}")]
    Tolerance(String),
}

pub type Result<T> = std::result::Result<T, CurveError>;
