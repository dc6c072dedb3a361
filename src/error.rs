use thiserror::Error;

/// Result type produced by the inference engine.
pub type Result<T> = std::result::Result<T, CouplingError>;

/// Errors emitted while estimating coupling functions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CouplingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("insufficient data: {available} samples available, {required} required")]
    InsufficientData { available: usize, required: usize },
    #[error("singular matrix: {0}")]
    SingularMatrix(String),
    #[error("estimation cancelled after {completed} windows")]
    Cancelled { completed: usize },
}

impl CouplingError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub(crate) fn singular(msg: impl Into<String>) -> Self {
        Self::SingularMatrix(msg.into())
    }
}
