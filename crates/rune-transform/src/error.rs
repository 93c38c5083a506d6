//! Error types for transform operations.

use thiserror::Error;

/// Result type for transform operations.
pub type Result<T> = std::result::Result<T, TransformError>;

/// Errors that can occur while querying, mutating, or loading transforms.
#[derive(Error, Debug)]
pub enum TransformError {
    /// Row, column, array offset or point count outside the valid range.
    #[error("index out of bounds: {0}")]
    IndexOutOfBounds(String),

    /// Matrix shape too narrow for the transform, or a structural element
    /// was given a non-structural value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A 2D-only operation was invoked on a transform with z coupling.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// The transform's determinant is zero.
    #[error("transform is not invertible: {0}")]
    NonInvertible(String),

    /// Reading a transform chain file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A transform chain document could not be parsed.
    #[error("failed to parse transform chain: {0}")]
    Parse(#[from] toml::de::Error),
}

impl TransformError {
    pub(crate) fn determinant_is_zero() -> Self {
        Self::NonInvertible("determinant is 0".to_string())
    }

    pub(crate) fn not_2d(operation: &str) -> Self {
        Self::IllegalState(format!("cannot {operation} with a 3D transform"))
    }
}
