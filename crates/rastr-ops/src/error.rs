//! Error types for raster operations.

use rastr_core::Error as BufferError;
use thiserror::Error;

/// Error type for raster operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OpsError {
    /// A scalar parameter is outside its documented range, or a tag names
    /// no known operation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Buffer-level failure: mismatched dimensions or out-of-bounds access.
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

impl OpsError {
    /// Creates an [`OpsError::InvalidArgument`] error.
    #[inline]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Returns `true` for out-of-range parameters and unknown tags.
    #[inline]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Returns `true` if the inputs disagreed on size.
    #[inline]
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self, Self::Buffer(e) if e.is_dimension_mismatch())
    }
}

/// Result type for raster operations.
pub type OpsResult<T> = Result<T, OpsError>;
