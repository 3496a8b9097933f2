//! Error types for rastr-core operations.
//!
//! # Overview
//!
//! The [`Error`] enum covers the failure modes of buffer-level work:
//! - Coordinate access outside the buffer extent
//! - Pairs of buffers whose sizes must agree but don't
//! - Raw sample data that doesn't fit the declared dimensions
//!
//! Parameter validation for the individual transforms lives in
//! `rastr-ops`, which wraps this type.
//!
//! # Usage
//!
//! ```rust
//! use rastr_core::{Error, Result};
//!
//! fn check(x: u32, y: u32, width: u32, height: u32) -> Result<()> {
//!     if x >= width || y >= height {
//!         return Err(Error::out_of_bounds(x, y, width, height));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check(4, 0, 4, 4).is_err());
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or addressing a [`PixelBuffer`](crate::PixelBuffer).
///
/// # Categories
///
/// - **Bounds errors**: [`OutOfBounds`](Error::OutOfBounds)
/// - **Dimension errors**: [`DimensionMismatch`](Error::DimensionMismatch),
///   [`InvalidDimensions`](Error::InvalidDimensions)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Pixel coordinates are outside buffer bounds.
    ///
    /// Public transforms compute their coordinates internally and never
    /// produce this; it signals a programming error in the caller.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rastr_core::Error;
    ///
    /// let err = Error::OutOfBounds {
    ///     x: 100,
    ///     y: 50,
    ///     width: 80,
    ///     height: 60,
    /// };
    /// assert!(err.to_string().contains("100"));
    /// ```
    #[error("pixel ({x}, {y}) out of bounds for buffer {width}x{height}")]
    OutOfBounds {
        /// X coordinate that was out of bounds
        x: u32,
        /// Y coordinate that was out of bounds
        y: u32,
        /// Buffer width
        width: u32,
        /// Buffer height
        height: u32,
    },

    /// Buffer dimensions don't match for the operation.
    ///
    /// Returned when an operation requires buffers of the same size
    /// (channel combination, comparison).
    #[error("dimension mismatch: {a_width}x{a_height} vs {b_width}x{b_height}")]
    DimensionMismatch {
        /// First buffer width
        a_width: u32,
        /// First buffer height
        a_height: u32,
        /// Second buffer width
        b_width: u32,
        /// Second buffer height
        b_height: u32,
    },

    /// Raw sample data doesn't describe a valid buffer.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Reason why dimensions are invalid
        reason: String,
    },
}

impl Error {
    /// Creates an [`Error::OutOfBounds`] error.
    #[inline]
    pub fn out_of_bounds(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self::OutOfBounds {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates an [`Error::DimensionMismatch`] error.
    #[inline]
    pub fn dimension_mismatch(a: (u32, u32), b: (u32, u32)) -> Self {
        Self::DimensionMismatch {
            a_width: a.0,
            a_height: a.1,
            b_width: b.0,
            b_height: b.1,
        }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Returns `true` if this is a bounds-related error.
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. })
    }

    /// Returns `true` if two buffers disagreed on size.
    #[inline]
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self, Self::DimensionMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds() {
        let err = Error::out_of_bounds(100, 50, 80, 60);
        let msg = err.to_string();
        assert!(msg.contains("100"));
        assert!(msg.contains("50"));
        assert!(msg.contains("80x60"));
        assert!(err.is_bounds_error());
        assert!(!err.is_dimension_mismatch());
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = Error::dimension_mismatch((100, 100), (200, 200));
        let msg = err.to_string();
        assert!(msg.contains("100x100"));
        assert!(msg.contains("200x200"));
        assert!(err.is_dimension_mismatch());
    }

    #[test]
    fn test_invalid_dimensions() {
        let err = Error::invalid_dimensions(4, 4, "expected 48 samples, got 3");
        assert!(err.to_string().contains("expected 48 samples"));
        assert!(!err.is_bounds_error());
    }
}
