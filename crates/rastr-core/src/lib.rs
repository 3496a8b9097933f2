//! # rastr-core
//!
//! Core types for in-memory raster processing.
//!
//! This crate provides the foundational types used throughout rastr:
//!
//! - [`PixelBuffer`] - Owned, bounds-checked grid of 8-bit RGB pixels
//! - [`Rgb`], [`Channel`] - Pixel and color-plane types
//! - [`Error`], [`Result`] - Buffer-level failures
//!
//! ## Design Philosophy
//!
//! Samples are stored as `u8`, so the `[0, 255]` range is a property of the
//! type rather than a convention each transform has to remember. Transforms
//! compute in wider types and convert back through [`pixel::round_f64`],
//! [`pixel::trunc_f64`] or [`pixel::clamp_i32`].
//!
//! ## Crate Structure
//!
//! ```text
//! rastr-core (this crate)
//!    ^
//!    |
//!    +-- rastr-ops (pointwise, filter, wavelet, histogram, levels, split, resize)
//!    +-- rastr-tests, rastr-bench
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` - Fill buffer rows on the rayon pool (enabled by default)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod error;
pub mod pixel;

// Re-exports for convenience
pub use buffer::PixelBuffer;
pub use error::{Error, Result};
pub use pixel::{Channel, Rgb, luminance_rec709};

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use rastr_core::prelude::*;
///
/// let buf = PixelBuffer::filled(2, 2, [1, 2, 3]);
/// assert_eq!(buf.pixel(0, 0)[Channel::Blue.index()], 3);
/// ```
pub mod prelude {
    pub use crate::buffer::PixelBuffer;
    pub use crate::error::{Error, Result};
    pub use crate::pixel::{
        Channel, REC709_LUMA, REC709_LUMA_B, REC709_LUMA_G, REC709_LUMA_R, Rgb,
        luminance_rec709,
    };
}
