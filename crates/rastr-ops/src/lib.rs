//! # rastr-ops
//!
//! Raster transforms over [`rastr_core::PixelBuffer`].
//!
//! Every operation takes its input by reference and returns a freshly
//! allocated buffer; inputs are never modified. Operations with a validated
//! parameter or several input buffers return [`OpsResult`].
//!
//! # Modules
//!
//! - [`pointwise`] - Brightness, flips, greyscale, sepia, channel split/combine
//! - [`filter`] - Kernel convolution with border renormalization
//! - [`wavelet`] - Haar wavelet lossy compression
//! - [`histogram`] - Histograms, histogram plots, colour balance
//! - [`levels`] - Three-point quadratic tone curve
//! - [`split`] - Before/after split view
//! - [`resize`] - Bilinear resampling
//!
//! # Example
//!
//! ```rust
//! use rastr_core::PixelBuffer;
//! use rastr_ops::{filter, pointwise, wavelet};
//!
//! let src = PixelBuffer::from_fn(32, 32, |x, y| [(x * 8) as u8, (y * 8) as u8, 128]);
//! let soft = filter::blur(&src);
//! let grey = pointwise::greyscale(&soft);
//! let small = wavelet::compress(&grey, 80)?;
//! assert_eq!(small.dimensions(), (32, 32));
//! # Ok::<(), rastr_ops::OpsError>(())
//! ```
//!
//! # Feature Flags
//!
//! - `parallel` - Row-parallel output and per-channel wavelet planes via rayon (default)
//! - `serde` - `Serialize`/`Deserialize` for configuration types
//!
//! # Logging
//!
//! Operations emit `tracing` events (`debug` on entry, `trace` for inner
//! detail). No subscriber is installed here.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod filter;
pub mod histogram;
pub mod levels;
pub mod pointwise;
pub mod resize;
pub mod split;
pub mod wavelet;

pub use error::{OpsError, OpsResult};
pub use filter::Kernel;
pub use histogram::{Histogram, HistogramStyle};
pub use levels::ToneCurve;
pub use pointwise::Component;
pub use split::{PreviewOp, SplitView};
pub use wavelet::CompressionStats;
