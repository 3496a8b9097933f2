//! Haar wavelet lossy compression.
//!
//! Each colour plane is padded to a power-of-two square, decomposed with a
//! multi-level 2D Haar transform, stripped of its smallest-magnitude
//! coefficients, and reconstructed. The output keeps the input dimensions;
//! nothing is encoded into a bitstream.
//!
//! # Pyramid
//!
//! Level `c` (starting at the padded size and halving down to 2) transforms
//! the first `c` entries of each of the first `c` rows, then of each of the
//! first `c` columns. One 1D step at length `n` writes `n / 2` averages
//! `(a[2i] + a[2i+1]) / √2` followed by `n / 2` differences
//! `(a[2i] - a[2i+1]) / √2`. The inverse walks the levels upward, columns
//! before rows. Both directions use the same `1/√2` scale, so the transform
//! is orthonormal.
//!
//! # Thresholding
//!
//! With `n` coefficients per plane and quality `q`, `k = n * (100 - q) / 1000`.
//! For `k > 0` the threshold is the magnitude at ascending rank `k`; every
//! coefficient strictly below it is zeroed. Ties with the threshold survive
//! together. Quality 100 gives `k = 0` and leaves the plane untouched.
//!
//! Because `k` is floored, a plane with fewer than ten coefficients is never
//! thresholded: a 1x2 buffer pads to a 2x2 plane, so even quality 0 keeps
//! all four coefficients and reconstructs the input. Thresholding starts at
//! the 4x4 plane.
//!
//! When the `parallel` feature is enabled the three planes are processed on
//! the rayon pool.
//!
//! # Example
//!
//! ```rust
//! use rastr_core::PixelBuffer;
//! use rastr_ops::wavelet::compress;
//!
//! let src = PixelBuffer::from_fn(8, 8, |x, y| [(x * 30) as u8, (y * 30) as u8, 90]);
//! assert_eq!(compress(&src, 100)?, src);
//! # Ok::<(), rastr_ops::OpsError>(())
//! ```

use std::f64::consts::FRAC_1_SQRT_2;

use rastr_core::pixel::round_f64;
use rastr_core::{Channel, PixelBuffer};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::{OpsError, OpsResult};

/// Highest accepted quality.
pub const MAX_QUALITY: u32 = 100;

/// One colour plane in the wavelet working representation.
///
/// A `size` x `size` row-major grid of reals, `size` a power of two.
#[derive(Debug, Clone, PartialEq)]
pub struct HaarPlane {
    data: Vec<f64>,
    size: usize,
}

impl HaarPlane {
    /// Creates a zero plane.
    ///
    /// `size` is rounded up to the next power of two.
    pub fn new(size: usize) -> Self {
        let size = size.next_power_of_two();
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Copies `channel` of `buf` into the top-left corner of a zero plane.
    ///
    /// `size` must be at least `max(width, height)`; it is rounded up to a
    /// power of two.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidArgument`] when the buffer does not fit.
    pub fn from_buffer(buf: &PixelBuffer, channel: Channel, size: usize) -> OpsResult<Self> {
        let (w, h) = (buf.width() as usize, buf.height() as usize);
        if w > size || h > size {
            return Err(OpsError::invalid_argument(format!(
                "{w}x{h} buffer does not fit a {size}x{size} plane"
            )));
        }
        let mut plane = Self::new(size);
        let c = channel.index();
        for (x, y, px) in buf.pixels() {
            plane.data[y as usize * plane.size + x as usize] = px[c] as f64;
        }
        Ok(plane)
    }

    /// Side length of the square plane.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Value at `(x, y)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.size + x]
    }

    /// All values, row-major.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Runs the full forward pyramid in place.
    pub fn forward(&mut self) {
        let mut scratch = vec![0.0; self.size];
        let mut column = vec![0.0; self.size];
        let mut c = self.size;
        while c > 1 {
            for y in 0..c {
                let row = y * self.size;
                haar_step(&mut self.data[row..row + c], &mut scratch);
            }
            for x in 0..c {
                self.read_column(x, &mut column[..c]);
                haar_step(&mut column[..c], &mut scratch);
                self.write_column(x, &column[..c]);
            }
            c /= 2;
        }
    }

    /// Runs the full inverse pyramid in place.
    pub fn inverse(&mut self) {
        let mut scratch = vec![0.0; self.size];
        let mut column = vec![0.0; self.size];
        let mut c = 2;
        while c <= self.size {
            for x in 0..c {
                self.read_column(x, &mut column[..c]);
                inverse_haar_step(&mut column[..c], &mut scratch);
                self.write_column(x, &column[..c]);
            }
            for y in 0..c {
                let row = y * self.size;
                inverse_haar_step(&mut self.data[row..row + c], &mut scratch);
            }
            c *= 2;
        }
    }

    /// Zeroes the smallest-magnitude coefficients for `quality` and returns
    /// how many fell below the threshold.
    ///
    /// Quality is clamped to [`MAX_QUALITY`].
    pub fn threshold(&mut self, quality: u32) -> usize {
        let n = self.data.len();
        let k = n * (MAX_QUALITY - quality.min(MAX_QUALITY)) as usize / 1000;
        if k == 0 {
            return 0;
        }

        let mut mags: Vec<f64> = self.data.iter().map(|v| v.abs()).collect();
        mags.sort_unstable_by(f64::total_cmp);
        let cutoff = mags[k];

        let mut zeroed = 0;
        for v in &mut self.data {
            if v.abs() < cutoff {
                *v = 0.0;
                zeroed += 1;
            }
        }
        trace!(k, cutoff, zeroed, "haar threshold");
        zeroed
    }

    fn read_column(&self, x: usize, out: &mut [f64]) {
        for (y, v) in out.iter_mut().enumerate() {
            *v = self.data[y * self.size + x];
        }
    }

    fn write_column(&mut self, x: usize, values: &[f64]) {
        for (y, v) in values.iter().enumerate() {
            self.data[y * self.size + x] = *v;
        }
    }
}

/// One forward Haar step over the whole of `a` (even length).
fn haar_step(a: &mut [f64], scratch: &mut [f64]) {
    let half = a.len() / 2;
    for i in 0..half {
        let (p, q) = (a[2 * i], a[2 * i + 1]);
        scratch[i] = (p + q) * FRAC_1_SQRT_2;
        scratch[half + i] = (p - q) * FRAC_1_SQRT_2;
    }
    a.copy_from_slice(&scratch[..a.len()]);
}

/// Inverse of [`haar_step`].
fn inverse_haar_step(a: &mut [f64], scratch: &mut [f64]) {
    let half = a.len() / 2;
    for i in 0..half {
        let (s, d) = (a[i], a[half + i]);
        scratch[2 * i] = (s + d) * FRAC_1_SQRT_2;
        scratch[2 * i + 1] = (s - d) * FRAC_1_SQRT_2;
    }
    a.copy_from_slice(&scratch[..a.len()]);
}

/// Summary of one [`compress_with_stats`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompressionStats {
    /// Side of the padded square plane.
    pub padded_size: usize,
    /// `padded_size * padded_size`.
    pub coefficients_per_channel: usize,
    /// Coefficients zeroed per channel, in `R, G, B` order.
    pub zeroed: [usize; 3],
}

impl CompressionStats {
    /// Zeroed coefficients across all channels.
    pub fn total_zeroed(&self) -> usize {
        self.zeroed.iter().sum()
    }
}

/// Compresses `src` at `quality` (0..=100).
///
/// # Errors
///
/// Returns [`OpsError::InvalidArgument`] if `quality > 100`.
pub fn compress(src: &PixelBuffer, quality: u32) -> OpsResult<PixelBuffer> {
    compress_with_stats(src, quality).map(|(buf, _)| buf)
}

/// Like [`compress`], also reporting how many coefficients were dropped.
///
/// # Example
///
/// ```rust
/// use rastr_core::PixelBuffer;
/// use rastr_ops::wavelet::compress_with_stats;
///
/// let src = PixelBuffer::filled(5, 3, [40, 80, 120]);
/// let (out, stats) = compress_with_stats(&src, 50)?;
/// assert_eq!(out.dimensions(), (5, 3));
/// assert_eq!(stats.padded_size, 8);
/// # Ok::<(), rastr_ops::OpsError>(())
/// ```
pub fn compress_with_stats(
    src: &PixelBuffer,
    quality: u32,
) -> OpsResult<(PixelBuffer, CompressionStats)> {
    if quality > MAX_QUALITY {
        return Err(OpsError::invalid_argument(format!(
            "quality {quality} outside 0..={MAX_QUALITY}"
        )));
    }
    let (width, height) = src.dimensions();
    debug!(width, height, quality, "wavelet compress");
    if src.is_empty() {
        return Ok((src.clone(), CompressionStats::default()));
    }

    let size = (width.max(height) as usize).next_power_of_two();
    let planes = compress_planes(src, size, quality)?;

    let mut stats = CompressionStats {
        padded_size: size,
        coefficients_per_channel: size * size,
        zeroed: [0; 3],
    };
    for (slot, (_, zeroed)) in stats.zeroed.iter_mut().zip(&planes) {
        *slot = *zeroed;
    }

    let out = PixelBuffer::from_fn(width, height, |x, y| {
        let (x, y) = (x as usize, y as usize);
        [0, 1, 2].map(|c| round_f64(planes[c].0.get(x, y)))
    });
    Ok((out, stats))
}

fn compress_plane(
    src: &PixelBuffer,
    channel: Channel,
    size: usize,
    quality: u32,
) -> OpsResult<(HaarPlane, usize)> {
    let mut plane = HaarPlane::from_buffer(src, channel, size)?;
    plane.forward();
    let zeroed = plane.threshold(quality);
    plane.inverse();
    trace!(%channel, zeroed, "wavelet channel");
    Ok((plane, zeroed))
}

#[cfg(feature = "parallel")]
fn compress_planes(
    src: &PixelBuffer,
    size: usize,
    quality: u32,
) -> OpsResult<Vec<(HaarPlane, usize)>> {
    Channel::ALL[..]
        .par_iter()
        .map(|&channel| compress_plane(src, channel, size, quality))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn compress_planes(
    src: &PixelBuffer,
    size: usize,
    quality: u32,
) -> OpsResult<Vec<(HaarPlane, usize)>> {
    Channel::ALL
        .iter()
        .map(|&channel| compress_plane(src, channel, size, quality))
        .collect()
}
