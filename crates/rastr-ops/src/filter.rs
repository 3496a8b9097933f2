//! Image filtering and convolution operations.
//!
//! # Kernels
//!
//! - [`Kernel::blur`] - 3x3 binomial (Gaussian-like) blur
//! - [`Kernel::sharpen`] - 5x5 with a negative outer ring and positive core
//!
//! # Edge Policy
//!
//! Taps that fall outside the buffer are skipped, and the weighted sum is
//! divided by the sum of the taps that were actually used. Borders are
//! therefore renormalized rather than darkened by missing neighbours. When
//! the used weights cancel to (nearly) zero the raw sum is kept.
//!
//! Results are truncated toward zero, then saturated into `0..=255`.
//!
//! # Example
//!
//! ```rust
//! use rastr_core::PixelBuffer;
//! use rastr_ops::filter::{convolve, Kernel};
//!
//! let src = PixelBuffer::filled(16, 16, [90, 120, 30]);
//! let blurred = convolve(&src, &Kernel::blur());
//! assert_eq!(blurred.pixel(0, 0), [90, 120, 30]);
//! ```

use rastr_core::pixel::{CHANNELS, trunc_f64};
use rastr_core::PixelBuffer;
use tracing::debug;

use crate::{OpsError, OpsResult};

/// Used-weight sums with magnitude below this are treated as zero.
const MIN_WEIGHT_SUM: f64 = 1e-9;

/// Absorbs floating-point noise before truncation, so an exact integer
/// result such as `36.999999999` still lands on 37.
const TRUNC_SLACK: f64 = 1e-9;

/// Convolution kernel for image filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    /// Kernel weights, row-major.
    pub data: Vec<f64>,
    /// Kernel width (odd).
    pub width: usize,
    /// Kernel height (odd).
    pub height: usize,
}

impl Kernel {
    /// Creates a new kernel from row-major weights.
    ///
    /// # Errors
    ///
    /// Width and height must be odd and `data` must hold `width * height`
    /// weights.
    pub fn new(data: Vec<f64>, width: usize, height: usize) -> OpsResult<Self> {
        if width % 2 == 0 || height % 2 == 0 {
            return Err(OpsError::invalid_argument(format!(
                "kernel dimensions must be odd, got {width}x{height}"
            )));
        }
        if data.len() != width * height {
            return Err(OpsError::invalid_argument(format!(
                "kernel data size {} doesn't match {}x{}",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self { data, width, height })
    }

    /// 3x3 blur: `[1 2 1; 2 4 2; 1 2 1] / 16`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rastr_ops::filter::Kernel;
    ///
    /// let k = Kernel::blur();
    /// assert_eq!(k.width, 3);
    /// assert!((k.sum() - 1.0).abs() < 1e-12);
    /// ```
    pub fn blur() -> Self {
        const C: f64 = 1.0 / 16.0;
        const E: f64 = 1.0 / 8.0;
        const M: f64 = 1.0 / 4.0;
        Self {
            data: vec![
                C, E, C,
                E, M, E,
                C, E, C,
            ],
            width: 3,
            height: 3,
        }
    }

    /// 5x5 sharpen: outer ring `-1/8`, inner 3x3 `1/4`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rastr_ops::filter::Kernel;
    ///
    /// let k = Kernel::sharpen();
    /// assert_eq!(k.width, 5);
    /// assert!((k.sum() - 0.25).abs() < 1e-12);
    /// ```
    pub fn sharpen() -> Self {
        const R: f64 = -1.0 / 8.0;
        const C: f64 = 1.0 / 4.0;
        Self {
            data: vec![
                R, R, R, R, R,
                R, C, C, C, R,
                R, C, C, C, R,
                R, C, C, C, R,
                R, R, R, R, R,
            ],
            width: 5,
            height: 5,
        }
    }

    /// Returns the kernel radius (half-size).
    #[inline]
    pub fn radius(&self) -> (usize, usize) {
        (self.width / 2, self.height / 2)
    }

    /// Nominal sum of all weights.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    #[inline]
    fn weight(&self, kx: usize, ky: usize) -> f64 {
        self.data[ky * self.width + kx]
    }
}

/// Correlates `kernel` with every pixel of `src`.
///
/// Output has the same dimensions as `src`. See the module docs for the
/// border renormalization rule. Fractional results are truncated.
///
/// # Example
///
/// ```rust
/// use rastr_core::PixelBuffer;
/// use rastr_ops::filter::{convolve, Kernel};
///
/// let src = PixelBuffer::filled(8, 8, [128, 64, 32]);
/// let result = convolve(&src, &Kernel::sharpen());
/// assert_eq!(result.dimensions(), (8, 8));
/// assert_eq!(result.pixel(7, 7), [128, 64, 32]);
/// ```
pub fn convolve(src: &PixelBuffer, kernel: &Kernel) -> PixelBuffer {
    let (width, height) = src.dimensions();
    debug!(width, height, kernel_w = kernel.width, kernel_h = kernel.height, "convolve");

    let (rx, ry) = kernel.radius();
    let (rx, ry) = (rx as i64, ry as i64);
    let (w, h) = (width as i64, height as i64);

    PixelBuffer::from_rows(width, height, |y, row| {
        let y = y as i64;
        for (x, out) in row.chunks_exact_mut(CHANNELS).enumerate() {
            let x = x as i64;
            let mut sums = [0.0f64; CHANNELS];
            let mut used = 0.0f64;

            for ky in 0..kernel.height {
                let sy = y + ky as i64 - ry;
                if sy < 0 || sy >= h {
                    continue;
                }
                for kx in 0..kernel.width {
                    let sx = x + kx as i64 - rx;
                    if sx < 0 || sx >= w {
                        continue;
                    }
                    let kw = kernel.weight(kx, ky);
                    let px = src.pixel(sx as u32, sy as u32);
                    for c in 0..CHANNELS {
                        sums[c] += px[c] as f64 * kw;
                    }
                    used += kw;
                }
            }

            let norm = if used.abs() < MIN_WEIGHT_SUM { 1.0 } else { used };
            for c in 0..CHANNELS {
                out[c] = trunc_f64(sums[c] / norm + TRUNC_SLACK);
            }
        }
    })
}

/// Applies [`Kernel::blur`].
pub fn blur(src: &PixelBuffer) -> PixelBuffer {
    convolve(src, &Kernel::blur())
}

/// Applies [`Kernel::sharpen`].
pub fn sharpen(src: &PixelBuffer) -> PixelBuffer {
    convolve(src, &Kernel::sharpen())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_kernel_new_validation() {
        assert!(Kernel::new(vec![1.0; 4], 2, 2).unwrap_err().is_invalid_argument());
        assert!(Kernel::new(vec![1.0; 8], 3, 3).unwrap_err().is_invalid_argument());
        let k = Kernel::new(vec![1.0; 15], 5, 3).unwrap();
        assert_eq!(k.radius(), (2, 1));
    }

    #[test]
    fn test_kernel_blur() {
        let k = Kernel::blur();
        assert_relative_eq!(k.sum(), 1.0);
        // Center should be highest
        assert!(k.data[4] > k.data[0]);
        assert_relative_eq!(k.data[1], 0.125);
    }

    #[test]
    fn test_kernel_sharpen() {
        let k = Kernel::sharpen();
        assert_eq!(k.data.len(), 25);
        assert_relative_eq!(k.data[0], -0.125);
        assert_relative_eq!(k.data[12], 0.25);
        // 9 * 1/4 - 16 * 1/8
        assert_relative_eq!(k.sum(), 0.25);
    }

    #[test]
    fn test_constant_survives_borders() {
        // Renormalization keeps a flat field flat everywhere, including corners
        let src = PixelBuffer::filled(9, 6, [37, 200, 255]);
        assert_eq!(blur(&src), src);
        assert_eq!(sharpen(&src), src);
    }

    #[test]
    fn test_blur_impulse() {
        let mut src = PixelBuffer::new(5, 5);
        src.set_pixel(2, 2, [160, 160, 160]);
        let out = blur(&src);
        assert_eq!(out.pixel(2, 2), [40, 40, 40]);
        assert_eq!(out.pixel(1, 2), [20, 20, 20]);
        assert_eq!(out.pixel(1, 1), [10, 10, 10]);
        assert_eq!(out.pixel(0, 0), [0, 0, 0]);
    }

    #[test]
    fn test_blur_corner_renormalized() {
        // Corner (0,0) uses taps weighing 4+2+2+1 = 9/16
        let mut src = PixelBuffer::new(3, 3);
        src.set_pixel(0, 0, [90, 90, 90]);
        let out = blur(&src);
        // 90 * (4/16) / (9/16) = 40
        assert_eq!(out.pixel(0, 0), [40, 40, 40]);
    }

    #[test]
    fn test_fraction_truncates() {
        // (1,0): (0 * 2 + 1 * 4) / 6 = 0.67; (0,0): (0 * 4 + 1 * 2) / 6 = 0.33
        let src = PixelBuffer::from_raw(2, 1, vec![0, 0, 0, 1, 1, 1]).unwrap();
        let out = blur(&src);
        assert_eq!(out.pixel(0, 0), [0, 0, 0]);
        assert_eq!(out.pixel(1, 0), [0, 0, 0]);

        // 400 / 6 = 66.67 and 800 / 6 = 133.33
        let src = PixelBuffer::from_raw(2, 1, vec![0, 0, 0, 200, 200, 200]).unwrap();
        let out = blur(&src);
        assert_eq!(out.pixel(0, 0), [66, 66, 66]);
        assert_eq!(out.pixel(1, 0), [133, 133, 133]);
    }

    #[test]
    fn test_sharpen_clamps() {
        let mut src = PixelBuffer::filled(7, 7, [100, 100, 100]);
        src.set_pixel(3, 3, [255, 255, 255]);
        let out = sharpen(&src);
        assert_eq!(out.pixel(3, 3), [255, 255, 255]);
        // Ring neighbours are pulled down but stay in range
        assert!(out.pixel(1, 1)[0] < 100);
    }

    #[test]
    fn test_single_pixel() {
        let src = PixelBuffer::filled(1, 1, [12, 34, 56]);
        assert_eq!(blur(&src), src);
        assert_eq!(sharpen(&src), src);
    }
}
