//! Bilinear resampling.
//!
//! Target pixel `(x, y)` samples the source at
//! `(x * src_w / dst_w, y * src_h / dst_h)`, blending the four surrounding
//! pixels. Neighbours past the right or bottom edge are clamped to the last
//! row or column. Equal source and target sizes reproduce the source
//! exactly.
//!
//! # Example
//!
//! ```rust
//! use rastr_core::PixelBuffer;
//! use rastr_ops::resize::{downscale, fit_dimensions};
//!
//! let src = PixelBuffer::filled(64, 48, [10, 20, 30]);
//! let (w, h) = fit_dimensions(64, 48, 16, 16);
//! let thumb = downscale(&src, w, h)?;
//! assert_eq!(thumb.dimensions(), (16, 12));
//! # Ok::<(), rastr_ops::OpsError>(())
//! ```

use rastr_core::pixel::{CHANNELS, round_f64};
use rastr_core::PixelBuffer;
use tracing::debug;

use crate::{OpsError, OpsResult};

/// Resamples `src` to `width` x `height` with bilinear interpolation.
///
/// Works in both directions despite the name.
///
/// # Errors
///
/// Returns [`OpsError::InvalidArgument`] if a target dimension is zero, or
/// if `src` is empty.
pub fn downscale(src: &PixelBuffer, width: u32, height: u32) -> OpsResult<PixelBuffer> {
    if width == 0 || height == 0 {
        return Err(OpsError::invalid_argument(format!(
            "target size {width}x{height} must be non-zero"
        )));
    }
    if src.is_empty() {
        return Err(OpsError::invalid_argument(format!(
            "cannot resample empty {}x{} buffer",
            src.width(),
            src.height()
        )));
    }

    let (src_w, src_h) = src.dimensions();
    debug!(src_w, src_h, width, height, "bilinear resample");

    let x_ratio = src_w as f64 / width as f64;
    let y_ratio = src_h as f64 / height as f64;

    Ok(PixelBuffer::from_rows(width, height, |y, row| {
        let (y0, y1, fy) = neighbours(y, y_ratio, src_h);
        for (x, out) in row.chunks_exact_mut(CHANNELS).enumerate() {
            let (x0, x1, fx) = neighbours(x as u32, x_ratio, src_w);

            let p00 = src.pixel(x0, y0);
            let p10 = src.pixel(x1, y0);
            let p01 = src.pixel(x0, y1);
            let p11 = src.pixel(x1, y1);

            for c in 0..CHANNELS {
                let top = p00[c] as f64 * (1.0 - fx) + p10[c] as f64 * fx;
                let bot = p01[c] as f64 * (1.0 - fx) + p11[c] as f64 * fx;
                out[c] = round_f64(top * (1.0 - fy) + bot * fy);
            }
        }
    }))
}

/// Source index pair and blend weight for target coordinate `t`.
#[inline]
fn neighbours(t: u32, ratio: f64, len: u32) -> (u32, u32, f64) {
    let s = t as f64 * ratio;
    let i0 = (s.floor() as u32).min(len - 1);
    let i1 = (i0 + 1).min(len - 1);
    (i0, i1, s - i0 as f64)
}

/// Calculates the aspect-preserving dimensions that fit inside a box.
///
/// Each side is at least 1; an empty source yields `(0, 0)`.
///
/// # Example
///
/// ```rust
/// use rastr_ops::resize::fit_dimensions;
///
/// // Fit 1920x1080 into 640x480 box
/// let (w, h) = fit_dimensions(1920, 1080, 640, 480);
/// assert_eq!((w, h), (640, 360)); // Letterboxed
/// ```
pub fn fit_dimensions(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if src_w == 0 || src_h == 0 {
        return (0, 0);
    }
    let scale_w = max_w as f64 / src_w as f64;
    let scale_h = max_h as f64 / src_h as f64;
    let scale = scale_w.min(scale_h);

    let new_w = ((src_w as f64 * scale).round() as u32).max(1);
    let new_h = ((src_h as f64 * scale).round() as u32).max(1);

    (new_w, new_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(w: u32, h: u32) -> PixelBuffer {
        PixelBuffer::from_fn(w, h, |x, y| {
            if (x + y) % 2 == 0 { [250, 10, 90] } else { [5, 200, 33] }
        })
    }

    #[test]
    fn test_same_size_identity() {
        let src = checker(9, 5);
        assert_eq!(downscale(&src, 9, 5).unwrap(), src);
    }

    #[test]
    fn test_constant_upscale() {
        let src = PixelBuffer::filled(3, 3, [77, 128, 201]);
        let dst = downscale(&src, 8, 7).unwrap();
        assert_eq!(dst, PixelBuffer::filled(8, 7, [77, 128, 201]));
    }

    #[test]
    fn test_half_size_samples_even_pixels() {
        let src = PixelBuffer::from_fn(4, 4, |x, y| [(x * 10) as u8, (y * 10) as u8, 0]);
        let dst = downscale(&src, 2, 2).unwrap();
        assert_eq!(dst.pixel(0, 0), [0, 0, 0]);
        assert_eq!(dst.pixel(1, 0), [20, 0, 0]);
        assert_eq!(dst.pixel(1, 1), [20, 20, 0]);
    }

    #[test]
    fn test_upscale_interpolates_and_clamps_edge() {
        let src = PixelBuffer::from_raw(2, 1, vec![0, 0, 0, 100, 100, 100]).unwrap();
        let dst = downscale(&src, 4, 1).unwrap();
        let reds: Vec<u8> = (0..4).map(|x| dst.pixel(x, 0)[0]).collect();
        assert_eq!(reds, [0, 50, 100, 100]);
    }

    #[test]
    fn test_invalid_targets() {
        let src = checker(4, 4);
        assert!(downscale(&src, 0, 4).unwrap_err().is_invalid_argument());
        assert!(downscale(&src, 4, 0).unwrap_err().is_invalid_argument());
        assert!(downscale(&PixelBuffer::new(0, 3), 2, 2).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_fit_dimensions() {
        // Wide image into square box
        assert_eq!(fit_dimensions(1920, 1080, 512, 512), (512, 288));
        // Tall image into wide box
        assert_eq!(fit_dimensions(300, 600, 400, 200), (100, 200));
        assert_eq!(fit_dimensions(1000, 1, 10, 10), (10, 1));
        assert_eq!(fit_dimensions(0, 5, 10, 10), (0, 0));
    }
}
