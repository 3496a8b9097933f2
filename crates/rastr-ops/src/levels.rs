//! Three-point levels adjustment.
//!
//! A quadratic tone curve is fitted through `(black, 0)`, `(mid, 128)` and
//! `(white, 255)` and applied to every sample of every channel. The curve is
//! evaluated once per input level into a 256-entry table.
//!
//! Control points that admit no unique quadratic fall back to simpler shapes:
//!
//! - `black < white` with `mid` on an endpoint: straight line through
//!   `(black, 0)` and `(white, 255)`
//! - `black == white`: hard step, levels below go to 0, the rest to 255
//!
//! # Example
//!
//! ```rust
//! use rastr_ops::levels::ToneCurve;
//!
//! let curve = ToneCurve::fit(16, 120, 235)?;
//! assert_eq!(curve.map(16), 0);
//! assert_eq!(curve.map(120), 128);
//! assert_eq!(curve.map(235), 255);
//! # Ok::<(), rastr_ops::OpsError>(())
//! ```

use rastr_core::pixel::round_f64;
use rastr_core::PixelBuffer;
use tracing::{debug, trace};

use crate::{OpsError, OpsResult};

/// Output level of the black control point.
pub const BLACK_OUT: f64 = 0.0;
/// Output level of the mid control point.
pub const MID_OUT: f64 = 128.0;
/// Output level of the white control point.
pub const WHITE_OUT: f64 = 255.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape {
    Quadratic { a: f64, b: f64, c: f64 },
    Step { at: f64 },
}

/// Tone curve through the black, mid and white control points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneCurve {
    black: i32,
    mid: i32,
    white: i32,
    shape: Shape,
}

impl ToneCurve {
    /// Fits the curve for input levels `black <= mid <= white`.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidArgument`] unless
    /// `0 <= black <= mid <= white <= 255`.
    pub fn fit(black: i32, mid: i32, white: i32) -> OpsResult<Self> {
        if !(0 <= black && black <= mid && mid <= white && white <= 255) {
            return Err(OpsError::invalid_argument(format!(
                "levels must satisfy 0 <= black <= mid <= white <= 255, got {black}, {mid}, {white}"
            )));
        }

        let shape = if black == white {
            Shape::Step { at: black as f64 }
        } else if mid == black || mid == white {
            let slope = (WHITE_OUT - BLACK_OUT) / (white - black) as f64;
            Shape::Quadratic {
                a: 0.0,
                b: slope,
                c: BLACK_OUT - slope * black as f64,
            }
        } else {
            lagrange(
                [black as f64, mid as f64, white as f64],
                [BLACK_OUT, MID_OUT, WHITE_OUT],
            )
        };
        trace!(black, mid, white, ?shape, "tone curve");
        Ok(Self { black, mid, white, shape })
    }

    /// Control point input levels as `(black, mid, white)`.
    pub fn control_points(&self) -> (i32, i32, i32) {
        (self.black, self.mid, self.white)
    }

    /// Coefficients `(a, b, c)` of `a·x² + b·x + c`.
    ///
    /// `None` for a step curve.
    pub fn coefficients(&self) -> Option<(f64, f64, f64)> {
        match self.shape {
            Shape::Quadratic { a, b, c } => Some((a, b, c)),
            Shape::Step { .. } => None,
        }
    }

    /// Evaluates the curve without clamping.
    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        match self.shape {
            Shape::Quadratic { a, b, c } => (a * x + b) * x + c,
            Shape::Step { at } => {
                if x < at {
                    BLACK_OUT
                } else {
                    WHITE_OUT
                }
            }
        }
    }

    /// Maps one sample, rounding and clamping to `[0, 255]`.
    #[inline]
    pub fn map(&self, level: u8) -> u8 {
        round_f64(self.eval(level as f64))
    }

    /// Mapping for every input level.
    pub fn lut(&self) -> [u8; 256] {
        std::array::from_fn(|i| self.map(i as u8))
    }
}

/// Interpolating quadratic through three points with distinct `xs`.
fn lagrange(xs: [f64; 3], ys: [f64; 3]) -> Shape {
    let (mut a, mut b, mut c) = (0.0, 0.0, 0.0);
    for i in 0..3 {
        let xj = xs[(i + 1) % 3];
        let xk = xs[(i + 2) % 3];
        let w = ys[i] / ((xs[i] - xj) * (xs[i] - xk));
        a += w;
        b -= w * (xj + xk);
        c += w * xj * xk;
    }
    Shape::Quadratic { a, b, c }
}

/// Remaps every sample of `src` through [`ToneCurve::fit`]`(black, mid, white)`.
///
/// # Errors
///
/// Returns [`OpsError::InvalidArgument`] for out-of-order or out-of-range
/// control points.
pub fn levels_adjust(
    src: &PixelBuffer,
    black: i32,
    mid: i32,
    white: i32,
) -> OpsResult<PixelBuffer> {
    let curve = ToneCurve::fit(black, mid, white)?;
    debug!(width = src.width(), height = src.height(), black, mid, white, "levels adjust");
    let lut = curve.lut();
    Ok(src.map(|px| px.map(|s| lut[s as usize])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_identity_preset() {
        let curve = ToneCurve::fit(0, 128, 255).unwrap();
        let (a, b, c) = curve.coefficients().unwrap();
        assert_abs_diff_eq!(a, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c, 0.0, epsilon = 1e-9);

        let src = PixelBuffer::from_fn(16, 16, |x, y| [(x * 16 + y) as u8, (y * 16) as u8, 255]);
        assert_eq!(levels_adjust(&src, 0, 128, 255).unwrap(), src);
    }

    #[test]
    fn test_anchor_points_exact() {
        for (black, mid, white) in [(20, 100, 230), (1, 2, 254), (0, 30, 60), (100, 101, 102)] {
            let curve = ToneCurve::fit(black, mid, white).unwrap();
            assert_abs_diff_eq!(curve.eval(black as f64), 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(curve.eval(mid as f64), 128.0, epsilon = 1e-9);
            assert_abs_diff_eq!(curve.eval(white as f64), 255.0, epsilon = 1e-9);
            assert_eq!(curve.map(black as u8), 0);
            assert_eq!(curve.map(mid as u8), 128);
            assert_eq!(curve.map(white as u8), 255);
        }
    }

    #[test]
    fn test_extrapolation_clamps() {
        let curve = ToneCurve::fit(20, 100, 230).unwrap();
        let (a, _, _) = curve.coefficients().unwrap();
        assert!(a < 0.0);
        assert_eq!(curve.map(0), 0);
        assert_eq!(curve.map(255), 255);
    }

    #[test]
    fn test_mid_on_endpoint_is_linear() {
        let curve = ToneCurve::fit(50, 50, 200).unwrap();
        let (a, _, _) = curve.coefficients().unwrap();
        assert_abs_diff_eq!(a, 0.0);
        assert_eq!(curve.map(50), 0);
        assert_eq!(curve.map(110), 102);
        assert_eq!(curve.map(200), 255);
        assert_eq!(ToneCurve::fit(50, 200, 200).unwrap(), ToneCurve { mid: 200, ..curve });
    }

    #[test]
    fn test_black_equals_white_is_step() {
        let curve = ToneCurve::fit(100, 100, 100).unwrap();
        assert!(curve.coefficients().is_none());
        assert_eq!(curve.map(99), 0);
        assert_eq!(curve.map(100), 255);
        assert_eq!(curve.map(255), 255);
    }

    #[test]
    fn test_invalid_ordering() {
        for (black, mid, white) in [(10, 5, 200), (-1, 5, 200), (0, 5, 256), (200, 100, 50)] {
            let err = ToneCurve::fit(black, mid, white).unwrap_err();
            assert!(err.is_invalid_argument());
        }
        let src = PixelBuffer::new(2, 2);
        assert!(levels_adjust(&src, 30, 20, 10).is_err());
    }

    #[test]
    fn test_levels_adjust_per_channel() {
        let src = PixelBuffer::filled(3, 2, [20, 100, 230]);
        let out = levels_adjust(&src, 20, 100, 230).unwrap();
        assert_eq!(out.pixel(2, 1), [0, 128, 255]);
    }
}
