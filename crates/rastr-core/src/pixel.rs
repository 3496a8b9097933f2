//! Pixel and sample types.
//!
//! A pixel is three 8-bit samples in `[R, G, B]` order. All arithmetic that
//! can leave `0..=255` (convolution sums, wavelet reconstruction, tone
//! curves) happens in a wider type and comes back through one of the
//! conversions here, so the sample range is enforced at the point of write.
//!
//! # Types
//!
//! - [`Rgb`] - one pixel
//! - [`Channel`] - one of the three color planes
//!
//! # Conversions
//!
//! - [`clamp_i32`] - saturate an integer into a sample
//! - [`round_f64`] - round to nearest, then saturate
//! - [`trunc_f64`] - truncate toward zero, then saturate

use std::fmt;

/// One pixel: `[R, G, B]`.
pub type Rgb = [u8; 3];

/// Number of samples per pixel.
pub const CHANNELS: usize = 3;

/// Largest sample value.
pub const SAMPLE_MAX: u8 = u8::MAX;

// ============================================================================
// Rec.709 Luminance Constants
// ============================================================================

/// Rec.709 luminance coefficient for red channel.
///
/// Used in the standard luminance formula: `Y = 0.2126*R + 0.7152*G + 0.0722*B`
pub const REC709_LUMA_R: f64 = 0.2126;

/// Rec.709 luminance coefficient for green channel.
pub const REC709_LUMA_G: f64 = 0.7152;

/// Rec.709 luminance coefficient for blue channel.
pub const REC709_LUMA_B: f64 = 0.0722;

/// Rec.709 luminance coefficients as an array [R, G, B].
pub const REC709_LUMA: [f64; 3] = [REC709_LUMA_R, REC709_LUMA_G, REC709_LUMA_B];

/// Calculate Rec.709 luminance of an 8-bit pixel, unrounded.
///
/// # Example
/// ```
/// use rastr_core::pixel::luminance_rec709;
/// let luma = luminance_rec709([100, 100, 100]);
/// assert!((luma - 100.0).abs() < 1e-9);
/// ```
#[inline]
pub fn luminance_rec709(rgb: Rgb) -> f64 {
    rgb[0] as f64 * REC709_LUMA_R + rgb[1] as f64 * REC709_LUMA_G + rgb[2] as f64 * REC709_LUMA_B
}

/// Saturates an integer into `0..=255`.
#[inline]
pub fn clamp_i32(v: i32) -> u8 {
    v.clamp(0, SAMPLE_MAX as i32) as u8
}

/// Rounds to nearest (half away from zero) and saturates into `0..=255`.
///
/// NaN maps to 0.
#[inline]
pub fn round_f64(v: f64) -> u8 {
    // `as` saturates and maps NaN to 0
    v.round().clamp(0.0, SAMPLE_MAX as f64) as u8
}

/// Truncates toward zero and saturates into `0..=255`.
#[inline]
pub fn trunc_f64(v: f64) -> u8 {
    v.trunc().clamp(0.0, SAMPLE_MAX as f64) as u8
}

/// One of the three color planes of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Red plane (sample 0).
    Red,
    /// Green plane (sample 1).
    Green,
    /// Blue plane (sample 2).
    Blue,
}

impl Channel {
    /// All channels in storage order.
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Sample index within an [`Rgb`].
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }

    /// Lowercase channel name.
    pub const fn name(self) -> &'static str {
        match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_luma_weights_sum_to_one() {
        assert_relative_eq!(REC709_LUMA.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(luminance_rec709([255, 255, 255]), 255.0, epsilon = 1e-9);
        assert_relative_eq!(luminance_rec709([255, 0, 0]), 54.213, epsilon = 1e-9);
    }

    #[test]
    fn test_clamp_conversions() {
        assert_eq!(clamp_i32(-5), 0);
        assert_eq!(clamp_i32(300), 255);
        assert_eq!(clamp_i32(17), 17);

        assert_eq!(round_f64(127.5), 128);
        assert_eq!(round_f64(127.49), 127);
        assert_eq!(round_f64(-0.7), 0);
        assert_eq!(round_f64(1e9), 255);
        assert_eq!(round_f64(f64::NAN), 0);

        assert_eq!(trunc_f64(127.99), 127);
        assert_eq!(trunc_f64(344.3), 255);
        assert_eq!(trunc_f64(-3.0), 0);
    }

    #[test]
    fn test_channel_index() {
        let idx: Vec<usize> = Channel::ALL.iter().map(|c| c.index()).collect();
        assert_eq!(idx, vec![0, 1, 2]);
        assert_eq!(Channel::Green.to_string(), "green");
    }
}
