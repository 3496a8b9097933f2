//! Per-pixel transforms.
//!
//! Every output pixel depends only on the input pixel(s) at the same
//! coordinates (flips only remap addresses). Each function allocates a new
//! buffer; inputs are never modified.
//!
//! # Operations
//!
//! - [`brighten`] - Add a signed offset to every sample
//! - [`flip_horizontal`], [`flip_vertical`] - Mirror addressing
//! - [`greyscale`] / [`luma`] - Rec.709 weighted grey
//! - [`value`], [`intensity`] - HSV value and channel mean, as grey
//! - [`sepia`] - Fixed sepia tone matrix
//! - [`extract`] - Broadcast one [`Component`] to all channels
//! - [`split_channels`], [`combine`] - Channel split and recombination
//!
//! # Example
//!
//! ```rust
//! use rastr_core::PixelBuffer;
//! use rastr_ops::pointwise::{brighten, Component, extract};
//!
//! let buf = PixelBuffer::filled(2, 2, [200, 100, 50]);
//! assert_eq!(brighten(&buf, 100).pixel(0, 0), [255, 200, 150]);
//! assert_eq!(extract(&buf, Component::Green).pixel(1, 1), [100, 100, 100]);
//! ```

use std::fmt;
use std::str::FromStr;

use rastr_core::pixel::{clamp_i32, luminance_rec709, round_f64, trunc_f64};
use rastr_core::{Channel, PixelBuffer, Rgb};
use tracing::debug;

use crate::{OpsError, OpsResult};

/// Sepia tone matrix, rows produce R', G', B'.
pub const SEPIA_MATRIX: [[f64; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// A scalar derived from a pixel, displayed as grey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Component {
    /// Red sample.
    Red,
    /// Green sample.
    Green,
    /// Blue sample.
    Blue,
    /// `max(R, G, B)`.
    Value,
    /// `floor((R + G + B) / 3)`.
    Intensity,
    /// `round(0.2126 R + 0.7152 G + 0.0722 B)`.
    Luma,
}

impl Component {
    /// All components, in tag order.
    pub const ALL: [Component; 6] = [
        Component::Red,
        Component::Green,
        Component::Blue,
        Component::Value,
        Component::Intensity,
        Component::Luma,
    ];

    /// Evaluates the component for one pixel.
    #[inline]
    pub fn of(self, [r, g, b]: Rgb) -> u8 {
        match self {
            Component::Red => r,
            Component::Green => g,
            Component::Blue => b,
            Component::Value => r.max(g).max(b),
            Component::Intensity => ((r as u16 + g as u16 + b as u16) / 3) as u8,
            Component::Luma => round_f64(luminance_rec709([r, g, b])),
        }
    }

    /// Tag used by [`FromStr`] and [`fmt::Display`].
    pub const fn tag(self) -> &'static str {
        match self {
            Component::Red => "red",
            Component::Green => "green",
            Component::Blue => "blue",
            Component::Value => "value",
            Component::Intensity => "intensity",
            Component::Luma => "luma",
        }
    }
}

impl From<Channel> for Component {
    fn from(channel: Channel) -> Self {
        match channel {
            Channel::Red => Component::Red,
            Channel::Green => Component::Green,
            Channel::Blue => Component::Blue,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Component {
    type Err = OpsError;

    fn from_str(s: &str) -> OpsResult<Self> {
        Component::ALL
            .into_iter()
            .find(|c| c.tag().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| OpsError::invalid_argument(format!("unknown component: {s:?}")))
    }
}

/// Adds `delta` to every sample, saturating at 0 and 255.
///
/// Any `i32` is accepted; the sum itself saturates before clamping.
pub fn brighten(src: &PixelBuffer, delta: i32) -> PixelBuffer {
    debug!(width = src.width(), height = src.height(), delta, "brighten");
    src.map(|px| px.map(|s| clamp_i32((s as i32).saturating_add(delta))))
}

/// Mirrors the buffer left to right: `out[x, y] = in[w - 1 - x, y]`.
pub fn flip_horizontal(src: &PixelBuffer) -> PixelBuffer {
    let w = src.width();
    PixelBuffer::from_fn(w, src.height(), |x, y| src.pixel(w - 1 - x, y))
}

/// Mirrors the buffer top to bottom: `out[x, y] = in[x, h - 1 - y]`.
pub fn flip_vertical(src: &PixelBuffer) -> PixelBuffer {
    let h = src.height();
    PixelBuffer::from_fn(src.width(), h, |x, y| src.pixel(x, h - 1 - y))
}

/// Broadcasts `component` of every pixel to all three channels.
pub fn extract(src: &PixelBuffer, component: Component) -> PixelBuffer {
    debug!(width = src.width(), height = src.height(), %component, "extract");
    src.map(|px| [component.of(px); 3])
}

/// Rec.709 weighted greyscale.
pub fn greyscale(src: &PixelBuffer) -> PixelBuffer {
    extract(src, Component::Luma)
}

/// Luma visualization; identical to [`greyscale`].
pub fn luma(src: &PixelBuffer) -> PixelBuffer {
    greyscale(src)
}

/// Per-pixel channel maximum, as grey.
pub fn value(src: &PixelBuffer) -> PixelBuffer {
    extract(src, Component::Value)
}

/// Per-pixel channel mean (floored), as grey.
pub fn intensity(src: &PixelBuffer) -> PixelBuffer {
    extract(src, Component::Intensity)
}

/// Applies [`SEPIA_MATRIX`], truncating each result and saturating at 255.
pub fn sepia(src: &PixelBuffer) -> PixelBuffer {
    debug!(width = src.width(), height = src.height(), "sepia");
    src.map(|[r, g, b]| {
        let (r, g, b) = (r as f64, g as f64, b as f64);
        SEPIA_MATRIX.map(|row| trunc_f64(row[0] * r + row[1] * g + row[2] * b))
    })
}

/// Extracts red, green and blue as three grey buffers.
pub fn split_channels(src: &PixelBuffer) -> [PixelBuffer; 3] {
    Channel::ALL.map(|c| extract(src, c.into()))
}

/// Builds a buffer whose channel `i` comes from channel `i` of the `i`-th input.
///
/// Grey buffers from [`split_channels`] recombine to the original.
///
/// # Errors
///
/// Returns a dimension mismatch if the three inputs differ in size.
pub fn combine(
    red: &PixelBuffer,
    green: &PixelBuffer,
    blue: &PixelBuffer,
) -> OpsResult<PixelBuffer> {
    red.ensure_same_size(green)?;
    red.ensure_same_size(blue)?;
    debug!(width = red.width(), height = red.height(), "combine");
    Ok(PixelBuffer::from_fn(red.width(), red.height(), |x, y| {
        [red.pixel(x, y)[0], green.pixel(x, y)[1], blue.pixel(x, y)[2]]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> PixelBuffer {
        PixelBuffer::from_fn(w, h, |x, y| {
            [(x * 37 % 256) as u8, (y * 53 % 256) as u8, ((x + y) * 11 % 256) as u8]
        })
    }

    #[test]
    fn test_brighten_scenario() {
        let src = PixelBuffer::from_raw(
            2,
            2,
            vec![10, 10, 10, 200, 200, 200, 10, 10, 10, 200, 200, 200],
        )
        .unwrap();
        let out = brighten(&src, 50);
        assert_eq!(
            out.as_raw(),
            &[60, 60, 60, 250, 250, 250, 60, 60, 60, 250, 250, 250]
        );
        assert_eq!(brighten(&src, 100).pixel(1, 0), [255, 255, 255]);
        assert_eq!(brighten(&src, -20).pixel(0, 0), [0, 0, 0]);
    }

    #[test]
    fn test_brighten_extreme_delta() {
        let src = PixelBuffer::filled(2, 1, [10, 128, 250]);
        assert_eq!(brighten(&src, i32::MAX).pixel(0, 0), [255, 255, 255]);
        assert_eq!(brighten(&src, i32::MIN).pixel(1, 0), [0, 0, 0]);
        assert_eq!(brighten(&src, i32::MAX - 5).pixel(1, 0), [255, 255, 255]);
    }

    #[test]
    fn test_flip_addressing() {
        let src = gradient(5, 3);
        let h = flip_horizontal(&src);
        let v = flip_vertical(&src);
        assert_eq!(h.pixel(0, 1), src.pixel(4, 1));
        assert_eq!(v.pixel(3, 0), src.pixel(3, 2));
        assert_eq!(flip_horizontal(&h), src);
        assert_eq!(flip_vertical(&v), src);
    }

    #[test]
    fn test_greyscale_rounds() {
        let src = PixelBuffer::filled(1, 1, [255, 0, 0]);
        // 0.2126 * 255 = 54.213
        assert_eq!(greyscale(&src).pixel(0, 0), [54, 54, 54]);
        let src = PixelBuffer::filled(1, 1, [0, 255, 0]);
        // 0.7152 * 255 = 182.376
        assert_eq!(greyscale(&src).pixel(0, 0), [182, 182, 182]);
        let src = PixelBuffer::filled(1, 1, [10, 20, 30]);
        assert_eq!(luma(&src), greyscale(&src));
    }

    #[test]
    fn test_value_and_intensity() {
        let src = PixelBuffer::filled(2, 1, [10, 200, 31]);
        assert_eq!(value(&src).pixel(1, 0), [200, 200, 200]);
        // (10 + 200 + 31) / 3 = 80.33
        assert_eq!(intensity(&src).pixel(0, 0), [80, 80, 80]);
    }

    #[test]
    fn test_sepia_saturates() {
        let white = PixelBuffer::filled(1, 1, [255, 255, 255]);
        assert_eq!(sepia(&white).pixel(0, 0), [255, 255, 238]);
        let src = PixelBuffer::filled(1, 1, [100, 50, 20]);
        // 39.3 + 38.45 + 3.78 = 81.53; 34.9 + 34.3 + 3.36 = 72.56; 27.2 + 26.7 + 2.62 = 56.52
        assert_eq!(sepia(&src).pixel(0, 0), [81, 72, 56]);
    }

    #[test]
    fn test_component_tags() {
        for c in Component::ALL {
            assert_eq!(c.tag().parse::<Component>().unwrap(), c);
        }
        assert_eq!("BLUE".parse::<Component>().unwrap(), Component::Blue);
        assert!("alpha".parse::<Component>().unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_split_then_combine() {
        let src = gradient(7, 4);
        let [r, g, b] = split_channels(&src);
        assert_eq!(r.pixel(3, 2), [src.pixel(3, 2)[0]; 3]);
        assert_eq!(combine(&r, &g, &b).unwrap(), src);
    }

    #[test]
    fn test_combine_takes_own_channel() {
        let r = PixelBuffer::filled(2, 2, [1, 2, 3]);
        let g = PixelBuffer::filled(2, 2, [4, 5, 6]);
        let b = PixelBuffer::filled(2, 2, [7, 8, 9]);
        assert_eq!(combine(&r, &g, &b).unwrap().pixel(1, 1), [1, 5, 9]);
    }

    #[test]
    fn test_combine_dimension_mismatch() {
        let a = PixelBuffer::new(2, 2);
        let b = PixelBuffer::new(2, 3);
        assert!(combine(&a, &a, &b).unwrap_err().is_dimension_mismatch());
        assert!(combine(&b, &a, &a).unwrap_err().is_dimension_mismatch());
    }

    #[test]
    fn test_input_untouched() {
        let src = gradient(4, 4);
        let before = src.clone();
        let _ = sepia(&src);
        let _ = brighten(&src, 40);
        let _ = flip_horizontal(&src);
        assert_eq!(src, before);
    }
}
