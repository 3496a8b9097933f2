//! Before/after split-view compositing.
//!
//! A [`PreviewOp`] is applied to the whole source, then the columns left of
//! the split line are taken from the result and the rest from the source.
//! Transforming the full image first keeps border-sensitive operations
//! (convolution, histogram-driven colour correction) identical to their
//! standalone output.
//!
//! # Example
//!
//! ```rust
//! use rastr_core::PixelBuffer;
//! use rastr_ops::split::{split_view, PreviewOp};
//!
//! let src = PixelBuffer::filled(10, 2, [200, 40, 40]);
//! let out = split_view("greyscale".parse::<PreviewOp>()?, 30, &src)?;
//! assert_eq!(out.pixel(2, 0), [74, 74, 74]);
//! assert_eq!(out.pixel(3, 0), [200, 40, 40]);
//! # Ok::<(), rastr_ops::OpsError>(())
//! ```

use std::fmt;
use std::str::FromStr;

use rastr_core::pixel::CHANNELS;
use rastr_core::PixelBuffer;
use tracing::debug;

use crate::{OpsError, OpsResult, filter, histogram, levels, pointwise};

/// Levels preset used by [`PreviewOp::Levels`] as `(black, mid, white)`.
pub const LEVELS_PRESET: (i32, i32, i32) = (0, 128, 255);

/// Transform previewed by a split view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum PreviewOp {
    /// [`filter::blur`].
    #[default]
    Blur,
    /// [`filter::sharpen`].
    Sharpen,
    /// [`pointwise::greyscale`].
    Greyscale,
    /// [`pointwise::sepia`].
    Sepia,
    /// [`histogram::color_correct`].
    ColorCorrect,
    /// [`levels::levels_adjust`] with [`LEVELS_PRESET`].
    #[cfg_attr(feature = "serde", serde(rename = "levels-adjust"))]
    Levels,
}

impl PreviewOp {
    /// Every preview operation.
    pub const ALL: [PreviewOp; 6] = [
        PreviewOp::Blur,
        PreviewOp::Sharpen,
        PreviewOp::Greyscale,
        PreviewOp::Sepia,
        PreviewOp::ColorCorrect,
        PreviewOp::Levels,
    ];

    /// Tag accepted by [`FromStr`].
    pub const fn tag(self) -> &'static str {
        match self {
            PreviewOp::Blur => "blur",
            PreviewOp::Sharpen => "sharpen",
            PreviewOp::Greyscale => "greyscale",
            PreviewOp::Sepia => "sepia",
            PreviewOp::ColorCorrect => "color-correct",
            PreviewOp::Levels => "levels-adjust",
        }
    }

    /// Runs the operation on the full buffer.
    pub fn apply(self, src: &PixelBuffer) -> OpsResult<PixelBuffer> {
        Ok(match self {
            PreviewOp::Blur => filter::blur(src),
            PreviewOp::Sharpen => filter::sharpen(src),
            PreviewOp::Greyscale => pointwise::greyscale(src),
            PreviewOp::Sepia => pointwise::sepia(src),
            PreviewOp::ColorCorrect => histogram::color_correct(src),
            PreviewOp::Levels => {
                let (black, mid, white) = LEVELS_PRESET;
                levels::levels_adjust(src, black, mid, white)?
            }
        })
    }
}

impl fmt::Display for PreviewOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for PreviewOp {
    type Err = OpsError;

    fn from_str(s: &str) -> OpsResult<Self> {
        let s = s.trim();
        PreviewOp::ALL
            .into_iter()
            .find(|op| op.tag().eq_ignore_ascii_case(s))
            .ok_or_else(|| OpsError::invalid_argument(format!("unknown preview operation: {s:?}")))
    }
}

/// Split-view configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SplitView {
    /// Operation shown left of the split.
    pub op: PreviewOp,
    /// Share of the width, in percent, that shows the operation.
    pub percent: u32,
}

impl Default for SplitView {
    fn default() -> Self {
        Self {
            op: PreviewOp::default(),
            percent: 50,
        }
    }
}

impl SplitView {
    /// Creates a split view.
    pub fn new(op: PreviewOp, percent: u32) -> Self {
        Self { op, percent }
    }

    /// Renders the split view of `src`.
    ///
    /// # Errors
    ///
    /// See [`split_view`].
    pub fn apply(&self, src: &PixelBuffer) -> OpsResult<PixelBuffer> {
        split_view(self.op, self.percent, src)
    }
}

/// Shows `op` on the leftmost `percent` of the columns of `src`.
///
/// Columns `x < width * percent / 100` (integer division) come from the
/// transformed image.
///
/// # Errors
///
/// Returns [`OpsError::InvalidArgument`] if `percent > 100`.
pub fn split_view(op: PreviewOp, percent: u32, src: &PixelBuffer) -> OpsResult<PixelBuffer> {
    if percent > 100 {
        return Err(OpsError::invalid_argument(format!(
            "split percent {percent} outside 0..=100"
        )));
    }
    let column = (src.width() as u64 * percent as u64 / 100) as u32;
    debug!(width = src.width(), height = src.height(), %op, percent, column, "split view");
    let transformed = op.apply(src)?;
    composite_columns(&transformed, src, column)
}

/// Takes columns `x < column` from `left` and the rest from `right`.
///
/// # Errors
///
/// Returns a dimension mismatch if the buffers differ in size.
pub fn composite_columns(
    left: &PixelBuffer,
    right: &PixelBuffer,
    column: u32,
) -> OpsResult<PixelBuffer> {
    left.ensure_same_size(right)?;
    let cut = column.min(left.width()) as usize * CHANNELS;
    Ok(PixelBuffer::from_rows(left.width(), left.height(), |y, row| {
        row[..cut].copy_from_slice(&left.row(y)[..cut]);
        row[cut..].copy_from_slice(&right.row(y)[cut..]);
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(w: u32, h: u32) -> PixelBuffer {
        PixelBuffer::from_fn(w, h, |x, y| [(x * 25) as u8, (y * 40) as u8, 180])
    }

    #[test]
    fn test_tags_round_trip() {
        for op in PreviewOp::ALL {
            assert_eq!(op.to_string().parse::<PreviewOp>().unwrap(), op);
        }
        assert_eq!(" Color-Correct ".parse::<PreviewOp>().unwrap(), PreviewOp::ColorCorrect);
        assert!("emboss".parse::<PreviewOp>().unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_split_column() {
        let src = ramp(10, 4);
        let out = split_view(PreviewOp::Sepia, 45, &src).unwrap();
        let full = pointwise::sepia(&src);
        // 10 * 45 / 100 = 4
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(out.pixel(x, y), full.pixel(x, y));
            }
            for x in 4..10 {
                assert_eq!(out.pixel(x, y), src.pixel(x, y));
            }
        }
    }

    #[test]
    fn test_split_extremes() {
        let src = ramp(7, 3);
        assert_eq!(split_view(PreviewOp::Sharpen, 0, &src).unwrap(), src);
        assert_eq!(split_view(PreviewOp::Sharpen, 100, &src).unwrap(), filter::sharpen(&src));
        assert!(split_view(PreviewOp::Blur, 101, &src).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_border_matches_full_image() {
        // Pixels just left of the split see neighbours right of it
        let src = ramp(8, 8);
        let out = split_view(PreviewOp::Blur, 50, &src).unwrap();
        assert_eq!(out.pixel(3, 5), filter::blur(&src).pixel(3, 5));
    }

    #[test]
    fn test_levels_preset_is_identity() {
        let src = ramp(6, 6);
        assert_eq!(PreviewOp::Levels.apply(&src).unwrap(), src);
    }

    #[test]
    fn test_split_view_config() {
        let view = SplitView::default();
        assert_eq!(view.op, PreviewOp::Blur);
        assert_eq!(view.percent, 50);
        let src = ramp(4, 4);
        assert_eq!(
            SplitView::new(PreviewOp::Greyscale, 25).apply(&src).unwrap(),
            split_view(PreviewOp::Greyscale, 25, &src).unwrap()
        );
    }

    #[test]
    fn test_composite_mismatch() {
        let a = PixelBuffer::new(3, 3);
        let b = PixelBuffer::new(3, 4);
        assert!(composite_columns(&a, &b, 1).unwrap_err().is_dimension_mismatch());
    }
}
