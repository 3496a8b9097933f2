//! Per-channel histograms, histogram plots and peak-based colour balance.
//!
//! # Operations
//!
//! - [`Histogram::compute`] - 256-bucket frequency counts for R, G and B
//! - [`render_histogram`] - 256x256 line plot of the three distributions
//! - [`color_correct`] - Align the dominant level of each channel
//! - [`draw_line`] - Clipped integer Bresenham line
//!
//! # Example
//!
//! ```rust
//! use rastr_core::{Channel, PixelBuffer};
//! use rastr_ops::histogram::{render_histogram, Histogram};
//!
//! let buf = PixelBuffer::filled(4, 4, [12, 200, 90]);
//! let hist = Histogram::compute(&buf);
//! assert_eq!(hist.channel(Channel::Green)[200], 16);
//!
//! let plot = render_histogram(&buf);
//! assert_eq!(plot.dimensions(), (256, 256));
//! ```

use std::ops::RangeInclusive;

use rastr_core::pixel::{CHANNELS, clamp_i32};
use rastr_core::{Channel, PixelBuffer, Rgb};
use tracing::{debug, trace};

/// Number of buckets per channel.
pub const BUCKETS: usize = 256;

/// Width and height of a rendered histogram.
pub const HISTOGRAM_SIZE: u32 = 256;

/// Default distance between grid lines.
pub const GRID_SPACING: u32 = 32;

/// Levels searched by [`color_correct`]; excludes near-black and near-white.
pub const PEAK_SEARCH: RangeInclusive<u8> = 10..=245;

/// Frequency counts for the three channels of one buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: [[u32; BUCKETS]; CHANNELS],
}

impl Histogram {
    /// Counts every sample of `buf`.
    pub fn compute(buf: &PixelBuffer) -> Self {
        let mut bins = [[0u32; BUCKETS]; CHANNELS];
        for px in buf.as_raw().chunks_exact(CHANNELS) {
            for (c, &v) in px.iter().enumerate() {
                bins[c][v as usize] += 1;
            }
        }
        Self { bins }
    }

    /// Buckets of one channel.
    #[inline]
    pub fn channel(&self, channel: Channel) -> &[u32; BUCKETS] {
        &self.bins[channel.index()]
    }

    /// Largest bucket across all three channels.
    pub fn max_frequency(&self) -> u32 {
        self.bins.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Sum of all buckets of one channel; equals the pixel count.
    pub fn total(&self, channel: Channel) -> u64 {
        self.channel(channel).iter().map(|&n| n as u64).sum()
    }

    /// Most frequent level of `channel` within `range`.
    ///
    /// The lowest level wins ties, and an all-zero range yields its start.
    pub fn peak(&self, channel: Channel, range: RangeInclusive<u8>) -> u8 {
        let bins = self.channel(channel);
        let mut best = *range.start();
        for level in range {
            if bins[level as usize] > bins[best as usize] {
                best = level;
            }
        }
        best
    }
}

/// Colours and grid of a rendered histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HistogramStyle {
    /// Fill colour.
    pub background: Rgb,
    /// Grid line colour.
    pub grid: Rgb,
    /// Pixels between grid lines; `0` disables the grid.
    pub grid_spacing: u32,
    /// Stroke colours in `R, G, B` order. Later strokes overdraw earlier ones.
    pub strokes: [Rgb; CHANNELS],
}

impl Default for HistogramStyle {
    fn default() -> Self {
        Self {
            background: [255, 255, 255],
            grid: [200, 200, 200],
            grid_spacing: GRID_SPACING,
            strokes: [[255, 0, 0], [0, 255, 0], [0, 0, 255]],
        }
    }
}

/// Renders the histogram of `src` with [`HistogramStyle::default`].
pub fn render_histogram(src: &PixelBuffer) -> PixelBuffer {
    render_histogram_with(src, &HistogramStyle::default())
}

/// Renders the histogram of `src` as a 256x256 line plot.
///
/// Each channel becomes a polyline through its buckets, one pixel column per
/// level. The global maximum frequency touches the top row and an empty
/// bucket lies on the bottom row.
pub fn render_histogram_with(src: &PixelBuffer, style: &HistogramStyle) -> PixelBuffer {
    let hist = Histogram::compute(src);
    let max = hist.max_frequency();
    debug!(width = src.width(), height = src.height(), max, "render histogram");

    let mut out = PixelBuffer::filled(HISTOGRAM_SIZE, HISTOGRAM_SIZE, style.background);
    let last = HISTOGRAM_SIZE as i32 - 1;

    if style.grid_spacing > 0 {
        for i in (0..HISTOGRAM_SIZE).step_by(style.grid_spacing as usize) {
            let i = i as i32;
            draw_line(&mut out, (i, 0), (i, last), style.grid);
            draw_line(&mut out, (0, i), (last, i), style.grid);
        }
    }

    for channel in Channel::ALL {
        let bins = hist.channel(channel);
        let row = |level: usize| bar_row(bins[level], max);
        for level in 1..BUCKETS {
            let from = (level as i32 - 1, row(level - 1));
            let to = (level as i32, row(level));
            draw_line(&mut out, from, to, style.strokes[channel.index()]);
        }
    }
    out
}

/// Plot row for a bucket count: 0 is the top, 255 the bottom.
fn bar_row(count: u32, max: u32) -> i32 {
    let size = HISTOGRAM_SIZE as i32;
    if max == 0 {
        return size - 1;
    }
    let scaled = (count as f64 / max as f64 * size as f64) as i32;
    (size - scaled).clamp(0, size - 1)
}

/// Draws a line from `from` to `to` inclusive with integer Bresenham.
///
/// Points outside `dst` are skipped.
pub fn draw_line(dst: &mut PixelBuffer, from: (i32, i32), to: (i32, i32), color: Rgb) {
    let (x1, y1) = from;
    let (x2, y2) = to;
    let dx = (x2 - x1).abs();
    let dy = (y2 - y1).abs();
    let sx = if x1 < x2 { 1 } else { -1 };
    let sy = if y1 < y2 { 1 } else { -1 };
    let mut err = dx - dy;

    let (mut x, mut y) = (x1, y1);
    loop {
        if x >= 0 && y >= 0 && (x as u32) < dst.width() && (y as u32) < dst.height() {
            dst.set_pixel(x as u32, y as u32, color);
        }
        if x == x2 && y == y2 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}

/// Shifts each channel so its dominant level moves to the mean of the
/// three dominant levels.
///
/// Peaks are searched in [`PEAK_SEARCH`] so clipped shadows and highlights
/// do not decide the balance. The mean is floored and shifted samples
/// saturate at 0 and 255.
///
/// # Example
///
/// ```rust
/// use rastr_core::PixelBuffer;
/// use rastr_ops::histogram::color_correct;
///
/// let tinted = PixelBuffer::filled(3, 3, [50, 100, 150]);
/// assert_eq!(color_correct(&tinted).pixel(1, 1), [100, 100, 100]);
/// ```
pub fn color_correct(src: &PixelBuffer) -> PixelBuffer {
    let hist = Histogram::compute(src);
    let peaks = Channel::ALL.map(|c| hist.peak(c, PEAK_SEARCH) as i32);
    let average = peaks.iter().sum::<i32>() / CHANNELS as i32;
    let offsets = peaks.map(|p| average - p);
    debug!(width = src.width(), height = src.height(), ?peaks, average, "color correct");
    trace!(?offsets, "channel offsets");

    src.map(|[r, g, b]| {
        [
            clamp_i32(r as i32 + offsets[0]),
            clamp_i32(g as i32 + offsets[1]),
            clamp_i32(b as i32 + offsets[2]),
        ]
    })
}
