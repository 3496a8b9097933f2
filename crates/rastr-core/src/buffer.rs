//! The owned raster buffer every transform reads and writes.
//!
//! # Memory Layout
//!
//! Buffers store pixels in **row-major** order, top-to-bottom, with the
//! three samples of each pixel interleaved:
//!
//! ```text
//! Memory: [R G B R G B R G B ...]  <- Row 0
//!         [R G B R G B R G B ...]  <- Row 1
//!         ...
//! ```
//!
//! # Ownership
//!
//! A [`PixelBuffer`] exclusively owns its samples. Transforms take `&PixelBuffer`
//! and allocate a fresh output, so an input is never aliased by, or mutated
//! through, a result.
//!
//! # Usage
//!
//! ```rust
//! use rastr_core::PixelBuffer;
//!
//! let mut buf = PixelBuffer::new(4, 2);
//! buf.set_pixel(1, 1, [255, 128, 0]);
//! assert_eq!(buf.pixel(1, 1), [255, 128, 0]);
//! assert!(buf.try_pixel(4, 0).is_err());
//! ```
//!
//! # Parallelism
//!
//! With the `parallel` feature, [`PixelBuffer::from_rows`] and everything built
//! on it fill disjoint rows on the rayon pool.

use crate::pixel::{CHANNELS, Rgb};
use crate::{Error, Result};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A `width x height` grid of 8-bit RGB pixels.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Creates a buffer filled with black.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rastr_core::PixelBuffer;
    ///
    /// let buf = PixelBuffer::new(1920, 1080);
    /// assert_eq!(buf.dimensions(), (1920, 1080));
    /// ```
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0; sample_count(width, height)],
            width,
            height,
        }
    }

    /// Creates a buffer filled with one pixel value.
    pub fn filled(width: u32, height: u32, pixel: Rgb) -> Self {
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            data.extend_from_slice(&pixel);
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Wraps raw interleaved samples.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if `data.len() != width * height * 3`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rastr_core::PixelBuffer;
    ///
    /// let buf = PixelBuffer::from_raw(2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
    /// assert_eq!(buf.pixel(1, 0), [4, 5, 6]);
    /// ```
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = sample_count(width, height);
        if data.len() != expected {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} samples, got {}", expected, data.len()),
            ));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Builds a buffer row by row.
    ///
    /// `fill(y, row)` receives the zeroed samples of row `y`
    /// (`width * 3` bytes). Rows are independent and may be filled
    /// concurrently.
    pub fn from_rows<F>(width: u32, height: u32, fill: F) -> Self
    where
        F: Fn(u32, &mut [u8]) + Sync + Send,
    {
        let mut data = vec![0u8; sample_count(width, height)];
        let row_len = width as usize * CHANNELS;
        if row_len > 0 {
            #[cfg(feature = "parallel")]
            data.par_chunks_mut(row_len)
                .enumerate()
                .for_each(|(y, row)| fill(y as u32, row));

            #[cfg(not(feature = "parallel"))]
            data.chunks_mut(row_len)
                .enumerate()
                .for_each(|(y, row)| fill(y as u32, row));
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Builds a buffer from a per-pixel function of the output coordinates.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rastr_core::PixelBuffer;
    ///
    /// let ramp = PixelBuffer::from_fn(256, 1, |x, _| [x as u8, 0, 0]);
    /// assert_eq!(ramp.pixel(200, 0), [200, 0, 0]);
    /// ```
    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: Fn(u32, u32) -> Rgb + Sync + Send,
    {
        Self::from_rows(width, height, |y, row| {
            for (x, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
                px.copy_from_slice(&f(x as u32, y));
            }
        })
    }

    /// Returns the buffer width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the buffer height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the buffer dimensions as (width, height).
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the total number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns `true` if the buffer has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the raw interleaved samples.
    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the buffer, returning its samples.
    #[inline]
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    #[inline]
    fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Returns the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        debug_assert!(self.contains(x, y), "pixel out of bounds");
        let o = self.offset(x, y);
        [self.data[o], self.data[o + 1], self.data[o + 2]]
    }

    /// Returns the pixel at (x, y), or `None` if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        self.contains(x, y).then(|| self.pixel(x, y))
    }

    /// Returns the pixel at (x, y).
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if (x, y) is outside the buffer.
    #[inline]
    pub fn try_pixel(&self, x: u32, y: u32) -> Result<Rgb> {
        self.get_pixel(x, y)
            .ok_or_else(|| Error::out_of_bounds(x, y, self.width, self.height))
    }

    /// Sets the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Rgb) {
        debug_assert!(self.contains(x, y), "pixel out of bounds");
        let o = self.offset(x, y);
        self.data[o..o + CHANNELS].copy_from_slice(&pixel);
    }

    /// Sets the pixel at (x, y).
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if (x, y) is outside the buffer.
    pub fn try_set_pixel(&mut self, x: u32, y: u32, pixel: Rgb) -> Result<()> {
        if !self.contains(x, y) {
            return Err(Error::out_of_bounds(x, y, self.width, self.height));
        }
        self.set_pixel(x, y, pixel);
        Ok(())
    }

    /// Returns a row of samples (`width * 3` bytes).
    ///
    /// # Panics
    ///
    /// Panics if y >= height.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        debug_assert!(y < self.height, "row out of bounds");
        let start = y as usize * self.width as usize * CHANNELS;
        &self.data[start..start + self.width as usize * CHANNELS]
    }

    /// Iterates over all pixels with their coordinates.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32, Rgb)> + '_ {
        let width = self.width.max(1);
        self.data
            .chunks_exact(CHANNELS)
            .enumerate()
            .map(move |(i, px)| {
                let i = i as u32;
                (i % width, i / width, [px[0], px[1], px[2]])
            })
    }

    /// Returns a new buffer with `f` applied to every pixel.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rastr_core::PixelBuffer;
    ///
    /// let buf = PixelBuffer::filled(3, 3, [10, 20, 30]);
    /// let swapped = buf.map(|[r, g, b]| [b, g, r]);
    /// assert_eq!(swapped.pixel(2, 2), [30, 20, 10]);
    /// assert_eq!(buf.pixel(2, 2), [10, 20, 30]);
    /// ```
    pub fn map<F>(&self, f: F) -> PixelBuffer
    where
        F: Fn(Rgb) -> Rgb + Sync + Send,
    {
        Self::from_rows(self.width, self.height, |y, row| {
            let src = self.row(y);
            for (dst, px) in row
                .chunks_exact_mut(CHANNELS)
                .zip(src.chunks_exact(CHANNELS))
            {
                dst.copy_from_slice(&f([px[0], px[1], px[2]]));
            }
        })
    }

    /// Checks that `other` has the same dimensions as `self`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] otherwise.
    pub fn ensure_same_size(&self, other: &PixelBuffer) -> Result<()> {
        if self.dimensions() != other.dimensions() {
            return Err(Error::dimension_mismatch(
                self.dimensions(),
                other.dimensions(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

#[inline]
fn sample_count(width: u32, height: u32) -> usize {
    width as usize * height as usize * CHANNELS
}
