//! Integration tests for rastr crates.
//!
//! This crate checks properties that hold across whole operations and
//! crate boundaries, over deterministic pseudo-random buffers.

use rastr_core::PixelBuffer;

/// Small 64-bit LCG; deterministic across platforms.
#[derive(Debug, Clone)]
pub struct Lcg(u64);

impl Lcg {
    /// Creates a generator from `seed`.
    pub fn new(seed: u64) -> Self {
        Self(seed ^ 0x9E37_79B9_7F4A_7C15)
    }

    /// Next byte.
    pub fn next_u8(&mut self) -> u8 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 56) as u8
    }

    /// Next value in `0..bound`.
    pub fn below(&mut self, bound: u32) -> u32 {
        let hi = self.next_u8() as u32;
        let lo = self.next_u8() as u32;
        ((hi << 8) | lo) % bound
    }
}

/// Buffer of uniformly random samples.
pub fn noise(width: u32, height: u32, seed: u64) -> PixelBuffer {
    let mut rng = Lcg::new(seed);
    let data = (0..width as usize * height as usize * 3)
        .map(|_| rng.next_u8())
        .collect();
    PixelBuffer::from_raw(width, height, data).expect("noise length matches dimensions")
}

/// Sizes used by the property sweeps, including degenerate strips.
pub const SIZES: [(u32, u32); 7] = [(1, 1), (1, 7), (9, 1), (8, 8), (13, 5), (16, 4), (31, 17)];
