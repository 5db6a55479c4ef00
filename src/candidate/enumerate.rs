//! Brute base-k enumeration of the first `prefix_depth` vertex colors.
//!
//! No pruning is performed: candidate `t` colors vertex `i < prefix_depth`
//! with the `i`-th little-endian base-`k` digit of `t` plus one, and every
//! remaining vertex with color 1.
use log::debug;

use crate::candidate::batch::{CandidateBatch, Color};
use crate::error::{ColoringError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixEnumerator {
    pub vertices: usize,
    pub colors: u32,
    pub prefix_depth: usize,
    pub stride: usize,
}

impl PrefixEnumerator {
    pub fn new(vertices: usize, colors: u32, prefix_depth: usize) -> Result<Self> {
        Self::with_stride(vertices, colors, prefix_depth, vertices)
    }

    pub fn with_stride(
        vertices: usize,
        colors: u32,
        prefix_depth: usize,
        stride: usize,
    ) -> Result<Self> {
        if colors == 0 {
            return Err(ColoringError::InvalidParameter(
                "at least one color is required".into(),
            ));
        }
        if colors > Color::MAX as u32 {
            return Err(ColoringError::InvalidParameter(format!(
                "{colors} colors do not fit the device color type"
            )));
        }
        if prefix_depth > vertices {
            return Err(ColoringError::InvalidParameter(format!(
                "prefix depth {prefix_depth} exceeds vertex count {vertices}"
            )));
        }
        if stride < vertices || stride == 0 {
            return Err(ColoringError::ShapeMismatch(format!(
                "stride {stride} cannot hold {vertices} vertices"
            )));
        }
        Ok(Self {
            vertices,
            colors,
            prefix_depth,
            stride,
        })
    }

    /// `k^prefix_depth`, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        (self.colors as u64).saturating_pow(self.prefix_depth as u32)
    }

    /// Writes candidate `t` into `row` (length `stride`).
    pub fn fill_row(&self, t: u64, row: &mut [Color]) {
        let k = self.colors as u64;
        let mut x = t;
        for slot in &mut row[..self.prefix_depth] {
            *slot = (x % k) as Color + 1;
            x /= k;
        }
        for slot in &mut row[self.prefix_depth..self.vertices] {
            *slot = 1;
        }
        for slot in &mut row[self.vertices..] {
            *slot = 0;
        }
    }

    /// The first `min(total(), max_candidates)` candidates in enumeration order.
    pub fn batch(&self, max_candidates: usize) -> Result<CandidateBatch> {
        let count = usize::try_from(self.total())
            .unwrap_or(usize::MAX)
            .min(max_candidates);
        let slots = count.checked_mul(self.stride).ok_or_else(|| {
            ColoringError::ShapeMismatch(format!(
                "{count} candidates of {} slots overflow",
                self.stride
            ))
        })?;
        let mut data = vec![0 as Color; slots];
        for (t, row) in data.chunks_exact_mut(self.stride).enumerate() {
            self.fill_row(t as u64, row);
        }
        debug!(
            "enumerate: n={} k={} depth={} candidates={} (of {})",
            self.vertices,
            self.colors,
            self.prefix_depth,
            count,
            self.total()
        );
        CandidateBatch::new(count, self.stride, data)
    }
}

/// Convenience wrapper over [`PrefixEnumerator`] with `stride == n`.
pub fn enumerate_prefixes(
    vertices: usize,
    colors: u32,
    prefix_depth: usize,
    max_candidates: usize,
) -> Result<CandidateBatch> {
    PrefixEnumerator::new(vertices, colors, prefix_depth)?.batch(max_candidates)
}
