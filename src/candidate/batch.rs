//! Dense row-major table of candidate colorings.
use std::fmt;

use itertools::Itertools;

use crate::error::{ColoringError, Result};

/// A color id as the device sees it (`int`).
pub type Color = i32;

/// Reserved color for an unassigned vertex. Never a legal color.
pub const SENTINEL: Color = 0;

/// `len()` rows of exactly `stride` slots each, stored contiguously.
///
/// Slots at or beyond the graph's vertex count are padding and are never read
/// by a validator.
#[derive(Clone, PartialEq, Eq)]
pub struct CandidateBatch {
    stride: usize,
    data: Vec<Color>,
}

impl fmt::Debug for CandidateBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for row in self.rows() {
            list.entry(&format_args!("[{}]", row.iter().join(",")));
        }
        list.finish()
    }
}

impl CandidateBatch {
    /// Adopts a flattened table of `count * stride` slots.
    pub fn new(count: usize, stride: usize, data: Vec<Color>) -> Result<Self> {
        if stride == 0 {
            return Err(ColoringError::ShapeMismatch("stride must be positive".into()));
        }
        let expected = count.checked_mul(stride).ok_or_else(|| {
            ColoringError::ShapeMismatch(format!("{count} rows of {stride} slots overflow"))
        })?;
        if data.len() != expected {
            return Err(ColoringError::ShapeMismatch(format!(
                "expected {count} x {stride} = {expected} slots, got {}",
                data.len()
            )));
        }
        Ok(Self { stride, data })
    }

    /// An empty batch to be filled with [`CandidateBatch::push_row`].
    pub fn with_stride(stride: usize) -> Result<Self> {
        Self::new(0, stride, Vec::new())
    }

    pub fn with_capacity(stride: usize, rows: usize) -> Result<Self> {
        let mut batch = Self::with_stride(stride)?;
        batch.data.reserve(rows.saturating_mul(stride));
        Ok(batch)
    }

    /// Appends one candidate, padding it with [`SENTINEL`] up to the stride.
    pub fn push_row(&mut self, row: &[Color]) -> Result<usize> {
        if row.len() > self.stride {
            return Err(ColoringError::ShapeMismatch(format!(
                "row of {} slots exceeds stride {}",
                row.len(),
                self.stride
            )));
        }
        let index = self.len();
        self.data.extend_from_slice(row);
        self.data
            .extend(std::iter::repeat_n(SENTINEL, self.stride - row.len()));
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.stride
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// All `stride` slots of row `index`, padding included.
    pub fn row(&self, index: usize) -> &[Color] {
        let start = index * self.stride;
        &self.data[start..start + self.stride]
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[Color]> + '_ {
        self.data.chunks_exact(self.stride)
    }

    /// The flat `len() * stride` array handed to a device.
    pub fn as_slice(&self) -> &[Color] {
        &self.data
    }

    /// A new batch whose row `i` is row `order[i]` of this one.
    pub fn permuted(&self, order: &[usize]) -> Result<Self> {
        let mut out = Self::with_capacity(self.stride, order.len())?;
        for &index in order {
            if index >= self.len() {
                return Err(ColoringError::ShapeMismatch(format!(
                    "row {index} out of range for batch of {}",
                    self.len()
                )));
            }
            out.push_row(self.row(index))?;
        }
        Ok(out)
    }
}
