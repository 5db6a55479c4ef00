//! Reduction of per-candidate verdicts to a single answer.
use serde::Serialize;

use crate::error::{ColoringError, Result};

/// Verdicts of one pass, index-aligned with the candidate batch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationResult {
    valid: Vec<bool>,
}

impl ValidationResult {
    pub fn from_verdicts(valid: Vec<bool>) -> Self {
        Self { valid }
    }

    /// Adopts the 0/1 integers read back from a device. Anything nonzero counts
    /// as valid. The length must equal the number of candidates dispatched.
    pub fn from_device_flags<T>(flags: &[T], cand_count: usize) -> Result<Self>
    where
        T: Copy + Default + PartialEq,
    {
        if flags.len() != cand_count {
            return Err(ColoringError::ShapeMismatch(format!(
                "result has {} slots for {} candidates",
                flags.len(),
                cand_count
            )));
        }
        let zero = T::default();
        Ok(Self {
            valid: flags.iter().map(|&flag| flag != zero).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.valid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valid.is_empty()
    }

    pub fn is_valid(&self, index: usize) -> bool {
        self.valid[index]
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.valid
    }

    /// The device view: one `0` or `1` per candidate.
    pub fn as_flags(&self) -> Vec<u8> {
        self.valid.iter().map(|&ok| ok as u8).collect()
    }

    pub fn valid_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.valid
            .iter()
            .enumerate()
            .filter_map(|(index, &ok)| ok.then_some(index))
    }

    pub fn valid_count(&self) -> usize {
        self.valid.iter().filter(|&&ok| ok).count()
    }

    pub fn find_first_valid(&self) -> Option<usize> {
        find_first_valid(&self.valid)
    }
}

/// Lowest index holding `true`, scanning in index order. `None` is a normal
/// outcome: the batch simply contained no proper coloring.
pub fn find_first_valid(result: &[bool]) -> Option<usize> {
    result.iter().position(|&ok| ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_valid_is_lowest_index() {
        let r = ValidationResult::from_verdicts(vec![false, false, false, true, false]);
        assert_eq!(r.as_flags(), vec![0, 0, 0, 1, 0]);
        assert_eq!(r.find_first_valid(), Some(3));
        assert_eq!(find_first_valid(&[false, true, true]), Some(1));
    }

    #[test]
    fn all_invalid_and_empty_are_not_found() {
        assert_eq!(find_first_valid(&[false; 8]), None);
        assert_eq!(ValidationResult::default().find_first_valid(), None);
    }

    #[test]
    fn only_last_valid_is_found() {
        let mut flags = vec![false; 100];
        flags[99] = true;
        assert_eq!(find_first_valid(&flags), Some(99));
    }

    #[test]
    fn device_flags_must_cover_every_candidate() {
        let r = ValidationResult::from_device_flags(&[0i32, 1, 0, 1], 4).unwrap();
        assert_eq!(r.valid_indices().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(r.valid_count(), 2);
        assert!(matches!(
            ValidationResult::from_device_flags(&[0i32, 1], 3),
            Err(ColoringError::ShapeMismatch(_))
        ));
    }
}
