//! Candidate colorings and their batch layout.
pub mod batch;
pub mod enumerate;

pub use batch::{CandidateBatch, Color, SENTINEL};
pub use enumerate::{PrefixEnumerator, enumerate_prefixes};
