//! Parallel verification of candidate graph colorings.
//!
//! A [`graph::Graph`] of at most 63 vertices and a [`candidate::CandidateBatch`]
//! of colorings go into a [`validate::Validator`]; every candidate is checked
//! by its own lane and the verdicts are reduced to the lowest valid index.
#![allow(non_snake_case)]

pub mod candidate;
pub mod config;
pub mod driver;
pub mod error;
pub mod graph;
pub mod options;
pub mod reduce;
pub mod report;
pub mod validate;

pub use candidate::{CandidateBatch, Color, SENTINEL};
pub use error::{ColoringError, Result};
pub use graph::Graph;
pub use reduce::{ValidationResult, find_first_valid};
pub use validate::{Validator, validate};
