//! Single-threaded reference backend.
use crate::candidate::CandidateBatch;
use crate::error::Result;
use crate::graph::Graph;
use crate::reduce::ValidationResult;
use crate::validate::lane::is_proper_coloring;
use crate::validate::{Validator, check_shape};

/// Runs the lanes one after another in index order. Needs no substrate, so it
/// is the fallback whenever a parallel backend cannot be used.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialValidator;

impl Validator for SequentialValidator {
    fn name(&self) -> &str {
        "sequential"
    }

    fn validate(&self, graph: &Graph, batch: &CandidateBatch) -> Result<ValidationResult> {
        check_shape(graph, batch)?;
        let neighbors = graph.as_words();
        Ok(ValidationResult::from_verdicts(
            batch
                .rows()
                .map(|row| is_proper_coloring(neighbors, row))
                .collect(),
        ))
    }
}
