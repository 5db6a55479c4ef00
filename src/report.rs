use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::graph::io::{IoError, write_json};
use crate::validate::Backend;

/// Outcome of one search run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Backend that produced the verdicts (after any fallback).
    pub backend: String,
    pub requested_backend: Backend,
    pub vertices: usize,
    pub edges: usize,
    pub candidates: usize,
    pub found_index: Option<usize>,
    /// `None` in early-exit mode, where not every verdict is computed.
    pub valid_count: Option<usize>,
    pub generate_ms: f64,
    pub validate_ms: f64,
}

impl RunReport {
    /// The found index, or `-1` when no candidate was valid.
    pub fn found_index_or_minus_one(&self) -> i64 {
        self.found_index.map_or(-1, |i| i as i64)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), IoError> {
        write_json(path, self)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "candidates={} foundIndex={}",
            self.candidates,
            self.found_index_or_minus_one()
        )
    }
}
