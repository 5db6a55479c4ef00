//! Data-parallel CPU backend on a rayon thread pool.
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use log::debug;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::candidate::CandidateBatch;
use crate::error::{ColoringError, Result};
use crate::graph::Graph;
use crate::reduce::ValidationResult;
use crate::validate::lane::is_proper_coloring;
use crate::validate::{Validator, check_shape};

/// One rayon task per candidate row. The indexed `collect` writes each verdict
/// into its own slot and returns only after every lane has finished.
///
/// Without a dedicated pool the work runs on rayon's global pool.
#[derive(Default)]
pub struct ParallelValidator {
    pool: Option<ThreadPool>,
}

impl fmt::Debug for ParallelValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParallelValidator")
            .field("threads", &self.threads())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "lane panicked".to_string()
    }
}

impl ParallelValidator {
    /// Uses a dedicated pool of `threads` workers; `0` means rayon's default.
    pub fn with_threads(threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("gcv-lane-{i}"))
            .build()
            .map_err(|e| ColoringError::DeviceUnavailable(e.to_string()))?;
        debug!("parallel validator: {} worker threads", pool.current_num_threads());
        Ok(Self { pool: Some(pool) })
    }

    pub fn threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Runs `op` inside the configured pool and turns a lane panic into
    /// [`ColoringError::DispatchFailure`].
    fn dispatch<T, F>(&self, op: F) -> Result<T>
    where
        T: Send,
        F: FnOnce() -> T + Send,
    {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }));
        outcome.map_err(|payload| ColoringError::DispatchFailure(panic_message(&*payload)))
    }

    /// Returns the index of *some* valid candidate and stops scheduling new
    /// lanes once one is found.
    ///
    /// Unlike [`Validator::validate`] followed by a first-match scan, the
    /// answer is not necessarily the lowest valid index and may differ between
    /// runs on the same input.
    pub fn find_any_valid(&self, graph: &Graph, batch: &CandidateBatch) -> Result<Option<usize>> {
        check_shape(graph, batch)?;
        let neighbors = graph.as_words();
        self.dispatch(|| {
            batch
                .as_slice()
                .par_chunks_exact(batch.stride())
                .position_any(|row| is_proper_coloring(neighbors, row))
        })
    }
}

impl Validator for ParallelValidator {
    fn name(&self) -> &str {
        "parallel"
    }

    fn validate(&self, graph: &Graph, batch: &CandidateBatch) -> Result<ValidationResult> {
        check_shape(graph, batch)?;
        let neighbors = graph.as_words();
        let verdicts: Vec<bool> = self.dispatch(|| {
            batch
                .as_slice()
                .par_chunks_exact(batch.stride())
                .map(|row| is_proper_coloring(neighbors, row))
                .collect()
        })?;
        ValidationResult::from_device_flags(&verdicts, batch.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedicated_pool_reports_its_size() {
        let v = ParallelValidator::with_threads(3).unwrap();
        assert_eq!(v.threads(), 3);
    }

    #[test]
    fn oversubscribed_pool_matches_sequential_order() {
        let graph = Graph::from_edges(3, [(0, 1), (1, 2)]).unwrap();
        let mut batch = CandidateBatch::with_stride(3).unwrap();
        for i in 0..1000 {
            if i % 7 == 3 {
                batch.push_row(&[1, 2, 1]).unwrap();
            } else {
                batch.push_row(&[2, 2, 1]).unwrap();
            }
        }
        let v = ParallelValidator::with_threads(1).unwrap();
        let result = v.validate(&graph, &batch).unwrap();
        assert_eq!(result.len(), 1000);
        assert_eq!(result.find_first_valid(), Some(3));
        assert_eq!(result.valid_count(), 143);
    }

    #[test]
    fn lane_panic_becomes_dispatch_failure() {
        let v = ParallelValidator::default();
        let err = v
            .dispatch(|| {
                (0..64usize).into_par_iter().for_each(|i| {
                    if i == 17 {
                        panic!("lane 17 failed");
                    }
                })
            })
            .unwrap_err();
        match err {
            ColoringError::DispatchFailure(msg) => assert!(msg.contains("lane 17")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn find_any_valid_returns_a_valid_index() {
        let graph = Graph::from_edges(2, [(0, 1)]).unwrap();
        let batch = CandidateBatch::new(4, 2, vec![1, 1, 1, 2, 2, 2, 2, 1]).unwrap();
        let v = ParallelValidator::default();
        let found = v.find_any_valid(&graph, &batch).unwrap();
        assert!(matches!(found, Some(1) | Some(3)));

        let none = CandidateBatch::new(2, 2, vec![1, 1, 0, 2]).unwrap();
        assert_eq!(v.find_any_valid(&graph, &none).unwrap(), None);
    }
}
