//! # Batched coloring validation
//!
//! A pass checks every row of a [`CandidateBatch`] against a [`Graph`]. Each
//! row is handled by an independent lane running [`is_proper_coloring`]; lanes
//! share only read-only inputs and each produces exactly one verdict. A pass
//! always runs the whole batch: verdicts are published only after every lane
//! has finished, and a failed dispatch publishes nothing.
//!
//! ```rust
//! use RustColor::candidate::CandidateBatch;
//! use RustColor::graph::Graph;
//! use RustColor::validate::validate;
//!
//! let graph = Graph::from_edges(3, [(0, 1), (1, 2)]).unwrap();
//! let batch = CandidateBatch::new(3, 3, vec![1, 1, 1, 1, 0, 2, 1, 2, 1]).unwrap();
//! let result = validate(&graph, &batch).unwrap();
//! assert_eq!(result.as_flags(), vec![0, 0, 1]);
//! assert_eq!(result.find_first_valid(), Some(2));
//! ```

pub mod lane;
#[cfg(feature = "opencl")]
pub mod opencl;
pub mod parallel;
pub mod sequential;

use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::candidate::CandidateBatch;
use crate::error::{ColoringError, Result};
use crate::graph::Graph;
use crate::reduce::ValidationResult;

pub use lane::is_proper_coloring;
#[cfg(feature = "opencl")]
pub use opencl::OpenClValidator;
pub use parallel::ParallelValidator;
pub use sequential::SequentialValidator;

/// An execution substrate able to run one validation pass.
pub trait Validator: Send + Sync {
    fn name(&self) -> &str;

    /// Verdict `i` is `true` iff row `i` of `batch` properly colors `graph`.
    fn validate(&self, graph: &Graph, batch: &CandidateBatch) -> Result<ValidationResult>;
}

/// Rejects batches whose rows cannot hold one color per vertex. Runs before
/// any dispatch.
pub fn check_shape(graph: &Graph, batch: &CandidateBatch) -> Result<()> {
    if batch.stride() < graph.vertex_count() {
        return Err(ColoringError::ShapeMismatch(format!(
            "stride {} is smaller than vertex count {}",
            batch.stride(),
            graph.vertex_count()
        )));
    }
    Ok(())
}

/// Validates `batch` on rayon's global pool.
pub fn validate(graph: &Graph, batch: &CandidateBatch) -> Result<ValidationResult> {
    ParallelValidator::default().validate(graph, batch)
}

/// Runs the pass on `primary`; if its substrate fails, reruns it sequentially.
/// Input errors are returned unchanged. Also returns the name of the backend
/// whose verdicts these are.
pub fn validate_with_fallback<'a>(
    primary: &'a dyn Validator,
    graph: &Graph,
    batch: &CandidateBatch,
) -> Result<(&'a str, ValidationResult)> {
    match primary.validate(graph, batch) {
        Err(err) if err.is_substrate_failure() => {
            warn!(
                "{} backend failed ({}), falling back to sequential",
                primary.name(),
                err
            );
            Ok(("sequential", SequentialValidator.validate(graph, batch)?))
        }
        verdicts => Ok((primary.name(), verdicts?)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Sequential,
    #[default]
    Parallel,
    OpenCl,
}

impl Backend {
    pub const NAMES: [&'static str; 3] = ["sequential", "parallel", "opencl"];

    /// Acquires the substrate. `threads` only applies to the parallel backend
    /// (`0` keeps rayon's global pool).
    pub fn build(self, threads: usize) -> Result<Box<dyn Validator>> {
        debug!("building {} backend (threads={})", self, threads);
        match self {
            Backend::Sequential => Ok(Box::new(SequentialValidator)),
            Backend::Parallel if threads == 0 => Ok(Box::new(ParallelValidator::default())),
            Backend::Parallel => Ok(Box::new(ParallelValidator::with_threads(threads)?)),
            #[cfg(feature = "opencl")]
            Backend::OpenCl => Ok(Box::new(OpenClValidator::new(true)?)),
            #[cfg(not(feature = "opencl"))]
            Backend::OpenCl => Err(ColoringError::DeviceUnavailable(
                "built without the `opencl` feature".into(),
            )),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Backend::Sequential => "sequential",
            Backend::Parallel => "parallel",
            Backend::OpenCl => "opencl",
        };
        f.write_str(name)
    }
}

impl FromStr for Backend {
    type Err = ColoringError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" | "seq" => Ok(Backend::Sequential),
            "parallel" | "rayon" => Ok(Backend::Parallel),
            "opencl" | "gpu" => Ok(Backend::OpenCl),
            other => Err(ColoringError::InvalidParameter(format!(
                "unknown backend `{other}`"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path3() -> Graph {
        Graph::from_edges(3, [(0, 1), (1, 2)]).unwrap()
    }

    struct Broken;

    impl Validator for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn validate(&self, _: &Graph, _: &CandidateBatch) -> Result<ValidationResult> {
            Err(ColoringError::DeviceUnavailable("no device".into()))
        }
    }

    #[test]
    fn five_candidates_only_index_three_valid() {
        let graph = path3();
        let batch = CandidateBatch::new(
            5,
            3,
            vec![1, 1, 1, 1, 0, 2, 2, 2, 3, 3, 1, 3, 1, 3, 3],
        )
        .unwrap();
        let result = validate(&graph, &batch).unwrap();
        assert_eq!(result.as_flags(), vec![0, 0, 0, 1, 0]);
        assert_eq!(result.find_first_valid(), Some(3));
    }

    #[test]
    fn single_vertex_graph() {
        let graph = Graph::from_edges(1, []).unwrap();
        let batch = CandidateBatch::new(2, 1, vec![1, 0]).unwrap();
        let result = SequentialValidator.validate(&graph, &batch).unwrap();
        assert_eq!(result.as_slice(), &[true, false]);
    }

    #[test]
    fn empty_batch_yields_empty_result() {
        let batch = CandidateBatch::with_stride(3).unwrap();
        let result = validate(&path3(), &batch).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.find_first_valid(), None);
    }

    #[test]
    fn narrow_stride_is_rejected_before_dispatch() {
        let batch = CandidateBatch::new(1, 2, vec![1, 2]).unwrap();
        for backend in [Backend::Sequential, Backend::Parallel] {
            let v = backend.build(0).unwrap();
            assert!(matches!(
                v.validate(&path3(), &batch),
                Err(ColoringError::ShapeMismatch(_))
            ));
        }
    }

    #[test]
    fn fallback_reruns_sequentially() {
        let batch = CandidateBatch::new(2, 3, vec![1, 1, 1, 2, 1, 2]).unwrap();
        let (backend, result) = validate_with_fallback(&Broken, &path3(), &batch).unwrap();
        assert_eq!(backend, "sequential");
        assert_eq!(result.find_first_valid(), Some(1));

        let (backend, _) = validate_with_fallback(&SequentialValidator, &path3(), &batch).unwrap();
        assert_eq!(backend, SequentialValidator.name());
    }

    #[test]
    fn fallback_keeps_shape_errors() {
        let batch = CandidateBatch::new(1, 2, vec![1, 2]).unwrap();
        let err = validate_with_fallback(&SequentialValidator, &path3(), &batch);
        assert!(matches!(err, Err(ColoringError::ShapeMismatch(_))));
    }

    #[test]
    fn backend_names_round_trip() {
        for name in Backend::NAMES {
            assert_eq!(name.parse::<Backend>().unwrap().to_string(), name);
        }
        assert!("cuda".parse::<Backend>().is_err());
    }

    #[cfg(not(feature = "opencl"))]
    #[test]
    fn opencl_without_feature_is_unavailable() {
        assert!(matches!(
            Backend::OpenCl.build(0),
            Err(ColoringError::DeviceUnavailable(_))
        ));
    }
}
