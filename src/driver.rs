//! One complete pass: graph, candidates, validation, reduction.
use std::time::Instant;

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::candidate::{CandidateBatch, PrefixEnumerator};
use crate::config::RunConfig;
use crate::graph::{Graph, random_graph, read_graph};
use crate::report::RunReport;
use crate::validate::{
    Backend, ParallelValidator, SequentialValidator, Validator, validate_with_fallback,
};

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1e3
}

/// Loads the configured graph file, or generates the random graph.
pub fn build_graph(config: &RunConfig) -> Result<Graph> {
    match &config.graph {
        Some(path) => {
            read_graph(path).with_context(|| format!("Failed to load graph file: {:?}", path))
        }
        None => Ok(random_graph(
            config.vertices,
            config.edge_probability,
            config.seed,
        )?),
    }
}

pub fn run(config: &RunConfig) -> Result<RunReport> {
    let start = Instant::now();
    let graph = build_graph(config)?;
    let n = graph.vertex_count();
    let enumerator = PrefixEnumerator::with_stride(
        n,
        config.colors,
        config.prefix_depth,
        config.effective_stride(n),
    )?;
    let batch = enumerator.batch(config.max_candidates)?;
    let generate_ms = elapsed_ms(start);
    info!(
        "graph: {} vertices, {} edges; {} candidates (stride {})",
        n,
        graph.edge_count(),
        batch.len(),
        batch.stride()
    );

    let start = Instant::now();
    let (backend, found_index, valid_count) = if config.any_valid {
        let (backend, found) = find_any(config, &graph, &batch)?;
        (backend, found, None)
    } else {
        let validator = acquire(config)?;
        let (backend, result) = if config.fallback {
            validate_with_fallback(validator.as_ref(), &graph, &batch)?
        } else {
            (validator.name(), validator.validate(&graph, &batch)?)
        };
        debug!("verdicts: {} valid of {}", result.valid_count(), result.len());
        (
            backend.to_string(),
            result.find_first_valid(),
            Some(result.valid_count()),
        )
    };
    let validate_ms = elapsed_ms(start);

    Ok(RunReport {
        backend,
        requested_backend: config.backend,
        vertices: n,
        edges: graph.edge_count(),
        candidates: batch.len(),
        found_index,
        valid_count,
        generate_ms,
        validate_ms,
    })
}

/// Warning for a requested backend that early-exit mode cannot honor.
fn any_mode_override(backend: Backend) -> Option<String> {
    (backend != Backend::Parallel).then(|| {
        format!("--any runs on the parallel backend; requested {backend} backend is ignored")
    })
}

/// Early-exit search. Only the parallel backend can cancel outstanding lanes,
/// so it is used whatever backend was requested. A substrate failure reruns
/// the whole batch sequentially when fallback is enabled.
fn find_any(
    config: &RunConfig,
    graph: &Graph,
    batch: &CandidateBatch,
) -> Result<(String, Option<usize>)> {
    if let Some(note) = any_mode_override(config.backend) {
        warn!("{}", note);
    }
    let found = match config.threads {
        0 => Ok(ParallelValidator::default()),
        threads => ParallelValidator::with_threads(threads),
    }
    .and_then(|validator| validator.find_any_valid(graph, batch));
    match found {
        Ok(found) => Ok(("parallel-any".to_string(), found)),
        Err(err) if config.fallback && err.is_substrate_failure() => {
            warn!("parallel early-exit search failed ({}), using sequential", err);
            let result = SequentialValidator.validate(graph, batch)?;
            Ok(("sequential".to_string(), result.find_first_valid()))
        }
        Err(err) => Err(anyhow::Error::from(err)),
    }
}

/// Builds the requested backend. A backend that cannot start is replaced by
/// the sequential one when fallback is enabled.
fn acquire(config: &RunConfig) -> Result<Box<dyn Validator>> {
    match config.backend.build(config.threads) {
        Ok(validator) => Ok(validator),
        Err(err) if config.fallback && err.is_substrate_failure() => {
            warn!(
                "{} backend unavailable ({}), using sequential",
                config.backend,
                err
            );
            Ok(Backend::Sequential.build(0)?)
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> RunConfig {
        RunConfig {
            vertices: 8,
            edge_probability: 0.3,
            prefix_depth: 8,
            colors: 3,
            ..RunConfig::default()
        }
    }

    #[test]
    fn backends_report_the_same_answer() {
        let mut config = small_config();
        let parallel = run(&config).unwrap();
        config.backend = Backend::Sequential;
        let sequential = run(&config).unwrap();
        assert_eq!(parallel.candidates, 6561);
        assert_eq!(parallel.found_index, sequential.found_index);
        assert_eq!(parallel.valid_count, sequential.valid_count);
        assert_eq!(sequential.backend, "sequential");
    }

    #[test]
    fn padded_stride_does_not_change_the_answer() {
        let mut config = small_config();
        let plain = run(&config).unwrap();
        config.stride = 16;
        let padded = run(&config).unwrap();
        assert_eq!(plain.found_index, padded.found_index);
        assert_eq!(plain.valid_count, padded.valid_count);
    }

    #[test]
    fn any_mode_finds_a_member_of_the_valid_set() {
        let mut config = small_config();
        let exhaustive = run(&config).unwrap();
        config.any_valid = true;
        let any = run(&config).unwrap();
        assert_eq!(any.valid_count, None);
        assert_eq!(any.found_index.is_some(), exhaustive.found_index.is_some());
    }

    #[test]
    fn any_mode_names_the_backend_it_ignores() {
        assert_eq!(any_mode_override(Backend::Parallel), None);
        let note = any_mode_override(Backend::OpenCl).unwrap();
        assert!(note.contains("opencl"), "{note}");
        assert!(any_mode_override(Backend::Sequential).is_some());

        let config = RunConfig {
            backend: Backend::Sequential,
            any_valid: true,
            ..small_config()
        };
        let report = run(&config).unwrap();
        assert_eq!(report.backend, "parallel-any");
        assert_eq!(report.requested_backend, Backend::Sequential);
        assert_eq!(report.valid_count, None);
    }

    #[cfg(not(feature = "opencl"))]
    #[test]
    fn unavailable_device_falls_back_or_fails() {
        let mut config = small_config();
        config.backend = Backend::OpenCl;
        let report = run(&config).unwrap();
        assert_eq!(report.backend, "sequential");
        config.fallback = false;
        assert!(run(&config).is_err());
    }

    #[test]
    fn loads_graph_from_file() {
        let path = std::env::temp_dir().join("rustcolor_driver_graph.json");
        let triangle = Graph::from_edges(3, [(0, 1), (1, 2), (0, 2)]).unwrap();
        crate::graph::write_graph(&path, &triangle).unwrap();
        let config = RunConfig {
            graph: Some(path.clone()),
            colors: 3,
            prefix_depth: 3,
            ..RunConfig::default()
        };
        let report = run(&config).unwrap();
        assert_eq!(report.edges, 3);
        assert_eq!(report.candidates, 27);
        // first permutation of {1,2,3} in little-endian base-3 order is (3,2,1) at t = 2 + 1*3 = 5
        assert_eq!(report.found_index, Some(5));
        assert_eq!(report.valid_count, Some(6));
        let _ = std::fs::remove_file(path);
    }
}
