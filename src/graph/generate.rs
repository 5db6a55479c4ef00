//! Seeded G(n, p) random graphs.
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{ColoringError, Result};
use crate::graph::adjacency::Graph;

/// Draws every pair `i < j` once, in row-major order, and keeps the edge when
/// the sample falls below `p`. The same `(n, p, seed)` always yields the same graph.
pub fn random_graph(n: usize, p: f64, seed: u64) -> Result<Graph> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ColoringError::InvalidParameter(format!(
            "edge probability {p} is outside [0, 1]"
        )));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let graph = Graph::from_predicate(n, |_, _| rng.random::<f64>() < p)?;
    debug!(
        "random_graph: n={} p={} seed={} edges={}",
        n,
        p,
        seed,
        graph.edge_count()
    );
    Ok(graph)
}
