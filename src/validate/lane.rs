//! The per-candidate check executed by every lane, on every backend.
use crate::candidate::{Color, SENTINEL};
use crate::graph::{NeighborIter, NeighborMask, upper_neighbors};

/// Decides whether `col` properly colors the graph given by `neighbors`.
///
/// Only the first `neighbors.len()` slots of `col` are read. Vertices are
/// examined in increasing order; the first unassigned vertex or monochromatic
/// edge ends the scan. Each edge is inspected once, from its lower endpoint.
#[inline]
pub fn is_proper_coloring(neighbors: &[NeighborMask], col: &[Color]) -> bool {
    debug_assert!(col.len() >= neighbors.len());
    for (v, &mask) in neighbors.iter().enumerate() {
        let cv = col[v];
        if cv == SENTINEL {
            return false;
        }
        if NeighborIter::new(upper_neighbors(mask, v)).any(|u| col[u] == cv) {
            return false;
        }
    }
    true
}
