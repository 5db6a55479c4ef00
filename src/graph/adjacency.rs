//! Bitmask adjacency for graphs of at most 63 vertices.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ColoringError, MAX_VERTICES, Result};
use crate::graph::io::GraphFile;

/// Neighbor set of a single vertex: bit `u` is set iff `(u, v)` is an edge.
pub type NeighborMask = u64;

/// Immutable undirected graph stored as one neighbor word per vertex.
///
/// The words are exactly what a compute device receives, so the validator
/// never converts the representation before dispatch.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "GraphFile", into = "GraphFile")]
pub struct Graph {
    neighbors: Vec<NeighborMask>,
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("vertices", &self.vertex_count())
            .field("edges", &self.edges().collect::<Vec<_>>())
            .finish()
    }
}

fn check_size(n: usize) -> Result<()> {
    if n == 0 || n > MAX_VERTICES {
        return Err(ColoringError::InvalidSize(n));
    }
    Ok(())
}

/// Mask with the lowest `n` bits set.
#[inline]
fn low_bits(n: usize) -> NeighborMask {
    (1u64 << n) - 1
}

impl Graph {
    /// Builds a graph from an explicit edge list. Repeated edges are idempotent.
    pub fn from_edges<I>(n: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut builder = GraphBuilder::new(n)?;
        for (u, v) in edges {
            builder.add_edge(u, v)?;
        }
        Ok(builder.build())
    }

    /// Builds a graph by asking `is_edge(u, v)` once for every pair `u < v`.
    pub fn from_predicate<F>(n: usize, mut is_edge: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> bool,
    {
        let mut builder = GraphBuilder::new(n)?;
        for u in 0..n {
            for v in (u + 1)..n {
                if is_edge(u, v) {
                    builder.add_edge(u, v)?;
                }
            }
        }
        Ok(builder.build())
    }

    /// Adopts raw neighbor words, e.g. read back from a device or a file.
    pub fn from_masks(masks: Vec<NeighborMask>) -> Result<Self> {
        let n = masks.len();
        check_size(n)?;
        let valid = low_bits(n);
        for (v, &mask) in masks.iter().enumerate() {
            if mask & !valid != 0 {
                let u = (mask & !valid).trailing_zeros() as usize;
                return Err(ColoringError::InvalidEdge { u, v });
            }
            if mask >> v & 1 == 1 {
                return Err(ColoringError::InvalidEdge { u: v, v });
            }
            for u in NeighborIter::new(mask) {
                if masks[u] >> v & 1 == 0 {
                    return Err(ColoringError::Asymmetric { u, v });
                }
            }
        }
        Ok(Self { neighbors: masks })
    }

    pub fn vertex_count(&self) -> usize {
        self.neighbors.len()
    }

    #[inline]
    pub fn neighbors(&self, v: usize) -> NeighborMask {
        self.neighbors[v]
    }

    /// Neighbors of `v` in ascending order.
    pub fn neighbor_iter(&self, v: usize) -> NeighborIter {
        NeighborIter::new(self.neighbors[v])
    }

    pub fn degree(&self, v: usize) -> u32 {
        self.neighbors[v].count_ones()
    }

    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        u < self.vertex_count() && v < self.vertex_count() && self.neighbors[u] >> v & 1 == 1
    }

    pub fn edge_count(&self) -> usize {
        self.neighbors
            .iter()
            .map(|mask| mask.count_ones() as usize)
            .sum::<usize>()
            / 2
    }

    /// Every edge exactly once, as `(u, v)` with `u < v`, in lexicographic order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.neighbors.iter().enumerate().flat_map(|(u, &mask)| {
            NeighborIter::new(upper_neighbors(mask, u)).map(move |v| (u, v))
        })
    }

    /// The `n` adjacency words in vertex order.
    pub fn as_words(&self) -> &[NeighborMask] {
        &self.neighbors
    }
}

/// Restricts `mask` to the neighbors with an index greater than `v`.
#[inline]
pub fn upper_neighbors(mask: NeighborMask, v: usize) -> NeighborMask {
    mask & u64::MAX.checked_shl(v as u32 + 1).unwrap_or(0)
}

/// Append-only construction state. Freezing it yields a [`Graph`].
#[derive(Debug)]
pub struct GraphBuilder {
    neighbors: Vec<NeighborMask>,
}

impl GraphBuilder {
    pub fn new(n: usize) -> Result<Self> {
        check_size(n)?;
        Ok(Self {
            neighbors: vec![0; n],
        })
    }

    pub fn add_edge(&mut self, u: usize, v: usize) -> Result<&mut Self> {
        let n = self.neighbors.len();
        if u == v || u >= n || v >= n {
            return Err(ColoringError::InvalidEdge { u, v });
        }
        self.neighbors[u] |= 1 << v;
        self.neighbors[v] |= 1 << u;
        Ok(self)
    }

    pub fn build(self) -> Graph {
        Graph {
            neighbors: self.neighbors,
        }
    }
}

/// Iterates the set bits of a neighbor mask, lowest first.
#[derive(Debug, Clone)]
pub struct NeighborIter {
    remaining: NeighborMask,
}

impl NeighborIter {
    pub fn new(mask: NeighborMask) -> Self {
        Self { remaining: mask }
    }
}

impl Iterator for NeighborIter {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let u = self.remaining.trailing_zeros() as usize;
        self.remaining &= self.remaining - 1;
        Some(u)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.remaining.count_ones() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for NeighborIter {}
