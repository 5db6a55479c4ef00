//! # Bounded graphs
//!
//! A graph of `n ≤ 63` vertices is stored as `n` words `N[v] ∈ u64`, with bit
//! `u` of `N[v]` set iff `{u, v}` is an edge. The representation is symmetric,
//! loop-free and never sets a bit at or above `n`.
//!
//! ```rust
//! use RustColor::graph::Graph;
//!
//! let g = Graph::from_edges(3, [(0, 1), (1, 2)]).unwrap();
//! assert_eq!(g.neighbors(1), 0b101);
//! assert_eq!(g.degree(1), 2);
//! ```

pub mod adjacency;
pub mod generate;
pub mod io;

pub use adjacency::{Graph, GraphBuilder, NeighborIter, NeighborMask, upper_neighbors};
pub use generate::random_graph;
pub use io::{GraphFile, IoError, read_graph, write_graph};
