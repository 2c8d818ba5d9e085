//! # commune
//!
//! Community detection primitives for the Tekne stack: LabelRank (stabilized
//! label propagation over per-vertex label distributions) and a modularity
//! evaluator for scoring the partitions it finds.
//!
//! Graphs are `petgraph` undirected graphs with weighted edges; anything
//! implementing [`EdgeWeight`] works as the edge payload, `()` included.
//! LabelRank expects a self-loop of weight 1 on every vertex; add them
//! before detecting, as the example below does.
//!
//! ```rust
//! use petgraph::graph::UnGraph;
//! use commune::{CommunityDetection, LabelRank};
//!
//! let mut graph = UnGraph::<(), f64>::new_undirected();
//! let nodes: Vec<_> = (0..6).map(|_| graph.add_node(())).collect();
//! for &(a, b) in &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5)] {
//!     graph.add_edge(nodes[a], nodes[b], 1.0);
//! }
//! for &n in &nodes {
//!     graph.add_edge(n, n, 1.0);
//! }
//!
//! let communities = LabelRank::new().detect(&graph).unwrap();
//! assert_eq!(communities[0], communities[2]);
//! assert_ne!(communities[0], communities[5]);
//! ```

pub mod error;
pub mod labelrank;
pub mod labelset;
pub mod modularity;
pub mod traits;

#[cfg(test)]
mod labelrank_tests;

pub use error::{Error, Result};
pub use labelrank::{LabelRank, LabelRankResult};
pub use labelset::{DenseAccumulator, Labelset, SparseLabelset};
pub use modularity::{
    community_modularity, delta_modularity, modularity, modularity_singletons, total_edge_weight,
};
pub use traits::{CommunityDetection, EdgeWeight};
