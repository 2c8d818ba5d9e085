//! LabelRank community detection.
//!
//! LabelRank is a stabilized variant of label propagation: instead of a
//! single label, every vertex carries a *distribution* over candidate labels,
//! and the distributions evolve until vertices become locally stable.
//!
//! ## The Algorithm (Xie & Szymanski 2013)
//!
//! Each sweep recomputes a vertex's labelset in four steps:
//!
//! 1. **Propagation**: sum the neighbors' labelsets, weighted by edge weight.
//! 2. **Inflation**: raise every probability to the power `e`, sharpening the
//!    peaks of the distribution (as in MCL).
//! 3. **Cutoff**: drop entries below `th × max`, keeping labelsets sparse.
//! 4. **Conditional update**: a vertex whose labels are already contained in
//!    most neighbors' labelsets skips its update, which is what stabilizes
//!    the otherwise oscillation-prone propagation.
//!
//! Sweeps are Jacobi iterations over two buffers: every update reads the
//! previous iteration's labelsets and writes the next one's, so the result
//! does not depend on the order vertices are visited in. The loop ends when
//! no vertex updated, when the updated-vertex count repeats (an oscillation
//! guard), or at the iteration cap. The final community of a vertex is the
//! argmax label of its labelset.
//!
//! Vertices are expected to carry a self-loop so their own label takes part
//! in the propagation; see [`LabelRank`] for the precondition.
//!
//! ## Usage
//!
//! ```rust
//! use petgraph::graph::UnGraph;
//! use commune::LabelRank;
//!
//! // Two triangles, self-loops on every vertex.
//! let mut graph = UnGraph::<(), f64>::new_undirected();
//! let nodes: Vec<_> = (0..6).map(|_| graph.add_node(())).collect();
//! for &(a, b) in &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5)] {
//!     graph.add_edge(nodes[a], nodes[b], 1.0);
//! }
//! for &n in &nodes {
//!     graph.add_edge(n, n, 1.0);
//! }
//!
//! let result = LabelRank::new().run(&graph).unwrap();
//! assert_eq!(result.membership[0], result.membership[1]);
//! assert_ne!(result.membership[0], result.membership[3]);
//! ```
//!
//! ## References
//!
//! Xie & Szymanski (2013). "LabelRank: A stabilized label propagation
//! algorithm for community detection in networks." IEEE NSW 2013.

use crate::error::{Error, Result};
use crate::labelset::{DenseAccumulator, Labelset, SparseLabelset};
use crate::traits::{CommunityDetection, EdgeWeight};
use log::debug;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::time::{Duration, Instant};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// LabelRank community detection algorithm.
///
/// Requires every vertex to have positive total edge weight; the conventional
/// way callers ensure this is a self-loop of weight 1 on each vertex. A
/// vertex violating the precondition is assigned its own label rather than
/// dividing by zero.
#[derive(Debug, Clone)]
pub struct LabelRank {
    /// Hard cap on the main loop.
    max_iterations: usize,
    /// Inflation exponent applied after combining.
    inflation: f64,
    /// Relative cutoff threshold in [0, 1].
    cutoff: f64,
    /// Conditional-update stability threshold q in [0, 1].
    conditional_update: f64,
    /// Number of timed runs; the result reports their mean duration.
    repeat: usize,
    /// Terminate when the updated-vertex count repeats.
    stall_detection: bool,
}

/// Outcome of a LabelRank run.
#[derive(Debug, Clone)]
pub struct LabelRankResult {
    /// Community label per vertex: the argmax label of its final labelset.
    pub membership: Vec<usize>,
    /// Iterations the main loop performed.
    pub iterations: usize,
    /// Wall-clock time of the main loop, averaged over `repeat` runs.
    pub elapsed: Duration,
}

impl LabelRank {
    /// Create a detector with the default parameters.
    pub fn new() -> Self {
        Self {
            max_iterations: 500,
            inflation: 1.2,
            cutoff: 0.3,
            conditional_update: 0.3,
            repeat: 1,
            stall_detection: true,
        }
    }

    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the inflation exponent.
    ///
    /// Higher values sharpen distributions faster.
    pub fn with_inflation(mut self, inflation: f64) -> Self {
        self.inflation = inflation;
        self
    }

    /// Set the relative cutoff threshold.
    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Set the conditional-update threshold q.
    ///
    /// A vertex skips its update when more than `q · degree` of its neighbors
    /// already carry every label the vertex does.
    pub fn with_conditional_update(mut self, conditional_update: f64) -> Self {
        self.conditional_update = conditional_update;
        self
    }

    /// Set how many times the run is repeated for timing. The membership and
    /// iteration count of the last run are reported.
    pub fn with_repeat(mut self, repeat: usize) -> Self {
        self.repeat = repeat;
        self
    }

    /// Enable or disable the stall guard.
    ///
    /// The guard ends the loop as soon as two consecutive sweeps update the
    /// same number of vertices. It can stop short of full convergence when
    /// the count merely plateaus; disable it to run until no vertex updates
    /// or the cap is reached.
    pub fn with_stall_detection(mut self, stall_detection: bool) -> Self {
        self.stall_detection = stall_detection;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.inflation.is_nan() || self.inflation <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "inflation",
                message: "must be positive",
            });
        }
        if !(0.0..=1.0).contains(&self.cutoff) {
            return Err(Error::InvalidParameter {
                name: "cutoff",
                message: "must lie in [0, 1]",
            });
        }
        if !(0.0..=1.0).contains(&self.conditional_update) {
            return Err(Error::InvalidParameter {
                name: "conditional_update",
                message: "must lie in [0, 1]",
            });
        }
        if self.max_iterations < 1 {
            return Err(Error::InvalidParameter {
                name: "max_iterations",
                message: "must be at least 1",
            });
        }
        if self.repeat < 1 {
            return Err(Error::InvalidParameter {
                name: "repeat",
                message: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Run LabelRank on `graph` and return the full result.
    pub fn run<N, E: EdgeWeight>(&self, graph: &UnGraph<N, E>) -> Result<LabelRankResult> {
        self.validate()?;
        if graph.node_count() == 0 {
            return Err(Error::EmptyInput);
        }
        let order: Vec<usize> = (0..graph.node_count()).collect();

        let (mut result, _) = self.run_with_order(graph, &order);
        let mut elapsed_total = result.elapsed;
        for _ in 1..self.repeat {
            let (r, _) = self.run_with_order(graph, &order);
            elapsed_total += r.elapsed;
            result = r;
        }
        result.elapsed = elapsed_total / self.repeat as u32;
        Ok(result)
    }

    /// Run LabelRank with the sweep parallelized across vertices.
    ///
    /// During a sweep, updating `ms[u]` reads only the previous iteration's
    /// labelsets and writes only `ms[u]`, so vertices are independent; the
    /// buffer swap is the only barrier. The result is identical to
    /// [`run`](Self::run).
    #[cfg(feature = "parallel")]
    pub fn run_parallel<N: Sync, E: EdgeWeight + Sync>(
        &self,
        graph: &UnGraph<N, E>,
    ) -> Result<LabelRankResult> {
        self.validate()?;
        if graph.node_count() == 0 {
            return Err(Error::EmptyInput);
        }

        let mut result = self.run_parallel_once(graph);
        let mut elapsed_total = result.elapsed;
        for _ in 1..self.repeat {
            let r = self.run_parallel_once(graph);
            elapsed_total += r.elapsed;
            result = r;
        }
        result.elapsed = elapsed_total / self.repeat as u32;
        Ok(result)
    }

    /// Sequential driver over an explicit vertex order. Also returns the
    /// final labelsets so tests can check the per-vertex invariants.
    pub(crate) fn run_with_order<N, E: EdgeWeight>(
        &self,
        graph: &UnGraph<N, E>,
        order: &[usize],
    ) -> (LabelRankResult, Vec<SparseLabelset>) {
        let span = graph.node_count();
        let mut ls = vec![SparseLabelset::new(); span];
        let mut ms = vec![SparseLabelset::new(); span];
        let mut acc = DenseAccumulator::new(span);

        for &u in order {
            initialize_vertex(graph, u, &mut acc, self.inflation, self.cutoff, &mut ls[u]);
        }

        let started = Instant::now();
        let mut iterations = 0;
        let mut updated_prev = None;
        loop {
            let mut updated = 0usize;
            for &u in order {
                if is_stable(graph, u, &ls, self.conditional_update) {
                    ms[u].clone_from(&ls[u]);
                } else {
                    update_vertex(graph, u, &ls, &mut acc, self.inflation, self.cutoff, &mut ms[u]);
                    updated += 1;
                }
            }
            iterations += 1;
            std::mem::swap(&mut ls, &mut ms);
            if updated == 0 {
                break;
            }
            if self.stall_detection && updated_prev == Some(updated) {
                break;
            }
            if iterations >= self.max_iterations {
                break;
            }
            updated_prev = Some(updated);
        }
        let elapsed = started.elapsed();
        debug!("labelrank finished: span={span} iterations={iterations}");

        let result = LabelRankResult {
            membership: membership_of(&ls),
            iterations,
            elapsed,
        };
        (result, ls)
    }

    #[cfg(feature = "parallel")]
    fn run_parallel_once<N: Sync, E: EdgeWeight + Sync>(
        &self,
        graph: &UnGraph<N, E>,
    ) -> LabelRankResult {
        let span = graph.node_count();
        let mut ls: Vec<SparseLabelset> = vec![SparseLabelset::new(); span];
        let mut ms = vec![SparseLabelset::new(); span];

        ls.par_iter_mut().enumerate().for_each_init(
            || DenseAccumulator::new(span),
            |acc, (u, slot)| initialize_vertex(graph, u, acc, self.inflation, self.cutoff, slot),
        );

        let started = Instant::now();
        let mut iterations = 0;
        let mut updated_prev = None;
        loop {
            let ls_ref = &ls;
            let updated: usize = ms
                .par_iter_mut()
                .enumerate()
                .map_init(
                    || DenseAccumulator::new(span),
                    |acc, (u, slot)| {
                        if is_stable(graph, u, ls_ref, self.conditional_update) {
                            slot.clone_from(&ls_ref[u]);
                            0
                        } else {
                            update_vertex(graph, u, ls_ref, acc, self.inflation, self.cutoff, slot);
                            1
                        }
                    },
                )
                .sum();
            iterations += 1;
            std::mem::swap(&mut ls, &mut ms);
            if updated == 0 {
                break;
            }
            if self.stall_detection && updated_prev == Some(updated) {
                break;
            }
            if iterations >= self.max_iterations {
                break;
            }
            updated_prev = Some(updated);
        }
        let elapsed = started.elapsed();
        debug!("labelrank finished (parallel): span={span} iterations={iterations}");

        LabelRankResult {
            membership: membership_of(&ls),
            iterations,
            elapsed,
        }
    }
}

impl Default for LabelRank {
    fn default() -> Self {
        Self::new()
    }
}

impl CommunityDetection for LabelRank {
    fn detect<N, E: EdgeWeight>(&self, graph: &UnGraph<N, E>) -> Result<Vec<usize>> {
        let result = self.run(graph)?;

        // Renumber to consecutive integers
        let mut unique: Vec<usize> = result.membership.clone();
        unique.sort_unstable();
        unique.dedup();

        Ok(result
            .membership
            .iter()
            .map(|&l| unique.iter().position(|&u| u == l).unwrap_or(0))
            .collect())
    }
}

/// Argmax label per vertex; a vertex with an empty labelset keeps its own id.
fn membership_of(ls: &[SparseLabelset]) -> Vec<usize> {
    ls.iter()
        .enumerate()
        .map(|(u, set)| set.best().map_or(u, |(k, _)| k))
        .collect()
}

/// Build vertex `u`'s initial labelset: its out-edge weights, normalized,
/// inflated, and cut off.
fn initialize_vertex<N, E: EdgeWeight>(
    graph: &UnGraph<N, E>,
    u: usize,
    acc: &mut DenseAccumulator,
    inflation: f64,
    cutoff: f64,
    out: &mut SparseLabelset,
) {
    acc.clear();
    let mut sumw = 0.0;
    for edge in graph.edges(NodeIndex::new(u)) {
        let w = edge.weight().weight();
        acc.add(edge.target().index(), w);
        sumw += w;
    }
    if sumw > 0.0 {
        acc.finalize(1.0 / sumw, inflation, cutoff);
        acc.drain_into(out);
    } else {
        acc.clear();
        *out = SparseLabelset::singleton(u, 1.0);
    }
}

/// Recompute vertex `u`'s labelset from its neighbors' previous-iteration
/// labelsets into `out`.
fn update_vertex<N, E: EdgeWeight>(
    graph: &UnGraph<N, E>,
    u: usize,
    ls: &[SparseLabelset],
    acc: &mut DenseAccumulator,
    inflation: f64,
    cutoff: f64,
    out: &mut SparseLabelset,
) {
    acc.clear();
    let mut sumw = 0.0;
    for edge in graph.edges(NodeIndex::new(u)) {
        let w = edge.weight().weight();
        acc.combine(&ls[edge.target().index()], w);
        sumw += w;
    }
    if sumw > 0.0 {
        acc.finalize(1.0 / sumw, inflation, cutoff);
        acc.drain_into(out);
    } else {
        acc.clear();
        *out = SparseLabelset::singleton(u, 1.0);
    }
}

/// Whether vertex `u` may skip its update this sweep: more than `q · degree`
/// of its neighbors' labelsets already contain every label of `ls[u]`.
fn is_stable<N, E: EdgeWeight>(
    graph: &UnGraph<N, E>,
    u: usize,
    ls: &[SparseLabelset],
    q: f64,
) -> bool {
    let mut degree = 0usize;
    let mut count = 0usize;
    for edge in graph.edges(NodeIndex::new(u)) {
        degree += 1;
        if ls[u].is_subset(&ls[edge.target().index()]) {
            count += 1;
        }
    }
    count as f64 > q * degree as f64
}
