//! Modularity of a community partition.
//!
//! Modularity Q measures how much more intra-community edge weight a
//! partition captures than a degree-preserving random rewiring would:
//!
//! ```text
//! Q = Σ_c [ cin_c / 2M − R · (ctot_c / 2M)² ]
//! ```
//!
//! where `cin_c` is the weight of edges inside community c, `ctot_c` the
//! weight of all edges touching c, `M` half the total directed edge weight,
//! and `R ∈ (0, 1]` the resolution parameter. Q conventionally lies in
//! `[-0.5, 1]`; higher is better.
//!
//! Communities are given as a function from vertex to community id, so any
//! membership representation works:
//!
//! ```rust
//! use petgraph::graph::UnGraph;
//! use commune::modularity::{modularity, total_edge_weight};
//!
//! let mut graph = UnGraph::<(), f64>::new_undirected();
//! let a = graph.add_node(());
//! let b = graph.add_node(());
//! let c = graph.add_node(());
//! graph.add_edge(a, b, 1.0);
//! graph.add_edge(b, c, 1.0);
//!
//! let m = total_edge_weight(&graph) / 2.0;
//! let q = modularity(&graph, |_| 0, m, 1.0);
//! assert!((-0.5..=1.0).contains(&q));
//! ```
//!
//! ## References
//!
//! Newman & Girvan (2004). "Finding and evaluating community structure in
//! networks." Physical Review E 69, 026113.

use crate::traits::EdgeWeight;
use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;

/// Total directed edge weight of the graph: every undirected edge counts
/// from both endpoints, a self-loop once. Callers pass
/// `total_edge_weight(graph) / 2.0` as `M` to the modularity functions.
pub fn total_edge_weight<N, E: EdgeWeight>(graph: &UnGraph<N, E>) -> f64 {
    let mut total = 0.0;
    for u in graph.node_indices() {
        for edge in graph.edges(u) {
            total += edge.weight().weight();
        }
    }
    total
}

/// Modularity contribution of one community, from the weight of its internal
/// edges `cin` and the weight of all its edges `ctot`.
pub fn community_modularity(cin: f64, ctot: f64, m: f64, resolution: f64) -> f64 {
    cin / (2.0 * m) - resolution * (ctot / (2.0 * m)).powi(2)
}

/// Modularity of a graph under the membership function `fc`.
///
/// `fc(u)` must return a community id in `[0, span)`; vertex ids themselves
/// (as LabelRank produces) always qualify. `m` is half the total directed
/// edge weight and `resolution` lies in `(0, 1]`.
pub fn modularity<N, E, F>(graph: &UnGraph<N, E>, fc: F, m: f64, resolution: f64) -> f64
where
    E: EdgeWeight,
    F: Fn(usize) -> usize,
{
    let span = graph.node_count();
    let mut cin = vec![0.0; span];
    let mut ctot = vec![0.0; span];
    for u in graph.node_indices() {
        let c = fc(u.index());
        for edge in graph.edges(u) {
            let w = edge.weight().weight();
            if fc(edge.target().index()) == c {
                cin[c] += w;
            }
            ctot[c] += w;
        }
    }
    cin.iter()
        .zip(&ctot)
        .map(|(&cin_c, &ctot_c)| community_modularity(cin_c, ctot_c, m, resolution))
        .sum()
}

/// Modularity where every vertex is its own community.
pub fn modularity_singletons<N, E: EdgeWeight>(
    graph: &UnGraph<N, E>,
    m: f64,
    resolution: f64,
) -> f64 {
    modularity(graph, |u| u, m, resolution)
}

/// Change in modularity from moving a vertex out of community D into C.
///
/// The arguments are the vertex's edge weight toward C (`vcout`) and toward
/// D (`vdout`), its total edge weight (`vtot`), and the total edge weights of
/// C and D (`ctot`, `dtot`).
pub fn delta_modularity(
    vcout: f64,
    vdout: f64,
    vtot: f64,
    ctot: f64,
    dtot: f64,
    m: f64,
    resolution: f64,
) -> f64 {
    (vcout - vdout) / m - resolution * vtot * (vtot + ctot - dtot) / (2.0 * m * m)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// K4 with self-loops, unit weights.
    fn clique4() -> UnGraph<(), f64> {
        let mut graph = UnGraph::new_undirected();
        let nodes: Vec<_> = (0..4).map(|_| graph.add_node(())).collect();
        for i in 0..4 {
            for j in (i + 1)..4 {
                graph.add_edge(nodes[i], nodes[j], 1.0);
            }
            graph.add_edge(nodes[i], nodes[i], 1.0);
        }
        graph
    }

    fn two_triangles() -> UnGraph<(), f64> {
        let mut graph = UnGraph::new_undirected();
        let nodes: Vec<_> = (0..6).map(|_| graph.add_node(())).collect();
        for &(a, b) in &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5)] {
            graph.add_edge(nodes[a], nodes[b], 1.0);
        }
        graph
    }

    #[test]
    fn test_total_edge_weight_counts_both_directions() {
        // 6 undirected unit edges seen from both endpoints, 4 self-loops once
        let graph = clique4();
        assert!((total_edge_weight(&graph) - 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_community_has_zero_modularity() {
        let graph = clique4();
        let m = total_edge_weight(&graph) / 2.0;
        let q = modularity(&graph, |_| 0, m, 1.0);
        assert!(q.abs() < 1e-12);
    }

    #[test]
    fn test_good_partition_scores_high() {
        let graph = two_triangles();
        let m = total_edge_weight(&graph) / 2.0;
        let q = modularity(&graph, |u| if u < 3 { 0 } else { 3 }, m, 1.0);
        assert!((q - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_bounds_hold_for_assorted_partitions() {
        let graph = two_triangles();
        let m = total_edge_weight(&graph) / 2.0;
        let partitions: [&dyn Fn(usize) -> usize; 4] = [
            &|_| 0,
            &|u| u,
            &|u| if u < 3 { 0 } else { 3 },
            &|u| u % 2,
        ];
        for fc in partitions {
            let q = modularity(&graph, fc, m, 1.0);
            assert!((-0.5..=1.0).contains(&q), "q={q}");
        }
    }

    #[test]
    fn test_singleton_overload_matches_identity_membership() {
        let graph = two_triangles();
        let m = total_edge_weight(&graph) / 2.0;
        let by_fn = modularity(&graph, |u| u, m, 1.0);
        let by_overload = modularity_singletons(&graph, m, 1.0);
        assert!((by_fn - by_overload).abs() < 1e-12);
    }

    #[test]
    fn test_invariant_under_label_renaming() {
        let graph = two_triangles();
        let m = total_edge_weight(&graph) / 2.0;
        let original = modularity(&graph, |u| if u < 3 { 0 } else { 3 }, m, 1.0);
        // permute community labels: 0 -> 5, 3 -> 1
        let renamed = modularity(&graph, |u| if u < 3 { 5 } else { 1 }, m, 1.0);
        assert!((original - renamed).abs() < 1e-12);
    }

    #[test]
    fn test_lower_resolution_raises_single_community_score() {
        let graph = clique4();
        let m = total_edge_weight(&graph) / 2.0;
        let q_full = modularity(&graph, |_| 0, m, 1.0);
        let q_half = modularity(&graph, |_| 0, m, 0.5);
        assert!(q_half > q_full);
        assert!((q_half - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_delta_modularity_of_null_move_is_zero() {
        // "moving" a vertex from D back into D: C is D without the vertex
        // (ctot = dtot - vtot) and the vertex touches both equally
        let dq = delta_modularity(2.0, 2.0, 4.0, 2.0, 6.0, 10.0, 1.0);
        assert!(dq.abs() < 1e-12);
    }

    #[test]
    fn test_delta_modularity_prefers_heavier_target() {
        // same communities as the null move, but more of the vertex's weight
        // points into C: the move should gain
        let dq = delta_modularity(3.0, 1.0, 4.0, 2.0, 6.0, 10.0, 1.0);
        assert!(dq > 0.0);
    }
}
