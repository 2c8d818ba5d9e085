#[cfg(test)]
mod tests {
    use crate::labelrank::LabelRank;
    use crate::labelset::Labelset;
    use crate::modularity::{modularity, total_edge_weight};
    use petgraph::graph::UnGraph;
    use std::collections::HashMap;

    /// Undirected graph with unit-weight edges and a self-loop per vertex.
    fn graph_with_self_loops(n: usize, edges: &[(usize, usize)]) -> UnGraph<(), f64> {
        let mut graph = UnGraph::new_undirected();
        let nodes: Vec<_> = (0..n).map(|_| graph.add_node(())).collect();
        for &(a, b) in edges {
            graph.add_edge(nodes[a], nodes[b], 1.0);
        }
        for &node in &nodes {
            graph.add_edge(node, node, 1.0);
        }
        graph
    }

    fn two_triangles() -> UnGraph<(), f64> {
        graph_with_self_loops(6, &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5)])
    }

    fn bridged_triangles() -> UnGraph<(), f64> {
        graph_with_self_loops(6, &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (2, 3)])
    }

    /// Whether two membership vectors induce the same partition, allowing
    /// for community labels being renamed.
    fn same_partition(a: &[usize], b: &[usize]) -> bool {
        if a.len() != b.len() {
            return false;
        }
        let mut fwd = HashMap::new();
        let mut bwd = HashMap::new();
        for (&x, &y) in a.iter().zip(b) {
            if *fwd.entry(x).or_insert(y) != y {
                return false;
            }
            if *bwd.entry(y).or_insert(x) != x {
                return false;
            }
        }
        true
    }

    #[test]
    fn test_two_disjoint_triangles() {
        let graph = two_triangles();
        let result = LabelRank::new().run(&graph).unwrap();

        assert!(result.iterations <= 5);

        // exactly two groups, one per triangle
        let left = result.membership[0];
        let right = result.membership[3];
        assert_ne!(left, right);
        assert!(result.membership[..3].iter().all(|&c| c == left));
        assert!(result.membership[3..].iter().all(|&c| c == right));

        let m = total_edge_weight(&graph) / 2.0;
        let q = modularity(&graph, |u| result.membership[u], m, 1.0);
        assert!(q > 0.4, "q={q}");
    }

    #[test]
    fn test_single_clique() {
        let graph = graph_with_self_loops(4, &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
        let result = LabelRank::new().run(&graph).unwrap();

        let c = result.membership[0];
        assert!(result.membership.iter().all(|&x| x == c));

        let m = total_edge_weight(&graph) / 2.0;
        let q = modularity(&graph, |u| result.membership[u], m, 1.0);
        assert!(q.abs() < 1e-12);
    }

    #[test]
    fn test_bridged_triangles_stay_separate() {
        let graph = bridged_triangles();
        let result = LabelRank::new().run(&graph).unwrap();

        assert!(result.iterations <= 10);

        // Labels propagate within a triangle but never across the bridge:
        // each side only ever holds its own vertices as candidates.
        assert!(result.membership[..3].iter().all(|&c| c < 3));
        assert!(result.membership[3..].iter().all(|&c| (3..6).contains(&c)));

        // wing vertices agree with their triangle mates
        assert_eq!(result.membership[0], result.membership[1]);
        assert_eq!(result.membership[4], result.membership[5]);
    }

    #[test]
    fn test_path_graph_terminates() {
        let graph = graph_with_self_loops(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]);
        let result = LabelRank::new().run(&graph).unwrap();

        assert!(result.iterations <= 500);
        let mut labels: Vec<usize> = result.membership.clone();
        labels.sort_unstable();
        labels.dedup();
        assert!((1..=5).contains(&labels.len()));
    }

    #[test]
    fn test_stall_guard_stops_constant_update_count() {
        // With q = 1.0 no vertex is ever stable, so every sweep updates all
        // six vertices; the second sweep repeats the count and must stop the
        // loop there.
        let graph = bridged_triangles();
        let result = LabelRank::new()
            .with_conditional_update(1.0)
            .run(&graph)
            .unwrap();
        assert_eq!(result.iterations, 2);
    }

    #[test]
    fn test_disabled_stall_guard_runs_to_cap() {
        let graph = bridged_triangles();
        let result = LabelRank::new()
            .with_conditional_update(1.0)
            .with_stall_detection(false)
            .with_max_iterations(8)
            .run(&graph)
            .unwrap();
        assert_eq!(result.iterations, 8);
    }

    #[test]
    fn test_iterations_never_exceed_cap() {
        let graphs = [
            two_triangles(),
            bridged_triangles(),
            graph_with_self_loops(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]),
        ];
        for graph in &graphs {
            let result = LabelRank::new().with_max_iterations(3).run(graph).unwrap();
            assert!(result.iterations <= 3);
        }
    }

    #[test]
    fn test_labelsets_stay_nonempty_and_cut_off() {
        // Inspect the labelsets after every iteration prefix: never empty,
        // and every retained value clears the relative cutoff.
        let graph = bridged_triangles();
        let order: Vec<usize> = (0..graph.node_count()).collect();
        for cap in 1..=4 {
            let detector = LabelRank::new()
                .with_stall_detection(false)
                .with_max_iterations(cap);
            let (_, labelsets) = detector.run_with_order(&graph, &order);
            for set in &labelsets {
                assert!(!set.is_empty());
                let max = set.max_value();
                set.for_each(|_, v| assert!(v >= 0.3 * max));
            }
        }
    }

    #[test]
    fn test_sweep_order_does_not_change_result() {
        // Jacobi updates read only the previous iteration's labelsets, so a
        // reversed sweep must produce the same partition.
        let graph = bridged_triangles();
        let forward: Vec<usize> = (0..graph.node_count()).collect();
        let reversed: Vec<usize> = forward.iter().rev().copied().collect();

        let detector = LabelRank::new();
        let (a, _) = detector.run_with_order(&graph, &forward);
        let (b, _) = detector.run_with_order(&graph, &reversed);

        assert_eq!(a.iterations, b.iterations);
        assert!(same_partition(&a.membership, &b.membership));
    }

    #[test]
    fn test_runs_are_deterministic() {
        let graph = bridged_triangles();
        let first = LabelRank::new().run(&graph).unwrap();
        let second = LabelRank::new().run(&graph).unwrap();
        assert_eq!(first.membership, second.membership);
        assert_eq!(first.iterations, second.iterations);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        for graph in [two_triangles(), bridged_triangles()] {
            let sequential = LabelRank::new().run(&graph).unwrap();
            let parallel = LabelRank::new().run_parallel(&graph).unwrap();
            assert_eq!(sequential.membership, parallel.membership);
            assert_eq!(sequential.iterations, parallel.iterations);
        }
    }
}
