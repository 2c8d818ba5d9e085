//! Run LabelRank on a Matrix Market graph file.
//!
//! Usage: `cargo run --example labelrank_mtx -- graph.mtx [repeat]`
//!
//! Loads the matrix as an undirected weighted graph, inserts a self-loop of
//! weight 1 on every vertex that lacks one, runs LabelRank, and prints the
//! modularity before (every vertex its own community) and after, along with
//! the iteration count and main-loop wall-clock time.

use commune::{modularity, modularity_singletons, total_edge_weight, LabelRank};
use petgraph::graph::UnGraph;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or("usage: labelrank_mtx <graph.mtx> [repeat]")?;
    let repeat: usize = match args.next() {
        Some(s) => s.parse()?,
        None => 5,
    };

    println!("Loading graph {path} ...");
    let graph = read_mtx(&path)?;
    println!(
        "order: {} size: {} [undirected, self-loops]",
        graph.node_count(),
        graph.edge_count()
    );

    let m = total_edge_weight(&graph) / 2.0;
    println!(
        "modularity (singletons): {:.6}",
        modularity_singletons(&graph, m, 1.0)
    );

    let result = LabelRank::new().with_repeat(repeat).run(&graph)?;
    let q = modularity(&graph, |u| result.membership[u], m, 1.0);
    println!(
        "labelrank: iterations={} time={:.3} ms modularity={:.6}",
        result.iterations,
        result.elapsed.as_secs_f64() * 1e3,
        q
    );

    Ok(())
}

/// Read a Matrix Market coordinate file as an undirected weighted graph.
///
/// Handles `general` and `symmetric` layouts and `real`/`integer`/`pattern`
/// fields (pattern entries get weight 1). Duplicate entries, including the
/// transposed duplicates a general symmetric matrix carries, collapse to one
/// undirected edge. Every vertex ends up with a self-loop: file-provided or
/// inserted with weight 1.
fn read_mtx(path: &str) -> Result<UnGraph<(), f64>, Box<dyn std::error::Error>> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = reader.lines();

    let header = lines.next().ok_or("empty mtx file")??;
    if !header.starts_with("%%MatrixMarket matrix coordinate") {
        return Err("expected a MatrixMarket coordinate header".into());
    }
    let pattern = header.contains(" pattern");

    let mut span = 0usize;
    let mut sized = false;
    let mut weights: HashMap<(usize, usize), f64> = HashMap::new();
    for line in lines {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        let mut fields = line.split_whitespace();
        if !sized {
            let rows: usize = fields.next().ok_or("bad size line")?.parse()?;
            let cols: usize = fields.next().ok_or("bad size line")?.parse()?;
            span = rows.max(cols);
            sized = true;
            continue;
        }
        let u: usize = fields.next().ok_or("bad entry line")?.parse()?;
        let v: usize = fields.next().ok_or("bad entry line")?.parse()?;
        let w: f64 = if pattern {
            1.0
        } else {
            fields.next().ok_or("bad entry line")?.parse()?
        };
        let (u, v) = (u - 1, v - 1);
        let key = if u <= v { (u, v) } else { (v, u) };
        weights.entry(key).or_insert(w);
    }
    if !sized {
        return Err("mtx file has no size line".into());
    }

    let mut graph = UnGraph::with_capacity(span, weights.len() + span);
    let nodes: Vec<_> = (0..span).map(|_| graph.add_node(())).collect();
    for (&(u, v), &w) in &weights {
        graph.add_edge(nodes[u], nodes[v], w);
    }
    for u in 0..span {
        if !weights.contains_key(&(u, u)) {
            graph.add_edge(nodes[u], nodes[u], 1.0);
        }
    }
    Ok(graph)
}
