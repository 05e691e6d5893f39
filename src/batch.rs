//! Parallel batch drivers over independent origin/destination queries.
//!
//! Two sharing regimes. The read-only driver runs every query against the
//! caller's graph: the kernel only reads, so nothing is synchronized. The
//! mutating driver (penalty search inflates link costs mid-query) gives
//! each worker its own deep replica of the graph and routes queries to the
//! workers' replicas.
//!
//! Results are positionally aligned with the inputs: slot `i` holds the
//! outcome of query `i` regardless of completion order, and a failing
//! query fills only its own slot.

use rayon::prelude::*;
use tracing::info;

use crate::dijkstra::{dijkstra, LabelSet};
use crate::graph::OrientedGraph;
use crate::path::Path;
use crate::penalty::{k_shortest_paths, PenaltySettings};
use oriole_common::Result;

/// `threads == 0` delegates to rayon's default of one worker per hardware
/// thread.
fn worker_pool(threads: usize) -> rayon::ThreadPool {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .expect("failed to build worker pool")
}

fn check_batch_shape(origins: &[String], destinations: &[String], label_sets: &[LabelSet]) {
    assert_eq!(
        origins.len(),
        destinations.len(),
        "origin and destination vectors must be parallel"
    );
    assert!(
        label_sets.is_empty() || label_sets.len() == origins.len(),
        "label sets must be empty or parallel to the queries"
    );
}

/// One shortest-path query per `(origins[i], destinations[i])` pair, run in
/// parallel on the shared graph with dynamic work stealing.
///
/// `label_sets` is either empty (no filtering anywhere) or parallel to the
/// queries. The graph must not be mutated by anyone for the duration of
/// the call; that is the caller's contract, not enforced here.
pub fn parallel_dijkstra(
    graph: &OrientedGraph,
    origins: &[String],
    destinations: &[String],
    cost_dimension: &str,
    label_sets: &[LabelSet],
    threads: usize,
) -> Vec<Result<Path>> {
    check_batch_shape(origins, destinations, label_sets);

    let no_filter = LabelSet::default();
    let pool = worker_pool(threads);
    info!(
        queries = origins.len(),
        threads = pool.current_num_threads(),
        "dispatching read-only batch"
    );
    pool.install(|| {
        (0..origins.len())
            .into_par_iter()
            .map(|i| {
                let labels = label_sets.get(i).unwrap_or(&no_filter);
                dijkstra(graph, &origins[i], &destinations[i], cost_dimension, labels)
            })
            .collect()
    })
}

/// One penalty alternative-path query per pair, each worker operating on
/// its own replica of the graph.
///
/// The replicas exist because the penalty search mutates link costs while
/// it runs; its restore-on-exit discipline keeps a replica clean between
/// consecutive queries on the same worker. The caller's graph is never
/// touched.
pub fn parallel_k_shortest_paths(
    graph: &OrientedGraph,
    origins: &[String],
    destinations: &[String],
    cost_dimension: &str,
    label_sets: &[LabelSet],
    settings: &PenaltySettings,
    threads: usize,
) -> Vec<Result<Vec<Path>>> {
    check_batch_shape(origins, destinations, label_sets);

    let no_filter = LabelSet::default();
    let pool = worker_pool(threads);
    info!(
        queries = origins.len(),
        threads = pool.current_num_threads(),
        "dispatching mutating batch on per-worker replicas"
    );
    pool.install(|| {
        (0..origins.len())
            .into_par_iter()
            .map_init(
                || graph.clone(),
                |replica, i| {
                    let labels = label_sets.get(i).unwrap_or(&no_filter);
                    k_shortest_paths(
                        replica,
                        &origins[i],
                        &destinations[i],
                        cost_dimension,
                        labels,
                        settings,
                    )
                },
            )
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CostMap, Link, Node};
    use oriole_common::Error;

    fn line_graph(n: usize) -> OrientedGraph {
        let mut graph = OrientedGraph::new();
        for i in 0..n {
            graph
                .add_node(Node::new(&i.to_string(), i as f64, 0.0))
                .unwrap();
        }
        for i in 0..n - 1 {
            let (up, down) = (i.to_string(), (i + 1).to_string());
            graph
                .add_link(Link::new(
                    &format!("{up}_{down}"),
                    &up,
                    &down,
                    1.0,
                    CostMap::from_iter([("time".to_string(), 1.0)]),
                ))
                .unwrap();
        }
        graph
    }

    #[test]
    fn results_align_with_query_order() {
        let graph = line_graph(6);
        let origins: Vec<String> = vec!["0", "1", "2", "0"].into_iter().map(String::from).collect();
        let destinations: Vec<String> =
            vec!["5", "3", "2", "4"].into_iter().map(String::from).collect();

        let results = parallel_dijkstra(&graph, &origins, &destinations, "time", &[], 4);

        let costs: Vec<f64> = results
            .into_iter()
            .map(|r| r.unwrap().cost)
            .collect();
        assert_eq!(costs, vec![5.0, 2.0, 0.0, 4.0]);
    }

    #[test]
    fn a_failing_query_fills_only_its_slot() {
        let graph = line_graph(4);
        let origins: Vec<String> = vec!["0", "ghost", "1"].into_iter().map(String::from).collect();
        let destinations: Vec<String> =
            vec!["3", "3", "3"].into_iter().map(String::from).collect();

        let results = parallel_dijkstra(&graph, &origins, &destinations, "time", &[], 2);

        assert_eq!(results[0].as_ref().unwrap().cost, 3.0);
        assert_eq!(
            results[1].clone().unwrap_err(),
            Error::UnknownNode("ghost".to_string())
        );
        assert_eq!(results[2].as_ref().unwrap().cost, 2.0);
    }

    #[test]
    fn mutating_batch_never_touches_the_callers_graph() {
        let graph = line_graph(5);
        let before = graph.clone();
        let origins: Vec<String> = (0..8).map(|_| "0".to_string()).collect();
        let destinations: Vec<String> = (0..8).map(|_| "4".to_string()).collect();

        let results = parallel_k_shortest_paths(
            &graph,
            &origins,
            &destinations,
            "time",
            &[],
            &PenaltySettings::new(3, 0.0, f64::INFINITY),
            4,
        );

        assert_eq!(graph, before);
        for result in results {
            let paths = result.unwrap();
            assert_eq!(paths[0].nodes, vec!["0", "1", "2", "3", "4"]);
        }
    }

    #[test]
    fn per_query_label_sets_are_applied() {
        let mut graph = OrientedGraph::new();
        for id in ["0", "1", "2"] {
            graph.add_node(Node::new(id, 0.0, 0.0)).unwrap();
        }
        graph
            .add_link(
                Link::new(
                    "fast",
                    "0",
                    "2",
                    1.0,
                    CostMap::from_iter([("time".to_string(), 1.0)]),
                )
                .with_label("car"),
            )
            .unwrap();
        graph
            .add_link(
                Link::new(
                    "0_1",
                    "0",
                    "1",
                    1.0,
                    CostMap::from_iter([("time".to_string(), 5.0)]),
                )
                .with_label("walk"),
            )
            .unwrap();
        graph
            .add_link(
                Link::new(
                    "1_2",
                    "1",
                    "2",
                    1.0,
                    CostMap::from_iter([("time".to_string(), 5.0)]),
                )
                .with_label("walk"),
            )
            .unwrap();

        let origins: Vec<String> = vec!["0".to_string(), "0".to_string()];
        let destinations: Vec<String> = vec!["2".to_string(), "2".to_string()];
        let label_sets = vec![
            LabelSet::default(),
            LabelSet::from_iter(["walk".to_string()]),
        ];

        let results =
            parallel_dijkstra(&graph, &origins, &destinations, "time", &label_sets, 2);

        assert_eq!(results[0].as_ref().unwrap().cost, 1.0);
        assert_eq!(results[1].as_ref().unwrap().cost, 10.0);
    }
}
