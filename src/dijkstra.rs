//! Turn-restricted, label-filtered Dijkstra kernel.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::graph::{OrientedGraph, DEFAULT_PREDECESSOR};
use crate::path::Path;
use oriole_common::{Error, Result};

/// Link labels a query is allowed to traverse. The empty set means
/// "no filter": every label is accepted.
pub type LabelSet = FxHashSet<String>;

/// Heap entry ordered by `(distance, node id)`. The secondary key makes
/// pops deterministic when several nodes share a tentative distance.
struct QueueEntry<'a> {
    dist: f64,
    node: &'a str,
}

impl PartialEq for QueueEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.dist == other.dist && self.node == other.node
    }
}

impl Eq for QueueEntry<'_> {}

impl PartialOrd for QueueEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior on BinaryHeap
        other
            .dist
            .partial_cmp(&self.dist)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Single-pair shortest path under one cost dimension.
///
/// Classical lazy-deletion Dijkstra. Turn restrictions are applied at
/// relaxation time through `exits(prev[u])`: state is keyed on nodes only
/// and the recorded predecessor stands in for the full `(node, predecessor)`
/// state. When the optimum is unique the two agree; on graphs where the
/// shortest restricted path must reach an intermediate node from a
/// non-optimal predecessor this approximation can miss it.
///
/// Returns the node sequence and its cost; an unreachable destination
/// yields [`Path::not_found`], which is a success. Unknown endpoints and a
/// missing cost dimension on a traversed link are errors.
pub fn dijkstra(
    graph: &OrientedGraph,
    origin: &str,
    destination: &str,
    cost_dimension: &str,
    accessible_labels: &LabelSet,
) -> Result<Path> {
    let Some((origin_key, _)) = graph.nodes.get_key_value(origin) else {
        return Err(Error::UnknownNode(origin.to_string()));
    };
    let origin_key = origin_key.as_str();
    if !graph.nodes.contains_key(destination) {
        return Err(Error::UnknownNode(destination.to_string()));
    }

    let mut dist: FxHashMap<&str, f64> = FxHashMap::default();
    let mut prev: FxHashMap<&str, &str> = FxHashMap::default();
    let mut heap: BinaryHeap<QueueEntry> = BinaryHeap::new();

    dist.insert(origin_key, 0.0);
    heap.push(QueueEntry {
        dist: 0.0,
        node: origin_key,
    });

    while let Some(QueueEntry { dist: d, node: u }) = heap.pop() {
        if d > dist.get(u).copied().unwrap_or(f64::INFINITY) {
            continue; // stale heap entry
        }
        if u == destination {
            return Ok(reconstruct(origin, destination, d, &prev));
        }

        let node = &graph.nodes[u];
        let predecessor = prev.get(u).copied().unwrap_or(DEFAULT_PREDECESSOR);
        for link_id in node.exits(predecessor) {
            let link = match graph.links.get(link_id) {
                Some(link) => link,
                None => panic!("adjacency of node '{u}' references missing link '{link_id}'"),
            };
            if !accessible_labels.is_empty() && !accessible_labels.contains(link.label.as_str()) {
                continue;
            }
            let new_dist = d + link.cost(cost_dimension)?;
            let neighbor = link.downstream.as_str();
            if new_dist < dist.get(neighbor).copied().unwrap_or(f64::INFINITY) {
                dist.insert(neighbor, new_dist);
                prev.insert(neighbor, u);
                heap.push(QueueEntry {
                    dist: new_dist,
                    node: neighbor,
                });
            }
        }
    }

    Ok(Path::not_found())
}

fn reconstruct(origin: &str, destination: &str, cost: f64, prev: &FxHashMap<&str, &str>) -> Path {
    let mut nodes = vec![destination.to_string()];
    let mut current = destination;
    while current != origin {
        current = prev[current];
        nodes.push(current.to_string());
    }
    nodes.reverse();
    Path { nodes, cost }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CostMap, ExcludeMovements, Link, Node};

    fn time_costs(value: f64) -> CostMap {
        CostMap::from_iter([("time".to_string(), value)])
    }

    /// Unit square: 0 at the origin, 1 east, 2 north-east, 3 north.
    fn square() -> OrientedGraph {
        let mut graph = OrientedGraph::new();
        graph.add_node(Node::new("0", 0.0, 0.0)).unwrap();
        graph.add_node(Node::new("1", 1.0, 0.0)).unwrap();
        graph.add_node(Node::new("2", 1.0, 1.0)).unwrap();
        graph.add_node(Node::new("3", 0.0, 1.0)).unwrap();
        graph
            .add_link(Link::new("0_1", "0", "1", 1.0, time_costs(12.0)))
            .unwrap();
        graph
            .add_link(Link::new("1_2", "1", "2", 1.0, time_costs(13.0)))
            .unwrap();
        graph
            .add_link(Link::new("0_3", "0", "3", 1.0, time_costs(12.0)))
            .unwrap();
        graph
            .add_link(Link::new("3_2", "3", "2", 1.0, time_costs(12.0)))
            .unwrap();
        graph
    }

    #[test]
    fn shortest_path_on_the_square() {
        let graph = square();
        let path = dijkstra(&graph, "0", "2", "time", &LabelSet::default()).unwrap();
        assert_eq!(path.nodes, vec!["0", "3", "2"]);
        assert_eq!(path.cost, 24.0);
    }

    #[test]
    fn a_banned_movement_reroutes_the_path() {
        let mut graph = OrientedGraph::new();
        graph.add_node(Node::new("0", 0.0, 0.0)).unwrap();
        graph.add_node(Node::new("1", 1.0, 0.0)).unwrap();
        graph.add_node(Node::new("2", 1.0, 1.0)).unwrap();
        // Arriving at 3 from 0, continuing to 2 is forbidden.
        let exclusions = ExcludeMovements::from_iter([(
            "0".to_string(),
            FxHashSet::from_iter(["2".to_string()]),
        )]);
        graph
            .add_node(Node::new("3", 0.0, 1.0).with_exclusions(exclusions))
            .unwrap();
        graph
            .add_link(Link::new("0_1", "0", "1", 1.0, time_costs(12.0)))
            .unwrap();
        graph
            .add_link(Link::new("1_2", "1", "2", 1.0, time_costs(13.0)))
            .unwrap();
        graph
            .add_link(Link::new("0_3", "0", "3", 1.0, time_costs(12.0)))
            .unwrap();
        graph
            .add_link(Link::new("3_2", "3", "2", 1.0, time_costs(12.0)))
            .unwrap();

        let path = dijkstra(&graph, "0", "2", "time", &LabelSet::default()).unwrap();
        assert_eq!(path.nodes, vec!["0", "1", "2"]);
        assert_eq!(path.cost, 25.0);
    }

    #[test]
    fn origin_equals_destination() {
        let graph = square();
        let path = dijkstra(&graph, "0", "0", "time", &LabelSet::default()).unwrap();
        assert_eq!(path.nodes, vec!["0"]);
        assert_eq!(path.cost, 0.0);
    }

    #[test]
    fn unknown_endpoints_are_errors() {
        let graph = square();
        assert_eq!(
            dijkstra(&graph, "9", "2", "time", &LabelSet::default()).unwrap_err(),
            Error::UnknownNode("9".to_string())
        );
        assert_eq!(
            dijkstra(&graph, "0", "9", "time", &LabelSet::default()).unwrap_err(),
            Error::UnknownNode("9".to_string())
        );
    }

    #[test]
    fn unreachable_destination_is_a_successful_miss() {
        let mut graph = square();
        graph.add_node(Node::new("island", 9.0, 9.0)).unwrap();
        let path = dijkstra(&graph, "0", "island", "time", &LabelSet::default()).unwrap();
        assert!(!path.is_found());
        assert!(path.cost.is_infinite());
    }

    #[test]
    fn label_filter_hides_links() {
        let mut graph = OrientedGraph::new();
        graph.add_node(Node::new("0", 0.0, 0.0)).unwrap();
        graph.add_node(Node::new("1", 1.0, 0.0)).unwrap();
        graph.add_node(Node::new("2", 2.0, 0.0)).unwrap();
        graph
            .add_link(Link::new("fast", "0", "2", 1.0, time_costs(1.0)).with_label("car"))
            .unwrap();
        graph
            .add_link(Link::new("0_1", "0", "1", 1.0, time_costs(5.0)).with_label("walk"))
            .unwrap();
        graph
            .add_link(Link::new("1_2", "1", "2", 1.0, time_costs(5.0)).with_label("walk"))
            .unwrap();

        let unfiltered = dijkstra(&graph, "0", "2", "time", &LabelSet::default()).unwrap();
        assert_eq!(unfiltered.nodes, vec!["0", "2"]);

        let walk_only = LabelSet::from_iter(["walk".to_string()]);
        let filtered = dijkstra(&graph, "0", "2", "time", &walk_only).unwrap();
        assert_eq!(filtered.nodes, vec!["0", "1", "2"]);
        assert_eq!(filtered.cost, 10.0);
    }

    #[test]
    fn equal_distances_break_ties_on_node_id() {
        // Two cost-identical routes 0→a→9 and 0→b→9; the kernel must settle
        // "a" first and keep doing so on every run.
        let mut graph = OrientedGraph::new();
        for id in ["0", "a", "b", "9"] {
            graph.add_node(Node::new(id, 0.0, 0.0)).unwrap();
        }
        for (id, up, down) in [
            ("0_a", "0", "a"),
            ("0_b", "0", "b"),
            ("a_9", "a", "9"),
            ("b_9", "b", "9"),
        ] {
            graph
                .add_link(Link::new(id, up, down, 1.0, time_costs(1.0)))
                .unwrap();
        }

        for _ in 0..16 {
            let path = dijkstra(&graph, "0", "9", "time", &LabelSet::default()).unwrap();
            assert_eq!(path.nodes, vec!["0", "a", "9"]);
        }
    }

    #[test]
    fn missing_cost_dimension_fails_fast() {
        let graph = square();
        let err = dijkstra(&graph, "0", "2", "fuel", &LabelSet::default()).unwrap_err();
        assert!(matches!(err, Error::UnknownCostDimension { .. }));
    }
}
