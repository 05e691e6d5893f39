//! Yen's deviation algorithm for loopless k-shortest paths.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::dijkstra::{dijkstra, LabelSet};
use crate::graph::OrientedGraph;
use crate::path::Path;
use oriole_common::{Error, Result};

/// Scoped edge removal for one spur iteration. A severed link keeps its
/// identity but its routed cost dimension is set to `+∞`, which the kernel
/// can never improve on. Snapshots are scalar (one dimension per link) and
/// restored on drop.
struct SeveredLinks<'g> {
    graph: &'g mut OrientedGraph,
    dimension: String,
    saved: FxHashMap<String, f64>,
}

impl<'g> SeveredLinks<'g> {
    fn new(graph: &'g mut OrientedGraph, dimension: &str) -> Self {
        SeveredLinks {
            graph,
            dimension: dimension.to_string(),
            saved: FxHashMap::default(),
        }
    }

    fn graph(&self) -> &OrientedGraph {
        &*self.graph
    }

    fn sever(&mut self, upstream: &str, downstream: &str) -> Result<()> {
        let link_id = self
            .graph
            .nodes
            .get(upstream)
            .ok_or_else(|| Error::UnknownNode(upstream.to_string()))?
            .adj
            .get(downstream)
            .ok_or_else(|| Error::UnknownLink(format!("{upstream}->{downstream}")))?
            .clone();
        let Some(link) = self.graph.links.get_mut(&link_id) else {
            return Err(Error::UnknownLink(link_id));
        };
        let Some(value) = link.costs.get_mut(&self.dimension) else {
            return Err(Error::UnknownCostDimension {
                link: link_id,
                dimension: self.dimension.clone(),
            });
        };
        self.saved.entry(link_id).or_insert(*value);
        *value = f64::INFINITY;
        Ok(())
    }
}

impl Drop for SeveredLinks<'_> {
    fn drop(&mut self) {
        for (link_id, value) in self.saved.drain() {
            if let Some(link) = self.graph.links.get_mut(&link_id) {
                link.costs.insert(self.dimension.clone(), value);
            }
        }
    }
}

/// Up to `max_paths` loopless shortest paths in increasing cost order.
///
/// For each accepted path, every node except the destination is tried as a
/// spur: the links that previous accepted paths take out of that spur
/// (sharing the same root prefix) are severed, a fresh search runs from
/// the spur to the destination, and root + spur path becomes a candidate.
/// The graph is transiently mutated and left untouched on return, on every
/// exit path.
pub fn yen_k_shortest_paths(
    graph: &mut OrientedGraph,
    origin: &str,
    destination: &str,
    cost_dimension: &str,
    accessible_labels: &LabelSet,
    max_paths: usize,
) -> Result<Vec<Path>> {
    let first = dijkstra(graph, origin, destination, cost_dimension, accessible_labels)?;
    let mut accepted = vec![first];
    let mut candidates: Vec<Path> = Vec::new();

    for round in 1..max_paths {
        let prev_nodes = accepted[accepted.len() - 1].nodes.clone();
        for i in 0..prev_nodes.len().saturating_sub(1) {
            let spur_node = prev_nodes[i].clone();
            let root = &prev_nodes[..=i];
            let root_cost = graph.path_cost(root, cost_dimension)?;
            trace!(round, spur = %spur_node, "exploring deviation");

            let mut severed = SeveredLinks::new(graph, cost_dimension);
            for path in &accepted {
                if path.nodes.len() > i + 1 && path.nodes[..i] == root[..i] {
                    severed.sever(&path.nodes[i], &path.nodes[i + 1])?;
                }
            }

            let spur = dijkstra(
                severed.graph(),
                &spur_node,
                destination,
                cost_dimension,
                accessible_labels,
            )?;
            drop(severed);

            if !spur.is_found() {
                continue;
            }
            let mut nodes = root.to_vec();
            nodes.extend_from_slice(&spur.nodes[1..]);
            let already_known = accepted
                .iter()
                .chain(candidates.iter())
                .any(|p| p.nodes == nodes);
            if !already_known {
                candidates.push(Path {
                    nodes,
                    cost: root_cost + spur.cost,
                });
            }
        }

        if candidates.is_empty() {
            break;
        }
        let best = min_candidate(&candidates);
        accepted.push(candidates.remove(best));
    }

    Ok(accepted)
}

/// Index of the cheapest candidate; cost ties fall back to the node
/// sequence so selection is deterministic.
fn min_candidate(candidates: &[Path]) -> usize {
    let mut best = 0;
    for (index, candidate) in candidates.iter().enumerate().skip(1) {
        let current = &candidates[best];
        let better = match candidate.cost.partial_cmp(&current.cost) {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => candidate.nodes < current.nodes,
            _ => false,
        };
        if better {
            best = index;
        }
    }
    best
}
