//! Alternative paths by iterative cost inflation.
//!
//! Each returned path has every cost dimension of its links multiplied by a
//! penalty factor before the next search, making reused links progressively
//! less attractive. All mutations are undone before returning, on every
//! exit path.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::dijkstra::{dijkstra, LabelSet};
use crate::graph::{CostMap, OrientedGraph};
use crate::path::Path;
use oriole_common::{Error, Result};

/// Tuning knobs for [`k_shortest_paths`].
///
/// `min_detour`/`max_detour` bound the acceptable *length* difference
/// between a candidate and the primary path; length is a separate quantity
/// from the routed cost dimension.
#[derive(Debug, Clone)]
pub struct PenaltySettings {
    /// Maximum number of paths to return.
    pub max_paths: usize,
    /// Minimum extra length over the primary path.
    pub min_detour: f64,
    /// Maximum extra length over the primary path.
    pub max_detour: f64,
    /// Multiplier applied to every cost dimension of a used link. Repeated
    /// use compounds.
    pub factor: f64,
    /// Consecutive rejected candidates tolerated before giving up.
    pub max_retries: usize,
}

impl PenaltySettings {
    pub fn new(max_paths: usize, min_detour: f64, max_detour: f64) -> Self {
        PenaltySettings {
            max_paths,
            min_detour,
            max_detour,
            factor: 10.0,
            max_retries: 10,
        }
    }
}

/// Scoped cost inflation. Snapshots each link's full cost map the first
/// time the link is penalized and restores every snapshot on drop, so the
/// graph is clean again even on early returns and panics.
struct PenalizedGraph<'g> {
    graph: &'g mut OrientedGraph,
    saved: FxHashMap<String, CostMap>,
}

impl<'g> PenalizedGraph<'g> {
    fn new(graph: &'g mut OrientedGraph) -> Self {
        PenalizedGraph {
            graph,
            saved: FxHashMap::default(),
        }
    }

    fn graph(&self) -> &OrientedGraph {
        &*self.graph
    }

    /// Multiply every cost dimension of every link along `nodes` by
    /// `factor`. The snapshot is taken once per link; revisits keep
    /// compounding on top of it.
    fn penalize(&mut self, nodes: &[String], factor: f64) -> Result<()> {
        for pair in nodes.windows(2) {
            let link_id = self
                .graph
                .nodes
                .get(&pair[0])
                .ok_or_else(|| Error::UnknownNode(pair[0].clone()))?
                .adj
                .get(&pair[1])
                .ok_or_else(|| Error::UnknownLink(format!("{}->{}", pair[0], pair[1])))?
                .clone();
            let Some(link) = self.graph.links.get_mut(&link_id) else {
                return Err(Error::UnknownLink(link_id));
            };
            self.saved
                .entry(link_id)
                .or_insert_with(|| link.costs.clone());
            for value in link.costs.values_mut() {
                *value *= factor;
            }
        }
        Ok(())
    }
}

impl Drop for PenalizedGraph<'_> {
    fn drop(&mut self) {
        for (link_id, costs) in self.saved.drain() {
            if let Some(link) = self.graph.links.get_mut(&link_id) {
                link.costs = costs;
            }
        }
    }
}

/// Up to `settings.max_paths` alternative paths between one origin and
/// destination.
///
/// The primary path is always returned first (even when no path exists).
/// Alternatives are accepted when their extra length over the primary lies
/// within `[min_detour, max_detour]` and their node sequence is new; the
/// search stops after `max_retries` consecutive rejections. Costs reported
/// on the returned paths are recomputed under the restored (unpenalized)
/// cost maps.
pub fn k_shortest_paths(
    graph: &mut OrientedGraph,
    origin: &str,
    destination: &str,
    cost_dimension: &str,
    accessible_labels: &LabelSet,
    settings: &PenaltySettings,
) -> Result<Vec<Path>> {
    let mut penalized = PenalizedGraph::new(graph);

    let first = dijkstra(
        penalized.graph(),
        origin,
        destination,
        cost_dimension,
        accessible_labels,
    )?;
    if !first.is_found() {
        return Ok(vec![first]);
    }
    let first_length = penalized.graph().path_length(&first.nodes)?;
    penalized.penalize(&first.nodes, settings.factor)?;

    let mut paths = vec![first];
    let mut retries = 0;
    while paths.len() < settings.max_paths && retries < settings.max_retries {
        let candidate = dijkstra(
            penalized.graph(),
            origin,
            destination,
            cost_dimension,
            accessible_labels,
        )?;
        if !candidate.is_found() {
            break;
        }
        penalized.penalize(&candidate.nodes, settings.factor)?;

        let detour = penalized.graph().path_length(&candidate.nodes)? - first_length;
        let in_window = settings.min_detour <= detour && detour <= settings.max_detour;
        let is_new = !paths.iter().any(|p| p.nodes == candidate.nodes);
        if in_window && is_new {
            debug!(detour, nodes = candidate.nodes.len(), "accepted alternative");
            paths.push(candidate);
            retries = 0;
        } else {
            debug!(detour, in_window, is_new, "rejected candidate");
            retries += 1;
        }
    }

    drop(penalized);

    for path in &mut paths {
        path.cost = graph.path_cost(&path.nodes, cost_dimension)?;
    }
    Ok(paths)
}
