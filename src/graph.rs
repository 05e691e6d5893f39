//! Graph data model: nodes, directed links, adjacency and turn restrictions.
//!
//! The graph is an arena of owned nodes and links addressed by string ids.
//! Nothing is reference-counted or shared: cloning a graph yields a fully
//! independent replica, which is what the mutating batch driver hands to
//! each worker.

use rustc_hash::{FxHashMap, FxHashSet};

use oriole_common::{EntityKind, Error, Result};

/// Predecessor sentinel used when a traversal starts at a node and there is
/// no upstream movement to restrict against.
pub const DEFAULT_PREDECESSOR: &str = "_default";

/// Label assigned to links created without an explicit one.
pub const DEFAULT_LABEL: &str = "_def";

/// Named cost dimensions carried by a link (e.g. `"time"`, `"length"`).
pub type CostMap = FxHashMap<String, f64>;

/// Turn-exclusion table: predecessor node id → successor node ids that may
/// not be entered when this node was reached from that predecessor.
pub type ExcludeMovements = FxHashMap<String, FxHashSet<String>>;

/// A directed edge between two nodes.
///
/// `length` is a physical quantity distinct from the entries of `costs`;
/// the penalty-based alternative-path search windows candidates on length
/// while routing on a chosen cost dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: String,
    pub upstream: String,
    pub downstream: String,
    pub length: f64,
    pub costs: CostMap,
    pub label: String,
}

impl Link {
    pub fn new(id: &str, upstream: &str, downstream: &str, length: f64, costs: CostMap) -> Self {
        Link {
            id: id.to_string(),
            upstream: upstream.to_string(),
            downstream: downstream.to_string(),
            length,
            costs,
            label: DEFAULT_LABEL.to_string(),
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// Value of one cost dimension. Missing dimensions are an error, not a
    /// silent zero: every query dimension must be present on every link.
    pub fn cost(&self, dimension: &str) -> Result<f64> {
        self.costs
            .get(dimension)
            .copied()
            .ok_or_else(|| Error::UnknownCostDimension {
                link: self.id.clone(),
                dimension: dimension.to_string(),
            })
    }

    /// Merge new values into the cost map, keeping dimensions that are not
    /// mentioned.
    pub fn update_costs(&mut self, costs: &CostMap) {
        for (dimension, value) in costs {
            self.costs.insert(dimension.clone(), *value);
        }
    }
}

/// A graph vertex with forward and reverse adjacency.
///
/// `adj` and `radj` map neighbor node ids to the id of the connecting link;
/// the graph's link table owns the `Link` itself. `position` is purely
/// informational.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub position: [f64; 2],
    pub label: Option<String>,
    /// downstream node id → link id
    pub adj: FxHashMap<String, String>,
    /// upstream node id → link id
    pub radj: FxHashMap<String, String>,
    pub exclude_movements: ExcludeMovements,
}

impl Node {
    pub fn new(id: &str, x: f64, y: f64) -> Self {
        Node {
            id: id.to_string(),
            position: [x, y],
            label: None,
            adj: FxHashMap::default(),
            radj: FxHashMap::default(),
            exclude_movements: ExcludeMovements::default(),
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_exclusions(mut self, exclude_movements: ExcludeMovements) -> Self {
        self.exclude_movements = exclude_movements;
        self
    }

    /// Outgoing link ids that may be taken when this node was entered from
    /// `predecessor`.
    ///
    /// The restriction key is where we came from; the forbidden set is
    /// where we may not go: a link is withheld iff its downstream node is
    /// in `exclude_movements[predecessor]`. Pass [`DEFAULT_PREDECESSOR`]
    /// when the traversal starts here.
    pub fn exits<'a>(&'a self, predecessor: &str) -> impl Iterator<Item = &'a str> + 'a {
        let banned = self.exclude_movements.get(predecessor);
        self.adj.iter().filter_map(move |(downstream, link_id)| {
            match banned {
                Some(set) if set.contains(downstream.as_str()) => None,
                _ => Some(link_id.as_str()),
            }
        })
    }

    /// Incoming link ids usable by a reverse traversal; the mirror of
    /// [`Node::exits`], filtering on the upstream endpoint instead.
    pub fn entrances<'a>(&'a self, predecessor: &str) -> impl Iterator<Item = &'a str> + 'a {
        let banned = self.exclude_movements.get(predecessor);
        self.radj.iter().filter_map(move |(upstream, link_id)| {
            match banned {
                Some(set) if set.contains(upstream.as_str()) => None,
                _ => Some(link_id.as_str()),
            }
        })
    }
}

/// A directed multi-cost graph.
///
/// Invariants held between public operations:
/// - every link's endpoints exist, and both endpoint adjacency maps point
///   back at the link by id;
/// - at most one link per ordered node pair (re-adding a pair replaces the
///   earlier link and retires its id);
/// - node and link ids are unique within their kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrientedGraph {
    pub nodes: FxHashMap<String, Node>,
    pub links: FxHashMap<String, Link>,
}

impl OrientedGraph {
    pub fn new() -> Self {
        OrientedGraph::default()
    }

    pub fn add_node(&mut self, node: Node) -> Result<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(Error::DuplicateId {
                kind: EntityKind::Node,
                id: node.id,
            });
        }
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    pub fn add_link(&mut self, link: Link) -> Result<()> {
        if self.links.contains_key(&link.id) {
            return Err(Error::DuplicateId {
                kind: EntityKind::Link,
                id: link.id,
            });
        }
        if link.costs.is_empty() {
            return Err(Error::EmptyCosts(link.id));
        }
        if !self.nodes.contains_key(&link.downstream) {
            return Err(Error::UnknownNode(link.downstream));
        }
        let Some(up_node) = self.nodes.get_mut(&link.upstream) else {
            return Err(Error::UnknownNode(link.upstream));
        };

        // Re-linking an already connected ordered pair replaces the earlier
        // link and retires its id. Documented behavior, not recommended.
        if let Some(old_id) = up_node.adj.insert(link.downstream.clone(), link.id.clone()) {
            self.links.remove(&old_id);
        }
        if let Some(down_node) = self.nodes.get_mut(&link.downstream) {
            down_node.radj.insert(link.upstream.clone(), link.id.clone());
        }
        self.links.insert(link.id.clone(), link);
        Ok(())
    }

    pub fn get_link(&self, id: &str) -> Result<&Link> {
        self.links
            .get(id)
            .ok_or_else(|| Error::UnknownLink(id.to_string()))
    }

    /// The link connecting `upstream` directly to `downstream`, if the pair
    /// is connected. A missing pair is reported as an unknown link named
    /// `"upstream->downstream"`.
    pub fn link_between(&self, upstream: &str, downstream: &str) -> Result<&Link> {
        let link_id = self
            .nodes
            .get(upstream)
            .ok_or_else(|| Error::UnknownNode(upstream.to_string()))?
            .adj
            .get(downstream)
            .ok_or_else(|| Error::UnknownLink(format!("{upstream}->{downstream}")))?;
        self.links
            .get(link_id)
            .ok_or_else(|| Error::UnknownLink(link_id.clone()))
    }

    /// Sum of link lengths along a node sequence.
    pub fn path_length(&self, nodes: &[String]) -> Result<f64> {
        let mut total = 0.0;
        for pair in nodes.windows(2) {
            total += self.link_between(&pair[0], &pair[1])?.length;
        }
        Ok(total)
    }

    /// Sum of one cost dimension along a node sequence.
    pub fn path_cost(&self, nodes: &[String], dimension: &str) -> Result<f64> {
        let mut total = 0.0;
        for pair in nodes.windows(2) {
            total += self.link_between(&pair[0], &pair[1])?.cost(dimension)?;
        }
        Ok(total)
    }

    /// Concatenate disjoint graphs into a fresh one. Any node or link id
    /// collision across the inputs fails with `DuplicateId`.
    pub fn merge(graphs: &[&OrientedGraph]) -> Result<OrientedGraph> {
        let mut merged = OrientedGraph::new();
        for graph in graphs {
            for node in graph.nodes.values() {
                // Adjacency is rebuilt from the link set below.
                let mut copy = node.clone();
                copy.adj.clear();
                copy.radj.clear();
                merged.add_node(copy)?;
            }
        }
        for graph in graphs {
            for link in graph.links.values() {
                merged.add_link(link.clone())?;
            }
        }
        Ok(merged)
    }
}
