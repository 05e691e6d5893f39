//! Oriole: shortest and alternative paths on multimodal transport graphs.
//!
//! The graph model is a directed multi-attribute arena: links carry a
//! length, a label acting as an access filter, and any number of named
//! cost dimensions; nodes may forbid specific turning movements
//! (predecessor → successor pairs). On top of it:
//!
//! - `dijkstra` — turn-restricted, label-filtered single-pair kernel
//! - `k_shortest_paths` — alternatives by penalty reweighting, with
//!   restore-on-exit cost discipline
//! - `yen_k_shortest_paths` — Yen's deviation enumeration
//! - `parallel_dijkstra` / `parallel_k_shortest_paths` — batch drivers;
//!   read-only queries share the graph, mutating queries run on
//!   per-worker replicas
//! - `generate_manhattan` — synthetic grid graphs for benchmarks
//!
//! Key principle: kernels never leave a graph dirty. Everything that
//! inflates or severs a link cost does so behind a scope guard that
//! restores the snapshot on every exit path.

pub mod batch;
pub mod dijkstra;
pub mod graph;
pub mod manhattan;
pub mod path;
pub mod penalty;
pub mod yen;

pub use batch::{parallel_dijkstra, parallel_k_shortest_paths};
pub use dijkstra::{dijkstra, LabelSet};
pub use graph::{
    CostMap, ExcludeMovements, Link, Node, OrientedGraph, DEFAULT_LABEL, DEFAULT_PREDECESSOR,
};
pub use manhattan::generate_manhattan;
pub use path::Path;
pub use penalty::{k_shortest_paths, PenaltySettings};
pub use yen::yen_k_shortest_paths;

pub use oriole_common::{EntityKind, Error, Result};
