//! Error types for graph construction and path queries.

use std::fmt;

/// Which id namespace a duplicate-id failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Node,
    Link,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Node => write!(f, "node"),
            EntityKind::Link => write!(f, "link"),
        }
    }
}

/// Main error type for oriole operations.
///
/// Queries that find no path are not errors; they succeed with an empty
/// path and an infinite cost. These variants cover malformed inputs and
/// lookups of ids the graph has never seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A node id referenced by a mutation or query is not in the graph
    UnknownNode(String),

    /// A link id lookup failed
    UnknownLink(String),

    /// Attempt to register a node or link under an id that is already taken
    DuplicateId { kind: EntityKind, id: String },

    /// Attempt to add a link with no cost dimensions
    EmptyCosts(String),

    /// A traversed link does not carry the requested cost dimension
    UnknownCostDimension { link: String, dimension: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownNode(id) => {
                write!(f, "node '{id}' is not in the graph")
            }
            Error::UnknownLink(id) => {
                write!(f, "link '{id}' is not in the graph")
            }
            Error::DuplicateId { kind, id } => {
                write!(f, "{kind} id '{id}' is already registered")
            }
            Error::EmptyCosts(id) => {
                write!(f, "link '{id}' has no cost dimensions")
            }
            Error::UnknownCostDimension { link, dimension } => {
                write!(f, "link '{link}' does not carry cost dimension '{dimension}'")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Convenience result type for oriole operations
pub type Result<T> = std::result::Result<T, Error>;
