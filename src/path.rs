//! Path query results.

use std::fmt;

/// An ordered node-id sequence from origin to destination, paired with the
/// accumulated value of the requested cost dimension.
///
/// An empty sequence with infinite cost means "no path exists". That is a
/// successful query outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub nodes: Vec<String>,
    pub cost: f64,
}

impl Path {
    pub fn not_found() -> Self {
        Path {
            nodes: Vec::new(),
            cost: f64::INFINITY,
        }
    }

    pub fn is_found(&self) -> bool {
        !self.nodes.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.cost)?;
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{node}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_nodes_in_order() {
        let path = Path {
            nodes: vec!["0".to_string(), "3".to_string(), "2".to_string()],
            cost: 24.0,
        };
        assert_eq!(path.to_string(), "24 [0, 3, 2]");
    }

    #[test]
    fn not_found_is_empty_and_infinite() {
        let path = Path::not_found();
        assert!(!path.is_found());
        assert!(path.cost.is_infinite());
    }
}
