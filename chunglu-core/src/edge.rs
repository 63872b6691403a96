//! Directed edge records emitted by the generator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A directed edge between two global vertex identifiers.
///
/// Edges are created by the sampler and consumed once by a sink. They
/// serialise with two named fields so stored records stay self-describing.
///
/// # Examples
/// ```
/// use chunglu_core::Edge;
///
/// let edge = Edge::new(3, 7);
/// assert_eq!(edge.from(), 3);
/// assert_eq!(edge.to(), 7);
/// assert!(!edge.is_self_loop());
/// ```
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Edge {
    from: u64,
    to: u64,
}

impl Edge {
    /// Creates an edge from `from` to `to`.
    #[must_use]
    pub const fn new(from: u64, to: u64) -> Self {
        Self { from, to }
    }

    /// Returns the source vertex identifier.
    #[must_use]
    pub const fn from(&self) -> u64 {
        self.from
    }

    /// Returns the target vertex identifier.
    #[must_use]
    pub const fn to(&self) -> u64 {
        self.to
    }

    /// Returns whether both endpoints are the same vertex.
    #[must_use]
    pub const fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialises_with_named_fields() {
        let json = serde_json::to_string(&Edge::new(1, 2)).expect("edge must serialise");
        assert_eq!(json, r#"{"from":1,"to":2}"#);
    }

    #[test]
    fn deserialises_named_fields() {
        let edge: Edge =
            serde_json::from_str(r#"{"to":9,"from":4}"#).expect("edge must deserialise");
        assert_eq!(edge, Edge::new(4, 9));
    }

    #[test]
    fn displays_as_arrow() {
        assert_eq!(Edge::new(5, 6).to_string(), "5 -> 6");
    }
}
