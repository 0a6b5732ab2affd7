//! Stable identifiers for graph entities.
//!
//! Nodes are identified by their label alone. Edges are identified by an
//! [`EdgeUid`]: the stored endpoint pair plus, for temporal edges, the
//! `(start, end)` span. Undirected edges store their endpoints in sorted
//! order, so both insertion orders collapse onto one uid.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::Time;

/// Unique edge identifier: endpoint pair plus optional activity span.
///
/// Displays as `a-b` for static edges and `a-b|3-7` for temporal edges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeUid {
    pub node1: String,
    pub node2: String,
    /// `(start, end)` for temporal edges, `None` for static edges.
    pub span: Option<(Time, Time)>,
}

impl EdgeUid {
    /// Uid of a static edge between `node1` and `node2`, as given.
    pub fn fixed(node1: impl Into<String>, node2: impl Into<String>) -> Self {
        EdgeUid {
            node1: node1.into(),
            node2: node2.into(),
            span: None,
        }
    }

    /// Uid of a temporal edge between `node1` and `node2`, as given.
    pub fn temporal(
        node1: impl Into<String>,
        node2: impl Into<String>,
        start: Time,
        end: Time,
    ) -> Self {
        EdgeUid {
            node1: node1.into(),
            node2: node2.into(),
            span: Some((start, end)),
        }
    }

    /// Returns the same uid with its endpoints in sorted order.
    ///
    /// This is the key under which undirected collections store the edge.
    pub fn canonical(mut self) -> Self {
        if self.node2 < self.node1 {
            std::mem::swap(&mut self.node1, &mut self.node2);
        }
        self
    }

    /// The node-pair label (`a-b`), shared by every temporal edge between
    /// the same endpoints.
    pub fn label(&self) -> String {
        format!("{}-{}", self.node1, self.node2)
    }

    /// Returns `true` if this uid names a temporal edge.
    pub fn is_temporal(&self) -> bool {
        self.span.is_some()
    }
}

impl fmt::Display for EdgeUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some((start, end)) => write!(f, "{}-{}|{}-{}", self.node1, self.node2, start, end),
            None => write!(f, "{}-{}", self.node1, self.node2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_static_and_temporal() {
        assert_eq!(EdgeUid::fixed("a", "b").to_string(), "a-b");
        assert_eq!(EdgeUid::temporal("a", "b", 3, 7).to_string(), "a-b|3-7");
    }

    #[test]
    fn canonical_sorts_endpoints() {
        let uid = EdgeUid::temporal("z", "a", 1, 2).canonical();
        assert_eq!(uid.node1, "a");
        assert_eq!(uid.node2, "z");
        assert_eq!(uid, EdgeUid::temporal("a", "z", 1, 2).canonical());
    }

    #[test]
    fn label_ignores_span() {
        let a = EdgeUid::temporal("a", "b", 1, 2);
        let b = EdgeUid::temporal("a", "b", 5, 9);
        assert_ne!(a, b);
        assert_eq!(a.label(), b.label());
        assert!(a.is_temporal());
        assert!(!EdgeUid::fixed("a", "b").is_temporal());
    }

    #[test]
    fn serde_roundtrip() {
        let uid = EdgeUid::temporal("a", "b", 3, 7);
        let json = serde_json::to_string(&uid).unwrap();
        let back: EdgeUid = serde_json::from_str(&json).unwrap();
        assert_eq!(uid, back);
    }
}
