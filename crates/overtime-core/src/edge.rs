//! Edge types for static and temporal graphs.
//!
//! A [`TemporalEdge`] is active over the closed interval `[start, end]`. A
//! [`StaticEdge`] is the degenerate case with no time attributes. Both are
//! immutable once created; undirected edges store their endpoints in sorted
//! order so that `(a, b)` and `(b, a)` name the same edge.
//!
//! [`Edge`] is the tagged variant handed out when a caller does not know in
//! advance which representation a graph owns.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::EdgeUid;
use crate::time::{Interval, Time};

fn ordered(node1: String, node2: String, directed: bool) -> (String, String) {
    if !directed && node2 < node1 {
        (node2, node1)
    } else {
        (node1, node2)
    }
}

// ---------------------------------------------------------------------------
// Temporal edges
// ---------------------------------------------------------------------------

/// An edge active during `[start, end]`.
///
/// For directed edges `node1` is the source and `node2` the sink.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TemporalEdgeRepr")]
pub struct TemporalEdge {
    node1: String,
    node2: String,
    start: Time,
    end: Time,
    directed: bool,
}

/// Unvalidated wire form; deserialization goes through [`TemporalEdge::new`].
#[derive(Deserialize)]
struct TemporalEdgeRepr {
    node1: String,
    node2: String,
    start: Time,
    end: Time,
    directed: bool,
}

impl TryFrom<TemporalEdgeRepr> for TemporalEdge {
    type Error = CoreError;

    fn try_from(raw: TemporalEdgeRepr) -> Result<Self, Self::Error> {
        TemporalEdge::new(raw.node1, raw.node2, raw.start, raw.end, raw.directed)
    }
}

impl TemporalEdge {
    /// Creates a temporal edge. Fails with [`CoreError::InvalidEdge`] when
    /// `end < start`, when `end` is [`Time::MAX`] (a timespan covering it
    /// has no exclusive end) or when `end - start` does not fit in a
    /// [`Time`].
    pub fn new(
        node1: impl Into<String>,
        node2: impl Into<String>,
        start: Time,
        end: Time,
        directed: bool,
    ) -> Result<Self, CoreError> {
        let (node1, node2) = ordered(node1.into(), node2.into(), directed);
        if end < start {
            return Err(CoreError::InvalidEdge {
                reason: format!(
                    "edge {}-{} ends at {} before it starts at {}",
                    node1, node2, end, start
                ),
            });
        }
        if end == Time::MAX || end.checked_sub(start).is_none() {
            return Err(CoreError::InvalidEdge {
                reason: format!(
                    "edge {}-{} over [{}, {}] is outside the representable time range",
                    node1, node2, start, end
                ),
            });
        }
        Ok(TemporalEdge {
            node1,
            node2,
            start,
            end,
            directed,
        })
    }

    pub fn node1(&self) -> &str {
        &self.node1
    }

    pub fn node2(&self) -> &str {
        &self.node2
    }

    /// Source endpoint (same as `node1`).
    pub fn source(&self) -> &str {
        &self.node1
    }

    /// Sink endpoint (same as `node2`).
    pub fn sink(&self) -> &str {
        &self.node2
    }

    pub fn start(&self) -> Time {
        self.start
    }

    pub fn end(&self) -> Time {
        self.end
    }

    /// `end - start`, never negative.
    pub fn duration(&self) -> Time {
        self.end - self.start
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn uid(&self) -> EdgeUid {
        EdgeUid::temporal(&self.node1, &self.node2, self.start, self.end)
    }

    /// The node-pair label (`a-b`).
    pub fn label(&self) -> String {
        format!("{}-{}", self.node1, self.node2)
    }

    /// Returns `true` if the edge is active at `t` (`start <= t <= end`).
    pub fn is_active(&self, t: Time) -> bool {
        self.start <= t && t <= self.end
    }

    /// Returns `true` if `[start, end]` is fully contained in `interval`.
    pub fn within(&self, interval: &Interval) -> bool {
        interval.encloses(self.start, self.end)
    }

    /// Returns `true` if `label` is one of the endpoints.
    pub fn touches(&self, label: &str) -> bool {
        self.node1 == label || self.node2 == label
    }

    /// Returns the endpoint opposite `label`, if `label` is an endpoint.
    pub fn other(&self, label: &str) -> Option<&str> {
        if self.node1 == label {
            Some(&self.node2)
        } else if self.node2 == label {
            Some(&self.node1)
        } else {
            None
        }
    }

    /// Drops the time attributes.
    pub fn to_static(&self) -> StaticEdge {
        StaticEdge {
            node1: self.node1.clone(),
            node2: self.node2.clone(),
            directed: self.directed,
        }
    }
}

// ---------------------------------------------------------------------------
// Static edges
// ---------------------------------------------------------------------------

/// An edge without time attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaticEdge {
    node1: String,
    node2: String,
    directed: bool,
}

impl StaticEdge {
    pub fn new(node1: impl Into<String>, node2: impl Into<String>, directed: bool) -> Self {
        let (node1, node2) = ordered(node1.into(), node2.into(), directed);
        StaticEdge {
            node1,
            node2,
            directed,
        }
    }

    pub fn node1(&self) -> &str {
        &self.node1
    }

    pub fn node2(&self) -> &str {
        &self.node2
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn uid(&self) -> EdgeUid {
        EdgeUid::fixed(&self.node1, &self.node2)
    }

    pub fn touches(&self, label: &str) -> bool {
        self.node1 == label || self.node2 == label
    }

    pub fn other(&self, label: &str) -> Option<&str> {
        if self.node1 == label {
            Some(&self.node2)
        } else if self.node2 == label {
            Some(&self.node1)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tagged edge
// ---------------------------------------------------------------------------

/// Either edge representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    Static(StaticEdge),
    Temporal(TemporalEdge),
}

impl Edge {
    pub fn uid(&self) -> EdgeUid {
        match self {
            Edge::Static(e) => e.uid(),
            Edge::Temporal(e) => e.uid(),
        }
    }

    pub fn node1(&self) -> &str {
        match self {
            Edge::Static(e) => e.node1(),
            Edge::Temporal(e) => e.node1(),
        }
    }

    pub fn node2(&self) -> &str {
        match self {
            Edge::Static(e) => e.node2(),
            Edge::Temporal(e) => e.node2(),
        }
    }

    pub fn touches(&self, label: &str) -> bool {
        self.node1() == label || self.node2() == label
    }

    /// Returns the temporal edge, if this is one.
    pub fn as_temporal(&self) -> Option<&TemporalEdge> {
        match self {
            Edge::Temporal(e) => Some(e),
            Edge::Static(_) => None,
        }
    }
}
