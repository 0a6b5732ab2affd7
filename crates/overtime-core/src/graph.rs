//! Graph: the single container for static and temporal, directed and
//! undirected graphs.
//!
//! [`Graph`] owns an insertion-ordered node collection and one edge
//! collection. Two orthogonal flags ([`GraphKind`]) select the edge
//! representation: a [`StaticEdges`] set, or a [`TemporalEdges`] list kept
//! sorted by start time.
//!
//! Nodes and edges are created through idempotent `add_*` methods; adding an
//! edge creates its endpoints lazily. All reads take `&self`, all removals
//! take `&mut self`, so a graph is never mutated while a traversal over it
//! is in flight.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableGraph;
use petgraph::Directed;
use serde::{Deserialize, Serialize};

use crate::collection::{StaticEdges, TemporalEdges};
use crate::edge::{Edge, StaticEdge, TemporalEdge};
use crate::error::CoreError;
use crate::id::EdgeUid;
use crate::node::Node;
use crate::time::{Interval, Time, Timespan};

/// The two capability flags of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphKind {
    pub directed: bool,
    pub temporal: bool,
}

impl GraphKind {
    pub const STATIC: GraphKind = GraphKind {
        directed: false,
        temporal: false,
    };
    pub const STATIC_DIRECTED: GraphKind = GraphKind {
        directed: true,
        temporal: false,
    };
    pub const TEMPORAL: GraphKind = GraphKind {
        directed: false,
        temporal: true,
    };
    pub const TEMPORAL_DIRECTED: GraphKind = GraphKind {
        directed: true,
        temporal: true,
    };

    fn time_name(&self) -> &'static str {
        if self.temporal {
            "temporal"
        } else {
            "static"
        }
    }
}

/// The edge representation owned by a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeSet {
    Static(StaticEdges),
    Temporal(TemporalEdges),
}

impl EdgeSet {
    pub fn len(&self) -> usize {
        match self {
            EdgeSet::Static(edges) => edges.len(),
            EdgeSet::Temporal(edges) => edges.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn uids(&self) -> Vec<EdgeUid> {
        match self {
            EdgeSet::Static(edges) => edges.uids(),
            EdgeSet::Temporal(edges) => edges.uids(),
        }
    }

    pub fn contains(&self, uid: &EdgeUid) -> bool {
        match self {
            EdgeSet::Static(edges) => edges.contains(uid),
            EdgeSet::Temporal(edges) => edges.contains(uid),
        }
    }
}

/// One edge record as produced by an ingestion layer. A missing `end`
/// means the edge is instantaneous (`end = start`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub node1: String,
    pub node2: String,
    pub start: Time,
    #[serde(default)]
    pub end: Option<Time>,
}

impl EdgeRecord {
    pub fn new(node1: impl Into<String>, node2: impl Into<String>, start: Time, end: Time) -> Self {
        EdgeRecord {
            node1: node1.into(),
            node2: node2.into(),
            start,
            end: Some(end),
        }
    }
}

/// Headline facts about a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub label: String,
    pub directed: bool,
    pub temporal: bool,
    pub nodes: usize,
    pub edges: usize,
    pub timespan: Option<Timespan>,
}

/// A static or temporal, directed or undirected graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GraphRepr")]
pub struct Graph {
    label: String,
    directed: bool,
    nodes: IndexMap<String, Node>,
    edges: EdgeSet,
}

/// Unvalidated wire form; every node must sit under its own label and
/// every edge endpoint must be a known node.
#[derive(Deserialize)]
struct GraphRepr {
    label: String,
    directed: bool,
    nodes: IndexMap<String, Node>,
    edges: EdgeSet,
}

impl TryFrom<GraphRepr> for Graph {
    type Error = CoreError;

    fn try_from(raw: GraphRepr) -> Result<Self, Self::Error> {
        for (key, node) in &raw.nodes {
            if key.as_str() != node.label() {
                return Err(CoreError::InvalidNode {
                    reason: format!("node keyed '{}' is labelled '{}'", key, node.label()),
                });
            }
        }
        let endpoints: Vec<(&str, &str, bool)> = match &raw.edges {
            EdgeSet::Static(edges) => edges
                .iter()
                .map(|e| (e.node1(), e.node2(), e.is_directed()))
                .collect(),
            EdgeSet::Temporal(edges) => edges
                .iter()
                .map(|e| (e.node1(), e.node2(), e.is_directed()))
                .collect(),
        };
        for (node1, node2, directed) in endpoints {
            if directed != raw.directed {
                return Err(CoreError::InvalidEdge {
                    reason: format!("edge {}-{} does not match graph direction", node1, node2),
                });
            }
            for label in [node1, node2] {
                if !raw.nodes.contains_key(label) {
                    return Err(CoreError::NodeNotFound {
                        label: label.to_string(),
                    });
                }
            }
        }
        Ok(Graph {
            label: raw.label,
            directed: raw.directed,
            nodes: raw.nodes,
            edges: raw.edges,
        })
    }
}

impl Graph {
    /// Creates an empty graph of the given kind.
    pub fn new(label: impl Into<String>, kind: GraphKind) -> Self {
        let edges = if kind.temporal {
            EdgeSet::Temporal(TemporalEdges::new())
        } else {
            EdgeSet::Static(StaticEdges::new())
        };
        Graph {
            label: label.into(),
            directed: kind.directed,
            nodes: IndexMap::new(),
            edges,
        }
    }

    /// Builds a temporal graph from ingestion records.
    ///
    /// Fails on the first invalid record; records before it are not kept.
    pub fn from_records<I>(
        label: impl Into<String>,
        directed: bool,
        records: I,
    ) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = EdgeRecord>,
    {
        let kind = GraphKind {
            directed,
            temporal: true,
        };
        let mut graph = Graph::new(label, kind);
        for record in records {
            let end = record.end.unwrap_or(record.start);
            graph.add_edge(record.node1, record.node2, record.start, end)?;
        }
        Ok(graph)
    }

    // -----------------------------------------------------------------------
    // Read-only accessors
    // -----------------------------------------------------------------------

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn kind(&self) -> GraphKind {
        GraphKind {
            directed: self.directed,
            temporal: self.is_temporal(),
        }
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self.edges, EdgeSet::Temporal(_))
    }

    pub fn edges(&self) -> &EdgeSet {
        &self.edges
    }

    /// The sorted temporal edge list; `KindMismatch` on a static graph.
    pub fn temporal_edges(&self) -> Result<&TemporalEdges, CoreError> {
        match &self.edges {
            EdgeSet::Temporal(edges) => Ok(edges),
            EdgeSet::Static(_) => Err(self.mismatch(true)),
        }
    }

    /// The static edge set; `KindMismatch` on a temporal graph.
    pub fn static_edges(&self) -> Result<&StaticEdges, CoreError> {
        match &self.edges {
            EdgeSet::Static(edges) => Ok(edges),
            EdgeSet::Temporal(_) => Err(self.mismatch(false)),
        }
    }

    fn mismatch(&self, wants_temporal: bool) -> CoreError {
        CoreError::KindMismatch {
            expected: GraphKind {
                directed: self.directed,
                temporal: wants_temporal,
            }
            .time_name(),
            found: self.kind().time_name(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, label: &str) -> Option<&Node> {
        self.nodes.get(label)
    }

    pub fn contains_node(&self, label: &str) -> bool {
        self.nodes.contains_key(label)
    }

    /// Position of `label` in insertion order, usable as a dense index.
    pub fn node_index_of(&self, label: &str) -> Option<usize> {
        self.nodes.get_index_of(label)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Node labels in insertion order.
    pub fn labels(&self) -> Vec<&str> {
        self.nodes.keys().map(String::as_str).collect()
    }

    pub fn contains_edge(&self, uid: &EdgeUid) -> bool {
        self.edges.contains(&self.storage_uid(uid))
    }

    pub fn edge_uids(&self) -> Vec<EdgeUid> {
        self.edges.uids()
    }

    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            label: self.label.clone(),
            directed: self.directed,
            temporal: self.is_temporal(),
            nodes: self.node_count(),
            edges: self.edge_count(),
            timespan: self.timespan(),
        }
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Adds a node, or returns the existing one with the same label.
    pub fn add_node(&mut self, label: impl Into<String>) -> &Node {
        let label = label.into();
        self.nodes
            .entry(label)
            .or_insert_with_key(|key| Node::new(key.clone()))
    }

    /// Adds a temporal edge active during `[start, end]`, creating its
    /// endpoints if needed. Returns the stored edge (the existing one if an
    /// identical edge is already present).
    pub fn add_edge(
        &mut self,
        node1: impl Into<String>,
        node2: impl Into<String>,
        start: Time,
        end: Time,
    ) -> Result<&TemporalEdge, CoreError> {
        let mismatch = self.mismatch(true);
        if !self.is_temporal() {
            return Err(mismatch);
        }
        let edge = TemporalEdge::new(node1, node2, start, end, self.directed)?;
        self.add_node(edge.node1().to_string());
        self.add_node(edge.node2().to_string());
        match &mut self.edges {
            EdgeSet::Temporal(edges) => Ok(edges.insert(edge).0),
            EdgeSet::Static(_) => Err(mismatch),
        }
    }

    /// Adds an instantaneous temporal edge (`end = start`).
    pub fn add_instant_edge(
        &mut self,
        node1: impl Into<String>,
        node2: impl Into<String>,
        t: Time,
    ) -> Result<&TemporalEdge, CoreError> {
        self.add_edge(node1, node2, t, t)
    }

    /// Adds a static edge, creating its endpoints if needed.
    pub fn add_static_edge(
        &mut self,
        node1: impl Into<String>,
        node2: impl Into<String>,
    ) -> Result<&StaticEdge, CoreError> {
        let mismatch = self.mismatch(false);
        if self.is_temporal() {
            return Err(mismatch);
        }
        let edge = StaticEdge::new(node1, node2, self.directed);
        self.add_node(edge.node1().to_string());
        self.add_node(edge.node2().to_string());
        match &mut self.edges {
            EdgeSet::Static(edges) => Ok(edges.insert(edge).0),
            EdgeSet::Temporal(_) => Err(mismatch),
        }
    }

    /// Removes a node and every edge incident to it.
    pub fn remove_node(&mut self, label: &str) -> Result<Node, CoreError> {
        let node = self
            .nodes
            .shift_remove(label)
            .ok_or_else(|| CoreError::NodeNotFound {
                label: label.to_string(),
            })?;
        let before = self.edges.len();
        match &mut self.edges {
            EdgeSet::Static(edges) => edges.retain(|e| !e.touches(label)),
            EdgeSet::Temporal(edges) => edges.retain(|e| !e.touches(label)),
        }
        tracing::debug!(
            graph = %self.label,
            node = label,
            edges_removed = before - self.edges.len(),
            "removed node"
        );
        Ok(node)
    }

    /// Removes one edge. Undirected uids are matched regardless of the
    /// endpoint order they were written in.
    pub fn remove_edge(&mut self, uid: &EdgeUid) -> Result<Edge, CoreError> {
        let key = self.storage_uid(uid);
        let removed = match &mut self.edges {
            EdgeSet::Static(edges) => edges.remove(&key).map(Edge::Static),
            EdgeSet::Temporal(edges) => edges.remove(&key).map(Edge::Temporal),
        };
        match removed {
            Some(edge) => {
                tracing::debug!(graph = %self.label, edge = %key, "removed edge");
                Ok(edge)
            }
            None => Err(CoreError::EdgeNotFound { uid: uid.clone() }),
        }
    }

    /// Removes several edges; stops at the first unknown uid.
    pub fn remove_edges<'a, I>(&mut self, uids: I) -> Result<Vec<Edge>, CoreError>
    where
        I: IntoIterator<Item = &'a EdgeUid>,
    {
        uids.into_iter().map(|uid| self.remove_edge(uid)).collect()
    }

    fn storage_uid(&self, uid: &EdgeUid) -> EdgeUid {
        if self.directed {
            uid.clone()
        } else {
            uid.clone().canonical()
        }
    }

    // -----------------------------------------------------------------------
    // Temporal windowing
    // -----------------------------------------------------------------------

    /// `[min start, max end + 1)` over all temporal edges. `None` for a
    /// static graph or a temporal graph without edges.
    pub fn timespan(&self) -> Option<Timespan> {
        match &self.edges {
            EdgeSet::Temporal(edges) => edges.timespan(),
            EdgeSet::Static(_) => None,
        }
    }

    /// Temporal edges active at `t`.
    pub fn active_at(&self, t: Time) -> Result<Vec<&TemporalEdge>, CoreError> {
        Ok(self.temporal_edges()?.active_at(t))
    }

    /// Temporal edges fully contained in `interval`.
    pub fn by_interval(&self, interval: &Interval) -> Result<Vec<&TemporalEdge>, CoreError> {
        interval.validate()?;
        Ok(self.temporal_edges()?.by_interval(interval))
    }

    // -----------------------------------------------------------------------
    // Neighbourhood queries
    // -----------------------------------------------------------------------

    fn incident_where(
        &self,
        label: &str,
        time: Option<Time>,
        keep: impl Fn(&str, &str) -> bool,
    ) -> Result<Vec<EdgeUid>, CoreError> {
        if !self.contains_node(label) {
            return Err(CoreError::NodeNotFound {
                label: label.to_string(),
            });
        }
        match (&self.edges, time) {
            (EdgeSet::Temporal(edges), Some(t)) => Ok(edges
                .active_at(t)
                .into_iter()
                .filter(|e| keep(e.node1(), e.node2()))
                .map(TemporalEdge::uid)
                .collect()),
            (EdgeSet::Temporal(edges), None) => Ok(edges
                .iter()
                .filter(|e| keep(e.node1(), e.node2()))
                .map(TemporalEdge::uid)
                .collect()),
            (EdgeSet::Static(edges), None) => Ok(edges
                .iter()
                .filter(|e| keep(e.node1(), e.node2()))
                .map(StaticEdge::uid)
                .collect()),
            (EdgeSet::Static(_), Some(_)) => Err(self.mismatch(true)),
        }
    }

    /// Edges whose `node1` (source) is `label`, optionally only those
    /// active at `time`.
    pub fn outgoing(&self, label: &str, time: Option<Time>) -> Result<Vec<EdgeUid>, CoreError> {
        self.incident_where(label, time, |n1, _| n1 == label)
    }

    /// Edges whose `node2` (sink) is `label`, optionally only those active
    /// at `time`.
    pub fn incoming(&self, label: &str, time: Option<Time>) -> Result<Vec<EdgeUid>, CoreError> {
        self.incident_where(label, time, |_, n2| n2 == label)
    }

    /// Edges with `label` as either endpoint.
    pub fn incident_edges(
        &self,
        label: &str,
        time: Option<Time>,
    ) -> Result<Vec<EdgeUid>, CoreError> {
        self.incident_where(label, time, |n1, n2| n1 == label || n2 == label)
    }

    /// Distinct nodes adjacent to `label` in either direction, in first-seen
    /// order.
    pub fn neighbours(&self, label: &str, time: Option<Time>) -> Result<Vec<String>, CoreError> {
        let mut seen = IndexSet::new();
        for uid in self.incident_edges(label, time)? {
            let other = if uid.node1 == label { uid.node2 } else { uid.node1 };
            if other != label {
                seen.insert(other);
            }
        }
        Ok(seen.into_iter().collect())
    }

    // -----------------------------------------------------------------------
    // Derived graphs
    // -----------------------------------------------------------------------

    /// The static graph of the edges active at `t`, over the full node set.
    pub fn snapshot(&self, t: Time) -> Result<Graph, CoreError> {
        let edges = self.temporal_edges()?;
        let mut graph = Graph::new(
            format!("{} [time: {}]", self.label, t),
            GraphKind {
                directed: self.directed,
                temporal: false,
            },
        );
        for label in self.nodes.keys() {
            graph.add_node(label.clone());
        }
        for edge in edges.active_at(t) {
            graph.add_static_edge(edge.node1(), edge.node2())?;
        }
        Ok(graph)
    }

    /// The temporal graph restricted to a node subset and/or a union of
    /// intervals.
    ///
    /// With `nodes`, only the listed nodes that exist are kept, together
    /// with the edges between them. With `intervals`, only edges fully
    /// contained in at least one interval are kept. Node filtering is
    /// applied first.
    pub fn temporal_subgraph(
        &self,
        nodes: Option<&[&str]>,
        intervals: Option<&[Interval]>,
    ) -> Result<Graph, CoreError> {
        let edges = self.temporal_edges()?;
        if let Some(intervals) = intervals {
            for interval in intervals {
                interval.validate()?;
            }
        }

        let mut label = self.label.clone();
        let kept: Option<Vec<&str>> = nodes.map(|requested| {
            requested
                .iter()
                .copied()
                .filter(|l| self.contains_node(l))
                .collect()
        });
        if let Some(kept) = &kept {
            label.push_str(&format!(" [nodes; {}]", kept.join(":")));
        }
        let keep_nodes: Option<HashSet<&str>> =
            kept.map(|kept| kept.into_iter().collect());
        if let Some(intervals) = intervals {
            let shown: Vec<String> = intervals.iter().map(Interval::to_string).collect();
            label.push_str(&format!(" [interval(s); {}]", shown.join(", ")));
        }

        let mut graph = Graph::new(label, self.kind());
        for node in self.nodes.keys() {
            if keep_nodes.as_ref().map_or(true, |k| k.contains(node.as_str())) {
                graph.add_node(node.clone());
            }
        }
        for edge in edges {
            let endpoints_kept = keep_nodes
                .as_ref()
                .map_or(true, |k| k.contains(edge.node1()) && k.contains(edge.node2()));
            let in_window = intervals.map_or(true, |ivs| ivs.iter().any(|iv| edge.within(iv)));
            if endpoints_kept && in_window {
                graph.add_edge(edge.node1(), edge.node2(), edge.start(), edge.end())?;
            }
        }
        Ok(graph)
    }

    /// The graph formed by `label`, its neighbours and its incident edges.
    pub fn ego_network(&self, label: &str) -> Result<Graph, CoreError> {
        let incident = self.incident_edges(label, None)?;
        let mut graph = Graph::new(format!("{}-Network", label), self.kind());
        graph.add_node(label);
        for uid in &incident {
            match (&self.edges, uid.span) {
                (EdgeSet::Temporal(_), Some((start, end))) => {
                    graph.add_edge(uid.node1.clone(), uid.node2.clone(), start, end)?;
                }
                _ => {
                    graph.add_static_edge(uid.node1.clone(), uid.node2.clone())?;
                }
            }
        }
        Ok(graph)
    }

    /// Exports the topology as a petgraph `StableGraph` for consumers that
    /// work on plain graphs (matching, vertex cover, layout).
    ///
    /// Node weights are labels, edge weights the activity interval (`None`
    /// for static edges). Undirected edges are exported once, in stored
    /// orientation; wrap the result in `petgraph::visit::UndirectedAdaptor`
    /// when `is_directed()` is false.
    pub fn to_petgraph(&self) -> StableGraph<String, Option<Interval>, Directed, u32> {
        let mut out = StableGraph::with_capacity(self.node_count(), self.edge_count());
        let mut index: IndexMap<&str, NodeIndex<u32>> = IndexMap::with_capacity(self.node_count());
        for label in self.nodes.keys() {
            index.insert(label.as_str(), out.add_node(label.clone()));
        }
        let mut link = |a: &str, b: &str, weight: Option<Interval>| {
            if let (Some(&ia), Some(&ib)) = (index.get(a), index.get(b)) {
                out.add_edge(ia, ib, weight);
            }
        };
        match &self.edges {
            EdgeSet::Static(edges) => {
                for e in edges.iter() {
                    link(e.node1(), e.node2(), None);
                }
            }
            EdgeSet::Temporal(edges) => {
                for e in edges {
                    let span = Interval {
                        start: e.start(),
                        end: e.end(),
                    };
                    link(e.node1(), e.node2(), Some(span));
                }
            }
        }
        out
    }
}
