//! Foremost-path trees.
//!
//! A single pass over the start-sorted temporal edges computes, for every
//! node, the earliest time it can be reached from a root by a
//! time-respecting path. Edges that share a start time are rescanned as a
//! group, since zero-duration edges among them can chain in either order.
//! The arcs that produced each node's current time form a tree rooted at
//! the source.
//!
//! The tree is kept in a petgraph `StableGraph` so that superseded arcs can
//! be removed without invalidating the node indices held in the label map.
//! Tree node `i` corresponds to graph node `i` in insertion order.

use std::collections::HashMap;

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use overtime_core::{CoreError, EdgeUid, Graph, Interval, TemporalEdge, Time, Timespan};

/// Node weight of a foremost tree: the node label and its foremost time
/// (`None` while unreached).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForemostNode {
    pub label: String,
    pub time: Option<Time>,
}

/// An arc of a foremost tree, with the graph edge it was taken from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeArc {
    pub source: String,
    pub sink: String,
    pub start: Time,
    pub end: Time,
    /// Uid of the edge in the originating graph.
    pub origin: EdgeUid,
}

/// Earliest-arrival tree from one root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForemostTree {
    root: String,
    span: Timespan,
    tree: StableGraph<ForemostNode, TreeArc>,
    index: HashMap<String, NodeIndex>,
    /// Incoming tree arc of each reached non-root node.
    parent: HashMap<NodeIndex, EdgeIndex>,
    /// Origin of every arc added during growth, in order, counting ones
    /// later superseded.
    grown: Vec<EdgeUid>,
}

impl ForemostTree {
    /// Builds the foremost tree of `root` over the whole graph.
    ///
    /// The root starts at the first instant of the graph's timespan (0 for
    /// an edgeless graph) and every edge in the graph is eligible.
    pub fn build(graph: &Graph, root: &str) -> Result<Self, CoreError> {
        let span = graph.timespan().unwrap_or(Timespan { start: 0, end: 0 });
        Self::grow(graph, root, span, None)
    }

    /// Builds the foremost tree of `root` using only edges contained in
    /// `window`. The root starts at `window.start`.
    pub fn build_within(graph: &Graph, root: &str, window: Interval) -> Result<Self, CoreError> {
        window.validate()?;
        let end = window
            .end
            .checked_add(1)
            .ok_or(CoreError::InvalidInterval {
                start: window.start,
                end: window.end,
            })?;
        let span = Timespan {
            start: window.start,
            end,
        };
        Self::grow(graph, root, span, None)
    }

    /// Grows the tree of `root` until `limit` arcs have been added, or the
    /// scan ends. Arcs that a later edge supersedes count towards `limit`.
    pub fn bounded(graph: &Graph, root: &str, limit: usize) -> Result<Self, CoreError> {
        let span = graph.timespan().unwrap_or(Timespan { start: 0, end: 0 });
        Self::grow(graph, root, span, Some(limit))
    }

    fn grow(
        graph: &Graph,
        root: &str,
        span: Timespan,
        limit: Option<usize>,
    ) -> Result<Self, CoreError> {
        let edges = graph.temporal_edges()?;
        let root_pos = graph
            .node_index_of(root)
            .ok_or_else(|| CoreError::NodeNotFound {
                label: root.to_string(),
            })?;

        let mut tree = StableGraph::with_capacity(graph.node_count(), graph.node_count());
        let mut index = HashMap::with_capacity(graph.node_count());
        for node in graph.nodes() {
            let idx = tree.add_node(ForemostNode {
                label: node.label().to_string(),
                time: None,
            });
            index.insert(node.label().to_string(), idx);
        }
        let mut out = ForemostTree {
            root: root.to_string(),
            span,
            tree,
            index,
            parent: HashMap::new(),
            grown: Vec::new(),
        };
        out.tree[NodeIndex::new(root_pos)].time = Some(span.start);

        if limit == Some(0) {
            return Ok(out);
        }

        let slice = edges.as_slice();
        let first = slice.partition_point(|e| e.start() < span.start);
        'scan: for group in slice[first..].chunk_by(|a, b| a.start() == b.start()) {
            if group[0].start() >= span.end {
                break;
            }
            // Instantaneous edges sharing a start time can chain in any
            // order, so a group is rescanned until it attaches nothing.
            loop {
                let mut changed = false;
                for edge in group {
                    if edge.end() >= span.end {
                        continue;
                    }
                    // Both directions of an undirected edge are judged
                    // against the state before the edge.
                    let forward = out.improves(graph, edge.node1(), edge.node2(), edge);
                    let backward = !edge.is_directed()
                        && out.improves(graph, edge.node2(), edge.node1(), edge);
                    for (go, from, to) in [
                        (forward, edge.node1(), edge.node2()),
                        (backward, edge.node2(), edge.node1()),
                    ] {
                        if !go {
                            continue;
                        }
                        out.attach(graph, from, to, edge);
                        changed = true;
                        if limit.is_some_and(|l| out.grown.len() >= l) {
                            break 'scan;
                        }
                    }
                }
                if !changed {
                    break;
                }
            }
        }

        #[cfg(debug_assertions)]
        out.assert_consistency();

        tracing::debug!(
            root,
            reached = out.reach(),
            arcs = out.arc_count(),
            "built foremost tree"
        );
        Ok(out)
    }

    fn slot(graph: &Graph, label: &str) -> NodeIndex {
        // Endpoints of stored edges are always graph nodes.
        NodeIndex::new(graph.node_index_of(label).unwrap_or_default())
    }

    fn improves(&self, graph: &Graph, from: &str, to: &str, edge: &TemporalEdge) -> bool {
        let departs = self.tree[Self::slot(graph, from)].time;
        let arrives = self.tree[Self::slot(graph, to)].time;
        departs.is_some_and(|t| edge.start() >= t) && arrives.map_or(true, |t| edge.end() < t)
    }

    fn attach(&mut self, graph: &Graph, from: &str, to: &str, edge: &TemporalEdge) {
        let (u, v) = (Self::slot(graph, from), Self::slot(graph, to));
        if let Some(previous) = self.parent.remove(&v) {
            self.tree.remove_edge(previous);
        }
        let arc = self.tree.add_edge(
            u,
            v,
            TreeArc {
                source: from.to_string(),
                sink: to.to_string(),
                start: edge.start(),
                end: edge.end(),
                origin: edge.uid(),
            },
        );
        self.parent.insert(v, arc);
        self.tree[v].time = Some(edge.end());
        self.grown.push(edge.uid());
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn root(&self) -> &str {
        &self.root
    }

    /// The `[start, end)` range the tree was grown over.
    pub fn span(&self) -> Timespan {
        self.span
    }

    /// Foremost time of `label`; `None` if unreached or unknown.
    pub fn time(&self, label: &str) -> Option<Time> {
        self.index.get(label).and_then(|&idx| self.tree[idx].time)
    }

    pub fn is_reachable(&self, label: &str) -> bool {
        self.time(label).is_some()
    }

    /// Number of reached nodes, the root included.
    pub fn reach(&self) -> usize {
        self.tree.node_weights().filter(|n| n.time.is_some()).count()
    }

    /// Labels of reached nodes in graph insertion order.
    pub fn reachable(&self) -> Vec<&str> {
        self.tree
            .node_weights()
            .filter(|n| n.time.is_some())
            .map(|n| n.label.as_str())
            .collect()
    }

    /// `(label, foremost time)` for every node in graph insertion order.
    pub fn times(&self) -> impl Iterator<Item = (&str, Option<Time>)> + '_ {
        self.tree.node_weights().map(|n| (n.label.as_str(), n.time))
    }

    /// The tree arc entering `label`.
    pub fn parent(&self, label: &str) -> Option<&TreeArc> {
        let idx = self.index.get(label)?;
        let arc = self.parent.get(idx)?;
        self.tree.edge_weight(*arc)
    }

    /// Labels on the tree path from the root to `label`, both included.
    pub fn path_to(&self, label: &str) -> Option<Vec<&str>> {
        let mut idx = *self.index.get(label)?;
        self.tree[idx].time?;
        let mut path = vec![self.tree[idx].label.as_str()];
        while let Some(&arc) = self.parent.get(&idx) {
            idx = self.tree.edge_endpoints(arc)?.0;
            path.push(self.tree[idx].label.as_str());
        }
        path.reverse();
        Some(path)
    }

    pub fn arcs(&self) -> impl Iterator<Item = &TreeArc> + '_ {
        self.tree.edge_weights()
    }

    pub fn arc_count(&self) -> usize {
        self.tree.edge_count()
    }

    /// Arcs added during growth, including superseded ones.
    pub fn grown(&self) -> usize {
        self.grown.len()
    }

    /// Uids of the graph edges behind every arc added during growth, in
    /// the order they were added. Superseded arcs are included; an edge
    /// appears at most once, since attaching it fixes the sink's time at
    /// the edge's end.
    pub fn grown_origins(&self) -> &[EdgeUid] {
        &self.grown
    }

    /// Uids of the graph edges behind the current tree arcs.
    pub fn origins(&self) -> Vec<EdgeUid> {
        self.arcs().map(|arc| arc.origin.clone()).collect()
    }

    /// Children of `label` in the tree.
    pub fn children(&self, label: &str) -> Vec<&str> {
        let Some(&idx) = self.index.get(label) else {
            return Vec::new();
        };
        self.tree
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| self.tree[e.target()].label.as_str())
            .collect()
    }

    pub fn as_petgraph(&self) -> &StableGraph<ForemostNode, TreeArc> {
        &self.tree
    }

    // -----------------------------------------------------------------------
    // Debug consistency assertion
    // -----------------------------------------------------------------------

    /// Every reached non-root node has exactly one incoming arc, and that
    /// arc ends at the node's foremost time.
    ///
    /// Only called in debug builds (via `cfg(debug_assertions)`).
    #[cfg(debug_assertions)]
    fn assert_consistency(&self) {
        for idx in self.tree.node_indices() {
            let node = &self.tree[idx];
            let incoming = self.tree.edges_directed(idx, Direction::Incoming).count();
            if node.label == self.root {
                assert_eq!(incoming, 0, "root {} has an incoming arc", node.label);
                continue;
            }
            match node.time {
                None => assert_eq!(incoming, 0, "unreached {} has an arc", node.label),
                Some(t) => {
                    assert_eq!(incoming, 1, "{} has {} incoming arcs", node.label, incoming);
                    let arc = self.parent.get(&idx).and_then(|&a| self.tree.edge_weight(a));
                    assert_eq!(arc.map(|a| a.end), Some(t), "{} arc/time mismatch", node.label);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overtime_core::GraphKind;

    fn directed(edges: &[(&str, &str, Time, Time)]) -> Graph {
        let mut graph = Graph::new("t", GraphKind::TEMPORAL_DIRECTED);
        for &(a, b, s, e) in edges {
            graph.add_edge(a, b, s, e).unwrap();
        }
        graph
    }

    fn scenario() -> Graph {
        directed(&[
            ("A", "E", 1, 2),
            ("A", "B", 1, 2),
            ("B", "C", 2, 3),
            ("A", "F", 3, 4),
            ("C", "D", 4, 5),
            ("F", "G", 4, 5),
            ("E", "D", 5, 6),
            ("G", "D", 6, 7),
        ])
    }

    #[test]
    fn scenario_foremost_times() {
        let tree = ForemostTree::build(&scenario(), "A").unwrap();
        assert_eq!(tree.time("A"), Some(1));
        assert_eq!(tree.time("B"), Some(2));
        assert_eq!(tree.time("C"), Some(3));
        assert_eq!(tree.time("D"), Some(5));
        assert_eq!(tree.time("E"), Some(2));
        assert_eq!(tree.time("F"), Some(4));
        assert_eq!(tree.time("G"), Some(5));
        assert_eq!(tree.reach(), 7);
        assert_eq!(tree.arc_count(), 6);
        assert_eq!(tree.path_to("D"), Some(vec!["A", "B", "C", "D"]));
    }

    #[test]
    fn later_edge_supersedes_slower_arc() {
        let graph = directed(&[("a", "b", 1, 10), ("a", "c", 2, 3), ("c", "b", 3, 4)]);
        let tree = ForemostTree::build(&graph, "a").unwrap();
        assert_eq!(tree.time("b"), Some(4));
        assert_eq!(tree.parent("b").map(|a| a.source.as_str()), Some("c"));
        assert_eq!(tree.arc_count(), 2);
        assert_eq!(tree.grown(), 3);
        assert_eq!(tree.children("a"), vec!["c"]);
        assert_eq!(
            tree.grown_origins(),
            &[
                EdgeUid::temporal("a", "b", 1, 10),
                EdgeUid::temporal("a", "c", 2, 3),
                EdgeUid::temporal("c", "b", 3, 4),
            ]
        );
        assert!(!tree.origins().contains(&EdgeUid::temporal("a", "b", 1, 10)));
    }

    #[test]
    fn waits_are_respected() {
        // c->d departs before c is reached.
        let graph = directed(&[("a", "c", 1, 5), ("c", "d", 3, 4)]);
        let tree = ForemostTree::build(&graph, "a").unwrap();
        assert_eq!(tree.time("c"), Some(5));
        assert!(!tree.is_reachable("d"));
        assert_eq!(tree.reach(), 2);
    }

    #[test]
    fn instant_chain_inserted_backwards() {
        let graph = directed(&[("b", "c", 3, 3), ("a", "b", 3, 3), ("a", "x", 1, 1)]);
        let tree = ForemostTree::build(&graph, "a").unwrap();
        assert_eq!(tree.time("b"), Some(3));
        assert_eq!(tree.time("c"), Some(3));
        assert_eq!(tree.path_to("c"), Some(vec!["a", "b", "c"]));
    }

    #[test]
    fn undirected_edges_work_both_ways() {
        let mut graph = Graph::new("u", GraphKind::TEMPORAL);
        graph.add_edge("b", "a", 1, 2).unwrap();
        graph.add_edge("c", "b", 3, 3).unwrap();
        let tree = ForemostTree::build(&graph, "c").unwrap();
        assert_eq!(tree.time("b"), Some(3));
        assert!(!tree.is_reachable("a"));
        let tree = ForemostTree::build(&graph, "a").unwrap();
        assert_eq!(tree.reachable(), vec!["a", "b", "c"]);
    }

    #[test]
    fn root_without_outgoing_edges_reaches_itself() {
        let graph = directed(&[("a", "b", 3, 5)]);
        let tree = ForemostTree::build(&graph, "b").unwrap();
        assert_eq!(tree.reach(), 1);
        assert_eq!(tree.time("b"), Some(3));
    }

    #[test]
    fn unknown_root_is_rejected() {
        let err = ForemostTree::build(&scenario(), "Z").unwrap_err();
        assert_eq!(
            err,
            CoreError::NodeNotFound {
                label: "Z".to_string()
            }
        );
    }

    #[test]
    fn static_graph_is_rejected() {
        let mut graph = Graph::new("s", GraphKind::STATIC);
        graph.add_static_edge("a", "b").unwrap();
        assert!(matches!(
            ForemostTree::build(&graph, "a"),
            Err(CoreError::KindMismatch { .. })
        ));
    }

    #[test]
    fn window_limits_edges_and_root_time() {
        let graph = directed(&[
            ("a", "b", 1, 2),
            ("b", "c", 5, 6),
            ("a", "c", 9, 9),
            ("a", "d", 9, 11),
        ]);
        let tree = ForemostTree::build_within(&graph, "a", Interval::new(4, 9).unwrap()).unwrap();
        assert_eq!(tree.time("a"), Some(4));
        assert!(!tree.is_reachable("b"));
        assert_eq!(tree.time("c"), Some(9));
        assert!(!tree.is_reachable("d"));
        assert_eq!(tree.span(), Timespan { start: 4, end: 10 });
    }

    #[test]
    fn window_ending_at_time_max_is_rejected() {
        let graph = directed(&[("a", "b", 1, 2)]);
        let window = Interval::new(0, Time::MAX).unwrap();
        assert!(matches!(
            ForemostTree::build_within(&graph, "a", window),
            Err(CoreError::InvalidInterval { .. })
        ));
        let widest = Interval::new(0, Time::MAX - 1).unwrap();
        let tree = ForemostTree::build_within(&graph, "a", widest).unwrap();
        assert_eq!(tree.time("b"), Some(2));
    }

    #[test]
    fn bounded_growth_stops_after_limit() {
        let tree = ForemostTree::bounded(&scenario(), "A", 2).unwrap();
        assert_eq!(tree.arc_count(), 2);
        assert_eq!(tree.reachable(), vec!["A", "E", "B"]);
        let origins = tree.origins();
        assert!(origins.contains(&EdgeUid::temporal("A", "E", 1, 2)));
        assert!(origins.contains(&EdgeUid::temporal("A", "B", 1, 2)));
    }

    #[test]
    fn tree_serializes() {
        let tree = ForemostTree::build(&scenario(), "A").unwrap();
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["root"], "A");
    }
}
