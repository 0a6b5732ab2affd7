//! Edge collections owned by a graph.
//!
//! [`TemporalEdges`] keeps its edges sorted ascending by start time at all
//! times; edges with equal start times keep their insertion order. Every
//! path that puts an edge into the collection (single insert, bulk
//! construction, deserialization) goes through the sorted insert, so the
//! single-pass algorithms built on top can rely on the order unconditionally.
//!
//! [`StaticEdges`] is an insertion-ordered set keyed by canonical uid.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::edge::{StaticEdge, TemporalEdge};
use crate::id::EdgeUid;
use crate::time::{Interval, Time, Timespan};

// ---------------------------------------------------------------------------
// Temporal edges
// ---------------------------------------------------------------------------

/// Temporal edges sorted by start time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<TemporalEdge>", from = "Vec<TemporalEdge>")]
pub struct TemporalEdges {
    edges: Vec<TemporalEdge>,
    uids: HashSet<EdgeUid>,
}

impl TemporalEdges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `edge` at its sorted position, after any edge with the same
    /// start time. Returns the stored edge and whether it was newly added;
    /// an edge already present is left untouched.
    pub fn insert(&mut self, edge: TemporalEdge) -> (&TemporalEdge, bool) {
        let uid = edge.uid();
        if let Some(pos) = self.position(&uid) {
            return (&self.edges[pos], false);
        }
        let pos = self.edges.partition_point(|e| e.start() <= edge.start());
        self.edges.insert(pos, edge);
        self.uids.insert(uid);
        (&self.edges[pos], true)
    }

    /// Index of the edge with `uid`, found by binary search on its start.
    pub fn position(&self, uid: &EdgeUid) -> Option<usize> {
        let (start, end) = uid.span?;
        if !self.uids.contains(uid) {
            return None;
        }
        let lo = self.edges.partition_point(|e| e.start() < start);
        let hi = self.edges.partition_point(|e| e.start() <= start);
        (lo..hi).find(|&i| {
            let e = &self.edges[i];
            e.end() == end && e.node1() == uid.node1 && e.node2() == uid.node2
        })
    }

    pub fn get(&self, uid: &EdgeUid) -> Option<&TemporalEdge> {
        self.position(uid).map(|i| &self.edges[i])
    }

    pub fn contains(&self, uid: &EdgeUid) -> bool {
        self.uids.contains(uid)
    }

    /// Removes and returns the edge with `uid`, preserving the order of the
    /// remaining edges.
    pub fn remove(&mut self, uid: &EdgeUid) -> Option<TemporalEdge> {
        let pos = self.position(uid)?;
        self.uids.remove(uid);
        Some(self.edges.remove(pos))
    }

    /// Keeps only the edges for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&TemporalEdge) -> bool) {
        let uids = &mut self.uids;
        self.edges.retain(|e| {
            let kept = keep(e);
            if !kept {
                uids.remove(&e.uid());
            }
            kept
        });
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Iterates in ascending start-time order.
    pub fn iter(&self) -> std::slice::Iter<'_, TemporalEdge> {
        self.edges.iter()
    }

    pub fn as_slice(&self) -> &[TemporalEdge] {
        &self.edges
    }

    /// `[min start, max end + 1)`, or `None` when the collection is empty.
    pub fn timespan(&self) -> Option<Timespan> {
        let first = self.edges.first()?;
        let last_end = self.edges.iter().map(TemporalEdge::end).max()?;
        Some(Timespan {
            start: first.start(),
            end: last_end + 1,
        })
    }

    /// Edges active at `t` (`start <= t <= end`).
    pub fn active_at(&self, t: Time) -> Vec<&TemporalEdge> {
        let upto = self.edges.partition_point(|e| e.start() <= t);
        self.edges[..upto].iter().filter(|e| e.end() >= t).collect()
    }

    /// Edges fully contained in `interval` (`start >= lo && end <= hi`).
    pub fn by_interval(&self, interval: &Interval) -> Vec<&TemporalEdge> {
        self.window(interval)
            .iter()
            .filter(|e| e.end() <= interval.end)
            .collect()
    }

    /// The contiguous run of edges whose start lies in `interval`.
    pub fn window(&self, interval: &Interval) -> &[TemporalEdge] {
        let lo = self.edges.partition_point(|e| e.start() < interval.start);
        let hi = self.edges.partition_point(|e| e.start() <= interval.end);
        &self.edges[lo..hi.max(lo)]
    }

    /// Edges starting exactly at `t`.
    pub fn by_start(&self, t: Time) -> &[TemporalEdge] {
        self.window(&Interval { start: t, end: t })
    }

    /// Edges ending exactly at `t`.
    pub fn by_end(&self, t: Time) -> Vec<&TemporalEdge> {
        self.edges.iter().filter(|e| e.end() == t).collect()
    }

    /// Every edge between `node1` and `node2` (in stored orientation).
    pub fn by_label(&self, node1: &str, node2: &str) -> Vec<&TemporalEdge> {
        self.edges
            .iter()
            .filter(|e| e.node1() == node1 && e.node2() == node2)
            .collect()
    }

    pub fn with_node1(&self, label: &str) -> Vec<&TemporalEdge> {
        self.edges.iter().filter(|e| e.node1() == label).collect()
    }

    pub fn with_node2(&self, label: &str) -> Vec<&TemporalEdge> {
        self.edges.iter().filter(|e| e.node2() == label).collect()
    }

    /// Edges with `label` as either endpoint.
    pub fn incident(&self, label: &str) -> Vec<&TemporalEdge> {
        self.edges.iter().filter(|e| e.touches(label)).collect()
    }

    pub fn start_times(&self) -> Vec<Time> {
        self.edges.iter().map(TemporalEdge::start).collect()
    }

    pub fn end_times(&self) -> Vec<Time> {
        self.edges.iter().map(TemporalEdge::end).collect()
    }

    pub fn uids(&self) -> Vec<EdgeUid> {
        self.edges.iter().map(TemporalEdge::uid).collect()
    }
}

impl From<Vec<TemporalEdge>> for TemporalEdges {
    fn from(mut edges: Vec<TemporalEdge>) -> Self {
        // Stable: equal start times keep their relative order.
        edges.sort_by_key(TemporalEdge::start);
        let mut uids = HashSet::with_capacity(edges.len());
        edges.retain(|e| uids.insert(e.uid()));
        TemporalEdges { edges, uids }
    }
}

impl From<TemporalEdges> for Vec<TemporalEdge> {
    fn from(edges: TemporalEdges) -> Self {
        edges.edges
    }
}

impl FromIterator<TemporalEdge> for TemporalEdges {
    fn from_iter<I: IntoIterator<Item = TemporalEdge>>(iter: I) -> Self {
        TemporalEdges::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<'a> IntoIterator for &'a TemporalEdges {
    type Item = &'a TemporalEdge;
    type IntoIter = std::slice::Iter<'a, TemporalEdge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

// ---------------------------------------------------------------------------
// Static edges
// ---------------------------------------------------------------------------

/// Static edges keyed by canonical uid, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<StaticEdge>", from = "Vec<StaticEdge>")]
pub struct StaticEdges {
    edges: IndexMap<EdgeUid, StaticEdge>,
}

impl StaticEdges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `edge` unless an edge with the same uid exists. Returns the
    /// stored edge and whether it was newly added.
    pub fn insert(&mut self, edge: StaticEdge) -> (&StaticEdge, bool) {
        let uid = edge.uid();
        let added = !self.edges.contains_key(&uid);
        let stored = self.edges.entry(uid).or_insert(edge);
        (stored, added)
    }

    pub fn get(&self, uid: &EdgeUid) -> Option<&StaticEdge> {
        self.edges.get(uid)
    }

    pub fn contains(&self, uid: &EdgeUid) -> bool {
        self.edges.contains_key(uid)
    }

    pub fn remove(&mut self, uid: &EdgeUid) -> Option<StaticEdge> {
        self.edges.shift_remove(uid)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&StaticEdge) -> bool) {
        self.edges.retain(|_, e| keep(e));
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StaticEdge> {
        self.edges.values()
    }

    pub fn incident(&self, label: &str) -> Vec<&StaticEdge> {
        self.edges.values().filter(|e| e.touches(label)).collect()
    }

    pub fn uids(&self) -> Vec<EdgeUid> {
        self.edges.keys().cloned().collect()
    }
}

impl From<Vec<StaticEdge>> for StaticEdges {
    fn from(edges: Vec<StaticEdge>) -> Self {
        let mut set = StaticEdges::new();
        for edge in edges {
            set.insert(edge);
        }
        set
    }
}

impl From<StaticEdges> for Vec<StaticEdge> {
    fn from(edges: StaticEdges) -> Self {
        edges.edges.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(a: &str, b: &str, start: Time, end: Time) -> TemporalEdge {
        TemporalEdge::new(a, b, start, end, true).unwrap()
    }

    fn starts(edges: &TemporalEdges) -> Vec<Time> {
        edges.start_times()
    }

    #[test]
    fn insert_keeps_start_order() {
        let mut edges = TemporalEdges::new();
        edges.insert(edge("a", "b", 5, 6));
        edges.insert(edge("a", "c", 1, 9));
        edges.insert(edge("b", "c", 3, 3));
        edges.insert(edge("c", "d", 1, 2));
        assert_eq!(starts(&edges), vec![1, 1, 3, 5]);
        // Equal starts keep insertion order.
        assert_eq!(edges.as_slice()[0].sink(), "c");
        assert_eq!(edges.as_slice()[1].sink(), "d");
    }

    #[test]
    fn insert_is_idempotent() {
        let mut edges = TemporalEdges::new();
        let (_, added) = edges.insert(edge("a", "b", 1, 2));
        assert!(added);
        let (stored, added) = edges.insert(edge("a", "b", 1, 2));
        assert!(!added);
        assert_eq!(stored.uid().to_string(), "a-b|1-2");
        assert_eq!(edges.len(), 1);
    }

    #[test]
    fn lookup_and_remove_by_uid() {
        let mut edges: TemporalEdges = vec![
            edge("a", "b", 1, 2),
            edge("a", "b", 1, 4),
            edge("b", "c", 2, 3),
        ]
        .into_iter()
        .collect();
        let uid = EdgeUid::temporal("a", "b", 1, 4);
        assert_eq!(edges.position(&uid), Some(1));
        assert!(edges.get(&EdgeUid::temporal("a", "b", 1, 3)).is_none());
        assert!(edges.get(&EdgeUid::fixed("a", "b")).is_none());

        let removed = edges.remove(&uid).unwrap();
        assert_eq!(removed.end(), 4);
        assert!(!edges.contains(&uid));
        assert_eq!(edges.len(), 2);
        assert!(edges.remove(&uid).is_none());
    }

    #[test]
    fn timespan_is_half_open() {
        let edges: TemporalEdges = vec![edge("a", "b", 2, 9), edge("b", "c", 4, 5)]
            .into_iter()
            .collect();
        assert_eq!(edges.timespan(), Some(Timespan { start: 2, end: 10 }));
        assert_eq!(TemporalEdges::new().timespan(), None);
    }

    #[test]
    fn active_at_and_by_interval() {
        let edges: TemporalEdges = vec![
            edge("a", "b", 1, 2),
            edge("b", "c", 2, 6),
            edge("c", "d", 4, 5),
            edge("d", "e", 7, 7),
        ]
        .into_iter()
        .collect();

        let active: Vec<String> = edges.active_at(4).iter().map(|e| e.label()).collect();
        assert_eq!(active, vec!["b-c", "c-d"]);
        assert!(edges.active_at(0).is_empty());
        assert_eq!(edges.active_at(7).len(), 1);

        let inside: Vec<String> = edges
            .by_interval(&Interval::new(2, 6).unwrap())
            .iter()
            .map(|e| e.label())
            .collect();
        assert_eq!(inside, vec!["b-c", "c-d"]);
        assert!(edges.by_interval(&Interval::new(3, 4).unwrap()).is_empty());
    }

    #[test]
    fn start_end_and_endpoint_queries() {
        let edges: TemporalEdges = vec![
            edge("a", "b", 1, 2),
            edge("a", "c", 1, 3),
            edge("c", "a", 2, 3),
        ]
        .into_iter()
        .collect();
        assert_eq!(edges.by_start(1).len(), 2);
        assert_eq!(edges.by_end(3).len(), 2);
        assert_eq!(edges.with_node1("a").len(), 2);
        assert_eq!(edges.with_node2("a").len(), 1);
        assert_eq!(edges.incident("c").len(), 2);
        assert_eq!(edges.by_label("a", "c").len(), 1);
        assert_eq!(edges.end_times(), vec![2, 3, 3]);
    }

    #[test]
    fn retain_keeps_index_consistent() {
        let mut edges: TemporalEdges = vec![edge("a", "b", 1, 2), edge("b", "c", 2, 3)]
            .into_iter()
            .collect();
        edges.retain(|e| e.source() != "a");
        assert_eq!(edges.len(), 1);
        assert!(!edges.contains(&EdgeUid::temporal("a", "b", 1, 2)));
        let (_, added) = edges.insert(edge("a", "b", 1, 2));
        assert!(added);
    }

    #[test]
    fn deserialization_restores_order_and_drops_duplicates() {
        let json = r#"[
            {"node1":"a","node2":"b","start":5,"end":6,"directed":true},
            {"node1":"a","node2":"c","start":1,"end":2,"directed":true},
            {"node1":"a","node2":"b","start":5,"end":6,"directed":true}
        ]"#;
        let edges: TemporalEdges = serde_json::from_str(json).unwrap();
        assert_eq!(starts(&edges), vec![1, 5]);
    }

    #[test]
    fn static_edges_collapse_undirected_duplicates() {
        let mut edges = StaticEdges::new();
        assert!(edges.insert(StaticEdge::new("b", "a", false)).1);
        assert!(!edges.insert(StaticEdge::new("a", "b", false)).1);
        assert!(edges.insert(StaticEdge::new("a", "c", false)).1);
        assert_eq!(edges.len(), 2);
        assert_eq!(edges.incident("a").len(), 2);
        assert!(edges.remove(&EdgeUid::fixed("a", "b")).is_some());
        assert_eq!(edges.uids(), vec![EdgeUid::fixed("a", "c")]);
    }
}
