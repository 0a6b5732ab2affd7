//! Fastest and shortest time-respecting path durations.
//!
//! Both algorithms make one pass over the start-sorted temporal edges
//! (rescanning runs of edges that share a start time, which can chain
//! through zero-duration edges) and keep, per node, a Pareto frontier of
//! the journeys that reach it. A
//! journey is a `(key, arrive)` pair; the key is the departure time from
//! the root for fastest paths and the accumulated length for shortest
//! paths. Only journeys that no other journey dominates are kept, so each
//! frontier stays small and sorted by arrival.
//!
//! Reference: Wu et al., "Path Problems in Temporal Graphs", VLDB 2014.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use overtime_core::{CoreError, Distance, Graph, Interval, TemporalEdge, Time};

/// Edge weight used by [`shortest_path_lengths_by`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathMetric {
    /// Sum of edge durations.
    #[default]
    Duration,
    /// Number of edges.
    Hops,
}

impl PathMetric {
    fn weight(self, edge: &TemporalEdge) -> i64 {
        match self {
            PathMetric::Duration => edge.duration(),
            PathMetric::Hops => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Frontier
// ---------------------------------------------------------------------------

/// Journey key with a "no worse than" relation.
trait JourneyKey: Copy {
    fn no_worse(self, other: Self) -> bool;
}

/// Departure time from the root; later is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Depart(Time);

impl JourneyKey for Depart {
    fn no_worse(self, other: Self) -> bool {
        self.0 >= other.0
    }
}

/// Accumulated path length; smaller is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Length(i64);

impl JourneyKey for Length {
    fn no_worse(self, other: Self) -> bool {
        self.0 <= other.0
    }
}

/// Non-dominated `(key, arrive)` journeys, sorted by arrival.
///
/// Because no entry dominates another, a later arrival always comes with a
/// strictly better key.
#[derive(Debug, Clone)]
struct Frontier<K: JourneyKey> {
    entries: SmallVec<[(K, Time); 4]>,
}

impl<K: JourneyKey> Frontier<K> {
    fn new() -> Self {
        Frontier {
            entries: SmallVec::new(),
        }
    }

    /// The journey that has arrived by `t` with the best key.
    fn boardable(&self, t: Time) -> Option<(K, Time)> {
        let arrived = self.entries.partition_point(|&(_, a)| a <= t);
        arrived.checked_sub(1).map(|i| self.entries[i])
    }

    /// Adds `(key, arrive)` unless an existing journey dominates it, and
    /// drops every journey it dominates. Returns whether it was added.
    fn offer(&mut self, key: K, arrive: Time) -> bool {
        if self
            .entries
            .iter()
            .any(|&(k, a)| k.no_worse(key) && a <= arrive)
        {
            return false;
        }
        self.entries
            .retain(|(k, a)| !(key.no_worse(*k) && arrive <= *a));
        let pos = self.entries.partition_point(|&(_, a)| a <= arrive);
        self.entries.insert(pos, (key, arrive));
        true
    }
}

// ---------------------------------------------------------------------------
// Scan
// ---------------------------------------------------------------------------

/// Edge directions to consider: `(from, to)` pairs.
fn directions(edge: &TemporalEdge) -> SmallVec<[(&str, &str); 2]> {
    let mut out = SmallVec::new();
    out.push((edge.node1(), edge.node2()));
    if !edge.is_directed() {
        out.push((edge.node2(), edge.node1()));
    }
    out
}

/// Resolves the scan window and the root's dense index.
fn prepare(
    graph: &Graph,
    root: &str,
    window: Option<Interval>,
) -> Result<(usize, Option<Interval>), CoreError> {
    graph.temporal_edges()?;
    let root_pos = graph
        .node_index_of(root)
        .ok_or_else(|| CoreError::NodeNotFound {
            label: root.to_string(),
        })?;
    let window = match window {
        Some(w) => {
            w.validate()?;
            Some(w)
        }
        None => graph.timespan().map(|span| span.as_interval()),
    };
    Ok((root_pos, window))
}

/// Edges with `lo <= start` and `end <= hi`, in start order.
fn edges_within<'g>(
    graph: &'g Graph,
    window: Interval,
) -> Result<impl Iterator<Item = &'g TemporalEdge>, CoreError> {
    let slice = graph.temporal_edges()?.as_slice();
    let first = slice.partition_point(|e| e.start() < window.start);
    Ok(slice[first..]
        .iter()
        .take_while(move |e| e.start() <= window.end)
        .filter(move |e| e.end() <= window.end))
}

fn collect(graph: &Graph, best: &[Option<i64>]) -> BTreeMap<String, Distance> {
    graph
        .labels()
        .into_iter()
        .zip(best)
        .map(|(label, d)| (label.to_string(), Distance::from(*d)))
        .collect()
}

fn slot(graph: &Graph, label: &str) -> usize {
    // Edge endpoints are always graph nodes.
    graph.node_index_of(label).unwrap_or_default()
}

/// Minimum `arrive - depart` over all time-respecting paths from `root` to
/// every node, restricted to edges inside `window` (default: the whole
/// timespan).
///
/// A path may wait at intermediate nodes; the clock starts when it leaves
/// the root. The root itself reports 0, unreachable nodes
/// [`Distance::Unreachable`].
pub fn fastest_path_durations(
    graph: &Graph,
    root: &str,
    window: Option<Interval>,
) -> Result<BTreeMap<String, Distance>, CoreError> {
    let (root_pos, window) = prepare(graph, root, window)?;
    let mut best: Vec<Option<i64>> = vec![None; graph.node_count()];
    best[root_pos] = Some(0);
    let Some(window) = window else {
        return Ok(collect(graph, &best));
    };

    let mut frontiers: Vec<Frontier<Depart>> = vec![Frontier::new(); graph.node_count()];
    let scanned: Vec<&TemporalEdge> = edges_within(graph, window)?.collect();
    for group in scanned.chunk_by(|a, b| a.start() == b.start()) {
        // Rescan until the group adds no journey.
        loop {
            let mut changed = false;
            for edge in group {
                let (ts, te) = (edge.start(), edge.end());
                // Judge every direction against the frontiers before this edge.
                let mut arrivals: SmallVec<[(usize, &str, Depart); 2]> = SmallVec::new();
                for (from, to) in directions(edge) {
                    let (u, v) = (slot(graph, from), slot(graph, to));
                    if u == root_pos {
                        frontiers[u].offer(Depart(ts), ts);
                    }
                    if let Some((depart, _)) = frontiers[u].boardable(ts) {
                        arrivals.push((v, to, depart));
                    }
                }
                for (v, to, depart) in arrivals {
                    if frontiers[v].offer(depart, te) {
                        changed = true;
                        let duration = te.checked_sub(depart.0).ok_or_else(|| {
                            CoreError::CostOverflow {
                                label: to.to_string(),
                            }
                        })?;
                        if best[v].map_or(true, |b| duration < b) {
                            best[v] = Some(duration);
                        }
                    }
                }
            }
            if !changed {
                break;
            }
        }
    }
    Ok(collect(graph, &best))
}

/// Minimum summed edge duration over all time-respecting paths from
/// `root`. Same as [`shortest_path_lengths_by`] with
/// [`PathMetric::Duration`].
pub fn shortest_path_lengths(
    graph: &Graph,
    root: &str,
    window: Option<Interval>,
) -> Result<BTreeMap<String, Distance>, CoreError> {
    shortest_path_lengths_by(graph, root, window, PathMetric::Duration)
}

/// Minimum path length from `root` to every node over time-respecting
/// paths inside `window`, with edge weights chosen by `metric`.
pub fn shortest_path_lengths_by(
    graph: &Graph,
    root: &str,
    window: Option<Interval>,
    metric: PathMetric,
) -> Result<BTreeMap<String, Distance>, CoreError> {
    let (root_pos, window) = prepare(graph, root, window)?;
    let mut best: Vec<Option<i64>> = vec![None; graph.node_count()];
    best[root_pos] = Some(0);
    let Some(window) = window else {
        return Ok(collect(graph, &best));
    };

    let mut frontiers: Vec<Frontier<Length>> = vec![Frontier::new(); graph.node_count()];
    let scanned: Vec<&TemporalEdge> = edges_within(graph, window)?.collect();
    for group in scanned.chunk_by(|a, b| a.start() == b.start()) {
        loop {
            let mut changed = false;
            for edge in group {
                let (ts, te) = (edge.start(), edge.end());
                let weight = metric.weight(edge);
                let mut arrivals: SmallVec<[(usize, Length); 2]> = SmallVec::new();
                for (from, to) in directions(edge) {
                    let (u, v) = (slot(graph, from), slot(graph, to));
                    if u == root_pos {
                        frontiers[u].offer(Length(0), ts);
                    }
                    if let Some((Length(length), _)) = frontiers[u].boardable(ts) {
                        let length = length.checked_add(weight).ok_or_else(|| {
                            CoreError::CostOverflow {
                                label: to.to_string(),
                            }
                        })?;
                        arrivals.push((v, Length(length)));
                    }
                }
                for (v, length) in arrivals {
                    if !frontiers[v].offer(length, te) {
                        continue;
                    }
                    changed = true;
                    if best[v].map_or(true, |b| length.0 < b) {
                        best[v] = Some(length.0);
                    }
                }
            }
            if !changed {
                break;
            }
        }
    }
    Ok(collect(graph, &best))
}

#[cfg(test)]
mod tests {
    use super::*;
    use overtime_core::GraphKind;

    fn directed(edges: &[(&str, &str, Time, Time)]) -> Graph {
        let mut graph = Graph::new("p", GraphKind::TEMPORAL_DIRECTED);
        for &(a, b, s, e) in edges {
            graph.add_edge(a, b, s, e).unwrap();
        }
        graph
    }

    fn finite(map: &BTreeMap<String, Distance>, label: &str) -> Option<i64> {
        map[label].finite()
    }

    #[test]
    fn frontier_keeps_only_non_dominated_journeys() {
        let mut f: Frontier<Depart> = Frontier::new();
        assert!(f.offer(Depart(1), 5));
        assert!(f.offer(Depart(3), 7));
        assert!(!f.offer(Depart(2), 8));
        // Departs later and arrives earlier than both.
        assert!(f.offer(Depart(4), 5));
        assert_eq!(f.entries.as_slice(), &[(Depart(4), 5)]);
    }

    #[test]
    fn boardable_picks_latest_arrived_journey() {
        let mut f: Frontier<Length> = Frontier::new();
        f.offer(Length(5), 2);
        f.offer(Length(3), 6);
        f.offer(Length(1), 9);
        assert_eq!(f.boardable(1), None);
        assert_eq!(f.boardable(6), Some((Length(3), 6)));
        assert_eq!(f.boardable(100), Some((Length(1), 9)));
    }

    #[test]
    fn fastest_prefers_late_departure() {
        // a waits for the 10 o'clock edge instead of leaving at 1.
        let graph = directed(&[("a", "b", 1, 2), ("b", "c", 12, 13), ("a", "b", 10, 11)]);
        let fastest = fastest_path_durations(&graph, "a", None).unwrap();
        assert_eq!(finite(&fastest, "a"), Some(0));
        assert_eq!(finite(&fastest, "b"), Some(1));
        assert_eq!(finite(&fastest, "c"), Some(3));
    }

    #[test]
    fn cannot_board_before_arrival() {
        let graph = directed(&[("a", "b", 1, 6), ("b", "c", 3, 4)]);
        let fastest = fastest_path_durations(&graph, "a", None).unwrap();
        assert_eq!(fastest["c"], Distance::Unreachable);
        let shortest = shortest_path_lengths(&graph, "a", None).unwrap();
        assert_eq!(shortest["c"], Distance::Unreachable);
        assert_eq!(finite(&shortest, "b"), Some(5));
    }

    #[test]
    fn hop_metric_counts_edges() {
        let graph = directed(&[("a", "b", 1, 4), ("b", "c", 5, 9), ("a", "c", 2, 20)]);
        let by_duration = shortest_path_lengths(&graph, "a", None).unwrap();
        assert_eq!(finite(&by_duration, "c"), Some(7));
        let by_hops = shortest_path_lengths_by(&graph, "a", None, PathMetric::Hops).unwrap();
        assert_eq!(finite(&by_hops, "c"), Some(1));
    }

    #[test]
    fn window_excludes_edges_outside() {
        let graph = directed(&[("a", "b", 1, 2), ("a", "b", 5, 6), ("b", "c", 7, 9)]);
        let window = Interval::new(4, 8).unwrap();
        let fastest = fastest_path_durations(&graph, "a", Some(window)).unwrap();
        assert_eq!(finite(&fastest, "b"), Some(1));
        assert_eq!(fastest["c"], Distance::Unreachable);
    }

    #[test]
    fn undirected_paths_run_both_ways() {
        let mut graph = Graph::new("u", GraphKind::TEMPORAL);
        graph.add_edge("c", "b", 1, 2).unwrap();
        graph.add_edge("a", "b", 3, 4).unwrap();
        let fastest = fastest_path_durations(&graph, "c", None).unwrap();
        assert_eq!(finite(&fastest, "b"), Some(1));
        assert_eq!(finite(&fastest, "a"), Some(3));
    }

    #[test]
    fn errors() {
        let graph = directed(&[("a", "b", 1, 2)]);
        assert!(matches!(
            fastest_path_durations(&graph, "z", None),
            Err(CoreError::NodeNotFound { .. })
        ));
        let reversed = Interval { start: 5, end: 1 };
        assert!(matches!(
            shortest_path_lengths(&graph, "a", Some(reversed)),
            Err(CoreError::InvalidInterval { .. })
        ));
    }

    #[test]
    fn instant_chain_inserted_backwards() {
        let graph = directed(&[("b", "c", 3, 3), ("a", "b", 3, 3), ("a", "x", 1, 1)]);
        let fastest = fastest_path_durations(&graph, "a", None).unwrap();
        assert_eq!(finite(&fastest, "c"), Some(0));
        let hops = shortest_path_lengths_by(&graph, "a", None, PathMetric::Hops).unwrap();
        assert_eq!(finite(&hops, "c"), Some(2));
    }

    #[test]
    fn overflowing_costs_are_errors() {
        let graph = directed(&[("a", "b", Time::MIN, -1), ("b", "c", 0, Time::MAX - 1)]);
        assert_eq!(
            fastest_path_durations(&graph, "a", None),
            Err(CoreError::CostOverflow {
                label: "c".to_string()
            })
        );
        assert_eq!(
            shortest_path_lengths(&graph, "a", None),
            Err(CoreError::CostOverflow {
                label: "c".to_string()
            })
        );
        let hops = shortest_path_lengths_by(&graph, "a", None, PathMetric::Hops).unwrap();
        assert_eq!(finite(&hops, "c"), Some(2));
    }

    #[test]
    fn edgeless_graph_reports_only_root() {
        let mut graph = Graph::new("e", GraphKind::TEMPORAL_DIRECTED);
        graph.add_node("a");
        graph.add_node("b");
        let fastest = fastest_path_durations(&graph, "a", None).unwrap();
        assert_eq!(fastest["a"], Distance::Finite(0));
        assert_eq!(fastest["b"], Distance::Unreachable);
    }
}
