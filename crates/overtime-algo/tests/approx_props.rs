//! Property tests for foremost trees, path durations and the approximators
//! on random temporal graphs.

use std::collections::HashMap;

use proptest::prelude::*;

use overtime_algo::{
    c_approximation, fastest_path_durations, h_approximation, max_reachability, reachability,
    shortest_path_lengths_by, ApproxConfig, ForemostTree, PathMetric,
};
use overtime_core::{Graph, GraphKind, Time};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

const LABELS: [&str; 7] = ["a", "b", "c", "d", "e", "f", "g"];

fn graph_strategy() -> impl Strategy<Value = Graph> {
    let edge = (0..LABELS.len(), 0..LABELS.len(), 0i64..12, 0i64..3)
        .prop_filter("no self loops", |(u, v, _, _)| u != v);
    (any::<bool>(), prop::collection::vec(edge, 1..25)).prop_map(|(directed, edges)| {
        let kind = GraphKind {
            directed,
            temporal: true,
        };
        let mut graph = Graph::new("random", kind);
        for (u, v, start, len) in edges {
            graph
                .add_edge(LABELS[u], LABELS[v], start, start + len)
                .unwrap();
        }
        graph
    })
}

/// Earliest arrival from `root` by relaxing every edge until nothing
/// changes.
fn earliest_arrivals(graph: &Graph, root: &str) -> HashMap<String, Time> {
    let span = graph.timespan().unwrap();
    let mut best: HashMap<String, Time> = HashMap::new();
    best.insert(root.to_string(), span.start);
    loop {
        let mut changed = false;
        for edge in graph.temporal_edges().unwrap() {
            let mut hops = vec![(edge.node1(), edge.node2())];
            if !edge.is_directed() {
                hops.push((edge.node2(), edge.node1()));
            }
            for (u, v) in hops {
                let Some(&at_u) = best.get(u) else { continue };
                if edge.start() < at_u {
                    continue;
                }
                let improves = best.get(v).map_or(true, |&at_v| edge.end() < at_v);
                if improves && v != root {
                    best.insert(v.to_string(), edge.end());
                    changed = true;
                }
            }
        }
        if !changed {
            return best;
        }
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn foremost_times_are_earliest_arrivals(graph in graph_strategy()) {
        for root in graph.labels() {
            let tree = ForemostTree::build(&graph, root).unwrap();
            let oracle = earliest_arrivals(&graph, root);
            for (label, time) in tree.times() {
                prop_assert_eq!(time, oracle.get(label).copied(), "root {} node {}", root, label);
            }
            prop_assert_eq!(reachability(&graph, root).unwrap(), oracle.len());
        }
    }

    #[test]
    fn path_durations_agree_with_reachability(graph in graph_strategy()) {
        for root in graph.labels() {
            let tree = ForemostTree::build(&graph, root).unwrap();
            let fastest = fastest_path_durations(&graph, root, None).unwrap();
            let hops = shortest_path_lengths_by(&graph, root, None, PathMetric::Hops).unwrap();
            for (label, _) in tree.times() {
                let reached = tree.is_reachable(label);
                prop_assert_eq!(fastest[label].is_finite(), reached);
                prop_assert_eq!(hops[label].is_finite(), reached);
                if label != root {
                    if let Some(d) = hops[label].finite() {
                        prop_assert!(d >= 1);
                    }
                }
            }
            prop_assert_eq!(fastest[root].finite(), Some(0));
        }
    }

    #[test]
    fn h_approximation_meets_bound(graph in graph_strategy(), h in 1usize..5) {
        let mut reduced = graph.clone();
        let removed = h_approximation(&mut reduced, h, &ApproxConfig::default()).unwrap();
        prop_assert!(max_reachability(&reduced).unwrap() <= h);
        prop_assert_eq!(reduced.edge_count() + removed.len(), graph.edge_count());
        let again = h_approximation(&mut reduced, h, &ApproxConfig::sequential()).unwrap();
        prop_assert!(again.is_empty());
    }

    #[test]
    fn c_approximation_meets_bound_for_any_layout(
        graph in graph_strategy(),
        h in 1usize..5,
        order in Just(LABELS.to_vec()).prop_shuffle(),
    ) {
        let layout: Vec<&str> = order.into_iter().filter(|l| graph.contains_node(l)).collect();
        let mut reduced = graph.clone();
        let config = ApproxConfig::sequential();
        let removed = c_approximation(&mut reduced, h, &layout, &config).unwrap();
        prop_assert!(max_reachability(&reduced).unwrap() <= h);
        for uid in &removed {
            prop_assert!(graph.contains_edge(uid));
        }
    }
}
