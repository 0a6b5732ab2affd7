//! Temporal reachability: how many nodes a root reaches by time-respecting
//! paths, derived from its foremost tree.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde_json::Value;

use overtime_core::{Annotations, CoreError, Graph, Time};

use crate::foremost::ForemostTree;

pub const REACHABILITY_KEY: &str = "reachability";
pub const FOREMOST_TIME_KEY: &str = "foremost_time";

/// Number of nodes reachable from `root`, the root included.
pub fn reachability(graph: &Graph, root: &str) -> Result<usize, CoreError> {
    Ok(ForemostTree::build(graph, root)?.reach())
}

/// Reachability of every node, ordered by label.
///
/// Roots are evaluated in parallel when `parallel` is set; the result is
/// the same either way.
pub(crate) fn reach_counts(
    graph: &Graph,
    parallel: bool,
) -> Result<Vec<(String, usize)>, CoreError> {
    let mut labels = graph.labels();
    labels.sort_unstable();
    let count = |label: &&str| reachability(graph, label).map(|r| (label.to_string(), r));
    if parallel {
        labels.par_iter().map(count).collect()
    } else {
        labels.iter().map(count).collect()
    }
}

/// Reachability of every node in the graph.
pub fn reachability_all(graph: &Graph) -> Result<BTreeMap<String, usize>, CoreError> {
    Ok(reach_counts(graph, true)?.into_iter().collect())
}

/// The largest reachability over all roots; 0 for a graph without nodes.
pub fn max_reachability(graph: &Graph) -> Result<usize, CoreError> {
    graph.temporal_edges()?;
    let best = graph
        .labels()
        .par_iter()
        .map(|label| reachability(graph, label))
        .try_reduce(|| 0, |a, b| Ok(a.max(b)))?;
    Ok(best)
}

/// Latest instant at which any edge is active.
pub fn max_end_time(graph: &Graph) -> Option<Time> {
    graph.timespan().map(|span| span.last())
}

/// Stores every node's reachability under `"reachability"`.
pub fn annotate_reachability(
    graph: &Graph,
    annotations: &mut Annotations,
) -> Result<(), CoreError> {
    for (label, reach) in reach_counts(graph, true)? {
        annotations.set(label, REACHABILITY_KEY, reach);
    }
    Ok(())
}

/// Stores every node's foremost time from `root` under `"foremost_time"`;
/// unreached nodes get `null`.
pub fn annotate_foremost_times(
    graph: &Graph,
    root: &str,
    annotations: &mut Annotations,
) -> Result<(), CoreError> {
    let tree = ForemostTree::build(graph, root)?;
    for (label, time) in tree.times() {
        let value = time.map_or(Value::Null, Value::from);
        annotations.set(label, FOREMOST_TIME_KEY, value);
    }
    Ok(())
}
