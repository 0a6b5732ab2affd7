//! Reachability-bounding edge removal.
//!
//! Both approximators delete temporal edges until no node reaches more than
//! `h` nodes (itself included):
//!
//! - [`h_approximation`] repeatedly picks a root whose reachability exceeds
//!   `h`, grows its foremost tree for exactly `h` arcs and deletes the edges
//!   behind those arcs, including arcs a faster edge superseded.
//! - [`c_approximation`] walks a fixed node layout, binary-searching the
//!   longest prefix that is already within the bound and cutting every edge
//!   that crosses from that prefix to the rest.
//!
//! Each round starts with a deadline check. The in-place forms mutate
//! through `&mut Graph`; the `*_approximated` forms work on a copy.

use std::collections::HashSet;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use overtime_core::{CoreError, EdgeUid, Graph};

use crate::config::ApproxConfig;
use crate::error::AlgoError;
use crate::foremost::ForemostTree;
use crate::reachability::{reach_counts, reachability};

/// A reduced copy of a graph together with the edges taken out of it.
#[derive(Debug, Clone, Serialize)]
pub struct Approximation {
    pub graph: Graph,
    pub removed: Vec<EdgeUid>,
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn check_bound(h: usize) -> Result<(), AlgoError> {
    if h == 0 {
        return Err(AlgoError::InvalidBound { h });
    }
    Ok(())
}

fn check_deadline(
    config: &ApproxConfig,
    started: Instant,
    removed: &[EdgeUid],
) -> Result<(), AlgoError> {
    let Some(budget) = config.deadline else {
        return Ok(());
    };
    if started.elapsed() >= budget {
        tracing::warn!(?budget, removed = removed.len(), "approximation deadline exceeded");
        return Err(AlgoError::DeadlineExceeded {
            budget,
            removed: removed.to_vec(),
        });
    }
    Ok(())
}

fn max_reach(graph: &Graph, parallel: bool) -> Result<usize, CoreError> {
    Ok(reach_counts(graph, parallel)?
        .into_iter()
        .map(|(_, r)| r)
        .max()
        .unwrap_or(0))
}

/// The lexicographically smallest label whose reachability exceeds `h`.
fn first_exceeding(
    graph: &Graph,
    h: usize,
    parallel: bool,
) -> Result<Option<(String, usize)>, CoreError> {
    let mut labels = graph.labels();
    labels.sort_unstable();
    let probe = |label: &&str| match reachability(graph, label) {
        Ok(r) if r > h => Some(Ok((label.to_string(), r))),
        Ok(_) => None,
        Err(e) => Some(Err(e)),
    };
    let hit = if parallel {
        labels.par_iter().find_map_first(probe)
    } else {
        labels.iter().find_map(probe)
    };
    hit.transpose()
}

// ---------------------------------------------------------------------------
// h-approximation
// ---------------------------------------------------------------------------

/// Removes edges from `graph` until every node's reachability is at most
/// `h`, returning the uids of the removed edges in removal order.
///
/// On `DeadlineExceeded` the graph keeps the removals made so far and the
/// error lists them.
pub fn h_approximation(
    graph: &mut Graph,
    h: usize,
    config: &ApproxConfig,
) -> Result<Vec<EdgeUid>, AlgoError> {
    check_bound(h)?;
    graph.temporal_edges()?;
    let started = Instant::now();
    let mut removed = Vec::new();
    let mut round = 0usize;

    loop {
        check_deadline(config, started, &removed)?;
        let Some((root, reach)) = first_exceeding(graph, h, config.parallel)? else {
            break;
        };
        round += 1;
        let tree = ForemostTree::bounded(graph, &root, h)?;
        let cut = tree.grown_origins().to_vec();
        tracing::debug!(round, root = %root, reach, cut = cut.len(), "h-approximation round");
        graph.remove_edges(&cut)?;
        removed.extend(cut);
    }

    tracing::info!(
        h,
        rounds = round,
        removed = removed.len(),
        elapsed = ?started.elapsed(),
        "h-approximation finished"
    );
    Ok(removed)
}

/// Copying form of [`h_approximation`]: `graph` is left untouched.
pub fn h_approximated(
    graph: &Graph,
    h: usize,
    config: &ApproxConfig,
) -> Result<Approximation, AlgoError> {
    let mut copy = graph.clone();
    let removed = h_approximation(&mut copy, h, config)?;
    Ok(Approximation {
        graph: copy,
        removed,
    })
}

// ---------------------------------------------------------------------------
// c-approximation
// ---------------------------------------------------------------------------

/// Node labels in insertion order, the layout used when the caller has no
/// better ordering.
pub fn default_layout(graph: &Graph) -> Vec<String> {
    graph.labels().into_iter().map(str::to_string).collect()
}

/// Edges with exactly one endpoint among `layout[..=j]`.
pub fn crossing_edges<S: AsRef<str>>(graph: &Graph, layout: &[S], j: usize) -> Vec<EdgeUid> {
    let end = (j + 1).min(layout.len());
    let prefix: HashSet<&str> = layout[..end].iter().map(AsRef::as_ref).collect();
    graph
        .edge_uids()
        .into_iter()
        .filter(|uid| prefix.contains(uid.node1.as_str()) != prefix.contains(uid.node2.as_str()))
        .collect()
}

fn check_layout<S: AsRef<str>>(graph: &Graph, layout: &[S]) -> Result<(), AlgoError> {
    if layout.len() != graph.node_count() {
        return Err(AlgoError::InvalidLayout {
            reason: format!(
                "layout has {} labels but the graph has {} nodes",
                layout.len(),
                graph.node_count()
            ),
        });
    }
    let mut seen = HashSet::with_capacity(layout.len());
    for label in layout.iter().map(AsRef::as_ref) {
        if !graph.contains_node(label) {
            return Err(AlgoError::InvalidLayout {
                reason: format!("unknown node {}", label),
            });
        }
        if !seen.insert(label) {
            return Err(AlgoError::InvalidLayout {
                reason: format!("node {} appears twice", label),
            });
        }
    }
    Ok(())
}

/// Maximum reachability inside the temporal subgraph induced by
/// `layout[..=j]`.
fn prefix_reach<S: AsRef<str>>(
    graph: &Graph,
    layout: &[S],
    j: usize,
    parallel: bool,
) -> Result<usize, CoreError> {
    let prefix: Vec<&str> = layout[..=j].iter().map(AsRef::as_ref).collect();
    let induced = graph.temporal_subgraph(Some(prefix.as_slice()), None)?;
    max_reach(&induced, parallel)
}

/// Removes edges from `graph` until its maximum reachability is at most
/// `h`, cutting along `layout` (a permutation of the node labels).
///
/// Returns the uids of the removed edges in removal order.
pub fn c_approximation<S: AsRef<str>>(
    graph: &mut Graph,
    h: usize,
    layout: &[S],
    config: &ApproxConfig,
) -> Result<Vec<EdgeUid>, AlgoError> {
    check_bound(h)?;
    graph.temporal_edges()?;
    check_layout(graph, layout)?;
    let started = Instant::now();
    let n = layout.len();
    let mut removed = Vec::new();
    let mut i = 0usize;

    loop {
        check_deadline(config, started, &removed)?;
        if max_reach(graph, config.parallel)? <= h || i >= n {
            break;
        }

        // The single-node prefix extension is always within the bound, so
        // the search never returns less than `i`.
        let (mut lo, mut hi) = (i, n - 1);
        while lo < hi {
            let mid = lo + (hi - lo + 1) / 2;
            if prefix_reach(graph, layout, mid, config.parallel)? <= h {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        let j = lo;

        let cut = crossing_edges(graph, layout, j);
        tracing::debug!(from = i, cut_after = j, cut = cut.len(), "c-approximation round");
        graph.remove_edges(&cut)?;
        removed.extend(cut);
        i = j + 1;
    }

    debug_assert!(max_reach(graph, false).map_or(true, |r| r <= h));
    tracing::info!(
        h,
        removed = removed.len(),
        elapsed = ?started.elapsed(),
        "c-approximation finished"
    );
    Ok(removed)
}

/// Copying form of [`c_approximation`]: `graph` is left untouched.
pub fn c_approximated<S: AsRef<str>>(
    graph: &Graph,
    h: usize,
    layout: &[S],
    config: &ApproxConfig,
) -> Result<Approximation, AlgoError> {
    let mut copy = graph.clone();
    let removed = c_approximation(&mut copy, h, layout, config)?;
    Ok(Approximation {
        graph: copy,
        removed,
    })
}
