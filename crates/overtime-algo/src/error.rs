//! Error types for the reachability and approximation algorithms.

use std::time::Duration;

use overtime_core::{CoreError, EdgeUid};

/// Errors produced by the algorithms in this crate.
///
/// Graph-level failures (unknown node, wrong graph kind) are forwarded from
/// [`CoreError`] unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlgoError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("reachability bound must be at least 1, got {h}")]
    InvalidBound { h: usize },

    #[error("invalid layout: {reason}")]
    InvalidLayout { reason: String },

    #[error("invalid generator configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The time budget ran out. `removed` lists the edges already deleted
    /// from the graph, so the caller can inspect or restore them.
    #[error("deadline of {budget:?} exceeded after removing {} edges", .removed.len())]
    DeadlineExceeded {
        budget: Duration,
        removed: Vec<EdgeUid>,
    },
}
