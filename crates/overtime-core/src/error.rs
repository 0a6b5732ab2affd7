//! Core error types for overtime-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering
//! every failure mode of the temporal graph data model. Validation happens
//! before a collection is touched, so an error never leaves an edge
//! collection out of start-time order.

use thiserror::Error;

use crate::id::EdgeUid;
use crate::time::Time;

/// Core errors produced by the overtime-core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A node label was not found in the graph.
    #[error("node not found: '{label}'")]
    NodeNotFound { label: String },

    /// An edge uid was not found in the graph.
    #[error("edge not found: {uid}")]
    EdgeNotFound { uid: EdgeUid },

    /// A node failed validation (e.g. stored under another label).
    #[error("invalid node: {reason}")]
    InvalidNode { reason: String },

    /// An edge failed validation (e.g. it ends before it starts).
    #[error("invalid edge: {reason}")]
    InvalidEdge { reason: String },

    /// An interval whose lower bound lies after its upper bound.
    #[error("invalid interval: [{start}, {end}]")]
    InvalidInterval { start: Time, end: Time },

    /// A path duration or length no longer fits in a [`Time`].
    #[error("path cost overflow on the way to '{label}'")]
    CostOverflow { label: String },

    /// A temporal operation was requested on a static graph, or vice versa.
    #[error("graph kind mismatch: expected a {expected} graph, found a {found} graph")]
    KindMismatch {
        expected: &'static str,
        found: &'static str,
    },
}
