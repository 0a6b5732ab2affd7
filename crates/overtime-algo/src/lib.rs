//! Temporal reachability algorithms over [`overtime_core::Graph`].
//!
//! - [`foremost`]: earliest-arrival trees
//! - [`reachability`]: per-root and graph-wide reachability
//! - [`paths`]: fastest and shortest path durations
//! - [`approx`]: h- and c-approximation edge removal
//! - [`generate`]: seeded random temporal graphs

pub mod approx;
pub mod config;
pub mod error;
pub mod foremost;
pub mod generate;
pub mod paths;
pub mod reachability;

pub use approx::{
    c_approximated, c_approximation, crossing_edges, default_layout, h_approximated,
    h_approximation, Approximation,
};
pub use config::ApproxConfig;
pub use error::AlgoError;
pub use foremost::{ForemostNode, ForemostTree, TreeArc};
pub use generate::{gnp_records, random_gnp, GnpConfig};
pub use paths::{
    fastest_path_durations, shortest_path_lengths, shortest_path_lengths_by, PathMetric,
};
pub use reachability::{
    annotate_foremost_times, annotate_reachability, max_end_time, max_reachability, reachability,
    reachability_all,
};
