//! Random temporal graphs.
//!
//! [`random_gnp`] samples an Erdős–Rényi G(n, p) graph at every timestep of
//! `[start, end]` and turns each sampled edge into an instantaneous temporal
//! edge at that step. The generator is seeded, so the same [`GnpConfig`]
//! always yields the same graph.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use overtime_core::{CoreError, EdgeRecord, Graph, GraphKind, Time};

use crate::error::AlgoError;

/// Parameters of the temporal G(n, p) generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GnpConfig {
    /// Number of nodes, labelled `"0"` to `"n-1"`.
    pub nodes: usize,
    /// Probability that a given node pair is linked at a given step.
    pub probability: f64,
    pub directed: bool,
    /// First timestep (inclusive).
    pub start: Time,
    /// Last timestep (inclusive).
    pub end: Time,
    /// PRNG seed for reproducibility.
    pub seed: u64,
}

impl Default for GnpConfig {
    fn default() -> Self {
        GnpConfig {
            nodes: 10,
            probability: 0.5,
            directed: false,
            start: 0,
            end: 10,
            seed: 0,
        }
    }
}

impl GnpConfig {
    fn validate(&self) -> Result<(), AlgoError> {
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(AlgoError::InvalidConfig {
                reason: format!("edge probability {} is outside [0, 1]", self.probability),
            });
        }
        if self.start > self.end {
            return Err(CoreError::InvalidInterval {
                start: self.start,
                end: self.end,
            }
            .into());
        }
        Ok(())
    }
}

/// Samples the edge records of a temporal G(n, p) graph.
pub fn gnp_records(config: &GnpConfig) -> Result<Vec<EdgeRecord>, AlgoError> {
    config.validate()?;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut records = Vec::new();
    let n = config.nodes;

    for t in config.start..=config.end {
        for u in 0..n {
            // Undirected graphs sample each unordered pair once.
            let first = if config.directed { 0 } else { u + 1 };
            for v in first..n {
                if u == v {
                    continue;
                }
                if rng.gen_bool(config.probability) {
                    records.push(EdgeRecord {
                        node1: u.to_string(),
                        node2: v.to_string(),
                        start: t,
                        end: None,
                    });
                }
            }
        }
    }
    Ok(records)
}

/// Builds a temporal G(n, p) graph. Every node is present even if no edge
/// touches it.
pub fn random_gnp(config: &GnpConfig) -> Result<Graph, AlgoError> {
    let records = gnp_records(config)?;
    let kind = GraphKind {
        directed: config.directed,
        temporal: true,
    };
    let mut graph = Graph::new("random_gnp_network", kind);
    for u in 0..config.nodes {
        graph.add_node(u.to_string());
    }
    for record in records {
        graph.add_instant_edge(record.node1, record.node2, record.start)?;
    }
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        seed = config.seed,
        "generated random temporal graph"
    );
    Ok(graph)
}
