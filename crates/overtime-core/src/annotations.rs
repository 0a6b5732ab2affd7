//! Caller-owned side table for per-node metrics.
//!
//! Graph nodes carry only their label. Anything computed about a node
//! (reachability, foremost time, centrality, display coordinates) is stored
//! here instead, keyed by node label and then by metric name. The table is
//! independent of any graph, so one graph can be annotated by several
//! callers without contention.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Label -> metric name -> value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    entries: BTreeMap<String, BTreeMap<String, Value>>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` on `label`, returning the previous value.
    pub fn set(
        &mut self,
        label: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        self.entries
            .entry(label.into())
            .or_default()
            .insert(key.into(), value.into())
    }

    pub fn get(&self, label: &str, key: &str) -> Option<&Value> {
        self.entries.get(label).and_then(|m| m.get(key))
    }

    /// All metrics recorded for `label`.
    pub fn node(&self, label: &str) -> Option<&BTreeMap<String, Value>> {
        self.entries.get(label)
    }

    /// Removes one metric, returning it.
    pub fn remove(&mut self, label: &str, key: &str) -> Option<Value> {
        let metrics = self.entries.get_mut(label)?;
        let removed = metrics.remove(key);
        if metrics.is_empty() {
            self.entries.remove(label);
        }
        removed
    }

    /// Drops every metric of `label`, e.g. after the node left the graph.
    pub fn forget(&mut self, label: &str) {
        self.entries.remove(label);
    }

    /// Iterates `(label, value)` for every node that has `key`.
    pub fn metric<'a>(&'a self, key: &'a str) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        self.entries
            .iter()
            .filter_map(move |(label, m)| m.get(key).map(|v| (label.as_str(), v)))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
