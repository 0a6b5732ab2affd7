//! Graph nodes.
//!
//! A [`Node`] is identified by its label and carries nothing else; metrics
//! that callers want to attach live in [`crate::annotations::Annotations`],
//! keyed by the same label.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A node of a static or temporal graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Node {
    label: String,
}

impl Node {
    pub fn new(label: impl Into<String>) -> Self {
        Node {
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}
