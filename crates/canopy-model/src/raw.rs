//! Input graph as supplied by the graph source.

use crate::error::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// `/`-separated group path, read by the default namespace resolver.
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
}

impl RawNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Flat dependency graph: nodes plus adjacency maps keyed by node id.
///
/// `upstream[n]` lists the nodes `n` depends on (edges `u -> n`); `downstream[n]` lists the
/// nodes depending on `n` (edges `n -> d`). Either map may be partial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGraph {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub upstream: IndexMap<String, Vec<String>>,
    #[serde(default)]
    pub downstream: IndexMap<String, Vec<String>>,
}

impl RawGraph {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn push_node(&mut self, node: RawNode) -> &mut Self {
        self.nodes.push(node);
        self
    }

    /// Records `source -> target` in the upstream map of `target`.
    pub fn add_dependency(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> &mut Self {
        self.upstream
            .entry(target.into())
            .or_default()
            .push(source.into());
        self
    }
}
