//! Input defect detection and structural self-checks.

use crate::error::{Error, Result};
use crate::model::{ModelGraph, ModelNode};
use crate::raw::RawGraph;
use rustc_hash::FxHashSet as HashSet;
use serde::Serialize;

/// Input problems that do not stop the builder but make the resulting graph unfit for an
/// initial layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StructuralDefect {
    #[error("node #{index} has an empty id")]
    EmptyNodeId { index: usize },

    #[error("node id `{id}` appears more than once")]
    DuplicateNodeId { id: String },
}

pub fn find_structural_defects(raw: &RawGraph) -> Vec<StructuralDefect> {
    let mut defects = Vec::new();
    let mut seen: HashSet<&str> = HashSet::default();
    let mut reported: HashSet<&str> = HashSet::default();
    for (index, node) in raw.nodes.iter().enumerate() {
        if node.id.is_empty() {
            defects.push(StructuralDefect::EmptyNodeId { index });
            continue;
        }
        if !seen.insert(node.id.as_str()) && reported.insert(node.id.as_str()) {
            defects.push(StructuralDefect::DuplicateNodeId {
                id: node.id.clone(),
            });
        }
    }
    defects
}

fn violated(message: impl Into<String>) -> Error {
    Error::Invariant {
        message: message.into(),
    }
}

/// Checks the structural invariants every pipeline phase must preserve: unique ids reachable
/// through the index, consistent parent/child links, a root list of exactly the parentless
/// nodes, symmetric asset edges and well-formed artificial sections.
pub fn check_invariants(graph: &ModelGraph) -> Result<()> {
    let mut ids: HashSet<&str> = HashSet::default();
    for node in graph.nodes() {
        let id = node.id();
        if !ids.insert(id) {
            return Err(violated(format!("duplicate node id `{id}`")));
        }
        if graph.node(id).map(ModelNode::id) != Some(id) {
            return Err(violated(format!("id index does not resolve `{id}`")));
        }
    }

    for node in graph.nodes() {
        if let Some(parent) = node.parent_id() {
            let Some(group) = graph.group(parent) else {
                return Err(violated(format!(
                    "`{}` has parent `{parent}` which is not a group",
                    node.id()
                )));
            };
            if !group.children_ids.iter().any(|c| c == node.id()) {
                return Err(violated(format!(
                    "`{parent}` does not list its child `{}`",
                    node.id()
                )));
            }
        }
    }

    for group in graph.groups() {
        for child in &group.children_ids {
            match graph.node(child) {
                Some(n) if n.parent_id() == Some(group.id.as_str()) => {}
                Some(_) => {
                    return Err(violated(format!(
                        "child `{child}` of `{}` points at another parent",
                        group.id
                    )));
                }
                None => {
                    return Err(violated(format!(
                        "`{}` lists unknown child `{child}`",
                        group.id
                    )));
                }
            }
        }
    }

    let mut roots: HashSet<&str> = HashSet::default();
    for root in &graph.root_node_ids {
        if !roots.insert(root.as_str()) {
            return Err(violated(format!("root `{root}` listed twice")));
        }
        if graph.node(root).is_none_or(|n| n.parent_id().is_some()) {
            return Err(violated(format!("root `{root}` is unknown or has a parent")));
        }
    }
    let parentless = graph
        .nodes()
        .iter()
        .filter(|n| n.parent_id().is_none())
        .count();
    if parentless != roots.len() {
        return Err(violated(format!(
            "{parentless} parentless nodes but {} roots",
            roots.len()
        )));
    }

    for asset in graph.assets() {
        for edge in &asset.outgoing_edges {
            let mirrored = graph.asset(&edge.target_node_id).is_some_and(|t| {
                t.incoming_edges
                    .iter()
                    .any(|e| e.source_node_id == asset.id)
            });
            if !mirrored {
                return Err(violated(format!(
                    "edge `{}` -> `{}` is not mirrored on the target",
                    asset.id, edge.target_node_id
                )));
            }
        }
        for edge in &asset.incoming_edges {
            let mirrored = graph.asset(&edge.source_node_id).is_some_and(|s| {
                s.outgoing_edges
                    .iter()
                    .any(|e| e.target_node_id == asset.id)
            });
            if !mirrored {
                return Err(violated(format!(
                    "edge `{}` -> `{}` is not mirrored on the source",
                    edge.source_node_id, asset.id
                )));
            }
        }
    }

    for id in &graph.artificial_group_node_ids {
        if !graph.group(id).is_some_and(|g| g.section_container) {
            return Err(violated(format!(
                "artificial id `{id}` is not a section group"
            )));
        }
    }

    Ok(())
}
