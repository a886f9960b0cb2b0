//! Expansion-state edits applied before the layout engine recomputes visible geometry.
//!
//! These functions only flip `expanded` flags and invalidate cached geometry; they never touch
//! the node/edge structure.

use crate::error::{Error, Result};
use crate::model::{ModelGraph, ROOT_SCOPE};

/// The only child of `id` if that child is a group.
fn single_child_group(graph: &ModelGraph, id: &str) -> Option<String> {
    let group = graph.group(id)?;
    match group.children_ids.as_slice() {
        [only] if graph.group(only).is_some() => Some(only.clone()),
        _ => None,
    }
}

fn require_group(graph: &ModelGraph, id: &str) -> Result<()> {
    match graph.node(id) {
        Some(n) if n.is_group() => Ok(()),
        Some(_) => Err(Error::NotAGroup { id: id.to_string() }),
        None => Err(Error::UnknownNode { id: id.to_string() }),
    }
}

fn clear_geometry<'a>(graph: &mut ModelGraph, ids: impl IntoIterator<Item = &'a String>) {
    for id in ids {
        if let Some(node) = graph.node_mut(id) {
            node.geometry_mut().clear();
        }
    }
}

fn set_expanded(graph: &mut ModelGraph, id: &str, expanded: bool) {
    if let Some(group) = graph.group_mut(id) {
        group.expanded = expanded;
        group.auto_expanded = false;
    }
}

/// Expands `group_id`.
///
/// Without `all`, a chain of single-child groups below it is expanded along with it (a lone
/// child group carries no information on its own) and the deepest group of that chain is
/// returned. Chain members opened this way are marked so that [`collapse_group`] can close
/// them again; members that were already expanded keep their state. With `all`, every
/// descendant group is expanded instead and `None` is returned. Geometry of everything that
/// must be re-measured is cleared either way.
pub fn expand_group(graph: &mut ModelGraph, group_id: &str, all: bool) -> Result<Option<String>> {
    require_group(graph, group_id)?;
    set_expanded(graph, group_id, true);

    if all {
        let mut ids = graph.subtree_ids(group_id);
        for id in &ids {
            set_expanded(graph, id, true);
        }
        ids.push(group_id.to_string());
        clear_geometry(graph, &ids);
        return Ok(None);
    }

    let mut chain: Vec<String> = vec![group_id.to_string()];
    let mut deepest = group_id.to_string();
    while let Some(child) = single_child_group(graph, &deepest) {
        if let Some(group) = graph.group_mut(&child) {
            if !group.expanded {
                group.expanded = true;
                group.auto_expanded = true;
            }
        }
        chain.push(child.clone());
        deepest = child;
    }
    let descendants = graph.subtree_ids(&deepest);
    clear_geometry(graph, chain.iter().chain(descendants.iter()));
    Ok(Some(deepest))
}

/// Collapses `group_id`, together with the single-child chain members that [`expand_group`]
/// opened on its behalf; chain members expanded on their own stay open. With `all`, every
/// descendant group is collapsed and loses its geometry and stored edge layout.
pub fn collapse_group(graph: &mut ModelGraph, group_id: &str, all: bool) -> Result<()> {
    require_group(graph, group_id)?;

    let mut collapsed: Vec<String> = vec![group_id.to_string()];
    if all {
        collapsed.extend(
            graph
                .subtree_ids(group_id)
                .into_iter()
                .filter(|id| graph.group(id).is_some()),
        );
        let descendants = graph.subtree_ids(group_id);
        clear_geometry(graph, &descendants);
    } else {
        let mut cur = group_id.to_string();
        while let Some(child) = single_child_group(graph, &cur) {
            if !graph
                .group(&child)
                .is_some_and(|g| g.expanded && g.auto_expanded)
            {
                break;
            }
            collapsed.push(child.clone());
            cur = child;
        }
    }

    for id in &collapsed {
        set_expanded(graph, id, false);
        graph.edges_by_group_node_ids.shift_remove(id);
    }
    clear_geometry(graph, &[group_id.to_string()]);
    Ok(())
}

pub fn expand_all(graph: &mut ModelGraph) {
    for group in graph.groups_mut() {
        group.expanded = true;
        group.auto_expanded = false;
    }
    for node in graph.nodes_mut() {
        node.geometry_mut().clear();
    }
}

/// Collapses every group and drops all stored edge layout except the root scope's.
pub fn collapse_all(graph: &mut ModelGraph) {
    for group in graph.groups_mut() {
        group.expanded = false;
        group.auto_expanded = false;
    }
    for node in graph.nodes_mut() {
        node.geometry_mut().clear();
    }
    graph
        .edges_by_group_node_ids
        .retain(|scope, _| scope == ROOT_SCOPE);
}

/// Expands `group_id` and all of its ancestors so that it becomes visible and open.
pub fn reveal_group(graph: &mut ModelGraph, group_id: &str) -> Result<()> {
    require_group(graph, group_id)?;
    let lineage: Vec<String> = graph
        .lineage(group_id)
        .into_iter()
        .map(str::to_string)
        .collect();
    for id in &lineage {
        set_expanded(graph, id, true);
    }
    clear_geometry(graph, &lineage);
    Ok(())
}
