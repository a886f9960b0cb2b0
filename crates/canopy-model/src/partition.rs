//! Large-group splitting.
//!
//! Namespace grouping alone can leave a scope with thousands of direct children. Every scope
//! whose child count exceeds the threshold is cut into artificial *sections* of at most
//! `threshold` children each. Children are ordered by a depth-first walk over the scope's
//! connectivity before cutting, so nodes that depend on each other tend to share a section.

use crate::config::MIN_CHILDREN_PER_GROUP;
use crate::connectivity::generate_layout_graph_edges;
use crate::model::{GROUP_ID_MARKER, GroupNode, ModelGraph, ModelNode, join_namespace};
use canopy_graphlib::{Graph, alg};
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use std::collections::VecDeque;

/// Splits every oversized scope, breadth-first from the root scope. Returns the number of
/// sections created; when non-zero, the layout connectivity is regenerated.
pub fn split_large_groups(graph: &mut ModelGraph, max_children_per_group: usize) -> usize {
    let threshold = max_children_per_group.max(MIN_CHILDREN_PER_GROUP);
    let mut created = 0;

    let mut queue: VecDeque<Option<String>> = VecDeque::from([None]);
    while let Some(scope) = queue.pop_front() {
        // A split can leave more than `threshold` sections behind; keep splitting the same
        // scope (sections of sections) until it fits.
        loop {
            let children = graph.scope_children(scope.as_deref());
            if children.len() <= threshold {
                break;
            }
            created += split_scope(graph, scope.as_deref(), &children, threshold);
        }

        for child in graph.scope_children(scope.as_deref()) {
            if graph.group(&child).is_some() {
                queue.push_back(Some(child));
            }
        }
    }

    if created > 0 {
        generate_layout_graph_edges(graph);
    }
    tracing::debug!(graph_id = %graph.id, threshold, sections = created, "split large groups");
    created
}

fn split_scope(
    graph: &mut ModelGraph,
    scope: Option<&str>,
    children: &[String],
    threshold: usize,
) -> usize {
    let order = section_order(graph, children);
    let buckets: Vec<&[String]> = order.chunks(threshold).collect();
    let count = buckets.len();

    let (scope_namespace, level) = match scope.and_then(|id| graph.group(id)) {
        Some(g) => (g.namespace.clone(), g.level + 1),
        None => (String::new(), 0),
    };

    let mut section_ids: Vec<String> = Vec::with_capacity(count);
    for (k, bucket) in buckets.iter().enumerate() {
        let label = format!("section_{}_of_{}", k + 1, count);
        let namespace = join_namespace(&scope_namespace, &label);
        let id = graph.unused_id(format!("{namespace}{GROUP_ID_MARKER}"), &HashSet::default());
        graph.insert_node(ModelNode::Group(GroupNode {
            id: id.clone(),
            label,
            namespace,
            level,
            parent_id: scope.map(str::to_string),
            children_ids: bucket.to_vec(),
            section_container: true,
            ..Default::default()
        }));
        graph.artificial_group_node_ids.push(id.clone());
        for member in bucket.iter() {
            if let Some(node) = graph.node_mut(member) {
                node.set_parent_id(Some(id.clone()));
            }
        }
        section_ids.push(id);
    }

    match scope.and_then(|id| graph.group_mut(id)) {
        Some(group) => group.children_ids = section_ids.clone(),
        None => graph.refresh_root_node_ids(),
    }

    for section in &section_ids {
        renamespace_subtree(graph, section);
    }

    tracing::trace!(
        scope = scope.unwrap_or(""),
        children = children.len(),
        sections = count,
        "split scope"
    );
    count
}

/// Orders `children` by a depth-first walk of the scope-local connectivity: sources first, then
/// whatever is left (cycles), each in child order.
fn section_order(graph: &ModelGraph, children: &[String]) -> Vec<String> {
    let mut owner: HashMap<String, usize> = HashMap::default();
    let mut members: Vec<(String, usize)> = Vec::new();
    for (ix, child) in children.iter().enumerate() {
        for asset in graph.layout_assets_under(child) {
            owner.insert(asset.clone(), ix);
            members.push((asset, ix));
        }
    }

    let mut scoped = Graph::new();
    for child in children {
        scoped.add_node(child.clone());
    }
    for (asset, from) in &members {
        let Some(node) = graph.asset(asset) else {
            continue;
        };
        for edge in &node.outgoing_edges {
            if let Some(&to) = owner.get(&edge.target_node_id) {
                if to != *from {
                    scoped.set_edge(children[*from].clone(), children[to].clone());
                }
            }
        }
    }

    alg::preorder_all(&scoped)
}

/// Recomputes namespaces and levels below `top`, regenerating ids of groups whose namespace
/// changed. Renames are collected first and applied in one pass.
fn renamespace_subtree(graph: &mut ModelGraph, top: &str) {
    let mut renames: HashMap<String, String> = HashMap::default();
    let mut claimed: HashSet<String> = HashSet::default();

    let mut stack: Vec<String> = vec![top.to_string()];
    while let Some(group_id) = stack.pop() {
        let Some(group) = graph.group(&group_id) else {
            continue;
        };
        let namespace = group.namespace.clone();
        let level = group.level;
        let children = group.children_ids.clone();

        for child in children {
            let Some(node) = graph.node_mut(&child) else {
                continue;
            };
            let child_namespace = join_namespace(&namespace, node.segment());
            node.set_level(level + 1);
            if node.namespace() == child_namespace {
                continue;
            }
            node.set_namespace(child_namespace.clone());

            let ModelNode::Group(child_group) = node else {
                continue;
            };
            let candidate = if child_group.section_container {
                format!("{child_namespace}{GROUP_ID_MARKER}")
            } else {
                child_namespace
            };
            stack.push(child.clone());
            if candidate != child {
                let new_id = unused_group_id(graph, candidate, &child, &claimed);
                claimed.insert(new_id.clone());
                renames.insert(child, new_id);
            }
        }
    }

    graph.apply_renames(&renames);
}

fn unused_group_id(
    graph: &ModelGraph,
    candidate: String,
    current: &str,
    claimed: &HashSet<String>,
) -> String {
    let mut id = candidate;
    while id != current && (graph.contains(&id) || claimed.contains(&id)) {
        id.push_str(GROUP_ID_MARKER);
    }
    id
}
