//! Per-scope successor relation consumed by the layout engine.

use crate::model::{LayoutGraphEdges, ModelGraph, ROOT_SCOPE};
use rustc_hash::FxHashSet as HashSet;
use std::collections::VecDeque;

/// Recomputes [`ModelGraph::layout_graph_edges`].
///
/// Traversal starts at every visible asset without a visible predecessor and follows outgoing
/// edges breadth-first. Each edge is recorded in the scope of the lowest common ancestor of its
/// endpoints, between the two direct children of that scope that contain them. Assets only
/// reachable through a cycle are not visited.
pub fn generate_layout_graph_edges(graph: &mut ModelGraph) {
    let mut edges = LayoutGraphEdges::new();

    let roots: Vec<String> = graph
        .assets()
        .filter(|a| !a.hidden)
        .filter(|a| {
            !a.incoming_edges
                .iter()
                .any(|e| graph.asset(&e.source_node_id).is_some_and(|s| !s.hidden))
        })
        .map(|a| a.id.clone())
        .collect();

    let mut seen: HashSet<String> = HashSet::default();
    let mut queue: VecDeque<String> = VecDeque::new();
    for root in roots {
        if seen.insert(root.clone()) {
            queue.push_back(root);
        }
    }

    while let Some(source) = queue.pop_front() {
        let Some(asset) = graph.asset(&source) else {
            continue;
        };
        for edge in &asset.outgoing_edges {
            let target = edge.target_node_id.as_str();
            if !graph.asset(target).is_some_and(|t| !t.hidden) {
                continue;
            }
            if let Some((scope, from, to)) = scoped_endpoints(graph, &source, target) {
                edges
                    .entry(scope)
                    .or_default()
                    .entry(from)
                    .or_default()
                    .insert(to);
            }
            if seen.insert(target.to_string()) {
                queue.push_back(target.to_string());
            }
        }
    }

    tracing::debug!(
        graph_id = %graph.id,
        scopes = edges.len(),
        visited = seen.len(),
        "generated layout connectivity"
    );
    graph.layout_graph_edges = edges;
}

/// Scope of the lowest common ancestor of `u` and `v`, plus the children of that scope that
/// contain each endpoint. `None` when both endpoints fall into the same child.
fn scoped_endpoints(graph: &ModelGraph, u: &str, v: &str) -> Option<(String, String, String)> {
    let chain_u = graph.lineage(u);
    let chain_v = graph.lineage(v);
    let ancestors_v: HashSet<&str> = chain_v.iter().skip(1).copied().collect();

    let (scope, from, to) = match chain_u
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, anc)| ancestors_v.contains(**anc))
    {
        Some((i, &scope)) => {
            let j = chain_v.iter().position(|&a| a == scope)?;
            (scope, chain_u[i - 1], chain_v[j - 1])
        }
        None => (ROOT_SCOPE, *chain_u.last()?, *chain_v.last()?),
    };

    if from == to {
        return None;
    }
    Some((scope.to_string(), from.to_string(), to.to_string()))
}
