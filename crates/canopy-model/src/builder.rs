//! Raw graph -> initial model graph.
//!
//! The builder is total: malformed input (dangling edge references, duplicate or empty ids)
//! never fails the build. Dangling references are dropped; id defects are reported separately
//! by [`crate::validate::find_structural_defects`].

use crate::config::ProcessingConfig;
use crate::model::{
    AssetNode, GroupNode, IncomingEdge, ModelGraph, ModelNode, OutgoingEdge, join_namespace,
};
use crate::raw::{RawGraph, RawNode};
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

/// Derives the group path (`/`-separated, empty for "no group") of an input node.
pub trait NamespaceResolver {
    fn group_path(&self, node: &RawNode) -> String;
}

/// Uses the node's own `namespace` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeNamespace;

impl NamespaceResolver for NodeNamespace {
    fn group_path(&self, node: &RawNode) -> String {
        node.namespace.clone()
    }
}

impl<F> NamespaceResolver for F
where
    F: Fn(&RawNode) -> String,
{
    fn group_path(&self, node: &RawNode) -> String {
        self(node)
    }
}

pub fn build_model_graph(
    raw: &RawGraph,
    resolver: &dyn NamespaceResolver,
    config: &ProcessingConfig,
) -> ModelGraph {
    let mut graph = ModelGraph::new(raw.id.clone());
    add_nodes(&mut graph, raw, resolver, config);
    let edge_count = add_edges(&mut graph, raw);
    tracing::debug!(
        graph_id = %graph.id,
        nodes = graph.node_count(),
        roots = graph.root_node_ids.len(),
        edges = edge_count,
        "built model graph"
    );
    graph
}

fn add_nodes(
    graph: &mut ModelGraph,
    raw: &RawGraph,
    resolver: &dyn NamespaceResolver,
    config: &ProcessingConfig,
) {
    // Group ids must not shadow asset ids, including assets that come later in the input.
    let asset_ids: HashSet<String> = raw.nodes.iter().map(|n| n.id.clone()).collect();
    let paths: Vec<String> = raw
        .nodes
        .iter()
        .map(|n| {
            if config.group_by_namespace {
                resolver.group_path(n)
            } else {
                String::new()
            }
        })
        .collect();
    // Only visible nodes create groups; hidden nodes join the deepest of those on their path.
    let mut visible_paths: HashSet<String> = HashSet::default();
    let mut first_seen: HashSet<&str> = HashSet::default();
    for (raw_node, path) in raw.nodes.iter().zip(&paths) {
        if !first_seen.insert(raw_node.id.as_str()) || raw_node.hidden {
            continue;
        }
        let mut namespace = String::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            namespace = join_namespace(&namespace, segment);
            visible_paths.insert(namespace.clone());
        }
    }
    let mut group_by_path: HashMap<String, String> = HashMap::default();

    for (raw_node, path) in raw.nodes.iter().zip(&paths) {
        if graph.contains(&raw_node.id) {
            tracing::debug!(id = %raw_node.id, "skipping duplicate input node");
            continue;
        }

        let mut parent: Option<(String, String, usize)> = None;
        for (depth, segment) in path.split('/').filter(|s| !s.is_empty()).enumerate() {
            let namespace = join_namespace(
                parent.as_ref().map(|(_, ns, _)| ns.as_str()).unwrap_or(""),
                segment,
            );
            if !visible_paths.contains(&namespace) {
                break;
            }
            let group_id = match group_by_path.get(&namespace) {
                Some(id) => id.clone(),
                None => {
                    let id = graph.unused_id(namespace.clone(), &asset_ids);
                    add_group(graph, &id, segment, &namespace, depth, parent.as_ref());
                    group_by_path.insert(namespace.clone(), id.clone());
                    id
                }
            };
            parent = Some((group_id, namespace, depth));
        }

        let (namespace, level, parent_id) = match &parent {
            Some((id, ns, depth)) => (join_namespace(ns, &raw_node.id), depth + 1, Some(id.clone())),
            None => (raw_node.id.clone(), 0, None),
        };
        let asset = AssetNode {
            id: raw_node.id.clone(),
            label: raw_node
                .label
                .clone()
                .unwrap_or_else(|| raw_node.id.clone()),
            namespace,
            level,
            parent_id: parent_id.clone(),
            hidden: raw_node.hidden,
            attrs: raw_node.attrs.clone(),
            ..Default::default()
        };
        graph.insert_node(ModelNode::Asset(asset));
        attach(graph, &raw_node.id, parent_id.as_deref());
    }
}

fn add_group(
    graph: &mut ModelGraph,
    id: &str,
    label: &str,
    namespace: &str,
    level: usize,
    parent: Option<&(String, String, usize)>,
) {
    let parent_id = parent.map(|(pid, _, _)| pid.clone());
    graph.insert_node(ModelNode::Group(GroupNode {
        id: id.to_string(),
        label: label.to_string(),
        namespace: namespace.to_string(),
        level,
        parent_id: parent_id.clone(),
        ..Default::default()
    }));
    attach(graph, id, parent_id.as_deref());
}

fn attach(graph: &mut ModelGraph, id: &str, parent_id: Option<&str>) {
    match parent_id.and_then(|p| graph.group_mut(p)) {
        Some(parent) => parent.children_ids.push(id.to_string()),
        None => graph.root_node_ids.push(id.to_string()),
    }
}

fn add_edges(graph: &mut ModelGraph, raw: &RawGraph) -> usize {
    let mut count = 0;
    for (target, sources) in &raw.upstream {
        for source in sources {
            count += usize::from(connect(graph, source, target));
        }
    }
    for (source, targets) in &raw.downstream {
        for target in targets {
            count += usize::from(connect(graph, source, target));
        }
    }
    count
}

/// Writes `source -> target` on both endpoints. Returns `false` for dangling references and
/// for edges that already exist.
fn connect(graph: &mut ModelGraph, source: &str, target: &str) -> bool {
    if graph.asset(source).is_none() {
        return false;
    }
    let Some(target_node) = graph.asset_mut(target) else {
        return false;
    };
    if target_node
        .incoming_edges
        .iter()
        .any(|e| e.source_node_id == source)
    {
        return false;
    }
    target_node.incoming_edges.push(IncomingEdge {
        source_node_id: source.to_string(),
    });
    if let Some(source_node) = graph.asset_mut(source) {
        source_node.outgoing_edges.push(OutgoingEdge {
            target_node_id: target.to_string(),
        });
    }
    true
}
