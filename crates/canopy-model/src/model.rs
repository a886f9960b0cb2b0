//! Model graph types.
//!
//! A [`ModelGraph`] is a forest of [`GroupNode`]s with [`AssetNode`] leaves. Asset edges are
//! stored on both endpoints; the per-scope successor relation used by layout lives in
//! [`ModelGraph::layout_graph_edges`].

use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key of the root scope in scope-indexed maps.
pub const ROOT_SCOPE: &str = "";

/// Suffix of artificial group ids, also appended to any derived group id that collides with an
/// existing node id.
pub const GROUP_ID_MARKER: &str = "___group___";

/// `scope id -> source id -> successor ids`, restricted to the direct children of the scope.
pub type LayoutGraphEdges = IndexMap<String, IndexMap<String, IndexSet<String>>>;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Layout output attached to a node. Everything is optional: fields are filled by the layout
/// engine and cleared whenever an ancestor changes its expansion state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geometry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Top-left corner relative to the parent's content box.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_offset: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_position: Option<Point>,
}

impl Geometry {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_sized(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingEdge {
    pub source_node_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingEdge {
    pub target_node_id: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetNode {
    pub id: String,
    pub label: String,
    pub namespace: String,
    pub level: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub incoming_edges: Vec<IncomingEdge>,
    pub outgoing_edges: Vec<OutgoingEdge>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(flatten)]
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupNode {
    pub id: String,
    /// The namespace segment this group stands for.
    pub label: String,
    pub namespace: String,
    pub level: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub children_ids: Vec<String>,
    pub expanded: bool,
    /// Opened along with an ancestor's single-child chain rather than on its own; collapsing
    /// that ancestor closes it again.
    #[serde(skip)]
    pub auto_expanded: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub section_container: bool,
    pub descendants_node_ids: Vec<String>,
    pub descendants_asset_node_ids: Vec<String>,
    #[serde(flatten)]
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ModelNode {
    Asset(AssetNode),
    Group(GroupNode),
}

impl ModelNode {
    pub fn id(&self) -> &str {
        match self {
            ModelNode::Asset(n) => &n.id,
            ModelNode::Group(n) => &n.id,
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            ModelNode::Asset(n) => &n.namespace,
            ModelNode::Group(n) => &n.namespace,
        }
    }

    pub fn set_namespace(&mut self, namespace: String) {
        match self {
            ModelNode::Asset(n) => n.namespace = namespace,
            ModelNode::Group(n) => n.namespace = namespace,
        }
    }

    /// The trailing namespace segment contributed by this node itself.
    pub fn segment(&self) -> &str {
        match self {
            ModelNode::Asset(n) => &n.id,
            ModelNode::Group(n) => &n.label,
        }
    }

    pub fn level(&self) -> usize {
        match self {
            ModelNode::Asset(n) => n.level,
            ModelNode::Group(n) => n.level,
        }
    }

    pub fn set_level(&mut self, level: usize) {
        match self {
            ModelNode::Asset(n) => n.level = level,
            ModelNode::Group(n) => n.level = level,
        }
    }

    pub fn parent_id(&self) -> Option<&str> {
        match self {
            ModelNode::Asset(n) => n.parent_id.as_deref(),
            ModelNode::Group(n) => n.parent_id.as_deref(),
        }
    }

    pub fn set_parent_id(&mut self, parent_id: Option<String>) {
        match self {
            ModelNode::Asset(n) => n.parent_id = parent_id,
            ModelNode::Group(n) => n.parent_id = parent_id,
        }
    }

    pub fn geometry(&self) -> &Geometry {
        match self {
            ModelNode::Asset(n) => &n.geometry,
            ModelNode::Group(n) => &n.geometry,
        }
    }

    pub fn geometry_mut(&mut self) -> &mut Geometry {
        match self {
            ModelNode::Asset(n) => &mut n.geometry,
            ModelNode::Group(n) => &mut n.geometry,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, ModelNode::Group(_))
    }

    /// Hidden assets take no part in layout. Groups are never hidden.
    pub fn is_hidden(&self) -> bool {
        matches!(self, ModelNode::Asset(n) if n.hidden)
    }

    pub fn as_asset(&self) -> Option<&AssetNode> {
        match self {
            ModelNode::Asset(n) => Some(n),
            ModelNode::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            ModelNode::Group(n) => Some(n),
            ModelNode::Asset(_) => None,
        }
    }
}

/// An edge laid out inside one scope (the root scope or an expanded group).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelEdge {
    pub id: String,
    pub source_node_id: String,
    pub target_node_id: String,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DescendantCountRange {
    pub min: usize,
    pub max: usize,
}

impl DescendantCountRange {
    pub fn contains(&self, count: usize) -> bool {
        self.min <= count && count <= self.max
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelGraph {
    pub id: String,
    nodes: Vec<ModelNode>,
    #[serde(skip)]
    nodes_by_id: HashMap<String, usize>,
    pub root_node_ids: Vec<String>,
    pub artificial_group_node_ids: Vec<String>,
    pub edges_by_group_node_ids: IndexMap<String, Vec<ModelEdge>>,
    /// Min/max of `descendants_asset_node_ids.len()` over all groups; `None` without groups.
    pub descendant_asset_count_range: Option<DescendantCountRange>,
    pub layout_graph_edges: LayoutGraphEdges,
}

impl ModelGraph {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn nodes(&self) -> &[ModelNode] {
        &self.nodes
    }

    /// Mutable access to every node. Node ids must not be changed through this iterator; use
    /// [`ModelGraph::apply_renames`] so the id index stays consistent.
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut ModelNode> {
        self.nodes.iter_mut()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes_by_id.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&ModelNode> {
        self.nodes_by_id.get(id).map(|&ix| &self.nodes[ix])
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut ModelNode> {
        self.nodes_by_id
            .get(id)
            .copied()
            .map(move |ix| &mut self.nodes[ix])
    }

    pub fn asset(&self, id: &str) -> Option<&AssetNode> {
        self.node(id).and_then(ModelNode::as_asset)
    }

    pub fn asset_mut(&mut self, id: &str) -> Option<&mut AssetNode> {
        match self.node_mut(id) {
            Some(ModelNode::Asset(n)) => Some(n),
            _ => None,
        }
    }

    pub fn group(&self, id: &str) -> Option<&GroupNode> {
        self.node(id).and_then(ModelNode::as_group)
    }

    pub fn group_mut(&mut self, id: &str) -> Option<&mut GroupNode> {
        match self.node_mut(id) {
            Some(ModelNode::Group(n)) => Some(n),
            _ => None,
        }
    }

    pub fn groups(&self) -> impl Iterator<Item = &GroupNode> {
        self.nodes.iter().filter_map(ModelNode::as_group)
    }

    pub fn groups_mut(&mut self) -> impl Iterator<Item = &mut GroupNode> {
        self.nodes.iter_mut().filter_map(|n| match n {
            ModelNode::Group(g) => Some(g),
            ModelNode::Asset(_) => None,
        })
    }

    pub fn assets(&self) -> impl Iterator<Item = &AssetNode> {
        self.nodes.iter().filter_map(ModelNode::as_asset)
    }

    pub fn group_ids(&self) -> Vec<String> {
        self.groups().map(|g| g.id.clone()).collect()
    }

    /// Appends a node. Returns `false` (and leaves the graph untouched) if the id is taken.
    pub fn insert_node(&mut self, node: ModelNode) -> bool {
        if self.nodes_by_id.contains_key(node.id()) {
            return false;
        }
        let ix = self.nodes.len();
        self.nodes_by_id.insert(node.id().to_string(), ix);
        self.nodes.push(node);
        true
    }

    /// Returns `candidate`, or `candidate` with [`GROUP_ID_MARKER`] appended as many times as
    /// needed to avoid every existing id and every id in `reserved`.
    pub fn unused_id(&self, candidate: String, reserved: &HashSet<String>) -> String {
        let mut id = candidate;
        while self.contains(&id) || reserved.contains(&id) {
            id.push_str(GROUP_ID_MARKER);
        }
        id
    }

    /// Direct children of a scope (`None` is the root scope).
    pub fn scope_children(&self, scope: Option<&str>) -> Vec<String> {
        match scope {
            None => self.root_node_ids.clone(),
            Some(id) => self
                .group(id)
                .map(|g| g.children_ids.clone())
                .unwrap_or_default(),
        }
    }

    /// `id` followed by its ancestors, nearest first.
    pub fn lineage<'a>(&'a self, id: &'a str) -> Vec<&'a str> {
        let mut out: Vec<&str> = Vec::new();
        let mut cur = Some(id);
        while let Some(v) = cur {
            // A malformed parent cycle must not hang the caller.
            if out.len() > self.nodes.len() {
                break;
            }
            out.push(v);
            cur = self.node(v).and_then(ModelNode::parent_id);
        }
        out
    }

    /// A node is visible when every ancestor group is expanded.
    pub fn is_visible(&self, id: &str) -> bool {
        self.lineage(id)
            .iter()
            .skip(1)
            .all(|anc| self.group(anc).is_some_and(|g| g.expanded))
    }

    /// Every node below `id`, preorder, without `id` itself.
    pub fn subtree_ids(&self, id: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut stack: Vec<&str> = match self.group(id) {
            Some(g) => g.children_ids.iter().rev().map(String::as_str).collect(),
            None => return out,
        };
        while let Some(v) = stack.pop() {
            if out.len() > self.nodes.len() {
                break;
            }
            out.push(v.to_string());
            if let Some(g) = self.group(v) {
                stack.extend(g.children_ids.iter().rev().map(String::as_str));
            }
        }
        out
    }

    /// Visible non-hidden assets in the subtree rooted at `id` (including `id` itself).
    pub fn layout_assets_under(&self, id: &str) -> Vec<String> {
        match self.node(id) {
            Some(ModelNode::Asset(a)) if !a.hidden => vec![a.id.clone()],
            Some(ModelNode::Group(_)) => self
                .subtree_ids(id)
                .into_iter()
                .filter(|v| matches!(self.node(v), Some(ModelNode::Asset(a)) if !a.hidden))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Expanded groups that are visible and have no expanded child group.
    pub fn deepest_expanded_group_ids(&self) -> Vec<String> {
        self.groups()
            .filter(|g| g.expanded && self.is_visible(&g.id))
            .filter(|g| {
                !g.children_ids
                    .iter()
                    .any(|c| self.group(c).is_some_and(|child| child.expanded))
            })
            .map(|g| g.id.clone())
            .collect()
    }

    /// Rebuilds the root list as "every parentless node", keeping the relative order of roots
    /// that survive and appending new ones in node order.
    pub fn refresh_root_node_ids(&mut self) {
        let parentless: HashSet<&str> = self
            .nodes
            .iter()
            .filter(|n| n.parent_id().is_none())
            .map(ModelNode::id)
            .collect();
        let mut roots: Vec<String> = Vec::with_capacity(parentless.len());
        let mut seen: HashSet<String> = HashSet::default();
        for id in &self.root_node_ids {
            if parentless.contains(id.as_str()) && seen.insert(id.clone()) {
                roots.push(id.clone());
            }
        }
        for n in &self.nodes {
            if n.parent_id().is_none() && seen.insert(n.id().to_string()) {
                roots.push(n.id().to_string());
            }
        }
        self.root_node_ids = roots;
    }

    /// Applies an `old id -> new id` map to every place that references node ids.
    ///
    /// All references are rewritten in one pass; the id index is updated last so that a new
    /// id equal to some other node's old id cannot clobber a live entry.
    pub fn apply_renames(&mut self, renames: &HashMap<String, String>) {
        if renames.is_empty() {
            return;
        }
        let rename = |id: &mut String| {
            if let Some(new_id) = renames.get(id.as_str()) {
                *id = new_id.clone();
            }
        };

        for node in &mut self.nodes {
            match node {
                ModelNode::Asset(a) => {
                    if let Some(p) = a.parent_id.as_mut() {
                        rename(p);
                    }
                }
                ModelNode::Group(g) => {
                    rename(&mut g.id);
                    if let Some(p) = g.parent_id.as_mut() {
                        rename(p);
                    }
                    g.children_ids.iter_mut().for_each(rename);
                    g.descendants_node_ids.iter_mut().for_each(rename);
                }
            }
        }

        let mut moved: Vec<(String, usize)> = Vec::with_capacity(renames.len());
        for (old, new) in renames {
            if let Some(ix) = self.nodes_by_id.remove(old) {
                moved.push((new.clone(), ix));
            }
        }
        self.nodes_by_id.extend(moved);

        self.root_node_ids.iter_mut().for_each(rename);
        self.artificial_group_node_ids.iter_mut().for_each(rename);
        self.edges_by_group_node_ids = std::mem::take(&mut self.edges_by_group_node_ids)
            .into_iter()
            .map(|(mut k, v)| {
                rename(&mut k);
                (k, v)
            })
            .collect();
        self.layout_graph_edges = std::mem::take(&mut self.layout_graph_edges)
            .into_iter()
            .map(|(mut scope, succ)| {
                rename(&mut scope);
                let succ = succ
                    .into_iter()
                    .map(|(mut from, tos)| {
                        rename(&mut from);
                        let tos = tos
                            .into_iter()
                            .map(|mut to| {
                                rename(&mut to);
                                to
                            })
                            .collect();
                        (from, tos)
                    })
                    .collect();
                (scope, succ)
            })
            .collect();
    }
}

/// Joins a parent namespace and a segment with `/`.
pub fn join_namespace(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{parent}/{segment}")
    }
}
