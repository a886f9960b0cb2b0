//! Rank-based layout of the visible part of a model graph.
//!
//! Every scope (the root scope or an expanded group) is laid out on its own: children are
//! ranked by longest path over the scope's layout connectivity and placed row by row, each row
//! centered on the widest one. Expanded child groups are laid out first so their size is known.
//! Offsets are local to the parent's content box; global positions are derived afterwards in a
//! single top-down pass.

use crate::LayoutEngine;
use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::rank::longest_path_ranks;
use canopy_graphlib::Graph;
use canopy_model::{ModelEdge, ModelGraph, ModelNode, Point, ROOT_SCOPE};
use rustc_hash::FxHashMap as HashMap;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct LayeredLayout {
    config: LayoutConfig,
}

impl LayeredLayout {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lays out the visible children of `scope` and returns the size of its content box.
    fn layout_scope(&self, graph: &mut ModelGraph, scope: Option<&str>) -> (f64, f64) {
        let cfg = &self.config;
        let scope_key = scope.unwrap_or(ROOT_SCOPE);
        let children: Vec<String> = graph
            .scope_children(scope)
            .into_iter()
            .filter(|id| graph.node(id).is_some_and(|n| !n.is_hidden()))
            .collect();

        let mut sizes: Vec<(f64, f64)> = Vec::with_capacity(children.len());
        for child in &children {
            let size = match graph.group(child).map(|g| g.expanded) {
                Some(true) => {
                    let (w, h) = self.layout_scope(graph, Some(child));
                    (
                        (w + 2.0 * cfg.group_padding).max(cfg.group_width),
                        (h + 2.0 * cfg.group_padding + cfg.group_header).max(cfg.group_height),
                    )
                }
                Some(false) => (cfg.group_width, cfg.group_height),
                None => (cfg.node_width, cfg.node_height),
            };
            sizes.push(size);
        }

        let index: HashMap<&str, usize> = children
            .iter()
            .enumerate()
            .map(|(ix, id)| (id.as_str(), ix))
            .collect();
        let mut sub = Graph::new();
        for child in &children {
            sub.add_node(child.clone());
        }
        let mut edges: Vec<(usize, usize)> = Vec::new();
        if let Some(succ) = graph.layout_graph_edges.get(scope_key) {
            for (from, tos) in succ {
                let Some(&u) = index.get(from.as_str()) else {
                    continue;
                };
                for to in tos {
                    if let Some(&v) = index.get(to.as_str()) {
                        if u != v {
                            sub.set_edge(from.clone(), to.clone());
                            edges.push((u, v));
                        }
                    }
                }
            }
        }

        let ranks = longest_path_ranks(&sub);
        let mut rows: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (ix, child) in children.iter().enumerate() {
            let rank = ranks.get(child).copied().unwrap_or(0);
            rows.entry(rank).or_default().push(ix);
        }

        let row_width = |row: &[usize]| -> f64 {
            let widths: f64 = row.iter().map(|&ix| sizes[ix].0).sum();
            widths + cfg.node_sep * row.len().saturating_sub(1) as f64
        };
        let content_width = rows
            .values()
            .map(|row| row_width(row))
            .fold(0.0_f64, f64::max);

        let mut offsets: Vec<Point> = vec![Point::default(); children.len()];
        let mut y = 0.0;
        for row in rows.values() {
            let row_height = row.iter().map(|&ix| sizes[ix].1).fold(0.0_f64, f64::max);
            let mut x = (content_width - row_width(row)) / 2.0;
            for &ix in row {
                let (w, h) = sizes[ix];
                offsets[ix] = Point {
                    x,
                    y: y + (row_height - h) / 2.0,
                };
                x += w + cfg.node_sep;
            }
            y += row_height + cfg.rank_sep;
        }
        let content_height = if rows.is_empty() { 0.0 } else { y - cfg.rank_sep };

        for (ix, child) in children.iter().enumerate() {
            if let Some(node) = graph.node_mut(child) {
                let geometry = node.geometry_mut();
                geometry.width = Some(sizes[ix].0);
                geometry.height = Some(sizes[ix].1);
                geometry.local_offset = Some(offsets[ix]);
            }
        }

        let scope_edges: Vec<ModelEdge> = edges
            .into_iter()
            .map(|(u, v)| {
                let (from, to) = (&offsets[u], &offsets[v]);
                ModelEdge {
                    id: format!("{}--{}", children[u], children[v]),
                    source_node_id: children[u].clone(),
                    target_node_id: children[v].clone(),
                    points: vec![
                        Point {
                            x: from.x + sizes[u].0 / 2.0,
                            y: from.y + sizes[u].1,
                        },
                        Point {
                            x: to.x + sizes[v].0 / 2.0,
                            y: to.y,
                        },
                    ],
                }
            })
            .collect();
        graph
            .edges_by_group_node_ids
            .insert(scope_key.to_string(), scope_edges);

        tracing::trace!(
            scope = scope_key,
            children = children.len(),
            ranks = rows.len(),
            "laid out scope"
        );
        (content_width, content_height)
    }

    fn assign_global_positions(&self, graph: &mut ModelGraph) {
        let inset = Point {
            x: self.config.group_padding,
            y: self.config.group_header + self.config.group_padding,
        };
        let mut stack: Vec<(String, Point)> = graph
            .root_node_ids
            .iter()
            .rev()
            .map(|id| (id.clone(), Point::default()))
            .collect();
        while let Some((id, origin)) = stack.pop() {
            let Some(node) = graph.node_mut(&id) else {
                continue;
            };
            let Some(local) = node.geometry().local_offset else {
                continue;
            };
            let global = Point {
                x: origin.x + local.x,
                y: origin.y + local.y,
            };
            node.geometry_mut().global_position = Some(global);
            if let ModelNode::Group(group) = node {
                if group.expanded {
                    let content = Point {
                        x: global.x + inset.x,
                        y: global.y + inset.y,
                    };
                    stack.extend(
                        group
                            .children_ids
                            .iter()
                            .rev()
                            .map(|child| (child.clone(), content)),
                    );
                }
            }
        }
    }
}

impl LayoutEngine for LayeredLayout {
    fn layout(&self, graph: &mut ModelGraph, scope: Option<&str>) -> Result<()> {
        self.config.validate()?;
        match scope {
            None => {
                let (width, height) = self.layout_scope(graph, None);
                tracing::debug!(graph_id = %graph.id, width, height, "laid out root scope");
            }
            Some(id) => {
                match graph.group(id) {
                    Some(group) if group.expanded => {}
                    Some(_) => return Err(Error::CollapsedScope { id: id.to_string() }),
                    None => return Err(Error::UnknownScope { id: id.to_string() }),
                }
                let (width, height) = self.layout_scope(graph, Some(id));
                let cfg = &self.config;
                if let Some(node) = graph.node_mut(id) {
                    let geometry = node.geometry_mut();
                    geometry.width = Some((width + 2.0 * cfg.group_padding).max(cfg.group_width));
                    geometry.height = Some(
                        (height + 2.0 * cfg.group_padding + cfg.group_header)
                            .max(cfg.group_height),
                    );
                }
                tracing::debug!(graph_id = %graph.id, scope = id, width, height, "laid out group");
            }
        }
        self.assign_global_positions(graph);
        Ok(())
    }
}
