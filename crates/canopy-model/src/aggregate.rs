//! Descendant sets and graph-wide descendant statistics.

use crate::model::{DescendantCountRange, ModelGraph, ModelNode};

/// Fills `descendants_node_ids` / `descendants_asset_node_ids` on every group and
/// [`ModelGraph::descendant_asset_count_range`].
///
/// Hidden assets are not descendants. A graph without groups ends up with no range.
pub fn populate_descendants(graph: &mut ModelGraph) {
    let mut range: Option<DescendantCountRange> = None;

    for group_id in graph.group_ids() {
        let mut node_ids: Vec<String> = Vec::new();
        let mut asset_ids: Vec<String> = Vec::new();
        for id in graph.subtree_ids(&group_id) {
            match graph.node(&id) {
                Some(ModelNode::Group(_)) => node_ids.push(id),
                Some(ModelNode::Asset(a)) if !a.hidden => {
                    asset_ids.push(id.clone());
                    node_ids.push(id);
                }
                _ => {}
            }
        }

        let count = asset_ids.len();
        range = Some(match range {
            Some(r) => DescendantCountRange {
                min: r.min.min(count),
                max: r.max.max(count),
            },
            None => DescendantCountRange {
                min: count,
                max: count,
            },
        });

        if let Some(group) = graph.group_mut(&group_id) {
            group.descendants_node_ids = node_ids;
            group.descendants_asset_node_ids = asset_ids;
        }
    }

    graph.descendant_asset_count_range = range;
    tracing::debug!(graph_id = %graph.id, range = ?range, "aggregated descendants");
}
