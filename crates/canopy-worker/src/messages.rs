//! Controller <-> worker messages, tagged by `eventType`.

use canopy_model::{ModelGraph, RawGraph, StructuralDefect};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType", rename_all = "camelCase")]
pub enum WorkerRequest {
    #[serde(rename_all = "camelCase")]
    ProcessGraph {
        graph_id: String,
        session_id: String,
        raw_graph: RawGraph,
        #[serde(default)]
        initial_layout: bool,
    },
    ExpandGroup(ExpansionRequest),
    CollapseGroup(ExpansionRequest),
    Relayout(RelayoutRequest),
    Cleanup,
    /// Any other event type. Ignored by the router.
    #[serde(other)]
    Unknown,
}

impl WorkerRequest {
    pub fn event_type(&self) -> &'static str {
        match self {
            WorkerRequest::ProcessGraph { .. } => "processGraph",
            WorkerRequest::ExpandGroup(_) => "expandGroup",
            WorkerRequest::CollapseGroup(_) => "collapseGroup",
            WorkerRequest::Relayout(_) => "relayout",
            WorkerRequest::Cleanup => "cleanup",
            WorkerRequest::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionRequest {
    pub model_graph_id: String,
    pub session_id: String,
    /// `None` applies the operation to every group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_node_id: Option<String>,
    #[serde(default)]
    pub all: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayoutRequest {
    pub model_graph_id: String,
    pub session_id: String,
    #[serde(default)]
    pub target_deepest_group_node_ids_to_expand: Vec<String>,
    #[serde(default)]
    pub clear_all_expand_states: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_node_id: Option<String>,
    #[serde(default)]
    pub for_restoring_ui_state: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect_to_zoom_fit: Option<Rect>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "eventType", rename_all = "camelCase")]
pub enum WorkerResponse {
    #[serde(rename_all = "camelCase")]
    ProcessGraphResp {
        model_graph: ModelGraph,
        graph_id: String,
        session_id: String,
    },
    ExpandGroupResp(ExpansionResponse),
    CollapseGroupResp(ExpansionResponse),
    RelayoutResp(RelayoutResponse),
    ProgressUpdate(ProgressUpdate),
}

impl WorkerResponse {
    pub fn model_graph(&self) -> Option<&ModelGraph> {
        match self {
            WorkerResponse::ProcessGraphResp { model_graph, .. } => Some(model_graph),
            WorkerResponse::ExpandGroupResp(r) | WorkerResponse::CollapseGroupResp(r) => {
                Some(&r.model_graph)
            }
            WorkerResponse::RelayoutResp(r) => Some(&r.model_graph),
            WorkerResponse::ProgressUpdate(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionResponse {
    pub model_graph: ModelGraph,
    pub expanded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_node_id: Option<String>,
    pub session_id: String,
    pub deepest_expanded_group_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayoutResponse {
    pub model_graph: ModelGraph,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_node_id: Option<String>,
    pub session_id: String,
    pub for_restoring_ui_state: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rect_to_zoom_fit: Option<Rect>,
    pub target_deepest_group_node_ids_to_expand: Vec<String>,
    pub deepest_expanded_group_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressLabel {
    #[serde(rename = "nodes and edges")]
    NodesAndEdges,
    #[serde(rename = "layout data")]
    LayoutData,
    #[serde(rename = "splitting large layers")]
    SplittingLargeLayers,
    #[serde(rename = "laying out root layer")]
    LayingOutRootLayer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub graph_id: String,
    pub session_id: String,
    pub label: ProgressLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub defects: Vec<StructuralDefect>,
}
