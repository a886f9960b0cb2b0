//! Request dispatch over the session store.

use crate::config::WorkerConfig;
use crate::error::{Error, Result};
use crate::messages::{
    ExpansionRequest, ExpansionResponse, ProgressLabel, ProgressUpdate, RelayoutRequest,
    RelayoutResponse, WorkerRequest, WorkerResponse,
};
use crate::store::{SessionKey, SessionStore};
use canopy_layout::{ExpansionEngine, LayeredLayout, LayoutEngine, RelayoutOptions, Relayouter};
use canopy_model::{
    ModelGraph, NamespaceResolver, NodeNamespace, ProcessingConfig, RawGraph, StructuralDefect,
    build_model_graph, find_structural_defects, generate_layout_graph_edges,
    populate_descendants, split_large_groups,
};

/// Owns the session store and the layout collaborators; handles one request at a time.
pub struct Router<L = LayeredLayout> {
    processing: ProcessingConfig,
    resolver: Box<dyn NamespaceResolver + Send + Sync>,
    engine: Relayouter<L>,
    store: SessionStore,
}

impl Router<LayeredLayout> {
    pub fn new(config: WorkerConfig) -> Result<Self> {
        config.validate()?;
        Self::with_engine(config.processing, LayeredLayout::new(config.layout))
    }
}

impl<L: LayoutEngine> Router<L> {
    /// Router over a caller-supplied layout engine. The processing config is validated here;
    /// the engine is responsible for its own configuration.
    pub fn with_engine(processing: ProcessingConfig, layout: L) -> Result<Self> {
        processing.validate()?;
        Ok(Self {
            processing,
            resolver: Box::new(NodeNamespace),
            engine: Relayouter::new(layout),
            store: SessionStore::new(),
        })
    }

    pub fn with_resolver(
        mut self,
        resolver: impl NamespaceResolver + Send + Sync + 'static,
    ) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Handles one request, passing progress notifications and the response to `emit`.
    ///
    /// An `Err` means the request was rejected (unknown session or group) and nothing was
    /// emitted or mutated. Layout failures are not errors: they are reported on the progress
    /// channel or logged, and the response is still emitted.
    pub fn handle(
        &mut self,
        request: WorkerRequest,
        mut emit: impl FnMut(WorkerResponse),
    ) -> Result<()> {
        match request {
            WorkerRequest::ProcessGraph {
                graph_id,
                session_id,
                raw_graph,
                initial_layout,
            } => {
                self.process_graph(graph_id, session_id, &raw_graph, initial_layout, &mut emit);
                Ok(())
            }
            WorkerRequest::ExpandGroup(req) => self.change_expansion(req, true, &mut emit),
            WorkerRequest::CollapseGroup(req) => self.change_expansion(req, false, &mut emit),
            WorkerRequest::Relayout(req) => self.relayout(req, &mut emit),
            WorkerRequest::Cleanup => {
                tracing::debug!(graphs = self.store.len(), "clearing session store");
                self.store.clear();
                Ok(())
            }
            WorkerRequest::Unknown => {
                tracing::debug!("ignoring request with unknown event type");
                Ok(())
            }
        }
    }

    fn process_graph(
        &mut self,
        graph_id: String,
        session_id: String,
        raw: &RawGraph,
        initial_layout: bool,
        emit: &mut impl FnMut(WorkerResponse),
    ) {
        let progress =
            |label: ProgressLabel, error: Option<String>, defects: Vec<StructuralDefect>| {
                WorkerResponse::ProgressUpdate(ProgressUpdate {
                    graph_id: graph_id.clone(),
                    session_id: session_id.clone(),
                    label,
                    error,
                    defects,
                })
            };

        let defects = find_structural_defects(raw);
        for defect in &defects {
            tracing::warn!(graph_id = %graph_id, %defect, "structural defect in input graph");
        }
        let defect_count = defects.len();

        let mut graph = build_model_graph(raw, self.resolver.as_ref(), &self.processing);
        graph.id = graph_id.clone();
        emit(progress(ProgressLabel::NodesAndEdges, None, defects));

        generate_layout_graph_edges(&mut graph);
        emit(progress(ProgressLabel::LayoutData, None, Vec::new()));

        split_large_groups(&mut graph, self.processing.max_children_per_group);
        populate_descendants(&mut graph);
        emit(progress(ProgressLabel::SplittingLargeLayers, None, Vec::new()));

        if initial_layout {
            let error = if defect_count > 0 {
                Some(format!(
                    "initial layout skipped: input graph has {defect_count} structural defect(s)"
                ))
            } else {
                match self.engine.engine().layout(&mut graph, None) {
                    Ok(()) => None,
                    Err(err) => {
                        tracing::warn!(graph_id = %graph_id, error = %err, "initial layout failed");
                        Some(err.to_string())
                    }
                }
            };
            emit(progress(ProgressLabel::LayingOutRootLayer, error, Vec::new()));
        }

        tracing::debug!(
            graph_id = %graph_id,
            session_id = %session_id,
            nodes = graph.node_count(),
            sections = graph.artificial_group_node_ids.len(),
            "processed graph"
        );
        let key = SessionKey::new(graph_id.clone(), session_id.clone());
        self.store.insert(key, graph.clone());
        emit(WorkerResponse::ProcessGraphResp {
            model_graph: graph,
            graph_id,
            session_id,
        });
    }

    fn change_expansion(
        &mut self,
        req: ExpansionRequest,
        expand: bool,
        emit: &mut impl FnMut(WorkerResponse),
    ) -> Result<()> {
        let graph = lookup(&mut self.store, &req.model_graph_id, &req.session_id)?;
        if let Some(id) = req.group_node_id.as_deref() {
            if graph.group(id).is_none() {
                return Err(Error::UnknownGroup {
                    model_graph_id: req.model_graph_id,
                    group_id: id.to_string(),
                });
            }
        }

        let group_id = req.group_node_id.as_deref();
        let result = if expand {
            self.engine.expand_group(graph, group_id, req.all)
        } else {
            self.engine.collapse_group(graph, group_id, req.all)
        };
        let deepest_expanded_group_ids = result.unwrap_or_else(|err| {
            tracing::warn!(
                graph_id = %req.model_graph_id,
                group_id = group_id.unwrap_or("*"),
                expand,
                error = %err,
                "layout after expansion change failed"
            );
            graph.deepest_expanded_group_ids()
        });

        let response = ExpansionResponse {
            model_graph: graph.clone(),
            expanded: expand,
            group_node_id: req.group_node_id,
            session_id: req.session_id,
            deepest_expanded_group_ids,
            timestamp: req.timestamp,
        };
        emit(if expand {
            WorkerResponse::ExpandGroupResp(response)
        } else {
            WorkerResponse::CollapseGroupResp(response)
        });
        Ok(())
    }

    fn relayout(
        &mut self,
        req: RelayoutRequest,
        emit: &mut impl FnMut(WorkerResponse),
    ) -> Result<()> {
        let options = RelayoutOptions {
            target_deepest_group_ids_to_expand: req
                .target_deepest_group_node_ids_to_expand
                .clone(),
            clear_all_expand_states: req.clear_all_expand_states,
        };
        let graph = lookup(&mut self.store, &req.model_graph_id, &req.session_id)?;
        let deepest_expanded_group_ids = self
            .engine
            .relayout(graph, &options)
            .unwrap_or_else(|err| {
                tracing::warn!(graph_id = %req.model_graph_id, error = %err, "relayout failed");
                graph.deepest_expanded_group_ids()
            });

        emit(WorkerResponse::RelayoutResp(RelayoutResponse {
            model_graph: graph.clone(),
            selected_node_id: req.selected_node_id,
            session_id: req.session_id,
            for_restoring_ui_state: req.for_restoring_ui_state,
            rect_to_zoom_fit: req.rect_to_zoom_fit,
            target_deepest_group_node_ids_to_expand: req.target_deepest_group_node_ids_to_expand,
            deepest_expanded_group_ids,
        }));
        Ok(())
    }
}

fn lookup<'a>(
    store: &'a mut SessionStore,
    model_graph_id: &str,
    session_id: &str,
) -> Result<&'a mut ModelGraph> {
    store
        .get_mut(&SessionKey::new(model_graph_id, session_id))
        .ok_or_else(|| Error::CacheMiss {
            model_graph_id: model_graph_id.to_string(),
            session_id: session_id.to_string(),
        })
}
