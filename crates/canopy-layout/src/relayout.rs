use crate::error::Result;
use crate::{ExpansionEngine, LayoutEngine, RelayoutOptions};
use canopy_model::ModelGraph;
use canopy_model::expansion;

/// [`ExpansionEngine`] that applies the expansion-state change and then re-runs a
/// [`LayoutEngine`] over the root scope.
#[derive(Debug, Clone, Default)]
pub struct Relayouter<L> {
    engine: L,
}

impl<L: LayoutEngine> Relayouter<L> {
    pub fn new(engine: L) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &L {
        &self.engine
    }

    fn finish(&self, graph: &mut ModelGraph) -> Result<Vec<String>> {
        self.engine.layout(graph, None)?;
        Ok(graph.deepest_expanded_group_ids())
    }
}

impl<L: LayoutEngine> ExpansionEngine for Relayouter<L> {
    fn expand_group(
        &self,
        graph: &mut ModelGraph,
        group_id: Option<&str>,
        all: bool,
    ) -> Result<Vec<String>> {
        match group_id {
            Some(id) => {
                expansion::expand_group(graph, id, all)?;
            }
            None => expansion::expand_all(graph),
        }
        self.finish(graph)
    }

    fn collapse_group(
        &self,
        graph: &mut ModelGraph,
        group_id: Option<&str>,
        all: bool,
    ) -> Result<Vec<String>> {
        match group_id {
            Some(id) => expansion::collapse_group(graph, id, all)?,
            None => expansion::collapse_all(graph),
        }
        self.finish(graph)
    }

    fn relayout(&self, graph: &mut ModelGraph, options: &RelayoutOptions) -> Result<Vec<String>> {
        if options.clear_all_expand_states {
            expansion::collapse_all(graph);
        }
        for id in &options.target_deepest_group_ids_to_expand {
            if let Err(err) = expansion::reveal_group(graph, id) {
                tracing::warn!(group_id = %id, error = %err, "skipping relayout target");
            }
        }
        self.finish(graph)
    }
}
