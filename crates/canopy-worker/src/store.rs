//! Cached model graphs, keyed by graph id and session.

use canopy_model::ModelGraph;
use rustc_hash::FxHashMap as HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub model_graph_id: String,
    pub session_id: String,
}

impl SessionKey {
    pub fn new(model_graph_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            model_graph_id: model_graph_id.into(),
            session_id: session_id.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionStore {
    graphs: HashMap<SessionKey, ModelGraph>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caches `graph`, replacing (and returning) whatever was stored under `key`.
    pub fn insert(&mut self, key: SessionKey, graph: ModelGraph) -> Option<ModelGraph> {
        self.graphs.insert(key, graph)
    }

    pub fn get(&self, key: &SessionKey) -> Option<&ModelGraph> {
        self.graphs.get(key)
    }

    pub fn get_mut(&mut self, key: &SessionKey) -> Option<&mut ModelGraph> {
        self.graphs.get_mut(key)
    }

    pub fn contains(&self, key: &SessionKey) -> bool {
        self.graphs.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    pub fn clear(&mut self) {
        self.graphs.clear();
    }
}
