pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no cached model graph `{model_graph_id}` for session `{session_id}`")]
    CacheMiss {
        model_graph_id: String,
        session_id: String,
    },

    #[error("model graph `{model_graph_id}` has no group `{group_id}`")]
    UnknownGroup {
        model_graph_id: String,
        group_id: String,
    },

    #[error(transparent)]
    Model(#[from] canopy_model::Error),

    #[error(transparent)]
    Layout(#[from] canopy_layout::Error),

    #[error("worker message JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
