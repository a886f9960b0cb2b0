#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown layout scope: {id}")]
    UnknownScope { id: String },

    #[error("group `{id}` is collapsed and has no content to lay out")]
    CollapsedScope { id: String },

    #[error("invalid layout config: {message}")]
    InvalidConfig { message: String },

    #[error(transparent)]
    Model(#[from] canopy_model::Error),

    #[error("layout config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
