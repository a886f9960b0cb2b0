pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid processing config: {message}")]
    InvalidConfig { message: String },

    #[error("unknown node: {id}")]
    UnknownNode { id: String },

    #[error("node `{id}` is not a group node")]
    NotAGroup { id: String },

    #[error("model graph invariant violated: {message}")]
    Invariant { message: String },

    #[error("raw graph JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
