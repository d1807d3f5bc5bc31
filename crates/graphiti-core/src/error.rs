#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("a node with id {id:?} already exists in the scene")]
    DuplicateNode { id: String },

    #[error("link {link_id:?} references a missing node: {node_id:?}")]
    MissingNode { link_id: String, node_id: String },

    #[error("surface dimensions must be positive, got {width}x{height}")]
    InvalidSurface { width: u32, height: u32 },

    #[error("hit-test option `{option}` must be finite and positive, got {value}")]
    InvalidHitTestOption { option: &'static str, value: f64 },

    #[error("scene document JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
