use thiserror::Error;

/// Error type for schema store operations.
#[derive(Debug, Error)]
pub enum RDictError {
    #[error("rdict: invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("rdict: unknown element type code {0}")]
    InvalidType(i32),
}
