/// Admin tool error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdminError>;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] mixtape_core::MixtapeError),

    #[error("Storage error: {0}")]
    Storage(#[from] mixtape_storage::StorageError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
