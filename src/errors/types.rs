use thiserror::Error;

#[derive(Debug, Error)]
pub enum WardenError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Event decode error: {0}")]
    Decode(String),

    #[error("Executor error: {0}")]
    Executor(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Unexpected execution state: {0}")]
    UnexpectedState(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Alert error: {0}")]
    Alert(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Docker error: {0}")]
    Docker(#[from] bollard::errors::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
