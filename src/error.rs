// src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The backend answered but reported a failure (`{"error": ...}`).
    #[error("backend error: {0}")]
    Backend(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no messages to export")]
    Empty,

    #[error("could not write export: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf generation failed: {0}")]
    Pdf(String),

    #[error("export task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
