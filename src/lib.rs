use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Invalid settings: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<config::ConfigError> for RagError {
    #[inline]
    fn from(err: config::ConfigError) -> Self {
        RagError::Config(err.to_string())
    }
}

impl From<http::HttpError> for RagError {
    #[inline]
    fn from(err: http::HttpError) -> Self {
        match err {
            http::HttpError::Transport { .. } | http::HttpError::Worker(_) => {
                RagError::Network(err.to_string())
            }
            http::HttpError::Status { .. } | http::HttpError::Serialize(_) => {
                RagError::Store(err.to_string())
            }
        }
    }
}

pub mod commands;
pub mod config;
pub mod database;
pub mod embeddings;
pub mod http;
pub mod persona;
pub mod rag;
