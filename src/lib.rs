use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Storage unavailable at {}: {reason}", path.display())]
    StorageUnavailable { path: PathBuf, reason: String },

    #[error("Embedding dimension mismatch: index expects {expected}, provider returned {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Index corruption: {0}")]
    IndexCorruption(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Embedding provider error: {0}")]
    Embedding(String),

    #[error("Completion endpoint unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Completion endpoint returned HTTP {status}: {body}")]
    UpstreamError { status: u16, body: String },

    #[error("Malformed completion response: {0}")]
    UpstreamMalformed(String),
}

impl RagError {
    /// Process exit code reported by the CLI for this error
    #[inline]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::StorageUnavailable { .. } => 3,
            Self::InvalidArgument(_) => 4,
            Self::DimensionMismatch { .. } | Self::IndexCorruption(_) => 5,
            Self::Embedding(_) => 6,
            Self::UpstreamUnavailable(_) | Self::UpstreamError { .. } | Self::UpstreamMalformed(_) => 7,
        }
    }

    pub(crate) fn storage(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::StorageUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub mod commands;
pub mod config;
pub mod context;
pub mod embeddings;
pub mod generator;
pub mod retriever;
pub mod store;

#[cfg(test)]
mod tests;
