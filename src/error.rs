//! Error types for subtrans.

use std::path::PathBuf;
use thiserror::Error;

/// Library-level error type for subtrans operations.
#[derive(Error, Debug)]
pub enum SubtransError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No subtitle file matching '{pattern}' found in {}", dir.display())]
    NoInputFound { dir: PathBuf, pattern: String },

    #[error("Translation of chunk {chunk_id} failed: {source}")]
    Translation {
        chunk_id: i64,
        #[source]
        source: GatewayError,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Storage error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Transcript fetch failed: {0}")]
    TranscriptFetch(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SubtransError {
    /// Whether this error originated in the chunk store.
    pub fn is_storage(&self) -> bool {
        matches!(self, SubtransError::Storage(_) | SubtransError::Database(_))
    }

    /// The chunk id a translation failure refers to.
    pub fn failed_chunk_id(&self) -> Option<i64> {
        match self {
            SubtransError::Translation { chunk_id, .. } => Some(*chunk_id),
            _ => None,
        }
    }
}

/// Failures reported by the translator gateway.
///
/// Each variant is a distinct failure class so callers can tell a dead network
/// from a revoked key without parsing messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("quota or rate limit exceeded: {0}")]
    Quota(String),

    #[error("service error: {0}")]
    Api(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type alias for subtrans operations.
pub type Result<T> = std::result::Result<T, SubtransError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_error_names_chunk() {
        let err = SubtransError::Translation {
            chunk_id: 3,
            source: GatewayError::Network("connection reset".to_string()),
        };
        assert_eq!(err.failed_chunk_id(), Some(3));
        assert!(err.to_string().contains("chunk 3"));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_storage_classification() {
        assert!(SubtransError::Storage("locked".into()).is_storage());
        assert!(!SubtransError::Config("bad".into()).is_storage());
    }
}
