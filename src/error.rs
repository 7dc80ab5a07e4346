//! Error types for agentrun
//!
//! Centralized error handling using thiserror. Errors raised by the agent
//! itself live in [`crate::agent::AgentError`]; they are folded into a
//! [`crate::domain::RunOutcome`] rather than propagated.

use std::path::PathBuf;

use thiserror::Error;

/// All error types that can escape the library
#[derive(Debug, Error)]
pub enum AgentrunError {
    /// Missing or invalid configuration (fatal, raised before any attempt)
    #[error("Configuration error: {0}")]
    Config(String),

    /// LLM client construction error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Artifact directory or file could not be written
    #[error("Storage error at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl AgentrunError {
    /// Wrap an IO failure with the path it happened on
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AgentrunError::Storage {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for agentrun operations
pub type Result<T> = std::result::Result<T, AgentrunError>;
