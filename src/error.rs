//! Error types for agentlint.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the scan pipeline and the CLI boundary.
#[derive(Debug, Error)]
pub enum AgentlintError {
    /// Reading or writing a specific file failed
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed
    #[error("walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// Configuration problem that cannot be recovered with defaults
    #[error("config error: {0}")]
    Config(String),

    /// Result encoding failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Lookup of a named item failed
    #[error("not found: {0}")]
    NotFound(String),

    /// Reading the diff stream failed
    #[error("input error: {0}")]
    Input(String),

    /// The run completed and reported error-severity violations
    #[error("{0} error(s) found")]
    ViolationsFound(usize),
}

impl AgentlintError {
    /// Attach a path to an I/O error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, AgentlintError>;
