//! Error types for the task board.
//!
//! Storage failures are recovered inside the stores and only ever logged, so
//! `StorageError` rarely travels far. `BoardError` is what the call surface
//! hands back to the interaction layer.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of the key-value persistence layer.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Rejections and failures surfaced to callers of the board.
#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Task title is required")]
    EmptyTitle,

    #[error("Project name cannot be empty")]
    EmptyProjectName,

    #[error("Unknown project: {0}")]
    UnknownProject(String),

    #[error("No task found matching '{0}'")]
    TaskNotFound(String),

    #[error("Multiple tasks match '{ident}':\n{candidates}\nPlease use the task id instead.")]
    AmbiguousTask { ident: String, candidates: String },

    #[error("Invalid due date '{0}' (expected YYYY-MM-DD, 'today', 'tomorrow' or 'in Nd')")]
    InvalidDueDate(String),

    #[error("Invalid configuration in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BoardError {
    /// Whether the error was caused by user input rather than the environment.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            BoardError::EmptyTitle
                | BoardError::EmptyProjectName
                | BoardError::UnknownProject(_)
                | BoardError::TaskNotFound(_)
                | BoardError::AmbiguousTask { .. }
                | BoardError::InvalidDueDate(_)
                | BoardError::Config { .. }
        )
    }
}

/// Result type alias for board operations.
pub type Result<T> = std::result::Result<T, BoardError>;
