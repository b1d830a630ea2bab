use thiserror::Error;

/// Errors that can occur while editing, traversing or serializing a graph.
#[derive(Error, Debug)]
pub enum GraphError {
    /// A user action was refused: missing start node, self-loop, duplicate
    /// edge, or a traversal that is already running.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Imported JSON is missing required keys or has the wrong shape.
    #[error("invalid structure: {message}")]
    ImportStructure { message: String },

    /// Imported XML could not be parsed.
    #[error("invalid format: {message}")]
    ImportFormat { message: String },

    /// No file was chosen, or its extension does not match the import action.
    #[error("file selection error: {message} (path: {path})")]
    FileSelection { message: String, path: String },

    #[error("traversal task failed: {message}")]
    Task { message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GraphError {
    /// Shorthand for a [`GraphError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        GraphError::Validation {
            message: message.into(),
        }
    }
}

/// Convenience alias for results using `GraphError`.
pub type Result<T> = std::result::Result<T, GraphError>;
