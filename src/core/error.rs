//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration document could not be parsed
    #[error("Malformed configuration for {component}: {source}")]
    MalformedConfig {
        component: String,
        #[source]
        source: serde_json::Error,
    },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// No sink is registered under this kind
    #[error("Unknown sink kind '{0}'")]
    UnknownSink(String),

    /// Removal requested for a name that matches no sink
    #[error("No sink registered under '{0}'")]
    SinkNotFound(String),

    /// Level name in a configuration document is not recognized
    #[error("Unknown level name '{0}'")]
    UnknownLevel(String),

    /// The same level was listed twice for a multi-file sink
    #[error("Level '{0}' assigned to more than one file")]
    DuplicateLevel(String),

    /// A multi-file sink was configured without any level
    #[error("Multi-file sink requires at least one separate level")]
    EmptyLevelSet,

    /// File sink error with path
    #[error("File sink error for '{path}': {message}")]
    FileSinkError { path: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// Write attempted on a closed sink
    #[error("Sink is closed")]
    SinkClosed,

    /// The async worker is gone, records can no longer be queued
    #[error("Logger already stopped")]
    LoggerStopped,

    /// Background worker thread could not be started
    #[error("Failed to spawn {thread} thread: {source}")]
    SpawnError {
        thread: String,
        #[source]
        source: std::io::Error,
    },
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a malformed configuration error
    pub fn malformed(component: impl Into<String>, source: serde_json::Error) -> Self {
        LoggerError::MalformedConfig {
            component: component.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file sink error
    pub fn file_sink(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileSinkError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn spawn(thread: impl Into<String>, source: std::io::Error) -> Self {
        LoggerError::SpawnError {
            thread: thread.into(),
            source,
        }
    }

    /// Whether this error was raised while validating configuration
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            LoggerError::MalformedConfig { .. }
                | LoggerError::InvalidConfiguration { .. }
                | LoggerError::UnknownSink(_)
                | LoggerError::UnknownLevel(_)
                | LoggerError::DuplicateLevel(_)
                | LoggerError::EmptyLevelSet
        )
    }
}
