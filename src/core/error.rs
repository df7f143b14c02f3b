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

    /// JSON configuration error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Log directory could not be created
    #[error("Failed to create log directory '{path}': {source}")]
    DirectoryCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Log file could not be opened
    #[error("Failed to open log file '{path}': {source}")]
    FileOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Worker thread could not be started
    #[error("Failed to spawn logger worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// `init` called on a running logger
    #[error("Tried to initialize the logging system multiple times")]
    AlreadyInitialized,

    /// `shutdown` called on a logger that was never initialized
    #[error("Logging system was used before it was initialized")]
    NotInitialized,

    /// A termination guard is already active in this process
    #[error("A termination guard is already installed for this process")]
    GuardAlreadyInstalled,

    /// Installing or restoring a signal disposition failed
    #[error("Failed to change disposition of signal {signal}: {source}")]
    SignalDisposition {
        signal: i32,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
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

    /// Create a directory creation error
    pub fn directory(path: impl Into<String>, source: std::io::Error) -> Self {
        LoggerError::DirectoryCreation {
            path: path.into(),
            source,
        }
    }

    /// Create a file open error
    pub fn file_open(path: impl Into<String>, source: std::io::Error) -> Self {
        LoggerError::FileOpen {
            path: path.into(),
            source,
        }
    }

    /// Create a signal disposition error from the current `errno`
    pub fn signal(signal: i32, source: std::io::Error) -> Self {
        LoggerError::SignalDisposition { signal, source }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Usage errors are programming mistakes in the host, not runtime faults
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            LoggerError::AlreadyInitialized | LoggerError::NotInitialized
        )
    }
}
