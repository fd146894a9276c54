use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for nocmatch
#[derive(Error, Debug)]
pub enum NocMatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Virtual environment not found: {}", .path.display())]
    VirtualEnvNotFound { path: PathBuf },

    #[error("Builder program not found: {program}")]
    BuilderNotFound { program: String },

    #[error("Failed to start builder: {message}")]
    BuilderSpawn { message: String },

    #[error("Builder exited with status {exit_code}")]
    BuilderFailed { exit_code: i32 },

    #[error("Builder timed out after {timeout_secs}s")]
    BuilderTimeout { timeout_secs: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl NocMatchError {
    /// Create an invalid configuration error
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a builder spawn error
    pub fn builder_spawn<S: Into<String>>(message: S) -> Self {
        Self::BuilderSpawn {
            message: message.into(),
        }
    }

    /// Process exit code to report for this error.
    ///
    /// A failed builder propagates its own status; everything else is `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::BuilderFailed { exit_code } if *exit_code != 0 => *exit_code,
            _ => 1,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::InvalidConfig { .. } => "config",
            Self::VirtualEnvNotFound { .. } => "venv",
            Self::BuilderNotFound { .. }
            | Self::BuilderSpawn { .. }
            | Self::BuilderFailed { .. }
            | Self::BuilderTimeout { .. } => "builder",
            Self::Http(_) => "http",
        }
    }
}

/// Result type alias for nocmatch operations
pub type Result<T> = std::result::Result<T, NocMatchError>;
