//! Environment variable constants used throughout the application
//!
//! This module centralizes all environment variable names to ensure consistency
//! and make it easier to manage configuration across the codebase.

/// Logging configuration
pub mod logging {
    /// Log level configuration (e.g., "debug", "info", "warn", "error")
    pub const LOG_LEVEL: &str = "NOCMATCH_LOG_LEVEL";

    /// Log file path for file-based logging
    pub const LOG_FILE: &str = "NOCMATCH_LOG_FILE";

    /// Disable colored output (follows the NO_COLOR standard)
    pub const NO_COLOR: &str = "NO_COLOR";
}

/// External API configuration
pub mod apis {
    /// OpenAI API key forwarded to the embedding builder
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
}

/// Embedding builder invocation
pub mod builder {
    /// Virtual environment directory to activate for the builder
    pub const VENV: &str = "NOCMATCH_VENV";

    /// Builder program to run instead of the configured one
    pub const PROGRAM: &str = "NOCMATCH_BUILDER";
}

/// API smoke test
pub mod smoke {
    /// Base URL of the matching service
    pub const BASE_URL: &str = "NOCMATCH_BASE_URL";
}

/// System environment variables
pub mod system {
    /// Config file location override
    pub const CONFIG: &str = "NOCMATCH_CONFIG";

    /// Executable search path
    pub const PATH: &str = "PATH";

    /// Set by virtual environment activation
    pub const VIRTUAL_ENV: &str = "VIRTUAL_ENV";

    /// Unset by virtual environment activation
    pub const PYTHONHOME: &str = "PYTHONHOME";
}
