use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry,
};

use crate::env::logging as env_vars;

/// Logging configuration for nocmatch
///
/// Log records go to stderr so that stdout only carries command output
/// (the builder completion message, smoke-test responses).
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: Level,
    /// Whether to log to stderr
    pub stderr: bool,
    /// Optional file path for logging
    pub file_path: Option<PathBuf>,
    /// Whether to use ANSI colors
    pub use_colors: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            stderr: true,
            file_path: None,
            use_colors: true,
        }
    }
}

impl LoggingConfig {
    /// Create a new logging config with reasonable defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Enable/disable stderr logging
    pub fn with_stderr(mut self, enabled: bool) -> Self {
        self.stderr = enabled;
        self
    }

    /// Set file path for logging
    pub fn with_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Enable/disable ANSI colors
    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.use_colors = enabled;
        self
    }

    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level_str) = env::var(env_vars::LOG_LEVEL) {
            config.level = parse_level(&level_str).unwrap_or(Level::INFO);
        }

        if let Ok(file_path) = env::var(env_vars::LOG_FILE) {
            if !file_path.is_empty() {
                config.file_path = Some(PathBuf::from(file_path));
            }
        }

        if env::var(env_vars::NO_COLOR).is_ok() {
            config.use_colors = false;
        }

        config
    }
}

/// Parse a textual log level, case-insensitively
pub fn parse_level(value: &str) -> Option<Level> {
    match value.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

/// Initialize logging with the given configuration
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = LevelFilter::from_level(config.level);

    let stderr_layer = config.stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(config.use_colors)
            .with_level(true)
            .with_target(true)
            .with_filter(filter)
    });

    let file_layer = match &config.file_path {
        Some(path) => Some(
            fmt::layer()
                .with_writer(file_appender(path))
                .with_ansi(false)
                .with_target(true)
                .with_filter(filter),
        ),
        None => None,
    };

    Registry::default()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    tracing::debug!(
        level = ?config.level,
        stderr = config.stderr,
        file_path = ?config.file_path,
        "Logging initialized"
    );

    Ok(())
}

fn file_appender(path: &Path) -> tracing_appender::rolling::RollingFileAppender {
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "nocmatch.log".into());
    tracing_appender::rolling::never(directory, file_name)
}

/// Log error with context
pub fn log_error<E: std::fmt::Display>(error: &E, context: &str) {
    tracing::error!(error = %error, context = context, "Error occurred");
}

/// Log performance metrics
pub fn log_performance(operation: &str, duration_ms: u64, success: bool) {
    if success {
        tracing::info!(
            operation = operation,
            duration_ms = duration_ms,
            success = success,
            "Operation completed"
        );
    } else {
        tracing::warn!(
            operation = operation,
            duration_ms = duration_ms,
            success = success,
            "Operation failed"
        );
    }
}
