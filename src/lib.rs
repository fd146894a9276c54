pub mod cli;
pub mod config;
pub mod services;

pub mod env;
pub mod error;
pub mod logging;

pub use error::{NocMatchError, Result};
pub use logging::{init_logging, LoggingConfig};
