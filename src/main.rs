use clap::Parser;
use nocmatch::cli::{error_category, exit_code_for, Cli};
use nocmatch::logging::{init_logging, log_error, LoggingConfig};
use tracing::Level;

fn main() {
    // Load .env file if it exists (ignore errors if missing)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let logging_config = if cli.verbose {
        LoggingConfig::from_env().with_level(Level::DEBUG)
    } else {
        LoggingConfig::from_env()
    };
    if let Err(e) = init_logging(logging_config) {
        eprintln!("Warning: {e:#}");
    }

    if let Err(error) = cli.run() {
        log_error(&format!("{error:#}"), error_category(&error));
        eprintln!("Error: {error:#}");
        std::process::exit(exit_code_for(&error));
    }
}
