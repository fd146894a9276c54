pub mod build;
pub mod config;
pub mod smoke;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::error::NocMatchError;

#[derive(Parser)]
#[command(name = "nocmatch")]
#[command(about = "Operational tooling for the NOC matching service")]
#[command(version)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build duty and title embeddings with the external builder
    ///
    /// Examples:
    ///   nocmatch build
    ///   nocmatch build --venv .venv --workdir ../service
    ///   nocmatch build --no-venv --program python3 -- build_embeddings.py
    Build {
        /// Virtual environment to activate, relative to the working directory
        #[arg(long)]
        venv: Option<PathBuf>,
        /// Run the builder without activating a virtual environment
        #[arg(long, conflicts_with = "venv")]
        no_venv: bool,
        /// Directory the builder runs in and writes its artifacts to
        #[arg(long)]
        workdir: Option<PathBuf>,
        /// Builder program (default: python build_embeddings.py)
        #[arg(long)]
        program: Option<String>,
        /// Kill the builder after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Arguments passed to the builder program
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Send the health, title lookup and duty match requests and print the responses
    Smoke {
        /// Service base URL (default: http://localhost:5001)
        #[arg(long)]
        base_url: Option<String>,
        /// Title for /lookup-by-title
        #[arg(long)]
        title: Option<String>,
        /// Duty description for /match-noc
        #[arg(long)]
        query: Option<String>,
        /// Number of results requested from both endpoints
        #[arg(short)]
        k: Option<u32>,
        /// Per-request timeout in seconds (default: none)
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print a config value
    Get {
        /// Config key (e.g. builder.venv, smoke.base-url)
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// Remove a config value
    Unset {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Print the config file path
    Path,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let rt = Runtime::new()?;

        rt.block_on(async {
            match self.command {
                Commands::Build {
                    venv,
                    no_venv,
                    workdir,
                    program,
                    timeout_secs,
                    args,
                } => {
                    build::handle_build_command(build::BuildOptions {
                        venv,
                        no_venv,
                        workdir,
                        program,
                        timeout_secs,
                        args,
                    })
                    .await
                }
                Commands::Smoke {
                    base_url,
                    title,
                    query,
                    k,
                    timeout_secs,
                } => {
                    smoke::handle_smoke_command(smoke::SmokeOptions {
                        base_url,
                        title,
                        query,
                        k,
                        timeout_secs,
                    })
                    .await
                }
                Commands::Config { command } => config::handle_config_command(command).await,
            }
        })
    }
}

/// Process exit code for an error returned by [`Cli::run`]
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<NocMatchError>()
        .map(NocMatchError::exit_code)
        .unwrap_or(1)
}

/// Logging category for a command error
pub fn error_category(error: &anyhow::Error) -> &'static str {
    error
        .downcast_ref::<NocMatchError>()
        .map(NocMatchError::category)
        .unwrap_or("cli")
}
