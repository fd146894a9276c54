use anyhow::Result;
use std::env;
use std::path::PathBuf;

use crate::config::{get_openai_api_key, Config};
use crate::env::builder as env_vars;
use crate::services::{BuildRequest, IndexBuilder};

/// Flags given to `nocmatch build`
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub venv: Option<PathBuf>,
    pub no_venv: bool,
    pub workdir: Option<PathBuf>,
    pub program: Option<String>,
    pub timeout_secs: Option<u64>,
    pub args: Vec<String>,
}

pub async fn handle_build_command(options: BuildOptions) -> Result<()> {
    let config = Config::load()?;
    let request = resolve_request(
        options,
        &config,
        non_empty_var(env_vars::VENV),
        non_empty_var(env_vars::PROGRAM),
        get_openai_api_key(&config),
    );

    let outcome = IndexBuilder::new(request).run(&mut std::io::stdout()).await?;

    tracing::info!(duration_ms = outcome.duration_ms, "Embedding build finished");
    for artifact in outcome.missing_expected() {
        tracing::warn!(
            "Builder succeeded but {} was not found in the working directory",
            artifact.name
        );
    }

    Ok(())
}

/// Merge flags, environment and config file: flag > env > config > default.
///
/// A program named by flag or environment runs with the trailing flag
/// arguments only.
pub fn resolve_request(
    options: BuildOptions,
    config: &Config,
    env_venv: Option<String>,
    env_program: Option<String>,
    api_key: String,
) -> BuildRequest {
    let mut request = BuildRequest::from_settings(&config.builder);

    if let Some(program) = options.program.or(env_program) {
        request = request.with_program(program, options.args);
    } else if !options.args.is_empty() {
        request.args = options.args;
    }

    if options.no_venv {
        request = request.with_venv(None);
    } else if let Some(venv) = options.venv.or_else(|| env_venv.map(PathBuf::from)) {
        request = request.with_venv(Some(venv));
    }

    if let Some(workdir) = options.workdir {
        request = request.with_workdir(workdir);
    }

    if options.timeout_secs.is_some() {
        request = request.with_timeout_secs(options.timeout_secs);
    }

    request.with_api_key(api_key)
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}
