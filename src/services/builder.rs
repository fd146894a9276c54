//! Embedding index builder invocation
//!
//! Runs the external embedding builder inside an activated virtual environment,
//! forwarding the OpenAI credential, and stops at the first failure.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::process::Command;

use super::subprocess::{exit_code_of, run_to_completion};
use super::venv::{VirtualEnv, DEFAULT_VENV_DIR};
use crate::config::BuilderSettings;
use crate::env::apis as env_apis;
use crate::error::{NocMatchError, Result};
use crate::logging::log_performance;

pub const DEFAULT_PROGRAM: &str = "python";
pub const DEFAULT_SCRIPT: &str = "build_embeddings.py";

/// Printed on stdout once the builder exits successfully
pub const COMPLETION_MESSAGE: &str = "Done. Built noc_embeddings.json and title_embeddings.json \
(FAISS index files are written too if faiss is available).";

/// Files the builder is expected to leave in its working directory
pub const EXPECTED_ARTIFACTS: &[&str] = &["noc_embeddings.json", "title_embeddings.json"];

/// Index files written only when the builder has a vector-indexing backend
pub const OPTIONAL_ARTIFACTS: &[&str] = &["noc_faiss.index", "title_faiss.index"];

/// Everything needed for one builder run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub program: String,
    pub args: Vec<String>,
    pub workdir: PathBuf,
    /// `None` runs the builder without activating an environment
    pub venv: Option<PathBuf>,
    /// Value for `OPENAI_API_KEY` in the child
    pub api_key: String,
    pub timeout_secs: Option<u64>,
}

impl Default for BuildRequest {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            args: vec![DEFAULT_SCRIPT.to_string()],
            workdir: PathBuf::from("."),
            venv: Some(PathBuf::from(DEFAULT_VENV_DIR)),
            api_key: String::new(),
            timeout_secs: None,
        }
    }
}

impl BuildRequest {
    /// Start from config file values, falling back to defaults
    pub fn from_settings(settings: &BuilderSettings) -> Self {
        let defaults = Self::default();
        let program_overridden = settings.program.is_some();

        Self {
            program: settings.program.clone().unwrap_or(defaults.program),
            // A custom program does not inherit the default script argument
            args: match (&settings.args, program_overridden) {
                (Some(args), _) => args.clone(),
                (None, true) => Vec::new(),
                (None, false) => defaults.args,
            },
            workdir: settings
                .workdir
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or(defaults.workdir),
            venv: settings.venv.as_ref().map(PathBuf::from).or(defaults.venv),
            api_key: defaults.api_key,
            timeout_secs: settings.timeout_secs,
        }
    }

    pub fn with_program(mut self, program: impl Into<String>, args: Vec<String>) -> Self {
        self.program = program.into();
        self.args = args;
        self
    }

    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    pub fn with_venv(mut self, venv: Option<PathBuf>) -> Self {
        self.venv = venv;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: Option<u64>) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Presence of one artifact after a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStatus {
    pub name: &'static str,
    pub path: PathBuf,
    pub optional: bool,
    pub present: bool,
}

/// Result of a successful build
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub duration_ms: u64,
    pub artifacts: Vec<ArtifactStatus>,
}

impl BuildOutcome {
    /// Expected artifacts that did not show up
    pub fn missing_expected(&self) -> impl Iterator<Item = &ArtifactStatus> {
        self.artifacts.iter().filter(|a| !a.optional && !a.present)
    }
}

pub struct IndexBuilder {
    request: BuildRequest,
}

impl IndexBuilder {
    pub fn new(request: BuildRequest) -> Self {
        Self { request }
    }

    /// Build the child command, activating the environment when one is configured
    fn command(&self) -> Result<Command> {
        let request = &self.request;
        let mut command = Command::new(&request.program);
        command
            .args(&request.args)
            .current_dir(&request.workdir)
            .env(env_apis::OPENAI_API_KEY, &request.api_key);

        if let Some(venv_path) = &request.venv {
            VirtualEnv::resolve(&request.workdir, venv_path)?.apply(&mut command)?;
        }

        Ok(command)
    }

    /// Run the builder to completion and write the completion message to `out`
    ///
    /// Any non-zero exit aborts with [`NocMatchError::BuilderFailed`] before
    /// anything is written.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<BuildOutcome> {
        let request = &self.request;
        let command = self.command()?;

        tracing::info!(
            program = %request.program,
            args = ?request.args,
            workdir = %request.workdir.display(),
            venv = ?request.venv,
            api_key_set = !request.api_key.is_empty(),
            "Running embedding builder"
        );

        let started = Instant::now();
        let result = run_to_completion(command, &request.program, request.timeout_secs).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let status = match result {
            Ok(status) => status,
            Err(e) => {
                log_performance("build_embeddings", duration_ms, false);
                return Err(e);
            }
        };

        if !status.success() {
            log_performance("build_embeddings", duration_ms, false);
            return Err(NocMatchError::BuilderFailed {
                exit_code: exit_code_of(&status),
            });
        }

        log_performance("build_embeddings", duration_ms, true);

        writeln!(out, "{COMPLETION_MESSAGE}")?;
        out.flush()?;

        let artifacts = scan_artifacts(&request.workdir);
        report_artifacts(&artifacts);

        Ok(BuildOutcome {
            duration_ms,
            artifacts,
        })
    }
}

/// Check which artifacts exist in `workdir`; contents are never read
pub fn scan_artifacts(workdir: &Path) -> Vec<ArtifactStatus> {
    let expected = EXPECTED_ARTIFACTS.iter().map(|name| (*name, false));
    let optional = OPTIONAL_ARTIFACTS.iter().map(|name| (*name, true));

    expected
        .chain(optional)
        .map(|(name, optional)| {
            let path = workdir.join(name);
            ArtifactStatus {
                name,
                present: path.is_file(),
                path,
                optional,
            }
        })
        .collect()
}

fn report_artifacts(artifacts: &[ArtifactStatus]) {
    for artifact in artifacts {
        match (artifact.present, artifact.optional) {
            (true, _) => tracing::info!(path = %artifact.path.display(), "Artifact present"),
            (false, false) => {
                tracing::warn!(path = %artifact.path.display(), "Expected artifact missing")
            }
            (false, true) => {
                tracing::debug!(path = %artifact.path.display(), "Optional index not written")
            }
        }
    }
}
