//! Python virtual environment activation for child processes
//!
//! Activation mirrors what `bin/activate` does to a shell, applied to a single
//! `Command` instead of the current process. Nothing in the parent environment
//! changes, so there is no deactivate step.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::env::system as env_vars;
use crate::error::{NocMatchError, Result};

/// Default environment directory, relative to the builder working directory
pub const DEFAULT_VENV_DIR: &str = "venv";

#[cfg(windows)]
const BIN_DIR: &str = "Scripts";
#[cfg(not(windows))]
const BIN_DIR: &str = "bin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualEnv {
    root: PathBuf,
}

impl VirtualEnv {
    /// Resolve `path` against `workdir` and check that it looks like a virtual environment
    ///
    /// The root is made absolute: the child runs inside `workdir`, so a relative
    /// `VIRTUAL_ENV` or `PATH` entry would be resolved against it a second time.
    pub fn resolve(workdir: &Path, path: &Path) -> Result<Self> {
        let root = if path.is_absolute() {
            path.to_path_buf()
        } else {
            workdir.join(path)
        };

        if !root.join(BIN_DIR).is_dir() {
            return Err(NocMatchError::VirtualEnvNotFound { path: root });
        }

        let root = std::fs::canonicalize(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.join(BIN_DIR)
    }

    /// `PATH` value for the child: the environment's bin directory, then `current`
    pub fn activated_path(&self, current: Option<OsString>) -> Result<OsString> {
        let mut entries = vec![self.bin_dir()];
        if let Some(current) = current {
            entries.extend(env::split_paths(&current));
        }
        env::join_paths(entries).map_err(|e| {
            NocMatchError::invalid_config(format!(
                "Cannot add {} to PATH: {e}",
                self.bin_dir().display()
            ))
        })
    }

    /// Activate the environment for `command` only
    pub fn apply(&self, command: &mut Command) -> Result<()> {
        let path = self.activated_path(env::var_os(env_vars::PATH))?;

        command
            .env(env_vars::VIRTUAL_ENV, &self.root)
            .env(env_vars::PATH, path)
            .env_remove(env_vars::PYTHONHOME);

        tracing::debug!(venv = %self.root.display(), "Activated virtual environment for builder");
        Ok(())
    }
}
