//! Subprocess execution utilities
//!
//! Runs an external program to completion with the parent's stdio attached,
//! so its progress output streams straight to the terminal.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::{NocMatchError, Result};

/// Exit code used when a status carries neither a code nor a signal
const UNKNOWN_EXIT_CODE: i32 = 1;

/// Spawn `command` and wait for it to exit
///
/// # Arguments
/// * `command` - Fully configured command (program, args, env, cwd)
/// * `program` - Program name, used in error messages
/// * `timeout_secs` - Optional limit; the child is killed when it is exceeded
///
/// # Returns
/// * `Ok(ExitStatus)` - The child ran to completion, successfully or not
/// * `Err(NocMatchError)` - The child could not be started or timed out
pub async fn run_to_completion(
    mut command: Command,
    program: &str,
    timeout_secs: Option<u64>,
) -> Result<ExitStatus> {
    command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            NocMatchError::BuilderNotFound {
                program: program.to_string(),
            }
        } else {
            NocMatchError::builder_spawn(format!("Failed to spawn {program}: {e}"))
        }
    })?;

    tracing::debug!(program = program, pid = ?child.id(), "Spawned process");

    let Some(limit) = timeout_secs else {
        return Ok(child.wait().await?);
    };

    match timeout(Duration::from_secs(limit), child.wait()).await {
        Ok(status) => Ok(status?),
        Err(_) => {
            tracing::warn!(program = program, timeout_secs = limit, "Killing timed out process");
            if let Err(e) = child.kill().await {
                tracing::warn!(error = %e, "Failed to kill process");
            }
            Err(NocMatchError::BuilderTimeout {
                timeout_secs: limit,
            })
        }
    }
}

/// Exit code a shell would report for `status`
///
/// Normal exits keep their code; on Unix a signal `n` becomes `128 + n`.
pub fn exit_code_of(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    UNKNOWN_EXIT_CODE
}
