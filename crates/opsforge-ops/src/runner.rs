//! The command executor capability.
//!
//! [`CommandRunner`] is the seam between operation handlers and the
//! operating system: handlers compose shell command strings and receive
//! captured output, nothing more. The production implementation is
//! [`ShellRunner`] (`sh -c` via tokio); tests inject recording mocks.

use std::time::Duration;

use tokio::process::Command;

/// Captured output of a successfully exited command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

/// A process-level failure from the command executor.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The command exited with a non-zero status.
    #[error("command exited with status {status}: {stderr}")]
    Failed { status: i32, stderr: String },

    /// The command could not be spawned or its output not captured.
    #[error("failed to execute command: {0}")]
    Spawn(#[from] std::io::Error),

    /// The command exceeded the runner's time budget.
    #[error("command timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

/// Capability for running a shell command and capturing its output.
///
/// Injected into every handler so execution can be mocked in tests and
/// swapped for sandboxed runners later.
#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` to completion and return its captured output, or a
    /// process-level error carrying the exit status and stderr text.
    async fn run(&self, command: &str) -> Result<CommandOutput, CommandError>;
}

/// Production runner: `sh -c <command>` with a per-command timeout.
pub struct ShellRunner {
    timeout: Duration,
}

impl ShellRunner {
    /// Create a runner with the given per-command time budget.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait::async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str) -> Result<CommandOutput, CommandError> {
        tracing::debug!(command, "running shell command");

        let output = tokio::time::timeout(
            self.timeout,
            Command::new("sh").arg("-c").arg(command).output(),
        )
        .await
        .map_err(|_| CommandError::Timeout {
            timeout_secs: self.timeout.as_secs(),
        })??;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(CommandError::Failed {
                status: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shell_runner_captures_stdout() {
        let runner = ShellRunner::new(Duration::from_secs(5));
        let output = runner.run("echo hello").await.unwrap();
        assert_eq!(output.stdout, "hello\n");
        assert!(output.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_shell_runner_nonzero_exit_is_error() {
        let runner = ShellRunner::new(Duration::from_secs(5));
        let err = runner.run("echo oops >&2; exit 3").await.unwrap_err();
        match err {
            CommandError::Failed { status, stderr } => {
                assert_eq!(status, 3);
                assert_eq!(stderr, "oops\n");
            }
            other => panic!("expected Failed, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_shell_runner_timeout() {
        let runner = ShellRunner::new(Duration::from_millis(50));
        let err = runner.run("sleep 5").await.unwrap_err();
        assert!(matches!(err, CommandError::Timeout { .. }));
    }
}
