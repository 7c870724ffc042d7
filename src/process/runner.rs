//! Subprocess spawning for git invocations.

use std::env;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::ProcessError;

use super::stream::{ChildLineStream, LineStream};

/// Default timeout for git subprocess execution.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable to override the default timeout.
pub const TIMEOUT_ENV_VAR: &str = "PR_AGENT_GIT_TIMEOUT";

/// Get the configured timeout duration.
///
/// Reads from PR_AGENT_GIT_TIMEOUT environment variable if set,
/// otherwise uses the default of 30 seconds.
///
/// Logs a warning if the environment variable is set but contains
/// an invalid value (non-numeric, empty, or negative).
pub fn get_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

/// Check whether git is on the execution path.
///
/// Uses the `which` crate for cross-platform executable detection.
pub fn check_git_installed() -> Result<PathBuf, ProcessError> {
    which::which("git").map_err(|_| ProcessError::CommandNotFound {
        program: "git".to_string(),
    })
}

/// One external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: working_dir.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

/// Output of a command that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Return stdout, or `CommandFailed` carrying the trimmed stderr on a non-zero exit.
    pub fn into_stdout(self) -> Result<String, ProcessError> {
        if self.success() {
            Ok(self.stdout)
        } else {
            Err(ProcessError::CommandFailed {
                exit_code: self.exit_code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Trait for running external commands.
///
/// This abstraction allows mocking git in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run a command to completion and capture its output.
    async fn run_capturing(&self, spec: &CommandSpec) -> Result<CapturedOutput, ProcessError>;

    /// Spawn a command and hand back its stdout as a line stream.
    async fn run_streaming(&self, spec: &CommandSpec)
    -> Result<Box<dyn LineStream>, ProcessError>;
}

/// Runner backed by `tokio::process`.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(get_timeout())
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run_capturing(&self, spec: &CommandSpec) -> Result<CapturedOutput, ProcessError> {
        debug!(program = %spec.program, args = ?spec.args, dir = %spec.working_dir.display(), "running command");

        let mut cmd = spec.to_command();
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let output = timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| {
                warn!(program = %spec.program, limit = ?self.timeout, "command timed out");
                ProcessError::Timeout {
                    program: spec.program.clone(),
                    limit: self.timeout,
                }
            })?
            .map_err(|e| spawn_error(&spec.program, e))?;

        Ok(CapturedOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    async fn run_streaming(
        &self,
        spec: &CommandSpec,
    ) -> Result<Box<dyn LineStream>, ProcessError> {
        debug!(program = %spec.program, args = ?spec.args, dir = %spec.working_dir.display(), "streaming command");

        let mut cmd = spec.to_command();
        cmd.stdout(Stdio::piped()).stderr(Stdio::null());

        let mut child = cmd.spawn().map_err(|e| spawn_error(&spec.program, e))?;
        let stdout = child.stdout.take().ok_or_else(|| {
            ProcessError::SpawnFailed(std::io::Error::other("stdout was not piped"))
        })?;

        Ok(Box::new(ChildLineStream::new(&spec.program, child, stdout)))
    }
}

/// Map a spawn failure, distinguishing a missing executable from other I/O errors.
fn spawn_error(program: &str, e: std::io::Error) -> ProcessError {
    if e.kind() == std::io::ErrorKind::NotFound {
        ProcessError::CommandNotFound {
            program: program.to_string(),
        }
    } else {
        ProcessError::SpawnFailed(e)
    }
}
