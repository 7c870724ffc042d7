//! Error types for pr-agent modules using thiserror.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors from running external commands.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("{program} command not found. Is it installed and in your PATH?")]
    CommandNotFound { program: String },

    #[error("{stderr}")]
    CommandFailed { exit_code: Option<i32>, stderr: String },

    #[error("Failed to spawn process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Failed to read process output: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("{program} timed out after {}", format_limit(*limit))]
    Timeout { program: String, limit: Duration },

    #[error("Invalid base branch '{0}': a revision may not start with '-'")]
    InvalidRevision(String),
}

/// Whole seconds render as `30s`; anything finer as milliseconds, rounded up.
fn format_limit(limit: Duration) -> String {
    if limit.subsec_nanos() == 0 {
        format!("{}s", limit.as_secs())
    } else {
        format!("{}ms", limit.as_nanos().div_ceil(1_000_000))
    }
}

impl ProcessError {
    /// Message shown to the tool caller.
    ///
    /// A missing git binary gets the fixed install hint; everything else uses
    /// the `Display` text (for `CommandFailed` that is the trimmed stderr).
    pub fn user_message(&self) -> String {
        match self {
            ProcessError::CommandNotFound { program } if program == "git" => {
                "Git command not found. Is Git installed and in your PATH?".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Errors from template enumeration.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Templates directory not found at: {}", path.display())]
    TemplatesUnavailable { path: PathBuf },

    #[error("Failed to read template {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from tool dispatch, reported to the protocol layer rather than the tool payload.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },
}
