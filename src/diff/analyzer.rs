//! Changed-file listing and bounded diff against a base branch.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ProcessError;
use crate::process::{CommandSpec, ProcessRunner};

use super::collector::DiffCollector;

/// Warning attached to a result whose diff was cut short.
pub const TRUNCATION_WARNING: &str = "Diff output was truncated due to its large size.";

/// Result of comparing the working tree with a base branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeAnalysisResult {
    pub changed_files: Vec<String>,
    pub diff: String,
    /// Serialized as `null` when the diff is complete.
    pub warning: Option<String>,
}

/// Runs git through a [`ProcessRunner`] and bounds the diff it returns.
pub struct ChangeAnalyzer {
    runner: Arc<dyn ProcessRunner>,
    collector: DiffCollector,
    git_program: String,
}

impl ChangeAnalyzer {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            runner,
            collector: DiffCollector::default(),
            git_program: "git".to_string(),
        }
    }

    /// Use a different executable name for git.
    pub fn with_git_program(mut self, program: impl Into<String>) -> Self {
        self.git_program = program.into();
        self
    }

    /// Bound diff collection by a wall-clock limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.collector = self.collector.with_time_limit(limit);
        self
    }

    pub fn with_collector(mut self, collector: DiffCollector) -> Self {
        self.collector = collector;
        self
    }

    /// List changed files and, if requested, collect the diff against `base_branch`.
    ///
    /// A failure while listing files aborts the whole call; the diff is never
    /// attempted in that case. A `base_branch` starting with `-` is rejected
    /// before git runs, since git would parse it as an option.
    pub async fn analyze(
        &self,
        base_branch: &str,
        include_diff: bool,
        working_dir: &Path,
    ) -> Result<ChangeAnalysisResult, ProcessError> {
        if base_branch.starts_with('-') {
            warn!(base_branch, "refusing option-like base branch");
            return Err(ProcessError::InvalidRevision(base_branch.to_string()));
        }

        let changed_files = self.changed_files(base_branch, working_dir).await?;
        debug!(count = changed_files.len(), base_branch, "listed changed files");

        let mut result = ChangeAnalysisResult {
            changed_files,
            diff: String::new(),
            warning: None,
        };

        if include_diff {
            let spec = CommandSpec::new(&self.git_program, working_dir)
                .arg("diff")
                .arg("--no-color")
                .arg(base_branch);
            let stream = self.runner.run_streaming(&spec).await?;
            let collected = self.collector.collect(stream).await?;

            if collected.truncated() {
                result.warning = Some(TRUNCATION_WARNING.to_string());
            }
            result.diff = collected.text;
        }

        Ok(result)
    }

    async fn changed_files(
        &self,
        base_branch: &str,
        working_dir: &Path,
    ) -> Result<Vec<String>, ProcessError> {
        let spec = CommandSpec::new(&self.git_program, working_dir)
            .arg("diff")
            .arg("--name-only")
            .arg("-z")
            .arg(base_branch);

        // NUL-terminated names are never quoted, so non-ASCII paths come back verbatim.
        let stdout = self.runner.run_capturing(&spec).await?.into_stdout()?;
        Ok(stdout
            .split('\0')
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect())
    }
}
