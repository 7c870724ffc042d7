//! pr-agent - A stdio tool server for pull-request preparation.
//!
//! # Overview
//!
//! pr-agent exposes three tools to an LLM-driven client: a change analyzer that
//! lists files changed against a base branch and returns a line-bounded diff,
//! a PR template lister, and a change-type to template classifier.

pub mod diff;
pub mod error;
pub mod logging;
pub mod process;
pub mod server;
pub mod templates;
pub mod tools;

// Re-export commonly used types
pub use diff::{ChangeAnalysisResult, ChangeAnalyzer, DiffCollector, MAX_DIFF_LINES};
pub use error::{ProcessError, TemplateError, ToolError};
pub use process::{ProcessRunner, SystemRunner};
pub use templates::{DirectoryTemplateSource, TemplateEntry, TemplateRecommendation};
pub use tools::PrAgentTools;
