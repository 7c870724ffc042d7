//! Tool dispatch: turns `(tool_name, args)` into a serialized result.
//!
//! Every tool failure is rendered as an `{"error": ...}` payload. Only
//! problems with the call itself (unknown tool, malformed arguments) surface
//! as [`ToolError`].

pub mod schema;
pub mod workdir;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::diff::ChangeAnalyzer;
use crate::error::ToolError;
use crate::templates::{TemplateSource, classify, list_templates};

pub use schema::{ANALYZE_FILE_CHANGES, GET_PR_TEMPLATES, SUGGEST_TEMPLATE, tool_definitions};
pub use workdir::{StaticWorkingDir, WorkingDirResolver, working_dir_or_fallback};

fn default_base_branch() -> String {
    "main".to_string()
}

fn default_include_diff() -> bool {
    true
}

#[derive(Debug, serde::Deserialize)]
struct AnalyzeArgs {
    #[serde(default = "default_base_branch")]
    base_branch: String,
    #[serde(default = "default_include_diff")]
    include_diff: bool,
}

#[derive(Debug, serde::Deserialize)]
struct SuggestArgs {
    changes_summary: String,
    change_type: String,
}

/// The three PR-agent tools bound to their collaborators.
pub struct PrAgentTools {
    analyzer: ChangeAnalyzer,
    templates: Box<dyn TemplateSource>,
    working_dir: Box<dyn WorkingDirResolver>,
}

impl PrAgentTools {
    pub fn new(
        analyzer: ChangeAnalyzer,
        templates: impl TemplateSource + 'static,
        working_dir: impl WorkingDirResolver + 'static,
    ) -> Self {
        Self {
            analyzer,
            templates: Box::new(templates),
            working_dir: Box::new(working_dir),
        }
    }

    /// Dispatch a tool call by name.
    pub async fn invoke(&self, tool_name: &str, args: &Value) -> Result<String, ToolError> {
        match tool_name {
            ANALYZE_FILE_CHANGES => {
                let args: AnalyzeArgs = parse_args(tool_name, args)?;
                Ok(self
                    .analyze_file_changes(&args.base_branch, args.include_diff)
                    .await)
            }
            GET_PR_TEMPLATES => Ok(self.get_pr_templates()),
            SUGGEST_TEMPLATE => {
                let args: SuggestArgs = parse_args(tool_name, args)?;
                Ok(self.suggest_template(&args.changes_summary, &args.change_type))
            }
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }

    /// Changed files and bounded diff against `base_branch`, as pretty JSON.
    pub async fn analyze_file_changes(&self, base_branch: &str, include_diff: bool) -> String {
        let working_dir = working_dir_or_fallback(self.working_dir.as_ref());

        match self
            .analyzer
            .analyze(base_branch, include_diff, &working_dir)
            .await
        {
            Ok(result) => to_pretty_json(&result),
            Err(e) => {
                warn!(base_branch, "analyze_file_changes failed: {}", e);
                error_payload(&e.user_message())
            }
        }
    }

    /// All templates with their content, as pretty JSON.
    pub fn get_pr_templates(&self) -> String {
        match list_templates(self.templates.as_ref()) {
            Ok(entries) => to_pretty_json(&entries),
            Err(e) => {
                warn!("get_pr_templates failed: {}", e);
                error_payload(&e.to_string())
            }
        }
    }

    /// Template recommendation for `change_type`, as compact JSON.
    pub fn suggest_template(&self, changes_summary: &str, change_type: &str) -> String {
        debug!(changes_summary, change_type, "suggesting template");
        let recommendation = classify(change_type);
        serde_json::to_string(&recommendation)
            .unwrap_or_else(|e| error_payload(&format!("Failed to serialize result: {e}")))
    }
}

/// Deserialize tool arguments; a missing argument object counts as empty.
fn parse_args<T: DeserializeOwned>(tool: &str, args: &Value) -> Result<T, ToolError> {
    let args = if args.is_null() { json!({}) } else { args.clone() };
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

fn to_pretty_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| error_payload(&format!("Failed to serialize result: {e}")))
}

/// `{"error": message}`.
pub fn error_payload(message: &str) -> String {
    json!({ "error": message }).to_string()
}

/// Whether a tool result is an `{"error": ...}` payload.
pub fn is_error_payload(result: &str) -> bool {
    serde_json::from_str::<Value>(result)
        .map(|v| v.as_object().is_some_and(|o| o.len() == 1 && o.contains_key("error")))
        .unwrap_or(false)
}
