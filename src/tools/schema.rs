//! Tool definitions published to the client.

use serde_json::{Value, json};

pub const ANALYZE_FILE_CHANGES: &str = "analyze_file_changes";
pub const GET_PR_TEMPLATES: &str = "get_pr_templates";
pub const SUGGEST_TEMPLATE: &str = "suggest_template";

/// Name, description and input schema for every tool.
pub fn tool_definitions() -> Vec<Value> {
    vec![
        json!({
            "name": ANALYZE_FILE_CHANGES,
            "description": "Get the full diff and list of changed files in the current git repository.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "base_branch": {
                        "type": "string",
                        "description": "Base branch to compare against (default: main)",
                        "default": "main",
                    },
                    "include_diff": {
                        "type": "boolean",
                        "description": "Include the full diff content (default: true)",
                        "default": true,
                    },
                },
            },
        }),
        json!({
            "name": GET_PR_TEMPLATES,
            "description": "List available PR templates with their content.",
            "inputSchema": {
                "type": "object",
                "properties": {},
            },
        }),
        json!({
            "name": SUGGEST_TEMPLATE,
            "description": "Suggest the most appropriate PR template for an analyzed change.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "changes_summary": {
                        "type": "string",
                        "description": "Your analysis of what the changes do",
                    },
                    "change_type": {
                        "type": "string",
                        "description": "The type of change you've identified (bug, feature, docs, refactor, test, etc.)",
                    },
                },
                "required": ["changes_summary", "change_type"],
            },
        }),
    ]
}
