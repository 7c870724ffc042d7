//! Change-type to template recommendation.

use serde::Serialize;

/// Template used when no change type matches.
pub const DEFAULT_TEMPLATE: &str = "default.md";

/// Suggestion attached to a fallback recommendation.
pub const NO_MATCH_SUGGESTION: &str = "No specific template found for the identified change type.";

/// Normalized change type -> template identifier.
const TEMPLATE_MAP: &[(&str, &str)] = &[
    ("feature", "feature"),
    ("bug", "bugfix"),
    ("bugfix", "bugfix"),
    ("docs", "documentation"),
    ("documentation", "documentation"),
    ("refactor", "refactor"),
    ("test", "tests"),
    ("tests", "tests"),
];

/// Template recommended for a change type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateRecommendation {
    pub recommended_template: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Look up the template identifier for a change type, ignoring case and surrounding whitespace.
pub fn template_for(change_type: &str) -> Option<&'static str> {
    let normalized = change_type.trim().to_lowercase();
    TEMPLATE_MAP
        .iter()
        .find(|(label, _)| *label == normalized)
        .map(|(_, template)| *template)
}

/// Recommend a template file for a change type.
///
/// Never fails: unknown types fall back to [`DEFAULT_TEMPLATE`] with a suggestion.
pub fn classify(change_type: &str) -> TemplateRecommendation {
    match template_for(change_type) {
        Some(template) => TemplateRecommendation {
            recommended_template: format!("{template}.md"),
            suggestion: None,
        },
        None => TemplateRecommendation {
            recommended_template: DEFAULT_TEMPLATE.to_string(),
            suggestion: Some(NO_MATCH_SUGGESTION.to_string()),
        },
    }
}
