//! PR template listing and recommendation.

pub mod classifier;
pub mod lister;

pub use classifier::{TemplateRecommendation, classify, template_for};
pub use lister::{
    DEFAULT_TEMPLATES_DIR, DirectoryTemplateSource, TemplateEntry, TemplateSource, list_templates,
};
