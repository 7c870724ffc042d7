//! PR template enumeration.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use crate::error::TemplateError;

/// Default template directory, relative to the process working directory.
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";

/// File extension recognized as a template.
const TEMPLATE_EXTENSION: &str = "md";

/// A named template and its full content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateEntry {
    pub name: String,
    pub template: String,
}

/// Source of `(name, content)` template pairs.
pub trait TemplateSource: Send + Sync {
    fn entries(&self) -> Result<Vec<(String, String)>, TemplateError>;
}

/// Templates stored as `*.md` files in a directory.
#[derive(Debug, Clone)]
pub struct DirectoryTemplateSource {
    dir: PathBuf,
}

impl DirectoryTemplateSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl TemplateSource for DirectoryTemplateSource {
    /// Order follows the directory enumeration and is not sorted.
    fn entries(&self) -> Result<Vec<(String, String)>, TemplateError> {
        let unavailable = || TemplateError::TemplatesUnavailable {
            path: self.dir.clone(),
        };

        let read_dir = fs::read_dir(&self.dir).map_err(|_| unavailable())?;

        let mut entries = Vec::new();
        for dir_entry in read_dir {
            let path = dir_entry.map_err(|_| unavailable())?.path();
            if !path.is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION)
            {
                continue;
            }
            let Some(name) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
                continue;
            };

            let content = fs::read_to_string(&path).map_err(|source| TemplateError::ReadFailed {
                path: path.clone(),
                source,
            })?;
            entries.push((name, content));
        }

        debug!(count = entries.len(), dir = %self.dir.display(), "enumerated templates");
        Ok(entries)
    }
}

/// Turn a source's pairs into serializable entries.
pub fn list_templates(source: &dyn TemplateSource) -> Result<Vec<TemplateEntry>, TemplateError> {
    Ok(source
        .entries()?
        .into_iter()
        .map(|(name, template)| TemplateEntry { name, template })
        .collect())
}
