//! Working-directory resolution for git calls.

use std::path::PathBuf;

use tracing::debug;

/// Fallback used when no working directory can be resolved.
pub const FALLBACK_WORKING_DIR: &str = ".";

/// Provides the repository directory a tool call should operate in.
pub trait WorkingDirResolver: Send + Sync {
    /// `None` when the caller's context carries no usable directory.
    fn resolve(&self) -> Option<PathBuf>;
}

/// Resolver configured once at startup, e.g. from `--repo`.
#[derive(Debug, Clone, Default)]
pub struct StaticWorkingDir(pub Option<PathBuf>);

impl WorkingDirResolver for StaticWorkingDir {
    fn resolve(&self) -> Option<PathBuf> {
        self.0.clone()
    }
}

/// Resolve through `resolver`, degrading to the current directory.
pub fn working_dir_or_fallback(resolver: &dyn WorkingDirResolver) -> PathBuf {
    resolver.resolve().unwrap_or_else(|| {
        debug!("no working directory in context, using current directory");
        PathBuf::from(FALLBACK_WORKING_DIR)
    })
}
