//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use git2::{IndexAddOption, Oid, Repository, RepositoryInitOptions, Signature};

use pr_agent::tools::StaticWorkingDir;
use pr_agent::{ChangeAnalyzer, DirectoryTemplateSource, PrAgentTools, SystemRunner};

/// Branch checked out in every test repository, so tests are free to create `main`.
pub const INITIAL_BRANCH: &str = "trunk";

/// Create a temporary directory for test output.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Analyzer backed by the real git binary.
pub fn system_analyzer() -> ChangeAnalyzer {
    let runner = SystemRunner::new(Duration::from_secs(30));
    ChangeAnalyzer::new(Arc::new(runner)).with_time_limit(Duration::from_secs(30))
}

/// Tools running git in `repo` and reading templates from `templates_dir`.
pub fn tools_for(repo: &Path, templates_dir: &Path) -> PrAgentTools {
    PrAgentTools::new(
        system_analyzer(),
        DirectoryTemplateSource::new(templates_dir),
        StaticWorkingDir(Some(repo.to_path_buf())),
    )
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = temp_test_dir();
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head(INITIAL_BRANCH);
        let repo = Repository::init_opts(dir.path(), &opts).expect("Failed to init git repo");
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the repository root.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Get the test signature for commits.
    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Stage every file and commit. Returns the commit OID.
    pub fn commit_all(&self, message: &str) -> Oid {
        let sig = self.signature();

        let mut index = self.repo.index().expect("Failed to get index");
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .expect("Failed to add files");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Create a branch pointing to the given OID.
    pub fn branch(&self, name: &str, oid: Oid) {
        let commit = self.repo.find_commit(oid).expect("Failed to find commit");
        self.repo
            .branch(name, &commit, false)
            .expect("Failed to create branch");
    }
}
