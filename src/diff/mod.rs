//! Change analysis against a base branch.

pub mod analyzer;
pub mod collector;

pub use analyzer::{ChangeAnalysisResult, ChangeAnalyzer, TRUNCATION_WARNING};
pub use collector::{CollectedDiff, DiffCollector, MAX_DIFF_LINES, TruncationState};
