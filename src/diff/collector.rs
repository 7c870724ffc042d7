//! Bounded collection of diff output.
//!
//! Reads a [`LineStream`] one line at a time and stops as soon as the line
//! budget is exceeded, so an arbitrarily large diff never has to be buffered
//! in full. The budget counts lines, not bytes.

use std::time::Duration;

use tokio::time::timeout;
use tracing::info;

use crate::error::ProcessError;
use crate::process::LineStream;

/// Maximum number of diff lines returned before truncation.
pub const MAX_DIFF_LINES: usize = 500;

/// Progress of one collection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncationState {
    pub line_count: usize,
    pub truncated: bool,
    pub max_lines: usize,
}

impl TruncationState {
    fn new(max_lines: usize) -> Self {
        Self {
            line_count: 0,
            truncated: false,
            max_lines,
        }
    }
}

/// Diff text produced by [`DiffCollector::collect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedDiff {
    pub text: String,
    pub state: TruncationState,
}

impl CollectedDiff {
    pub fn truncated(&self) -> bool {
        self.state.truncated
    }
}

/// Collects at most `max_lines + 1` lines from a stream.
#[derive(Debug, Clone)]
pub struct DiffCollector {
    max_lines: usize,
    time_limit: Option<Duration>,
}

impl Default for DiffCollector {
    fn default() -> Self {
        Self::new(MAX_DIFF_LINES)
    }
}

impl DiffCollector {
    /// # Panics
    ///
    /// Panics if `max_lines` is zero.
    pub fn new(max_lines: usize) -> Self {
        assert!(max_lines > 0, "max_lines must be positive");
        Self {
            max_lines,
            time_limit: None,
        }
    }

    /// Bound the whole read loop by a wall-clock limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// The synthetic line appended to truncated output.
    pub fn truncation_notice(&self) -> String {
        format!(
            "\n...Diff truncated after {} lines to prevent token limit errors.",
            self.max_lines
        )
    }

    /// Drain `stream` up to the line budget and release it.
    ///
    /// The stream is released exactly once whatever the outcome: end of
    /// stream, truncation, a read error or the time limit expiring.
    pub async fn collect(
        &self,
        mut stream: Box<dyn LineStream>,
    ) -> Result<CollectedDiff, ProcessError> {
        let outcome = match self.time_limit {
            Some(limit) => match timeout(limit, self.read_lines(stream.as_mut())).await {
                Ok(read) => read,
                Err(_) => Err(ProcessError::Timeout {
                    program: stream.program().to_string(),
                    limit,
                }),
            },
            None => self.read_lines(stream.as_mut()).await,
        };

        stream.release().await;

        let (mut lines, state) = outcome?;
        if state.truncated {
            info!(max_lines = self.max_lines, "diff truncated");
            lines.push(self.truncation_notice());
        }

        Ok(CollectedDiff {
            text: lines.concat(),
            state,
        })
    }

    async fn read_lines(
        &self,
        stream: &mut dyn LineStream,
    ) -> Result<(Vec<String>, TruncationState), ProcessError> {
        let mut lines = Vec::new();
        let mut state = TruncationState::new(self.max_lines);

        while let Some(line) = stream.next_line().await.map_err(ProcessError::ReadFailed)? {
            lines.push(line);
            state.line_count += 1;
            if state.line_count > self.max_lines {
                state.truncated = true;
                break;
            }
        }

        Ok((lines, state))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    /// What a [`ScriptedStream`] yields once its lines run out.
    #[derive(Clone, Copy)]
    pub(crate) enum Tail {
        End,
        Error,
        Hang,
    }

    /// In-memory stream that records how often it was released and read.
    pub(crate) struct ScriptedStream {
        lines: VecDeque<String>,
        tail: Tail,
        releases: Arc<AtomicUsize>,
        reads: Arc<AtomicUsize>,
    }

    impl ScriptedStream {
        pub(crate) fn new(lines: Vec<String>, tail: Tail) -> (Self, Arc<AtomicUsize>) {
            let releases = Arc::new(AtomicUsize::new(0));
            let stream = Self {
                lines: lines.into(),
                tail,
                releases: releases.clone(),
                reads: Arc::new(AtomicUsize::new(0)),
            };
            (stream, releases)
        }

        fn reads(&self) -> Arc<AtomicUsize> {
            self.reads.clone()
        }
    }

    #[async_trait]
    impl LineStream for ScriptedStream {
        fn program(&self) -> &str {
            "git"
        }

        async fn next_line(&mut self) -> std::io::Result<Option<String>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if let Some(line) = self.lines.pop_front() {
                return Ok(Some(line));
            }
            match self.tail {
                Tail::End => Ok(None),
                Tail::Error => Err(std::io::Error::other("pipe broke")),
                Tail::Hang => std::future::pending().await,
            }
        }

        async fn release(&mut self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub(crate) fn numbered_lines(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("line {i}\n")).collect()
    }

    #[tokio::test]
    async fn test_stream_under_limit_returns_everything() {
        let lines = numbered_lines(10);
        let (stream, releases) = ScriptedStream::new(lines.clone(), Tail::End);

        let diff = DiffCollector::default().collect(Box::new(stream)).await.unwrap();

        assert!(!diff.truncated());
        assert_eq!(diff.state.line_count, 10);
        assert_eq!(diff.text, lines.concat());
        assert!(!diff.text.contains("truncated"));
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stream_exactly_at_limit_is_not_truncated() {
        let lines = numbered_lines(MAX_DIFF_LINES);
        let (stream, releases) = ScriptedStream::new(lines.clone(), Tail::End);

        let diff = DiffCollector::default().collect(Box::new(stream)).await.unwrap();

        assert!(!diff.truncated());
        assert_eq!(diff.state.line_count, MAX_DIFF_LINES);
        assert_eq!(diff.text, lines.concat());
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stream_over_limit_keeps_overflow_line_and_appends_notice() {
        let lines = numbered_lines(2_000);
        let (stream, releases) = ScriptedStream::new(lines.clone(), Tail::End);
        let reads = stream.reads();

        let collector = DiffCollector::default();
        let diff = collector.collect(Box::new(stream)).await.unwrap();

        assert!(diff.truncated());
        assert_eq!(diff.state.line_count, MAX_DIFF_LINES + 1);
        assert_eq!(reads.load(Ordering::SeqCst), MAX_DIFF_LINES + 1);

        let expected = format!(
            "{}\n...Diff truncated after 500 lines to prevent token limit errors.",
            lines[..=MAX_DIFF_LINES].concat()
        );
        assert_eq!(diff.text, expected);
        assert!(diff.text.contains("line 501\n"));
        assert!(!diff.text.contains("line 502\n"));
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_custom_limit_is_reported_in_notice() {
        let (stream, _) = ScriptedStream::new(numbered_lines(5), Tail::End);

        let diff = DiffCollector::new(3).collect(Box::new(stream)).await.unwrap();

        assert!(diff.truncated());
        assert_eq!(diff.state.max_lines, 3);
        assert_eq!(
            diff.text,
            "line 1\nline 2\nline 3\nline 4\n\n...Diff truncated after 3 lines to prevent token limit errors."
        );
    }

    #[tokio::test]
    async fn test_empty_stream_yields_empty_diff() {
        let (stream, releases) = ScriptedStream::new(Vec::new(), Tail::End);

        let diff = DiffCollector::default().collect(Box::new(stream)).await.unwrap();

        assert_eq!(diff.text, "");
        assert_eq!(diff.state.line_count, 0);
        assert!(!diff.truncated());
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_last_line_without_newline_is_kept_verbatim() {
        let lines = vec!["first\n".to_string(), "no newline".to_string()];
        let (stream, _) = ScriptedStream::new(lines, Tail::End);

        let diff = DiffCollector::default().collect(Box::new(stream)).await.unwrap();

        assert_eq!(diff.text, "first\nno newline");
    }

    #[tokio::test]
    async fn test_read_error_still_releases_once() {
        let (stream, releases) = ScriptedStream::new(numbered_lines(3), Tail::Error);

        let result = DiffCollector::default().collect(Box::new(stream)).await;

        assert!(matches!(result, Err(ProcessError::ReadFailed(_))));
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_time_limit_expiry_still_releases_once() {
        let (stream, releases) = ScriptedStream::new(numbered_lines(3), Tail::Hang);

        let collector = DiffCollector::default().with_time_limit(Duration::from_secs(7));
        let result = collector.collect(Box::new(stream)).await;

        match result {
            Err(ProcessError::Timeout { program, limit }) => {
                assert_eq!(program, "git");
                assert_eq!(limit, Duration::from_secs(7));
            }
            other => panic!("Expected Timeout, got {:?}", other),
        }
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sub_second_time_limit_is_reported_exactly() {
        let (stream, releases) = ScriptedStream::new(Vec::new(), Tail::Hang);

        let collector = DiffCollector::default().with_time_limit(Duration::from_millis(250));
        let err = collector.collect(Box::new(stream)).await.unwrap_err();

        assert_eq!(err.to_string(), "git timed out after 250ms");
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[should_panic(expected = "max_lines must be positive")]
    fn test_zero_limit_is_rejected() {
        let _ = DiffCollector::new(0);
    }
}
