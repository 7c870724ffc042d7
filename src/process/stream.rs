//! Line-oriented access to a running child's stdout.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout};
use tokio::time::timeout;
use tracing::{debug, warn};

/// How long to wait for a child to exit after its stdout is closed before killing it.
const RELEASE_GRACE: Duration = Duration::from_secs(2);

/// A stream of output lines with an explicit release step.
#[async_trait]
pub trait LineStream: Send {
    /// Name of the program producing the lines, for errors and logs.
    fn program(&self) -> &str;

    /// Read the next line, keeping its trailing newline when present.
    ///
    /// Returns `Ok(None)` at end of stream.
    async fn next_line(&mut self) -> std::io::Result<Option<String>>;

    /// Close the output channel and reap the process.
    ///
    /// Calling this more than once is a no-op.
    async fn release(&mut self);
}

/// [`LineStream`] over a spawned `tokio::process::Child`.
pub struct ChildLineStream {
    program: String,
    child: Option<Child>,
    reader: Option<BufReader<ChildStdout>>,
    buf: Vec<u8>,
}

impl ChildLineStream {
    pub fn new(program: &str, child: Child, stdout: ChildStdout) -> Self {
        Self {
            program: program.to_string(),
            child: Some(child),
            reader: Some(BufReader::new(stdout)),
            buf: Vec::new(),
        }
    }
}

#[async_trait]
impl LineStream for ChildLineStream {
    fn program(&self) -> &str {
        &self.program
    }

    async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };

        self.buf.clear();
        let read = reader.read_until(b'\n', &mut self.buf).await?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }

    async fn release(&mut self) {
        // Closing stdout first lets a child blocked on a full pipe see EPIPE and exit.
        drop(self.reader.take());

        let Some(mut child) = self.child.take() else {
            return;
        };

        match timeout(RELEASE_GRACE, child.wait()).await {
            Ok(Ok(status)) => match status.code() {
                Some(0) => debug!(program = %self.program, "process exited cleanly"),
                Some(code) => warn!(program = %self.program, code, "streamed process exited with non-zero status"),
                None => debug!(program = %self.program, "process terminated by signal"),
            },
            Ok(Err(e)) => warn!(program = %self.program, "failed to wait for process: {}", e),
            Err(_) => {
                warn!(program = %self.program, "process did not exit after its output was closed, killing it");
                if let Err(e) = child.kill().await {
                    warn!(program = %self.program, "failed to kill process: {}", e);
                }
            }
        }
    }
}
