// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Per-node output monitoring.
//!
//! The monitor reads the merged output of one relay process in small chunks
//! while the process runs, so output from many nodes stays live and
//! interleaved. Once the process has been reaped it drains whatever is left in
//! large reads until end of stream, then emits the final partial line.

use async_trait::async_trait;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tokio::time::{self, Instant};

use super::line_buffer::LineBuffer;
use super::output_sync::LineSink;
use super::spawn::exit_code_of;

/// Read size while the process is running.
pub const STREAM_CHUNK_SIZE: usize = 16;

/// Read size for the drain after the process has exited.
pub const FINAL_DRAIN_SIZE: usize = 1024 * 1024;

/// How long output is still awaited once the relay process has been reaped,
/// counted from the most recent read.
/// Descendants that outlive the relay may hold the pipe open indefinitely.
pub const EXIT_DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Exit code recorded when a node is killed for exceeding its timeout.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Exit code recorded when the process could not be reaped or its output
/// could not be read.
pub const MONITOR_FAILURE_EXIT_CODE: i32 = 255;

/// The process side of a monitored execution.
#[async_trait]
pub trait ProcessHandle: Send {
    /// Wait for the process to exit and return its exit code.
    ///
    /// Must be cancel-safe: the monitor drops and re-creates this future
    /// while it services reads.
    async fn wait(&mut self) -> io::Result<i32>;

    /// Ask the process to terminate without waiting for it.
    fn kill(&mut self) -> io::Result<()>;
}

#[async_trait]
impl ProcessHandle for Child {
    async fn wait(&mut self) -> io::Result<i32> {
        Child::wait(self).await.map(exit_code_of)
    }

    fn kill(&mut self) -> io::Result<()> {
        self.start_kill()
    }
}

/// What a monitor observed for one execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorOutcome {
    pub exit_code: i32,
    /// Lines emitted to the sink.
    pub lines: usize,
    pub timed_out: bool,
    pub error: Option<String>,
}

pub struct OutputMonitor {
    label: String,
    sink: Arc<dyn LineSink>,
    timeout: Option<Duration>,
}

impl OutputMonitor {
    pub fn new(label: impl Into<String>, sink: Arc<dyn LineSink>) -> Self {
        Self {
            label: label.into(),
            sink,
            timeout: None,
        }
    }

    /// Kill the process if it has not exited after `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Stream `reader` to the sink until the process has exited and the
    /// stream is exhausted.
    pub async fn run<R, P>(&self, mut reader: R, mut process: P) -> MonitorOutcome
    where
        R: AsyncRead + Unpin + Send,
        P: ProcessHandle,
    {
        let mut buffer = LineBuffer::new();
        let mut chunk = vec![0u8; FINAL_DRAIN_SIZE];
        let mut emitted = 0usize;
        let mut status: Option<io::Result<i32>> = None;
        let mut eof = false;
        let mut timed_out = false;
        let mut read_error: Option<io::Error> = None;
        let mut drain_deadline: Option<Instant> = None;

        let deadline = self.timeout.map(|t| Instant::now() + t);
        let expiry = async move {
            match deadline {
                Some(at) => time::sleep_until(at).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(expiry);

        while !(eof && status.is_some()) {
            let read_size = if status.is_some() {
                FINAL_DRAIN_SIZE
            } else {
                STREAM_CHUNK_SIZE
            };

            let drain = time::sleep_until(drain_deadline.unwrap_or_else(Instant::now));

            tokio::select! {
                // Pending output always wins over an expired grace period.
                biased;

                read = reader.read(&mut chunk[..read_size]), if !eof => match read {
                    Ok(0) => eof = true,
                    Ok(n) => {
                        for line in buffer.push(&chunk[..n]) {
                            self.sink.emit(&self.label, &line);
                            emitted += 1;
                        }
                        if drain_deadline.is_some() {
                            drain_deadline = Some(Instant::now() + EXIT_DRAIN_GRACE);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to read output from {}: {}", self.label, e);
                        read_error = Some(e);
                        eof = true;
                    }
                },
                result = process.wait(), if status.is_none() => {
                    tracing::debug!("{} exited: {:?}", self.label, result);
                    status = Some(result);
                    drain_deadline = Some(Instant::now() + EXIT_DRAIN_GRACE);
                }
                _ = drain, if drain_deadline.is_some() && !eof => {
                    tracing::debug!(
                        "{} output idle for {:?} after exit, closing",
                        self.label,
                        EXIT_DRAIN_GRACE
                    );
                    eof = true;
                }
                _ = &mut expiry, if !timed_out && status.is_none() => {
                    tracing::warn!(
                        "{} still running after {:?}, killing relay process",
                        self.label,
                        self.timeout.unwrap_or_default()
                    );
                    timed_out = true;
                    if let Err(e) = process.kill() {
                        tracing::warn!("Failed to kill relay for {}: {}", self.label, e);
                    }
                }
            }
        }

        if let Some(line) = buffer.finish() {
            self.sink.emit(&self.label, &line);
            emitted += 1;
        }

        let status = status.unwrap_or_else(|| Err(io::Error::other("process was never reaped")));
        let (exit_code, error) = match (status, read_error) {
            (Err(e), _) => (
                MONITOR_FAILURE_EXIT_CODE,
                Some(format!("failed to wait for relay process: {e}")),
            ),
            (Ok(_), Some(e)) => (
                MONITOR_FAILURE_EXIT_CODE,
                Some(format!("failed to read relay output: {e}")),
            ),
            (Ok(_), None) if timed_out => (TIMEOUT_EXIT_CODE, None),
            (Ok(code), None) => (code, None),
        };

        MonitorOutcome {
            exit_code,
            lines: emitted,
            timed_out,
            error,
        }
    }
}
