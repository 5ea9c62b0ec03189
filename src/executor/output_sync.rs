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

//! Thread-safe line sinks shared by every node's output monitor.

use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;

/// Global stdout mutex to prevent interleaved output
static STDOUT_MUTEX: Lazy<Mutex<io::Stdout>> = Lazy::new(|| Mutex::new(io::stdout()));

/// Destination for node-labelled output lines.
///
/// Implementations must write each line atomically with respect to other
/// callers: lines from different nodes may interleave, characters may not.
pub trait LineSink: Send + Sync {
    fn emit(&self, label: &str, line: &str);
}

/// Writes `"<label>: <line>"` to stdout, one flushed line per call.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl StdoutSink {
    pub fn format_line(label: &str, line: &str) -> String {
        format!("{label}: {line}")
    }
}

impl LineSink for StdoutSink {
    fn emit(&self, label: &str, line: &str) {
        let text = Self::format_line(label, line);
        let mut stdout = STDOUT_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writeln!(stdout, "{text}").and_then(|_| stdout.flush()) {
            tracing::error!("Failed to write output for {}: {}", label, e);
        }
    }
}

/// Keeps every emitted line in memory, in emission order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    lines: Mutex<Vec<(String, String)>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All `(label, line)` pairs emitted so far.
    pub fn lines(&self) -> Vec<(String, String)> {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Lines emitted under `label`, in order.
    pub fn lines_for(&self, label: &str) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|(l, _)| l == label)
            .map(|(_, line)| line.clone())
            .collect()
    }
}

impl LineSink for CollectingSink {
    fn emit(&self, label: &str, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((label.to_string(), line.to_string()));
    }
}
