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

//! Shell quoting for the two relay hops.
//!
//! A relayed command is interpreted by two shells: the head node's login
//! shell parses the argument the local `ssh` forwards, and the target node's
//! login shell parses what the head node's `ssh` forwards. Everything that
//! must survive both layers is built here. Command text itself is trusted
//! operator input; quoting preserves it, it does not sanitize it.

/// Escape a value for use inside single quotes.
///
/// Replaces `'` with `'\''` (close quote, escaped quote, reopen quote).
pub fn escape_single_quote_content(value: &str) -> String {
    value.replace('\'', "'\\''")
}

/// Quote one word for a POSIX shell.
///
/// Words made only of characters no shell treats specially are returned
/// unchanged; everything else is single-quoted.
pub fn quote_arg(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }

    let plain = arg
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c));
    if plain {
        return arg.to_string();
    }

    format!("'{}'", escape_single_quote_content(arg))
}

/// Command line the head node runs to reach `destination`.
///
/// `remote_command` is already quoted for the target shell.
pub fn relay_hop(flag: &str, destination: &str, remote_command: &str) -> String {
    format!("ssh {flag} {} {remote_command}", quote_arg(destination))
}

/// Target-side command for interactive delivery: `sh -c '<command>'`, quoted
/// once more so the head node's shell hands it to `ssh` as a single word.
pub fn interactive_remote_command(command: &str) -> String {
    quote_arg(&format!("sh -c {}", quote_arg(command)))
}
