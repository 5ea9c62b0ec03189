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

//! Reducing per-node exit codes to a single run result.

use owo_colors::OwoColorize;

use super::result_types::ExecutionResult;

/// Summary code for a run in which at least one node failed.
pub const SUMMARY_FAILURE_CODE: i32 = -1;

/// True when any exit code is non-zero.
pub fn run_failed(codes: &[i32]) -> bool {
    codes.iter().any(|&code| code != 0)
}

/// `0` when every node succeeded (including no nodes at all),
/// [`SUMMARY_FAILURE_CODE`] otherwise.
pub fn summary_code(codes: &[i32]) -> i32 {
    if run_failed(codes) {
        SUMMARY_FAILURE_CODE
    } else {
        0
    }
}

/// Join command fragments with `&&`, skipping blank ones, so the remote shell
/// stops at the first failing fragment.
pub fn concat_commands<S: AsRef<str>>(fragments: &[S]) -> String {
    fragments
        .iter()
        .map(AsRef::as_ref)
        .filter(|fragment| !fragment.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" && ")
}

/// Aggregated view of one run, in launch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub exit_codes: Vec<i32>,
    pub failed_labels: Vec<String>,
}

impl RunSummary {
    pub fn from_results(results: &[ExecutionResult]) -> Self {
        Self {
            exit_codes: results.iter().map(ExecutionResult::get_exit_code).collect(),
            failed_labels: results
                .iter()
                .filter(|r| !r.is_success())
                .map(|r| r.label.clone())
                .collect(),
        }
    }

    pub fn failed(&self) -> bool {
        run_failed(&self.exit_codes)
    }

    pub fn summary_code(&self) -> i32 {
        summary_code(&self.exit_codes)
    }

    /// Process exit status for the CLI: 0 on success, 1 otherwise.
    pub fn process_exit_code(&self) -> i32 {
        if self.failed() {
            1
        } else {
            0
        }
    }

    pub fn format(&self) -> String {
        let total = self.exit_codes.len();
        let failed = self.failed_labels.len();
        let succeeded = total - failed;

        if failed == 0 {
            format!(
                "{} {} node(s) succeeded",
                "●".green(),
                total.to_string().bold()
            )
        } else {
            format!(
                "{} {} of {} node(s) failed ({} succeeded): {}",
                "●".red(),
                failed.to_string().bold(),
                total,
                succeeded,
                self.failed_labels.join(", ").red()
            )
        }
    }
}
