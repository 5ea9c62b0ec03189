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

//! Result types for cluster runs.

use crate::node::Node;

use super::monitor::{MonitorOutcome, TIMEOUT_EXIT_CODE};
use super::spawn::SPAWN_FAILURE_EXIT_CODE;

/// Why a node produced a synthetic exit code instead of its command's own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeFailure {
    /// The local relay process could not be started.
    Spawn(String),
    /// The node exceeded its timeout and was killed.
    TimedOut,
    /// Output could not be read, the process could not be reaped, or the
    /// monitoring task died.
    Monitor(String),
}

/// Result of executing a command on a single node or deployment slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Prefix used for this execution's output lines.
    pub label: String,
    pub node: Node,
    pub exit_code: i32,
    pub failure: Option<NodeFailure>,
}

impl ExecutionResult {
    pub fn completed(label: String, node: Node, exit_code: i32) -> Self {
        Self {
            label,
            node,
            exit_code,
            failure: None,
        }
    }

    pub fn spawn_failed(label: String, node: Node, reason: impl Into<String>) -> Self {
        Self {
            label,
            node,
            exit_code: SPAWN_FAILURE_EXIT_CODE,
            failure: Some(NodeFailure::Spawn(reason.into())),
        }
    }

    pub fn timed_out(label: String, node: Node) -> Self {
        Self {
            label,
            node,
            exit_code: TIMEOUT_EXIT_CODE,
            failure: Some(NodeFailure::TimedOut),
        }
    }

    pub fn from_outcome(label: String, node: Node, outcome: MonitorOutcome) -> Self {
        let failure = match (outcome.timed_out, outcome.error) {
            (_, Some(error)) => Some(NodeFailure::Monitor(error)),
            (true, None) => Some(NodeFailure::TimedOut),
            (false, None) => None,
        };
        Self {
            label,
            node,
            exit_code: outcome.exit_code,
            failure,
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn get_exit_code(&self) -> i32 {
        self.exit_code
    }
}
