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

//! Relay commands: local `ssh` to the head node, which runs `ssh` to the
//! target node.

use tokio::process::Command;

use crate::node::Node;

use super::environment::ExecEnvironment;
use super::quoting::{interactive_remote_command, relay_hop};

/// Builds the local command that opens a shell on a target node.
///
/// The coordinator only needs commands; spawning, piping and reaping are
/// handled in one place regardless of how the shell is reached.
pub trait RemoteShell: Send + Sync {
    /// A command whose standard input becomes the target node's shell script.
    fn piped_command(&self, node: &Node) -> Command;

    /// A command that runs `script` on the target node as `sh -c`, sharing
    /// the caller's terminal.
    fn interactive_command(&self, node: &Node, script: &str) -> Command;
}

/// Two-hop SSH relay through the cluster's head node.
#[derive(Debug, Clone)]
pub struct SshRelay {
    head_node: String,
    env: ExecEnvironment,
}

impl SshRelay {
    pub fn new(head_node: impl Into<String>, env: ExecEnvironment) -> Self {
        Self {
            head_node: head_node.into(),
            env,
        }
    }

    pub fn head_node(&self) -> &str {
        &self.head_node
    }

    fn command(&self, node: &Node, target_command: &str) -> Command {
        let flag = self.env.forwarding_flag();
        let mut cmd = Command::new(&self.env.ssh_program);
        cmd.arg(flag)
            .arg(&self.head_node)
            .arg(relay_hop(flag, &node.destination(), target_command));
        self.env.apply(&mut cmd);
        cmd
    }
}

impl RemoteShell for SshRelay {
    fn piped_command(&self, node: &Node) -> Command {
        self.command(node, "sh")
    }

    fn interactive_command(&self, node: &Node, script: &str) -> Command {
        self.command(node, &interactive_remote_command(script))
    }
}
