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

//! Node resolution and topology construction.

use anyhow::{bail, Context, Result};
use std::time::Duration;

use crate::executor::{ExecEnvironment, DEFAULT_LAUNCH_DELAY};
use crate::node::{current_username, Node};
use crate::topology::Topology;

use super::types::{ClusterConfig, NodeConfig};
use super::utils::expand_env_vars;

impl ClusterConfig {
    /// The head node, with environment variables expanded.
    pub fn head_node(&self) -> Result<String> {
        let head = self
            .head_node
            .as_deref()
            .map(expand_env_vars)
            .unwrap_or_default();
        if head.trim().is_empty() {
            bail!("Configuration does not name a head_node");
        }
        Ok(head.trim().to_string())
    }

    /// Resolve the physical node list, in configuration order.
    pub fn resolve_nodes(&self) -> Result<Vec<Node>> {
        self.resolve_list(&self.nodes)
    }

    /// Resolve the deployment slot list, defaulting to the node list.
    pub fn resolve_deploy_slots(&self) -> Result<Vec<Node>> {
        match &self.deploy_nodes {
            Some(slots) => self.resolve_list(slots),
            None => self.resolve_nodes(),
        }
    }

    /// Build the full topology. Fails when there is no head node or no nodes.
    pub fn topology(&self) -> Result<Topology> {
        let head_node = self.head_node()?;
        let nodes = self.resolve_nodes()?;
        if nodes.is_empty() {
            bail!("Configuration lists no nodes");
        }
        let deploy_slots = self.resolve_deploy_slots()?;

        Ok(Topology::new(head_node, nodes).with_deploy_slots(deploy_slots))
    }

    /// Relay client settings derived from the configuration and the caller's
    /// home directory.
    pub fn exec_environment(&self) -> ExecEnvironment {
        let mut env = ExecEnvironment::detect().with_x11_forwarding(self.x11_forwarding);
        if let Some(display) = &self.display {
            env = env.with_display(Some(display.clone()));
        }
        if let Some(program) = &self.ssh_program {
            env = env.with_ssh_program(expand_env_vars(program));
        }
        env
    }

    pub fn launch_delay(&self) -> Duration {
        self.launch_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_LAUNCH_DELAY)
    }

    fn default_user(&self) -> String {
        self.user
            .as_deref()
            .map(expand_env_vars)
            .unwrap_or_else(current_username)
    }

    fn resolve_list(&self, entries: &[NodeConfig]) -> Result<Vec<Node>> {
        let default_user = self.default_user();

        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let node = match entry {
                    NodeConfig::Simple(raw) => {
                        Node::parse(&expand_env_vars(raw), Some(&default_user))
                    }
                    NodeConfig::Detailed { host, user } => {
                        let user = user
                            .as_deref()
                            .map(expand_env_vars)
                            .unwrap_or_else(|| default_user.clone());
                        Node::parse(&expand_env_vars(host), Some(&user))
                    }
                };
                node.with_context(|| format!("Invalid node entry #{}", i + 1))
            })
            .collect()
    }
}
