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

//! Configuration type definitions.

use serde::{Deserialize, Serialize};

/// Cluster topology and relay settings, as read from `cluster.yaml`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ClusterConfig {
    /// Host every connection is relayed through.
    #[serde(default)]
    pub head_node: Option<String>,

    /// Default user for nodes that do not name one.
    #[serde(default)]
    pub user: Option<String>,

    /// Request trusted X11 forwarding (`-Y`) on both hops.
    #[serde(default)]
    pub x11_forwarding: bool,

    /// `DISPLAY` handed to the relay client.
    #[serde(default)]
    pub display: Option<String>,

    /// Pause between consecutive launches, in milliseconds.
    #[serde(default)]
    pub launch_delay_ms: Option<u64>,

    /// Relay client binary. Defaults to `ssh` on `PATH`.
    #[serde(default)]
    pub ssh_program: Option<String>,

    #[serde(default)]
    pub nodes: Vec<NodeConfig>,

    /// Deployment slot list; the same host may appear more than once.
    /// Falls back to `nodes` when omitted.
    #[serde(default)]
    pub deploy_nodes: Option<Vec<NodeConfig>>,
}

/// Node entry: `[user@]host` or `{host, user}`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum NodeConfig {
    Simple(String),
    Detailed {
        host: String,
        #[serde(default)]
        user: Option<String>,
    },
}
