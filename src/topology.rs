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

use crate::node::Node;

/// Cluster layout for one run: the relay host, the physical nodes and the
/// logical deployment slots (1-indexed for substitution).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    pub head_node: String,
    pub nodes: Vec<Node>,
    pub deploy_slots: Vec<Node>,
}

impl Topology {
    /// Topology whose deployment slots mirror its nodes.
    pub fn new(head_node: impl Into<String>, nodes: Vec<Node>) -> Self {
        Self {
            head_node: head_node.into(),
            deploy_slots: nodes.clone(),
            nodes,
        }
    }

    pub fn with_deploy_slots(mut self, deploy_slots: Vec<Node>) -> Self {
        self.deploy_slots = deploy_slots;
        self
    }

    /// Label for deployment slot `slot` (1-based): `"<slot> (user@host)"`.
    pub fn slot_label(slot: usize, node: &Node) -> String {
        format!("{slot} ({node})")
    }
}
