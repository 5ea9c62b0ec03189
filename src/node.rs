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

use anyhow::{bail, Result};
use std::fmt;

/// A cluster node reached through the head node. Identity is `(host, user)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    pub host: String,
    pub user: String,
}

impl Node {
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
        }
    }

    pub fn parse(node_str: &str, default_user: Option<&str>) -> Result<Self> {
        // Parse formats:
        // - host
        // - user@host

        let node_str = node_str.trim();
        let (user_part, host) = match node_str.split_once('@') {
            Some((user, host)) => (Some(user), host),
            None => (None, node_str),
        };

        if host.is_empty() {
            bail!("Node '{node_str}' has an empty host name");
        }
        if let Some("") = user_part {
            bail!("Node '{node_str}' has an empty user name");
        }

        let user = user_part
            .or(default_user)
            .map(|s| s.to_string())
            .unwrap_or_else(current_username);

        Ok(Node {
            host: host.to_string(),
            user,
        })
    }

    /// SSH destination for this node, `user@host`.
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.host)
    }
}

pub(crate) fn current_username() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "root".to_string())
}
