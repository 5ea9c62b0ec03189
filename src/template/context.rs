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

//! Substitution contexts for command templates.

use std::collections::BTreeMap;
use std::fmt;

use crate::node::Node;

use super::error::TemplateError;

/// Immutable mapping from placeholder name to its rendered value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionContext {
    values: BTreeMap<String, String>,
}

impl SubstitutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in keys for one node: `host`, `user` and `node`.
    ///
    /// Broadcast runs use index 0; deployment slots are 1-based.
    pub fn for_node(node: &Node, index: usize) -> Self {
        Self::new()
            .with("host", &node.host)
            .with("user", &node.user)
            .with("node", index)
    }

    /// Context for deployment slot `slot` (1-based), including one value from
    /// every user parameter array.
    pub fn for_slot(node: &Node, slot: usize, params: &DeployParams) -> Self {
        let mut ctx = Self::for_node(node, slot);
        for (name, values) in params.iter() {
            if let Some(value) = slot.checked_sub(1).and_then(|i| values.get(i)) {
                ctx.values.insert(name.to_string(), value.clone());
            }
        }
        ctx
    }

    pub fn with(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.values.insert(key.into(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// User-supplied per-slot parameter arrays for deployment runs.
///
/// Each array is indexed by 1-based slot position and must have at least as
/// many entries as there are deployment slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployParams {
    arrays: BTreeMap<String, Vec<String>>,
}

impl DeployParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<I, S>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arrays
            .insert(name.into(), values.into_iter().map(Into::into).collect());
    }

    pub fn with<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(name, values);
        self
    }

    /// Parse a `NAME=V1,V2,...` command line argument.
    pub fn parse_arg(arg: &str) -> Result<(String, Vec<String>), String> {
        let (name, values) = arg
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=V1,V2,... but got '{arg}'"))?;
        let name = name.trim();
        if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(format!("invalid parameter name '{name}'"));
        }
        Ok((
            name.to_string(),
            values.split(',').map(|v| v.to_string()).collect(),
        ))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.arrays
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Check that every array covers `slots` deployment slots.
    pub fn validate(&self, slots: usize) -> Result<(), TemplateError> {
        for (name, values) in &self.arrays {
            if values.len() < slots {
                return Err(TemplateError::ParameterTooShort {
                    name: name.clone(),
                    len: values.len(),
                    slots,
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<(String, Vec<String>)> for DeployParams {
    fn from_iter<T: IntoIterator<Item = (String, Vec<String>)>>(iter: T) -> Self {
        Self {
            arrays: iter.into_iter().collect(),
        }
    }
}
