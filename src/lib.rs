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

//! Fan a shell command out to every node of a cluster through a head-node
//! SSH relay, with node-prefixed streaming output and aggregated exit codes.

pub mod cli;
pub mod config;
pub mod executor;
pub mod node;
pub mod template;
pub mod topology;
pub mod utils;

pub use config::ClusterConfig;
pub use executor::{ClusterRunner, ExecEnvironment, ExecutionResult, RunSummary};
pub use node::Node;
pub use template::{CommandTemplate, DeployParams, TemplateError};
pub use topology::Topology;
