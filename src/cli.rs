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

use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

use crate::template::DeployParams;

#[derive(Parser, Debug)]
#[command(
    name = "cluster-run",
    version,
    about = "Run a command on every cluster node through a head-node SSH relay",
    long_about = "cluster-run executes one shell command on every node of a cluster. Each node is reached\nthrough a two-hop SSH relay (local -> head node -> node). Output is streamed line by line,\nprefixed with the node it came from, and the exit codes of all nodes are reduced to a\nsingle success or failure.",
    after_help = "EXAMPLES:\n  Broadcast:             cluster-run \"uptime\"\n  Per-node placeholders: cluster-run \"hostname; echo %(user)s@%(host)s\"\n  Interactive:           cluster-run --interactive \"top -n 1\"\n  Deployment:            cluster-run --deploy -P port=8001,8002 \"serve --port %(port)s --rank %(node)s\""
)]
pub struct Cli {
    /// Command template. `%(host)s`, `%(user)s` and `%(node)s` are replaced
    /// per node; `%%` is a literal percent.
    pub command: String,

    #[arg(
        short = 'i',
        long,
        conflicts_with = "deploy",
        help = "Run nodes one at a time with the terminal attached instead of streaming prefixed output"
    )]
    pub interactive: bool,

    #[arg(
        short = 'd',
        long,
        help = "Run once per deployment slot (deploy_nodes) with slot-indexed parameters"
    )]
    pub deploy: bool,

    #[arg(
        short = 'P',
        long = "param",
        value_name = "NAME=V1,V2,..",
        requires = "deploy",
        value_parser = DeployParams::parse_arg,
        help = "Deployment parameter array, one comma-separated value per slot (repeatable)"
    )]
    pub params: Vec<(String, Vec<String>)>,

    #[arg(
        short = 'F',
        long,
        value_name = "FILE",
        help = "Configuration file [default: $CLUSTER_RUN_CONFIG, ./cluster.yaml, then the user config directory]"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        value_name = "SECS",
        help = "Kill a node's relay after this many seconds (exit code 124). Unlimited by default"
    )]
    pub timeout: Option<u64>,

    #[arg(
        long,
        value_name = "MS",
        help = "Pause between launches in milliseconds [default: from config, else 100]"
    )]
    pub launch_delay: Option<u64>,

    #[arg(short = 'v', long, action = ArgAction::Count, help = "Increase verbosity (-v, -vv, -vvv)")]
    pub verbose: u8,
}

impl Cli {
    pub fn deploy_params(&self) -> DeployParams {
        self.params.iter().cloned().collect()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.filter(|&secs| secs > 0).map(Duration::from_secs)
    }

    pub fn launch_delay(&self) -> Option<Duration> {
        self.launch_delay.map(Duration::from_millis)
    }
}
