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

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use cluster_run::{
    cli::Cli,
    config::ClusterConfig,
    executor::{ClusterRunner, RunSummary, StdoutSink},
    template::CommandTemplate,
    utils::init_logging,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = ClusterConfig::load_with_priority(cli.config.as_deref())
        .await
        .context("Failed to load cluster configuration")?;
    let topology = config
        .topology()
        .context("Invalid cluster configuration")?;

    tracing::info!(
        "Relaying through {} to {} node(s), {} deployment slot(s)",
        topology.head_node,
        topology.nodes.len(),
        topology.deploy_slots.len()
    );

    let runner = ClusterRunner::new(topology, config.exec_environment())
        .with_sink(Arc::new(StdoutSink))
        .with_launch_delay(cli.launch_delay().unwrap_or_else(|| config.launch_delay()))
        .with_timeout(cli.timeout());

    let template = CommandTemplate::from(cli.command.as_str());
    let results = if cli.deploy {
        runner
            .run_deployment(&template, &cli.deploy_params())
            .await
    } else {
        runner.run_broadcast(&template, cli.interactive).await
    }
    .context("Command template could not be resolved; nothing was executed")?;

    let summary = RunSummary::from_results(&results);
    eprintln!("{}", summary.format());

    std::process::exit(summary.process_exit_code());
}
