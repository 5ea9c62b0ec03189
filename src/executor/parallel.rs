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

//! Run coordinator: one relay execution per node or deployment slot.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::node::Node;
use crate::template::{CommandTemplate, DeployParams, SubstitutionContext, TemplateError};
use crate::topology::Topology;

use super::environment::ExecEnvironment;
use super::monitor::{MonitorOutcome, OutputMonitor, MONITOR_FAILURE_EXIT_CODE};
use super::output_sync::{LineSink, StdoutSink};
use super::relay::{RemoteShell, SshRelay};
use super::result_types::{ExecutionResult, NodeFailure};
use super::spawn::{run_interactive, spawn_piped, InteractiveExit, PipedProcess};

/// Pause between consecutive launches so the head node is not hit by every
/// connection at once.
pub const DEFAULT_LAUNCH_DELAY: Duration = Duration::from_millis(100);

/// A fully resolved command bound to its target.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PlannedExecution {
    label: String,
    node: Node,
    script: String,
}

enum Launched {
    Running {
        label: String,
        node: Node,
        handle: JoinHandle<MonitorOutcome>,
    },
    Failed(ExecutionResult),
}

/// Fans a command out over a [`Topology`].
pub struct ClusterRunner {
    topology: Topology,
    shell: Arc<dyn RemoteShell>,
    sink: Arc<dyn LineSink>,
    launch_delay: Duration,
    timeout: Option<Duration>,
}

impl ClusterRunner {
    /// Runner relaying through the topology's head node and printing to stdout.
    pub fn new(topology: Topology, env: ExecEnvironment) -> Self {
        let shell = Arc::new(SshRelay::new(topology.head_node.clone(), env));
        Self {
            topology,
            shell,
            sink: Arc::new(StdoutSink),
            launch_delay: DEFAULT_LAUNCH_DELAY,
            timeout: None,
        }
    }

    /// Replace how target shells are reached.
    pub fn with_shell(mut self, shell: Arc<dyn RemoteShell>) -> Self {
        self.shell = shell;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn LineSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_launch_delay(mut self, launch_delay: Duration) -> Self {
        self.launch_delay = launch_delay;
        self
    }

    /// Per-node timeout; `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Run `template` once per physical node.
    ///
    /// Interactive delivery shares the caller's terminal, so nodes run one
    /// after another; otherwise every node runs concurrently with prefixed
    /// output. Results are in node order.
    pub async fn run_broadcast(
        &self,
        template: &CommandTemplate,
        interactive: bool,
    ) -> Result<Vec<ExecutionResult>, TemplateError> {
        let plan = self
            .topology
            .nodes
            .iter()
            .map(|node| {
                let ctx = SubstitutionContext::for_node(node, 0);
                Ok(PlannedExecution {
                    label: node.to_string(),
                    node: node.clone(),
                    script: template.resolve(&ctx)?.script(),
                })
            })
            .collect::<Result<Vec<_>, TemplateError>>()?;

        if interactive {
            Ok(self.execute_interactive(plan).await)
        } else {
            Ok(self.execute_piped(plan).await)
        }
    }

    /// Run `template` once per deployment slot with slot-indexed parameters.
    ///
    /// Always uses piped, monitored delivery. Results are in slot order.
    pub async fn run_deployment(
        &self,
        template: &CommandTemplate,
        params: &DeployParams,
    ) -> Result<Vec<ExecutionResult>, TemplateError> {
        params.validate(self.topology.deploy_slots.len())?;

        let plan = self
            .topology
            .deploy_slots
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let slot = i + 1;
                let ctx = SubstitutionContext::for_slot(node, slot, params);
                Ok(PlannedExecution {
                    label: Topology::slot_label(slot, node),
                    node: node.clone(),
                    script: template.resolve(&ctx)?.script(),
                })
            })
            .collect::<Result<Vec<_>, TemplateError>>()?;

        Ok(self.execute_piped(plan).await)
    }

    async fn execute_piped(&self, plan: Vec<PlannedExecution>) -> Vec<ExecutionResult> {
        tracing::info!("Launching {} relay execution(s)", plan.len());

        let mut launched = Vec::with_capacity(plan.len());
        for (i, planned) in plan.into_iter().enumerate() {
            if i > 0 && !self.launch_delay.is_zero() {
                tokio::time::sleep(self.launch_delay).await;
            }
            launched.push(self.launch(planned));
        }

        // join_all keeps launch order regardless of completion order.
        join_all(launched.into_iter().map(Self::collect)).await
    }

    fn launch(&self, planned: PlannedExecution) -> Launched {
        let PlannedExecution {
            label,
            node,
            script,
        } = planned;
        let cmd = self.shell.piped_command(&node);

        match spawn_piped(cmd, &label, script) {
            Ok(PipedProcess { child, output }) => {
                tracing::debug!("Started relay for {}", label);
                let monitor = OutputMonitor::new(label.clone(), Arc::clone(&self.sink))
                    .with_timeout(self.timeout);
                let handle = tokio::spawn(async move { monitor.run(output, child).await });
                Launched::Running {
                    label,
                    node,
                    handle,
                }
            }
            Err(e) => {
                tracing::warn!("{}", e);
                self.sink.emit(&label, &format!("{e}"));
                Launched::Failed(ExecutionResult::spawn_failed(label, node, e.to_string()))
            }
        }
    }

    async fn collect(launched: Launched) -> ExecutionResult {
        match launched {
            Launched::Running {
                label,
                node,
                handle,
            } => match handle.await {
                Ok(outcome) => ExecutionResult::from_outcome(label, node, outcome),
                Err(e) => {
                    tracing::error!("Monitor task failed for {}: {}", label, e);
                    ExecutionResult {
                        label,
                        node,
                        exit_code: MONITOR_FAILURE_EXIT_CODE,
                        failure: Some(NodeFailure::Monitor(format!(
                            "monitor task failed: {e}"
                        ))),
                    }
                }
            },
            Launched::Failed(result) => result,
        }
    }

    async fn execute_interactive(&self, plan: Vec<PlannedExecution>) -> Vec<ExecutionResult> {
        let mut results = Vec::with_capacity(plan.len());

        for PlannedExecution {
            label,
            node,
            script,
        } in plan
        {
            self.sink.emit(&label, &format!("{script} -->"));
            let cmd = self.shell.interactive_command(&node, &script);

            let result = match run_interactive(cmd, &label, self.timeout).await {
                Ok(InteractiveExit::Exited(code)) => ExecutionResult::completed(label, node, code),
                Ok(InteractiveExit::TimedOut) => ExecutionResult::timed_out(label, node),
                Err(e) => {
                    tracing::warn!("{}", e);
                    self.sink.emit(&label, &format!("{e}"));
                    ExecutionResult::spawn_failed(label, node, e.to_string())
                }
            };
            results.push(result);
        }

        results
    }
}
