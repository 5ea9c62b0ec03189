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

//! Relay execution engine: spawning, output monitoring and aggregation.

mod aggregate;
mod environment;
mod line_buffer;
mod output_sync;
mod parallel;
mod quoting;
mod relay;
mod result_types;
mod spawn;

pub mod monitor;

// Re-export public types
pub use aggregate::{
    concat_commands, run_failed, summary_code, RunSummary, SUMMARY_FAILURE_CODE,
};
pub use environment::{ExecEnvironment, DEFAULT_DISPLAY, DEFAULT_SSH_PROGRAM};
pub use line_buffer::LineBuffer;
pub use monitor::{MonitorOutcome, OutputMonitor, ProcessHandle};
pub use output_sync::{CollectingSink, LineSink, StdoutSink};
pub use parallel::{ClusterRunner, DEFAULT_LAUNCH_DELAY};
pub use quoting::{interactive_remote_command, quote_arg, relay_hop};
pub use relay::{RemoteShell, SshRelay};
pub use result_types::{ExecutionResult, NodeFailure};
pub use spawn::{
    exit_code_of, run_interactive, spawn_piped, InteractiveExit, PipedProcess, SpawnError,
    SPAWN_FAILURE_EXIT_CODE,
};
