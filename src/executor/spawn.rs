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

//! Spawning relay processes.

use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use nix::fcntl::OFlag;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::unix::pipe;
use tokio::process::{Child, Command};
use tokio::time;

/// Exit code recorded for a node whose relay process never started.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 255;

#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("failed to create output pipe for {label}: {source}")]
    Pipe {
        label: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to start relay process for {label}: {source}")]
    Spawn {
        label: String,
        #[source]
        source: io::Error,
    },
}

/// A running relay process whose stdout and stderr share one pipe.
pub struct PipedProcess {
    pub child: Child,
    pub output: pipe::Receiver,
}

/// Spawn `cmd`, feed `script` to its standard input and merge its standard
/// output and standard error into a single readable stream.
pub fn spawn_piped(cmd: Command, label: &str, script: String) -> Result<PipedProcess, SpawnError> {
    let pipe_error = |source: io::Error| SpawnError::Pipe {
        label: label.to_string(),
        source,
    };

    // Close-on-exec so relays spawned concurrently for other nodes never
    // inherit this node's write end.
    let (reader, writer) =
        nix::unistd::pipe2(OFlag::O_CLOEXEC).map_err(|e| pipe_error(e.into()))?;
    let writer_for_stderr = writer.try_clone().map_err(pipe_error)?;
    let output = pipe::Receiver::from_owned_fd(reader).map_err(pipe_error)?;

    let mut cmd = cmd;
    cmd.stdin(Stdio::piped())
        .stdout(writer)
        .stderr(writer_for_stderr)
        .kill_on_drop(true);

    let spawned = cmd.spawn();
    // The command still owns our copies of the write end; release them so
    // the reader sees EOF once the child exits.
    drop(cmd);

    let mut child = spawned.map_err(|source| SpawnError::Spawn {
        label: label.to_string(),
        source,
    })?;

    if let Some(mut stdin) = child.stdin.take() {
        let label = label.to_string();
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(script.as_bytes()).await {
                tracing::warn!("Failed to send command to {}: {}", label, e);
            }
            // Dropping stdin closes the pipe; the remote shell sees EOF.
        });
    }

    Ok(PipedProcess { child, output })
}

/// How an interactive relay ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractiveExit {
    Exited(i32),
    /// Killed after exceeding its timeout.
    TimedOut,
}

/// Run `cmd` with the caller's standard streams and wait for it, killing it
/// once `timeout` elapses.
pub async fn run_interactive(
    mut cmd: Command,
    label: &str,
    timeout: Option<Duration>,
) -> Result<InteractiveExit, SpawnError> {
    cmd.stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    let spawn_error = |source: io::Error| SpawnError::Spawn {
        label: label.to_string(),
        source,
    };
    let mut child = cmd.spawn().map_err(spawn_error)?;

    let Some(limit) = timeout else {
        let status = child.wait().await.map_err(spawn_error)?;
        return Ok(InteractiveExit::Exited(exit_code_of(status)));
    };

    match time::timeout(limit, child.wait()).await {
        Ok(status) => Ok(InteractiveExit::Exited(exit_code_of(
            status.map_err(spawn_error)?,
        ))),
        Err(_) => {
            tracing::warn!(
                "{} still running after {:?}, killing relay process",
                label,
                limit
            );
            if let Err(e) = child.start_kill() {
                tracing::warn!("Failed to kill relay for {}: {}", label, e);
            }
            if let Err(e) = child.wait().await {
                tracing::warn!("Failed to reap relay for {}: {}", label, e);
            }
            Ok(InteractiveExit::TimedOut)
        }
    }
}

/// Exit code for a reaped process; signals map to `128 + signo` like a shell.
pub fn exit_code_of(status: ExitStatus) -> i32 {
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => SPAWN_FAILURE_EXIT_CODE,
    }
}
