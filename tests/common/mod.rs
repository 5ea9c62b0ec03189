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

//! Shared helpers for integration tests.
//!
//! Nothing here needs a real cluster: [`LocalShell`] runs the script with the
//! local `sh`, and [`FakeRelay`] installs an `ssh` stand-in that executes its
//! remote command locally, hop by hop.

#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cluster_run::executor::{CollectingSink, ExecEnvironment, RemoteShell};
use cluster_run::{ClusterRunner, Node, Topology};
use tempfile::TempDir;
use tokio::process::Command;

/// Host name whose relay can never be started.
pub const UNREACHABLE_HOST: &str = "unreachable";

/// Runs node scripts with the local `sh`.
#[derive(Default)]
pub struct LocalShell {
    spawned: AtomicUsize,
}

impl LocalShell {
    pub fn spawned(&self) -> usize {
        self.spawned.load(Ordering::SeqCst)
    }

    fn program(node: &Node) -> &'static str {
        if node.host == UNREACHABLE_HOST {
            "/nonexistent/cluster-run-relay"
        } else {
            "sh"
        }
    }
}

impl RemoteShell for LocalShell {
    fn piped_command(&self, node: &Node) -> Command {
        self.spawned.fetch_add(1, Ordering::SeqCst);
        Command::new(Self::program(node))
    }

    fn interactive_command(&self, node: &Node, script: &str) -> Command {
        self.spawned.fetch_add(1, Ordering::SeqCst);
        let mut cmd = Command::new(Self::program(node));
        cmd.arg("-c").arg(script);
        cmd
    }
}

pub fn nodes(hosts: &[&str]) -> Vec<Node> {
    hosts.iter().map(|host| Node::new(*host, "ops")).collect()
}

/// A runner over `topology` with a [`LocalShell`] and an in-memory sink.
pub fn local_runner(topology: Topology) -> (ClusterRunner, Arc<LocalShell>, Arc<CollectingSink>) {
    let shell = Arc::new(LocalShell::default());
    let sink = Arc::new(CollectingSink::new());
    let runner = ClusterRunner::new(topology, ExecEnvironment::from_home(None))
        .with_shell(shell.clone())
        .with_sink(sink.clone())
        .with_launch_delay(Duration::ZERO);
    (runner, shell, sink)
}

const FAKE_SSH: &str = r#"#!/bin/sh
# ssh FLAG DEST [COMMAND...]: run COMMAND locally, as sshd would.
here="$(cd "$(dirname "$0")" && pwd)"
flag="$1"
dest="$2"
shift 2
echo "$flag $dest" >> "$here/hops.log"
case "$dest" in
  *unreachable*)
    echo "ssh: connect to host $dest port 22: No route to host" >&2
    exit 255
    ;;
esac
PATH="$here:$PATH"
export PATH
exec sh -c "$*"
"#;

/// A temporary directory holding an executable `ssh` stand-in.
pub struct FakeRelay {
    dir: TempDir,
}

impl FakeRelay {
    pub fn install() -> Self {
        let dir = TempDir::new().unwrap();
        let ssh = dir.path().join("ssh");
        std::fs::write(&ssh, FAKE_SSH).unwrap();
        std::fs::set_permissions(&ssh, std::fs::Permissions::from_mode(0o755)).unwrap();
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn ssh_program(&self) -> PathBuf {
        self.dir.path().join("ssh")
    }

    pub fn environment(&self) -> ExecEnvironment {
        ExecEnvironment::from_home(None).with_ssh_program(self.ssh_program().to_string_lossy())
    }

    /// `FLAG DEST` for every hop taken so far, in order.
    pub fn hops(&self) -> Vec<String> {
        std::fs::read_to_string(self.dir.path().join("hops.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}
