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

//! Execution environment handed to every relay process.
//!
//! The X11 variables are set on each spawned command rather than on this
//! process, so concurrent or repeated runs never observe each other's state.

use directories::BaseDirs;
use std::path::{Path, PathBuf};
use tokio::process::Command;

pub const DEFAULT_SSH_PROGRAM: &str = "ssh";
pub const DEFAULT_DISPLAY: &str = ":0.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecEnvironment {
    /// Local relay binary.
    pub ssh_program: String,
    /// `-Y` on both hops when set, `-T` otherwise.
    pub forward_x11: bool,
    pub display: Option<String>,
    pub xauthority: Option<PathBuf>,
}

impl ExecEnvironment {
    /// Environment derived from the caller's home directory.
    pub fn detect() -> Self {
        let base = BaseDirs::new();
        Self::from_home(base.as_ref().map(|b| b.home_dir()))
    }

    pub fn from_home(home: Option<&Path>) -> Self {
        Self {
            ssh_program: DEFAULT_SSH_PROGRAM.to_string(),
            forward_x11: false,
            display: Some(DEFAULT_DISPLAY.to_string()),
            xauthority: home.map(|h| h.join(".Xauthority")),
        }
    }

    pub fn with_ssh_program(mut self, program: impl Into<String>) -> Self {
        self.ssh_program = program.into();
        self
    }

    pub fn with_x11_forwarding(mut self, forward: bool) -> Self {
        self.forward_x11 = forward;
        self
    }

    pub fn with_display(mut self, display: Option<String>) -> Self {
        self.display = display;
        self
    }

    /// Flag passed to `ssh` on both hops.
    pub fn forwarding_flag(&self) -> &'static str {
        if self.forward_x11 {
            "-Y"
        } else {
            "-T"
        }
    }

    /// Set `DISPLAY`/`XAUTHORITY` on a command about to be spawned.
    pub fn apply(&self, cmd: &mut Command) {
        if let Some(display) = &self.display {
            cmd.env("DISPLAY", display);
        }
        if let Some(xauthority) = &self.xauthority {
            cmd.env("XAUTHORITY", xauthority);
        }
    }
}

impl Default for ExecEnvironment {
    fn default() -> Self {
        Self::detect()
    }
}
