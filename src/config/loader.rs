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

//! Configuration loading and priority management.

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::types::ClusterConfig;
use super::utils::expand_tilde;

/// Environment variable naming a configuration file.
pub const CONFIG_ENV_VAR: &str = "CLUSTER_RUN_CONFIG";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "cluster.yaml";

impl ClusterConfig {
    /// Load configuration from a file.
    pub async fn load(path: &Path) -> Result<Self> {
        let expanded_path = expand_tilde(path);

        let content = fs::read_to_string(&expanded_path)
            .await
            .with_context(|| format!("Failed to read configuration file at {}. Please check the path and file permissions.", expanded_path.display()))?;

        Self::from_yaml(&content).with_context(|| {
            format!(
                "Failed to parse YAML configuration file at {}",
                expanded_path.display()
            )
        })
    }

    /// Parse configuration text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Invalid cluster configuration YAML")
    }

    /// Load configuration with priority order:
    /// 1. Explicit --config path (must exist)
    /// 2. `CLUSTER_RUN_CONFIG` environment variable
    /// 3. `cluster.yaml` in the current directory
    /// 4. Platform config directory (`~/.config/cluster-run/config.yaml` on Linux)
    pub async fn load_with_priority(cli_config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = cli_config_path {
            let expanded = expand_tilde(path);
            if !expanded.exists() {
                bail!("Config file not found: {}", expanded.display());
            }
            tracing::debug!("Using explicitly specified config file: {:?}", expanded);
            return Self::load(&expanded).await;
        }

        let candidates = Self::candidate_paths();
        for candidate in &candidates {
            if candidate.exists() {
                tracing::debug!("Found config at {:?}", candidate);
                return Self::load(candidate).await;
            }
            tracing::trace!("No config at {:?}", candidate);
        }

        let tried = candidates
            .iter()
            .map(|p| format!("  - {}", p.display()))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("No configuration file found. Looked in:\n{tried}\nUse --config or set {CONFIG_ENV_VAR}.")
    }

    /// Implicit configuration locations in lookup order.
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(from_env) = env::var(CONFIG_ENV_VAR) {
            if !from_env.trim().is_empty() {
                paths.push(expand_tilde(Path::new(&from_env)));
            }
        }

        paths.push(PathBuf::from(LOCAL_CONFIG_FILE));

        if let Some(proj_dirs) = ProjectDirs::from("", "", "cluster-run") {
            paths.push(proj_dirs.config_dir().join("config.yaml"));
        }

        paths
    }
}
