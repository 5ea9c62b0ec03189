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

//! Configuration tests.

use serial_test::serial;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

use super::loader::CONFIG_ENV_VAR;
use super::types::{ClusterConfig, NodeConfig};
use super::utils::{expand_env_vars, expand_tilde};
use crate::node::Node;

const SAMPLE: &str = r#"
head_node: head.example.org
user: deploy
x11_forwarding: true
display: ":1"
launch_delay_ms: 250
nodes:
  - node01
  - admin@node02
  - host: node03
    user: ops
deploy_nodes:
  - node01
  - node01
  - node02
"#;

#[test]
#[serial]
fn test_expand_env_vars() {
    std::env::set_var("CLUSTER_RUN_TEST_VAR", "test_value");
    std::env::set_var("CLUSTER_RUN_TEST_USER", "testuser");

    // Test ${VAR} syntax
    assert_eq!(
        expand_env_vars("Hello ${CLUSTER_RUN_TEST_VAR}!"),
        "Hello test_value!"
    );

    // Test $VAR syntax
    assert_eq!(
        expand_env_vars("$CLUSTER_RUN_TEST_USER@host"),
        "testuser@host"
    );

    // Test mixed
    assert_eq!(
        expand_env_vars("${CLUSTER_RUN_TEST_USER}:$CLUSTER_RUN_TEST_VAR"),
        "testuser:test_value"
    );

    // Unset variables are left as-is
    assert_eq!(expand_env_vars("${CLUSTER_RUN_UNSET}"), "${CLUSTER_RUN_UNSET}");
    assert_eq!(expand_env_vars("$CLUSTER_RUN_UNSET"), "$CLUSTER_RUN_UNSET");

    // Lone or malformed dollars survive
    assert_eq!(expand_env_vars("cost: 5$"), "cost: 5$");
    assert_eq!(expand_env_vars("${not closed"), "${not closed");
    assert_eq!(expand_env_vars("no variables here"), "no variables here");

    std::env::remove_var("CLUSTER_RUN_TEST_VAR");
    std::env::remove_var("CLUSTER_RUN_TEST_USER");
}

#[test]
#[serial]
fn test_expand_tilde() {
    let original_home = std::env::var("HOME").ok();
    std::env::set_var("HOME", "/home/user");

    let expanded = expand_tilde(Path::new("~/cluster.yaml"));
    let untouched = expand_tilde(Path::new("/etc/cluster.yaml"));

    if let Some(home) = original_home {
        std::env::set_var("HOME", home);
    } else {
        std::env::remove_var("HOME");
    }

    assert_eq!(expanded, PathBuf::from("/home/user/cluster.yaml"));
    assert_eq!(untouched, PathBuf::from("/etc/cluster.yaml"));
}

#[test]
fn test_config_parsing() {
    let config = ClusterConfig::from_yaml(SAMPLE).unwrap();

    assert_eq!(config.head_node.as_deref(), Some("head.example.org"));
    assert_eq!(config.user.as_deref(), Some("deploy"));
    assert!(config.x11_forwarding);
    assert_eq!(config.nodes.len(), 3);
    assert_eq!(config.nodes[0], NodeConfig::Simple("node01".to_string()));
    assert_eq!(
        config.nodes[2],
        NodeConfig::Detailed {
            host: "node03".to_string(),
            user: Some("ops".to_string()),
        }
    );
    assert_eq!(config.deploy_nodes.as_ref().map(Vec::len), Some(3));
}

#[test]
fn test_topology_resolution() {
    let config = ClusterConfig::from_yaml(SAMPLE).unwrap();
    let topology = config.topology().unwrap();

    assert_eq!(topology.head_node, "head.example.org");
    assert_eq!(
        topology.nodes,
        vec![
            Node::new("node01", "deploy"),
            Node::new("node02", "admin"),
            Node::new("node03", "ops"),
        ]
    );
    assert_eq!(
        topology.deploy_slots,
        vec![
            Node::new("node01", "deploy"),
            Node::new("node01", "deploy"),
            Node::new("node02", "deploy"),
        ]
    );
}

#[test]
fn test_deploy_slots_default_to_nodes() {
    let config = ClusterConfig::from_yaml("head_node: h\nuser: u\nnodes: [a, b]\n").unwrap();
    let topology = config.topology().unwrap();
    assert_eq!(topology.deploy_slots, topology.nodes);
}

#[test]
fn test_missing_head_node_is_error() {
    let config = ClusterConfig::from_yaml("nodes: [a]\n").unwrap();
    let err = config.topology().unwrap_err();
    assert!(err.to_string().contains("head_node"));
}

#[test]
fn test_empty_node_list_is_error() {
    let config = ClusterConfig::from_yaml("head_node: h\n").unwrap();
    assert!(config.topology().is_err());
}

#[test]
fn test_bad_node_entry_names_position() {
    let config = ClusterConfig::from_yaml("head_node: h\nnodes: [a, 'x@']\n").unwrap();
    let err = config.topology().unwrap_err();
    assert!(err.to_string().contains("#2"));
}

#[test]
fn test_exec_environment_and_delay() {
    let config = ClusterConfig::from_yaml(SAMPLE).unwrap();
    let env = config.exec_environment();
    assert_eq!(env.forwarding_flag(), "-Y");
    assert_eq!(env.display.as_deref(), Some(":1"));
    assert_eq!(config.launch_delay(), Duration::from_millis(250));

    let plain = ClusterConfig::from_yaml("head_node: h\nnodes: [a]\n").unwrap();
    assert_eq!(plain.exec_environment().forwarding_flag(), "-T");
    assert_eq!(plain.exec_environment().display.as_deref(), Some(":0.0"));
    assert_eq!(plain.launch_delay(), Duration::from_millis(100));
}

#[test]
#[serial]
fn test_env_vars_in_hosts_and_users() {
    std::env::set_var("CLUSTER_RUN_TEST_HEAD", "gateway");
    std::env::set_var("CLUSTER_RUN_TEST_LOGIN", "svc");

    let config = ClusterConfig::from_yaml(
        "head_node: ${CLUSTER_RUN_TEST_HEAD}\nuser: $CLUSTER_RUN_TEST_LOGIN\nnodes: [n1]\n",
    )
    .unwrap();
    let topology = config.topology().unwrap();

    std::env::remove_var("CLUSTER_RUN_TEST_HEAD");
    std::env::remove_var("CLUSTER_RUN_TEST_LOGIN");

    assert_eq!(topology.head_node, "gateway");
    assert_eq!(topology.nodes, vec![Node::new("n1", "svc")]);
}

#[tokio::test]
async fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cluster.yaml");
    std::fs::write(&path, SAMPLE).unwrap();

    let config = ClusterConfig::load(&path).await.unwrap();
    assert_eq!(config.nodes.len(), 3);
}

#[tokio::test]
async fn test_load_rejects_invalid_yaml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cluster.yaml");
    std::fs::write(&path, "nodes: [unterminated\n").unwrap();

    assert!(ClusterConfig::load(&path).await.is_err());
}

#[tokio::test]
async fn test_explicit_config_must_exist() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.yaml");

    let err = ClusterConfig::load_with_priority(Some(&missing))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
#[serial]
async fn test_env_var_config_location() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("from-env.yaml");
    std::fs::write(&path, "head_node: envhead\nnodes: [a]\n").unwrap();
    std::env::set_var(CONFIG_ENV_VAR, &path);

    let candidates = ClusterConfig::candidate_paths();
    let loaded = ClusterConfig::load_with_priority(None).await;

    std::env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(candidates[0], path);
    assert_eq!(loaded.unwrap().head_node.as_deref(), Some("envhead"));
}
