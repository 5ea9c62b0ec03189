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

//! Integration tests for exit code aggregation.

mod common;

use cluster_run::executor::{
    concat_commands, run_failed, summary_code, ExecutionResult, RunSummary, SUMMARY_FAILURE_CODE,
};
use cluster_run::{Node, Topology};
use common::{local_runner, nodes, UNREACHABLE_HOST};

fn result(host: &str, exit_code: i32) -> ExecutionResult {
    ExecutionResult::completed(format!("ops@{host}"), Node::new(host, "ops"), exit_code)
}

#[test]
fn test_all_zero_is_success() {
    let summary = RunSummary::from_results(&[result("n1", 0), result("n2", 0)]);
    assert!(!summary.failed());
    assert_eq!(summary.summary_code(), 0);
    assert_eq!(summary.process_exit_code(), 0);
    assert!(summary.failed_labels.is_empty());
}

#[test]
fn test_any_nonzero_fails_the_run() {
    let results = vec![result("n1", 0), result("n2", 139), result("n3", 0)];
    let summary = RunSummary::from_results(&results);

    assert!(summary.failed());
    assert_eq!(summary.summary_code(), SUMMARY_FAILURE_CODE);
    assert_eq!(summary.process_exit_code(), 1);
    assert_eq!(summary.failed_labels, vec!["ops@n2"]);
}

#[test]
fn test_failure_code_does_not_depend_on_which_node_failed() {
    assert_eq!(summary_code(&[1, 0, 0]), summary_code(&[0, 0, 255]));
    assert_eq!(summary_code(&[0, 0, 2]), SUMMARY_FAILURE_CODE);
}

#[test]
fn test_negative_codes_count_as_failure() {
    assert!(run_failed(&[0, -1]));
}

#[test]
fn test_empty_run_succeeds() {
    let summary = RunSummary::from_results(&[]);
    assert_eq!(summary.summary_code(), 0);
    assert_eq!(summary.process_exit_code(), 0);
}

#[test]
fn test_concat_commands_skips_blank_fragments() {
    assert_eq!(
        concat_commands(&["mkdir -p /srv", "", "   ", "cd /srv"]),
        "mkdir -p /srv && cd /srv"
    );
}

#[tokio::test]
async fn test_summary_of_a_real_run() {
    let (runner, _, _) = local_runner(Topology::new(
        "head",
        nodes(&["n1", "n2", UNREACHABLE_HOST]),
    ));

    let results = runner
        .run_broadcast(&"[ %(host)s = n1 ]".into(), false)
        .await
        .unwrap();
    let summary = RunSummary::from_results(&results);

    assert_eq!(summary.exit_codes, vec![0, 1, 255]);
    assert_eq!(
        summary.failed_labels,
        vec!["ops@n2".to_string(), format!("ops@{UNREACHABLE_HOST}")]
    );
    assert_eq!(summary.process_exit_code(), 1);
    assert!(summary.format().contains("2"));
}
