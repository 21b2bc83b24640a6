//! Test: Halt on failure - the first failing action stops the pipeline

use crate::helpers::*;
use provision::actions::{ActionError, CommandAction, CommandTarget, CreateClusterAction};
use provision::core::{ExecutionStatus, Pipeline};
use provision::execution::ExecutionEvent;
use provision::node::NodeRole;

fn command(name: &str, program: &str) -> CommandAction {
    CommandAction::new(name, program, vec![])
}

/// Every action runs once, in order
#[tokio::test]
async fn test_success_chain() {
    let fixture = ClusterFixture::healthy();
    let pipeline = Pipeline::new("byoh-cluster")
        .with_action(command("prepare", "true"))
        .with_action(CreateClusterAction::new("2", "1", "10.0.0.5", "v1.22.4"))
        .with_action(command("inspect", "kubectl").with_target(CommandTarget::All));

    let result = run_pipeline(pipeline, &fixture).await;

    assert!(result.result.is_ok());
    assert!(result.is_success());
    for index in 0..3 {
        assert_action_completed(&result, index);
    }
    assert_eq!(
        result.started_actions(),
        vec!["prepare", "create-cluster", "inspect"]
    );

    // prepare and create-cluster on cp-1, inspect on both nodes
    let nodes: Vec<String> = fixture.commands().into_iter().map(|(node, _)| node).collect();
    assert_eq!(nodes, vec!["cp-1", "cp-1", "cp-1", "worker-1"]);

    // Three phases, each ending successfully exactly once
    let ends: Vec<StatusCall> = fixture
        .status_calls()
        .into_iter()
        .filter(|c| matches!(c, StatusCall::End(_)))
        .collect();
    assert_eq!(ends, vec![StatusCall::End(true); 3]);
}

/// A failed cluster creation skips everything after it
#[tokio::test]
async fn test_failure_halts_pipeline() {
    let fixture = ClusterFixture::empty().with_node(|log| {
        MockNode::new("cp-1", NodeRole::ControlPlane, log).failing(1, "the server is unavailable")
    });
    let pipeline = Pipeline::new("byoh-cluster")
        .with_action(CreateClusterAction::new("2", "1", "10.0.0.5", "v1.22.4"))
        .with_action(command("wait", "kubectl"));

    let result = run_pipeline(pipeline, &fixture).await;

    assert!(result.is_failed());
    assert!(matches!(result.action_error(), Some(ActionError::Exec { .. })));
    assert_action_failed(&result, 0, "failed to create cluster");
    assert_action_skipped(&result, 1);
    assert_eq!(result.started_actions(), vec!["create-cluster"]);
    assert_eq!(fixture.commands().len(), 1);

    assert!(result
        .events
        .iter()
        .any(|e| matches!(e, ExecutionEvent::ActionSkipped { index: 1, .. })));
    assert!(matches!(
        result.events.last(),
        Some(ExecutionEvent::PipelineCompleted {
            status: ExecutionStatus::Failed,
            ..
        })
    ));
}

/// A lookup failure in the first action leaves no commands behind
#[tokio::test]
async fn test_empty_cluster_runs_nothing() {
    let fixture = ClusterFixture::empty();
    let pipeline = Pipeline::new("byoh-cluster")
        .with_action(CreateClusterAction::new("2", "1", "10.0.0.5", "v1.22.4"))
        .with_action(command("wait", "kubectl"));

    let result = run_pipeline(pipeline, &fixture).await;

    assert!(result.is_failed());
    assert_action_failed(&result, 0, "no nodes found for cluster byoh-cluster");
    assert_action_skipped(&result, 1);
    assert!(fixture.commands().is_empty());
    assert_eq!(fixture.status_calls().last(), Some(&StatusCall::End(false)));
}

/// A command on every node stops at the first node that fails
#[tokio::test]
async fn test_command_on_all_nodes_stops_at_first_failure() {
    let fixture = ClusterFixture::empty()
        .with_node(|log| MockNode::new("a-cp", NodeRole::ControlPlane, log))
        .with_node(|log| MockNode::new("b-worker", NodeRole::Worker, log).failing(2, "disk full"))
        .with_node(|log| MockNode::new("c-worker", NodeRole::Worker, log));
    let pipeline = Pipeline::new("byoh-cluster")
        .with_action(command("preflight", "true").with_target(CommandTarget::All));

    let result = run_pipeline(pipeline, &fixture).await;

    assert_action_failed(&result, 0, "failed to run preflight");
    assert_action_failed(&result, 0, "disk full");
    let nodes: Vec<String> = fixture.commands().into_iter().map(|(node, _)| node).collect();
    assert_eq!(nodes, vec!["a-cp", "b-worker"]);
}
