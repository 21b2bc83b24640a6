//! Test: Cluster creation - manifest applied through the first control-plane node

use crate::helpers::*;
use provision::actions::create_cluster::STATUS_LABEL;
use provision::actions::{Action, ActionError, CreateClusterAction};
use provision::core::{LookupError, NodeProvider};
use provision::node::{ExecError, NodeRole};
use std::sync::Arc;

fn action() -> CreateClusterAction {
    CreateClusterAction::new("2", "1", "192.168.1.10", "1.22.4")
}

/// A healthy cluster gets exactly one kubectl apply and one successful phase
#[tokio::test]
async fn test_create_cluster_success() {
    let fixture = ClusterFixture::healthy();

    action().execute(&fixture.context()).await.unwrap();

    let commands = fixture.commands();
    assert_eq!(commands.len(), 1);
    let (node, spec) = &commands[0];
    assert_eq!(node, "cp-1");
    assert_eq!(
        spec.argv(),
        vec!["kubectl", "--kubeconfig", "/etc/kubernetes/admin.conf", "apply", "-f", "-"]
    );

    let manifest = spec.stdin.as_deref().unwrap();
    assert!(manifest.contains("kind: ByoCluster"));
    assert!(manifest.contains("host: 192.168.1.10"));
    assert!(manifest.contains("version: 1.22.4"));

    assert_eq!(
        fixture.status_calls(),
        vec![StatusCall::Start(STATUS_LABEL.to_string()), StatusCall::End(true)]
    );
}

/// Control-plane nodes are chosen by name, not by inventory position
#[tokio::test]
async fn test_first_control_plane_by_name() {
    let fixture = ClusterFixture::empty()
        .with_node(|log| MockNode::new("worker-0", NodeRole::Worker, log))
        .with_node(|log| MockNode::new("cp-b", NodeRole::ControlPlane, log))
        .with_node(|log| MockNode::new("cp-a", NodeRole::ControlPlane, log));

    action().execute(&fixture.context()).await.unwrap();

    let commands = fixture.commands();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].0, "cp-a");
}

/// An empty inventory fails the lookup before any command runs
#[tokio::test]
async fn test_no_nodes() {
    let fixture = ClusterFixture::empty();

    let err = action().execute(&fixture.context()).await.unwrap_err();

    assert!(matches!(err, ActionError::Lookup(LookupError::NoNodes(_))));
    assert!(fixture.commands().is_empty());
    assert_eq!(
        fixture.status_calls(),
        vec![StatusCall::Start(STATUS_LABEL.to_string()), StatusCall::End(false)]
    );
}

/// Provider failures surface unchanged
#[tokio::test]
async fn test_provider_failure() {
    let fixture = ClusterFixture::empty();
    let provider: Arc<dyn NodeProvider> = Arc::new(FailingProvider);
    let ctx = provision::core::ActionContext::new("byoh-cluster", provider, fixture.status.clone());

    let err = action().execute(&ctx).await.unwrap_err();

    assert!(matches!(err, ActionError::Lookup(LookupError::Provider { .. })));
    assert!(err.to_string().contains("inventory unavailable"));
    assert_eq!(fixture.status_calls().last(), Some(&StatusCall::End(false)));
}

/// Workers alone cannot host the cluster-API components
#[tokio::test]
async fn test_no_control_plane_node() {
    let fixture = ClusterFixture::empty()
        .with_node(|log| MockNode::new("worker-1", NodeRole::Worker, log))
        .with_node(|log| MockNode::new("worker-2", NodeRole::Worker, log));

    let err = action().execute(&fixture.context()).await.unwrap_err();

    assert!(matches!(err, ActionError::NoControlPlaneNode(2)));
    assert!(fixture.commands().is_empty());
    assert_eq!(fixture.status_calls().last(), Some(&StatusCall::End(false)));
}

/// A rejected manifest is wrapped as a cluster creation failure
#[tokio::test]
async fn test_kubectl_failure() {
    let fixture = ClusterFixture::empty().with_node(|log| {
        MockNode::new("cp-1", NodeRole::ControlPlane, log).failing(1, "connection refused")
    });

    let err = action().execute(&fixture.context()).await.unwrap_err();

    assert!(err.to_string().starts_with("failed to create cluster: "));
    match &err {
        ActionError::Exec { source, .. } => {
            assert!(matches!(source, ExecError::NonZeroExit { code: 1, .. }));
        }
        other => panic!("Expected exec error, got {:?}", other),
    }
    assert_eq!(fixture.commands().len(), 1);

    // Only the failed end, never a successful one
    assert_eq!(
        fixture.status_calls(),
        vec![StatusCall::Start(STATUS_LABEL.to_string()), StatusCall::End(false)]
    );
}

/// Strict mode rejects malformed values before touching any node
#[tokio::test]
async fn test_strict_rejects_bad_address() {
    let fixture = ClusterFixture::healthy();
    let action = CreateClusterAction::new("2", "1", "not an address!", "1.22.4").strict(true);

    let err = action.execute(&fixture.context()).await.unwrap_err();

    assert!(matches!(
        err,
        ActionError::InvalidParameter {
            name: "target_address",
            ..
        }
    ));
    assert!(fixture.commands().is_empty());
    assert_eq!(fixture.status_calls().last(), Some(&StatusCall::End(false)));
}
