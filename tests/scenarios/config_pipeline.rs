//! Test: Config pipeline - YAML config turned into a runnable pipeline

use crate::helpers::*;
use provision::core::config::ProvisionConfig;
use provision::node::NodeRole;

const CLUSTER_YAML: &str = r#"
name: "byoh-cluster"

nodes:
  - name: "cp-1"
    role: control-plane
  - name: "worker-1"
    role: worker

actions:
  - type: command
    name: "check kubectl"
    command: ["kubectl", "version", "--client"]
  - type: create-cluster
    name: "Create workload cluster"
    workers: 3
    controllers: 1
    address: "10.10.0.100"
    kubernetes_version: "v1.22.4"
"#;

/// Config actions run in order with config parameters
#[tokio::test]
async fn test_config_pipeline_runs() {
    let mut config = ProvisionConfig::from_yaml(CLUSTER_YAML).unwrap();
    config.apply_override("workers", "5").unwrap();
    let pipeline = config.to_pipeline().unwrap();

    // Mock nodes stand in for the configured transports
    let fixture = ClusterFixture::empty()
        .with_node(|log| MockNode::new("cp-1", NodeRole::ControlPlane, log))
        .with_node(|log| MockNode::new("worker-1", NodeRole::Worker, log));

    let result = run_pipeline(pipeline, &fixture).await;

    assert!(result.is_success());
    assert_eq!(
        result.started_actions(),
        vec!["check kubectl", "Create workload cluster"]
    );

    let commands = fixture.commands();
    assert_eq!(commands.len(), 2);
    assert_eq!(commands[0].1.to_string(), "kubectl version --client");

    let manifest = commands[1].1.stdin.as_deref().unwrap();
    assert!(manifest.contains("replicas: 5"));
    assert!(manifest.contains("host: 10.10.0.100"));
}

/// Strict mode turned on after loading catches bad overrides at run time
#[tokio::test]
async fn test_strict_override_fails_action() {
    let mut config = ProvisionConfig::from_yaml(CLUSTER_YAML).unwrap();
    config.apply_override("kubernetes_version", "latest").unwrap();
    config.enable_strict();
    assert!(config.validate().is_err());

    let pipeline = config.to_pipeline().unwrap();
    let fixture = ClusterFixture::healthy();
    let result = run_pipeline(pipeline, &fixture).await;

    assert_action_completed(&result, 0);
    assert_action_failed(&result, 1, "invalid kubernetes_version");
    // Only the preflight command reached a node
    assert_eq!(fixture.commands().len(), 1);
}
