//! Test utility functions for provision
#![allow(dead_code)]

use async_trait::async_trait;
use provision::actions::ActionError;
use provision::core::{
    ActionContext, ActionState, ExecutionStatus, LookupError, NodeProvider, Pipeline,
    StatusReporter,
};
use provision::execution::{ExecutionEngine, ExecutionEvent, RunError};
use provision::node::{
    CommandOutput, CommandSpec, ExecError, NodeHandle, NodeRole, StaticInventory,
};
use std::sync::{Arc, Mutex};

/// Commands received by mock nodes, tagged with the node name
pub type CommandLog = Arc<Mutex<Vec<(String, CommandSpec)>>>;

/// Mock node that records commands and answers with a scripted exit code
#[derive(Debug)]
pub struct MockNode {
    name: String,
    role: NodeRole,
    exit_code: i32,
    stderr: String,
    log: CommandLog,
}

impl MockNode {
    pub fn new(name: &str, role: NodeRole, log: &CommandLog) -> Self {
        Self {
            name: name.to_string(),
            role,
            exit_code: 0,
            stderr: String::new(),
            log: log.clone(),
        }
    }

    /// Every command exits with `code` and writes `stderr`
    pub fn failing(mut self, code: i32, stderr: &str) -> Self {
        self.exit_code = code;
        self.stderr = stderr.to_string();
        self
    }
}

#[async_trait]
impl NodeHandle for MockNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn role(&self) -> NodeRole {
        self.role
    }

    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput, ExecError> {
        self.log
            .lock()
            .unwrap()
            .push((self.name.clone(), command.clone()));
        Ok(CommandOutput {
            code: Some(self.exit_code),
            stdout: String::new(),
            stderr: self.stderr.clone(),
        })
    }
}

/// A status call as seen by the reporter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusCall {
    Start(String),
    End(bool),
}

/// Status reporter that records every call
#[derive(Debug, Default)]
pub struct RecordingStatus {
    calls: Mutex<Vec<StatusCall>>,
}

impl RecordingStatus {
    pub fn calls(&self) -> Vec<StatusCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl StatusReporter for RecordingStatus {
    fn start(&self, label: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(StatusCall::Start(label.to_string()));
    }

    fn end(&self, success: bool) {
        self.calls.lock().unwrap().push(StatusCall::End(success));
    }
}

/// Provider whose lookups always fail
pub struct FailingProvider;

#[async_trait]
impl NodeProvider for FailingProvider {
    async fn list_nodes(&self, cluster: &str) -> Result<Vec<Arc<dyn NodeHandle>>, LookupError> {
        Err(LookupError::Provider {
            cluster: cluster.to_string(),
            message: "inventory unavailable".to_string(),
        })
    }
}

/// Nodes, command log and status reporter for one test cluster
pub struct ClusterFixture {
    pub log: CommandLog,
    pub status: Arc<RecordingStatus>,
    inventory: StaticInventory,
}

impl ClusterFixture {
    /// A cluster with no nodes
    pub fn empty() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            status: Arc::new(RecordingStatus::default()),
            inventory: StaticInventory::new(),
        }
    }

    /// One control-plane node and one worker, all commands succeeding
    pub fn healthy() -> Self {
        let fixture = Self::empty();
        fixture
            .with_node(|log| MockNode::new("cp-1", NodeRole::ControlPlane, log))
            .with_node(|log| MockNode::new("worker-1", NodeRole::Worker, log))
    }

    pub fn with_node(mut self, build: impl FnOnce(&CommandLog) -> MockNode) -> Self {
        let node = build(&self.log);
        self.inventory.insert(Arc::new(node));
        self
    }

    pub fn context(&self) -> ActionContext {
        let provider: Arc<dyn NodeProvider> = Arc::new(self.inventory.clone());
        ActionContext::new("byoh-cluster", provider, self.status.clone())
    }

    pub fn commands(&self) -> Vec<(String, CommandSpec)> {
        self.log.lock().unwrap().clone()
    }

    pub fn status_calls(&self) -> Vec<StatusCall> {
        self.status.calls()
    }
}

/// Test result from running a pipeline
pub struct PipelineTestResult {
    pub pipeline: Pipeline,
    pub result: Result<(), RunError>,
    pub events: Vec<ExecutionEvent>,
}

impl PipelineTestResult {
    /// Check if the pipeline completed successfully
    pub fn is_success(&self) -> bool {
        matches!(self.pipeline.state.status, ExecutionStatus::Completed)
    }

    /// Check if the pipeline failed
    pub fn is_failed(&self) -> bool {
        matches!(self.pipeline.state.status, ExecutionStatus::Failed)
    }

    /// The action error that halted the run
    pub fn action_error(&self) -> Option<&ActionError> {
        self.result.as_ref().err().and_then(|e| e.action_error())
    }

    /// Names of actions that started, in order
    pub fn started_actions(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ExecutionEvent::ActionStarted { action, .. } => Some(action.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Run a pipeline against a fixture, collecting engine events
pub async fn run_pipeline(mut pipeline: Pipeline, fixture: &ClusterFixture) -> PipelineTestResult {
    let engine = ExecutionEngine::new();
    let events = Arc::new(Mutex::new(Vec::new()));
    let recorded = events.clone();
    engine.add_event_handler(move |event| recorded.lock().unwrap().push(event));

    let result = engine.execute(&mut pipeline, &fixture.context()).await;
    let events = events.lock().unwrap().clone();

    PipelineTestResult {
        pipeline,
        result,
        events,
    }
}

/// Assert an action completed
pub fn assert_action_completed(result: &PipelineTestResult, index: usize) {
    let state = result
        .pipeline
        .action_state(index)
        .unwrap_or_else(|| panic!("Action {} not found in result", index));
    assert!(
        matches!(state, ActionState::Completed { .. }),
        "Action {} should be completed, but was in state: {:?}",
        index,
        state
    );
}

/// Assert an action failed with an error containing `expected_error`
pub fn assert_action_failed(result: &PipelineTestResult, index: usize, expected_error: &str) {
    let state = result
        .pipeline
        .action_state(index)
        .unwrap_or_else(|| panic!("Action {} not found in result", index));
    match state {
        ActionState::Failed { error, .. } => assert!(
            error.contains(expected_error),
            "Action {} error:\n{}\n\ndoes not contain:\n{}",
            index,
            error,
            expected_error
        ),
        other => panic!("Action {} should have failed, but was in state: {:?}", index, other),
    }
}

/// Assert an action was skipped
pub fn assert_action_skipped(result: &PipelineTestResult, index: usize) {
    let state = result
        .pipeline
        .action_state(index)
        .unwrap_or_else(|| panic!("Action {} not found in result", index));
    assert!(
        matches!(state, ActionState::Skipped { .. }),
        "Action {} should be skipped, but was in state: {:?}",
        index,
        state
    );
}
