//! Execution state models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Overall pipeline execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Pipeline has not started
    Pending,
    /// Pipeline is currently running
    Running,
    /// Every action completed successfully
    Completed,
    /// An action failed and the pipeline halted
    Failed,
}

/// State of a single action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ActionState {
    /// Action has not run yet
    Pending,
    /// Action is currently running
    Running {
        started_at: DateTime<Utc>,
    },
    /// Action completed successfully
    Completed {
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    },
    /// Action failed
    Failed {
        error: String,
        started_at: DateTime<Utc>,
        failed_at: DateTime<Utc>,
    },
    /// Action never ran because an earlier action failed
    Skipped {
        reason: String,
    },
}

impl ActionState {
    /// Check if action is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ActionState::Completed { .. } | ActionState::Failed { .. } | ActionState::Skipped { .. }
        )
    }
}

/// Overall pipeline state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    /// Unique execution ID
    pub execution_id: Uuid,

    /// Current execution status
    pub status: ExecutionStatus,

    /// When execution started
    pub started_at: Option<DateTime<Utc>>,

    /// When execution completed/failed
    pub completed_at: Option<DateTime<Utc>>,

    /// Total number of actions
    pub total_actions: usize,

    /// Number of completed actions
    pub completed_actions: usize,

    /// Number of failed actions
    pub failed_actions: usize,
}

impl PipelineState {
    /// Create a new pipeline state
    pub fn new() -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            status: ExecutionStatus::Pending,
            started_at: None,
            completed_at: None,
            total_actions: 0,
            completed_actions: 0,
            failed_actions: 0,
        }
    }

    /// Mark pipeline as started
    pub fn start(&mut self, total_actions: usize) {
        self.status = ExecutionStatus::Running;
        self.started_at = Some(Utc::now());
        self.total_actions = total_actions;
    }

    /// Mark pipeline as completed
    pub fn complete(&mut self) {
        self.status = ExecutionStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Mark pipeline as failed
    pub fn fail(&mut self) {
        self.status = ExecutionStatus::Failed;
        self.completed_at = Some(Utc::now());
    }

    /// Recount completed and failed actions
    pub fn update_counts(&mut self, actions: &[ActionState]) {
        self.total_actions = actions.len();
        self.completed_actions = actions
            .iter()
            .filter(|s| matches!(s, ActionState::Completed { .. }))
            .count();
        self.failed_actions = actions
            .iter()
            .filter(|s| matches!(s, ActionState::Failed { .. }))
            .count();
    }

    /// Calculate progress percentage (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.total_actions == 0 {
            return 0.0;
        }
        (self.completed_actions + self.failed_actions) as f64 / self.total_actions as f64
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}
