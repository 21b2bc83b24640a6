//! Main execution engine - runs a pipeline's actions in order

use crate::{
    actions::ActionError,
    core::{ActionContext, ActionState, ExecutionStatus, Pipeline},
};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Events that can occur during pipeline execution
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    PipelineStarted {
        execution_id: Uuid,
        pipeline_name: String,
        total_actions: usize,
    },
    ActionStarted {
        index: usize,
        action: String,
    },
    ActionCompleted {
        index: usize,
        action: String,
        elapsed: Duration,
    },
    ActionFailed {
        index: usize,
        action: String,
        error: String,
    },
    ActionSkipped {
        index: usize,
        action: String,
    },
    PipelineCompleted {
        execution_id: Uuid,
        status: ExecutionStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(ExecutionEvent) + Send + Sync>;

/// Error types for a pipeline run
#[derive(Debug, Error)]
pub enum RunError {
    #[error("action {index} ({action}) failed: {source}")]
    ActionFailed {
        index: usize,
        action: String,
        #[source]
        source: ActionError,
    },

    #[error("pipeline {0} has already been executed")]
    AlreadyExecuted(String),
}

impl RunError {
    /// The action failure that halted the run, if any
    pub fn action_error(&self) -> Option<&ActionError> {
        match self {
            RunError::ActionFailed { source, .. } => Some(source),
            RunError::AlreadyExecuted(_) => None,
        }
    }
}

/// Main pipeline execution engine
///
/// Actions run one at a time in pipeline order. The first failure halts the
/// run and every action after it is marked skipped.
#[derive(Default)]
pub struct ExecutionEngine {
    event_handlers: Mutex<Vec<EventHandler>>,
}

impl ExecutionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&self, handler: F)
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        if let Ok(mut handlers) = self.event_handlers.lock() {
            handlers.push(Arc::new(handler));
        }
    }

    /// Emit an event to all handlers
    fn emit_event(&self, event: ExecutionEvent) {
        let handlers = match self.event_handlers.lock() {
            Ok(handlers) => handlers.clone(),
            Err(_) => return,
        };
        for handler in handlers.iter() {
            handler(event.clone());
        }
    }

    /// Execute the entire pipeline
    pub async fn execute(&self, pipeline: &mut Pipeline, ctx: &ActionContext) -> Result<(), RunError> {
        if pipeline.state.status != ExecutionStatus::Pending {
            return Err(RunError::AlreadyExecuted(pipeline.name.clone()));
        }

        let execution_id = pipeline.state.execution_id;
        info!("Starting pipeline execution: {} ({})", pipeline.name, execution_id);
        pipeline.state.start(pipeline.len());
        self.emit_event(ExecutionEvent::PipelineStarted {
            execution_id,
            pipeline_name: pipeline.name.clone(),
            total_actions: pipeline.len(),
        });

        let mut failure = None;
        for index in 0..pipeline.len() {
            let name = match pipeline.action(index) {
                Some(action) => action.name().to_string(),
                None => break,
            };

            if failure.is_some() {
                pipeline.set_action_state(
                    index,
                    ActionState::Skipped {
                        reason: "an earlier action failed".to_string(),
                    },
                );
                self.emit_event(ExecutionEvent::ActionSkipped {
                    index,
                    action: name,
                });
                continue;
            }

            if let Err(err) = self.execute_action(pipeline, index, &name, ctx).await {
                failure = Some(RunError::ActionFailed {
                    index,
                    action: name,
                    source: err,
                });
            }
        }

        let status = match failure {
            Some(_) => {
                pipeline.state.fail();
                ExecutionStatus::Failed
            }
            None => {
                pipeline.state.complete();
                ExecutionStatus::Completed
            }
        };

        info!("Pipeline execution finished: {} - {:?}", pipeline.name, status);
        self.emit_event(ExecutionEvent::PipelineCompleted {
            execution_id,
            status,
        });

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Execute a single action and record its state
    async fn execute_action(
        &self,
        pipeline: &mut Pipeline,
        index: usize,
        name: &str,
        ctx: &ActionContext,
    ) -> Result<(), ActionError> {
        let started_at = chrono::Utc::now();
        pipeline.set_action_state(index, ActionState::Running { started_at });
        self.emit_event(ExecutionEvent::ActionStarted {
            index,
            action: name.to_string(),
        });

        let timer = Instant::now();
        let result = match pipeline.action(index) {
            Some(action) => action.execute(ctx).await,
            None => Ok(()),
        };

        match result {
            Ok(()) => {
                pipeline.set_action_state(
                    index,
                    ActionState::Completed {
                        started_at,
                        completed_at: chrono::Utc::now(),
                    },
                );
                self.emit_event(ExecutionEvent::ActionCompleted {
                    index,
                    action: name.to_string(),
                    elapsed: timer.elapsed(),
                });
                Ok(())
            }
            Err(err) => {
                error!("Action {} failed: {}", name, err);
                pipeline.set_action_state(
                    index,
                    ActionState::Failed {
                        error: err.to_string(),
                        started_at,
                        failed_at: chrono::Utc::now(),
                    },
                );
                self.emit_event(ExecutionEvent::ActionFailed {
                    index,
                    action: name.to_string(),
                    error: err.to_string(),
                });
                if index + 1 < pipeline.len() {
                    warn!("Halting pipeline, {} action(s) will be skipped", pipeline.len() - index - 1);
                }
                Err(err)
            }
        }
    }
}
