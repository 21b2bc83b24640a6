//! Pipeline domain model

use crate::actions::Action;
use crate::core::state::{ActionState, ExecutionStatus, PipelineState};

/// An ordered sequence of actions and the state of their run
pub struct Pipeline {
    /// Pipeline name
    pub name: String,

    /// Actions, executed in order
    actions: Vec<Box<dyn Action>>,

    /// State of each action, parallel to `actions`
    action_states: Vec<ActionState>,

    /// Execution state
    pub state: PipelineState,
}

impl Pipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
            action_states: Vec::new(),
            state: PipelineState::new(),
        }
    }

    /// Append an action
    pub fn push(&mut self, action: Box<dyn Action>) {
        self.actions.push(action);
        self.action_states.push(ActionState::Pending);
    }

    pub fn with_action(mut self, action: impl Action + 'static) -> Self {
        self.push(Box::new(action));
        self
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn action(&self, index: usize) -> Option<&dyn Action> {
        self.actions.get(index).map(|a| a.as_ref())
    }

    /// Action names in execution order
    pub fn action_names(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.name()).collect()
    }

    pub fn action_state(&self, index: usize) -> Option<&ActionState> {
        self.action_states.get(index)
    }

    pub fn action_states(&self) -> &[ActionState] {
        &self.action_states
    }

    pub(crate) fn set_action_state(&mut self, index: usize, state: ActionState) {
        if let Some(slot) = self.action_states.get_mut(index) {
            *slot = state;
        }
        self.state.update_counts(&self.action_states);
    }

    /// Check if every action reached a terminal state
    pub fn is_complete(&self) -> bool {
        self.action_states.iter().all(|s| s.is_terminal())
    }

    /// Check if pipeline has failed
    pub fn has_failed(&self) -> bool {
        self.state.status == ExecutionStatus::Failed
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("actions", &self.action_names())
            .field("action_states", &self.action_states)
            .field("state", &self.state)
            .finish()
    }
}
