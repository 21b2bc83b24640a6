//! provision - staged provisioning of bring-your-own-host Kubernetes clusters

pub mod actions;
pub mod cli;
pub mod core;
pub mod execution;
pub mod node;

// Re-export commonly used types
pub use actions::{Action, ActionError, CommandAction, CreateClusterAction, ManifestParams};
pub use core::{ActionContext, ExecutionStatus, NodeProvider, Pipeline, StatusPhase, StatusReporter};
pub use execution::{ExecutionEngine, ExecutionEvent, RunError};
pub use node::{ExecError, NodeHandle, NodeRole, ProcessNode, StaticInventory};
