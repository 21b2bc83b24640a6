//! Pipeline actions - one step of bringing up a cluster each

pub mod command;
pub mod create_cluster;
pub mod manifest;

use crate::core::context::{ActionContext, LookupError};
use crate::node::ExecError;
use async_trait::async_trait;
use thiserror::Error;

pub use command::{CommandAction, CommandTarget};
pub use create_cluster::CreateClusterAction;
pub use manifest::ManifestParams;

/// Error types for action execution
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("no control-plane node among {0} provisioned nodes")]
    NoControlPlaneNode(usize),

    #[error("{context}: {source}")]
    Exec {
        context: String,
        #[source]
        source: ExecError,
    },

    #[error("invalid {name} {value:?}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },
}

impl ActionError {
    /// Wrap a command failure with a description of the stage that ran it
    pub fn exec(context: impl Into<String>, source: ExecError) -> Self {
        ActionError::Exec {
            context: context.into(),
            source,
        }
    }
}

/// One step of a provisioning pipeline
///
/// An action is built with all of its parameters before the pipeline runs
/// and is executed at most once per run. Implementations report progress
/// through the context's status reporter, opening a
/// [`StatusPhase`](crate::core::StatusPhase) before doing any work.
#[async_trait]
pub trait Action: Send + Sync {
    /// Display name used in events and logs
    fn name(&self) -> &str;

    async fn execute(&self, ctx: &ActionContext) -> Result<(), ActionError>;
}
