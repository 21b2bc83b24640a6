//! Provisioned nodes and the command-execution boundary
//!
//! A [`NodeHandle`] is one machine of the cluster being provisioned. Actions
//! never create or destroy nodes; they borrow handles from the
//! [`ActionContext`](crate::core::ActionContext) and run commands on them
//! through [`NodeCommand`].

pub mod command;
pub mod inventory;
pub mod process;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use command::{CommandOutput, CommandSpec, ExecError, NodeCommand};
pub use inventory::StaticInventory;
pub use process::ProcessNode;

/// Role a node plays in the cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeRole {
    /// Hosts the cluster management components
    ControlPlane,
    Worker,
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRole::ControlPlane => write!(f, "control-plane"),
            NodeRole::Worker => write!(f, "worker"),
        }
    }
}

impl FromStr for NodeRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "control-plane" => Ok(NodeRole::ControlPlane),
            "worker" => Ok(NodeRole::Worker),
            other => Err(format!("Unknown node role: {}", other)),
        }
    }
}

/// One provisioned machine
#[async_trait]
pub trait NodeHandle: Send + Sync + fmt::Debug {
    /// Unique node identity
    fn name(&self) -> &str;

    fn role(&self) -> NodeRole;

    /// Run a command on the node and capture its outcome
    ///
    /// Implementations report a non-zero exit through `CommandOutput::code`;
    /// only failures to run the command at all are returned as errors.
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput, ExecError>;
}

impl<'n> dyn NodeHandle + 'n {
    /// Build a command to run on this node
    pub fn command(&self, program: impl Into<String>, args: &[&str]) -> NodeCommand<'_> {
        NodeCommand::new(self, CommandSpec::new(program, args))
    }

    pub fn is_control_plane(&self) -> bool {
        self.role() == NodeRole::ControlPlane
    }
}

/// Control-plane nodes, ordered by name
pub fn control_plane_nodes(nodes: &[Arc<dyn NodeHandle>]) -> Vec<Arc<dyn NodeHandle>> {
    let mut control_planes: Vec<_> = nodes
        .iter()
        .filter(|n| n.is_control_plane())
        .cloned()
        .collect();
    control_planes.sort_by(|a, b| a.name().cmp(b.name()));
    control_planes
}

/// The node cluster-wide commands are sent to
pub fn first_control_plane(nodes: &[Arc<dyn NodeHandle>]) -> Option<Arc<dyn NodeHandle>> {
    control_plane_nodes(nodes).into_iter().next()
}
