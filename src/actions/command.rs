//! Command action - runs an arbitrary command on cluster nodes

use crate::actions::{Action, ActionError};
use crate::core::{ActionContext, StatusPhase};
use crate::node::{first_control_plane, NodeHandle};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Which nodes a command action runs on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandTarget {
    /// The first control-plane node
    #[default]
    ControlPlane,
    /// Every node, in name order
    All,
}

/// Runs one command on the targeted nodes, stopping at the first failure
#[derive(Debug, Clone)]
pub struct CommandAction {
    name: String,
    program: String,
    args: Vec<String>,
    target: CommandTarget,
}

impl CommandAction {
    pub fn new(name: impl Into<String>, program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args,
            target: CommandTarget::default(),
        }
    }

    /// Build from a full command line, e.g. `["kubectl", "get", "nodes"]`
    pub fn from_argv(name: impl Into<String>, argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(name, program.clone(), args.to_vec()))
    }

    pub fn with_target(mut self, target: CommandTarget) -> Self {
        self.target = target;
        self
    }

    pub fn target(&self) -> CommandTarget {
        self.target
    }

    async fn targets(&self, ctx: &ActionContext) -> Result<Vec<Arc<dyn NodeHandle>>, ActionError> {
        let nodes = ctx.nodes().await?;
        match self.target {
            CommandTarget::All => Ok(nodes),
            CommandTarget::ControlPlane => first_control_plane(&nodes)
                .map(|node| vec![node])
                .ok_or(ActionError::NoControlPlaneNode(nodes.len())),
        }
    }
}

#[async_trait]
impl Action for CommandAction {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: &ActionContext) -> Result<(), ActionError> {
        let phase = StatusPhase::start(ctx.status(), &self.name);

        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        for node in self.targets(ctx).await? {
            info!(node = %node.name(), "Running {}", self.name);
            let lines = node
                .command(self.program.as_str(), &args)
                .output_lines()
                .await
                .map_err(|e| ActionError::exec(format!("failed to run {}", self.name), e))?;
            for line in lines {
                debug!(node = %node.name(), "{}", line);
            }
        }

        phase.succeed();
        Ok(())
    }
}
