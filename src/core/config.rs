//! Provisioning configuration from YAML

use crate::actions::{Action, CommandAction, CommandTarget, CreateClusterAction, ManifestParams};
use crate::core::Pipeline;
use crate::node::{NodeRole, ProcessNode, StaticInventory};
use anyhow::{Context, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// Create-cluster parameters that `apply_override` accepts
pub const OVERRIDE_KEYS: &[&str] = &["workers", "controllers", "address", "kubernetes_version"];

/// Top-level provisioning configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionConfig {
    /// Cluster name
    pub name: String,

    /// Default command timeout for nodes (in seconds)
    #[serde(default)]
    pub default_timeout_secs: Option<u64>,

    /// Nodes already provisioned for the cluster
    pub nodes: Vec<NodeConfig>,

    /// Actions, run in order
    pub actions: Vec<ActionConfig>,
}

/// Node configuration as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Unique node name
    pub name: String,

    pub role: NodeRole,

    /// How commands reach the node
    #[serde(default)]
    pub transport: TransportConfig,

    /// Command timeout for this node (overrides global)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// How commands reach a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TransportConfig {
    /// Run on this machine
    #[default]
    Local,
    /// `docker exec` into a container (named after the node unless set)
    Docker {
        #[serde(default)]
        container: Option<String>,
    },
    /// Run over ssh
    Ssh {
        host: String,
        #[serde(default)]
        user: Option<String>,
    },
}

/// Action configuration, tagged by `type`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ActionConfig {
    CreateCluster(CreateClusterConfig),
    Command(CommandConfig),
}

/// Create-cluster action configuration
///
/// Replica counts may be YAML integers. Address and version must be strings
/// so their text reaches the manifest unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClusterConfig {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    #[serde(deserialize_with = "replica_string")]
    pub workers: String,

    #[serde(deserialize_with = "replica_string")]
    pub controllers: String,

    /// Control-plane endpoint address
    #[serde(deserialize_with = "text_string")]
    pub address: String,

    #[serde(deserialize_with = "text_string")]
    pub kubernetes_version: String,

    /// Validate parameters before applying
    #[serde(default)]
    pub strict: bool,
}

/// Command action configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandConfig {
    pub name: String,

    /// Program followed by its arguments
    pub command: Vec<String>,

    #[serde(default)]
    pub target: CommandTarget,
}

/// Replica counts: YAML strings, or integers written out in decimal
fn replica_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) if n.is_u64() || n.is_i64() => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a replica count, got {:?}",
            other
        ))),
    }
}

/// Addresses and versions must be YAML strings
///
/// An unquoted `1.20` parses as a float and would come back as `1.2`.
fn text_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Err(D::Error::custom(format!(
            "numeric value {} must be quoted to keep its exact text",
            n
        ))),
        other => Err(D::Error::custom(format!(
            "expected a string, got {:?}",
            other
        ))),
    }
}

impl CreateClusterConfig {
    pub fn params(&self) -> ManifestParams {
        ManifestParams::new(
            self.workers.clone(),
            self.controllers.clone(),
            self.address.clone(),
            self.kubernetes_version.clone(),
        )
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("create-cluster")
    }
}

impl ActionConfig {
    /// Build the action this configuration describes
    pub fn build(&self) -> Result<Box<dyn Action>> {
        match self {
            ActionConfig::CreateCluster(c) => Ok(Box::new(
                CreateClusterAction::from_params(c.params())
                    .with_name(c.display_name())
                    .strict(c.strict),
            )),
            ActionConfig::Command(c) => {
                let action = CommandAction::from_argv(&c.name, &c.command)
                    .with_context(|| format!("Action '{}' has an empty command", c.name))?;
                Ok(Box::new(action.with_target(c.target)))
            }
        }
    }
}

impl NodeConfig {
    /// Build a node handle, falling back to `default_timeout_secs`
    pub fn to_node(&self, default_timeout_secs: Option<u64>) -> ProcessNode {
        let node = match &self.transport {
            TransportConfig::Local => ProcessNode::local(&self.name, self.role),
            TransportConfig::Docker { container } => ProcessNode::docker(
                &self.name,
                container.as_deref().unwrap_or(&self.name),
                self.role,
            ),
            TransportConfig::Ssh { host, user } => {
                let destination = match user {
                    Some(user) => format!("{}@{}", user, host),
                    None => host.clone(),
                };
                ProcessNode::ssh(&self.name, destination, self.role)
            }
        };

        match self.timeout_secs.or(default_timeout_secs) {
            Some(secs) => node.with_timeout(secs),
            None => node,
        }
    }
}

impl ProvisionConfig {
    /// Load provisioning configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse provisioning configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ProvisionConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the provisioning configuration
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            anyhow::bail!("Cluster '{}' has no nodes", self.name);
        }

        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(&node.name) {
                anyhow::bail!("Duplicate node name: {}", node.name);
            }
        }

        if self.actions.is_empty() {
            anyhow::bail!("Cluster '{}' has no actions", self.name);
        }

        let has_control_plane = self.nodes.iter().any(|n| n.role == NodeRole::ControlPlane);
        for action in &self.actions {
            match action {
                ActionConfig::CreateCluster(c) => {
                    if !has_control_plane {
                        anyhow::bail!(
                            "Action '{}' needs a control-plane node but none is configured",
                            c.display_name()
                        );
                    }
                    if c.strict {
                        c.params()
                            .validate()
                            .with_context(|| format!("Action '{}' is invalid", c.display_name()))?;
                    }
                }
                ActionConfig::Command(c) => {
                    if c.command.is_empty() {
                        anyhow::bail!("Action '{}' has an empty command", c.name);
                    }
                    if c.target == CommandTarget::ControlPlane && !has_control_plane {
                        anyhow::bail!(
                            "Action '{}' targets the control plane but no control-plane node is configured",
                            c.name
                        );
                    }
                }
            }
        }

        Ok(())
    }

    /// Override a create-cluster parameter on every create-cluster action
    ///
    /// Keys: `workers`, `controllers`, `address`, `kubernetes_version`.
    pub fn apply_override(&mut self, key: &str, value: &str) -> Result<()> {
        if !OVERRIDE_KEYS.contains(&key) {
            anyhow::bail!("Unknown parameter: {}", key);
        }
        for action in &mut self.actions {
            if let ActionConfig::CreateCluster(c) = action {
                let field = match key {
                    "workers" => &mut c.workers,
                    "controllers" => &mut c.controllers,
                    "address" => &mut c.address,
                    "kubernetes_version" => &mut c.kubernetes_version,
                    _ => continue,
                };
                *field = value.to_string();
            }
        }
        Ok(())
    }

    /// Turn on parameter validation for every create-cluster action
    pub fn enable_strict(&mut self) {
        for action in &mut self.actions {
            if let ActionConfig::CreateCluster(c) = action {
                c.strict = true;
            }
        }
    }

    /// Rendered manifest of each create-cluster action, by display name
    pub fn manifests(&self) -> Vec<(String, String)> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                ActionConfig::CreateCluster(c) => {
                    Some((c.display_name().to_string(), c.params().render()))
                }
                ActionConfig::Command(_) => None,
            })
            .collect()
    }

    /// Build the node inventory
    pub fn to_inventory(&self) -> StaticInventory {
        let mut inventory = StaticInventory::new();
        for node in &self.nodes {
            inventory.insert(Arc::new(node.to_node(self.default_timeout_secs)));
        }
        inventory
    }

    /// Convert config to a Pipeline domain model
    pub fn to_pipeline(&self) -> Result<Pipeline> {
        let mut pipeline = Pipeline::new(&self.name);
        for action in &self.actions {
            pipeline.push(action.build()?);
        }
        Ok(pipeline)
    }
}
