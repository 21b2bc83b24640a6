//! Create-cluster action - applies the cluster-API manifest from the control plane

use crate::actions::manifest::{ManifestParams, ADMIN_KUBECONFIG};
use crate::actions::{Action, ActionError};
use crate::core::{ActionContext, StatusPhase};
use crate::node::first_control_plane;
use async_trait::async_trait;
use tracing::{debug, info};

/// Status label shown while the action runs
pub const STATUS_LABEL: &str = "Creating cluster 🔌";

const FAILURE_CONTEXT: &str = "failed to create cluster";

/// Applies the bring-your-own-host cluster manifest through the first
/// control-plane node
///
/// Parameters are embedded verbatim. Unless built with `strict(true)`, no
/// validation happens and malformed values only surface when the API server
/// rejects the manifest.
#[derive(Debug, Clone)]
pub struct CreateClusterAction {
    name: String,
    params: ManifestParams,
    strict: bool,
}

impl CreateClusterAction {
    pub fn new(
        workers: impl Into<String>,
        controllers: impl Into<String>,
        address: impl Into<String>,
        kubernetes_version: impl Into<String>,
    ) -> Self {
        Self::from_params(ManifestParams::new(
            workers,
            controllers,
            address,
            kubernetes_version,
        ))
    }

    pub fn from_params(params: ManifestParams) -> Self {
        Self {
            name: "create-cluster".to_string(),
            params,
            strict: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Validate parameters before touching the cluster
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn params(&self) -> &ManifestParams {
        &self.params
    }
}

#[async_trait]
impl Action for CreateClusterAction {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: &ActionContext) -> Result<(), ActionError> {
        let phase = StatusPhase::start(ctx.status(), STATUS_LABEL);

        if self.strict {
            self.params.validate()?;
        }

        let nodes = ctx.nodes().await?;
        let node = first_control_plane(&nodes).ok_or(ActionError::NoControlPlaneNode(nodes.len()))?;

        let manifest = self.params.render();
        info!(node = %node.name(), "Applying cluster manifest");
        debug!("Cluster manifest for {}:\n{}", ctx.cluster_name(), manifest);

        node.command("kubectl", &["--kubeconfig", ADMIN_KUBECONFIG, "apply", "-f", "-"])
            .stdin(manifest)
            .run()
            .await
            .map_err(|e| ActionError::exec(FAILURE_CONTEXT, e))?;

        phase.succeed();
        Ok(())
    }
}
