//! Action context - nodes and status shared by every action of a run

use crate::core::status::StatusReporter;
use crate::node::NodeHandle;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::debug;

/// Error types for node lookup
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no nodes found for cluster {0}")]
    NoNodes(String),

    #[error("failed to list nodes for cluster {cluster}: {message}")]
    Provider { cluster: String, message: String },
}

/// Source of the nodes provisioned for a cluster
#[async_trait]
pub trait NodeProvider: Send + Sync {
    async fn list_nodes(&self, cluster: &str) -> Result<Vec<Arc<dyn NodeHandle>>, LookupError>;
}

/// Execution context for a pipeline run
///
/// Built once per run and shared read-only by every action.
pub struct ActionContext {
    cluster_name: String,
    provider: Arc<dyn NodeProvider>,
    status: Arc<dyn StatusReporter>,
    nodes: OnceCell<Vec<Arc<dyn NodeHandle>>>,
}

impl ActionContext {
    pub fn new(
        cluster_name: impl Into<String>,
        provider: Arc<dyn NodeProvider>,
        status: Arc<dyn StatusReporter>,
    ) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            provider,
            status,
            nodes: OnceCell::new(),
        }
    }

    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    pub fn status(&self) -> &dyn StatusReporter {
        self.status.as_ref()
    }

    /// All nodes of the cluster, ordered as the provider lists them
    ///
    /// The first successful lookup is cached for the rest of the run.
    pub async fn nodes(&self) -> Result<Vec<Arc<dyn NodeHandle>>, LookupError> {
        let nodes = self
            .nodes
            .get_or_try_init(|| async {
                debug!("Listing nodes for cluster {}", self.cluster_name);
                self.provider.list_nodes(&self.cluster_name).await
            })
            .await?;

        if nodes.is_empty() {
            return Err(LookupError::NoNodes(self.cluster_name.clone()));
        }

        Ok(nodes.clone())
    }
}
