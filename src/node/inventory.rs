//! Fixed set of nodes known before the pipeline runs

use crate::core::context::{LookupError, NodeProvider};
use crate::node::NodeHandle;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Node provider over a name-ordered map of already provisioned nodes
#[derive(Debug, Default, Clone)]
pub struct StaticInventory {
    nodes: BTreeMap<String, Arc<dyn NodeHandle>>,
}

impl StaticInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, replacing any node with the same name
    pub fn insert(&mut self, node: Arc<dyn NodeHandle>) {
        self.nodes.insert(node.name().to_string(), node);
    }

    pub fn with_node(mut self, node: impl NodeHandle + 'static) -> Self {
        self.insert(Arc::new(node));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn NodeHandle>> {
        self.nodes.get(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[async_trait]
impl NodeProvider for StaticInventory {
    async fn list_nodes(&self, _cluster: &str) -> Result<Vec<Arc<dyn NodeHandle>>, LookupError> {
        Ok(self.nodes.values().cloned().collect())
    }
}
