//! The `GraphStore` reference implementation: a single in-memory store backing tests and
//! single-process runs. No persistent backend -- persistence is an external
//! collaborator, explicitly out of scope here.
//!
//! One `RwLock`-guarded collection per record kind,
//! `.read()/.write().unwrap()` throughout since poisoning only happens
//! after an unrelated panic, which a store wrapper can't meaningfully
//! recover from anyway.

use std::collections::HashMap;
use std::sync::RwLock;

use grafema_ir::domain::{Edge, EdgeKind, GraphStore, Node, NodeKind, Result};

#[derive(Default)]
pub struct InMemoryGraphStore {
    nodes: RwLock<HashMap<String, Node>>,
    edges: RwLock<Vec<Edge>>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn add_node(&self, node: Node) -> Result<()> {
        self.nodes.write().unwrap().insert(node.id.clone(), node);
        Ok(())
    }

    async fn add_edge(&self, edge: Edge) -> Result<()> {
        self.edges.write().unwrap().push(edge);
        Ok(())
    }

    async fn delete_edge(&self, kind: EdgeKind, src: &str, dst: &str) -> Result<()> {
        self.edges
            .write()
            .unwrap()
            .retain(|e| !(e.kind == kind && e.src == src && e.dst == dst));
        Ok(())
    }

    async fn get_node(&self, id: &str) -> Result<Option<Node>> {
        Ok(self.nodes.read().unwrap().get(id).cloned())
    }

    async fn upsert_node_metadata(
        &self,
        id: &str,
        updates: serde_json::Map<String, serde_json::Value>,
    ) -> Result<()> {
        if let Some(node) = self.nodes.write().unwrap().get_mut(id) {
            node.upsert_metadata(updates);
        } else {
            tracing::warn!(node_id = %id, "upsert_node_metadata: no such node, ignored");
        }
        Ok(())
    }

    async fn upsert_edge_metadata(
        &self,
        kind: EdgeKind,
        src: &str,
        dst: &str,
        updates: serde_json::Map<String, serde_json::Value>,
    ) -> Result<()> {
        if let Some(edge) = self
            .edges
            .write()
            .unwrap()
            .iter_mut()
            .find(|e| e.kind == kind && e.src == src && e.dst == dst)
        {
            edge.upsert_metadata(updates);
        } else {
            tracing::warn!(?kind, src, dst, "upsert_edge_metadata: no such edge, ignored");
        }
        Ok(())
    }

    async fn query_nodes_by_kind(&self, kind: NodeKind) -> Result<Vec<Node>> {
        Ok(self
            .nodes
            .read()
            .unwrap()
            .values()
            .filter(|n| n.kind() == kind)
            .cloned()
            .collect())
    }

    async fn get_outgoing_edges(&self, node_id: &str) -> Result<Vec<Edge>> {
        Ok(self
            .edges
            .read()
            .unwrap()
            .iter()
            .filter(|e| e.src == node_id)
            .cloned()
            .collect())
    }

    async fn get_incoming_edges(&self, node_id: &str) -> Result<Vec<Edge>> {
        Ok(self
            .edges
            .read()
            .unwrap()
            .iter()
            .filter(|e| e.dst == node_id)
            .cloned()
            .collect())
    }

    async fn node_count(&self) -> Result<usize> {
        Ok(self.nodes.read().unwrap().len())
    }

    async fn edge_count(&self) -> Result<usize> {
        Ok(self.edges.read().unwrap().len())
    }

    async fn count_nodes_by_type(&self) -> Result<HashMap<NodeKind, usize>> {
        let mut counts = HashMap::new();
        for node in self.nodes.read().unwrap().values() {
            *counts.entry(node.kind()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn count_edges_by_type(&self) -> Result<HashMap<EdgeKind, usize>> {
        let mut counts = HashMap::new();
        for edge in self.edges.read().unwrap().iter() {
            *counts.entry(edge.kind).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn clear(&self) -> Result<()> {
        self.nodes.write().unwrap().clear();
        self.edges.write().unwrap().clear();
        Ok(())
    }
}
