//! A minimal, in-memory [`AstNode`]/[`AstTree`] fixture used by this crate's
//! own tests and by the integration tests under `tests/`. No real JS/TS
//! parser is in scope; exercising the visitor end to end needs
//! *some* concrete tree, so this module hand-builds one.
//!
//! Also provides [`InMemoryTestStore`], a small [`GraphStore`] test double
//! (an `Arc<RwLock<HashMap<..>>>` pattern) so enrichment plugin
//! and runner tests don't need the `grafema-storage` crate, which depends
//! on this one.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::{AstNode, AstParser, AstTree, Edge, EdgeKind, GraphStore, Node, NodeKind, Result};

#[derive(Debug, Clone, Default)]
pub struct FakeNode {
    pub kind: String,
    pub text: String,
    pub children: Vec<FakeNode>,
    pub fields: Vec<(String, FakeNode)>,
    pub flags: Vec<String>,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
    pub leading_comments: Vec<String>,
}

impl FakeNode {
    pub fn leaf(kind: &str, text: &str) -> Self {
        Self {
            kind: kind.to_string(),
            text: text.to_string(),
            ..Default::default()
        }
    }

    pub fn new(kind: &str) -> Self {
        Self::leaf(kind, "")
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.start_line = line;
        self.start_column = column;
        self.end_line = line;
        self.end_column = column;
        self
    }

    pub fn with_child(mut self, child: FakeNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: Vec<FakeNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_field(mut self, name: &str, node: FakeNode) -> Self {
        self.fields.push((name.to_string(), node));
        self
    }

    pub fn with_flag(mut self, name: &str) -> Self {
        self.flags.push(name.to_string());
        self
    }

    pub fn with_leading_comment(mut self, comment: &str) -> Self {
        self.leading_comments.push(comment.to_string());
        self
    }
}

impl AstNode for FakeNode {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child(&self, index: usize) -> Option<Box<dyn AstNode>> {
        self.children.get(index).map(|n| Box::new(n.clone()) as Box<dyn AstNode>)
    }

    fn field(&self, name: &str) -> Option<Box<dyn AstNode>> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| Box::new(node.clone()) as Box<dyn AstNode>)
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn start_line(&self) -> u32 {
        self.start_line
    }

    fn start_column(&self) -> u32 {
        self.start_column
    }

    fn end_line(&self) -> u32 {
        self.end_line
    }

    fn end_column(&self) -> u32 {
        self.end_column
    }

    fn flag(&self, name: &str) -> bool {
        self.flags.iter().any(|f| f == name)
    }

    fn leading_line_comments(&self) -> Vec<String> {
        self.leading_comments.clone()
    }
}

pub struct FakeTree {
    pub root: FakeNode,
}

impl AstTree for FakeTree {
    fn root_node(&self) -> Box<dyn AstNode> {
        Box::new(self.root.clone())
    }
}

/// Test-only [`AstParser`]: `content` is ignored and the fixed `FakeTree`
/// built ahead of time is handed back on every `parse` call. Lets end-to-end
/// tests drive [`crate::visitor::analyze_file`] against a hand-built fixture
/// without a real JS/TS parser in scope.
pub struct FakeParser {
    pub root: FakeNode,
}

impl FakeParser {
    pub fn new(root: FakeNode) -> Self {
        Self { root }
    }
}

impl AstParser for FakeParser {
    fn parse(&self, _content: &str) -> std::result::Result<Box<dyn AstTree>, String> {
        Ok(Box::new(FakeTree { root: self.root.clone() }))
    }
}

/// Minimal in-process [`GraphStore`]: good enough for enrichment plugin and
/// runner tests, without pulling in `grafema-storage`
/// (which depends on this crate, so the dependency can't run the other way).
#[derive(Default)]
pub struct InMemoryTestStore {
    nodes: RwLock<HashMap<String, Node>>,
    edges: RwLock<Vec<Edge>>,
}

impl InMemoryTestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nodes(nodes: Vec<Node>) -> Self {
        let store = Self::new();
        for node in nodes {
            store.nodes.write().unwrap().insert(node.id.clone(), node);
        }
        store
    }
}

#[async_trait::async_trait]
impl GraphStore for InMemoryTestStore {
    async fn add_node(&self, node: Node) -> Result<()> {
        self.nodes.write().unwrap().insert(node.id.clone(), node);
        Ok(())
    }

    async fn add_edge(&self, edge: Edge) -> Result<()> {
        self.edges.write().unwrap().push(edge);
        Ok(())
    }

    async fn delete_edge(&self, kind: EdgeKind, src: &str, dst: &str) -> Result<()> {
        self.edges.write().unwrap().retain(|e| !(e.kind == kind && e.src == src && e.dst == dst));
        Ok(())
    }

    async fn get_node(&self, id: &str) -> Result<Option<Node>> {
        Ok(self.nodes.read().unwrap().get(id).cloned())
    }

    async fn upsert_node_metadata(&self, id: &str, updates: serde_json::Map<String, serde_json::Value>) -> Result<()> {
        if let Some(node) = self.nodes.write().unwrap().get_mut(id) {
            node.upsert_metadata(updates);
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
        }
        Ok(())
    }

    async fn query_nodes_by_kind(&self, kind: NodeKind) -> Result<Vec<Node>> {
        Ok(self.nodes.read().unwrap().values().filter(|n| n.kind() == kind).cloned().collect())
    }

    async fn get_outgoing_edges(&self, node_id: &str) -> Result<Vec<Edge>> {
        Ok(self.edges.read().unwrap().iter().filter(|e| e.src == node_id).cloned().collect())
    }

    async fn get_incoming_edges(&self, node_id: &str) -> Result<Vec<Edge>> {
        Ok(self.edges.read().unwrap().iter().filter(|e| e.dst == node_id).cloned().collect())
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

#[cfg(test)]
mod store_tests {
    use super::*;
    use crate::domain::NodeData;
    use serde_json::Map;

    fn node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            name: id.to_string(),
            file: "f.js".into(),
            line: 0,
            column: 0,
            span: None,
            metadata: Map::new(),
            data: NodeData::Module,
        }
    }

    #[tokio::test]
    async fn add_then_get_round_trips() {
        let store = InMemoryTestStore::new();
        store.add_node(node("a")).await.unwrap();
        assert!(store.get_node("a").await.unwrap().is_some());
        assert_eq!(store.node_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn clear_drops_everything() {
        let store = InMemoryTestStore::new();
        store.add_node(node("a")).await.unwrap();
        store.add_edge(Edge::new(EdgeKind::Contains, "a", "b")).await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.node_count().await.unwrap(), 0);
        assert_eq!(store.edge_count().await.unwrap(), 0);
    }
}
