//! Domain ports -- hexagonal `AstParser`/`AstTree`/`AstNode` interfaces for
//! the parser, the sole external collaborator the visitor depends on,
//! extended with the comment/leading-trivia accessor the
//! `@grafema-ignore cardinality` handler needs.

/// Port: AST parser (driven port). Infrastructure outside this crate
/// implements this with a real JS/TS parser.
pub trait AstParser: Send + Sync {
    fn parse(&self, content: &str) -> Result<Box<dyn AstTree>, String>;
}

/// AST tree abstraction.
pub trait AstTree {
    fn root_node(&self) -> Box<dyn AstNode>;
}

/// AST node abstraction. `kind()` returns the parser's own node-kind string
/// (e.g. `"CallExpression"`, `"Identifier"`); the analyzer dispatches on
/// these strings.
pub trait AstNode {
    fn kind(&self) -> &str;
    fn child_count(&self) -> usize;
    fn child(&self, index: usize) -> Option<Box<dyn AstNode>>;
    /// Named field access (e.g. `callee`, `object`, `property`, `init`,
    /// `test`) -- richer than purely positional children, matching how real
    /// JS/TS ASTs expose structure.
    fn field(&self, name: &str) -> Option<Box<dyn AstNode>>;
    fn text(&self) -> &str;
    fn start_line(&self) -> u32;
    fn start_column(&self) -> u32;
    fn end_line(&self) -> u32;
    fn end_column(&self) -> u32;
    /// True for boolean-valued flags the parser exposes directly (e.g.
    /// `async`, `generator`, `computed`) rather than as child nodes.
    fn flag(&self, name: &str) -> bool;
    /// Leading line comments immediately attached to this node, trimmed,
    /// in source order. Used by the `@grafema-ignore cardinality` handler
    /// -- block comments are excluded by construction since
    /// only line-comment trivia is collected here.
    fn leading_line_comments(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Port: the graph store (driven port). Infrastructure outside this crate
/// (`grafema-storage`) implements this; the builder and enrichment runner
/// only ever see this trait, never a concrete store.
#[async_trait::async_trait]
pub trait GraphStore: Send + Sync {
    async fn add_node(&self, node: super::Node) -> super::Result<()>;
    async fn add_edge(&self, edge: super::Edge) -> super::Result<()>;
    /// No-op if the edge doesn't exist.
    async fn delete_edge(&self, kind: super::EdgeKind, src: &str, dst: &str) -> super::Result<()>;
    async fn get_node(&self, id: &str) -> super::Result<Option<super::Node>>;
    async fn upsert_node_metadata(&self, id: &str, updates: serde_json::Map<String, serde_json::Value>) -> super::Result<()>;
    async fn upsert_edge_metadata(&self, kind: super::EdgeKind, src: &str, dst: &str, updates: serde_json::Map<String, serde_json::Value>) -> super::Result<()>;
    /// All nodes of `kind`, unordered.
    async fn query_nodes_by_kind(&self, kind: super::NodeKind) -> super::Result<Vec<super::Node>>;
    async fn get_outgoing_edges(&self, node_id: &str) -> super::Result<Vec<super::Edge>>;
    async fn get_incoming_edges(&self, node_id: &str) -> super::Result<Vec<super::Edge>>;
    async fn node_count(&self) -> super::Result<usize>;
    async fn edge_count(&self) -> super::Result<usize>;
    async fn count_nodes_by_type(&self) -> super::Result<std::collections::HashMap<super::NodeKind, usize>>;
    async fn count_edges_by_type(&self) -> super::Result<std::collections::HashMap<super::EdgeKind, usize>>;
    /// Drop every node and edge.
    async fn clear(&self) -> super::Result<()>;
    /// Hint that a batch of writes has completed; the in-memory reference
    /// implementation treats this as a no-op.
    async fn flush(&self) -> super::Result<()> {
        Ok(())
    }
}
