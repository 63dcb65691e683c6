//! Drives the real [`Orchestrator`] -- default discovery overridden with a
//! fixed file list, but the default ENRICHMENT plugins left in place -- over
//! a project that imports a named export from a package and calls it bare.
//! Exercises the seam no unit test does: visitor -> builder -> store ->
//! enrichment, all through the orchestration entrypoint a caller actually
//! uses.

use std::sync::Arc;

use async_trait::async_trait;

use grafema_ir::domain::{AstParser, AstTree, EdgeKind, GraphStore, NodeKind};
use grafema_ir::testing::{FakeNode, FakeTree};
use grafema_orchestration::discovery::FileDiscovery;
use grafema_orchestration::error::Result;
use grafema_orchestration::orchestrator::Orchestrator;

struct FixedDiscovery(Vec<String>);

#[async_trait]
impl FileDiscovery for FixedDiscovery {
    async fn discover(&self, _project_path: &str) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// Ignores file content entirely and always returns the same AST:
/// `import { Router } from 'express'; Router();`
struct ImportAndCallParser;

impl AstParser for ImportAndCallParser {
    fn parse(&self, _content: &str) -> std::result::Result<Box<dyn AstTree>, String> {
        let import = FakeNode::new("ImportDeclaration")
            .with_field("source", FakeNode::leaf("StringLiteral", "express"))
            .with_child(
                FakeNode::new("ImportSpecifier")
                    .with_field("local", FakeNode::leaf("Identifier", "Router"))
                    .with_field("imported", FakeNode::leaf("Identifier", "Router")),
            );
        let call = FakeNode::new("CallExpression").with_field("callee", FakeNode::leaf("Identifier", "Router"));
        let program = FakeNode::new("Program")
            .with_child(import)
            .with_child(FakeNode::new("ExpressionStatement").with_child(call));
        Ok(Box::new(FakeTree { root: program }))
    }
}

#[tokio::test]
async fn import_and_bare_call_resolve_through_the_default_enrichment_plugins() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.js"), "import { Router } from 'express'; Router();").unwrap();

    let store: Arc<dyn GraphStore> = Arc::new(grafema_storage::InMemoryGraphStore::new());
    let parser: Arc<dyn AstParser> = Arc::new(ImportAndCallParser);

    let orchestrator = Orchestrator::new(store.clone(), parser, dir.path().to_str().unwrap().to_string())
        .with_discovery(Arc::new(FixedDiscovery(vec!["index.js".to_string()])));

    let outcome = orchestrator.analyze(false).await.unwrap();
    assert!(!outcome.already_analyzed);
    assert_eq!(outcome.files_processed, 1);
    // two ENRICHMENT plugins ran: external-call-resolver, cardinality
    assert_eq!(outcome.plugin_reports.len(), 2);
    assert!(outcome
        .plugin_reports
        .iter()
        .all(|r| matches!(r.outcome, grafema_ir::enrichment::runner::RunOutcome::Success)));

    let calls = store.query_nodes_by_kind(NodeKind::Call).await.unwrap();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];

    let out = store.get_outgoing_edges(&call.id).await.unwrap();
    let calls_edges: Vec<_> = out.iter().filter(|e| e.kind == EdgeKind::Calls).collect();
    let handled_by: Vec<_> = out.iter().filter(|e| e.kind == EdgeKind::HandledBy).collect();
    assert_eq!(calls_edges.len(), 1, "Router() links to an EXTERNAL_MODULE via CALLS");
    assert_eq!(handled_by.len(), 1, "Router() links to the import binding via HANDLED_BY");

    let externals = store.query_nodes_by_kind(NodeKind::ExternalModule).await.unwrap();
    assert_eq!(externals.len(), 1);
    assert_eq!(externals[0].name, "express");
    assert_eq!(calls_edges[0].dst, externals[0].id);

    let imports = store.query_nodes_by_kind(NodeKind::Import).await.unwrap();
    assert_eq!(imports.len(), 1);
    assert_eq!(handled_by[0].dst, imports[0].id);

    // non-force re-run returns the same graph without touching it
    let second = orchestrator.analyze(false).await.unwrap();
    assert!(second.already_analyzed);
    assert_eq!(second.node_count, outcome.node_count);
}

#[tokio::test]
async fn force_rebuild_recomputes_the_same_edges() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.js"), "import { Router } from 'express'; Router();").unwrap();

    let store: Arc<dyn GraphStore> = Arc::new(grafema_storage::InMemoryGraphStore::new());
    let parser: Arc<dyn AstParser> = Arc::new(ImportAndCallParser);
    let orchestrator = Orchestrator::new(store.clone(), parser, dir.path().to_str().unwrap().to_string())
        .with_discovery(Arc::new(FixedDiscovery(vec!["index.js".to_string()])));

    orchestrator.analyze(false).await.unwrap();
    let forced = orchestrator.analyze(true).await.unwrap();
    assert!(!forced.already_analyzed);

    let calls_edges = store
        .query_nodes_by_kind(NodeKind::Call)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.id)
        .collect::<Vec<_>>();
    assert_eq!(calls_edges.len(), 1, "rebuild produces exactly one CALL node again, not a duplicate");
}
