//! The external-call resolver: links CALL nodes with no object to the IMPORT binding and
//! EXTERNAL_MODULE they resolve to.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::{EdgeKind, Node, NodeData, NodeKind};
use crate::factory::NodeFactory;

use super::{Phase, Plugin, PluginContext, PluginMetadata, PluginResult};

/// JS/Node builtins that never resolve through an import.
const JS_BUILTINS: &[&str] = &[
    "parseInt", "parseFloat", "eval", "require", "setTimeout", "setInterval", "clearTimeout",
    "clearInterval", "encodeURIComponent", "decodeURIComponent", "isNaN", "isFinite", "fetch",
    "structuredClone",
];

/// Leading `@` -> `@scope/name`; otherwise the first path segment before
/// `/`.
pub fn extract_package_name(source: &str) -> &str {
    if source.starts_with('@') {
        match source.match_indices('/').nth(1) {
            Some((i, _)) => &source[..i],
            None => source,
        }
    } else {
        match source.find('/') {
            Some(i) => &source[..i],
            None => source,
        }
    }
}

fn is_relative(source: &str) -> bool {
    source.starts_with('.') || source.starts_with('/')
}

pub struct ExternalCallResolver;

impl ExternalCallResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExternalCallResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for ExternalCallResolver {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("external-call-resolver", Phase::Enrichment)
            .produces(["CALLS", "HANDLED_BY"])
    }

    async fn execute(&self, ctx: &PluginContext) -> PluginResult {
        // Step 1: import_index over non-relative imports.
        let imports = match ctx.graph.query_nodes_by_kind(NodeKind::Import).await {
            Ok(imports) => imports,
            Err(e) => return PluginResult::failure(format!("failed to query imports: {e}")),
        };
        let mut import_index: HashMap<(String, String), Node> = HashMap::new();
        for imp in imports {
            if let NodeData::Import { source, local, .. } = &imp.data {
                if !is_relative(source) {
                    import_index.insert((imp.file.clone(), local.clone()), imp);
                }
            }
        }

        // Step 2: candidate calls -- no object, no existing outgoing CALLS.
        let mut calls = match ctx.graph.query_nodes_by_kind(NodeKind::Call).await {
            Ok(calls) => calls,
            Err(e) => return PluginResult::failure(format!("failed to query calls: {e}")),
        };
        // `query_nodes_by_kind` is backed by a HashMap, so its iteration
        // order varies run to run; sort by id so edges are appended in a
        // stable order and two runs over unchanged source stay byte-identical.
        calls.sort_by(|a, b| a.id.cmp(&b.id));

        let mut calls_created = 0u64;
        let mut handled_by_created = 0u64;
        let total = calls.len();

        for (i, call) in calls.iter().enumerate() {
            ctx.report_progress("ENRICHMENT", "external-call-resolver", &call.name, total, i + 1);

            let NodeData::Call { object: None, is_dynamic, .. } = &call.data else {
                continue;
            };
            if *is_dynamic || JS_BUILTINS.contains(&call.name.as_str()) {
                continue;
            }
            let existing = match ctx.graph.get_outgoing_edges(&call.id).await {
                Ok(edges) => edges,
                Err(e) => return PluginResult::failure(format!("failed to read outgoing edges: {e}")),
            };
            if existing.iter().any(|e| e.kind == EdgeKind::Calls) {
                continue;
            }

            let Some(imp) = import_index.get(&(call.file.clone(), call.name.clone())) else {
                continue;
            };
            let NodeData::Import { source, imported, import_binding, .. } = &imp.data else {
                continue;
            };

            let package = extract_package_name(source).to_string();
            let external_id = crate::domain::IdBuilder::external_module(&package);
            if ctx.graph.get_node(&external_id).await.ok().flatten().is_none() {
                if let Ok(node) = NodeFactory::create_external_module(&package) {
                    if ctx.graph.add_node(node).await.is_err() {
                        continue;
                    }
                }
            }

            let mut metadata = Map::new();
            metadata.insert(
                "exportedName".to_string(),
                Value::from(imported.clone().unwrap_or_else(|| call.name.clone())),
            );
            let calls_edge = NodeFactory::edge_with_metadata(EdgeKind::Calls, &call.id, &external_id, metadata);
            if ctx.graph.add_edge(calls_edge).await.is_ok() {
                calls_created += 1;
            }

            if !matches!(import_binding, crate::domain::ImportBinding::Type) {
                let handled_by = NodeFactory::edge(EdgeKind::HandledBy, &call.id, &imp.id);
                if ctx.graph.add_edge(handled_by).await.is_ok() {
                    handled_by_created += 1;
                }
            }
        }

        let mut metadata = Map::new();
        metadata.insert("nodesCreated".to_string(), Value::from(0));
        metadata.insert("edgesCreated".to_string(), Value::from(calls_created + handled_by_created));
        metadata.insert("handledByEdgesCreated".to_string(), Value::from(handled_by_created));
        PluginResult::ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Edge, ImportBinding, ImportType};
    use crate::testing::InMemoryTestStore;
    use std::sync::Arc;

    fn import_node(file: &str, source: &str, local: &str, binding: ImportBinding) -> Node {
        NodeFactory::create_import(file, source, local, Some(1), 0, Some(local.to_string()), ImportType::Named, Some(binding), false, None).unwrap()
    }

    fn call_node(file: &str, name: &str) -> Node {
        let ctx = crate::domain::AnalysisContext { file: file.to_string(), scope_path: vec![] };
        NodeFactory::create_call(name, file, Some(2), 0, &ctx, None, None, false, false, false, None).unwrap()
    }

    #[tokio::test]
    async fn value_import_links_call_to_external_module_and_handled_by() {
        let store = Arc::new(InMemoryTestStore::new());
        let import = import_node("index.js", "express", "Router", ImportBinding::Value);
        let call = call_node("index.js", "Router");
        store.add_node(import.clone()).await.unwrap();
        store.add_node(call.clone()).await.unwrap();

        let ctx = PluginContext::new(store.clone(), "proj");
        let result = ExternalCallResolver::new().execute(&ctx).await;
        assert!(result.success);

        let out = store.get_outgoing_edges(&call.id).await.unwrap();
        let calls_edges: Vec<_> = out.iter().filter(|e| e.kind == EdgeKind::Calls).collect();
        let handled_by: Vec<_> = out.iter().filter(|e| e.kind == EdgeKind::HandledBy).collect();
        assert_eq!(calls_edges.len(), 1);
        assert_eq!(handled_by.len(), 1);
        assert_eq!(handled_by[0].dst, import.id);
        assert_eq!(calls_edges[0].metadata.get("exportedName").unwrap(), "Router");
    }

    #[tokio::test]
    async fn type_only_import_skips_handled_by() {
        let store = Arc::new(InMemoryTestStore::new());
        let import = import_node("index.js", "bar", "Foo", ImportBinding::Type);
        let call = call_node("index.js", "Foo");
        store.add_node(import).await.unwrap();
        store.add_node(call.clone()).await.unwrap();

        let ctx = PluginContext::new(store.clone(), "proj");
        ExternalCallResolver::new().execute(&ctx).await;

        let out = store.get_outgoing_edges(&call.id).await.unwrap();
        assert!(out.iter().all(|e| e.kind != EdgeKind::HandledBy));
        assert_eq!(out.iter().filter(|e| e.kind == EdgeKind::Calls).count(), 1);
    }

    #[tokio::test]
    async fn idempotent_rerun_creates_no_new_edges() {
        let store = Arc::new(InMemoryTestStore::new());
        let import = import_node("index.js", "express", "Router", ImportBinding::Value);
        let call = call_node("index.js", "Router");
        store.add_node(import).await.unwrap();
        store.add_node(call.clone()).await.unwrap();

        let ctx = PluginContext::new(store.clone(), "proj");
        let resolver = ExternalCallResolver::new();
        resolver.execute(&ctx).await;
        let first_count = store.get_outgoing_edges(&call.id).await.unwrap().len();
        resolver.execute(&ctx).await;
        let second_count = store.get_outgoing_edges(&call.id).await.unwrap().len();
        assert_eq!(first_count, second_count);
    }

    #[tokio::test]
    async fn dynamic_call_is_never_linked() {
        let store = Arc::new(InMemoryTestStore::new());
        let import = import_node("index.js", "express", "Router", ImportBinding::Value);
        store.add_node(import).await.unwrap();
        let mut call = call_node("index.js", "Router");
        if let NodeData::Call { is_dynamic, .. } = &mut call.data {
            *is_dynamic = true;
        }
        store.add_node(call.clone()).await.unwrap();

        let ctx = PluginContext::new(store.clone(), "proj");
        ExternalCallResolver::new().execute(&ctx).await;
        assert!(store.get_outgoing_edges(&call.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn builtin_global_is_skipped() {
        let store = Arc::new(InMemoryTestStore::new());
        let call = call_node("index.js", "setTimeout");
        store.add_node(call.clone()).await.unwrap();
        let ctx = PluginContext::new(store.clone(), "proj");
        ExternalCallResolver::new().execute(&ctx).await;
        assert!(store.get_outgoing_edges(&call.id).await.unwrap().is_empty());
    }

    #[test]
    fn package_name_extraction_handles_scoped_and_subpath() {
        assert_eq!(extract_package_name("express"), "express");
        assert_eq!(extract_package_name("lodash/debounce"), "lodash");
        assert_eq!(extract_package_name("@scope/pkg/sub"), "@scope/pkg");
    }
}
