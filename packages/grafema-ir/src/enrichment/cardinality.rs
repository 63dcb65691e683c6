//! The cardinality enricher: for each
//! LOOP, traces its `ITERATES_OVER` target back to an originating CALL and
//! annotates the edge with `cardinality: { scale, interval? }` when a config
//! entry point or naming heuristic matches.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::config::CardinalityConfig;
use crate::domain::{EdgeKind, NodeData, NodeKind};

use super::{Phase, Plugin, PluginContext, PluginMetadata, PluginResult};

/// Built-in naming heuristics, tried only after the
/// user-supplied `cardinality.yaml` entry points have been checked.
fn heuristic_scale(name: &str) -> Option<&'static str> {
    if name.starts_with("query") || name.starts_with("getAll") || name.starts_with("list") || name.starts_with("fetch") {
        return Some("nodes");
    }
    if name.starts_with("findBy") || is_find_capitalized(name) || is_get_by_id(name) {
        return Some("constant");
    }
    None
}

/// `find[A-Z][a-z]*` -- `findUser`, not `findby` or bare `find`.
fn is_find_capitalized(name: &str) -> bool {
    let Some(rest) = name.strip_prefix("find") else {
        return false;
    };
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second)) => first.is_ascii_uppercase() && second.is_ascii_lowercase(),
        _ => false,
    }
}

fn is_get_by_id(name: &str) -> bool {
    name.starts_with("get") && name.ends_with("ById")
}

pub struct CardinalityEnricher {
    config: CardinalityConfig,
}

impl CardinalityEnricher {
    pub fn new(config: CardinalityConfig) -> Self {
        Self { config }
    }
}

impl Default for CardinalityEnricher {
    fn default() -> Self {
        Self::new(CardinalityConfig::default())
    }
}

#[async_trait]
impl Plugin for CardinalityEnricher {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("cardinality-enricher", Phase::Enrichment).produces(["ITERATES_OVER"])
    }

    async fn execute(&self, ctx: &PluginContext) -> PluginResult {
        let mut loops = match ctx.graph.query_nodes_by_kind(NodeKind::Loop).await {
            Ok(loops) => loops,
            Err(e) => return PluginResult::failure(format!("failed to query loops: {e}")),
        };
        // `query_nodes_by_kind` is backed by a HashMap, so its iteration
        // order varies run to run; sort by id so edges are appended in a
        // stable order and two runs over unchanged source stay byte-identical.
        loops.sort_by(|a, b| a.id.cmp(&b.id));

        let total = loops.len();
        let mut annotated = 0u64;
        let mut ignored = 0u64;

        for (i, loop_node) in loops.iter().enumerate() {
            ctx.report_progress("ENRICHMENT", "cardinality-enricher", &loop_node.name, total, i + 1);

            let NodeData::Loop { ignore_cardinality, .. } = &loop_node.data else {
                continue;
            };
            if *ignore_cardinality {
                ignored += 1;
                continue;
            }

            let outgoing = match ctx.graph.get_outgoing_edges(&loop_node.id).await {
                Ok(edges) => edges,
                Err(e) => return PluginResult::failure(format!("failed to read outgoing edges: {e}")),
            };
            let Some(iterates_edge) = outgoing.into_iter().find(|e| e.kind == EdgeKind::IteratesOver) else {
                continue;
            };

            let Some(call_name) = self.trace_call_name(ctx, &iterates_edge.dst).await else {
                continue;
            };

            let scale = self
                .config
                .match_name(&call_name)
                .map(|entry| (entry.returns.clone(), entry.interval))
                .or_else(|| heuristic_scale(&call_name).map(|s| (s.to_string(), None)));

            let Some((scale, interval)) = scale else {
                continue;
            };

            let mut cardinality = Map::new();
            cardinality.insert("scale".to_string(), Value::from(scale));
            if let Some((lo, hi)) = interval {
                cardinality.insert("interval".to_string(), Value::from(vec![lo, hi]));
            }
            let mut updates = Map::new();
            updates.insert("cardinality".to_string(), Value::Object(cardinality));

            if ctx
                .graph
                .upsert_edge_metadata(EdgeKind::IteratesOver, &iterates_edge.src, &iterates_edge.dst, updates)
                .await
                .is_ok()
            {
                annotated += 1;
            }
        }

        let mut metadata = Map::new();
        metadata.insert("nodesCreated".to_string(), Value::from(0));
        metadata.insert("edgesCreated".to_string(), Value::from(0));
        metadata.insert("cardinalityAnnotated".to_string(), Value::from(annotated));
        metadata.insert("ignoredLoops".to_string(), Value::from(ignored));
        PluginResult::ok(metadata)
    }
}

impl CardinalityEnricher {
    /// The iterated collection node itself, if it's a CALL; otherwise one
    /// hop through `DERIVES_FROM`.
    async fn trace_call_name(&self, ctx: &PluginContext, collection_id: &str) -> Option<String> {
        let node = ctx.graph.get_node(collection_id).await.ok().flatten()?;
        if node.kind() == NodeKind::Call {
            return Some(node.name);
        }
        let outgoing = ctx.graph.get_outgoing_edges(collection_id).await.ok()?;
        for edge in outgoing.into_iter().filter(|e| e.kind == EdgeKind::DerivesFrom) {
            if let Some(target) = ctx.graph.get_node(&edge.dst).await.ok().flatten() {
                if target.kind() == NodeKind::Call {
                    return Some(target.name);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnalysisContext, LoopKind};
    use crate::factory::NodeFactory;
    use crate::testing::InMemoryTestStore;
    use std::sync::Arc;

    fn loop_node(name: &str, ignore: bool) -> crate::domain::Node {
        let ctx = AnalysisContext { file: "index.js".into(), scope_path: vec![] };
        NodeFactory::create_loop(name, "index.js", Some(1), 0, &ctx, LoopKind::ForOf, ignore, None).unwrap()
    }

    fn call_node(name: &str) -> crate::domain::Node {
        let ctx = AnalysisContext { file: "index.js".into(), scope_path: vec![] };
        NodeFactory::create_call(name, "index.js", Some(2), 0, &ctx, None, None, false, false, false, None).unwrap()
    }

    #[tokio::test]
    async fn ignored_loop_gets_no_cardinality_and_is_counted() {
        let store = Arc::new(InMemoryTestStore::new());
        let ignored_loop = loop_node("for-of#0", true);
        let call = call_node("queryNodes");
        let edge = NodeFactory::edge(EdgeKind::IteratesOver, &ignored_loop.id, &call.id);
        store.add_node(ignored_loop.clone()).await.unwrap();
        store.add_node(call).await.unwrap();
        store.add_edge(edge).await.unwrap();

        let ctx = PluginContext::new(store.clone(), "proj");
        let result = CardinalityEnricher::default().execute(&ctx).await;
        assert!(result.success);
        assert_eq!(result.metadata.get("ignoredLoops").unwrap(), 1);

        let out = store.get_outgoing_edges(&ignored_loop.id).await.unwrap();
        assert!(out[0].metadata.get("cardinality").is_none());
    }

    #[tokio::test]
    async fn non_ignored_loop_over_query_call_gets_nodes_scale() {
        let store = Arc::new(InMemoryTestStore::new());
        let loop_n = loop_node("for-of#0", false);
        let call = call_node("queryNodes");
        let edge = NodeFactory::edge(EdgeKind::IteratesOver, &loop_n.id, &call.id);
        store.add_node(loop_n.clone()).await.unwrap();
        store.add_node(call).await.unwrap();
        store.add_edge(edge).await.unwrap();

        let ctx = PluginContext::new(store.clone(), "proj");
        CardinalityEnricher::default().execute(&ctx).await;

        let out = store.get_outgoing_edges(&loop_n.id).await.unwrap();
        let cardinality = out[0].metadata.get("cardinality").unwrap();
        assert_eq!(cardinality.get("scale").unwrap(), "nodes");
    }

    #[tokio::test]
    async fn loop_over_variable_traces_through_derives_from_to_call() {
        let store = Arc::new(InMemoryTestStore::new());
        let loop_n = loop_node("for-of#0", false);
        let ctx_path = AnalysisContext { file: "index.js".into(), scope_path: vec![] };
        let variable = NodeFactory::create_variable("items", "index.js", Some(1), 0, &ctx_path, None, true, None).unwrap();
        let call = call_node("findById");
        store.add_node(loop_n.clone()).await.unwrap();
        store.add_node(variable.clone()).await.unwrap();
        store.add_node(call.clone()).await.unwrap();
        store.add_edge(NodeFactory::edge(EdgeKind::IteratesOver, &loop_n.id, &variable.id)).await.unwrap();
        store.add_edge(NodeFactory::edge(EdgeKind::DerivesFrom, &variable.id, &call.id)).await.unwrap();

        let ctx = PluginContext::new(store.clone(), "proj");
        CardinalityEnricher::default().execute(&ctx).await;

        let out = store.get_outgoing_edges(&loop_n.id).await.unwrap();
        let cardinality = out[0].metadata.get("cardinality").unwrap();
        assert_eq!(cardinality.get("scale").unwrap(), "constant");
    }

    #[tokio::test]
    async fn config_entry_point_takes_priority_over_heuristic() {
        use crate::config::{CardinalityConfig, EntryPoint};
        let store = Arc::new(InMemoryTestStore::new());
        let loop_n = loop_node("for-of#0", false);
        let call = call_node("queryNodes");
        store.add_node(loop_n.clone()).await.unwrap();
        store.add_node(call.clone()).await.unwrap();
        store.add_edge(NodeFactory::edge(EdgeKind::IteratesOver, &loop_n.id, &call.id)).await.unwrap();

        let mut config = CardinalityConfig::default();
        config.entry_points.push(EntryPoint { pattern: "queryNodes".into(), returns: "constant".into(), interval: Some((1, 1)) });

        let ctx = PluginContext::new(store.clone(), "proj");
        CardinalityEnricher::new(config).execute(&ctx).await;

        let out = store.get_outgoing_edges(&loop_n.id).await.unwrap();
        let cardinality = out[0].metadata.get("cardinality").unwrap();
        assert_eq!(cardinality.get("scale").unwrap(), "constant");
        assert_eq!(cardinality.get("interval").unwrap(), &Value::from(vec![1, 1]));
    }

    #[test]
    fn heuristic_scale_matches_spec_examples() {
        assert_eq!(heuristic_scale("queryUsers"), Some("nodes"));
        assert_eq!(heuristic_scale("getAllUsers"), Some("nodes"));
        assert_eq!(heuristic_scale("listItems"), Some("nodes"));
        assert_eq!(heuristic_scale("fetchRecords"), Some("nodes"));
        assert_eq!(heuristic_scale("findById"), Some("constant"));
        assert_eq!(heuristic_scale("findUser"), Some("constant"));
        assert_eq!(heuristic_scale("getUserById"), Some("constant"));
        assert_eq!(heuristic_scale("doSomethingElse"), None);
    }
}
