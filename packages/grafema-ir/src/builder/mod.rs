//! Two-pass graph builder: turn one file's
//! [`VisitorCollections`] into [`Node`]s and [`Edge`]s. Pass one creates
//! every node (so every id a forward reference could need already exists);
//! pass two resolves `ValueRef`s captured during traversal into edges,
//! walking the lexical scope chain innermost-to-outermost.

use std::collections::HashMap;

use crate::domain::{Edge, EdgeKind, Node, NodeId, NodeKind, Result};
use crate::factory::NodeFactory;
use crate::visitor::{AssignmentKind, ValueRef, VisitorCollections};

/// Known Node.js/browser built-ins that never resolve to an
/// EXTERNAL_MODULE placeholder nor to a local declaration. Shared with the external-call resolver.
pub const BUILTIN_GLOBALS: &[&str] = &[
    "console", "Math", "JSON", "Object", "Array", "Promise", "Map", "Set", "Symbol", "Reflect",
    "process", "Buffer", "globalThis",
];

/// Everything produced for one file, ready to hand to a [`crate::domain::ports`]
/// consumer (the orchestration crate writes these into a `GraphStore`).
#[derive(Debug, Clone, Default)]
pub struct BuildResult {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// Identifier references the builder could not resolve to any node and
    /// that weren't recognized as external either -- dropped silently,
    /// surfaced here for diagnostics.
    pub unresolved: Vec<String>,
}

/// Per-file index from `(scope_path_joined, name)` to a declaration's node
/// id, built during pass one; `resolve_variable` walks scope path
/// components off the end until it finds a match, then falls back to a
/// same-named parameter anywhere in the file.
#[derive(Default)]
struct DeclarationIndex {
    by_scope_and_name: HashMap<(String, String), NodeId>,
    parameters_by_name: HashMap<String, NodeId>,
    functions_by_name: HashMap<String, NodeId>,
}

impl DeclarationIndex {
    fn insert(&mut self, scope_path: &[String], name: &str, id: NodeId) {
        self.by_scope_and_name
            .insert((scope_path_key(scope_path), name.to_string()), id);
    }
}

fn scope_path_key(scope_path: &[String]) -> String {
    if scope_path.is_empty() {
        crate::domain::GLOBAL_SCOPE.to_string()
    } else {
        scope_path.join("->")
    }
}

/// Walk `scope_path` from innermost to outermost (dropping one trailing
/// component at a time, then trying `global`), returning the first
/// declaration found -- this is how shadowing resolves. Falls back to a parameter with the same
/// name, then a same-named function declaration (for bare calls to a
/// function declared later in the file), before giving up.
fn resolve_variable(index: &DeclarationIndex, name: &str, scope_path: &[String]) -> Option<NodeId> {
    let mut path = scope_path.to_vec();
    loop {
        if let Some(id) = index.by_scope_and_name.get(&(scope_path_key(&path), name.to_string())) {
            return Some(id.clone());
        }
        if path.is_empty() {
            break;
        }
        path.pop();
    }
    index
        .parameters_by_name
        .get(name)
        .or_else(|| index.functions_by_name.get(name))
        .cloned()
}

fn package_name_of(source: &str) -> &str {
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

pub struct GraphBuilder;

impl GraphBuilder {
    /// Pass one: create every node the file's traversal discovered, and
    /// build the lookup index pass two needs.
    fn create_nodes(file: &str, collections: &VisitorCollections) -> Result<(Vec<Node>, DeclarationIndex, HashMap<NodeId, NodeId>)> {
        let mut nodes = Vec::new();
        let mut index = DeclarationIndex::default();
        // child id -> parent id, built alongside so pass two can emit
        // CONTAINS edges without re-deriving structure from scope paths.
        let mut contains: HashMap<NodeId, NodeId> = HashMap::new();
        let mut scope_node_by_path: HashMap<String, NodeId> = HashMap::new();

        let mut module = NodeFactory::create_module(file)?;
        let module_id = module.id.clone();
        if collections.has_top_level_await {
            let mut updates = serde_json::Map::new();
            updates.insert("hasTopLevelAwait".to_string(), serde_json::Value::from(true));
            module.upsert_metadata(updates);
        }
        scope_node_by_path.insert(crate::domain::GLOBAL_SCOPE.to_string(), module_id.clone());
        nodes.push(module);

        let parent_for = |scope_path: &[String], scope_node_by_path: &HashMap<String, NodeId>| -> NodeId {
            scope_node_by_path
                .get(&scope_path_key(scope_path))
                .cloned()
                .unwrap_or_else(|| module_id.clone())
        };

        // Functions and scopes can nest inside one another in either order
        // (an arrow inside a `for-of` body, a function declared inside an
        // `if` block), so `scope_node_by_path` must hold every function's
        // and scope's own path *before* any of their CONTAINS parents are
        // resolved -- otherwise a function nested in a block scope would
        // look up a not-yet-inserted entry and fall back to the module.
        let mut scope_bearing: Vec<(NodeId, Vec<String>)> = Vec::new();

        for f in &collections.functions {
            let ctx = crate::domain::AnalysisContext {
                file: file.to_string(),
                scope_path: f.scope_path.clone(),
            };
            let discriminator = extract_discriminator(&f.id);
            let node = NodeFactory::create_function(
                &f.name,
                file,
                Some(f.line),
                f.column,
                &ctx,
                f.parent_scope_id.clone(),
                f.is_async,
                f.is_generator,
                f.is_arrow,
                discriminator,
            )?;
            let id = node.id.clone();
            let own_path = {
                let mut p = f.scope_path.clone();
                p.push(last_segment(&id));
                p
            };
            scope_node_by_path.insert(scope_path_key(&own_path), id.clone());
            index.functions_by_name.insert(f.name.clone(), id.clone());
            scope_bearing.push((id.clone(), f.scope_path.clone()));
            nodes.push(node);
        }

        for s in &collections.scopes {
            let ctx = crate::domain::AnalysisContext {
                file: file.to_string(),
                scope_path: s.scope_path.clone(),
            };
            let node = NodeFactory::create_scope(
                file,
                Some(s.line),
                s.column,
                &ctx,
                &s.name,
                s.scope_type,
                s.parent_scope_id.clone(),
                s.parent_function_id.clone(),
                s.conditional,
            )?;
            let id = node.id.clone();
            let mut own_path = s.scope_path.clone();
            own_path.push(s.name.clone());
            scope_node_by_path.insert(scope_path_key(&own_path), id.clone());
            scope_bearing.push((id.clone(), s.scope_path.clone()));
            nodes.push(node);
        }

        for (id, scope_path) in &scope_bearing {
            contains.insert(id.clone(), parent_for(scope_path, &scope_node_by_path));
        }

        for c in &collections.classes {
            let ctx = crate::domain::AnalysisContext {
                file: file.to_string(),
                scope_path: c.scope_path.clone(),
            };
            let node = NodeFactory::create_class(&c.name, file, Some(c.line), c.column, &ctx, c.extends.clone(), c.implements.clone())?;
            contains.insert(node.id.clone(), parent_for(&c.scope_path, &scope_node_by_path));
            nodes.push(node);
        }

        for i in &collections.interfaces {
            let node = NodeFactory::create_interface(&i.name, file, Some(i.line), i.column, i.extends.clone(), i.properties.clone(), Some(i.is_external))?;
            contains.insert(node.id.clone(), module_id.clone());
            nodes.push(node);
        }

        for t in &collections.types {
            let ctx = crate::domain::AnalysisContext {
                file: file.to_string(),
                scope_path: t.scope_path.clone(),
            };
            let node = NodeFactory::create_type(&t.name, file, Some(t.line), t.column, &ctx)?;
            contains.insert(node.id.clone(), parent_for(&t.scope_path, &scope_node_by_path));
            nodes.push(node);
        }

        for e in &collections.enums {
            let ctx = crate::domain::AnalysisContext {
                file: file.to_string(),
                scope_path: e.scope_path.clone(),
            };
            let node = NodeFactory::create_enum(&e.name, file, Some(e.line), e.column, &ctx)?;
            contains.insert(node.id.clone(), parent_for(&e.scope_path, &scope_node_by_path));
            nodes.push(node);
        }

        for imp in &collections.imports {
            let node = NodeFactory::create_import(
                file,
                &imp.source,
                &imp.local,
                Some(imp.line),
                imp.column,
                imp.imported.clone(),
                imp.import_type,
                Some(imp.import_binding),
                imp.is_dynamic,
                imp.is_resolvable,
            )?;
            index.by_scope_and_name.insert((crate::domain::GLOBAL_SCOPE.to_string(), imp.local.clone()), node.id.clone());
            contains.insert(node.id.clone(), module_id.clone());
            nodes.push(node);
        }

        for exp in &collections.exports {
            let node = NodeFactory::create_export(file, &exp.name, Some(exp.line), exp.column, exp.local.clone(), exp.is_default, exp.export_type, exp.source.clone())?;
            contains.insert(node.id.clone(), module_id.clone());
            nodes.push(node);
        }

        for v in collections.variables.iter().chain(collections.constants.iter()) {
            let ctx = crate::domain::AnalysisContext {
                file: file.to_string(),
                scope_path: v.scope_path.clone(),
            };
            let discriminator = extract_discriminator(&v.id);
            let node = NodeFactory::create_variable(&v.name, file, Some(v.line), v.column, &ctx, v.parent_scope_id.clone(), v.is_const, discriminator)?;
            index.insert(&v.scope_path, &v.name, node.id.clone());
            contains.insert(node.id.clone(), parent_for(&v.scope_path, &scope_node_by_path));
            nodes.push(node);
        }

        for p in &collections.parameters {
            let ctx = crate::domain::AnalysisContext {
                file: file.to_string(),
                scope_path: vec![],
            };
            let node = NodeFactory::create_parameter(&p.name, file, Some(p.line), p.column, &ctx, p.function_id.clone())?;
            index.parameters_by_name.insert(p.name.clone(), node.id.clone());
            contains.insert(node.id.clone(), p.function_id.clone());
            nodes.push(node);
        }

        for call in collections.calls.iter().chain(collections.method_calls.iter()) {
            let ctx = crate::domain::AnalysisContext {
                file: file.to_string(),
                scope_path: call.scope_path.clone(),
            };
            let discriminator = extract_discriminator(&call.id);
            let node = NodeFactory::create_call(&call.name, file, Some(call.line), call.column, &ctx, call.object.clone(), call.method.clone(), call.is_new, call.is_awaited, call.is_dynamic, discriminator)?;
            contains.insert(node.id.clone(), parent_for(&call.scope_path, &scope_node_by_path));
            nodes.push(node);
        }

        for expr in &collections.expressions {
            let ctx = crate::domain::AnalysisContext {
                file: file.to_string(),
                scope_path: expr.scope_path.clone(),
            };
            let discriminator = extract_discriminator(&expr.id);
            let node = NodeFactory::create_expression(&expr.name, file, Some(expr.line), expr.column, &ctx, &expr.expression_type, expr.operator.clone(), expr.left_source_name.clone(), expr.right_source_name.clone(), discriminator)?;
            contains.insert(node.id.clone(), parent_for(&expr.scope_path, &scope_node_by_path));
            nodes.push(node);
        }

        for l in &collections.loops {
            let ctx = crate::domain::AnalysisContext {
                file: file.to_string(),
                scope_path: l.scope_path.clone(),
            };
            let discriminator = extract_discriminator(&l.id);
            let node = NodeFactory::create_loop(&l.name, file, Some(l.line), l.column, &ctx, l.loop_kind, l.ignore_cardinality, discriminator)?;
            contains.insert(node.id.clone(), parent_for(&l.scope_path, &scope_node_by_path));
            nodes.push(node);
        }

        for o in &collections.object_literals {
            let ctx = crate::domain::AnalysisContext {
                file: file.to_string(),
                scope_path: o.scope_path.clone(),
            };
            let discriminator = extract_discriminator(&o.id);
            let node = NodeFactory::create_expression("<object>", file, Some(o.line), o.column, &ctx, "ObjectExpression", None, None, None, discriminator)?;
            contains.insert(node.id.clone(), parent_for(&o.scope_path, &scope_node_by_path));
            nodes.push(node);
        }

        for a in &collections.array_literals {
            let ctx = crate::domain::AnalysisContext {
                file: file.to_string(),
                scope_path: a.scope_path.clone(),
            };
            let discriminator = extract_discriminator(&a.id);
            let node = NodeFactory::create_expression("<array>", file, Some(a.line), a.column, &ctx, "ArrayExpression", None, None, None, discriminator)?;
            contains.insert(node.id.clone(), parent_for(&a.scope_path, &scope_node_by_path));
            nodes.push(node);
        }

        Ok((nodes, index, contains))
    }

    /// Pass two: resolve every captured `ValueRef` against the index built
    /// in pass one, plus emit the edges that don't depend on resolution at
    /// all (CONTAINS, PASSES_ARGUMENT to literals are skipped, HAS_PROPERTY/
    /// HAS_ELEMENT, ASSIGNED_FROM/DERIVES_FROM, ITERATES_OVER).
    fn resolve_edges(
        file: &str,
        collections: &VisitorCollections,
        index: &DeclarationIndex,
        contains: HashMap<NodeId, NodeId>,
        nodes: &mut Vec<Node>,
    ) -> (Vec<Edge>, Vec<String>) {
        let mut edges = Vec::new();
        let mut unresolved = Vec::new();
        let mut external_modules: HashMap<String, NodeId> = HashMap::new();

        let mut resolve = |value: &ValueRef, scope_path_fallback: &[String]| -> Option<NodeId> {
            match value {
                ValueRef::NodeRef(id) => Some(id.clone()),
                ValueRef::Identifier { name, scope_path } => {
                    let path = if scope_path.is_empty() { scope_path_fallback } else { scope_path };
                    resolve_variable(index, name, path)
                }
                ValueRef::Literal(_) => None,
            }
        };

        for (child, parent) in &contains {
            edges.push(NodeFactory::contains_edge(parent, child));
        }

        // `variable_assignments` is the sole source of ASSIGNED_FROM/WRITES_TO for a
        // variable's value -- `VariableInfo.initializer` carries the same `ValueRef`
        // for node-metadata purposes but must not also emit an edge here, or every
        // initialized declaration would get a duplicate ASSIGNED_FROM.
        for assignment in &collections.variable_assignments {
            let Some(variable) = resolve(&assignment.target, &assignment.scope_path) else {
                continue;
            };
            let Some(source) = resolve(&assignment.source, &assignment.scope_path) else {
                if let ValueRef::Identifier { name, .. } = &assignment.source {
                    unresolved.push(format!("{}: identifier `{}` in initializer", file, name));
                }
                continue;
            };
            let is_call_source = nodes.iter().any(|n| n.id == source && n.kind() == NodeKind::Call);
            match assignment.kind {
                AssignmentKind::Declaration => {
                    edges.push(NodeFactory::edge(EdgeKind::AssignedFrom, &variable, &source));
                    if is_call_source {
                        edges.push(NodeFactory::edge(EdgeKind::DerivesFrom, &variable, &source));
                    }
                }
                AssignmentKind::Reassignment => {
                    edges.push(NodeFactory::edge(EdgeKind::WritesTo, &variable, &source));
                }
            }
        }

        for mutation in &collections.array_mutations {
            if let Some(target) = resolve(&mutation.target, &mutation.scope_path) {
                let mut metadata = serde_json::Map::new();
                metadata.insert("method".to_string(), serde_json::Value::from(mutation.method.clone()));
                edges.push(NodeFactory::edge_with_metadata(EdgeKind::Modifies, &mutation.call_id, &target, metadata));
            }
        }

        for mutation in &collections.object_mutations {
            let (Some(target), Some(value)) =
                (resolve(&mutation.target, &mutation.scope_path), resolve(&mutation.value, &mutation.scope_path))
            else {
                continue;
            };
            let mut metadata = serde_json::Map::new();
            metadata.insert("property".to_string(), serde_json::Value::from(mutation.property.clone()));
            edges.push(NodeFactory::edge_with_metadata(EdgeKind::Modifies, &target, &value, metadata));
        }

        for call in collections.calls.iter().chain(collections.method_calls.iter()) {
            for arg in &call.arguments {
                if let Some(target) = resolve(arg, &call.scope_path) {
                    edges.push(NodeFactory::edge(EdgeKind::PassesArgument, &call.id, &target));
                }
            }
            if let Some(object) = &call.object {
                if let Some(target) = resolve(&ValueRef::Identifier { name: object.clone(), scope_path: call.scope_path.clone() }, &call.scope_path) {
                    edges.push(NodeFactory::edge(EdgeKind::CallsOn, &call.id, &target));
                }
            }
        }

        for expr in &collections.expressions {
            for operand in &expr.derives_from {
                if let Some(target) = resolve(operand, &expr.scope_path) {
                    edges.push(NodeFactory::edge(EdgeKind::DerivesFrom, &expr.id, &target));
                }
            }
        }

        for l in &collections.loops {
            if let Some(value) = &l.iterates_over {
                if let Some(target) = resolve(value, &l.scope_path) {
                    edges.push(NodeFactory::edge(EdgeKind::IteratesOver, &l.id, &target));
                }
            }
        }

        for prop in &collections.object_properties {
            if let Some(target) = resolve(&prop.value, &prop.value_scope_path) {
                let mut metadata = serde_json::Map::new();
                metadata.insert("key".to_string(), serde_json::Value::from(prop.key.clone()));
                edges.push(NodeFactory::edge_with_metadata(EdgeKind::HasProperty, &prop.object_literal_id, &target, metadata));
            }
        }

        for elem in &collections.array_elements {
            if let Some(target) = resolve(&elem.value, &elem.value_scope_path) {
                let mut metadata = serde_json::Map::new();
                metadata.insert("index".to_string(), serde_json::Value::from(elem.index));
                edges.push(NodeFactory::edge_with_metadata(EdgeKind::HasElement, &elem.array_literal_id, &target, metadata));
            }
        }

        for imp in &collections.imports {
            if imp.is_dynamic && imp.is_resolvable == Some(false) {
                continue;
            }
            if is_relative(&imp.source) {
                continue;
            }
            let package = package_name_of(&imp.source).to_string();
            let ext_id = external_modules
                .entry(package.clone())
                .or_insert_with(|| {
                    let id = crate::domain::IdBuilder::external_module(&package);
                    if !nodes.iter().any(|n| n.id == id) {
                        if let Ok(node) = NodeFactory::create_external_module(&package) {
                            nodes.push(node);
                        }
                    }
                    id
                })
                .clone();
            edges.push(NodeFactory::edge(EdgeKind::ImportsFrom, &imp.id, &ext_id));
        }

        (edges, unresolved)
    }

    pub fn build(file: &str, collections: &VisitorCollections) -> Result<BuildResult> {
        let (mut nodes, index, contains) = Self::create_nodes(file, collections)?;
        let (edges, unresolved) = Self::resolve_edges(file, collections, &index, contains, &mut nodes);
        Ok(BuildResult { nodes, edges, unresolved })
    }
}

/// The id's trailing `TYPE->name[#d]` segment, i.e. what was pushed onto
/// the scope stack for this declaration's body.
fn last_segment(id: &str) -> String {
    id.rsplit("->").next().unwrap_or(id).to_string()
}

fn extract_discriminator(id: &str) -> Option<u32> {
    id.rsplit_once('#').and_then(|(_, n)| n.parse().ok())
}
