//! The AST visitor: a single recursive traversal dispatching on
//! `node.kind()` that fills a [`VisitorCollections`] bundle
//! for one file. Each handler lives in its own module, grouped by the
//! concern it covers rather than by AST shape.

pub mod calls;
pub mod collections;
pub mod context;
pub mod declarations;
pub mod expr;
pub mod expressions;
pub mod functions;
pub mod imports_exports;
pub mod literals;
pub mod loops;
pub mod mutations;

pub use collections::{AssignmentKind, ValueRef, VisitorCollections};
pub use context::AnalyzerState;

use crate::domain::{AstNode, AstParser, AstTree, LoopKind, Result, ScopeKind};

/// Parse `content` and walk the resulting tree, returning everything the
/// traversal produced. One call per file; the returned bundle is
/// independent of any other file's.
pub fn analyze_file(parser: &dyn AstParser, file: &str, content: &str) -> Result<VisitorCollections> {
    let tree = parser
        .parse(content)
        .map_err(crate::domain::GrafemaError::ParseFailed)?;
    let mut state = AnalyzerState::for_file(file);
    visit_node(&mut state, tree.root_node().as_ref());
    Ok(state.collections)
}

/// Visit an arbitrary node and its descendants. Constructs the visitor
/// doesn't specifically recognize fall back to a structural walk of their
/// children so traversal never silently stops partway through a file.
pub fn visit_node(state: &mut AnalyzerState, node: &dyn AstNode) {
    match node.kind() {
        "Program" | "BlockStatement" | "ExpressionStatement" | "ReturnStatement" => {
            visit_children(state, node);
        }

        "VariableDeclaration" => {
            let is_const = node.flag("const");
            declarations::visit_variable_declaration(state, node, is_const);
        }

        "FunctionDeclaration" | "FunctionExpression" | "ArrowFunctionExpression" => {
            let is_arrow = node.kind() == "ArrowFunctionExpression";
            let name = node.field("id").map(|n| n.text().to_string()).unwrap_or_default();
            functions::enter_function(
                state,
                node,
                &name,
                node.flag("async"),
                node.flag("generator"),
                is_arrow,
            );
            if let Some(body) = node.field("body") {
                visit_node(state, body.as_ref());
            }
            let _ = functions::exit_function(state);
        }

        "ClassDeclaration" => {
            let name = node.field("id").map(|n| n.text().to_string()).unwrap_or_default();
            let extends = node.field("superClass").map(|n| n.text().to_string());
            let implements = field_names(node, "implements");
            functions::visit_class_declaration(state, node, &name, extends, implements);
            if let Some(body) = node.field("body") {
                state.scope.enter_scope(name);
                visit_children(state, body.as_ref());
                let _ = state.scope.exit_scope();
            }
        }

        "TSInterfaceDeclaration" => {
            let name = node.field("id").map(|n| n.text().to_string()).unwrap_or_default();
            let extends = field_names(node, "extends");
            let properties = field_names(node, "property");
            functions::visit_interface_declaration(state, node, &name, extends, properties);
        }

        "TSTypeAliasDeclaration" => {
            let name = node.field("id").map(|n| n.text().to_string()).unwrap_or_default();
            functions::visit_type_alias(state, node, &name);
        }

        "TSEnumDeclaration" => {
            let name = node.field("id").map(|n| n.text().to_string()).unwrap_or_default();
            functions::visit_enum_declaration(state, node, &name);
        }

        "ImportDeclaration" => imports_exports::visit_import_declaration(state, node),
        "ImportExpression" => {
            let receiving_var = node.field("receiver").map(|n| n.text().to_string());
            imports_exports::visit_dynamic_import(state, node, receiving_var.as_deref());
        }
        "ExportNamedDeclaration" => imports_exports::visit_export_named(state, node),
        "ExportDefaultDeclaration" => {
            let local = node.field("declaration").map(|n| n.text().to_string());
            imports_exports::visit_export_default(state, node, local);
        }
        "ExportAllDeclaration" => imports_exports::visit_export_all(state, node),

        "CallExpression" => {
            calls::visit_call_expression(state, node, false);
        }
        "NewExpression" => {
            calls::visit_call_expression(state, node, true);
        }

        "LogicalExpression" | "BinaryExpression" => {
            expressions::visit_binary_like_expression(state, node, node.kind());
        }

        "AssignmentExpression" => {
            mutations::visit_assignment_expression(state, node);
            if let Some(right) = node.field("right") {
                if matches!(right.kind(), "CallExpression" | "NewExpression" | "ObjectExpression" | "ArrayExpression" | "LogicalExpression" | "BinaryExpression") {
                    visit_node(state, right.as_ref());
                }
            }
        }

        "ObjectExpression" => {
            literals::visit_object_expression(state, node);
        }
        "ArrayExpression" => {
            literals::visit_array_expression(state, node);
        }

        "ForStatement" => visit_loop_with_scope(state, node, LoopKind::For, ScopeKind::For),
        "ForInStatement" => visit_loop_with_scope(state, node, LoopKind::ForIn, ScopeKind::For),
        "ForOfStatement" => visit_loop_with_scope(state, node, LoopKind::ForOf, ScopeKind::For),
        "WhileStatement" => visit_loop_with_scope(state, node, LoopKind::While, ScopeKind::While),
        "DoWhileStatement" => visit_loop_with_scope(state, node, LoopKind::DoWhile, ScopeKind::While),

        "IfStatement" => {
            loops_scope(state, node, ScopeKind::If, "consequent");
            if let Some(alt) = node.field("alternate") {
                loops_scope(state, &*alt, ScopeKind::Else, "_self");
            }
        }
        "TryStatement" => {
            loops_scope(state, node, ScopeKind::Try, "block");
            if let Some(handler) = node.field("handler") {
                loops_scope(state, &*handler, ScopeKind::Catch, "body");
            }
            if let Some(finalizer) = node.field("finalizer") {
                loops_scope(state, &*finalizer, ScopeKind::Finally, "_self");
            }
        }
        "SwitchStatement" => loops_scope(state, node, ScopeKind::Switch, "_children"),

        _ => visit_children(state, node),
    }
}

fn visit_children(state: &mut AnalyzerState, node: &dyn AstNode) {
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            visit_node(state, child.as_ref());
        }
    }
}

/// Enter a counted scope of `kind`, visit `field` on `node` (or `node`
/// itself when `field` is `"_self"`/`"_children"`), then exit. Used for the
/// purely lexical constructs (`if`/`else`/`try`/`catch`/`finally`/
/// `switch`) that don't bind a name of their own.
fn loops_scope(state: &mut AnalyzerState, node: &dyn AstNode, kind: ScopeKind, field: &str) {
    push_scope_node(state, node, kind);
    match field {
        "_self" => visit_node(state, node),
        "_children" => visit_children(state, node),
        _ => {
            if let Some(target) = node.field(field) {
                visit_node(state, target.as_ref());
            }
        }
    }
    let _ = state.scope.exit_scope();
}

fn visit_loop_with_scope(state: &mut AnalyzerState, node: &dyn AstNode, loop_kind: LoopKind, scope_kind: ScopeKind) {
    loops::visit_loop(state, node, loop_kind);
    push_scope_node(state, node, scope_kind);
    if let Some(body) = node.field("body") {
        visit_node(state, body.as_ref());
    }
    let _ = state.scope.exit_scope();
}

/// Enter a counted scope and register the corresponding SCOPE node
///. `conditional` is true for `if`/`else` branches --
/// the only scope kinds that may not execute at all.
fn push_scope_node(state: &mut AnalyzerState, node: &dyn AstNode, kind: ScopeKind) {
    let outer_path = state.current_context().scope_path;
    let parent_function_id = state.scope.current_function_id().cloned();
    let name = state.scope.enter_counted_scope(kind);
    let id = crate::domain::IdBuilder::arrow(crate::domain::NodeKind::Scope, &name, &context_with_path(state, &outer_path));
    state.collections.scopes.push(collections::ScopeInfo {
        id,
        name,
        file: state.file(),
        line: node.start_line(),
        column: node.start_column(),
        scope_path: outer_path,
        scope_type: kind,
        parent_scope_id: None,
        parent_function_id,
        conditional: matches!(kind, ScopeKind::If | ScopeKind::Else),
    });
}

fn context_with_path(state: &AnalyzerState, scope_path: &[String]) -> crate::domain::AnalysisContext {
    crate::domain::AnalysisContext {
        file: state.file(),
        scope_path: scope_path.to_vec(),
    }
}

fn field_names(node: &dyn AstNode, field: &str) -> Vec<String> {
    (0..node.child_count())
        .filter_map(|i| node.child(i))
        .filter(|n| n.kind() == field)
        .map(|n| n.text().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeNode;

    #[test]
    fn program_with_function_and_call_produces_both_nodes() {
        let call = FakeNode::new("CallExpression").with_field("callee", FakeNode::leaf("Identifier", "log"));
        let body = FakeNode::new("BlockStatement").with_child(FakeNode::new("ExpressionStatement").with_child(call));
        let func = FakeNode::new("FunctionDeclaration")
            .with_field("id", FakeNode::leaf("Identifier", "run"))
            .with_field("body", body);
        let program = FakeNode::new("Program").with_child(func);

        let mut state = AnalyzerState::for_file("index.js");
        visit_node(&mut state, &program);

        assert_eq!(state.collections.functions.len(), 1);
        assert_eq!(state.collections.functions[0].name, "run");
        assert_eq!(state.collections.calls.len(), 1);
    }

    #[test]
    fn if_block_creates_counted_scope_for_its_contents() {
        let inner_call = FakeNode::new("CallExpression").with_field("callee", FakeNode::leaf("Identifier", "f"));
        let consequent = FakeNode::new("BlockStatement").with_child(inner_call);
        let if_stmt = FakeNode::new("IfStatement").with_field("consequent", consequent);

        let mut state = AnalyzerState::for_file("index.js");
        visit_node(&mut state, &if_stmt);

        assert_eq!(state.collections.calls.len(), 1);
        assert_eq!(state.collections.calls[0].scope_path, vec!["if#0".to_string()]);
    }

    #[test]
    fn for_of_loop_visits_its_body() {
        let call = FakeNode::new("CallExpression").with_field("callee", FakeNode::leaf("Identifier", "handle"));
        let body = FakeNode::new("BlockStatement").with_child(call);
        let loop_node = FakeNode::new("ForOfStatement")
            .with_field("right", FakeNode::leaf("Identifier", "items"))
            .with_field("body", body);

        let mut state = AnalyzerState::for_file("index.js");
        visit_node(&mut state, &loop_node);

        assert_eq!(state.collections.loops.len(), 1);
        assert_eq!(state.collections.calls.len(), 1);
    }
}
