//! `VariableDeclaration` handler.

use crate::domain::AstNode;

use super::collections::{AssignmentKind, ValueRef, VariableAssignmentInfo, VariableInfo};
use super::context::AnalyzerState;
use super::expr::resolve_expression_value;

/// Collect the bound names of a (possibly destructured) declarator id.
/// Simple identifiers produce a single name; `ObjectPattern`/`ArrayPattern`
/// produce one name per leaf binding.
fn binding_names(id_node: &dyn AstNode) -> Vec<String> {
    match id_node.kind() {
        "Identifier" => vec![id_node.text().to_string()],
        "ObjectPattern" | "ArrayPattern" => (0..id_node.child_count())
            .filter_map(|i| id_node.child(i))
            .flat_map(|child| binding_names(child.as_ref()))
            .collect(),
        _ => vec![],
    }
}

/// `const x = a || b;` / `let y;` / `var [a, b] = pair;`. `node` is a
/// `VariableDeclaration`; its children are `VariableDeclarator`s, each with
/// an `id` field (identifier or destructuring pattern) and an optional
/// `init` field.
pub fn visit_variable_declaration(state: &mut AnalyzerState, node: &dyn AstNode, is_const: bool) {
    for i in 0..node.child_count() {
        let Some(declarator) = node.child(i) else {
            continue;
        };
        let Some(id_node) = declarator.field("id") else {
            continue;
        };
        let init = declarator.field("init");
        // Visited once per declarator, not per binding -- `const [a, b] =
        // f()` must produce exactly one CALL node for `f()`, not one per
        // destructured name.
        let initializer = init.as_deref().map(|n| resolve_expression_value(state, n));

        for name in binding_names(id_node.as_ref()) {
            let discriminator = state.declaration_discriminator(
                if is_const {
                    crate::domain::NodeKind::Constant
                } else {
                    crate::domain::NodeKind::Variable
                },
                &name,
            );
            let kind = if is_const {
                crate::domain::NodeKind::Constant
            } else {
                crate::domain::NodeKind::Variable
            };
            let id = match discriminator {
                Some(d) => crate::domain::IdBuilder::arrow_discriminated(kind, &name, &state.current_context(), d),
                None => crate::domain::IdBuilder::arrow(kind, &name, &state.current_context()),
            };

            if let Some(source) = initializer.clone() {
                state.collections.variable_assignments.push(VariableAssignmentInfo {
                    target: ValueRef::NodeRef(id.clone()),
                    source,
                    scope_path: state.current_context().scope_path,
                    kind: AssignmentKind::Declaration,
                });
            }

            state.collections.variables_or_constants(is_const).push(VariableInfo {
                id,
                name,
                file: state.file(),
                line: declarator.start_line(),
                column: declarator.start_column(),
                scope_path: state.current_context().scope_path,
                parent_scope_id: None,
                is_const,
                initializer: initializer.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeNode;

    fn declarator(name: &str, init: Option<FakeNode>) -> FakeNode {
        let mut d = FakeNode::new("VariableDeclarator").with_field("id", FakeNode::leaf("Identifier", name));
        if let Some(init) = init {
            d = d.with_field("init", init);
        }
        d
    }

    #[test]
    fn const_declaration_emits_constant() {
        let mut state = AnalyzerState::for_file("index.js");
        let node = FakeNode::new("VariableDeclaration")
            .with_child(declarator("x", Some(FakeNode::leaf("Identifier", "a"))));
        visit_variable_declaration(&mut state, &node, true);
        assert_eq!(state.collections.constants.len(), 1);
        assert_eq!(state.collections.constants[0].name, "x");
        assert!(state.collections.variables.is_empty());
    }

    #[test]
    fn let_declaration_emits_variable() {
        let mut state = AnalyzerState::for_file("index.js");
        let node = FakeNode::new("VariableDeclaration").with_child(declarator("y", None));
        visit_variable_declaration(&mut state, &node, false);
        assert_eq!(state.collections.variables.len(), 1);
        assert!(state.collections.variable_assignments.is_empty());
    }

    #[test]
    fn initializer_produces_variable_assignment() {
        let mut state = AnalyzerState::for_file("index.js");
        let node = FakeNode::new("VariableDeclaration")
            .with_child(declarator("z", Some(FakeNode::leaf("NumericLiteral", "42"))));
        visit_variable_declaration(&mut state, &node, false);
        assert_eq!(state.collections.variable_assignments.len(), 1);
    }

    #[test]
    fn destructuring_produces_one_node_per_binding() {
        let mut state = AnalyzerState::for_file("index.js");
        let pattern = FakeNode::new("ArrayPattern").with_children(vec![
            FakeNode::leaf("Identifier", "a"),
            FakeNode::leaf("Identifier", "b"),
        ]);
        let declarator = FakeNode::new("VariableDeclarator")
            .with_field("id", pattern)
            .with_field("init", FakeNode::leaf("Identifier", "pair"));
        let node = FakeNode::new("VariableDeclaration").with_child(declarator);
        visit_variable_declaration(&mut state, &node, false);
        assert_eq!(state.collections.variables.len(), 2);
        let names: Vec<&str> = state.collections.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
