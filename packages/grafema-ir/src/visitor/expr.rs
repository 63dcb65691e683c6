//! Expression-shaped AST helpers shared by several handlers: resolving an
//! arbitrary expression node down to a [`ValueRef`], and the call-expression
//! / logical-expression handlers themselves.

use crate::domain::AstNode;

use super::collections::ValueRef;
use super::context::AnalyzerState;

/// Resolve an arbitrary expression node to a [`ValueRef`] the builder can
/// later turn into an edge. Bare identifiers defer to scope-aware
/// resolution; everything else is recorded as source text.
pub fn value_ref_for(state: &AnalyzerState, node: &dyn AstNode) -> ValueRef {
    match node.kind() {
        "Identifier" => ValueRef::Identifier {
            name: node.text().to_string(),
            scope_path: state.current_context().scope_path,
        },
        _ => ValueRef::Literal(truncated_source_text(node)),
    }
}

/// Like [`value_ref_for`], but for a node appearing as a declaration
/// initializer or assignment right-hand side: a call, object/array literal,
/// or logical/binary expression is visited on the spot so the resulting
/// `ValueRef` points straight at the node the visit produced, the same way
/// the loop handler links `ITERATES_OVER` straight at a `right` field's
/// CALL node. Anything else falls back to
/// [`value_ref_for`].
pub fn resolve_expression_value(state: &mut AnalyzerState, node: &dyn AstNode) -> ValueRef {
    match node.kind() {
        "CallExpression" => super::calls::visit_call_expression(state, node, false)
            .map(ValueRef::NodeRef)
            .unwrap_or_else(|| value_ref_for(state, node)),
        "NewExpression" => super::calls::visit_call_expression(state, node, true)
            .map(ValueRef::NodeRef)
            .unwrap_or_else(|| value_ref_for(state, node)),
        "ObjectExpression" => ValueRef::NodeRef(super::literals::visit_object_expression(state, node)),
        "ArrayExpression" => ValueRef::NodeRef(super::literals::visit_array_expression(state, node)),
        "LogicalExpression" | "BinaryExpression" => {
            ValueRef::NodeRef(super::expressions::visit_binary_like_expression(state, node, node.kind()))
        }
        _ => value_ref_for(state, node),
    }
}

/// Human-readable rendering of an operand for expression names: an
/// identifier renders as itself, anything else renders as `…`.
pub fn operand_display_name(node: &dyn AstNode) -> String {
    if node.kind() == "Identifier" {
        node.text().to_string()
    } else {
        "\u{2026}".to_string()
    }
}

pub fn operand_source_name(node: &dyn AstNode) -> Option<String> {
    if node.kind() == "Identifier" {
        Some(node.text().to_string())
    } else {
        None
    }
}

fn truncated_source_text(node: &dyn AstNode) -> String {
    node.text().chars().take(64).collect()
}

/// Truncate a human name to <=64 chars on char boundaries.
pub fn truncate_human_name(name: &str) -> String {
    if name.chars().count() <= 64 {
        name.to_string()
    } else {
        name.chars().take(64).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeNode;

    #[test]
    fn truncate_human_name_respects_char_boundaries() {
        let long = "あ".repeat(100);
        let truncated = truncate_human_name(&long);
        assert_eq!(truncated.chars().count(), 64);
    }

    #[test]
    fn operand_display_name_uses_ellipsis_for_non_identifier() {
        let node = FakeNode::leaf("NumericLiteral", "42");
        assert_eq!(operand_display_name(&node), "\u{2026}");
    }

    #[test]
    fn operand_display_name_uses_identifier_text() {
        let node = FakeNode::leaf("Identifier", "a");
        assert_eq!(operand_display_name(&node), "a");
    }
}
