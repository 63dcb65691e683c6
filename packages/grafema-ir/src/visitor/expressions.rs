//! LogicalExpression / BinaryExpression handler, and its DERIVES_FROM
//! wiring to each operand.

use crate::domain::{AstNode, NodeKind};

use super::collections::ExpressionInfo;
use super::context::AnalyzerState;
use super::expr::{operand_display_name, operand_source_name, truncate_human_name, value_ref_for};

/// `a || b`, `a && b`, `a ?? b`, and general binary expressions. Emits an
/// EXPRESSION node with a human `name` like `"a || b"`, `leftSourceName`/
/// `rightSourceName` captured when operands are bare identifiers, and
/// `derivesFrom` operand references the builder turns into DERIVES_FROM
/// edges.
pub fn visit_binary_like_expression(
    state: &mut AnalyzerState,
    node: &dyn AstNode,
    expression_type: &str,
) -> crate::domain::NodeId {
    let left = node.field("left");
    let right = node.field("right");
    let operator = node.field("operator").map(|n| n.text().to_string());

    let left_display = left.as_deref().map(operand_display_name).unwrap_or_else(|| "\u{2026}".to_string());
    let right_display = right.as_deref().map(operand_display_name).unwrap_or_else(|| "\u{2026}".to_string());
    let op_display = operator.clone().unwrap_or_default();
    let name = truncate_human_name(&format!("{} {} {}", left_display, op_display, right_display));

    let left_source_name = left.as_deref().and_then(operand_source_name);
    let right_source_name = right.as_deref().and_then(operand_source_name);

    let mut derives_from = Vec::new();
    if let Some(l) = &left {
        derives_from.push(value_ref_for(state, l.as_ref()));
    }
    if let Some(r) = &right {
        derives_from.push(value_ref_for(state, r.as_ref()));
    }

    let discriminator = state.next_call_site_discriminator(NodeKind::Expression, &name);
    let info = ExpressionInfo {
        id: crate::domain::IdBuilder::arrow_discriminated(
            NodeKind::Expression,
            &name,
            &state.current_context(),
            discriminator,
        ),
        name,
        file: state.file(),
        line: node.start_line(),
        column: node.start_column(),
        scope_path: state.current_context().scope_path,
        expression_type: expression_type.to_string(),
        operator,
        left_source_name,
        right_source_name,
        derives_from,
    };
    let id = info.id.clone();
    state.collections.expressions.push(info);
    id
}
