//! Loop handler, including the `@grafema-ignore cardinality` leading
//! comment.

use crate::domain::{AstNode, LoopKind, NodeKind};

use super::calls::visit_call_expression;
use super::collections::{LoopInfo, ValueRef};
use super::context::AnalyzerState;
use super::expr::value_ref_for;

const IGNORE_CARDINALITY_MARKER: &str = "@grafema-ignore cardinality";

fn has_ignore_cardinality_comment(node: &dyn AstNode) -> bool {
    node.leading_line_comments()
        .iter()
        .any(|c| c.trim() == IGNORE_CARDINALITY_MARKER)
}

/// One handler for all loop kinds (`for`, `for-in`, `for-of`, `while`,
/// `do-while`). The iterated expression is read from the `right` field
/// (meaningful for `for-in`/`for-of`; absent otherwise). When that
/// expression is itself a call, the call is visited first so the loop's
/// `ITERATES_OVER` edge can point straight at the resulting CALL node --
/// the shape the cardinality enricher traces through.
pub fn visit_loop(state: &mut AnalyzerState, node: &dyn AstNode, loop_kind: LoopKind) {
    let ignore_cardinality = has_ignore_cardinality_comment(node);
    if node.flag("awaited") {
        state.mark_top_level_await();
    }

    let iterates_over = node.field("right").map(|right| match right.kind() {
        "CallExpression" => visit_call_expression(state, right.as_ref(), false)
            .map(ValueRef::NodeRef)
            .unwrap_or_else(|| ValueRef::Literal(right.text().to_string())),
        _ => value_ref_for(state, right.as_ref()),
    });

    let name = loop_kind_label(loop_kind);
    let discriminator = state.next_call_site_discriminator(NodeKind::Loop, name);
    let info = LoopInfo {
        id: crate::domain::IdBuilder::arrow_discriminated(
            NodeKind::Loop,
            name,
            &state.current_context(),
            discriminator,
        ),
        name: name.to_string(),
        file: state.file(),
        line: node.start_line(),
        column: node.start_column(),
        scope_path: state.current_context().scope_path,
        loop_kind,
        ignore_cardinality,
        iterates_over,
    };
    state.collections.loops.push(info);
}

fn loop_kind_label(kind: LoopKind) -> &'static str {
    match kind {
        LoopKind::For => "for",
        LoopKind::ForIn => "for-in",
        LoopKind::ForOf => "for-of",
        LoopKind::While => "while",
        LoopKind::DoWhile => "do-while",
    }
}
