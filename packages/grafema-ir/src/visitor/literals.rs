//! Object/array literal handler.

use crate::domain::{AstNode, NodeKind};

use super::collections::{ArrayElementInfo, ArrayLiteralInfo, ObjectLiteralInfo, ObjectPropertyInfo};
use super::context::AnalyzerState;
use super::expr::value_ref_for;

/// `{ a: 1, b: other }`. Emits one `ObjectPropertyInfo` per `key`/`value`
/// pair; when a value is a bare identifier, the scope path active at the
/// moment of the visit is captured as `valueScopePath` so the builder can
/// resolve it later even if the literal itself gets hoisted into an
/// ancestor's metadata.
pub fn visit_object_expression(state: &mut AnalyzerState, node: &dyn AstNode) -> crate::domain::NodeId {
    let discriminator = state.next_call_site_discriminator(NodeKind::Expression, "<object>");
    let id = crate::domain::IdBuilder::arrow_discriminated(
        NodeKind::Expression,
        "<object>",
        &state.current_context(),
        discriminator,
    );

    for i in 0..node.child_count() {
        let Some(property) = node.child(i) else {
            continue;
        };
        let Some(key) = property.field("key") else {
            continue;
        };
        let Some(value) = property.field("value") else {
            continue;
        };
        let value_scope_path = state.current_context().scope_path;
        let value = value_ref_for(state, value.as_ref());
        state.collections.object_properties.push(ObjectPropertyInfo {
            object_literal_id: id.clone(),
            key: key.text().to_string(),
            value,
            value_scope_path,
        });
    }

    state.collections.object_literals.push(ObjectLiteralInfo {
        id: id.clone(),
        file: state.file(),
        line: node.start_line(),
        column: node.start_column(),
        scope_path: state.current_context().scope_path,
    });
    id
}

/// `[a, b, c]`. One `ArrayElementInfo` per positional element, same
/// `valueScopePath` capture rule as object properties.
pub fn visit_array_expression(state: &mut AnalyzerState, node: &dyn AstNode) -> crate::domain::NodeId {
    let discriminator = state.next_call_site_discriminator(NodeKind::Expression, "<array>");
    let id = crate::domain::IdBuilder::arrow_discriminated(
        NodeKind::Expression,
        "<array>",
        &state.current_context(),
        discriminator,
    );

    for i in 0..node.child_count() {
        let Some(element) = node.child(i) else {
            continue;
        };
        let value_scope_path = state.current_context().scope_path;
        let value = value_ref_for(state, element.as_ref());
        state.collections.array_elements.push(ArrayElementInfo {
            array_literal_id: id.clone(),
            index: i,
            value,
            value_scope_path,
        });
    }

    state.collections.array_literals.push(ArrayLiteralInfo {
        id: id.clone(),
        file: state.file(),
        line: node.start_line(),
        column: node.start_column(),
        scope_path: state.current_context().scope_path,
    });
    id
}
