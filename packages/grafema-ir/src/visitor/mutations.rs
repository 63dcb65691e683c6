//! `AssignmentExpression` handler. Plain reassignment (`x = value;`) extends the same
//! `variable_assignments` collection the declaration handler populates, just
//! tagged [`AssignmentKind::Reassignment`] since the target's id isn't known
//! at visit time and must be resolved by name in the builder. Property
//! mutation (`obj.prop = value;`) is recorded separately since its edge
//! (`MODIFIES`) carries the property name as metadata rather than pointing
//! straight at a declaration.

use crate::domain::AstNode;

use super::collections::{AssignmentKind, ObjectMutationInfo, ValueRef, VariableAssignmentInfo};
use super::context::AnalyzerState;
use super::expr::value_ref_for;

/// `left = right;`. Only the plain-assignment operator (`=`) is tracked;
/// compound operators (`+=`, `||=`, ...) read their own current value as
/// part of the right-hand side and are left to the generic structural walk.
pub fn visit_assignment_expression(state: &mut AnalyzerState, node: &dyn AstNode) {
    if node.field("operator").map(|n| n.text().to_string()).is_some_and(|op| !op.is_empty() && op != "=") {
        return;
    }
    let Some(left) = node.field("left") else { return };
    let Some(right) = node.field("right") else { return };
    let source = value_ref_for(state, right.as_ref());
    let scope_path = state.current_context().scope_path;

    match left.kind() {
        "Identifier" => {
            state.collections.variable_assignments.push(VariableAssignmentInfo {
                target: ValueRef::Identifier { name: left.text().to_string(), scope_path: scope_path.clone() },
                source,
                scope_path,
                kind: AssignmentKind::Reassignment,
            });
        }
        "MemberExpression" => {
            let Some(object) = left.field("object") else { return };
            let Some(property) = left.field("property") else { return };
            if left.flag("computed") {
                return;
            }
            state.collections.object_mutations.push(ObjectMutationInfo {
                target: value_ref_for(state, object.as_ref()),
                property: property.text().to_string(),
                value: source,
                scope_path,
            });
        }
        _ => {}
    }
}
