//! Call-expression handler.

use crate::domain::{AstNode, NodeKind};

use super::collections::{ArrayMutationInfo, CallInfo, ValueRef};
use super::context::AnalyzerState;
use super::expr::value_ref_for;

/// `Array.prototype` methods that mutate their receiver in place. Non-mutating methods (`map`, `filter`,
/// `slice`, ...) are deliberately excluded.
const MUTATING_ARRAY_METHODS: &[&str] =
    &["push", "pop", "shift", "unshift", "splice", "sort", "reverse", "fill", "copyWithin"];

/// `f(...)`, `obj.method(...)`, `new Ctor(...)`, `await f(...)`. The callee
/// is read from the `callee` field; arguments are the node's children.
/// Returns the id of the CALL node it created, so callers (e.g. a variable
/// initializer, or the dynamic-import handler) can link to it.
pub fn visit_call_expression(state: &mut AnalyzerState, node: &dyn AstNode, is_new: bool) -> Option<crate::domain::NodeId> {
    let callee = node.field("callee")?;
    let is_awaited = node.flag("awaited");
    if is_awaited {
        state.mark_top_level_await();
    }

    let (name, object, method, is_dynamic) = match callee.kind() {
        "Identifier" => (callee.text().to_string(), None, None, false),
        "MemberExpression" => {
            let object_node = callee.field("object");
            let property_node = callee.field("property");
            let object = object_node.as_ref().map(|n| n.text().to_string());
            let method = property_node.as_ref().map(|n| n.text().to_string());
            let is_dynamic = callee.flag("computed");
            (
                method.clone().unwrap_or_default(),
                object,
                method,
                is_dynamic,
            )
        }
        _ => (callee.text().to_string(), None, None, true),
    };

    let arguments = (0..node.child_count())
        .filter_map(|i| node.child(i))
        .map(|arg| value_ref_for(state, arg.as_ref()))
        .collect();

    let discriminator = state.next_call_site_discriminator(NodeKind::Call, &name);
    let info = CallInfo {
        id: crate::domain::IdBuilder::arrow_discriminated(
            NodeKind::Call,
            &name,
            &state.current_context(),
            discriminator,
        ),
        name,
        file: state.file(),
        line: node.start_line(),
        column: node.start_column(),
        scope_path: state.current_context().scope_path,
        object,
        method,
        is_new,
        is_awaited,
        is_dynamic,
        arguments,
    };
    let id = info.id.clone();
    if let (Some(object), Some(method)) = (&info.object, &info.method) {
        if MUTATING_ARRAY_METHODS.contains(&method.as_str()) {
            state.collections.array_mutations.push(ArrayMutationInfo {
                call_id: id.clone(),
                target: ValueRef::Identifier { name: object.clone(), scope_path: info.scope_path.clone() },
                method: method.clone(),
                scope_path: info.scope_path.clone(),
            });
        }
    }
    if info.is_method_call() {
        state.collections.method_calls.push(info);
    } else {
        state.collections.calls.push(info);
    }
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeNode;

    #[test]
    fn direct_call_has_no_object() {
        let mut state = AnalyzerState::for_file("index.js");
        let node = FakeNode::new("CallExpression")
            .with_field("callee", FakeNode::leaf("Identifier", "Router"));
        let id = visit_call_expression(&mut state, &node, false);
        assert!(id.is_some());
        assert_eq!(state.collections.calls.len(), 1);
        assert_eq!(state.collections.calls[0].name, "Router");
        assert!(state.collections.calls[0].object.is_none());
    }

    #[test]
    fn method_call_records_object_and_method() {
        let mut state = AnalyzerState::for_file("index.js");
        let callee = FakeNode::new("MemberExpression")
            .with_field("object", FakeNode::leaf("Identifier", "console"))
            .with_field("property", FakeNode::leaf("Identifier", "log"));
        let node = FakeNode::new("CallExpression").with_field("callee", callee);
        visit_call_expression(&mut state, &node, false);
        assert_eq!(state.collections.method_calls.len(), 1);
        let call = &state.collections.method_calls[0];
        assert_eq!(call.object.as_deref(), Some("console"));
        assert_eq!(call.method.as_deref(), Some("log"));
    }

    #[test]
    fn new_expression_sets_is_new() {
        let mut state = AnalyzerState::for_file("index.js");
        let node = FakeNode::new("NewExpression")
            .with_field("callee", FakeNode::leaf("Identifier", "Router"));
        visit_call_expression(&mut state, &node, true);
        assert!(state.collections.calls[0].is_new);
    }

    #[test]
    fn awaited_call_sets_is_awaited_and_top_level_await() {
        let mut state = AnalyzerState::for_file("index.js");
        let node = FakeNode::new("CallExpression")
            .with_field("callee", FakeNode::leaf("Identifier", "fetchData"))
            .with_flag("awaited");
        visit_call_expression(&mut state, &node, false);
        assert!(state.collections.calls[0].is_awaited);
        assert!(state.collections.has_top_level_await);
    }

    #[test]
    fn repeated_call_site_gets_distinct_discriminators() {
        let mut state = AnalyzerState::for_file("index.js");
        let node = FakeNode::new("CallExpression").with_field("callee", FakeNode::leaf("Identifier", "log"));
        let first = visit_call_expression(&mut state, &node, false).unwrap();
        let second = visit_call_expression(&mut state, &node, false).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn mutating_array_method_is_recorded_as_mutation() {
        let mut state = AnalyzerState::for_file("index.js");
        let callee = FakeNode::new("MemberExpression")
            .with_field("object", FakeNode::leaf("Identifier", "items"))
            .with_field("property", FakeNode::leaf("Identifier", "push"));
        let node = FakeNode::new("CallExpression").with_field("callee", callee);
        visit_call_expression(&mut state, &node, false);
        assert_eq!(state.collections.array_mutations.len(), 1);
        assert_eq!(state.collections.array_mutations[0].method, "push");
    }

    #[test]
    fn non_mutating_array_method_is_not_recorded() {
        let mut state = AnalyzerState::for_file("index.js");
        let callee = FakeNode::new("MemberExpression")
            .with_field("object", FakeNode::leaf("Identifier", "items"))
            .with_field("property", FakeNode::leaf("Identifier", "map"));
        let node = FakeNode::new("CallExpression").with_field("callee", callee);
        visit_call_expression(&mut state, &node, false);
        assert!(state.collections.array_mutations.is_empty());
    }

    #[test]
    fn computed_member_call_is_dynamic() {
        let mut state = AnalyzerState::for_file("index.js");
        let callee = FakeNode::new("MemberExpression")
            .with_field("object", FakeNode::leaf("Identifier", "handlers"))
            .with_field("property", FakeNode::leaf("Identifier", "name"))
            .with_flag("computed");
        let node = FakeNode::new("CallExpression").with_field("callee", callee);
        visit_call_expression(&mut state, &node, false);
        assert!(state.collections.method_calls[0].is_dynamic);
    }
}
