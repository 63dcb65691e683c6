//! Function/class/type-level declaration handlers.

use crate::domain::{AstNode, NodeId, NodeKind};

use super::collections::{ClassInfo, EnumInfo, FunctionInfo, InterfaceInfo, ParameterInfo, TypeInfo};
use super::context::AnalyzerState;

fn comma_separated(node: &dyn AstNode, field: &str) -> Vec<String> {
    (0..node.child_count())
        .filter_map(|i| node.child(i))
        .filter(|n| n.kind() == field)
        .map(|n| n.text().to_string())
        .collect()
}

/// `function name(a, b) {}` / `const f = function() {}` / `() => {}`.
/// Pushes a function scope for the duration the caller traverses the body,
/// registers PARAMETER nodes for each declared parameter, and returns the
/// new FUNCTION node's id so the caller can `exit_function` afterwards.
///
/// Anonymous functions (`name` is empty -- arrow functions and function
/// expressions with no binding) always get a discriminator, named
/// declarations only on collision.
pub fn enter_function(
    state: &mut AnalyzerState,
    node: &dyn AstNode,
    name: &str,
    is_async: bool,
    is_generator: bool,
    is_arrow: bool,
) -> NodeId {
    let display_name = if name.is_empty() { "<anonymous>" } else { name };
    let discriminator = if name.is_empty() {
        Some(state.next_call_site_discriminator(NodeKind::Function, display_name))
    } else {
        state.declaration_discriminator(NodeKind::Function, display_name)
    };
    let id = match discriminator {
        Some(d) => crate::domain::IdBuilder::arrow_discriminated(
            NodeKind::Function,
            display_name,
            &state.current_context(),
            d,
        ),
        None => crate::domain::IdBuilder::arrow(NodeKind::Function, display_name, &state.current_context()),
    };

    let parent_scope_id = state.scope.current_function_id().cloned();
    state.collections.functions.push(FunctionInfo {
        id: id.clone(),
        name: display_name.to_string(),
        file: state.file(),
        line: node.start_line(),
        column: node.start_column(),
        scope_path: state.current_context().scope_path,
        parent_scope_id,
        is_async,
        is_generator,
        is_arrow,
    });

    for param_name in comma_separated(node, "Identifier") {
        state.collections.parameters.push(ParameterInfo {
            id: crate::domain::IdBuilder::arrow(NodeKind::Parameter, &param_name, &state.current_context()),
            name: param_name,
            file: state.file(),
            line: node.start_line(),
            column: node.start_column(),
            function_id: id.clone(),
        });
    }

    // Push the *discriminated* name, not the bare name, so two sibling
    // anonymous (or colliding named) functions don't collapse their
    // children's scope paths onto the same key.
    let scope_frame_name = match discriminator {
        Some(d) => format!("{}#{}", display_name, d),
        None => display_name.to_string(),
    };
    state.scope.enter_scope(scope_frame_name);
    state.scope.push_function(id.clone());
    id
}

pub fn exit_function(state: &mut AnalyzerState) -> crate::domain::Result<()> {
    state.scope.pop_function();
    state.scope.exit_scope()
}

/// `class Name extends Base implements IFoo, IBar {}`.
pub fn visit_class_declaration(
    state: &mut AnalyzerState,
    node: &dyn AstNode,
    name: &str,
    extends: Option<String>,
    implements: Vec<String>,
) -> NodeId {
    let id = crate::domain::IdBuilder::arrow(NodeKind::Class, name, &state.current_context());
    state.collections.classes.push(ClassInfo {
        id: id.clone(),
        name: name.to_string(),
        file: state.file(),
        line: node.start_line(),
        column: node.start_column(),
        scope_path: state.current_context().scope_path,
        extends,
        implements,
    });
    id
}

/// `interface Foo extends Bar { x: string }`.
pub fn visit_interface_declaration(
    state: &mut AnalyzerState,
    node: &dyn AstNode,
    name: &str,
    extends: Vec<String>,
    properties: Vec<String>,
) -> NodeId {
    let id = crate::domain::IdBuilder::interface(&state.file(), name, node.start_line());
    state.collections.interfaces.push(InterfaceInfo {
        id: id.clone(),
        name: name.to_string(),
        file: state.file(),
        line: node.start_line(),
        column: node.start_column(),
        extends,
        properties,
        is_external: false,
    });
    id
}

pub fn visit_type_alias(state: &mut AnalyzerState, node: &dyn AstNode, name: &str) -> NodeId {
    let id = crate::domain::IdBuilder::arrow(NodeKind::Type, name, &state.current_context());
    state.collections.types.push(TypeInfo {
        id: id.clone(),
        name: name.to_string(),
        file: state.file(),
        line: node.start_line(),
        column: node.start_column(),
        scope_path: state.current_context().scope_path,
    });
    id
}

pub fn visit_enum_declaration(state: &mut AnalyzerState, node: &dyn AstNode, name: &str) -> NodeId {
    let id = crate::domain::IdBuilder::arrow(NodeKind::Enum, name, &state.current_context());
    state.collections.enums.push(EnumInfo {
        id: id.clone(),
        name: name.to_string(),
        file: state.file(),
        line: node.start_line(),
        column: node.start_column(),
        scope_path: state.current_context().scope_path,
    });
    id
}
