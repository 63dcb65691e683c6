//! Info records emitted by AST visitors. Each handler is a
//! small, named routine that pushes one of these into the running
//! [`VisitorCollections`] bundle rather than writing to the graph directly
//! -- the graph builder consumes the whole bundle in a two-pass
//! write after the file's traversal completes.

use crate::domain::{ExportType, ImportBinding, ImportType, LoopKind, NodeId, ScopeKind};

/// Where a value came from, as seen by the visitor at the point of
/// reference -- captured eagerly so the builder never needs to re-derive position from an
/// edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueRef {
    /// An identifier reference, resolved later by the builder via
    /// `resolve_variable` against `scope_path`.
    Identifier { name: String, scope_path: Vec<String> },
    /// A literal value rendered as source text (number, string, boolean,
    /// null, template literal, regex...).
    Literal(String),
    /// Reference to an already-known node id (e.g. an EXPRESSION node
    /// created earlier in the same file for a nested sub-expression).
    NodeRef(NodeId),
}

#[derive(Debug, Clone)]
pub struct ModuleInfo {
    pub id: NodeId,
    pub file: String,
}

#[derive(Debug, Clone)]
pub struct FunctionInfo {
    pub id: NodeId,
    pub name: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub scope_path: Vec<String>,
    pub parent_scope_id: Option<NodeId>,
    pub is_async: bool,
    pub is_generator: bool,
    pub is_arrow: bool,
}

#[derive(Debug, Clone)]
pub struct ClassInfo {
    pub id: NodeId,
    pub name: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub scope_path: Vec<String>,
    pub extends: Option<String>,
    pub implements: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct InterfaceInfo {
    pub id: NodeId,
    pub name: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub extends: Vec<String>,
    pub properties: Vec<String>,
    pub is_external: bool,
}

#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub id: NodeId,
    pub name: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub scope_path: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct EnumInfo {
    pub id: NodeId,
    pub name: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub scope_path: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ImportInfo {
    pub id: NodeId,
    pub file: String,
    pub source: String,
    pub local: String,
    pub imported: Option<String>,
    pub import_type: ImportType,
    pub import_binding: ImportBinding,
    pub is_dynamic: bool,
    pub is_resolvable: Option<bool>,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone)]
pub struct ExportInfo {
    pub id: NodeId,
    pub file: String,
    pub name: String,
    pub local: Option<String>,
    pub is_default: bool,
    pub export_type: ExportType,
    pub source: Option<String>,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone)]
pub struct VariableInfo {
    pub id: NodeId,
    pub name: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub scope_path: Vec<String>,
    pub parent_scope_id: Option<NodeId>,
    pub is_const: bool,
    pub initializer: Option<ValueRef>,
}

#[derive(Debug, Clone)]
pub struct ParameterInfo {
    pub id: NodeId,
    pub name: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub function_id: NodeId,
}

#[derive(Debug, Clone)]
pub struct ScopeInfo {
    pub id: NodeId,
    pub name: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub scope_path: Vec<String>,
    pub scope_type: ScopeKind,
    pub parent_scope_id: Option<NodeId>,
    pub parent_function_id: Option<NodeId>,
    pub conditional: bool,
}

#[derive(Debug, Clone)]
pub struct CallInfo {
    pub id: NodeId,
    pub name: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub scope_path: Vec<String>,
    pub object: Option<String>,
    pub method: Option<String>,
    pub is_new: bool,
    pub is_awaited: bool,
    pub is_dynamic: bool,
    /// Values passed positionally.
    pub arguments: Vec<ValueRef>,
}

impl CallInfo {
    pub fn is_method_call(&self) -> bool {
        self.object.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct ExpressionInfo {
    pub id: NodeId,
    pub name: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub scope_path: Vec<String>,
    pub expression_type: String,
    pub operator: Option<String>,
    pub left_source_name: Option<String>,
    pub right_source_name: Option<String>,
    /// Operand values for DERIVES_FROM resolution: `x = a || b` produces
    /// DERIVES_FROM edges to both `a` and `b`.
    pub derives_from: Vec<ValueRef>,
}

#[derive(Debug, Clone)]
pub struct LoopInfo {
    pub id: NodeId,
    pub name: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub scope_path: Vec<String>,
    pub loop_kind: LoopKind,
    pub ignore_cardinality: bool,
    /// The iterated collection, if statically visible (e.g. `for (x of
    /// items)` -> `Identifier("items")`, `for (x of a.b())` -> a CallInfo
    /// reference captured by id).
    pub iterates_over: Option<ValueRef>,
}

#[derive(Debug, Clone)]
pub struct ObjectPropertyInfo {
    pub object_literal_id: NodeId,
    pub key: String,
    pub value: ValueRef,
    /// Scope path captured at the moment the property value was visited
    ///. Only meaningful when `value` is an `Identifier`.
    pub value_scope_path: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ArrayElementInfo {
    pub array_literal_id: NodeId,
    pub index: usize,
    pub value: ValueRef,
    pub value_scope_path: Vec<String>,
}

/// Whether a `VariableAssignmentInfo` is a declaration's own initializer
/// (`ASSIGNED_FROM`, plus `DERIVES_FROM` when the source is a call) or a
/// later plain reassignment (`x = ...;`, `WRITES_TO`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentKind {
    Declaration,
    Reassignment,
}

#[derive(Debug, Clone)]
pub struct VariableAssignmentInfo {
    /// The declaration's own id at declaration time (`ValueRef::NodeRef`);
    /// an unresolved `ValueRef::Identifier` for a later reassignment, since
    /// the declaration's id isn't known at visit time.
    pub target: ValueRef,
    pub source: ValueRef,
    pub scope_path: Vec<String>,
    pub kind: AssignmentKind,
}

/// `arr.push(x)` and friends. Recorded
/// alongside the CALL node the call-expression handler already created --
/// `call_id` is that CALL's id, `target` the receiver being mutated.
#[derive(Debug, Clone)]
pub struct ArrayMutationInfo {
    pub call_id: NodeId,
    pub target: ValueRef,
    pub method: String,
    pub scope_path: Vec<String>,
}

/// `obj.prop = value;`.
#[derive(Debug, Clone)]
pub struct ObjectMutationInfo {
    pub target: ValueRef,
    pub property: String,
    pub value: ValueRef,
    pub scope_path: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectLiteralInfo {
    pub id: NodeId,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub scope_path: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ArrayLiteralInfo {
    pub id: NodeId,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub scope_path: Vec<String>,
}

/// Everything a single file's traversal produced, one `Vec` per collection
/// kind. The graph builder consumes this bundle wholesale.
#[derive(Debug, Clone, Default)]
pub struct VisitorCollections {
    pub modules: Vec<ModuleInfo>,
    pub functions: Vec<FunctionInfo>,
    pub classes: Vec<ClassInfo>,
    pub interfaces: Vec<InterfaceInfo>,
    pub types: Vec<TypeInfo>,
    pub enums: Vec<EnumInfo>,
    pub imports: Vec<ImportInfo>,
    pub exports: Vec<ExportInfo>,
    pub variables: Vec<VariableInfo>,
    pub constants: Vec<VariableInfo>,
    pub parameters: Vec<ParameterInfo>,
    pub scopes: Vec<ScopeInfo>,
    pub calls: Vec<CallInfo>,
    pub method_calls: Vec<CallInfo>,
    pub expressions: Vec<ExpressionInfo>,
    pub loops: Vec<LoopInfo>,
    pub object_literals: Vec<ObjectLiteralInfo>,
    pub array_literals: Vec<ArrayLiteralInfo>,
    pub object_properties: Vec<ObjectPropertyInfo>,
    pub array_elements: Vec<ArrayElementInfo>,
    pub variable_assignments: Vec<VariableAssignmentInfo>,
    pub array_mutations: Vec<ArrayMutationInfo>,
    pub object_mutations: Vec<ObjectMutationInfo>,
    pub contains_edges: Vec<(NodeId, NodeId)>,
    /// Set when any CALL/LOOP/IMPORT at module level is awaited.
    pub has_top_level_await: bool,
}

impl VisitorCollections {
    pub fn variables_or_constants(&mut self, is_const: bool) -> &mut Vec<VariableInfo> {
        if is_const {
            &mut self.constants
        } else {
            &mut self.variables
        }
    }
}
