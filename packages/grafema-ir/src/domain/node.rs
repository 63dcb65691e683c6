//! Node records -- one tagged variant per NodeKind.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::span::Span;

pub type NodeId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Module,
    Function,
    Class,
    Interface,
    Type,
    Enum,
    Import,
    Export,
    Variable,
    Constant,
    Parameter,
    Scope,
    Call,
    Expression,
    Loop,
    ExternalModule,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Module => "MODULE",
            NodeKind::Function => "FUNCTION",
            NodeKind::Class => "CLASS",
            NodeKind::Interface => "INTERFACE",
            NodeKind::Type => "TYPE",
            NodeKind::Enum => "ENUM",
            NodeKind::Import => "IMPORT",
            NodeKind::Export => "EXPORT",
            NodeKind::Variable => "VARIABLE",
            NodeKind::Constant => "CONSTANT",
            NodeKind::Parameter => "PARAMETER",
            NodeKind::Scope => "SCOPE",
            NodeKind::Call => "CALL",
            NodeKind::Expression => "EXPRESSION",
            NodeKind::Loop => "LOOP",
            NodeKind::ExternalModule => "EXTERNAL_MODULE",
        }
    }

    /// Arrow-form identity (scoped declarations) vs colon-form (positional
    /// identity).
    pub fn uses_arrow_identity(&self) -> bool {
        !matches!(
            self,
            NodeKind::Import | NodeKind::Export | NodeKind::Interface
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportType {
    Default,
    Named,
    Namespace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportBinding {
    Value,
    Type,
    Typeof,
}

impl Default for ImportBinding {
    fn default() -> Self {
        ImportBinding::Value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportType {
    Default,
    Named,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKind {
    For,
    While,
    If,
    Else,
    Try,
    Catch,
    Finally,
    Switch,
    Block,
    Function,
}

impl ScopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::For => "for",
            ScopeKind::While => "while",
            ScopeKind::If => "if",
            ScopeKind::Else => "else",
            ScopeKind::Try => "try",
            ScopeKind::Catch => "catch",
            ScopeKind::Finally => "finally",
            ScopeKind::Switch => "switch",
            ScopeKind::Block => "block",
            ScopeKind::Function => "function",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoopKind {
    For,
    ForIn,
    ForOf,
    While,
    DoWhile,
}

/// Kind-specific fields, one variant per `NodeKind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeData {
    Module,
    Function {
        parent_scope_id: Option<NodeId>,
        is_async: bool,
        is_generator: bool,
        is_arrow: bool,
    },
    Class {
        extends: Option<String>,
        implements: Vec<String>,
    },
    Interface {
        extends: Vec<String>,
        properties: Vec<String>,
        is_external: bool,
    },
    Type,
    Enum,
    Import {
        source: String,
        local: String,
        imported: Option<String>,
        import_type: ImportType,
        import_binding: ImportBinding,
        is_dynamic: bool,
        is_resolvable: Option<bool>,
    },
    Export {
        local: Option<String>,
        is_default: bool,
        export_type: ExportType,
        source: Option<String>,
    },
    Variable {
        parent_scope_id: Option<NodeId>,
    },
    Constant {
        parent_scope_id: Option<NodeId>,
    },
    Parameter {
        function_id: NodeId,
    },
    Scope {
        scope_type: ScopeKind,
        parent_scope_id: Option<NodeId>,
        parent_function_id: Option<NodeId>,
        conditional: bool,
    },
    Call {
        object: Option<String>,
        method: Option<String>,
        is_new: bool,
        is_awaited: bool,
        is_dynamic: bool,
    },
    Expression {
        expression_type: String,
        operator: Option<String>,
        left_source_name: Option<String>,
        right_source_name: Option<String>,
    },
    Loop {
        loop_kind: LoopKind,
        ignore_cardinality: bool,
    },
    ExternalModule {
        package_name: String,
    },
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Module => NodeKind::Module,
            NodeData::Function { .. } => NodeKind::Function,
            NodeData::Class { .. } => NodeKind::Class,
            NodeData::Interface { .. } => NodeKind::Interface,
            NodeData::Type => NodeKind::Type,
            NodeData::Enum => NodeKind::Enum,
            NodeData::Import { .. } => NodeKind::Import,
            NodeData::Export { .. } => NodeKind::Export,
            NodeData::Variable { .. } => NodeKind::Variable,
            NodeData::Constant { .. } => NodeKind::Constant,
            NodeData::Parameter { .. } => NodeKind::Parameter,
            NodeData::Scope { .. } => NodeKind::Scope,
            NodeData::Call { .. } => NodeKind::Call,
            NodeData::Expression { .. } => NodeKind::Expression,
            NodeData::Loop { .. } => NodeKind::Loop,
            NodeData::ExternalModule { .. } => NodeKind::ExternalModule,
        }
    }
}

/// A graph node. Created once during ANALYSIS and never mutated
/// structurally afterwards -- only `metadata` may be extended, via
/// [`Node::upsert_metadata`], by the ENRICHMENT phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub span: Option<Span>,
    pub metadata: Map<String, Value>,
    pub data: NodeData,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    /// Non-destructive merge of `updates` into this node's metadata map
    ///. Existing keys not present
    /// in `updates` are left untouched; keys present in both are
    /// overwritten with the new value.
    pub fn upsert_metadata(&mut self, updates: Map<String, Value>) {
        for (k, v) in updates {
            self.metadata.insert(k, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_kind_matches_data_variant() {
        let node = Node {
            id: "x".into(),
            name: "x".into(),
            file: "f.js".into(),
            line: 0,
            column: 0,
            span: None,
            metadata: Map::new(),
            data: NodeData::Variable {
                parent_scope_id: None,
            },
        };
        assert_eq!(node.kind(), NodeKind::Variable);
    }

    #[test]
    fn upsert_metadata_is_non_destructive() {
        let mut node = Node {
            id: "x".into(),
            name: "x".into(),
            file: "f.js".into(),
            line: 0,
            column: 0,
            span: None,
            metadata: Map::new(),
            data: NodeData::Module,
        };
        node.metadata.insert("a".into(), Value::from(1));
        let mut updates = Map::new();
        updates.insert("b".into(), Value::from(2));
        node.upsert_metadata(updates);
        assert_eq!(node.metadata.get("a"), Some(&Value::from(1)));
        assert_eq!(node.metadata.get("b"), Some(&Value::from(2)));
    }
}
