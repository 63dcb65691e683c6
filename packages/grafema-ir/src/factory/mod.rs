//! Node factories. `NodeFactory` is a stateless façade with one `create_*`
//! method per [`NodeKind`]. No other part of this crate may construct a
//! [`Node`] literal; every node in the graph passes through here so
//! validation, defaulting, and id generation happen exactly once.

use serde_json::{Map, Value};

use crate::domain::{
    AnalysisContext, Edge, EdgeKind, GrafemaError, IdBuilder, ImportBinding, ImportType, Location,
    LoopKind, Node, NodeData, NodeId, NodeKind, Result, ScopeKind, Span,
};

fn validate_required(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(GrafemaError::missing_field(field));
    }
    Ok(())
}

/// `line === undefined` fails; `line === 0` is valid. Represented here as `Option<u32>` so a
/// genuinely-absent line (caller never supplied one) is distinguishable
/// from the Rust default of `0`.
fn require_line(line: Option<u32>) -> Result<u32> {
    line.ok_or_else(|| GrafemaError::missing_field("line"))
}

/// Zero-sized façade; every `create_*` method validates, generates the id,
/// fills defaults, and returns an immutable [`Node`].
pub struct NodeFactory;

impl NodeFactory {
    pub fn create_module(file: &str) -> Result<Node> {
        validate_required("file", file)?;
        Ok(Node {
            id: IdBuilder::module(file),
            name: file.to_string(),
            file: file.to_string(),
            line: 0,
            column: 0,
            span: None,
            metadata: Map::new(),
            data: NodeData::Module,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_function(
        name: &str,
        file: &str,
        line: Option<u32>,
        column: u32,
        ctx: &AnalysisContext,
        parent_scope_id: Option<NodeId>,
        is_async: bool,
        is_generator: bool,
        is_arrow: bool,
        discriminator: Option<u32>,
    ) -> Result<Node> {
        validate_required("name", name)?;
        validate_required("file", file)?;
        let line = require_line(line)?;
        let id = match discriminator {
            Some(d) => IdBuilder::arrow_discriminated(NodeKind::Function, name, ctx, d),
            None => IdBuilder::arrow(NodeKind::Function, name, ctx),
        };
        Ok(Node {
            id,
            name: name.to_string(),
            file: file.to_string(),
            line,
            column,
            span: Some(Span::point(line, column)),
            metadata: Map::new(),
            data: NodeData::Function {
                parent_scope_id,
                is_async,
                is_generator,
                is_arrow,
            },
        })
    }

    pub fn create_class(
        name: &str,
        file: &str,
        line: Option<u32>,
        column: u32,
        ctx: &AnalysisContext,
        extends: Option<String>,
        implements: Vec<String>,
    ) -> Result<Node> {
        validate_required("name", name)?;
        validate_required("file", file)?;
        let line = require_line(line)?;
        Ok(Node {
            id: IdBuilder::arrow(NodeKind::Class, name, ctx),
            name: name.to_string(),
            file: file.to_string(),
            line,
            column,
            span: Some(Span::point(line, column)),
            metadata: Map::new(),
            data: NodeData::Class {
                extends,
                implements,
            },
        })
    }

    pub fn create_interface(
        name: &str,
        file: &str,
        line: Option<u32>,
        column: u32,
        extends: Vec<String>,
        properties: Vec<String>,
        is_external: Option<bool>,
    ) -> Result<Node> {
        validate_required("name", name)?;
        validate_required("file", file)?;
        let line = require_line(line)?;
        Ok(Node {
            id: IdBuilder::interface(file, name, line),
            name: name.to_string(),
            file: file.to_string(),
            line,
            column,
            span: Some(Span::point(line, column)),
            metadata: Map::new(),
            data: NodeData::Interface {
                extends,
                properties,
                is_external: is_external.unwrap_or(false),
            },
        })
    }

    pub fn create_type(name: &str, file: &str, line: Option<u32>, column: u32, ctx: &AnalysisContext) -> Result<Node> {
        validate_required("name", name)?;
        validate_required("file", file)?;
        let line = require_line(line)?;
        Ok(Node {
            id: IdBuilder::arrow(NodeKind::Type, name, ctx),
            name: name.to_string(),
            file: file.to_string(),
            line,
            column,
            span: Some(Span::point(line, column)),
            metadata: Map::new(),
            data: NodeData::Type,
        })
    }

    pub fn create_enum(name: &str, file: &str, line: Option<u32>, column: u32, ctx: &AnalysisContext) -> Result<Node> {
        validate_required("name", name)?;
        validate_required("file", file)?;
        let line = require_line(line)?;
        Ok(Node {
            id: IdBuilder::arrow(NodeKind::Enum, name, ctx),
            name: name.to_string(),
            file: file.to_string(),
            line,
            column,
            span: Some(Span::point(line, column)),
            metadata: Map::new(),
            data: NodeData::Enum,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_import(
        file: &str,
        source: &str,
        local: &str,
        line: Option<u32>,
        column: u32,
        imported: Option<String>,
        import_type: ImportType,
        import_binding: Option<ImportBinding>,
        is_dynamic: bool,
        is_resolvable: Option<bool>,
    ) -> Result<Node> {
        validate_required("file", file)?;
        validate_required("source", source)?;
        validate_required("local", local)?;
        let line = require_line(line)?;
        Ok(Node {
            id: IdBuilder::import(file, source, local),
            name: local.to_string(),
            file: file.to_string(),
            line,
            column,
            span: Some(Span::point(line, column)),
            metadata: Map::new(),
            data: NodeData::Import {
                source: source.to_string(),
                local: local.to_string(),
                imported,
                import_type,
                import_binding: import_binding.unwrap_or_default(),
                is_dynamic,
                is_resolvable,
            },
        })
    }

    pub fn create_export(
        file: &str,
        name: &str,
        line: Option<u32>,
        column: u32,
        local: Option<String>,
        is_default: bool,
        export_type: crate::domain::ExportType,
        source: Option<String>,
    ) -> Result<Node> {
        validate_required("file", file)?;
        validate_required("name", name)?;
        let line = require_line(line)?;
        Ok(Node {
            id: IdBuilder::export(file, name, line),
            name: name.to_string(),
            file: file.to_string(),
            line,
            column,
            span: Some(Span::point(line, column)),
            metadata: Map::new(),
            data: NodeData::Export {
                local,
                is_default,
                export_type,
                source,
            },
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_variable(
        name: &str,
        file: &str,
        line: Option<u32>,
        column: u32,
        ctx: &AnalysisContext,
        parent_scope_id: Option<NodeId>,
        is_const: bool,
        discriminator: Option<u32>,
    ) -> Result<Node> {
        validate_required("name", name)?;
        validate_required("file", file)?;
        let line = require_line(line)?;
        let kind = if is_const {
            NodeKind::Constant
        } else {
            NodeKind::Variable
        };
        let id = match discriminator {
            Some(d) => IdBuilder::arrow_discriminated(kind, name, ctx, d),
            None => IdBuilder::arrow(kind, name, ctx),
        };
        let data = if is_const {
            NodeData::Constant { parent_scope_id }
        } else {
            NodeData::Variable { parent_scope_id }
        };
        Ok(Node {
            id,
            name: name.to_string(),
            file: file.to_string(),
            line,
            column,
            span: Some(Span::point(line, column)),
            metadata: Map::new(),
            data,
        })
    }

    pub fn create_parameter(
        name: &str,
        file: &str,
        line: Option<u32>,
        column: u32,
        ctx: &AnalysisContext,
        function_id: NodeId,
    ) -> Result<Node> {
        validate_required("name", name)?;
        validate_required("file", file)?;
        let line = require_line(line)?;
        Ok(Node {
            id: IdBuilder::arrow(NodeKind::Parameter, name, ctx),
            name: name.to_string(),
            file: file.to_string(),
            line,
            column,
            span: Some(Span::point(line, column)),
            metadata: Map::new(),
            data: NodeData::Parameter { function_id },
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_scope(
        file: &str,
        line: Option<u32>,
        column: u32,
        ctx: &AnalysisContext,
        name: &str,
        scope_type: ScopeKind,
        parent_scope_id: Option<NodeId>,
        parent_function_id: Option<NodeId>,
        conditional: bool,
    ) -> Result<Node> {
        validate_required("file", file)?;
        let line = require_line(line)?;
        Ok(Node {
            id: IdBuilder::arrow(NodeKind::Scope, name, ctx),
            name: name.to_string(),
            file: file.to_string(),
            line,
            column,
            span: Some(Span::point(line, column)),
            metadata: Map::new(),
            data: NodeData::Scope {
                scope_type,
                parent_scope_id,
                parent_function_id,
                conditional,
            },
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_call(
        name: &str,
        file: &str,
        line: Option<u32>,
        column: u32,
        ctx: &AnalysisContext,
        object: Option<String>,
        method: Option<String>,
        is_new: bool,
        is_awaited: bool,
        is_dynamic: bool,
        discriminator: Option<u32>,
    ) -> Result<Node> {
        validate_required("name", name)?;
        validate_required("file", file)?;
        let line = require_line(line)?;
        let id = match discriminator {
            Some(d) => IdBuilder::arrow_discriminated(NodeKind::Call, name, ctx, d),
            None => IdBuilder::arrow(NodeKind::Call, name, ctx),
        };
        Ok(Node {
            id,
            name: name.to_string(),
            file: file.to_string(),
            line,
            column,
            span: Some(Span::point(line, column)),
            metadata: Map::new(),
            data: NodeData::Call {
                object,
                method,
                is_new,
                is_awaited,
                is_dynamic,
            },
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_expression(
        name: &str,
        file: &str,
        line: Option<u32>,
        column: u32,
        ctx: &AnalysisContext,
        expression_type: &str,
        operator: Option<String>,
        left_source_name: Option<String>,
        right_source_name: Option<String>,
        discriminator: Option<u32>,
    ) -> Result<Node> {
        validate_required("name", name)?;
        validate_required("file", file)?;
        let line = require_line(line)?;
        let id = match discriminator {
            Some(d) => IdBuilder::arrow_discriminated(NodeKind::Expression, name, ctx, d),
            None => IdBuilder::arrow(NodeKind::Expression, name, ctx),
        };
        Ok(Node {
            id,
            name: name.to_string(),
            file: file.to_string(),
            line,
            column,
            span: Some(Span::point(line, column)),
            metadata: Map::new(),
            data: NodeData::Expression {
                expression_type: expression_type.to_string(),
                operator,
                left_source_name,
                right_source_name,
            },
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_loop(
        name: &str,
        file: &str,
        line: Option<u32>,
        column: u32,
        ctx: &AnalysisContext,
        loop_kind: LoopKind,
        ignore_cardinality: bool,
        discriminator: Option<u32>,
    ) -> Result<Node> {
        validate_required("file", file)?;
        let line = require_line(line)?;
        let id = match discriminator {
            Some(d) => IdBuilder::arrow_discriminated(NodeKind::Loop, name, ctx, d),
            None => IdBuilder::arrow(NodeKind::Loop, name, ctx),
        };
        Ok(Node {
            id,
            name: name.to_string(),
            file: file.to_string(),
            line,
            column,
            span: Some(Span::point(line, column)),
            metadata: Map::new(),
            data: NodeData::Loop {
                loop_kind,
                ignore_cardinality,
            },
        })
    }

    pub fn create_external_module(package_name: &str) -> Result<Node> {
        validate_required("packageName", package_name)?;
        Ok(Node {
            id: IdBuilder::external_module(package_name),
            name: package_name.to_string(),
            file: String::new(),
            line: 0,
            column: 0,
            span: None,
            metadata: Map::new(),
            data: NodeData::ExternalModule {
                package_name: package_name.to_string(),
            },
        })
    }

    /// Build a CONTAINS edge from `parent` to `child`.
    pub fn contains_edge(parent: &NodeId, child: &NodeId) -> Edge {
        Edge::new(EdgeKind::Contains, parent.clone(), child.clone())
    }

    /// Validate and build an edge of an arbitrary kind; fails if `kind_str`
    /// is not a member of `KNOWN_EDGE_TYPES`.
    pub fn edge_of_kind(kind_str: &str, src: &NodeId, dst: &NodeId) -> Result<Edge> {
        let kind = EdgeKind::from_str(kind_str)
            .ok_or_else(|| GrafemaError::UnknownEdgeType(kind_str.to_string()))?;
        Ok(Edge::new(kind, src.clone(), dst.clone()))
    }

    pub fn edge(kind: EdgeKind, src: &NodeId, dst: &NodeId) -> Edge {
        Edge::new(kind, src.clone(), dst.clone())
    }

    pub fn edge_with_metadata(kind: EdgeKind, src: &NodeId, dst: &NodeId, metadata: Map<String, Value>) -> Edge {
        Edge::new(kind, src.clone(), dst.clone()).with_metadata(metadata)
    }
}
