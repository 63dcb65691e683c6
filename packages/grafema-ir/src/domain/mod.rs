//! Domain layer: the dependency-free core.
//!
//! [`scope`] and [`id`] are pure leaves with no dependencies on each other
//! beyond sharing [`node::NodeKind`]. [`node`] and [`edge`] are the shared
//! record types every other layer builds on. [`ports`] is the single
//! external collaborator interface (the AST parser).

pub mod edge;
pub mod error;
pub mod id;
pub mod node;
pub mod ports;
pub mod scope;
pub mod span;

pub use edge::{Edge, EdgeKind};
pub use error::{GrafemaError, Result};
pub use id::IdBuilder;
pub use node::{
    ExportType, ImportBinding, ImportType, LoopKind, Node, NodeData, NodeId, NodeKind, ScopeKind,
};
pub use ports::{AstNode, AstParser, AstTree, GraphStore};
pub use scope::{AnalysisContext, ScopeTracker, GLOBAL_SCOPE};
pub use span::{Location, Span};
