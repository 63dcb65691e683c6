//! grafema-ir: semantic identity, node factories, AST visitors, the
//! two-pass graph builder, the enrichment pipeline, and Datalog attribute
//! access.
//!
//! Module layout is leaves first: [`domain`] has no dependents within this crate; [`factory`]
//! depends only on `domain`; [`visitor`] depends on `domain` and `factory`;
//! [`builder`] consumes a visitor's output; [`enrichment`] and [`datalog`]
//! run against an already-built graph via [`domain::GraphStore`].

pub mod builder;
pub mod config;
pub mod datalog;
pub mod domain;
pub mod enrichment;
pub mod factory;
pub mod visitor;

pub mod testing;

pub use domain::{
    AnalysisContext, AstNode, AstParser, AstTree, Edge, EdgeKind, GraphStore, GrafemaError, Node,
    NodeData, NodeId, NodeKind, Result, ScopeTracker,
};
