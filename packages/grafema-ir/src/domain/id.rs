//! Semantic ID generation. Pure, dependency-free leaf
//! component alongside [`super::scope::ScopeTracker`]. Hashing is forbidden
//! here on purpose -- IDs must stay human-readable for debuggability, and
//! byte-stable across runs over unchanged source.

use super::node::NodeKind;
use super::scope::{AnalysisContext, GLOBAL_SCOPE};

/// Builds the canonical arrow-form or colon-form id string for a node,
/// given its kind, name, and [`AnalysisContext`] at the point of
/// declaration.
pub struct IdBuilder;

impl IdBuilder {
    /// Arrow form: `{file}->{scope_path}->{TYPE}->{name}[#discriminator]`.
    /// Used for FUNCTION, CLASS, VARIABLE, CONSTANT, PARAMETER, SCOPE, TYPE,
    /// ENUM.
    pub fn arrow(kind: NodeKind, name: &str, ctx: &AnalysisContext) -> String {
        let scope_path = ctx.scope_path_joined();
        format!("{}->{}->{}->{}", ctx.file, scope_path, kind.as_str(), name)
    }

    pub fn arrow_discriminated(
        kind: NodeKind,
        name: &str,
        ctx: &AnalysisContext,
        discriminator: u32,
    ) -> String {
        format!("{}#{}", Self::arrow(kind, name, ctx), discriminator)
    }

    /// Colon form: `{file}:{TYPE}:{name}[:{line}]`. Used for IMPORT (keyed
    /// by `source:local`, never by line), EXPORT and INTERFACE (keyed by
    /// name and line).
    pub fn colon(file: &str, kind: NodeKind, name: &str, line: Option<u32>) -> String {
        match line {
            Some(line) => format!("{}:{}:{}:{}", file, kind.as_str(), name, line),
            None => format!("{}:{}:{}", file, kind.as_str(), name),
        }
    }

    /// `{file}:IMPORT:{source}:{local}` -- import identity is positional by
    /// binding, never by line.
    pub fn import(file: &str, source: &str, local: &str) -> String {
        format!("{}:{}:{}:{}", file, NodeKind::Import.as_str(), source, local)
    }

    /// `{file}:EXPORT:{name}:{line}`.
    pub fn export(file: &str, name: &str, line: u32) -> String {
        Self::colon(file, NodeKind::Export, name, Some(line))
    }

    /// `{file}:INTERFACE:{name}:{line}`.
    pub fn interface(file: &str, name: &str, line: u32) -> String {
        Self::colon(file, NodeKind::Interface, name, Some(line))
    }

    /// `EXTERNAL_MODULE:{package_name}` -- unresolved package placeholder,
    /// stable across files so multiple importers share one node.
    pub fn external_module(package_name: &str) -> String {
        format!("{}:{}", NodeKind::ExternalModule.as_str(), package_name)
    }

    /// Module root id: the module's own scope path is always `global`
    /// regardless of the traversal's current context.
    pub fn module(file: &str) -> String {
        format!("{}->{}->{}->{}", file, GLOBAL_SCOPE, NodeKind::Module.as_str(), file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(scope_path: &[&str]) -> AnalysisContext {
        AnalysisContext {
            file: "index.js".into(),
            scope_path: scope_path.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn module_level_function_id_uses_global() {
        let id = IdBuilder::arrow(NodeKind::Function, "processUser", &ctx(&[]));
        assert_eq!(id, "index.js->global->FUNCTION->processUser");
    }

    #[test]
    fn nested_variable_id_joins_scope_path() {
        let id = IdBuilder::arrow(NodeKind::Variable, "x", &ctx(&["processUser", "if#0"]));
        assert_eq!(id, "index.js->processUser->if#0->VARIABLE->x");
    }

    #[test]
    fn import_id_has_no_line_number() {
        let id = IdBuilder::import("index.js", "express", "Router");
        assert_eq!(id, "index.js:IMPORT:express:Router");
    }

    #[test]
    fn export_id_includes_line() {
        let id = IdBuilder::export("index.js", "foo", 3);
        assert_eq!(id, "index.js:EXPORT:foo:3");
    }

    #[test]
    fn discriminator_disambiguates_siblings() {
        let base = ctx(&[]);
        let a = IdBuilder::arrow_discriminated(NodeKind::Function, "<anonymous>", &base, 0);
        let b = IdBuilder::arrow_discriminated(NodeKind::Function, "<anonymous>", &base, 1);
        assert_ne!(a, b);
        assert!(a.ends_with("#0"));
        assert!(b.ends_with("#1"));
    }

    #[test]
    fn id_is_deterministic_across_calls() {
        let ctx1 = ctx(&["outer"]);
        let ctx2 = ctx(&["outer"]);
        assert_eq!(
            IdBuilder::arrow(NodeKind::Variable, "y", &ctx1),
            IdBuilder::arrow(NodeKind::Variable, "y", &ctx2)
        );
    }
}
