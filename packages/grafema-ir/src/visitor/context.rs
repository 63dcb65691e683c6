//! Mutable per-file analysis state. One [`AnalyzerState`] is created per
//! file via [`AnalyzerState::for_file`] and threaded through every handler
//! call as `&mut AnalyzerState` -- nothing here is shared across files.

use std::collections::HashMap;

use crate::domain::{AnalysisContext, NodeId, NodeKind, ScopeTracker};

use super::collections::VisitorCollections;

/// Counters and collections for a single file's traversal. Replaces the
/// deep, loosely-typed parameter lists the source domain favors.
pub struct AnalyzerState {
    pub scope: ScopeTracker,
    pub collections: VisitorCollections,
    pub module_id: NodeId,
    /// Always-discriminate counter for call-site-like constructs (CALL,
    /// EXPRESSION, LOOP, anonymous FUNCTION) keyed by `(scope_path, kind,
    /// name)` -- these recur constantly within a scope and need a
    /// discriminator on every occurrence, including the first, to stay
    /// consistent with sibling SCOPE naming (`if#0`, `if#1`, ...).
    call_site_counters: HashMap<(String, NodeKind, String), u32>,
    /// Collision-only counter for named declarations (FUNCTION, CLASS,
    /// VARIABLE, CONSTANT, TYPE, ENUM) -- `None` on first occurrence so the
    /// canonical, undecorated id is used whenever a name
    /// is actually unique within its scope.
    declaration_counters: HashMap<(String, NodeKind, String), u32>,
}

impl AnalyzerState {
    pub fn for_file(file: impl Into<String>) -> Self {
        let file = file.into();
        let module_id = crate::domain::IdBuilder::module(&file);
        Self {
            scope: ScopeTracker::new(file.clone()),
            collections: VisitorCollections::default(),
            module_id,
            call_site_counters: HashMap::new(),
            declaration_counters: HashMap::new(),
        }
    }

    pub fn file(&self) -> String {
        self.scope.current_context().file
    }

    pub fn current_context(&self) -> AnalysisContext {
        self.scope.current_context()
    }

    /// Always-assigned discriminator for call-site-like nodes.
    pub fn next_call_site_discriminator(&mut self, kind: NodeKind, name: &str) -> u32 {
        let key = (self.current_context().scope_path_joined(), kind, name.to_string());
        let counter = self.call_site_counters.entry(key).or_insert(0);
        let n = *counter;
        *counter += 1;
        n
    }

    /// Collision-only discriminator for declarations: `None` the first time
    /// a `(scope, kind, name)` triple is seen, `Some(n)` (n >= 1) on every
    /// subsequent occurrence.
    pub fn declaration_discriminator(&mut self, kind: NodeKind, name: &str) -> Option<u32> {
        let key = (self.current_context().scope_path_joined(), kind, name.to_string());
        let counter = self.declaration_counters.entry(key).or_insert(0);
        let n = *counter;
        *counter += 1;
        if n == 0 {
            None
        } else {
            Some(n)
        }
    }

    pub fn record_contains(&mut self, parent: NodeId, child: NodeId) {
        self.collections.contains_edges.push((parent, child));
    }

    /// Top-level await: first await seen with no enclosing function, at
    /// module level.
    pub fn mark_top_level_await(&mut self) {
        if self.scope.is_module_level() {
            self.collections.has_top_level_await = true;
        }
    }
}
