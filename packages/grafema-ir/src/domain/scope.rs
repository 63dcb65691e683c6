//! Scope tracker. Pure, dependency-free leaf component: it
//! maintains the current lexical scope stack during AST traversal and hands
//! out an owned snapshot of "where am I" whenever a visitor needs one.

use std::collections::HashMap;

use super::error::{GrafemaError, Result};
use super::node::{NodeId, ScopeKind};

/// Module-level scope path component.
pub const GLOBAL_SCOPE: &str = "global";

/// A single frame on the scope stack.
#[derive(Debug, Clone)]
struct ScopeFrame {
    /// Name contributed to the scope path (e.g. a function name, or
    /// `"if#0"` for a counted anonymous block).
    name: String,
    /// Node id of the SCOPE (or FUNCTION) record this frame corresponds to,
    /// once known to the caller -- tracked so `parent_scope_id` links can be
    /// filled in without a second traversal.
    node_id: Option<NodeId>,
    /// Nearest enclosing FUNCTION id, for closure capture analysis
    ///.
    function_id: Option<NodeId>,
    /// Per-(kind,name) sibling counters scoped to *this* frame, used by
    /// `enter_counted_scope` to disambiguate repeated unnamed scopes (two
    /// `if` blocks at the same nesting level become `if#0`, `if#1`).
    sibling_counters: HashMap<String, u32>,
}

/// Snapshot of "where we are" in the traversal at a point in time. Owned,
/// never borrowed: visitors capture this at the moment a reference is seen
/// and carry it forward into a
/// later edge-resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisContext {
    pub file: String,
    pub scope_path: Vec<String>,
}

impl AnalysisContext {
    /// Join the scope path the way semantic IDs do, substituting `global` for an empty path.
    pub fn scope_path_joined(&self) -> String {
        if self.scope_path.is_empty() {
            GLOBAL_SCOPE.to_string()
        } else {
            self.scope_path.join("->")
        }
    }
}

#[derive(Debug)]
pub struct ScopeTracker {
    file: String,
    stack: Vec<ScopeFrame>,
    /// Nearest enclosing FUNCTION id, tracked independently of the scope
    /// stack's frame-local counters so closures can look it up cheaply.
    function_stack: Vec<NodeId>,
}

impl ScopeTracker {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            stack: Vec::new(),
            function_stack: Vec::new(),
        }
    }

    /// Enter a scope with an explicit, already-disambiguated name (used for
    /// named declarations: a function scope named after the function).
    pub fn enter_scope(&mut self, name: impl Into<String>) -> String {
        let name = name.into();
        self.stack.push(ScopeFrame {
            name: name.clone(),
            node_id: None,
            function_id: self.function_stack.last().cloned(),
            sibling_counters: HashMap::new(),
        });
        name
    }

    /// Enter a scope of `kind`, auto-assigning a `#N` discriminator among
    /// siblings of the same kind within the *current* (about to become
    /// parent) frame. Returns the disambiguated name pushed onto the stack
    /// (e.g. `"if#0"`).
    pub fn enter_counted_scope(&mut self, kind: ScopeKind) -> String {
        let key = kind.as_str().to_string();
        let discriminator = match self.stack.last_mut() {
            Some(parent) => {
                let counter = parent.sibling_counters.entry(key.clone()).or_insert(0);
                let n = *counter;
                *counter += 1;
                n
            }
            None => 0,
        };
        let name = format!("{}#{}", kind.as_str(), discriminator);
        self.stack.push(ScopeFrame {
            name: name.clone(),
            node_id: None,
            function_id: self.function_stack.last().cloned(),
            sibling_counters: HashMap::new(),
        });
        name
    }

    /// Exit the innermost scope. Scopes must be LIFO-balanced; exiting past the bottom of the stack is a programming error.
    pub fn exit_scope(&mut self) -> Result<()> {
        if self.stack.pop().is_none() {
            return Err(GrafemaError::ScopeImbalance);
        }
        Ok(())
    }

    /// Mark the innermost scope's node id, once the caller has created the
    /// corresponding SCOPE/FUNCTION node.
    pub fn set_current_node_id(&mut self, id: NodeId) {
        if let Some(frame) = self.stack.last_mut() {
            frame.node_id = Some(id);
        }
    }

    pub fn push_function(&mut self, function_id: NodeId) {
        self.function_stack.push(function_id);
    }

    pub fn pop_function(&mut self) {
        self.function_stack.pop();
    }

    pub fn current_function_id(&self) -> Option<&NodeId> {
        self.function_stack.last()
    }

    /// Owned "where am I" snapshot.
    pub fn current_context(&self) -> AnalysisContext {
        AnalysisContext {
            file: self.file.clone(),
            scope_path: self.stack.iter().map(|f| f.name.clone()).collect(),
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// True while no enclosing FUNCTION scope exists -- used by the
    /// top-level-await detection in the CALL/LOOP/IMPORT handlers.
    pub fn is_module_level(&self) -> bool {
        self.function_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_level_scope_path_is_global() {
        let tracker = ScopeTracker::new("index.js");
        assert_eq!(tracker.current_context().scope_path_joined(), GLOBAL_SCOPE);
    }

    #[test]
    fn nested_scope_path_joins_with_arrow() {
        let mut tracker = ScopeTracker::new("index.js");
        tracker.enter_scope("processUser");
        tracker.enter_counted_scope(ScopeKind::If);
        assert_eq!(
            tracker.current_context().scope_path_joined(),
            "processUser->if#0"
        );
    }

    #[test]
    fn sibling_if_blocks_get_distinct_discriminators() {
        let mut tracker = ScopeTracker::new("index.js");
        tracker.enter_scope("processUser");
        tracker.enter_counted_scope(ScopeKind::If);
        tracker.exit_scope().unwrap();
        let second = tracker.enter_counted_scope(ScopeKind::If);
        assert_eq!(second, "if#1");
    }

    #[test]
    fn exit_without_enter_is_scope_imbalance() {
        let mut tracker = ScopeTracker::new("index.js");
        assert_eq!(tracker.exit_scope(), Err(GrafemaError::ScopeImbalance));
    }

    #[test]
    fn lifo_balance_restores_parent_context() {
        let mut tracker = ScopeTracker::new("index.js");
        tracker.enter_scope("outer");
        tracker.enter_scope("inner");
        tracker.exit_scope().unwrap();
        assert_eq!(tracker.current_context().scope_path_joined(), "outer");
    }

    #[test]
    fn function_parent_pointer_tracks_nearest_enclosing_function() {
        let mut tracker = ScopeTracker::new("index.js");
        assert!(tracker.is_module_level());
        tracker.push_function("index.js->global->FUNCTION->outer".to_string());
        assert!(!tracker.is_module_level());
        tracker.enter_counted_scope(ScopeKind::Block);
        assert_eq!(
            tracker.current_function_id(),
            Some(&"index.js->global->FUNCTION->outer".to_string())
        );
        tracker.pop_function();
        assert!(tracker.is_module_level());
    }
}
