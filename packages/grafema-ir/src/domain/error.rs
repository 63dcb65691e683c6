//! Error types for the grafema-ir crate.
//!
//! ValidationError and UnknownEdgeType fail the operation that raised them;
//! UnresolvedReferenceError is handled locally by callers (builder emits a
//! placeholder or no edge) and never reaches this type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GrafemaError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrafemaError {
    /// A node factory received an invalid input (missing required field).
    #[error("validation error: {field} is required")]
    Validation { field: String },

    /// An edge type outside `KNOWN_EDGE_TYPES` was used at insertion time.
    #[error("unknown edge type: {0}")]
    UnknownEdgeType(String),

    /// Scope tracker was asked to exit a scope it never entered (LIFO
    /// balance broken) -- a programming error.
    #[error("scope stack imbalance: exit_scope() called with no matching enter_scope()")]
    ScopeImbalance,

    /// The injected [`crate::domain::AstParser`] failed on a file's
    /// contents. Carries the parser's own message verbatim.
    #[error("parse failed: {0}")]
    ParseFailed(String),
}

impl GrafemaError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        GrafemaError::Validation {
            field: field.into(),
        }
    }
}
