//! Orchestration-level error classification: `#[error(...)]` per variant,
//! `#[from]` for wrapped causes, a crate-local `Result<T>` alias, trimmed
//! to this crate's actual failure modes -- no database/bincode/checkpoint
//! variants, since this workspace has no persistent backend.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GrafemaOrchestrationError>;

#[derive(Error, Debug)]
pub enum GrafemaOrchestrationError {
    /// An ENRICHMENT or ANALYSIS plugin reported failure.
    #[error("plugin failed: {0}")]
    PluginFailure(String),

    /// The analysis lock's 10-minute acquisition timeout elapsed.
    #[error("analysis lock acquisition timed out after {0:?}; a prior run may be stuck -- check logs and consider `force`")]
    LockTimeout(std::time::Duration),

    /// `force = true` while a run is already in progress.
    #[error("cannot force re-analysis: another analysis is currently running")]
    AlreadyRunning,

    /// The graph store could not be reached or a write failed in a way the
    /// in-memory reference implementation never produces itself but a real
    /// backend could.
    #[error("graph store unavailable: {0}")]
    StoreUnavailable(String),

    /// A file could not be discovered or read during the ANALYSIS phase.
    #[error("project discovery/read failed: {0}")]
    Discovery(String),

    #[error(transparent)]
    Analysis(#[from] grafema_ir::domain::GrafemaError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
