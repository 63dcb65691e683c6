//! Orchestration layer: the top-level driver that
//! discovers files, runs the ANALYSIS visitor/builder, then the ENRICHMENT
//! plugin pipeline, under a process-wide single-writer lock.

pub mod discovery;
pub mod error;
pub mod lock;
pub mod orchestrator;

pub use discovery::{FileDiscovery, FilesystemDiscovery};
pub use error::{GrafemaOrchestrationError, Result};
pub use lock::{AnalysisLock, AnalysisLockGuard, LOCK_TIMEOUT};
pub use orchestrator::{AnalysisOutcome, Orchestrator};
