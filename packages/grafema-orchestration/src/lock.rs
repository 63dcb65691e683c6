//! The process-wide analysis lock: the core is fundamentally
//! single-threaded per project -- there is exactly one analysis running
//! against the backing store at any time. A state-transition discipline
//! simplified down to the two states an analysis lock actually needs.
//!
//! `tokio::sync::Mutex` rather than `std::sync::Mutex`: the guard is held
//! across the `.await` points of an entire analysis run, which a std mutex
//! guard may not cross.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tracing::warn;

use crate::error::GrafemaOrchestrationError;

/// The lock is a single-writer primitive with a 10-minute timeout.
pub const LOCK_TIMEOUT: Duration = Duration::from_secs(600);

/// Single-writer mutual exclusion plus the "has a full analysis ever
/// completed" flag that lets a non-force caller short-circuit into
/// `already_analyzed`. The flag lives alongside
/// the mutex, not behind it, so `is_analyzed` can be read without
/// contending for the write lock.
pub struct AnalysisLock {
    mutex: Mutex<()>,
    analyzed: AtomicBool,
}

impl Default for AnalysisLock {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisLock {
    pub fn new() -> Self {
        Self {
            mutex: Mutex::new(()),
            analyzed: AtomicBool::new(false),
        }
    }

    pub fn is_analyzed(&self) -> bool {
        self.analyzed.load(Ordering::SeqCst)
    }

    pub fn mark_analyzed(&self) {
        self.analyzed.store(true, Ordering::SeqCst);
    }

    pub fn mark_unanalyzed(&self) {
        self.analyzed.store(false, Ordering::SeqCst);
    }

    /// `force = true`: try to acquire without waiting, failing immediately
    /// if another run holds the lock. `force = false`: wait up to
    /// [`LOCK_TIMEOUT`], matching ordinary callers that are allowed to queue
    /// behind the active run.
    pub async fn acquire(&self, force: bool) -> Result<AnalysisLockGuard<'_>, GrafemaOrchestrationError> {
        if force {
            match self.mutex.try_lock() {
                Ok(guard) => Ok(AnalysisLockGuard { _guard: guard }),
                Err(_) => {
                    warn!("forced analysis rejected: another run is already in progress");
                    Err(GrafemaOrchestrationError::AlreadyRunning)
                }
            }
        } else {
            match tokio::time::timeout(LOCK_TIMEOUT, self.mutex.lock()).await {
                Ok(guard) => Ok(AnalysisLockGuard { _guard: guard }),
                Err(_) => {
                    warn!("analysis lock acquisition timed out after {:?}", LOCK_TIMEOUT);
                    Err(GrafemaOrchestrationError::LockTimeout(LOCK_TIMEOUT))
                }
            }
        }
    }
}

/// RAII handle: holding this is what "the analysis lock is held" means --
/// writes to the store may only happen while it's held. Dropping it
/// releases the mutex; it carries no other behavior, so `force`
/// reacquiring it contends on the bare mutex exactly once.
pub struct AnalysisLockGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}
