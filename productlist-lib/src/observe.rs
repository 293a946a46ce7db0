//! Observability hook for view updates and selection syncs.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use crate::error::AuthorityError;
use crate::view::ViewState;

/// Receives controller events.
///
/// Every method has a no-op default, so an observer only implements what it
/// records. Sync callbacks run on the async runtime that carries the
/// reconciliation, so implementations must be `Send + Sync`.
pub trait SyncObserver: Send + Sync {
    /// A new projection was emitted.
    fn on_update(&self, _view: &ViewState) {}

    /// Reconciliation `seq` was dispatched with `token_count` tokens.
    fn on_sync_dispatched(&self, _seq: u64, _token_count: usize) {}

    /// Reconciliation `seq` finished without error.
    fn on_sync_completed(&self, _seq: u64) {}

    /// Reconciliation `seq` failed at the authority.
    fn on_sync_failed(&self, _seq: u64, _error: &AuthorityError) {}

    /// Reconciliation `seq` skipped its select because a newer one was issued.
    fn on_sync_superseded(&self, _seq: u64) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SyncObserver for NoopObserver {}

/// Counter-based observer.
///
/// # Example
///
/// ```
/// use productlist_lib::observe::{SyncObserver, SyncStats};
///
/// let stats = SyncStats::new();
/// stats.on_sync_dispatched(1, 3);
/// stats.on_sync_completed(1);
/// let counts = stats.snapshot();
/// assert_eq!(counts.attempts, 1);
/// assert_eq!(counts.successes, 1);
/// ```
#[derive(Debug, Default)]
pub struct SyncStats {
    updates: AtomicU64,
    attempts: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    superseded: AtomicU64,
}

/// Point-in-time copy of [`SyncStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncCounts {
    /// Projections emitted.
    pub updates: u64,
    /// Reconciliations dispatched.
    pub attempts: u64,
    /// Reconciliations that completed.
    pub successes: u64,
    /// Reconciliations that failed.
    pub failures: u64,
    /// Reconciliations cut short by a newer one.
    pub superseded: u64,
}

impl SyncCounts {
    /// Reconciliations that have not settled yet.
    pub fn in_flight(&self) -> u64 {
        self.attempts
            .saturating_sub(self.successes + self.failures + self.superseded)
    }
}

impl SyncStats {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads all counters.
    pub fn snapshot(&self) -> SyncCounts {
        SyncCounts {
            updates: self.updates.load(Ordering::SeqCst),
            attempts: self.attempts.load(Ordering::SeqCst),
            successes: self.successes.load(Ordering::SeqCst),
            failures: self.failures.load(Ordering::SeqCst),
            superseded: self.superseded.load(Ordering::SeqCst),
        }
    }
}

impl SyncObserver for SyncStats {
    fn on_update(&self, _view: &ViewState) {
        self.updates.fetch_add(1, Ordering::SeqCst);
    }

    fn on_sync_dispatched(&self, _seq: u64, _token_count: usize) {
        self.attempts.fetch_add(1, Ordering::SeqCst);
    }

    fn on_sync_completed(&self, _seq: u64) {
        self.successes.fetch_add(1, Ordering::SeqCst);
    }

    fn on_sync_failed(&self, _seq: u64, _error: &AuthorityError) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }

    fn on_sync_superseded(&self, _seq: u64) {
        self.superseded.fetch_add(1, Ordering::SeqCst);
    }
}
