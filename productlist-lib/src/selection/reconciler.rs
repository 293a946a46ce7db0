//! Selection reconciler.
//!
//! Owns the selection set and mirrors it to the [`SelectionAuthority`] after
//! every mutation. The authority only understands "clear" and "select exactly
//! these", so each mutation replays the whole target set as a clear followed
//! by a select. Replays are dispatched onto the tokio runtime and never
//! awaited by the mutating call.
//!
//! Replays are neither cancelled nor queued. Two quick toggles produce two
//! independent clear/select pairs and whichever settles last wins at the
//! authority. With `supersede_stale` set, a replay whose clear settles after
//! a newer replay was dispatched drops its select, which narrows the window
//! without closing it.

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use futures::future::join_all;
use log::{Level, error, log, trace, warn};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::SelectionAuthority;
use super::SelectionSet;
use super::SelectionSummary;
use crate::error::AuthorityError;
use crate::model::Identity;
use crate::model::Row;
use crate::observe::NoopObserver;
use crate::observe::SyncObserver;

/// Whether dispatched replays are still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Nothing in flight.
    Clean,
    /// At least one replay has not settled.
    Pending,
}

enum SyncOutcome {
    Committed,
    Superseded,
}

/// Keeps the local selection and drives the authority to match it.
pub struct Reconciler<A: SelectionAuthority> {
    selection: SelectionSet,
    authority: Arc<A>,
    observer: Arc<dyn SyncObserver>,
    runtime: Option<Handle>,
    latest_seq: Arc<AtomicU64>,
    supersede_stale: bool,
    in_flight: Vec<JoinHandle<()>>,
}

impl<A: SelectionAuthority> Reconciler<A> {
    /// Creates a reconciler with an empty selection.
    pub fn new(authority: Arc<A>) -> Self {
        Self {
            selection: SelectionSet::new(),
            authority,
            observer: Arc::new(NoopObserver),
            runtime: None,
            latest_seq: Arc::new(AtomicU64::new(0)),
            supersede_stale: false,
            in_flight: Vec::new(),
        }
    }

    /// Sets the observer notified about each replay.
    pub fn with_observer(mut self, observer: Arc<dyn SyncObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Pins the runtime replays are spawned on.
    ///
    /// Without one, the runtime current at dispatch time is used.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Drops the select of a replay that has been overtaken by a newer one.
    pub fn with_supersede_stale(mut self, enabled: bool) -> Self {
        self.supersede_stale = enabled;
        self
    }

    /// Returns the authority.
    pub fn authority(&self) -> &Arc<A> {
        &self.authority
    }

    /// Returns the local selection.
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Check if an identity is selected.
    pub fn is_selected(&self, identity: &str) -> bool {
        self.selection.is_selected(identity)
    }

    /// Counts the selection against the current rows.
    pub fn summary(&self, rows: &[Row<A::Token>]) -> SelectionSummary {
        self.selection.summary(rows)
    }

    /// Flips one identity and replays the selection.
    ///
    /// The identity does not have to be present in `rows`.
    /// Returns `true` if the identity is now selected.
    pub fn toggle(&mut self, identity: Identity, rows: &[Row<A::Token>]) -> bool {
        let selected = self.selection.toggle(identity);
        self.reconcile(rows);
        selected
    }

    /// Clears everything if all of `rows` are selected, else selects all of them.
    ///
    /// `rows` is the full dataset, never a page. Returns `true` if the result
    /// is "all selected".
    pub fn toggle_all(&mut self, rows: &[Row<A::Token>]) -> bool {
        let all_selected = self.selection.summary(rows).all_selected;
        if all_selected {
            self.selection.clear();
        } else {
            self.selection.select_rows(rows);
        }
        self.reconcile(rows);
        !all_selected && !rows.is_empty()
    }

    /// Replays the current selection to the authority.
    ///
    /// Tokens are collected by walking `rows` in order, so they always come
    /// from the live snapshot. Returns the sequence number of the replay.
    pub fn reconcile(&mut self, rows: &[Row<A::Token>]) -> u64 {
        let tokens: Vec<A::Token> = rows
            .iter()
            .filter(|row| self.selection.is_selected(row.identity().as_str()))
            .map(|row| row.token().clone())
            .collect();

        let seq = self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1;
        trace!("Dispatching selection sync {} with {} tokens", seq, tokens.len());
        self.observer.on_sync_dispatched(seq, tokens.len());

        let runtime = match self.runtime.clone().or_else(|| Handle::try_current().ok()) {
            Some(runtime) => runtime,
            None => {
                let err = AuthorityError::NoRuntime;
                error!("Selection sync {} not dispatched: {}", seq, err);
                self.observer.on_sync_failed(seq, &err);
                return seq;
            }
        };

        self.in_flight.retain(|handle| !handle.is_finished());
        self.in_flight.push(runtime.spawn(run_sync(
            Arc::clone(&self.authority),
            Arc::clone(&self.observer),
            Arc::clone(&self.latest_seq),
            self.supersede_stale,
            seq,
            tokens,
        )));
        seq
    }

    /// Returns whether any dispatched replay is still running.
    pub fn sync_state(&self) -> SyncState {
        if self.in_flight.iter().any(|handle| !handle.is_finished()) {
            SyncState::Pending
        } else {
            SyncState::Clean
        }
    }

    /// Waits for every dispatched replay to settle.
    ///
    /// There is no timeout. If the authority never answers, neither does this.
    pub async fn flush(&mut self) {
        let handles = std::mem::take(&mut self.in_flight);
        for result in join_all(handles).await {
            if let Err(e) = result {
                warn!("Selection sync task ended abnormally: {}", e);
            }
        }
    }
}

impl<A: SelectionAuthority> std::fmt::Debug for Reconciler<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("selection", &self.selection)
            .field("latest_seq", &self.latest_seq.load(Ordering::SeqCst))
            .field("supersede_stale", &self.supersede_stale)
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

async fn run_sync<A: SelectionAuthority>(
    authority: Arc<A>,
    observer: Arc<dyn SyncObserver>,
    latest_seq: Arc<AtomicU64>,
    supersede_stale: bool,
    seq: u64,
    tokens: Vec<A::Token>,
) {
    let outcome = replay(&*authority, &latest_seq, supersede_stale, seq, tokens).await;
    match outcome {
        Ok(SyncOutcome::Committed) => {
            trace!("Selection sync {} committed", seq);
            observer.on_sync_completed(seq);
        }
        Ok(SyncOutcome::Superseded) => {
            trace!("Selection sync {} superseded before select", seq);
            observer.on_sync_superseded(seq);
        }
        Err(e) => {
            log!(failure_level(&e), "Selection sync {} failed: {}", seq, e);
            observer.on_sync_failed(seq, &e);
        }
    }
}

/// Transient failures heal on the next mutation; anything else needs attention.
fn failure_level(error: &AuthorityError) -> Level {
    if error.is_transient() {
        Level::Warn
    } else {
        Level::Error
    }
}

async fn replay<A: SelectionAuthority>(
    authority: &A,
    latest_seq: &AtomicU64,
    supersede_stale: bool,
    seq: u64,
    tokens: Vec<A::Token>,
) -> Result<SyncOutcome, AuthorityError> {
    authority.clear().await?;
    if tokens.is_empty() {
        return Ok(SyncOutcome::Committed);
    }
    if supersede_stale && latest_seq.load(Ordering::SeqCst) != seq {
        return Ok(SyncOutcome::Superseded);
    }
    authority.select(tokens, true).await?;
    Ok(SyncOutcome::Committed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Fields;
    use crate::selection::AuthorityCall;
    use crate::selection::InMemoryAuthority;
    use crate::selection::RowContext;

    fn rows(authority: &InMemoryAuthority, ids: &[&str]) -> Vec<Row<uuid::Uuid>> {
        ids.iter()
            .enumerate()
            .map(|(position, id)| {
                let identity = Identity::from(*id);
                let fields = Fields::new();
                let token = authority.mint_token(&RowContext {
                    position,
                    identity: &identity,
                    fields: &fields,
                });
                Row::new(identity, fields, token, position)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_toggle_replays_clear_then_select() {
        let authority = Arc::new(InMemoryAuthority::new());
        let data = rows(&authority, &["a", "b", "c"]);
        let mut reconciler = Reconciler::new(Arc::clone(&authority));

        assert!(reconciler.toggle("b".into(), &data));
        reconciler.flush().await;

        assert_eq!(
            authority.calls(),
            vec![
                AuthorityCall::Clear,
                AuthorityCall::Select {
                    tokens: vec![*data[1].token()],
                    allow_multiple: true,
                },
            ]
        );
        assert_eq!(reconciler.sync_state(), SyncState::Clean);
    }

    #[tokio::test]
    async fn test_empty_selection_only_clears() {
        let authority = Arc::new(InMemoryAuthority::new());
        let data = rows(&authority, &["a"]);
        let mut reconciler = Reconciler::new(Arc::clone(&authority));

        reconciler.toggle("a".into(), &data);
        reconciler.toggle("a".into(), &data);
        reconciler.flush().await;

        let calls = authority.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[2], AuthorityCall::Clear);
        assert_eq!(authority.committed_len(), 0);
    }

    #[tokio::test]
    async fn test_tokens_follow_row_order() {
        let authority = Arc::new(InMemoryAuthority::new());
        let data = rows(&authority, &["a", "b", "c"]);
        let mut reconciler = Reconciler::new(Arc::clone(&authority));

        reconciler.toggle("c".into(), &data);
        reconciler.toggle("a".into(), &data);
        reconciler.flush().await;

        let last = authority.calls().pop();
        assert_eq!(
            last,
            Some(AuthorityCall::Select {
                tokens: vec![*data[0].token(), *data[2].token()],
                allow_multiple: true,
            })
        );
    }

    #[tokio::test]
    async fn test_failure_keeps_local_selection() {
        let authority = Arc::new(InMemoryAuthority::new());
        let data = rows(&authority, &["a", "b"]);
        let stats = Arc::new(crate::observe::SyncStats::new());
        let mut reconciler =
            Reconciler::new(Arc::clone(&authority)).with_observer(stats.clone());

        authority.reject_next(1);
        reconciler.toggle("a".into(), &data);
        reconciler.flush().await;

        assert!(reconciler.is_selected("a"));
        assert_eq!(authority.calls(), vec![AuthorityCall::Clear]);
        assert_eq!(stats.snapshot().failures, 1);
    }

    #[tokio::test]
    async fn test_toggle_all_uses_full_dataset() {
        let authority = Arc::new(InMemoryAuthority::new());
        let data = rows(&authority, &["a", "b", "c"]);
        let mut reconciler = Reconciler::new(Arc::clone(&authority));

        reconciler.toggle("a".into(), &data);
        assert!(reconciler.toggle_all(&data));
        assert_eq!(reconciler.summary(&data).count, 3);

        assert!(!reconciler.toggle_all(&data));
        assert!(reconciler.selection().is_empty());
        reconciler.flush().await;
        assert_eq!(authority.committed_len(), 0);
    }

    #[tokio::test]
    async fn test_supersede_stale_drops_old_select() {
        let authority = Arc::new(InMemoryAuthority::new());
        let data = rows(&authority, &["a", "b"]);
        let stats = Arc::new(crate::observe::SyncStats::new());
        let mut reconciler = Reconciler::new(Arc::clone(&authority))
            .with_observer(stats.clone())
            .with_supersede_stale(true);

        reconciler.toggle("a".into(), &data);
        reconciler.toggle("b".into(), &data);
        reconciler.flush().await;

        assert_eq!(
            authority.calls(),
            vec![
                AuthorityCall::Clear,
                AuthorityCall::Clear,
                AuthorityCall::Select {
                    tokens: vec![*data[0].token(), *data[1].token()],
                    allow_multiple: true,
                },
            ]
        );
        assert_eq!(stats.snapshot().superseded, 1);
        assert_eq!(stats.snapshot().in_flight(), 0);
    }

    #[tokio::test]
    async fn test_pending_until_flushed() {
        let authority = Arc::new(InMemoryAuthority::new());
        let data = rows(&authority, &["a"]);
        let mut reconciler = Reconciler::new(Arc::clone(&authority));

        reconciler.toggle("a".into(), &data);
        assert_eq!(reconciler.sync_state(), SyncState::Pending);

        reconciler.flush().await;
        assert_eq!(reconciler.sync_state(), SyncState::Clean);
    }

    #[tokio::test]
    async fn test_shared_identity_sends_every_token() {
        let authority = Arc::new(InMemoryAuthority::new());
        let data = rows(&authority, &["a", "b", "a"]);
        let mut reconciler = Reconciler::new(Arc::clone(&authority));

        reconciler.toggle("a".into(), &data);
        reconciler.flush().await;

        assert_eq!(
            authority.calls().pop(),
            Some(AuthorityCall::Select {
                tokens: vec![*data[0].token(), *data[2].token()],
                allow_multiple: true,
            })
        );
        assert_eq!(reconciler.summary(&data).count, 1);
    }

    #[tokio::test]
    async fn test_toggle_all_on_empty_dataset_clears() {
        let authority = Arc::new(InMemoryAuthority::new());
        let mut reconciler = Reconciler::new(Arc::clone(&authority));

        assert!(!reconciler.toggle_all(&[]));
        reconciler.flush().await;

        assert!(reconciler.selection().is_empty());
        assert_eq!(authority.calls(), vec![AuthorityCall::Clear]);
    }

    #[test]
    fn test_failure_level_follows_transience() {
        assert_eq!(failure_level(&AuthorityError::unavailable("busy")), Level::Warn);
        assert_eq!(failure_level(&AuthorityError::rejected("stale token")), Level::Error);
    }

    #[test]
    fn test_no_runtime_keeps_local_state() {
        let authority = Arc::new(InMemoryAuthority::new());
        let data = rows(&authority, &["a"]);
        let stats = Arc::new(crate::observe::SyncStats::new());
        let mut reconciler =
            Reconciler::new(Arc::clone(&authority)).with_observer(stats.clone());

        reconciler.toggle("a".into(), &data);

        assert!(reconciler.is_selected("a"));
        assert_eq!(stats.snapshot().failures, 1);
        assert!(authority.calls().is_empty());
    }
}
