//! In-memory selection authority using DashMap

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::DashSet;
use uuid::Uuid;

use super::RowContext;
use super::SelectionAuthority;
use crate::error::AuthorityError;
use crate::model::Identity;

/// Number of calls an [`InMemoryAuthority`] remembers. Older ones are dropped.
pub const CALL_LOG_CAPACITY: usize = 1024;

/// A call received by an [`InMemoryAuthority`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorityCall {
    /// `clear()`.
    Clear,
    /// `select(tokens, allow_multiple)`.
    Select {
        /// Tokens in the order they were sent.
        tokens: Vec<Uuid>,
        /// Multi-select flag.
        allow_multiple: bool,
    },
}

/// A selection authority that lives in process memory.
///
/// Mints random UUID tokens, records calls in arrival order and keeps the
/// committed selection. Useful for hosts without a native selection service
/// and for tests.
///
/// Only tokens of the current snapshot are kept, plus any still committed
/// from the previous one. The call log holds the last
/// [`CALL_LOG_CAPACITY`] calls.
///
/// # Example
///
/// ```
/// use productlist_lib::selection::InMemoryAuthority;
///
/// let authority = InMemoryAuthority::new();
/// authority.reject_next(1);
/// assert!(authority.calls().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryAuthority {
    minted: DashMap<Uuid, Identity>,
    committed: DashSet<Uuid>,
    calls: Mutex<VecDeque<AuthorityCall>>,
    reject_remaining: AtomicUsize,
}

impl InMemoryAuthority {
    /// Creates an authority with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` calls fail with [`AuthorityError::Rejected`].
    pub fn reject_next(&self, count: usize) {
        self.reject_remaining.store(count, Ordering::SeqCst);
    }

    /// Returns the logged calls, oldest first.
    pub fn calls(&self) -> Vec<AuthorityCall> {
        self.calls
            .lock()
            .map(|c| c.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns the identities behind the committed tokens, sorted.
    pub fn selected_identities(&self) -> Vec<Identity> {
        let mut identities: Vec<Identity> = self
            .committed
            .iter()
            .filter_map(|token| self.minted.get(token.key()).map(|id| id.value().clone()))
            .collect();
        identities.sort();
        identities.dedup();
        identities
    }

    /// Returns the number of committed tokens.
    pub fn committed_len(&self) -> usize {
        self.committed.len()
    }

    /// Returns the number of tokens still resolvable to an identity.
    pub fn minted_len(&self) -> usize {
        self.minted.len()
    }

    fn record(&self, call: AuthorityCall) -> Result<(), AuthorityError> {
        if let Ok(mut calls) = self.calls.lock() {
            if calls.len() == CALL_LOG_CAPACITY {
                calls.pop_front();
            }
            calls.push_back(call);
        }
        let rejected = self
            .reject_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if rejected {
            Err(AuthorityError::rejected("rejected by in-memory authority"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SelectionAuthority for InMemoryAuthority {
    type Token = Uuid;

    fn begin_snapshot(&self) {
        self.minted.retain(|token, _| self.committed.contains(token));
    }

    fn mint_token(&self, row: &RowContext<'_>) -> Uuid {
        let token = Uuid::new_v4();
        self.minted.insert(token, row.identity.clone());
        token
    }

    async fn clear(&self) -> Result<(), AuthorityError> {
        self.record(AuthorityCall::Clear)?;
        self.committed.clear();
        Ok(())
    }

    async fn select(&self, tokens: Vec<Uuid>, allow_multiple: bool) -> Result<(), AuthorityError> {
        self.record(AuthorityCall::Select {
            tokens: tokens.clone(),
            allow_multiple,
        })?;
        if !allow_multiple {
            self.committed.clear();
        }
        for token in tokens {
            self.committed.insert(token);
        }
        Ok(())
    }
}
