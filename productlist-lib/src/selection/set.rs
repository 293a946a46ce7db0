//! Identity-keyed selection set.

use std::collections::HashSet;

use serde::Serialize;

use crate::model::Identity;
use crate::model::Row;

/// Selection count over the current snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSummary {
    /// Selected identities that exist in the snapshot.
    pub count: usize,
    /// `true` when every identity in a non-empty snapshot is selected.
    pub all_selected: bool,
}

/// Tracks selected rows by identity.
///
/// Positions, sort order and paging never enter the set, so a selection
/// survives all of them. Identities missing from the current snapshot stay
/// in the set but are not counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    selected: HashSet<Identity>,
}

impl SelectionSet {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `identity`. Returns `true` if it is now selected.
    pub fn toggle(&mut self, identity: Identity) -> bool {
        if self.selected.remove(&identity) {
            false
        } else {
            self.selected.insert(identity);
            true
        }
    }

    /// Check if an identity is selected.
    pub fn is_selected(&self, identity: &str) -> bool {
        self.selected.contains(identity)
    }

    /// Adds every row's identity.
    pub fn select_rows<T>(&mut self, rows: &[Row<T>]) {
        self.selected
            .extend(rows.iter().map(|row| row.identity().clone()));
    }

    /// Clear all selections, orphaned identities included.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Number of identities held, orphaned ones included.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Returns `true` if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Get all selected identities.
    pub fn iter(&self) -> impl Iterator<Item = &Identity> {
        self.selected.iter()
    }

    /// Counts the selection against a snapshot.
    ///
    /// Duplicate identities in the snapshot count once.
    pub fn summary<T>(&self, rows: &[Row<T>]) -> SelectionSummary {
        let present: HashSet<&Identity> = rows.iter().map(|row| row.identity()).collect();
        let count = present
            .iter()
            .filter(|identity| self.selected.contains(**identity))
            .count();
        SelectionSummary {
            count,
            all_selected: !present.is_empty() && count == present.len(),
        }
    }
}
