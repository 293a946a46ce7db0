//! Row store: the current immutable snapshot.

use log::debug;

use crate::error::IngestError;
use crate::model::Identity;
use crate::model::Row;
use crate::selection::RowContext;
use crate::selection::SelectionAuthority;
use crate::source::IDENTITY_ROLE;
use crate::source::RawRow;

/// Turns raw rows into [`Row`]s, minting one token per row.
///
/// Identities and fields are copied as-is, so ingesting the same input twice
/// yields the same identities and fields. Tokens come fresh from the
/// authority each time, after [`SelectionAuthority::begin_snapshot`] has
/// retired the previous ones.
pub fn ingest<A: SelectionAuthority + ?Sized>(
    raw: Vec<RawRow>,
    authority: &A,
) -> Result<Vec<Row<A::Token>>, IngestError> {
    authority.begin_snapshot();
    if raw.is_empty() {
        return Err(IngestError::EmptyDataset);
    }

    raw.into_iter()
        .enumerate()
        .map(|(position, raw)| {
            let identity = raw
                .identity
                .map(Identity::new)
                .ok_or_else(|| IngestError::missing_identity(IDENTITY_ROLE, position))?;
            let token = authority.mint_token(&RowContext {
                position,
                identity: &identity,
                fields: &raw.fields,
            });
            Ok(Row::new(identity, raw.fields, token, position))
        })
        .collect()
}

/// Holds the rows of the current snapshot in ingestion order.
#[derive(Debug, Clone)]
pub struct RowStore<T> {
    rows: Vec<Row<T>>,
    generation: u64,
}

impl<T> Default for RowStore<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            generation: 0,
        }
    }
}

impl<T> RowStore<T> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the snapshot wholesale.
    pub fn replace(&mut self, rows: Vec<Row<T>>) {
        self.generation += 1;
        debug!(
            "Row store replaced: generation {}, {} rows",
            self.generation,
            rows.len()
        );
        self.rows = rows;
    }

    /// Drops the snapshot, leaving the store empty.
    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }

    /// Returns the rows in ingestion order.
    pub fn rows(&self) -> &[Row<T>] {
        &self.rows
    }

    /// Number of snapshots stored so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the store has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
