//! Sort engine.
//!
//! Orders rows by one column. Every sort starts again from ingestion order,
//! so switching keys or clearing the key never depends on what the previous
//! sort left behind.

mod collation;

pub use collation::*;

use std::cmp::Ordering;

use log::debug;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ViewError;
use crate::model::Column;
use crate::model::ColumnKind;
use crate::model::Row;
use crate::model::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// Active sort: a column key and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Column key.
    pub column: String,
    /// Direction.
    pub direction: SortDirection,
}

impl SortKey {
    /// Creates an ascending key.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// Creates a descending key.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Holds the sort key and orders rows by it.
#[derive(Debug, Clone)]
pub struct SortEngine {
    columns: Vec<Column>,
    collator: Collator,
    key: Option<SortKey>,
}

impl SortEngine {
    /// Creates an engine over a column schema. No key is active.
    pub fn new(columns: Vec<Column>, collator: Collator) -> Self {
        Self {
            columns,
            collator,
            key: None,
        }
    }

    /// Get current sort key.
    pub fn key(&self) -> Option<&SortKey> {
        self.key.as_ref()
    }

    /// Returns the column schema.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Advances the header-click cycle for `column`.
    ///
    /// The same column goes ascending, descending, then back to ingestion
    /// order. A different column always starts ascending. Returns the new key.
    ///
    /// # Example
    ///
    /// ```
    /// use productlist_lib::model::Column;
    /// use productlist_lib::sort::{Collator, SortEngine, SortKey};
    ///
    /// let mut engine = SortEngine::new(vec![Column::text("name", "Name")], Collator::default());
    /// assert_eq!(engine.cycle("name").unwrap(), Some(SortKey::asc("name")));
    /// assert_eq!(engine.cycle("name").unwrap(), Some(SortKey::desc("name")));
    /// assert_eq!(engine.cycle("name").unwrap(), None);
    /// ```
    pub fn cycle(&mut self, column: &str) -> Result<Option<SortKey>, ViewError> {
        self.sortable(column)?;
        let next = match &self.key {
            Some(key) if key.column == column => match key.direction {
                SortDirection::Ascending => Some(SortKey::desc(column)),
                SortDirection::Descending => None,
            },
            _ => Some(SortKey::asc(column)),
        };
        debug!("Sort key changed: {:?} -> {:?}", self.key, next);
        self.key = next.clone();
        Ok(next)
    }

    /// Sets the key directly, skipping the cycle.
    pub fn set_key(&mut self, key: Option<SortKey>) -> Result<(), ViewError> {
        if let Some(key) = &key {
            self.sortable(&key.column)?;
        }
        self.key = key;
        Ok(())
    }

    /// Returns indices into `rows` in display order.
    pub fn order<T>(&self, rows: &[Row<T>]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..rows.len()).collect();
        order.sort_by_key(|&i| rows[i].position());

        let Some(key) = &self.key else {
            return order;
        };
        let kind = self
            .columns
            .iter()
            .find(|c| c.key == key.column)
            .map(|c| c.kind)
            .unwrap_or_default();

        order.sort_by(|&a, &b| {
            let (a, b) = (&rows[a], &rows[b]);
            let primary = self.compare_values(kind, a.field(&key.column), b.field(&key.column));
            let primary = match key.direction {
                SortDirection::Ascending => primary,
                SortDirection::Descending => primary.reverse(),
            };
            primary.then_with(|| a.position().cmp(&b.position()))
        });
        order
    }

    /// Returns rows in display order.
    pub fn sort<'a, T>(&self, rows: &'a [Row<T>]) -> Vec<&'a Row<T>> {
        self.order(rows).into_iter().map(|i| &rows[i]).collect()
    }

    fn compare_values(&self, kind: ColumnKind, a: Option<&Value>, b: Option<&Value>) -> Ordering {
        let null = Value::Null;
        let (a, b) = (a.unwrap_or(&null), b.unwrap_or(&null));
        match kind {
            ColumnKind::Number => a.numeric_or_zero().total_cmp(&b.numeric_or_zero()),
            ColumnKind::Text => self.collator.compare(&a.to_string(), &b.to_string()),
        }
    }

    fn sortable(&self, column: &str) -> Result<(), ViewError> {
        match self.columns.iter().find(|c| c.key == column) {
            Some(c) if c.sortable => Ok(()),
            Some(_) => Err(ViewError::NotSortable(column.to_string())),
            None => Err(ViewError::UnknownColumn(column.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Fields;
    use crate::model::Identity;

    fn engine() -> SortEngine {
        SortEngine::new(
            vec![
                Column::text("name", "Name"),
                Column::number("price", "Price"),
                Column::text("note", "Note").unsortable(),
            ],
            Collator::default(),
        )
    }

    fn row(id: &str, position: usize, name: &str, price: Option<f64>) -> Row<()> {
        let fields = Fields::new().set("name", name).set("price", price);
        Row::new(Identity::from(id), fields, (), position)
    }

    fn ids(engine: &SortEngine, rows: &[Row<()>]) -> Vec<String> {
        engine
            .sort(rows)
            .iter()
            .map(|r| r.identity().to_string())
            .collect()
    }

    #[test]
    fn test_no_key_restores_position_order() {
        let rows = vec![row("b", 1, "x", None), row("a", 0, "y", None)];
        assert_eq!(ids(&engine(), &rows), vec!["a", "b"]);
    }

    #[test]
    fn test_tri_state_cycle() {
        let mut engine = engine();
        assert_eq!(engine.cycle("name").unwrap(), Some(SortKey::asc("name")));
        assert_eq!(engine.cycle("name").unwrap(), Some(SortKey::desc("name")));
        assert_eq!(engine.cycle("name").unwrap(), None);
        assert_eq!(engine.cycle("name").unwrap(), Some(SortKey::asc("name")));
    }

    #[test]
    fn test_other_column_starts_ascending() {
        let mut engine = engine();
        engine.cycle("name").unwrap();
        engine.cycle("name").unwrap();
        assert_eq!(engine.cycle("price").unwrap(), Some(SortKey::asc("price")));
    }

    #[test]
    fn test_rejects_unknown_and_unsortable() {
        let mut engine = engine();
        assert_eq!(
            engine.cycle("colour"),
            Err(ViewError::UnknownColumn("colour".to_string()))
        );
        assert_eq!(
            engine.cycle("note"),
            Err(ViewError::NotSortable("note".to_string()))
        );
        assert!(engine.key().is_none());
    }

    #[test]
    fn test_text_sort_uses_collation() {
        let rows = vec![
            row("1", 0, "banana", None),
            row("2", 1, "Apple", None),
            row("3", 2, "cherry", None),
        ];
        let mut engine = engine();
        engine.cycle("name").unwrap();
        assert_eq!(ids(&engine, &rows), vec!["2", "1", "3"]);
        engine.cycle("name").unwrap();
        assert_eq!(ids(&engine, &rows), vec!["3", "1", "2"]);
    }

    #[test]
    fn test_missing_numbers_sort_as_zero_both_ways() {
        let rows = vec![
            row("pos", 0, "", Some(5.0)),
            row("missing", 1, "", None),
            row("neg", 2, "", Some(-3.0)),
        ];
        let mut engine = engine();
        engine.cycle("price").unwrap();
        assert_eq!(ids(&engine, &rows), vec!["neg", "missing", "pos"]);
        engine.cycle("price").unwrap();
        assert_eq!(ids(&engine, &rows), vec!["pos", "missing", "neg"]);
    }

    #[test]
    fn test_negative_zero_and_nan_tie_with_missing() {
        let rows = vec![
            row("missing", 0, "", None),
            row("negzero", 1, "", Some(-0.0)),
            row("nan", 2, "", Some(f64::NAN)),
        ];
        let mut engine = engine();
        engine.cycle("price").unwrap();
        assert_eq!(ids(&engine, &rows), vec!["missing", "negzero", "nan"]);
        engine.cycle("price").unwrap();
        assert_eq!(ids(&engine, &rows), vec!["missing", "negzero", "nan"]);
    }

    #[test]
    fn test_ties_break_by_position_in_both_directions() {
        let rows = vec![
            row("a", 0, "same", Some(1.0)),
            row("b", 1, "same", Some(1.0)),
            row("c", 2, "same", Some(1.0)),
        ];
        let mut engine = engine();
        engine.cycle("price").unwrap();
        assert_eq!(ids(&engine, &rows), vec!["a", "b", "c"]);
        engine.cycle("price").unwrap();
        assert_eq!(ids(&engine, &rows), vec!["a", "b", "c"]);
    }
}
