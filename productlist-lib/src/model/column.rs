//! Column schema

use serde::Deserialize;
use serde::Serialize;

/// How a column's values are compared when sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Locale-aware string collation.
    #[default]
    Text,
    /// Numeric comparison; missing values count as zero.
    Number,
}

/// A displayed column.
///
/// Only columns with `sortable` set can be used as a sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Field name the column reads from each row.
    pub key: String,
    /// Header label for the presentation layer.
    #[serde(default)]
    pub label: String,
    /// Comparison kind.
    #[serde(default)]
    pub kind: ColumnKind,
    /// Whether the header can be clicked to sort.
    ///
    /// Default: `true`, for both the builders and deserialized columns.
    #[serde(default = "default_sortable")]
    pub sortable: bool,
}

fn default_sortable() -> bool {
    true
}

impl Column {
    /// Creates a sortable text column.
    pub fn text(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind: ColumnKind::Text,
            sortable: true,
        }
    }

    /// Creates a sortable numeric column.
    pub fn number(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind: ColumnKind::Number,
            sortable: true,
        }
    }

    /// Marks the column as not sortable.
    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }
}
