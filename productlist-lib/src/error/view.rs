//! View operation error types

/// Errors returned by user-driven view operations given invalid arguments.
///
/// Local state is left untouched when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    /// The column key is not part of the configured schema.
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    /// The column exists but is not declared sortable.
    #[error("Column '{0}' is not sortable")]
    NotSortable(String),

    /// The requested page size is not one of the offered sizes.
    #[error("Page size {requested} is not offered (choose from {offered:?})")]
    UnsupportedPageSize {
        /// The size the caller asked for.
        requested: usize,
        /// The sizes the controller offers.
        offered: Vec<usize>,
    },
}
