//! Ingestion error types

/// Errors that can occur while turning a host snapshot into rows.
///
/// These never cross the controller boundary as `Err`. A refresh that fails
/// to ingest is surfaced as a placeholder [`ViewState`](crate::view::ViewState)
/// instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    /// The mandatory identity field could not be resolved.
    ///
    /// `position` is `None` when no column is bound to the identity role at
    /// all, and `Some(row)` when a specific row carries a null identity.
    #[error("Unresolvable identity field '{field}'{}", position_suffix(.position))]
    UnresolvableIdentity {
        /// Name of the identity role or column.
        field: String,
        /// Row position that failed, if the failure is row-specific.
        position: Option<usize>,
    },

    /// The snapshot contained no rows.
    #[error("Dataset is empty")]
    EmptyDataset,
}

fn position_suffix(position: &Option<usize>) -> String {
    match position {
        Some(row) => format!(" at row {}", row),
        None => String::new(),
    }
}

impl IngestError {
    /// Creates an error for a snapshot with no identity binding.
    pub fn unbound_identity(field: impl Into<String>) -> Self {
        Self::UnresolvableIdentity {
            field: field.into(),
            position: None,
        }
    }

    /// Creates an error for a row whose identity cell is empty.
    pub fn missing_identity(field: impl Into<String>, position: usize) -> Self {
        Self::UnresolvableIdentity {
            field: field.into(),
            position: Some(position),
        }
    }

    /// Returns `true` if the host must fix its field binding before data can show.
    pub fn needs_configuration(&self) -> bool {
        matches!(self, Self::UnresolvableIdentity { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            IngestError::unbound_identity("sku").to_string(),
            "Unresolvable identity field 'sku'"
        );
        assert_eq!(
            IngestError::missing_identity("sku", 4).to_string(),
            "Unresolvable identity field 'sku' at row 4"
        );
        assert_eq!(IngestError::EmptyDataset.to_string(), "Dataset is empty");
    }

    #[test]
    fn test_needs_configuration() {
        assert!(IngestError::unbound_identity("sku").needs_configuration());
        assert!(!IngestError::EmptyDataset.needs_configuration());
    }
}
