//! Selection authority error types

/// Errors reported by a [`SelectionAuthority`](crate::selection::SelectionAuthority).
///
/// The reconciler logs and counts these. They are never returned to the caller
/// of a selection operation and never roll back local selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorityError {
    /// The authority refused the call.
    #[error("Selection rejected: {0}")]
    Rejected(String),

    /// The authority could not be reached or is not ready.
    #[error("Selection authority unavailable: {0}")]
    Unavailable(String),

    /// No async runtime was available to dispatch the call on.
    #[error("No async runtime available to dispatch selection sync")]
    NoRuntime,
}

impl AuthorityError {
    /// Creates a new rejection error.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Creates a new unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Returns `true` if a later sync could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
