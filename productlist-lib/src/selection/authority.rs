//! External selection authority seam.

use async_trait::async_trait;

use crate::error::AuthorityError;
use crate::model::Fields;
use crate::model::Identity;

/// What the authority sees of a row when minting its token.
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    /// Ingestion position within the snapshot.
    pub position: usize,
    /// Row identity.
    pub identity: &'a Identity,
    /// Row fields.
    pub fields: &'a Fields,
}

/// The external service that owns the authoritative selection.
///
/// The only write operations are "clear everything" and "select exactly
/// these". Tokens are minted once per row per snapshot and are opaque to the
/// core; it never compares, hashes or keeps them past the snapshot.
///
/// # Example
///
/// ```ignore
/// use productlist_lib::selection::{SelectionAuthority, RowContext};
///
/// struct HostSelection { /* host handle */ }
///
/// #[async_trait::async_trait]
/// impl SelectionAuthority for HostSelection {
///     type Token = HostSelectionId;
///
///     fn mint_token(&self, row: &RowContext<'_>) -> HostSelectionId {
///         self.builder().with_row(row.position).build()
///     }
///
///     async fn clear(&self) -> Result<(), AuthorityError> {
///         self.manager().clear().await.map_err(|e| AuthorityError::unavailable(e.to_string()))
///     }
///
///     async fn select(&self, tokens: Vec<HostSelectionId>, allow_multiple: bool) -> Result<(), AuthorityError> {
///         self.manager().select(tokens, allow_multiple).await.map_err(|e| AuthorityError::rejected(e.to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait SelectionAuthority: Send + Sync + 'static {
    /// Opaque per-snapshot selection capability.
    type Token: Clone + Send + Sync + 'static;

    /// Called once before the rows of a new snapshot are minted.
    ///
    /// Tokens of earlier snapshots are dead from here on. Authorities that
    /// keep per-token state can drop it. Default: does nothing.
    fn begin_snapshot(&self) {}

    /// Mints the token for one row of a new snapshot.
    fn mint_token(&self, row: &RowContext<'_>) -> Self::Token;

    /// Deselects everything.
    async fn clear(&self) -> Result<(), AuthorityError>;

    /// Selects exactly `tokens`.
    async fn select(
        &self,
        tokens: Vec<Self::Token>,
        allow_multiple: bool,
    ) -> Result<(), AuthorityError>;
}
