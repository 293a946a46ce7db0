//! Configuration error types

/// Errors that can occur while loading or validating a
/// [`ControllerConfig`](crate::config::ControllerConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration document is not valid JSON for the schema.
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// No page sizes were offered.
    #[error("At least one page size must be offered")]
    NoPageSizes,

    /// A page size of zero was offered.
    #[error("Page sizes must be greater than zero")]
    ZeroPageSize,

    /// The default page size is not among the offered sizes.
    #[error("Default page size {0} is not among the offered sizes")]
    DefaultPageSizeNotOffered(usize),

    /// Two columns share the same key.
    #[error("Duplicate column key '{0}'")]
    DuplicateColumn(String),
}
