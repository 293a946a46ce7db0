//! Controller configuration

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::Column;

/// Configuration for a [`ListController`](crate::controller::ListController).
///
/// # Example
///
/// ```
/// use productlist_lib::config::ControllerConfig;
/// use productlist_lib::model::Column;
///
/// let config = ControllerConfig::default()
///     .with_columns(vec![Column::text("name", "Name"), Column::number("price", "Price")])
///     .with_page_sizes(vec![25, 50])
///     .with_default_page_size(25)
///     .with_locale("de");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControllerConfig {
    /// Displayed columns; only sortable ones can become a sort key.
    pub columns: Vec<Column>,

    /// Page sizes offered to the user.
    ///
    /// Default: 10, 20, 50, 100
    pub page_sizes: Vec<usize>,

    /// Page size used until the user picks another one.
    ///
    /// Default: 20
    pub default_page_size: usize,

    /// Locale used for text collation.
    ///
    /// Default: "en"
    pub locale: String,

    /// Drop the select of a sync that a newer sync has overtaken.
    ///
    /// Default: false
    pub supersede_stale_syncs: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            page_sizes: vec![10, 20, 50, 100],
            default_page_size: 20,
            locale: "en".to_string(),
            supersede_stale_syncs: false,
        }
    }
}

impl ControllerConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a JSON document. Missing keys take defaults.
    ///
    /// ```
    /// use productlist_lib::config::ControllerConfig;
    ///
    /// let config = ControllerConfig::from_json(r#"{
    ///     "columns": [{ "key": "name", "label": "Name", "sortable": true }],
    ///     "pageSizes": [5, 10],
    ///     "defaultPageSize": 5
    /// }"#).unwrap();
    /// assert_eq!(config.default_page_size, 5);
    /// assert_eq!(config.locale, "en");
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the columns.
    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    /// Sets the offered page sizes.
    pub fn with_page_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.page_sizes = sizes;
        self
    }

    /// Sets the default page size.
    pub fn with_default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size;
        self
    }

    /// Sets the collation locale.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Enables or disables superseding stale syncs.
    pub fn with_supersede_stale_syncs(mut self, enabled: bool) -> Self {
        self.supersede_stale_syncs = enabled;
        self
    }

    /// Checks the page-size rules and column key uniqueness.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_sizes.is_empty() {
            return Err(ConfigError::NoPageSizes);
        }
        if self.page_sizes.contains(&0) {
            return Err(ConfigError::ZeroPageSize);
        }
        if !self.page_sizes.contains(&self.default_page_size) {
            return Err(ConfigError::DefaultPageSizeNotOffered(self.default_page_size));
        }
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.key.as_str()) {
                return Err(ConfigError::DuplicateColumn(column.key.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ControllerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_page_sizes() {
        let config = ControllerConfig::default().with_page_sizes(vec![]);
        assert!(matches!(config.validate(), Err(ConfigError::NoPageSizes)));

        let config = ControllerConfig::default().with_page_sizes(vec![0, 20]);
        assert!(matches!(config.validate(), Err(ConfigError::ZeroPageSize)));

        let config = ControllerConfig::default().with_default_page_size(15);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DefaultPageSizeNotOffered(15))
        ));
    }

    #[test]
    fn test_validate_duplicate_columns() {
        let config = ControllerConfig::default()
            .with_columns(vec![Column::text("name", "Name"), Column::text("name", "Again")]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateColumn(key)) if key == "name"
        ));
    }

    #[test]
    fn test_from_json_column_kinds() {
        let config = ControllerConfig::from_json(
            r#"{ "columns": [{ "key": "price", "kind": "number", "sortable": true }] }"#,
        )
        .unwrap();
        assert_eq!(config.columns[0].kind, crate::model::ColumnKind::Number);
        assert_eq!(config.page_sizes, vec![10, 20, 50, 100]);
    }

    #[test]
    fn test_from_json_columns_sortable_unless_opted_out() {
        let config = ControllerConfig::from_json(
            r#"{ "columns": [
                { "key": "name" },
                { "key": "notes", "sortable": false }
            ] }"#,
        )
        .unwrap();
        assert_eq!(config.columns[0], Column::text("name", ""));
        assert_eq!(config.columns[1], Column::text("notes", "").unsortable());
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            ControllerConfig::from_json("{ nope"),
            Err(ConfigError::Json(_))
        ));
    }
}
