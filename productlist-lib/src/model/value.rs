//! Value enum for dynamic field values

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// A dynamic value held in one field of a row.
///
/// Hosts hand over loosely typed cells. The core only distinguishes what it
/// needs for sorting: text, numbers, and absence.
///
/// # Example
///
/// ```
/// use productlist_lib::model::Value;
///
/// let name = Value::from("Espresso machine");
/// let price = Value::from(349.0);
/// let missing = Value::Null;
/// assert!(missing.is_null());
/// assert_eq!(price.as_number(), Some(349.0));
/// assert_eq!(name.as_text(), Some("Espresso machine"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null/empty value.
    Null,
    /// Numeric value.
    Number(f64),
    /// Text value.
    Text(String),
}

impl Value {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the number, if this is a numeric value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Reads the value as a number for numeric ordering.
    ///
    /// Null, unparseable text and non-finite numbers read as zero. Negative
    /// zero reads as zero so it ties with missing values.
    pub fn numeric_or_zero(&self) -> f64 {
        let n = match self {
            Value::Number(n) => *n,
            Value::Text(s) => s.trim().parse().unwrap_or(0.0),
            Value::Null => 0.0,
        };
        if n.is_finite() { n + 0.0 } else { 0.0 }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}
