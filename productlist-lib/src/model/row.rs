//! Row records held by the row store

use std::borrow::Borrow;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde::ser::SerializeMap;

use super::Value;

/// Stable, domain-derived key of a row.
///
/// Identities survive refreshes, sorting and paging; positions do not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Creates an identity from any string-like key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Identity {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identity {
    fn from(v: &str) -> Self {
        Self(v.to_string())
    }
}

impl From<String> for Identity {
    fn from(v: String) -> Self {
        Self(v)
    }
}

/// Ordered field mapping of a row, column name to value.
///
/// Keeps the host's field order so the presentation layer can rely on it.
/// Serializes as a JSON object in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(String, Value)>,
}

impl Fields {
    /// Creates an empty field mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any existing value under the same name.
    ///
    /// # Example
    ///
    /// ```
    /// use productlist_lib::model::{Fields, Value};
    ///
    /// let fields = Fields::new().set("name", "Kettle").set("price", 39.0);
    /// assert_eq!(fields.get("price"), Some(&Value::Number(39.0)));
    /// assert_eq!(fields.len(), 2);
    /// ```
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts a field in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Returns the value of a field, if present.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Iterates fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

impl Serialize for Fields {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// One ingested row.
///
/// `T` is the selection authority's token type. Tokens belong to the snapshot
/// that minted them and are only ever handed back to the authority.
#[derive(Debug, Clone)]
pub struct Row<T> {
    identity: Identity,
    fields: Fields,
    token: T,
    position: usize,
}

impl<T> Row<T> {
    /// Creates a row.
    pub fn new(identity: Identity, fields: Fields, token: T, position: usize) -> Self {
        Self {
            identity,
            fields,
            token,
            position,
        }
    }

    /// Returns the row identity.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Returns the row fields.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Returns a field value, if present.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns the authority token minted for this row.
    pub fn token(&self) -> &T {
        &self.token
    }

    /// Returns the ingestion position.
    pub fn position(&self) -> usize {
        self.position
    }
}
