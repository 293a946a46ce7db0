//! Ingestion boundary.
//!
//! The host resolves its own data format into [`RawRow`]s. The core never
//! looks up roles itself; a [`RowResolver`] does that once per refresh.
//! [`ColumnarSnapshot`] is a ready-made resolver input for hosts that deliver
//! role-annotated columns with row-major values.

use crate::error::IngestError;
use crate::model::Fields;
use crate::model::Value;

/// Role name that marks the identity column in a [`ColumnarSnapshot`].
pub const IDENTITY_ROLE: &str = "identity";

/// A row as handed over by the host, before tokens are minted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    /// Identity value, if the host could resolve one.
    pub identity: Option<String>,
    /// Display fields in host order.
    pub fields: Fields,
}

impl RawRow {
    /// Creates a raw row with an identity and no fields.
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: Some(identity.into()),
            fields: Fields::new(),
        }
    }

    /// Adds a field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name, value);
        self
    }
}

/// Resolves a host snapshot into raw rows.
///
/// Returning `Err(IngestError::UnresolvableIdentity { .. })` tells the
/// controller the host binding is incomplete.
pub trait RowResolver {
    /// Host snapshot type.
    type Input: ?Sized;

    /// Resolves the snapshot into rows in ingestion order.
    fn resolve(&self, input: &Self::Input) -> Result<Vec<RawRow>, IngestError>;
}

/// Resolver for snapshots that are already a list of raw rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl RowResolver for Passthrough {
    type Input = [RawRow];

    fn resolve(&self, input: &[RawRow]) -> Result<Vec<RawRow>, IngestError> {
        Ok(input.to_vec())
    }
}

/// Column metadata in a columnar snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMeta {
    /// Field name used in the produced rows.
    pub name: String,
    /// Roles the host bound this column to.
    pub roles: Vec<String>,
}

impl ColumnMeta {
    /// Creates column metadata.
    pub fn new(name: impl Into<String>, roles: &[&str]) -> Self {
        Self {
            name: name.into(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Role-annotated columns plus row-major cell values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnarSnapshot {
    /// Column metadata, in display order.
    pub columns: Vec<ColumnMeta>,
    /// One inner vector per row, aligned with `columns`.
    pub values: Vec<Vec<Value>>,
}

/// Column indices resolved once per snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleBinding {
    /// Index of the identity column.
    pub identity: usize,
    /// Indices of every column that becomes a row field.
    pub display: Vec<usize>,
}

impl RoleBinding {
    /// Binds the columns of a snapshot.
    ///
    /// The first column carrying [`IDENTITY_ROLE`] becomes the identity.
    /// All columns, identity included, become row fields.
    pub fn bind(columns: &[ColumnMeta]) -> Result<Self, IngestError> {
        let identity = columns
            .iter()
            .position(|c| c.has_role(IDENTITY_ROLE))
            .ok_or_else(|| IngestError::unbound_identity(IDENTITY_ROLE))?;
        Ok(Self {
            identity,
            display: (0..columns.len()).collect(),
        })
    }
}

/// Resolver for [`ColumnarSnapshot`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnarResolver;

impl RowResolver for ColumnarResolver {
    type Input = ColumnarSnapshot;

    fn resolve(&self, input: &ColumnarSnapshot) -> Result<Vec<RawRow>, IngestError> {
        let binding = RoleBinding::bind(&input.columns)?;
        let identity_name = &input.columns[binding.identity].name;

        input
            .values
            .iter()
            .enumerate()
            .map(|(position, cells)| {
                let identity = match cells.get(binding.identity) {
                    Some(Value::Null) | None => None,
                    Some(value) => Some(value.to_string()),
                }
                .ok_or_else(|| IngestError::missing_identity(identity_name, position))?;

                let fields = binding
                    .display
                    .iter()
                    .map(|&i| {
                        let value = cells.get(i).cloned().unwrap_or_default();
                        (input.columns[i].name.clone(), value)
                    })
                    .collect();

                Ok(RawRow {
                    identity: Some(identity),
                    fields,
                })
            })
            .collect()
    }
}
