//! Schema provider traits and an in-memory row schema.
//!
//! The parser never owns the schema of the data it describes. It asks a
//! [`SchemaProvider`] for the type of a field, or for the full ordered field
//! list when expanding `*`.

use serde::{Deserialize, Serialize};

use crate::literal::types::{self, SqlType};
use crate::literal::FieldTypeCategory;

/// Type information about one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldTypeDescriptor {
    /// The type category.
    pub category: FieldTypeCategory,
    /// Display length (characters for strings, digits for numbers).
    pub length: Option<u32>,
    /// Display precision; for `Number` fields, the scale.
    pub precision: Option<u32>,
}

impl FieldTypeDescriptor {
    /// Creates a descriptor without length or precision.
    #[must_use]
    pub const fn new(category: FieldTypeCategory) -> Self {
        Self {
            category,
            length: None,
            precision: None,
        }
    }

    /// Sets the display length.
    #[must_use]
    pub const fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets the display precision.
    #[must_use]
    pub const fn with_precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Returns the display name of the type.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        self.category.as_str()
    }

    /// Returns the SQL type this field is reported as.
    #[must_use]
    pub const fn sql_type(&self) -> SqlType {
        types::encode(self.category)
    }
}

impl From<FieldTypeCategory> for FieldTypeDescriptor {
    fn from(category: FieldTypeCategory) -> Self {
        Self::new(category)
    }
}

/// Read-only lookup of the fields a query runs against.
///
/// Implementations must not change while a statement is being parsed.
pub trait SchemaProvider {
    /// Returns the type of the named field, if it exists.
    fn lookup_field(&self, name: &str) -> Option<FieldTypeDescriptor>;

    /// Returns every field with its type, in schema order.
    fn ordered_fields(&self) -> Vec<(String, FieldTypeDescriptor)>;
}

/// An ordered list of named, typed fields held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSchema {
    fields: Vec<(String, FieldTypeDescriptor)>,
}

impl RowSchema {
    /// Creates an empty schema.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field_type: impl Into<FieldTypeDescriptor>) -> Self {
        self.fields.push((name.into(), field_type.into()));
        self
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl SchemaProvider for RowSchema {
    /// Exact names win; otherwise the first case-insensitive match is used.
    fn lookup_field(&self, name: &str) -> Option<FieldTypeDescriptor> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .or_else(|| self.fields.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)))
            .map(|(_, t)| t.clone())
    }

    fn ordered_fields(&self) -> Vec<(String, FieldTypeDescriptor)> {
        self.fields.clone()
    }
}
