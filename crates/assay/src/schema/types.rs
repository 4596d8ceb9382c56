//! Core type definitions for schema representation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic type of a single JSON field value.
///
/// Exactly one variant applies per value instance, determined by value
/// inspection rather than any declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Text values with no more specific interpretation.
    String,
    /// Native numbers, or strings that fully parse as numbers.
    Number,
    /// Boolean values (true/false).
    Boolean,
    /// Calendar date without a time component (e.g. `2024-01-15`).
    Date,
    /// ISO 8601 timestamp with a `T` separator.
    DateTime,
    /// Epoch seconds or milliseconds encoded as an all-digit string.
    Timestamp,
    /// Currency-formatted string (e.g. `$1,234.56`).
    Currency,
    /// Percentage-formatted string (e.g. `10.5%`).
    Percentage,
    /// JSON array.
    Array,
    /// JSON object.
    Object,
    /// JSON null.
    Null,
}

impl FieldType {
    /// Returns true if this type carries a numeric magnitude.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldType::Number | FieldType::Currency | FieldType::Percentage
        )
    }

    /// Returns true if this type is temporal.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            FieldType::Date | FieldType::DateTime | FieldType::Timestamp
        )
    }

    /// Returns true if this type nests further structure.
    pub fn is_compound(&self) -> bool {
        matches!(self, FieldType::Array | FieldType::Object)
    }
}

impl Default for FieldType {
    fn default() -> Self {
        FieldType::Null
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
            FieldType::Timestamp => "timestamp",
            FieldType::Currency => "currency",
            FieldType::Percentage => "percentage",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Null => "null",
        };
        write!(f, "{}", name)
    }
}
