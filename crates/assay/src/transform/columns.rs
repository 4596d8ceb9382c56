//! Column definitions for table rendering.

use serde::{Deserialize, Serialize};

use crate::schema::FieldType;

/// Horizontal alignment for a rendered column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// Display metadata for one dataset column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Row key this column reads from.
    pub key: String,
    /// Human-readable label derived from the key.
    pub label: String,
    /// Display type.
    pub column_type: FieldType,
    /// Alignment derived from the display type.
    pub align: Alignment,
    pub sortable: bool,
    pub filterable: bool,
}

impl ColumnDefinition {
    /// Build a column for a canonical field key and its display type.
    pub fn for_field(key: &str, column_type: FieldType) -> Self {
        Self {
            key: key.to_string(),
            label: humanize_key(key),
            column_type,
            align: alignment_for(column_type),
            sortable: true,
            filterable: matches!(
                column_type,
                FieldType::String | FieldType::Boolean | FieldType::Date | FieldType::DateTime
            ),
        }
    }
}

/// Numbers read best ragged-right, temporal values centered, text left.
fn alignment_for(column_type: FieldType) -> Alignment {
    match column_type {
        FieldType::Number | FieldType::Currency | FieldType::Percentage => Alignment::Right,
        FieldType::Date | FieldType::DateTime | FieldType::Timestamp => Alignment::Center,
        _ => Alignment::Left,
    }
}

/// Turn a camelCase or snake_case key into a title-cased label:
/// `changePercent` and `change_percent` both become "Change Percent".
pub fn humanize_key(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for c in key.chars() {
        if c == '_' || c == '-' || c == '.' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if c.is_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
            current.push(c);
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
