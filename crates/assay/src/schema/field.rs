//! Field and payload schema definitions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::types::FieldType;

/// Synthetic key standing in for "any date-like key at this level".
///
/// Date-keyed objects (e.g. Alpha Vantage time series) collapse to a single
/// entry under this key describing the shape shared by every date.
pub const DATE_KEY: &str = "[DATE]";

/// Schema describing a single field of a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Field name as it appears in the source payload.
    pub name: String,
    /// Detected semantic type.
    pub field_type: FieldType,
    /// Nested field schemas. Present when the field is an object, or an
    /// array whose elements are objects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_schema: Option<IndexMap<String, FieldSchema>>,
    /// Detected type of the first array element, for array fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_item_type: Option<FieldType>,
    /// Ordered element types when array elements are fixed-length tuples of
    /// primitives, such as `[date, value]` pairs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tuple_types: Option<Vec<FieldType>>,
}

impl FieldSchema {
    /// Create a leaf field schema.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            object_schema: None,
            array_item_type: None,
            tuple_types: None,
        }
    }

    /// Returns true if this field is an array whose elements are objects.
    pub fn is_object_array(&self) -> bool {
        self.field_type == FieldType::Array
            && self.array_item_type == Some(FieldType::Object)
            && self.object_schema.is_some()
    }

    /// Returns true if this field is an array of fixed-length primitive tuples.
    pub fn is_tuple_array(&self) -> bool {
        self.field_type == FieldType::Array && self.tuple_types.is_some()
    }
}

/// Root schema describing an entire payload.
///
/// Built once per raw payload and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSchema {
    /// Type of the payload root: [`FieldType::Object`] or [`FieldType::Array`].
    pub root_type: FieldType,
    /// Every top-level field.
    pub fields: IndexMap<String, FieldSchema>,
    /// Top-level fields after separating out recognized metadata sections.
    pub data_fields: IndexMap<String, FieldSchema>,
    /// Metadata sections (top-level keys whose name contains "meta").
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub metadata: IndexMap<String, FieldSchema>,
}

impl DataSchema {
    /// An object-rooted schema with no fields.
    pub fn empty() -> Self {
        Self {
            root_type: FieldType::Object,
            fields: IndexMap::new(),
            data_fields: IndexMap::new(),
            metadata: IndexMap::new(),
        }
    }

    /// Returns true if no fields were discovered at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
