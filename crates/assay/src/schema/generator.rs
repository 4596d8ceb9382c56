//! Schema generation by recursive payload inspection.

use indexmap::IndexMap;
use serde_json::Value;

use super::detector::{detect_field_type, detect_string_type};
use super::field::{DataSchema, FieldSchema, DATE_KEY};
use super::types::FieldType;

/// Default recursion cap for nested payloads.
///
/// JSON decoded from a wire format cannot be self-referential, but the cap
/// guarantees termination on adversarially deep inputs without relying on
/// the stack unwinding gracefully.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Walks an arbitrary JSON value and produces a typed schema tree.
///
/// Array schemas are drawn from element 0 only. This is an accepted
/// approximation: heterogeneous arrays with mixed-shape elements are
/// described by their first element.
#[derive(Debug, Clone)]
pub struct SchemaGenerator {
    max_depth: usize,
}

impl SchemaGenerator {
    /// Create a generator with the default depth cap.
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Create a generator with a custom depth cap.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Generate a schema for a raw payload. Never fails: scalar or null
    /// roots yield an empty object-rooted schema.
    pub fn generate(&self, raw: &Value) -> DataSchema {
        match raw {
            Value::Object(map) => {
                let fields = self.build_object_schema(map, 0);
                let (metadata, data_fields) = Self::split_metadata(&fields);
                DataSchema {
                    root_type: FieldType::Object,
                    fields,
                    data_fields,
                    metadata,
                }
            }
            Value::Array(items) => {
                // Sample the first element; a root array of objects exposes
                // that element's fields as the top level.
                let fields = match items.first() {
                    Some(Value::Object(map)) => self.build_object_schema(map, 0),
                    _ => IndexMap::new(),
                };
                DataSchema {
                    root_type: FieldType::Array,
                    data_fields: fields.clone(),
                    fields,
                    metadata: IndexMap::new(),
                }
            }
            _ => DataSchema::empty(),
        }
    }

    /// Build schemas for every entry of an object, collapsing date-keyed
    /// objects to a single synthetic [`DATE_KEY`] entry.
    fn build_object_schema(
        &self,
        map: &serde_json::Map<String, Value>,
        depth: usize,
    ) -> IndexMap<String, FieldSchema> {
        if depth >= self.max_depth {
            return IndexMap::new();
        }

        if Self::is_date_keyed(map) {
            let mut fields = IndexMap::new();
            if let Some((_, first)) = map.iter().next() {
                fields.insert(
                    DATE_KEY.to_string(),
                    self.build_field(DATE_KEY, first, depth + 1),
                );
            }
            return fields;
        }

        map.iter()
            .map(|(name, value)| (name.clone(), self.build_field(name, value, depth + 1)))
            .collect()
    }

    /// Build the schema for one field, recursing into objects and the first
    /// element of arrays.
    fn build_field(&self, name: &str, value: &Value, depth: usize) -> FieldSchema {
        let mut schema = FieldSchema::new(name, detect_field_type(value));
        if depth >= self.max_depth {
            return schema;
        }

        match value {
            Value::Object(map) => {
                schema.object_schema = Some(self.build_object_schema(map, depth));
            }
            Value::Array(items) => {
                if let Some(first) = items.first() {
                    schema.array_item_type = Some(detect_field_type(first));
                    match first {
                        Value::Object(map) => {
                            schema.object_schema = Some(self.build_object_schema(map, depth));
                        }
                        Value::Array(inner) if Self::is_primitive_tuple(inner) => {
                            schema.tuple_types =
                                Some(inner.iter().map(detect_field_type).collect());
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }

        schema
    }

    /// An object is date-keyed when it is non-empty and every key parses as
    /// a date, datetime, or epoch timestamp. Providers mix key styles, so
    /// any date-like type counts.
    fn is_date_keyed(map: &serde_json::Map<String, Value>) -> bool {
        !map.is_empty() && map.keys().all(|k| detect_string_type(k).is_temporal())
    }

    /// A fixed-length array of primitives, e.g. `["2024-01-01", 42.5]`.
    fn is_primitive_tuple(items: &[Value]) -> bool {
        !items.is_empty()
            && items.len() <= 8
            && items
                .iter()
                .all(|v| !matches!(v, Value::Object(_) | Value::Array(_)))
    }

    /// Separate metadata sections from data fields by name.
    fn split_metadata(
        fields: &IndexMap<String, FieldSchema>,
    ) -> (IndexMap<String, FieldSchema>, IndexMap<String, FieldSchema>) {
        let mut metadata = IndexMap::new();
        let mut data_fields = IndexMap::new();

        for (name, schema) in fields {
            if name.to_lowercase().contains("meta") {
                metadata.insert(name.clone(), schema.clone());
            } else {
                data_fields.insert(name.clone(), schema.clone());
            }
        }

        (metadata, data_fields)
    }
}

impl Default for SchemaGenerator {
    fn default() -> Self {
        Self::new()
    }
}
