//! Schema types and inference for arbitrary JSON payloads.

mod detector;
mod field;
mod generator;
mod types;

pub use detector::{detect_field_type, detect_string_type};
pub use field::{DataSchema, FieldSchema, DATE_KEY};
pub use generator::{SchemaGenerator, DEFAULT_MAX_DEPTH};
pub use types::FieldType;
