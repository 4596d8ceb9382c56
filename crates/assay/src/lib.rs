//! Assay: schema-driven normalization of unknown financial JSON APIs.
//!
//! Assay takes an arbitrary JSON payload from a financial data API it has
//! never seen, infers a schema for it, classifies the payload's shape
//! (time series, trending list, or quote), maps provider field names onto
//! canonical ones, and materializes a normalized row/column dataset ready
//! for rendering.
//!
//! # Core Principles
//!
//! - **Zero configuration**: No per-provider setup; shapes and field
//!   names are discovered from the payload itself.
//! - **Total at the boundary**: [`Assay::transform`] never fails; bad
//!   input yields a failure envelope the caller can fall back from.
//! - **Full provenance**: Every transformation records the mappings used
//!   and per-record success counts.
//!
//! # Example
//!
//! ```no_run
//! use assay::Assay;
//!
//! let payload = serde_json::json!({
//!     "symbol": "AAPL", "price": 150.25, "bid": 150.20, "ask": 150.30
//! });
//!
//! let outcome = Assay::new().transform(&payload, "example.com/quote");
//! println!("rows: {}", outcome.data.total_records);
//! ```

pub mod adapters;
pub mod classify;
pub mod error;
pub mod mapping;
pub mod schema;
pub mod transform;

mod assay;

pub use crate::assay::{Assay, AssayConfig};
pub use classify::{Classification, DataStructure, StructureClassifier};
pub use error::{AssayError, Result};
pub use mapping::{FieldMapper, MappingTemplate};
pub use schema::{detect_field_type, DataSchema, FieldSchema, FieldType, SchemaGenerator};
pub use transform::{
    ColumnDefinition, DataTransformer, FinancialDataset, TransformOutcome,
    TransformationMetadata,
};
