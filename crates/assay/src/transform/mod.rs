//! Dataset materialization: rows, columns, and provenance.

mod columns;
mod dataset;
mod engine;

pub use columns::{humanize_key, Alignment, ColumnDefinition};
pub use dataset::{
    dataset_id, FinancialDataset, Row, TransformOutcome, TransformationMetadata,
};
pub use engine::DataTransformer;
