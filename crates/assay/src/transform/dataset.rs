//! Normalized dataset and transformation provenance types.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::classify::DataStructure;

use super::columns::ColumnDefinition;

/// A normalized row: canonical field name to typed value. Unmapped and
/// null source values are absent, never placeholders.
pub type Row = IndexMap<String, Value>;

/// A normalized row/column dataset ready for table, card, or chart
/// rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialDataset {
    /// Deterministic identifier derived from the source and shape.
    pub id: String,
    /// Human-readable title (symbol and source when known).
    pub title: String,
    /// The canonical shape the rows were materialized from.
    pub data_type: DataStructure,
    /// Display metadata, one entry per canonical field in the mapping.
    pub columns: Vec<ColumnDefinition>,
    pub rows: Vec<Row>,
    pub total_records: usize,
    /// Caller-supplied source identifier, used only for labeling.
    pub source: String,
}

impl FinancialDataset {
    /// Build a dataset; `total_records` follows the row count.
    pub fn new(
        source: &str,
        data_type: DataStructure,
        title: String,
        columns: Vec<ColumnDefinition>,
        rows: Vec<Row>,
    ) -> Self {
        Self {
            id: dataset_id(source, data_type),
            title,
            data_type,
            columns,
            total_records: rows.len(),
            rows,
            source: source.to_string(),
        }
    }

    /// An empty dataset for failure envelopes.
    pub fn empty(source: &str, data_type: DataStructure) -> Self {
        Self::new(source, data_type, source.to_string(), Vec::new(), Vec::new())
    }
}

/// Deterministic dataset id: the same source and shape always produce the
/// same id, so re-transformations are stable cache keys for callers.
pub fn dataset_id(source: &str, data_type: DataStructure) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(data_type.to_string().as_bytes());
    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    hex[..12].to_string()
}

/// Provenance record describing how a transformation went.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationMetadata {
    /// Source API identifier.
    pub source: String,
    /// When the transformation ran.
    pub timestamp: DateTime<Utc>,
    /// The field mappings actually used (canonical name to source path).
    pub field_mappings: IndexMap<String, String>,
    pub records_processed: usize,
    pub records_succeeded: usize,
    pub records_failed: usize,
    /// Non-fatal issues encountered while materializing rows.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl TransformationMetadata {
    /// Fresh metadata for one transformation call.
    pub fn new(source: &str, field_mappings: IndexMap<String, String>) -> Self {
        Self {
            source: source.to_string(),
            timestamp: Utc::now(),
            field_mappings,
            records_processed: 0,
            records_succeeded: 0,
            records_failed: 0,
            warnings: Vec::new(),
        }
    }
}

/// Result envelope returned to callers. The pipeline reports failure
/// through this shape rather than an error: on failure the caller falls
/// back to rendering the raw payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformOutcome {
    pub success: bool,
    /// Whether the caller should render the transformed dataset (false
    /// means fall back to the raw payload).
    pub use_transformed_data: bool,
    pub data: FinancialDataset,
    /// Copy of the dataset's columns, for callers that only render tables.
    pub columns: Vec<ColumnDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub metadata: TransformationMetadata,
}

impl TransformOutcome {
    /// A successful outcome wrapping a materialized dataset.
    pub fn success(data: FinancialDataset, metadata: TransformationMetadata) -> Self {
        Self {
            success: true,
            use_transformed_data: true,
            columns: data.columns.clone(),
            data,
            error: None,
            metadata,
        }
    }

    /// A structured failure with an empty dataset and a reason.
    pub fn failure(source: &str, reason: impl Into<String>) -> Self {
        Self {
            success: false,
            use_transformed_data: false,
            data: FinancialDataset::empty(source, DataStructure::Unknown),
            columns: Vec::new(),
            error: Some(reason.into()),
            metadata: TransformationMetadata::new(source, IndexMap::new()),
        }
    }
}
