//! Top-level engine tying the pipeline stages together.

use serde_json::Value;

use crate::adapters::run_builtin_adapters;
use crate::classify::{Classification, StructureClassifier};
use crate::error::{AssayError, Result};
use crate::mapping::{FieldMapper, MappingTemplate};
use crate::schema::{DataSchema, SchemaGenerator, DEFAULT_MAX_DEPTH};
use crate::transform::{
    DataTransformer, FinancialDataset, TransformOutcome, TransformationMetadata,
};

/// Configuration for an [`Assay`] engine.
#[derive(Debug, Clone)]
pub struct AssayConfig {
    /// Maximum nesting depth explored during schema inference.
    pub max_depth: usize,
    /// Try the provider adapters before the generic pipeline.
    pub use_adapters: bool,
}

impl Default for AssayConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            use_adapters: true,
        }
    }
}

/// The transformation engine: schema inference, structure classification,
/// field mapping, and row materialization behind one entry point.
///
/// # Example
///
/// ```no_run
/// use assay::Assay;
///
/// let payload = serde_json::json!({
///     "symbol": "AAPL", "price": 150.25, "bid": 150.20, "ask": 150.30
/// });
///
/// let outcome = Assay::new().transform(&payload, "example.com/quote");
/// if outcome.success {
///     println!("{} rows", outcome.data.total_records);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Assay {
    config: AssayConfig,
    generator: SchemaGenerator,
    classifier: StructureClassifier,
    mapper: FieldMapper,
    transformer: DataTransformer,
}

impl Default for Assay {
    fn default() -> Self {
        Self::new()
    }
}

impl Assay {
    /// Create an engine with the default configuration.
    pub fn new() -> Self {
        Self::build(AssayConfig::default())
    }

    /// Create an engine with an explicit configuration.
    pub fn with_config(config: AssayConfig) -> Result<Self> {
        if config.max_depth == 0 {
            return Err(AssayError::Config(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(Self::build(config))
    }

    fn build(config: AssayConfig) -> Self {
        Self {
            generator: SchemaGenerator::with_max_depth(config.max_depth),
            classifier: StructureClassifier::new(),
            mapper: FieldMapper::new(),
            transformer: DataTransformer::new(),
            config,
        }
    }

    /// Transform an arbitrary JSON payload into a normalized dataset.
    ///
    /// This is a total function over JSON values: any input yields an
    /// outcome envelope, with failures reported through the envelope's
    /// `success` flag rather than an error.
    pub fn transform(&self, raw: &Value, source: &str) -> TransformOutcome {
        if self.config.use_adapters {
            if let Some((dataset, metadata)) = run_builtin_adapters(raw, source) {
                tracing::info!(
                    source,
                    rows = dataset.total_records,
                    "transformed via provider adapter"
                );
                return TransformOutcome::success(dataset, metadata);
            }
        }

        match self.run_pipeline(raw, source) {
            Ok((dataset, metadata)) => {
                tracing::info!(
                    source,
                    data_type = %dataset.data_type,
                    rows = dataset.total_records,
                    "transformed via inference pipeline"
                );
                TransformOutcome::success(dataset, metadata)
            }
            Err(e) => {
                tracing::warn!(source, error = %e, "transformation failed");
                TransformOutcome::failure(source, e.to_string())
            }
        }
    }

    /// Parse a JSON string and transform it. Parse errors are reported
    /// through the failure envelope like any other failure.
    pub fn transform_str(&self, json: &str, source: &str) -> TransformOutcome {
        match serde_json::from_str::<Value>(json) {
            Ok(raw) => self.transform(&raw, source),
            Err(e) => TransformOutcome::failure(source, AssayError::Json(e).to_string()),
        }
    }

    /// Run schema inference only.
    pub fn schema(&self, raw: &Value) -> DataSchema {
        self.generator.generate(raw)
    }

    /// Run schema inference and structure classification only.
    pub fn classify(&self, raw: &Value) -> Classification {
        let schema = self.generator.generate(raw);
        self.classifier.classify(&schema)
    }

    /// Run the pipeline up to field mapping, returning the template that
    /// a full transformation would use.
    pub fn mapping(&self, raw: &Value) -> MappingTemplate {
        let schema = self.generator.generate(raw);
        let classification = self.classifier.classify(&schema);
        self.mapper.generate_for(&schema, &classification)
    }

    fn run_pipeline(
        &self,
        raw: &Value,
        source: &str,
    ) -> Result<(FinancialDataset, TransformationMetadata)> {
        let schema = self.generator.generate(raw);
        if schema.is_empty() {
            return Err(AssayError::EmptySchema(
                "payload has no discoverable fields".to_string(),
            ));
        }

        let classification = self.classifier.classify(&schema);
        let template = self.mapper.generate_for(&schema, &classification);
        self.transformer.transform(raw, &template, source)
    }
}
