//! Row/column materialization from a classified payload and its mapping.

use indexmap::IndexMap;
use serde_json::Value;

use crate::classify::DataStructure;
use crate::error::{AssayError, Result};
use crate::mapping::MappingTemplate;
use crate::schema::{detect_field_type, detect_string_type, FieldType, DATE_KEY};

use super::columns::ColumnDefinition;
use super::dataset::{FinancialDataset, Row, TransformationMetadata};

/// Per-transformation cap so a malformed payload cannot flood provenance.
const MAX_WARNINGS: usize = 8;

/// Fields that can label a tuple-valued dataset element.
const METRIC_LABEL_FIELDS: [&str; 4] = ["metric", "name", "label", "id"];

/// Walks the raw JSON a second time, guided by the mapping template, and
/// produces normalized rows plus column metadata.
#[derive(Debug, Clone, Default)]
pub struct DataTransformer;

impl DataTransformer {
    /// Create a new transformer.
    pub fn new() -> Self {
        Self
    }

    /// Materialize a dataset from a raw payload and its mapping template.
    ///
    /// Row-level problems are recorded in the metadata and do not abort
    /// the dataset; structural problems (unresolvable data path, unknown
    /// structure) surface as errors for the outer boundary to convert.
    pub fn transform(
        &self,
        raw: &Value,
        template: &MappingTemplate,
        source: &str,
    ) -> Result<(FinancialDataset, TransformationMetadata)> {
        let mut metadata = TransformationMetadata::new(source, template.all_mappings());

        let (rows, column_keys) = match template.data_type {
            DataStructure::TimeSeries => self.time_series_rows(raw, template, &mut metadata)?,
            DataStructure::Trending => self.trending_rows(raw, template, &mut metadata)?,
            DataStructure::Quote => self.quote_rows(raw, template, &mut metadata)?,
            DataStructure::Unknown => {
                return Err(AssayError::Unclassifiable(
                    "mapping template carries no recognized structure".to_string(),
                ))
            }
        };

        let columns = Self::build_columns(&column_keys, &rows);
        let title = Self::title_for(raw, template, source);
        let dataset =
            FinancialDataset::new(source, template.data_type, title, columns, rows);

        Ok((dataset, metadata))
    }

    /// Time-series rows: one per date key for date-keyed objects, one per
    /// element (or per tuple) for array-backed series.
    fn time_series_rows(
        &self,
        raw: &Value,
        template: &MappingTemplate,
        metadata: &mut TransformationMetadata,
    ) -> Result<(Vec<Row>, Vec<String>)> {
        if let Some(pos) = template.data_path.iter().position(|s| s == DATE_KEY) {
            return self.date_keyed_rows(raw, &template.data_path[..pos], template, metadata);
        }

        let container = Self::resolve_segments(raw, &template.data_path)?;
        let Some(items) = container.as_array() else {
            return Err(AssayError::PathResolution {
                path: template.data_path.join("."),
                message: "expected an array of time-series records".to_string(),
            });
        };

        let mut rows = Vec::new();
        let mut used_tuples = false;

        for element in items {
            match element {
                Value::Object(obj) if Self::tuple_values(obj).is_some() => {
                    used_tuples = true;
                    self.tuple_dataset_rows(obj, &mut rows, metadata);
                }
                Value::Object(_) => {
                    metadata.records_processed += 1;
                    let row = Self::extract_row(
                        element,
                        &[&template.price, &template.time, &template.entity],
                    );
                    if row.is_empty() {
                        metadata.records_failed += 1;
                        Self::warn(metadata, "time-series element yielded no mapped fields");
                    } else {
                        metadata.records_succeeded += 1;
                        rows.push(row);
                    }
                }
                _ => {
                    metadata.records_processed += 1;
                    metadata.records_failed += 1;
                    Self::warn(metadata, "time-series element is not an object");
                }
            }
        }

        let mut keys =
            Self::ordered_keys(&[&template.price, &template.time, &template.entity], &[]);
        if used_tuples {
            // Tuple rows carry synthetic keys of their own; an array can
            // mix both element kinds.
            for key in ["metric", "date", "value"] {
                if !keys.iter().any(|k| k == key) {
                    keys.push(key.to_string());
                }
            }
        }

        Ok((rows, keys))
    }

    /// Date-keyed iteration: the key becomes the `date` column, the rest
    /// of the row comes from the per-date object.
    fn date_keyed_rows(
        &self,
        raw: &Value,
        prefix: &[String],
        template: &MappingTemplate,
        metadata: &mut TransformationMetadata,
    ) -> Result<(Vec<Row>, Vec<String>)> {
        let container = Self::resolve_segments(raw, prefix)?;
        let Some(entries) = container.as_object() else {
            return Err(AssayError::PathResolution {
                path: prefix.join("."),
                message: "expected a date-keyed object".to_string(),
            });
        };

        let mut rows = Vec::new();
        for (date_key, entry) in entries {
            metadata.records_processed += 1;

            if !entry.is_object() {
                metadata.records_failed += 1;
                Self::warn(metadata, "date key does not map to an object");
                continue;
            }

            let mut row = Row::new();
            row.insert("date".to_string(), Value::String(date_key.clone()));
            let extracted = Self::extract_row(
                entry,
                &[&template.price, &template.time, &template.entity],
            );
            if extracted.is_empty() {
                metadata.records_failed += 1;
                Self::warn(metadata, "date entry yielded no mapped fields");
                continue;
            }
            row.extend(extracted);
            metadata.records_succeeded += 1;
            rows.push(row);
        }

        let keys = Self::ordered_keys(
            &[&template.price, &template.time, &template.entity],
            &["date"],
        );
        Ok((rows, keys))
    }

    /// One dataset element carrying a metric label and `[date, value]`
    /// tuples becomes one row per tuple, tagged with the metric as a
    /// pivot column.
    fn tuple_dataset_rows(
        &self,
        obj: &serde_json::Map<String, Value>,
        rows: &mut Vec<Row>,
        metadata: &mut TransformationMetadata,
    ) {
        let metric = Self::metric_label(obj);
        let Some(values) = Self::tuple_values(obj) else {
            return;
        };

        for tuple in values {
            metadata.records_processed += 1;
            let Some(parts) = tuple.as_array().filter(|p| p.len() >= 2) else {
                metadata.records_failed += 1;
                Self::warn(metadata, "dataset value is not a [date, value] tuple");
                continue;
            };

            let mut row = Row::new();
            if let Some(ref metric) = metric {
                row.insert("metric".to_string(), Value::String(metric.clone()));
            }
            row.insert("date".to_string(), Self::normalize_value(&parts[0]));
            row.insert("value".to_string(), Self::normalize_value(&parts[1]));
            metadata.records_succeeded += 1;
            rows.push(row);
        }
    }

    /// Trending rows: iterate the array, or every array inside a wrapper
    /// object (gainers and losers combine into one dataset).
    fn trending_rows(
        &self,
        raw: &Value,
        template: &MappingTemplate,
        metadata: &mut TransformationMetadata,
    ) -> Result<(Vec<Row>, Vec<String>)> {
        let container = Self::resolve_segments(raw, &template.data_path)?;

        let elements: Vec<&Value> = match container {
            Value::Array(items) => items.iter().collect(),
            Value::Object(map) => map
                .values()
                .filter_map(|v| v.as_array())
                .flatten()
                .collect(),
            _ => {
                return Err(AssayError::PathResolution {
                    path: template.data_path.join("."),
                    message: "expected an array or wrapper object of records".to_string(),
                })
            }
        };

        let mut rows = Vec::new();
        for element in elements {
            metadata.records_processed += 1;
            if !element.is_object() {
                metadata.records_failed += 1;
                Self::warn(metadata, "trending element is not an object");
                continue;
            }
            let row = Self::extract_row(
                element,
                &[&template.entity, &template.quote, &template.time],
            );
            if row.is_empty() {
                metadata.records_failed += 1;
                Self::warn(metadata, "trending element yielded no mapped fields");
            } else {
                metadata.records_succeeded += 1;
                rows.push(row);
            }
        }

        let keys = Self::ordered_keys(
            &[&template.entity, &template.quote, &template.time],
            &[],
        );
        Ok((rows, keys))
    }

    /// Quote: exactly one row extracted from the root object.
    fn quote_rows(
        &self,
        raw: &Value,
        template: &MappingTemplate,
        metadata: &mut TransformationMetadata,
    ) -> Result<(Vec<Row>, Vec<String>)> {
        metadata.records_processed = 1;

        let row = Self::extract_row(
            raw,
            &[&template.entity, &template.quote, &template.time],
        );

        let mut rows = Vec::new();
        if row.is_empty() {
            metadata.records_failed = 1;
            Self::warn(metadata, "quote payload yielded no mapped fields");
        } else {
            metadata.records_succeeded = 1;
            rows.push(row);
        }

        let keys = Self::ordered_keys(
            &[&template.entity, &template.quote, &template.time],
            &[],
        );
        Ok((rows, keys))
    }

    /// Extract every mapped field from one source object. Null and
    /// unresolvable values are omitted from the row.
    fn extract_row(element: &Value, maps: &[&IndexMap<String, String>]) -> Row {
        let mut row = Row::new();
        for map in maps {
            for (target, path) in map.iter() {
                if row.contains_key(target) {
                    continue;
                }
                if let Some(value) = Self::resolve_path(element, path) {
                    if !value.is_null() {
                        row.insert(target.clone(), Self::normalize_value(value));
                    }
                }
            }
        }
        row
    }

    /// Resolve a source path against an object. Provider field names may
    /// themselves contain dots ("1. open"), so the whole path is tried as
    /// a literal key before any dotted traversal.
    fn resolve_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
        let obj = value.as_object()?;
        if let Some(direct) = obj.get(path) {
            return Some(direct);
        }
        for (idx, _) in path.match_indices('.') {
            let (head, tail) = (&path[..idx], &path[idx + 1..]);
            if let Some(child) = obj.get(head) {
                if let Some(resolved) = Self::resolve_path(child, tail) {
                    return Some(resolved);
                }
            }
        }
        None
    }

    /// Resolve the classification's data path from the root.
    fn resolve_segments<'a>(raw: &'a Value, segments: &[String]) -> Result<&'a Value> {
        let mut current = raw;
        for segment in segments {
            current = current
                .as_object()
                .and_then(|obj| obj.get(segment))
                .ok_or_else(|| AssayError::PathResolution {
                    path: segments.join("."),
                    message: format!("segment '{}' not found", segment),
                })?;
        }
        Ok(current)
    }

    /// Numeric-looking strings become floats; everything else is kept
    /// verbatim.
    fn normalize_value(value: &Value) -> Value {
        if let Value::String(s) = value {
            if detect_string_type(s) == FieldType::Number {
                if let Ok(parsed) = s.trim().replace(',', "").parse::<f64>() {
                    return Value::from(parsed);
                }
            }
        }
        value.clone()
    }

    /// Column keys come from the mapping's target set (a stable superset
    /// across rows), in rule-set order, after any synthetic lead columns.
    fn ordered_keys(maps: &[&IndexMap<String, String>], lead: &[&str]) -> Vec<String> {
        let mut keys: Vec<String> = lead.iter().map(|k| k.to_string()).collect();
        for map in maps {
            for target in map.keys() {
                if !keys.iter().any(|k| k == target) {
                    keys.push(target.clone());
                }
            }
        }
        keys
    }

    /// Display types are read from the first row holding each key; a key
    /// mapped but never resolved stays a string column.
    fn build_columns(keys: &[String], rows: &[Row]) -> Vec<ColumnDefinition> {
        keys.iter()
            .map(|key| {
                let column_type = rows
                    .iter()
                    .find_map(|row| row.get(key))
                    .map(detect_field_type)
                    .unwrap_or(FieldType::String);
                ColumnDefinition::for_field(key, column_type)
            })
            .collect()
    }

    /// Prefer the metadata symbol, then a root-level entity symbol, then
    /// the bare source identifier.
    fn title_for(raw: &Value, template: &MappingTemplate, source: &str) -> String {
        let symbol_path = template.meta.get("symbol").or_else(|| {
            (template.data_type == DataStructure::Quote)
                .then(|| template.entity.get("symbol"))
                .flatten()
        });

        if let Some(path) = symbol_path {
            if let Some(Value::String(symbol)) = Self::resolve_path(raw, path) {
                return format!("{} ({})", symbol, source);
            }
        }
        source.to_string()
    }

    fn metric_label(obj: &serde_json::Map<String, Value>) -> Option<String> {
        METRIC_LABEL_FIELDS
            .iter()
            .find_map(|field| obj.get(*field).and_then(|v| v.as_str()))
            .map(|s| s.to_string())
    }

    fn tuple_values(obj: &serde_json::Map<String, Value>) -> Option<&Vec<Value>> {
        let values = obj.get("values")?.as_array()?;
        match values.first() {
            Some(Value::Array(_)) => Some(values),
            _ => None,
        }
    }

    fn warn(metadata: &mut TransformationMetadata, message: &str) {
        if metadata.warnings.len() < MAX_WARNINGS {
            metadata.warnings.push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::FieldMapper;
    use crate::schema::SchemaGenerator;
    use serde_json::json;

    fn run(value: &Value) -> (FinancialDataset, TransformationMetadata) {
        let schema = SchemaGenerator::new().generate(value);
        let template = FieldMapper::new().generate(&schema);
        DataTransformer::new()
            .transform(value, &template, "test-source")
            .unwrap()
    }

    #[test]
    fn test_date_keyed_series_rows() {
        let payload = json!({
            "Meta Data": { "2. Symbol": "IBM" },
            "Time Series (Daily)": {
                "2024-01-02": {
                    "1. open": "150.0", "2. high": "152.0",
                    "3. low": "149.0", "4. close": "151.0", "5. volume": "1000000"
                },
                "2024-01-03": {
                    "1. open": "151.0", "2. high": "153.0",
                    "3. low": "150.0", "4. close": "152.5", "5. volume": "900000"
                }
            }
        });

        let (dataset, metadata) = run(&payload);

        assert_eq!(dataset.rows.len(), 2);
        assert_eq!(metadata.records_succeeded, 2);
        assert_eq!(dataset.title, "IBM (test-source)");

        let row = &dataset.rows[0];
        assert_eq!(row["date"], json!("2024-01-02"));
        assert_eq!(row["open"], json!(150.0));
        assert_eq!(row["volume"], json!(1000000.0));

        let date_col = dataset.columns.iter().find(|c| c.key == "date").unwrap();
        assert_eq!(date_col.column_type, FieldType::Date);
    }

    #[test]
    fn test_array_series_rows() {
        let payload = json!({
            "candles": [
                { "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5, "volume": 100 },
                { "open": 1.5, "high": 2.5, "low": 1.0, "close": 2.0, "volume": 120 },
                { "open": 2.0, "high": 3.0, "low": 1.5, "close": 2.5, "volume": 90 },
            ]
        });

        let (dataset, metadata) = run(&payload);
        assert_eq!(dataset.rows.len(), 3);
        assert_eq!(metadata.records_processed, 3);
        assert_eq!(dataset.rows[1]["close"], json!(2.0));
    }

    #[test]
    fn test_tuple_dataset_rows() {
        let payload = json!({
            "datasets": [
                {
                    "metric": "Revenue",
                    "values": [["2023-12-31", 394.3], ["2024-12-31", 411.0]]
                },
                {
                    "metric": "Net Income",
                    "values": [["2023-12-31", 97.0]]
                }
            ]
        });

        // Tuple datasets carry no OHLCV fields, so drive the transformer
        // with an explicit template rather than the classifier.
        let template = MappingTemplate {
            data_type: DataStructure::TimeSeries,
            data_path: vec!["datasets".to_string()],
            is_array: true,
            entity: IndexMap::new(),
            price: IndexMap::new(),
            quote: IndexMap::new(),
            time: IndexMap::new(),
            meta: IndexMap::new(),
        };

        let (dataset, metadata) = DataTransformer::new()
            .transform(&payload, &template, "fundamentals")
            .unwrap();

        assert_eq!(dataset.rows.len(), 3);
        assert_eq!(metadata.records_succeeded, 3);
        assert_eq!(dataset.rows[0]["metric"], json!("Revenue"));
        assert_eq!(dataset.rows[0]["date"], json!("2023-12-31"));
        assert_eq!(dataset.rows[0]["value"], json!(394.3));
        assert_eq!(dataset.rows[2]["metric"], json!("Net Income"));
    }

    #[test]
    fn test_trending_wrapper_concatenates() {
        let payload = json!({
            "trending_stocks": {
                "top_gainers": [
                    { "ticker": "AAPL", "price": "150.0", "percent_change": "2.5", "company_name": "Apple" },
                    { "ticker": "MSFT", "price": "410.0", "percent_change": "1.9", "company_name": "Microsoft" },
                ],
                "top_losers": [
                    { "ticker": "XYZ", "price": "10.0", "percent_change": "-5.0", "company_name": "Xyz Corp" },
                ]
            }
        });

        let (dataset, metadata) = run(&payload);
        assert_eq!(dataset.rows.len(), 3);
        assert_eq!(metadata.records_succeeded, 3);
        assert_eq!(dataset.rows[0]["symbol"], json!("AAPL"));
        // Numeric-looking strings are converted.
        assert_eq!(dataset.rows[0]["price"], json!(150.0));
    }

    #[test]
    fn test_quote_single_row() {
        let payload = json!({
            "symbol": "AAPL",
            "price": 150.25,
            "bid": 150.20,
            "ask": 150.30,
            "volume": 52000000,
        });

        let (dataset, metadata) = run(&payload);
        assert_eq!(dataset.rows.len(), 1);
        assert_eq!(metadata.records_processed, 1);
        assert_eq!(dataset.rows[0]["symbol"], json!("AAPL"));
        assert_eq!(dataset.title, "AAPL (test-source)");
    }

    #[test]
    fn test_unmapped_field_absent_everywhere() {
        let payload = json!({
            "price": 10.0,
            "bid": 9.9,
            "ask": 10.1,
        });

        let (dataset, _) = run(&payload);
        assert_eq!(dataset.rows.len(), 1);
        assert!(!dataset.rows[0].contains_key("yearHigh"));
        assert!(dataset.columns.iter().all(|c| c.key != "yearHigh"));
        assert!(dataset.columns.iter().all(|c| c.key != "symbol"));
    }
}
