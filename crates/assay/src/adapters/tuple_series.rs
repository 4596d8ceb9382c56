//! Adapter for labeled tuple-series payloads: a `datasets` array whose
//! elements carry a metric label and `values` as `[date, value]` pairs.

use indexmap::IndexMap;
use serde_json::Value;

use crate::classify::DataStructure;
use crate::schema::FieldType;
use crate::transform::{
    ColumnDefinition, FinancialDataset, Row, TransformationMetadata,
};

use super::ProviderAdapter;

const LABEL_FIELDS: [&str; 4] = ["metric", "name", "label", "id"];

pub struct TupleSeriesAdapter;

impl TupleSeriesAdapter {
    /// Every element must be an object carrying a `values` array of
    /// arrays; at least one element must be present.
    fn matching_datasets(raw: &Value) -> Option<&Vec<Value>> {
        let datasets = raw.as_object()?.get("datasets")?.as_array()?;
        if datasets.is_empty() {
            return None;
        }
        let all_match = datasets.iter().all(|element| {
            element
                .as_object()
                .and_then(|obj| obj.get("values"))
                .and_then(Value::as_array)
                .is_some_and(|values| values.iter().all(Value::is_array))
        });
        all_match.then_some(datasets)
    }

    fn label(obj: &serde_json::Map<String, Value>) -> Option<&str> {
        LABEL_FIELDS
            .iter()
            .find_map(|field| obj.get(*field).and_then(Value::as_str))
    }
}

impl ProviderAdapter for TupleSeriesAdapter {
    fn name(&self) -> &'static str {
        "tuple-series"
    }

    fn try_transform(
        &self,
        raw: &Value,
        source: &str,
    ) -> Option<(FinancialDataset, TransformationMetadata)> {
        let datasets = Self::matching_datasets(raw)?;

        let mut mappings = IndexMap::new();
        mappings.insert("metric".to_string(), "datasets.metric".to_string());
        mappings.insert("date".to_string(), "datasets.values[0]".to_string());
        mappings.insert("value".to_string(), "datasets.values[1]".to_string());
        let mut metadata = TransformationMetadata::new(source, mappings);

        let mut rows = Vec::new();
        for element in datasets {
            let Some(obj) = element.as_object() else {
                continue;
            };
            let label = Self::label(obj);
            let Some(values) = obj.get("values").and_then(Value::as_array) else {
                continue;
            };

            for tuple in values {
                metadata.records_processed += 1;
                let Some(parts) = tuple.as_array().filter(|p| p.len() >= 2) else {
                    metadata.records_failed += 1;
                    continue;
                };

                let mut row = Row::new();
                if let Some(label) = label {
                    row.insert("metric".to_string(), Value::String(label.to_string()));
                }
                row.insert("date".to_string(), parts[0].clone());
                row.insert("value".to_string(), parts[1].clone());
                metadata.records_succeeded += 1;
                rows.push(row);
            }
        }

        let columns = vec![
            ColumnDefinition::for_field("metric", FieldType::String),
            ColumnDefinition::for_field("date", FieldType::Date),
            ColumnDefinition::for_field("value", FieldType::Number),
        ];

        let dataset = FinancialDataset::new(
            source,
            DataStructure::TimeSeries,
            source.to_string(),
            columns,
            rows,
        );
        Some((dataset, metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fundamentals_payload() {
        let payload = json!({
            "datasets": [
                { "metric": "Revenue", "values": [["2023-12-31", 394.3], ["2024-12-31", 411.0]] },
                { "metric": "EPS", "values": [["2023-12-31", 6.1]] },
            ]
        });

        let (dataset, metadata) = TupleSeriesAdapter.try_transform(&payload, "fund").unwrap();

        assert_eq!(dataset.rows.len(), 3);
        assert_eq!(metadata.records_succeeded, 3);
        assert_eq!(dataset.rows[0]["metric"], json!("Revenue"));
        assert_eq!(dataset.rows[2]["metric"], json!("EPS"));
        assert_eq!(dataset.rows[2]["value"], json!(6.1));
    }

    #[test]
    fn test_rejects_object_valued_datasets() {
        let payload = json!({
            "datasets": [{ "metric": "Revenue", "values": [{"date": "2023", "v": 1.0}] }]
        });
        assert!(TupleSeriesAdapter.try_transform(&payload, "x").is_none());
    }

    #[test]
    fn test_short_tuples_counted_failed() {
        let payload = json!({
            "datasets": [{ "metric": "Revenue", "values": [["2023-12-31"], ["2024-12-31", 1.0]] }]
        });
        let (dataset, metadata) = TupleSeriesAdapter.try_transform(&payload, "x").unwrap();
        assert_eq!(dataset.rows.len(), 1);
        assert_eq!(metadata.records_failed, 1);
    }
}
