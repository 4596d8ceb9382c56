//! Adapter for candle payloads built from parallel single-letter arrays
//! (Finnhub and compatible APIs): `{"c": [...], "h": [...], "l": [...],
//! "o": [...], "t": [...], "v": [...]}`.

use chrono::DateTime;
use indexmap::IndexMap;
use serde_json::Value;

use crate::classify::DataStructure;
use crate::schema::FieldType;
use crate::transform::{
    ColumnDefinition, FinancialDataset, Row, TransformationMetadata,
};

use super::ProviderAdapter;

/// Source key to canonical field, in output column order.
const SERIES: [(&str, &str); 5] = [
    ("o", "open"),
    ("h", "high"),
    ("l", "low"),
    ("c", "close"),
    ("v", "volume"),
];

pub struct OhlcvArrayAdapter;

impl OhlcvArrayAdapter {
    /// The signature requires the four price arrays with one shared
    /// length; timestamps and volume are optional.
    fn matches(obj: &serde_json::Map<String, Value>) -> Option<usize> {
        let mut len: Option<usize> = None;
        for key in ["o", "h", "l", "c"] {
            let arr = obj.get(key)?.as_array()?;
            if !arr.iter().all(Value::is_number) {
                return None;
            }
            match len {
                Some(expected) if expected != arr.len() => return None,
                _ => len = Some(arr.len()),
            }
        }
        len
    }

    fn epoch_to_date(value: &Value) -> Option<String> {
        let secs = value.as_i64()?;
        DateTime::from_timestamp(secs, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
    }
}

impl ProviderAdapter for OhlcvArrayAdapter {
    fn name(&self) -> &'static str {
        "ohlcv-arrays"
    }

    fn try_transform(
        &self,
        raw: &Value,
        source: &str,
    ) -> Option<(FinancialDataset, TransformationMetadata)> {
        let obj = raw.as_object()?;
        let len = Self::matches(obj)?;

        let timestamps = obj.get("t").and_then(Value::as_array);
        let mut mappings = IndexMap::new();
        if timestamps.is_some() {
            mappings.insert("date".to_string(), "t".to_string());
        }
        for (key, target) in SERIES {
            if obj.contains_key(key) {
                mappings.insert(target.to_string(), key.to_string());
            }
        }

        let mut metadata = TransformationMetadata::new(source, mappings);
        let mut rows = Vec::with_capacity(len);

        for i in 0..len {
            metadata.records_processed += 1;
            let mut row = Row::new();

            if let Some(date) = timestamps
                .and_then(|t| t.get(i))
                .and_then(Self::epoch_to_date)
            {
                row.insert("date".to_string(), Value::String(date));
            }
            for (key, target) in SERIES {
                if let Some(value) = obj.get(key).and_then(|arr| arr.get(i)) {
                    if value.is_number() {
                        row.insert(target.to_string(), value.clone());
                    }
                }
            }

            metadata.records_succeeded += 1;
            rows.push(row);
        }

        let mut columns = Vec::new();
        if timestamps.is_some() {
            columns.push(ColumnDefinition::for_field("date", FieldType::Date));
        }
        for (key, target) in SERIES {
            if obj.contains_key(key) {
                columns.push(ColumnDefinition::for_field(target, FieldType::Number));
            }
        }

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
    fn test_matches_candle_payload() {
        let payload = json!({
            "c": [151.0, 152.5],
            "h": [152.0, 153.0],
            "l": [149.0, 150.0],
            "o": [150.0, 151.0],
            "t": [1704153600, 1704240000],
            "v": [1000000, 900000],
            "s": "ok"
        });

        let (dataset, metadata) = OhlcvArrayAdapter
            .try_transform(&payload, "finnhub")
            .unwrap();

        assert_eq!(dataset.rows.len(), 2);
        assert_eq!(metadata.records_succeeded, 2);
        assert_eq!(dataset.rows[0]["open"], json!(150.0));
        assert_eq!(dataset.rows[0]["date"], json!("2024-01-02"));
        assert_eq!(dataset.data_type, DataStructure::TimeSeries);
    }

    #[test]
    fn test_rejects_mismatched_lengths() {
        let payload = json!({
            "c": [151.0],
            "h": [152.0, 153.0],
            "l": [149.0],
            "o": [150.0],
        });
        assert!(OhlcvArrayAdapter.try_transform(&payload, "x").is_none());
    }

    #[test]
    fn test_rejects_non_numeric_arrays() {
        let payload = json!({
            "c": ["a"], "h": [1.0], "l": [1.0], "o": [1.0],
        });
        assert!(OhlcvArrayAdapter.try_transform(&payload, "x").is_none());
    }

    #[test]
    fn test_volume_optional() {
        let payload = json!({
            "c": [151.0], "h": [152.0], "l": [149.0], "o": [150.0],
        });
        let (dataset, _) = OhlcvArrayAdapter.try_transform(&payload, "x").unwrap();
        assert_eq!(dataset.rows.len(), 1);
        assert!(!dataset.rows[0].contains_key("volume"));
        assert!(dataset.columns.iter().all(|c| c.key != "volume"));
    }
}
