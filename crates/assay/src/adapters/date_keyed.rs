//! Adapter for date-keyed series payloads in the Alpha Vantage style:
//! a metadata object plus a series object whose keys are dates and whose
//! per-date fields carry ordinal prefixes (`"1. open"`).

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::classify::DataStructure;
use crate::schema::{detect_string_type, FieldType};
use crate::transform::{
    ColumnDefinition, FinancialDataset, Row, TransformationMetadata,
};

use super::ProviderAdapter;

static ORDINAL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[a-z]?\.\s*").unwrap());

pub struct DateKeyedAdapter;

impl DateKeyedAdapter {
    /// Find the series entry: an object value whose keys all parse as
    /// dates. Empty objects do not match.
    fn find_series(
        obj: &serde_json::Map<String, Value>,
    ) -> Option<(&String, &serde_json::Map<String, Value>)> {
        obj.iter().find_map(|(key, value)| {
            let entries = value.as_object()?;
            if entries.is_empty() {
                return None;
            }
            let all_dates = entries
                .keys()
                .all(|k| detect_string_type(k).is_temporal());
            let all_objects = entries.values().all(Value::is_object);
            (all_dates && all_objects).then_some((key, entries))
        })
    }

    /// `"1. open"` becomes `"open"`; keys without a prefix pass through.
    fn strip_ordinal(key: &str) -> String {
        ORDINAL_PREFIX.replace(key, "").trim().to_string()
    }

    fn normalize(value: &Value) -> Value {
        if let Value::String(s) = value {
            if detect_string_type(s) == FieldType::Number {
                if let Ok(parsed) = s.trim().replace(',', "").parse::<f64>() {
                    return Value::from(parsed);
                }
            }
        }
        value.clone()
    }

    /// Pull a symbol out of a metadata sibling for the dataset title.
    fn symbol_from_metadata(obj: &serde_json::Map<String, Value>) -> Option<String> {
        let meta = obj
            .iter()
            .find(|(key, _)| key.to_lowercase().contains("meta"))
            .and_then(|(_, value)| value.as_object())?;
        meta.iter()
            .find(|(key, _)| key.to_lowercase().contains("symbol"))
            .and_then(|(_, value)| value.as_str())
            .map(|s| s.to_string())
    }
}

impl ProviderAdapter for DateKeyedAdapter {
    fn name(&self) -> &'static str {
        "date-keyed-series"
    }

    fn try_transform(
        &self,
        raw: &Value,
        source: &str,
    ) -> Option<(FinancialDataset, TransformationMetadata)> {
        let obj = raw.as_object()?;
        let (series_key, entries) = Self::find_series(obj)?;

        let mut mappings = IndexMap::new();
        mappings.insert("date".to_string(), format!("{}.<date>", series_key));
        let mut column_keys: Vec<String> = vec!["date".to_string()];

        let mut metadata_counts = (0usize, 0usize, 0usize);
        let mut rows = Vec::with_capacity(entries.len());

        for (date, entry) in entries {
            metadata_counts.0 += 1;
            let Some(fields) = entry.as_object() else {
                metadata_counts.2 += 1;
                continue;
            };

            let mut row = Row::new();
            row.insert("date".to_string(), Value::String(date.clone()));
            for (key, value) in fields {
                let target = Self::strip_ordinal(key);
                if target.is_empty() || value.is_null() {
                    continue;
                }
                if !column_keys.iter().any(|k| k == &target) {
                    column_keys.push(target.clone());
                    mappings.insert(target.clone(), key.clone());
                }
                row.insert(target, Self::normalize(value));
            }

            metadata_counts.1 += 1;
            rows.push(row);
        }

        let mut metadata = TransformationMetadata::new(source, mappings);
        metadata.records_processed = metadata_counts.0;
        metadata.records_succeeded = metadata_counts.1;
        metadata.records_failed = metadata_counts.2;

        let columns = column_keys
            .iter()
            .map(|key| {
                let column_type = rows
                    .iter()
                    .find_map(|row| row.get(key))
                    .map(crate::schema::detect_field_type)
                    .unwrap_or(FieldType::String);
                ColumnDefinition::for_field(key, column_type)
            })
            .collect();

        let title = match Self::symbol_from_metadata(obj) {
            Some(symbol) => format!("{} ({})", symbol, source),
            None => source.to_string(),
        };

        let dataset = FinancialDataset::new(
            source,
            DataStructure::TimeSeries,
            title,
            columns,
            rows,
        );
        Some((dataset, metadata))
    }
}
