//! Structure classification: deciding which canonical financial shape a
//! payload represents, and where its data lives.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::{DataSchema, FieldSchema, FieldType, DATE_KEY};

/// Marker names for OHLCV time-series candidates.
const OHLCV_MARKERS: [&str; 5] = ["open", "high", "low", "close", "volume"];
/// Marker names for trending/movers list candidates.
const TRENDING_MARKERS: [&str; 5] = ["price", "change", "percent_change", "company_name", "ticker"];
/// Marker names for single-quote candidates.
const QUOTE_MARKERS: [&str; 5] = ["price", "bid", "ask", "change", "volume"];

// Thresholds tolerate APIs that omit one or two conventional fields while
// avoiding false positives on unrelated objects that happen to contain one
// matching substring.
const OHLCV_THRESHOLD: usize = 4;
const TRENDING_THRESHOLD: usize = 3;
const QUOTE_THRESHOLD: usize = 2;

/// Canonical shapes a payload can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataStructure {
    TimeSeries,
    Trending,
    Quote,
    Unknown,
}

impl fmt::Display for DataStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataStructure::TimeSeries => "time_series",
            DataStructure::Trending => "trending",
            DataStructure::Quote => "quote",
            DataStructure::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Result of classifying a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// The detected canonical shape.
    pub structure: DataStructure,
    /// Path segments from the payload root to the data. May contain the
    /// [`DATE_KEY`] sentinel meaning "every key at this level is a date".
    pub data_path: Vec<String>,
    /// Whether the data at `data_path` is iterated as an array.
    pub is_array: bool,
}

impl Classification {
    fn unknown() -> Self {
        Self {
            structure: DataStructure::Unknown,
            data_path: Vec::new(),
            is_array: false,
        }
    }
}

/// Inspects a generated schema and decides which canonical shape the
/// payload represents. First match wins, evaluated top-down.
#[derive(Debug, Clone, Default)]
pub struct StructureClassifier;

impl StructureClassifier {
    /// Create a new classifier.
    pub fn new() -> Self {
        Self
    }

    /// Classify a schema into one of the canonical shapes.
    pub fn classify(&self, schema: &DataSchema) -> Classification {
        // 1. Date-keyed time series, at the root or one level down.
        if let Some(date_entry) = schema.data_fields.get(DATE_KEY) {
            if Self::passes_ohlcv(date_entry) {
                return Classification {
                    structure: DataStructure::TimeSeries,
                    data_path: vec![DATE_KEY.to_string()],
                    is_array: false,
                };
            }
        }
        for (name, field) in &schema.data_fields {
            if field.field_type != FieldType::Object {
                continue;
            }
            let Some(children) = &field.object_schema else {
                continue;
            };
            if let Some(date_entry) = children.get(DATE_KEY) {
                if Self::passes_ohlcv(date_entry) {
                    return Classification {
                        structure: DataStructure::TimeSeries,
                        data_path: vec![name.clone(), DATE_KEY.to_string()],
                        is_array: false,
                    };
                }
            }
        }

        // 2. Arrays of objects at the top level.
        for (name, field) in &schema.data_fields {
            if let Some(classification) = Self::classify_object_array(field, vec![name.clone()]) {
                return classification;
            }
        }

        // 2b. The same tests one level deeper, for wrapper objects holding
        // the arrays (e.g. `trending_stocks.top_gainers`).
        for (name, field) in &schema.data_fields {
            if field.field_type != FieldType::Object {
                continue;
            }
            let Some(children) = &field.object_schema else {
                continue;
            };
            for (child_name, child) in children {
                if !child.is_object_array() {
                    continue;
                }
                let Some(elem) = child.object_schema.as_ref() else {
                    continue;
                };
                if count_markers(elem.keys(), &TRENDING_MARKERS) >= TRENDING_THRESHOLD {
                    // Wrapper path only: sibling arrays (gainers and losers)
                    // are iterated together by the transformer.
                    return Classification {
                        structure: DataStructure::Trending,
                        data_path: vec![name.clone()],
                        is_array: true,
                    };
                }
                if count_markers(elem.keys(), &OHLCV_MARKERS) >= OHLCV_THRESHOLD {
                    return Classification {
                        structure: DataStructure::TimeSeries,
                        data_path: vec![name.clone(), child_name.clone()],
                        is_array: true,
                    };
                }
            }
        }

        // 2c. Root arrays: element fields are the top level.
        if schema.root_type == FieldType::Array && !schema.data_fields.is_empty() {
            if count_markers(schema.data_fields.keys(), &TRENDING_MARKERS) >= TRENDING_THRESHOLD {
                return Classification {
                    structure: DataStructure::Trending,
                    data_path: Vec::new(),
                    is_array: true,
                };
            }
            if count_markers(schema.data_fields.keys(), &OHLCV_MARKERS) >= OHLCV_THRESHOLD {
                return Classification {
                    structure: DataStructure::TimeSeries,
                    data_path: Vec::new(),
                    is_array: true,
                };
            }
        }

        // 3. Single quote at the root.
        if schema.root_type == FieldType::Object
            && count_markers(schema.data_fields.keys(), &QUOTE_MARKERS) >= QUOTE_THRESHOLD
        {
            return Classification {
                structure: DataStructure::Quote,
                data_path: Vec::new(),
                is_array: false,
            };
        }

        Classification::unknown()
    }

    /// Trending and OHLCV tests for a direct array-of-objects field.
    fn classify_object_array(field: &FieldSchema, path: Vec<String>) -> Option<Classification> {
        if !field.is_object_array() {
            return None;
        }
        let elem = field.object_schema.as_ref()?;

        if count_markers(elem.keys(), &TRENDING_MARKERS) >= TRENDING_THRESHOLD {
            return Some(Classification {
                structure: DataStructure::Trending,
                data_path: path,
                is_array: true,
            });
        }
        if count_markers(elem.keys(), &OHLCV_MARKERS) >= OHLCV_THRESHOLD {
            return Some(Classification {
                structure: DataStructure::TimeSeries,
                data_path: path,
                is_array: true,
            });
        }
        None
    }

    fn passes_ohlcv(date_entry: &FieldSchema) -> bool {
        date_entry
            .object_schema
            .as_ref()
            .map(|per_date| count_markers(per_date.keys(), &OHLCV_MARKERS) >= OHLCV_THRESHOLD)
            .unwrap_or(false)
    }
}

/// Case-insensitive test that a marker appears within a field name
/// ("open" matches "1. open"). One direction only: a short field name
/// appearing inside a marker must not count, or near-arbitrary keys
/// would pass the shape thresholds.
pub(crate) fn marker_matches(marker: &str, name: &str) -> bool {
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return false;
    }
    name.contains(&marker.to_lowercase())
}

/// Count how many markers have at least one matching field name.
pub(crate) fn count_markers<'a, I, S>(names: I, markers: &[&str]) -> usize
where
    I: Iterator<Item = &'a S> + Clone,
    S: AsRef<str> + 'a,
{
    markers
        .iter()
        .filter(|marker| {
            names
                .clone()
                .any(|name| marker_matches(marker, name.as_ref()))
        })
        .count()
}

/// Trending test for an element schema, shared with the field mapper's
/// wrapper descent.
pub(crate) fn passes_trending(elem: &indexmap::IndexMap<String, FieldSchema>) -> bool {
    count_markers(elem.keys(), &TRENDING_MARKERS) >= TRENDING_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaGenerator;
    use serde_json::json;

    fn classify(value: serde_json::Value) -> Classification {
        let schema = SchemaGenerator::new().generate(&value);
        StructureClassifier::new().classify(&schema)
    }

    #[test]
    fn test_date_keyed_time_series() {
        let c = classify(json!({
            "Meta Data": { "2. Symbol": "IBM" },
            "Time Series (Daily)": {
                "2024-01-02": {
                    "1. open": "150.0", "2. high": "152.0",
                    "3. low": "149.0", "4. close": "151.0", "5. volume": "1000000"
                }
            }
        }));

        assert_eq!(c.structure, DataStructure::TimeSeries);
        assert_eq!(c.data_path, vec!["Time Series (Daily)", DATE_KEY]);
        assert!(!c.is_array);
    }

    #[test]
    fn test_array_time_series() {
        let c = classify(json!({
            "candles": [
                { "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5, "volume": 100 }
            ]
        }));

        assert_eq!(c.structure, DataStructure::TimeSeries);
        assert_eq!(c.data_path, vec!["candles"]);
        assert!(c.is_array);
    }

    #[test]
    fn test_trending_wrapper() {
        let c = classify(json!({
            "trending_stocks": {
                "top_gainers": [
                    { "ticker": "AAPL", "price": "150", "percent_change": "2.5" }
                ],
                "top_losers": [
                    { "ticker": "XYZ", "price": "10", "percent_change": "-5.0" }
                ]
            }
        }));

        assert_eq!(c.structure, DataStructure::Trending);
        assert_eq!(c.data_path, vec!["trending_stocks"]);
        assert!(c.is_array);
    }

    #[test]
    fn test_quote_at_root() {
        let c = classify(json!({
            "symbol": "AAPL",
            "price": 150.25,
            "bid": 150.20,
            "ask": 150.30,
        }));

        assert_eq!(c.structure, DataStructure::Quote);
        assert!(c.data_path.is_empty());
    }

    #[test]
    fn test_unrelated_object_is_unknown() {
        let c = classify(json!({
            "message": "hello",
            "count": 3,
        }));
        assert_eq!(c.structure, DataStructure::Unknown);
    }

    #[test]
    fn test_single_matching_substring_not_enough() {
        // "volume" alone must not trigger the quote test.
        let c = classify(json!({ "volume": 12, "title": "report" }));
        assert_eq!(c.structure, DataStructure::Unknown);
    }

    #[test]
    fn test_short_unrelated_keys_stay_unknown() {
        // Single-letter keys appear inside many marker names; that must
        // not count as a marker match.
        let c = classify(json!({ "a": 1.0, "b": 2.0 }));
        assert_eq!(c.structure, DataStructure::Unknown);

        let c = classify(json!({ "x": 1.0, "y": 2.0, "id": 3 }));
        assert_eq!(c.structure, DataStructure::Unknown);
    }

    #[test]
    fn test_root_array_of_quotes() {
        let c = classify(json!([
            { "ticker": "AAPL", "price": 150.0, "change": 1.2, "company_name": "Apple" }
        ]));
        assert_eq!(c.structure, DataStructure::Trending);
        assert!(c.is_array);
        assert!(c.data_path.is_empty());
    }
}
