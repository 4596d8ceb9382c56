//! Field type detection for single JSON values.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::types::FieldType;

// Pattern tables compiled once on first use. The currency/percentage/date
// checks must run before the generic numeric-string check: "$100.50" and
// "10.5%" both parse as floats once their decoration is stripped.

static CURRENCY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$[\d,]+\.?\d*$").unwrap());

static PERCENTAGE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?\d+(\.\d+)?\s*%|(?i)\bpercent\b").unwrap());

static DATE_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap(), "%Y-%m-%d"),
        (Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").unwrap(), "%m/%d/%Y"),
        (Regex::new(r"^\d{4}/\d{2}/\d{2}$").unwrap(), "%Y/%m/%d"),
    ]
});

static DATETIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}(:\d{2}(\.\d+)?)?(Z|[+-]\d{2}:?\d{2})?$")
        .unwrap()
});

/// Classify a single JSON value's semantic type.
///
/// Total function: any `serde_json::Value` yields exactly one [`FieldType`].
pub fn detect_field_type(value: &Value) -> FieldType {
    match value {
        Value::Null => FieldType::Null,
        Value::Array(_) => FieldType::Array,
        Value::Object(_) => FieldType::Object,
        Value::Bool(_) => FieldType::Boolean,
        Value::Number(_) => FieldType::Number,
        Value::String(s) => detect_string_type(s),
    }
}

/// Classify a string's semantic type, applying the format checks in
/// precedence order before falling back to numeric-string detection.
pub fn detect_string_type(s: &str) -> FieldType {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return FieldType::String;
    }

    if CURRENCY_PATTERN.is_match(trimmed) {
        return FieldType::Currency;
    }

    if PERCENTAGE_PATTERN.is_match(trimmed) {
        return FieldType::Percentage;
    }

    if is_date_string(trimmed) {
        return FieldType::Date;
    }

    if DATETIME_PATTERN.is_match(trimmed) {
        return FieldType::DateTime;
    }

    if is_epoch_string(trimmed) {
        return FieldType::Timestamp;
    }

    if is_numeric_string(trimmed) {
        return FieldType::Number;
    }

    FieldType::String
}

/// Strict date check: the string must match a known layout *and* denote a
/// real calendar date, so "2024-13-45" stays a plain string.
fn is_date_string(s: &str) -> bool {
    DATE_PATTERNS
        .iter()
        .any(|(pattern, layout)| {
            pattern.is_match(s) && NaiveDate::parse_from_str(s, layout).is_ok()
        })
}

/// All-digit strings of exactly 10 or 13 characters are treated as epoch
/// seconds or milliseconds respectively.
fn is_epoch_string(s: &str) -> bool {
    (s.len() == 10 || s.len() == 13) && s.bytes().all(|b| b.is_ascii_digit())
}

/// Numeric after stripping thousands separators.
fn is_numeric_string(s: &str) -> bool {
    let stripped = s.replace(',', "");
    !stripped.is_empty() && stripped.parse::<f64>().is_ok()
}
