//! Pattern-matching rule tables for canonical field mapping.
//!
//! Rules are data, not code: supporting a new provider's field names means
//! adding patterns here, never touching the mapper. Patterns are
//! case-insensitive substrings matched in both directions against source
//! field names; `required_types` filters candidates by detected type, and
//! higher `priority` wins when several rules target the same canonical
//! field.

use once_cell::sync::Lazy;

use crate::schema::FieldType;

/// One pattern-based instruction for matching a canonical field to an
/// unknown source field name.
#[derive(Debug, Clone, Copy)]
pub struct FieldMappingRule {
    /// Canonical name the match is recorded under.
    pub target_field: &'static str,
    /// Case-insensitive substrings to match against source field names.
    pub source_patterns: &'static [&'static str],
    /// When set, the candidate's detected type must be a member.
    pub required_types: Option<&'static [FieldType]>,
    /// Higher wins ties between rules for the same target.
    pub priority: u8,
}

const STRING_ONLY: &[FieldType] = &[FieldType::String];
const PRICE_TYPES: &[FieldType] = &[FieldType::Number, FieldType::Currency];
const CHANGE_TYPES: &[FieldType] = &[FieldType::Number, FieldType::Percentage];

/// Entity identity: who or what the record is about.
pub const ENTITY_RULES: &[FieldMappingRule] = &[
    FieldMappingRule {
        target_field: "symbol",
        source_patterns: &["symbol", "ticker", "tradingsymbol", "scrip"],
        required_types: Some(STRING_ONLY),
        priority: 10,
    },
    FieldMappingRule {
        target_field: "name",
        source_patterns: &["company_name", "company", "name", "description"],
        required_types: Some(STRING_ONLY),
        priority: 8,
    },
    FieldMappingRule {
        target_field: "isin",
        source_patterns: &["isin"],
        required_types: Some(STRING_ONLY),
        priority: 9,
    },
    FieldMappingRule {
        target_field: "exchange",
        source_patterns: &["exchange", "exch", "market"],
        required_types: Some(STRING_ONLY),
        priority: 6,
    },
    FieldMappingRule {
        target_field: "sector",
        source_patterns: &["sector"],
        required_types: Some(STRING_ONLY),
        priority: 5,
    },
    FieldMappingRule {
        target_field: "industry",
        source_patterns: &["industry"],
        required_types: Some(STRING_ONLY),
        priority: 5,
    },
    FieldMappingRule {
        target_field: "currency",
        source_patterns: &["currency"],
        required_types: Some(&[FieldType::String, FieldType::Currency]),
        priority: 5,
    },
];

/// OHLCV price fields for time-series bars.
pub const PRICE_RULES: &[FieldMappingRule] = &[
    FieldMappingRule {
        target_field: "open",
        source_patterns: &["open"],
        required_types: Some(PRICE_TYPES),
        priority: 10,
    },
    FieldMappingRule {
        target_field: "high",
        source_patterns: &["high"],
        required_types: Some(PRICE_TYPES),
        priority: 10,
    },
    FieldMappingRule {
        target_field: "low",
        source_patterns: &["low"],
        required_types: Some(PRICE_TYPES),
        priority: 10,
    },
    FieldMappingRule {
        target_field: "close",
        source_patterns: &["close", "last", "ltp"],
        required_types: Some(PRICE_TYPES),
        priority: 10,
    },
    FieldMappingRule {
        target_field: "volume",
        source_patterns: &["volume", "vol", "qty", "quantity"],
        required_types: Some(&[FieldType::Number]),
        priority: 9,
    },
    FieldMappingRule {
        target_field: "prevClose",
        source_patterns: &["prev_close", "previous_close", "prevclose"],
        required_types: Some(PRICE_TYPES),
        priority: 8,
    },
];

/// Quote-specific fields layered on top of the price rules.
const QUOTE_EXTRA_RULES: &[FieldMappingRule] = &[
    FieldMappingRule {
        target_field: "price",
        source_patterns: &["price", "last_price", "lastprice", "ltp", "current_price"],
        required_types: Some(PRICE_TYPES),
        priority: 10,
    },
    FieldMappingRule {
        target_field: "bid",
        source_patterns: &["bid"],
        required_types: Some(PRICE_TYPES),
        priority: 9,
    },
    FieldMappingRule {
        target_field: "ask",
        source_patterns: &["ask", "offer"],
        required_types: Some(PRICE_TYPES),
        priority: 9,
    },
    FieldMappingRule {
        target_field: "changePercent",
        source_patterns: &[
            "percent_change",
            "change_percent",
            "changepercent",
            "changespercentage",
            "pchange",
            "percentchange",
        ],
        required_types: Some(CHANGE_TYPES),
        priority: 10,
    },
    FieldMappingRule {
        target_field: "change",
        source_patterns: &["change", "chg"],
        required_types: Some(CHANGE_TYPES),
        priority: 9,
    },
    FieldMappingRule {
        target_field: "yearHigh",
        source_patterns: &["52_week_high", "52w_high", "year_high", "yearhigh", "high_52"],
        required_types: Some(PRICE_TYPES),
        priority: 8,
    },
    FieldMappingRule {
        target_field: "yearLow",
        source_patterns: &["52_week_low", "52w_low", "year_low", "yearlow", "low_52"],
        required_types: Some(PRICE_TYPES),
        priority: 8,
    },
    FieldMappingRule {
        target_field: "upperCircuit",
        source_patterns: &["upper_circuit", "uppercircuit", "upper_limit"],
        required_types: Some(PRICE_TYPES),
        priority: 7,
    },
    FieldMappingRule {
        target_field: "lowerCircuit",
        source_patterns: &["lower_circuit", "lowercircuit", "lower_limit"],
        required_types: Some(PRICE_TYPES),
        priority: 7,
    },
];

/// The quote set is a superset: every price rule plus the quote-specific
/// ones, so trending rows and single quotes share one vocabulary.
pub static QUOTE_RULES: Lazy<Vec<FieldMappingRule>> = Lazy::new(|| {
    PRICE_RULES
        .iter()
        .chain(QUOTE_EXTRA_RULES.iter())
        .copied()
        .collect()
});

/// Temporal fields.
pub const TIME_RULES: &[FieldMappingRule] = &[
    FieldMappingRule {
        target_field: "date",
        source_patterns: &["date", "day"],
        required_types: Some(&[FieldType::Date, FieldType::DateTime, FieldType::String]),
        priority: 9,
    },
    FieldMappingRule {
        target_field: "timestamp",
        source_patterns: &["timestamp", "epoch", "unix", "t"],
        required_types: Some(&[
            FieldType::Timestamp,
            FieldType::Number,
            FieldType::DateTime,
        ]),
        priority: 9,
    },
    FieldMappingRule {
        target_field: "time",
        source_patterns: &["time", "datetime"],
        required_types: Some(&[
            FieldType::DateTime,
            FieldType::Timestamp,
            FieldType::String,
            FieldType::Number,
        ]),
        priority: 8,
    },
];

/// Descriptors commonly found in metadata sections.
pub const META_RULES: &[FieldMappingRule] = &[
    FieldMappingRule {
        target_field: "symbol",
        source_patterns: &["symbol", "ticker"],
        required_types: Some(STRING_ONLY),
        priority: 8,
    },
    FieldMappingRule {
        target_field: "timezone",
        source_patterns: &["time zone", "timezone", "tz"],
        required_types: Some(STRING_ONLY),
        priority: 7,
    },
    FieldMappingRule {
        target_field: "interval",
        source_patterns: &["interval"],
        required_types: Some(STRING_ONLY),
        priority: 6,
    },
    FieldMappingRule {
        target_field: "lastRefreshed",
        source_patterns: &["last refreshed", "last_refreshed", "refreshed", "updated"],
        required_types: Some(&[FieldType::String, FieldType::Date, FieldType::DateTime]),
        priority: 7,
    },
    FieldMappingRule {
        target_field: "information",
        source_patterns: &["information", "title"],
        required_types: Some(STRING_ONLY),
        priority: 5,
    },
];
