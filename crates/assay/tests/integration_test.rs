//! Integration tests for the Assay pipeline.
//!
//! Each test feeds a realistic provider payload through the public entry
//! point and checks the normalized dataset end to end.

use serde_json::{json, Value};

use assay::{Assay, AssayConfig, DataStructure};

fn inference_only() -> Assay {
    let config = AssayConfig {
        use_adapters: false,
        ..AssayConfig::default()
    };
    Assay::with_config(config).expect("valid config")
}

fn alpha_vantage_payload() -> Value {
    json!({
        "Meta Data": {
            "1. Information": "Daily Prices (open, high, low, close) and Volumes",
            "2. Symbol": "IBM",
            "3. Last Refreshed": "2024-01-03",
            "5. Time Zone": "US/Eastern"
        },
        "Time Series (Daily)": {
            "2024-01-02": {
                "1. open": "150.0000", "2. high": "152.0000",
                "3. low": "149.0000", "4. close": "151.0000", "5. volume": "1000000"
            },
            "2024-01-03": {
                "1. open": "151.0000", "2. high": "153.0000",
                "3. low": "150.0000", "4. close": "152.5000", "5. volume": "900000"
            }
        }
    })
}

// =============================================================================
// Time Series
// =============================================================================

#[test]
fn test_date_keyed_series_via_inference() {
    let outcome = inference_only().transform(&alpha_vantage_payload(), "alphavantage");

    assert!(outcome.success);
    assert!(outcome.use_transformed_data);
    assert_eq!(outcome.data.data_type, DataStructure::TimeSeries);
    assert_eq!(outcome.data.total_records, 2);
    assert_eq!(outcome.data.title, "IBM (alphavantage)");

    let row = &outcome.data.rows[0];
    assert_eq!(row["date"], json!("2024-01-02"));
    assert_eq!(row["open"], json!(150.0));
    assert_eq!(row["close"], json!(151.0));
    assert_eq!(row["volume"], json!(1000000.0));

    assert_eq!(
        outcome.metadata.field_mappings["open"],
        "1. open".to_string()
    );
    assert_eq!(outcome.metadata.records_succeeded, 2);
    assert_eq!(outcome.metadata.records_failed, 0);
}

#[test]
fn test_date_keyed_series_via_adapter() {
    let outcome = Assay::new().transform(&alpha_vantage_payload(), "alphavantage");

    assert!(outcome.success);
    assert_eq!(outcome.data.total_records, 2);
    assert_eq!(outcome.data.title, "IBM (alphavantage)");
    assert_eq!(outcome.data.rows[1]["close"], json!(152.5));
}

#[test]
fn test_candle_arrays_one_row_per_index() {
    let payload = json!({
        "c": [151.0, 152.5, 153.0],
        "h": [152.0, 153.0, 154.0],
        "l": [149.0, 150.0, 151.0],
        "o": [150.0, 151.0, 152.0],
        "s": "ok",
        "t": [1704153600, 1704240000, 1704326400],
        "v": [1000000, 900000, 1100000]
    });

    let outcome = Assay::new().transform(&payload, "finnhub");

    assert!(outcome.success);
    assert_eq!(outcome.data.data_type, DataStructure::TimeSeries);
    assert_eq!(outcome.data.total_records, 3);
    assert_eq!(outcome.data.rows[0]["date"], json!("2024-01-02"));
    assert_eq!(outcome.data.rows[2]["close"], json!(153.0));
    assert_eq!(outcome.data.rows[2]["volume"], json!(1100000));
}

#[test]
fn test_root_array_of_candles() {
    let payload = json!([
        { "date": "2024-01-02", "open": 150.0, "high": 152.0, "low": 149.0, "close": 151.0, "volume": 1000000 },
        { "date": "2024-01-03", "open": 151.0, "high": 153.0, "low": 150.0, "close": 152.5, "volume": 900000 }
    ]);

    let outcome = inference_only().transform(&payload, "generic");

    assert!(outcome.success);
    assert_eq!(outcome.data.data_type, DataStructure::TimeSeries);
    assert_eq!(outcome.data.total_records, 2);
    assert_eq!(outcome.data.rows[0]["date"], json!("2024-01-02"));
    assert_eq!(outcome.data.rows[1]["close"], json!(152.5));
}

#[test]
fn test_tuple_datasets_pivot_to_rows() {
    let payload = json!({
        "datasets": [
            { "metric": "Revenue", "values": [["2022-12-31", 394.3], ["2023-12-31", 383.3]] },
            { "metric": "Net Income", "values": [["2022-12-31", 99.8]] }
        ]
    });

    let outcome = Assay::new().transform(&payload, "fundamentals");

    assert!(outcome.success);
    assert_eq!(outcome.data.total_records, 3);
    assert_eq!(outcome.data.rows[0]["metric"], json!("Revenue"));
    assert_eq!(outcome.data.rows[0]["date"], json!("2022-12-31"));
    assert_eq!(outcome.data.rows[2]["metric"], json!("Net Income"));
    assert_eq!(outcome.data.rows[2]["value"], json!(99.8));
}

// =============================================================================
// Trending
// =============================================================================

#[test]
fn test_trending_wrapper_combines_sibling_lists() {
    let payload = json!({
        "trending_stocks": {
            "top_gainers": [
                { "ticker": "AAPL", "company_name": "Apple Inc.", "price": "150.00", "change": "3.50", "percent_change": "2.44", "volume": "52000000" },
                { "ticker": "NVDA", "company_name": "NVIDIA Corp.", "price": "495.00", "change": "12.00", "percent_change": "2.48", "volume": "41000000" }
            ],
            "top_losers": [
                { "ticker": "XYZ", "company_name": "Xyz Corp.", "price": "10.00", "change": "-0.55", "percent_change": "-5.21", "volume": "900000" }
            ]
        }
    });

    let outcome = Assay::new().transform(&payload, "nse");

    assert!(outcome.success);
    assert_eq!(outcome.data.data_type, DataStructure::Trending);
    // Gainers and losers combine into one dataset.
    assert_eq!(outcome.data.total_records, 3);
    assert_eq!(outcome.data.rows[0]["symbol"], json!("AAPL"));
    assert_eq!(outcome.data.rows[2]["symbol"], json!("XYZ"));
    // Numeric strings become numbers.
    assert_eq!(outcome.data.rows[0]["price"], json!(150.0));
}

#[test]
fn test_trending_direct_array() {
    let payload = json!({
        "gainers": [
            { "ticker": "AAPL", "company_name": "Apple", "price": 150.0, "change": 3.5, "changesPercentage": 2.44 }
        ]
    });

    let outcome = Assay::new().transform(&payload, "fmp");

    assert!(outcome.success);
    assert_eq!(outcome.data.data_type, DataStructure::Trending);
    assert_eq!(outcome.data.total_records, 1);
    assert_eq!(outcome.data.rows[0]["changePercent"], json!(2.44));
    // The letter t inside other field names must not produce a
    // timestamp column.
    assert!(!outcome.data.rows[0].contains_key("timestamp"));
    assert!(outcome.data.columns.iter().all(|c| c.key != "timestamp"));
}

// =============================================================================
// Quote
// =============================================================================

#[test]
fn test_quote_single_row() {
    let payload = json!({
        "symbol": "AAPL",
        "name": "Apple Inc.",
        "price": 150.25,
        "bid": 150.20,
        "ask": 150.30,
        "change": 1.25,
        "changesPercentage": 0.84,
        "yearHigh": 199.62,
        "yearLow": 124.17,
        "volume": 52000000
    });

    let outcome = Assay::new().transform(&payload, "fmp");

    assert!(outcome.success);
    assert_eq!(outcome.data.data_type, DataStructure::Quote);
    assert_eq!(outcome.data.total_records, 1);

    let row = &outcome.data.rows[0];
    assert_eq!(row["symbol"], json!("AAPL"));
    assert_eq!(row["price"], json!(150.25));
    assert_eq!(row["changePercent"], json!(0.84));
    assert_eq!(row["yearHigh"], json!(199.62));
    assert_eq!(outcome.data.title, "AAPL (fmp)");
}

#[test]
fn test_quote_unmapped_fields_absent() {
    let payload = json!({
        "price": 10.0,
        "bid": 9.9,
        "ask": 10.1
    });

    let outcome = Assay::new().transform(&payload, "src");

    assert!(outcome.success);
    let row = &outcome.data.rows[0];
    assert!(!row.contains_key("yearHigh"));
    assert!(!row.contains_key("symbol"));
    assert!(outcome.data.columns.iter().all(|c| c.key != "yearHigh"));
}

#[test]
fn test_null_values_dropped_from_rows() {
    let payload = json!({
        "symbol": "AAPL",
        "price": 150.25,
        "bid": null,
        "ask": 150.30
    });

    let outcome = Assay::new().transform(&payload, "src");

    assert!(outcome.success);
    assert!(!outcome.data.rows[0].contains_key("bid"));
}

// =============================================================================
// Failure Envelope
// =============================================================================

#[test]
fn test_empty_object_fails_without_panic() {
    let outcome = Assay::new().transform(&json!({}), "src");
    assert!(!outcome.success);
    assert!(!outcome.use_transformed_data);
    assert!(outcome.error.is_some());
    assert!(outcome.data.rows.is_empty());
}

#[test]
fn test_empty_array_fails_without_panic() {
    let outcome = Assay::new().transform(&json!([]), "src");
    assert!(!outcome.success);
}

#[test]
fn test_scalar_root_fails_without_panic() {
    for payload in [json!(42), json!("text"), json!(null), json!(true)] {
        let outcome = Assay::new().transform(&payload, "src");
        assert!(!outcome.success, "scalar {:?} must not succeed", payload);
    }
}

#[test]
fn test_short_keys_do_not_fabricate_a_quote() {
    // Single-letter keys sit inside many quote marker names; the
    // payload must fail classification instead of yielding invented
    // rows.
    let outcome = Assay::new().transform(&json!({ "a": 1.0, "b": 2.0 }), "src");

    assert!(!outcome.success);
    assert!(!outcome.use_transformed_data);
    assert!(outcome.data.rows.is_empty());
    assert!(outcome.error.is_some());
}

#[test]
fn test_unrecognized_object_fails_without_panic() {
    let payload = json!({
        "foo": "bar",
        "nested": { "a": 1, "b": [1, 2, 3] }
    });
    let outcome = Assay::new().transform(&payload, "src");
    assert!(!outcome.success);
    assert!(outcome.error.is_some());
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_key_order_does_not_change_mapping() {
    // serde_json sorts object keys on parse, so two spellings of the
    // same payload must map identically.
    let a: Value = serde_json::from_str(
        r#"{"price": 10.0, "bid": 9.9, "ask": 10.1, "symbol": "T"}"#,
    )
    .expect("valid json");
    let b: Value = serde_json::from_str(
        r#"{"symbol": "T", "ask": 10.1, "bid": 9.9, "price": 10.0}"#,
    )
    .expect("valid json");

    let engine = Assay::new();
    let outcome_a = engine.transform(&a, "src");
    let outcome_b = engine.transform(&b, "src");

    assert_eq!(outcome_a.data, outcome_b.data);
    assert_eq!(
        outcome_a.metadata.field_mappings,
        outcome_b.metadata.field_mappings
    );
}

#[test]
fn test_dataset_id_stable_across_runs() {
    let payload = alpha_vantage_payload();
    let engine = Assay::new();

    let first = engine.transform(&payload, "alphavantage");
    let second = engine.transform(&payload, "alphavantage");

    assert_eq!(first.data.id, second.data.id);
    assert_eq!(first.data.id.len(), 12);
}
