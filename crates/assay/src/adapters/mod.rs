//! Provider adapters: shape-sniffing fast paths for well-known API
//! families.
//!
//! Each adapter inspects the raw payload for a provider-specific
//! signature and, when it matches, materializes the dataset directly,
//! bypassing schema inference and rule matching. Adapters never fail:
//! a payload that does not match the signature simply yields `None`
//! and the generic pipeline takes over.

mod date_keyed;
mod ohlcv;
mod tuple_series;

use serde_json::Value;

use crate::transform::{FinancialDataset, TransformationMetadata};

pub use date_keyed::DateKeyedAdapter;
pub use ohlcv::OhlcvArrayAdapter;
pub use tuple_series::TupleSeriesAdapter;

/// A recognizer for one provider payload family.
pub trait ProviderAdapter {
    /// Stable adapter name, recorded in transformation warnings and logs.
    fn name(&self) -> &'static str;

    /// Try to transform the payload. `None` means the payload does not
    /// carry this adapter's signature.
    fn try_transform(
        &self,
        raw: &Value,
        source: &str,
    ) -> Option<(FinancialDataset, TransformationMetadata)>;
}

/// Run the built-in adapters in registration order and return the first
/// match.
pub fn run_builtin_adapters(
    raw: &Value,
    source: &str,
) -> Option<(FinancialDataset, TransformationMetadata)> {
    let adapters: [&dyn ProviderAdapter; 3] = [
        &OhlcvArrayAdapter,
        &DateKeyedAdapter,
        &TupleSeriesAdapter,
    ];

    for adapter in adapters {
        if let Some(result) = adapter.try_transform(raw, source) {
            tracing::debug!(adapter = adapter.name(), "adapter matched payload");
            return Some(result);
        }
    }
    None
}
