//! One-shot dataset loader with built-in fallback.

use std::collections::HashSet;

use super::error::CotError;
use super::record::{Dataset, PairData};
use super::sample;
use crate::ports::dataset_port::DatasetSource;

/// Identifier given to a record that arrives without one. Derived only from
/// the document, so reloading the same document yields the same ids.
pub fn synthesized_id(pair: &str, date: &str, index: usize) -> String {
    format!("{pair}-{date}-{index}")
}

/// Fetch and decode the startup document. Never fails: any problem is logged
/// and the built-in dataset is returned instead.
pub fn load_dataset(source: &dyn DatasetSource) -> Dataset {
    match try_load(source) {
        Ok(dataset) => {
            log::info!(
                "loaded {} pairs ({} records) from {}",
                dataset.len(),
                dataset.record_count(),
                source.location()
            );
            dataset
        }
        Err(e) => {
            log::warn!("{e}; using built-in default data");
            sample::initial_dataset()
        }
    }
}

/// Fetch and decode without the fallback.
pub fn try_load(source: &dyn DatasetSource) -> Result<Dataset, CotError> {
    let body = source.fetch()?;
    parse_document(&body).map_err(|reason| CotError::Load {
        location: source.location(),
        reason,
    })
}

/// Decode an interchange document. The whole document is rejected on the
/// first problem; there is no partial acceptance.
pub fn parse_document(body: &str) -> Result<Dataset, String> {
    let pairs: Vec<PairData> = serde_json::from_str(body).map_err(|e| e.to_string())?;

    let mut seen_pairs = HashSet::new();
    let mut dataset = Dataset::new();

    for mut pair in pairs {
        if !seen_pairs.insert(pair.pair.clone()) {
            return Err(format!("duplicate pair {}", pair.pair));
        }

        let mut seen_ids = HashSet::new();
        for (idx, record) in pair.data.iter_mut().enumerate() {
            if record.id.is_empty() {
                record.id = synthesized_id(&pair.pair, &record.date, idx);
            }
            if !seen_ids.insert(record.id.clone()) {
                return Err(format!("duplicate record id {} in {}", record.id, pair.pair));
            }
        }

        dataset.push(pair);
    }

    Ok(dataset)
}
