//! Interchange document export.

use serde::Serialize;

use super::error::CotError;
use super::record::{Bias, CotRecord, Dataset};
use crate::ports::export_port::ExportSink;

/// Fixed filename of the interchange document.
pub const EXPORT_FILENAME: &str = "data.json";

/// A record as written to the interchange document: every field except `id`.
#[derive(Debug, Serialize)]
struct ExportRecord<'a> {
    date: &'a str,
    longs: u64,
    shorts: u64,
    change_long: i64,
    change_short: i64,
    pct_long: f64,
    pct_short: f64,
    net_positions: i64,
    net_change: i64,
    bias: Bias,
    flip: &'a str,
}

impl<'a> From<&'a CotRecord> for ExportRecord<'a> {
    fn from(r: &'a CotRecord) -> Self {
        Self {
            date: &r.date,
            longs: r.longs,
            shorts: r.shorts,
            change_long: r.change_long,
            change_short: r.change_short,
            pct_long: r.pct_long,
            pct_short: r.pct_short,
            net_positions: r.net_positions,
            net_change: r.net_change,
            bias: r.bias,
            flip: &r.flip,
        }
    }
}

#[derive(Debug, Serialize)]
struct ExportPair<'a> {
    pair: &'a str,
    data: Vec<ExportRecord<'a>>,
}

/// Render the dataset as a pretty-printed JSON array of `{pair, data}`.
pub fn to_document(dataset: &Dataset) -> Result<String, CotError> {
    let pairs: Vec<ExportPair<'_>> = dataset
        .pairs()
        .iter()
        .map(|p| ExportPair {
            pair: &p.pair,
            data: p.data.iter().map(ExportRecord::from).collect(),
        })
        .collect();

    serde_json::to_string_pretty(&pairs).map_err(|e| CotError::Export {
        target: EXPORT_FILENAME.into(),
        reason: e.to_string(),
    })
}

/// Render and hand the document to `sink` under [`EXPORT_FILENAME`].
pub fn export_dataset(dataset: &Dataset, sink: &dyn ExportSink) -> Result<String, CotError> {
    let document = to_document(dataset)?;
    let delivered = sink.deliver(EXPORT_FILENAME, &document)?;
    log::info!(
        "exported {} pairs ({} records) to {}",
        dataset.len(),
        dataset.record_count(),
        delivered
    );
    Ok(delivered)
}
