//! Flat CSV table export for spreadsheets.
//!
//! One row per record across all pairs, `pair` first, no `id` column. This is
//! a convenience view and not the interchange format.

use crate::domain::error::CotError;
use crate::domain::record::Dataset;
use std::io::Write;

pub const CSV_FILENAME: &str = "data.csv";

const HEADER: [&str; 12] = [
    "pair",
    "date",
    "longs",
    "shorts",
    "change_long",
    "change_short",
    "pct_long",
    "pct_short",
    "net_positions",
    "net_change",
    "bias",
    "flip",
];

pub fn write_records_csv<W: Write>(dataset: &Dataset, writer: W) -> Result<(), CotError> {
    let csv_err = |e: csv::Error| CotError::Export {
        target: CSV_FILENAME.into(),
        reason: format!("CSV write error: {}", e),
    };

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER).map_err(csv_err)?;

    for pair in dataset.pairs() {
        for r in &pair.data {
            wtr.write_record([
                pair.pair.clone(),
                r.date.clone(),
                r.longs.to_string(),
                r.shorts.to_string(),
                r.change_long.to_string(),
                r.change_short.to_string(),
                r.pct_long.to_string(),
                r.pct_short.to_string(),
                r.net_positions.to_string(),
                r.net_change.to_string(),
                r.bias.to_string(),
                r.flip.clone(),
            ])
            .map_err(csv_err)?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// CSV table as a string.
pub fn to_csv_string(dataset: &Dataset) -> Result<String, CotError> {
    let mut buf = Vec::new();
    write_records_csv(dataset, &mut buf)?;
    String::from_utf8(buf).map_err(|e| CotError::Export {
        target: CSV_FILENAME.into(),
        reason: e.to_string(),
    })
}
