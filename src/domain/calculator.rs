//! Derived-field calculator.
//!
//! Advisory helper: given longs and shorts it suggests percentages, net
//! position and bias. Nothing calls it implicitly on save.

use serde::Serialize;
use std::cmp::Ordering;

use super::record::{Bias, CotRecord};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedFields {
    pub pct_long: f64,
    pub pct_short: f64,
    pub net_positions: i64,
    pub bias: Bias,
}

impl DerivedFields {
    /// Overwrite the derived fields of a record being edited.
    pub fn apply_to(&self, record: &mut CotRecord) {
        record.pct_long = self.pct_long;
        record.pct_short = self.pct_short;
        record.net_positions = self.net_positions;
        record.bias = self.bias;
    }
}

/// Round half away from zero to one decimal place.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Both percentages are rounded independently, so they need not sum to
/// exactly 100.0. A zero total yields 0.0 for both.
pub fn calculate(longs: u64, shorts: u64) -> DerivedFields {
    let total = longs as f64 + shorts as f64;
    let (pct_long, pct_short) = if total > 0.0 {
        (
            round1(longs as f64 / total * 100.0),
            round1(shorts as f64 / total * 100.0),
        )
    } else {
        (0.0, 0.0)
    };
    let net = longs as i128 - shorts as i128;
    let bias = match net.cmp(&0) {
        Ordering::Greater => Bias::Bullish,
        Ordering::Less => Bias::Bearish,
        Ordering::Equal => Bias::Neutral,
    };

    DerivedFields {
        pct_long,
        pct_short,
        net_positions: saturate_i64(net),
        bias,
    }
}

/// Counts are `u64`, so the difference can leave the `i64` range.
fn saturate_i64(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value > 0 { i64::MAX } else { i64::MIN })
}

/// Recompute a record's derived fields from its own longs and shorts.
pub fn recalculate(record: &mut CotRecord) {
    calculate(record.longs, record.shorts).apply_to(record);
}
