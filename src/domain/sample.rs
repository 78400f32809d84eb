//! Built-in dataset used whenever the external document cannot be loaded.

use super::record::{Bias, CotRecord, Dataset, PairData};

/// Pairs present in the built-in dataset, in display order.
pub const SAMPLE_PAIRS: [&str; 10] = [
    "EURUSD", "GBPUSD", "USDJPY", "USDCHF", "AUDUSD", "NZDUSD", "USDCAD", "GBPJPY", "EURJPY",
    "EURGBP",
];

#[allow(clippy::too_many_arguments)]
fn record(
    id: &str,
    date: &str,
    longs: u64,
    shorts: u64,
    change_long: i64,
    change_short: i64,
    pct_long: f64,
    pct_short: f64,
    net_positions: i64,
    net_change: i64,
) -> CotRecord {
    CotRecord {
        id: id.to_string(),
        date: date.to_string(),
        longs,
        shorts,
        change_long,
        change_short,
        pct_long,
        pct_short,
        net_positions,
        net_change,
        bias: Bias::Bullish,
        flip: "0%".to_string(),
    }
}

/// EURUSD and GBPUSD carry sample weeks; the other eight pairs are empty.
pub fn initial_dataset() -> Dataset {
    let mut pairs: Vec<PairData> = SAMPLE_PAIRS.iter().map(|p| PairData::new(*p)).collect();

    pairs[0].data = vec![
        record("1", "2025-01-14", 210_450, 115_300, 5_400, -2_100, 64.6, 35.4, 95_150, 7_500),
        record("2", "2025-01-07", 205_050, 117_400, -1_200, 4_500, 63.6, 36.4, 87_650, -5_700),
    ];
    pairs[1].data = vec![record(
        "3", "2025-01-14", 85_400, 45_200, 1_200, 800, 65.4, 34.6, 40_200, 400,
    )];

    Dataset::from(pairs)
}
