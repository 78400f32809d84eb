//! Positioning record, pair collection and dataset types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Net positioning direction for one observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bias {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

impl Bias {
    /// Positive net is bullish, negative bearish, zero neutral.
    pub fn from_net(net: i64) -> Self {
        match net.cmp(&0) {
            Ordering::Greater => Bias::Bullish,
            Ordering::Less => Bias::Bearish,
            Ordering::Equal => Bias::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Bias::Bullish => "Bullish",
            Bias::Bearish => "Bearish",
            Bias::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Bias {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bullish" => Ok(Bias::Bullish),
            "bearish" => Ok(Bias::Bearish),
            "neutral" => Ok(Bias::Neutral),
            other => Err(format!("unknown bias: {other}")),
        }
    }
}

/// One weekly positioning observation for a pair.
///
/// `id` is a session-local handle for edit/delete targeting and never part of
/// the exported document. The numeric relationships between fields are
/// conventions only; nothing here enforces them.
///
/// Numeric fields decode leniently: documents written by older editors may
/// hold fractional or negative counts, or `null` where a number failed to
/// parse. See [`lenient`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CotRecord {
    #[serde(default)]
    pub id: String,
    pub date: String,
    #[serde(deserialize_with = "lenient::count")]
    pub longs: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub shorts: u64,
    #[serde(deserialize_with = "lenient::signed")]
    pub change_long: i64,
    #[serde(deserialize_with = "lenient::signed")]
    pub change_short: i64,
    #[serde(deserialize_with = "lenient::float")]
    pub pct_long: f64,
    #[serde(deserialize_with = "lenient::float")]
    pub pct_short: f64,
    #[serde(deserialize_with = "lenient::signed")]
    pub net_positions: i64,
    #[serde(deserialize_with = "lenient::signed")]
    pub net_change: i64,
    pub bias: Bias,
    pub flip: String,
}

/// Number coercion for decoded documents, matching the edit form: fractions
/// truncate toward zero, negative counts clamp to zero, `null` becomes zero.
/// Strings and other non-numbers are still rejected.
pub mod lenient {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Unsigned(u64),
        Signed(i64),
        Float(f64),
        Null,
    }

    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        Ok(match Number::deserialize(deserializer)? {
            Number::Unsigned(v) => v,
            Number::Signed(_) | Number::Null => 0,
            // `as` saturates, and maps NaN to zero
            Number::Float(v) => v.trunc() as u64,
        })
    }

    pub fn signed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        Ok(match Number::deserialize(deserializer)? {
            Number::Unsigned(v) => i64::try_from(v).unwrap_or(i64::MAX),
            Number::Signed(v) => v,
            Number::Float(v) => v.trunc() as i64,
            Number::Null => 0,
        })
    }

    pub fn float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(match Number::deserialize(deserializer)? {
            Number::Unsigned(v) => v as f64,
            Number::Signed(v) => v as f64,
            Number::Float(v) if v.is_finite() => v,
            Number::Float(_) | Number::Null => 0.0,
        })
    }
}

impl CotRecord {
    /// Reporting date, if `date` starts with a `YYYY-MM-DD` calendar date.
    pub fn date_key(&self) -> Option<NaiveDate> {
        let head = self.date.trim().get(..10)?;
        NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
    }
}

/// Newest first. Records whose date does not parse sort after all dated ones
/// and keep their relative order.
fn newest_first(a: &CotRecord, b: &CotRecord) -> Ordering {
    match (a.date_key(), b.date_key()) {
        (Some(da), Some(db)) => db.cmp(&da),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// All observations for one currency pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairData {
    pub pair: String,
    #[serde(default)]
    pub data: Vec<CotRecord>,
}

impl PairData {
    pub fn new(pair: impl Into<String>) -> Self {
        Self {
            pair: pair.into(),
            data: Vec::new(),
        }
    }

    pub fn record(&self, id: &str) -> Option<&CotRecord> {
        self.data.iter().find(|r| r.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.data.iter().any(|r| r.id == id)
    }

    /// Stable sort, date descending.
    pub fn sort_by_date_desc(&mut self) {
        self.data.sort_by(newest_first);
    }
}

/// The full in-memory dataset. Pair order is display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    pairs: Vec<PairData>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pairs(&self) -> &[PairData] {
        &self.pairs
    }

    pub fn pair(&self, pair: &str) -> Option<&PairData> {
        self.pairs.iter().find(|p| p.pair == pair)
    }

    pub(crate) fn pair_mut(&mut self, pair: &str) -> Option<&mut PairData> {
        self.pairs.iter_mut().find(|p| p.pair == pair)
    }

    pub fn contains_pair(&self, pair: &str) -> bool {
        self.pair(pair).is_some()
    }

    pub fn pair_names(&self) -> Vec<&str> {
        self.pairs.iter().map(|p| p.pair.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.pairs.iter().map(|p| p.data.len()).sum()
    }

    pub(crate) fn push(&mut self, pair: PairData) {
        self.pairs.push(pair);
    }
}

impl From<Vec<PairData>> for Dataset {
    fn from(pairs: Vec<PairData>) -> Self {
        Self { pairs }
    }
}

impl IntoIterator for Dataset {
    type Item = PairData;
    type IntoIter = std::vec::IntoIter<PairData>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}
