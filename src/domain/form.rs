//! Edit-form boundary: untyped text in, strictly typed record out.
//!
//! Numeric inputs that do not parse become `0` so a form can always be
//! submitted.

use serde::{Deserialize, Serialize};

use super::calculator;
use super::record::{Bias, CotRecord};

/// Field names accepted by [`RecordForm::set_field`].
pub const FORM_FIELDS: [&str; 12] = [
    "id",
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

/// Raw form contents for one record. Every field is text as typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordForm {
    pub id: String,
    pub date: String,
    pub longs: String,
    pub shorts: String,
    pub change_long: String,
    pub change_short: String,
    pub pct_long: String,
    pub pct_short: String,
    pub net_positions: String,
    pub net_change: String,
    pub bias: String,
    pub flip: String,
}

pub fn parse_f64_or_zero(input: &str) -> f64 {
    match input.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Integers parse directly; decimals are truncated toward zero.
pub fn parse_i64_or_zero(input: &str) -> i64 {
    let trimmed = input.trim();
    trimmed
        .parse::<i64>()
        .unwrap_or_else(|_| parse_f64_or_zero(trimmed).trunc() as i64)
}

/// Like [`parse_i64_or_zero`], with negatives clamped to zero.
pub fn parse_u64_or_zero(input: &str) -> u64 {
    let trimmed = input.trim();
    trimmed
        .parse::<u64>()
        .unwrap_or_else(|_| parse_i64_or_zero(trimmed).max(0) as u64)
}

impl RecordForm {
    /// Empty form for a new record, dated `today`.
    pub fn blank(today: &str) -> Self {
        Self {
            date: today.to_string(),
            bias: Bias::Neutral.to_string(),
            ..Default::default()
        }
    }

    /// Set one field by name. Unknown names are an error.
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<(), String> {
        let slot = match name {
            "id" => &mut self.id,
            "date" => &mut self.date,
            "longs" => &mut self.longs,
            "shorts" => &mut self.shorts,
            "change_long" => &mut self.change_long,
            "change_short" => &mut self.change_short,
            "pct_long" => &mut self.pct_long,
            "pct_short" => &mut self.pct_short,
            "net_positions" => &mut self.net_positions,
            "net_change" => &mut self.net_change,
            "bias" => &mut self.bias,
            "flip" => &mut self.flip,
            other => return Err(format!("unknown field: {other}")),
        };
        *slot = value.to_string();
        Ok(())
    }

    /// Convert to a typed record. Unknown bias text falls back to neutral.
    pub fn to_record(&self) -> CotRecord {
        CotRecord {
            id: self.id.trim().to_string(),
            date: self.date.trim().to_string(),
            longs: parse_u64_or_zero(&self.longs),
            shorts: parse_u64_or_zero(&self.shorts),
            change_long: parse_i64_or_zero(&self.change_long),
            change_short: parse_i64_or_zero(&self.change_short),
            pct_long: parse_f64_or_zero(&self.pct_long),
            pct_short: parse_f64_or_zero(&self.pct_short),
            net_positions: parse_i64_or_zero(&self.net_positions),
            net_change: parse_i64_or_zero(&self.net_change),
            bias: self.bias.parse().unwrap_or_default(),
            flip: self.flip.clone(),
        }
    }

    /// Run the calculator on the form's longs/shorts and write the suggested
    /// derived fields back into the form.
    pub fn auto_calculate(&mut self) {
        let mut record = self.to_record();
        calculator::recalculate(&mut record);
        self.pct_long = record.pct_long.to_string();
        self.pct_short = record.pct_short.to_string();
        self.net_positions = record.net_positions.to_string();
        self.bias = record.bias.to_string();
    }
}

impl From<&CotRecord> for RecordForm {
    fn from(r: &CotRecord) -> Self {
        Self {
            id: r.id.clone(),
            date: r.date.clone(),
            longs: r.longs.to_string(),
            shorts: r.shorts.to_string(),
            change_long: r.change_long.to_string(),
            change_short: r.change_short.to_string(),
            pct_long: r.pct_long.to_string(),
            pct_short: r.pct_short.to_string(),
            net_positions: r.net_positions.to_string(),
            net_change: r.net_change.to_string(),
            bias: r.bias.to_string(),
            flip: r.flip.clone(),
        }
    }
}
