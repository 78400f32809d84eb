#![allow(dead_code)]

use cotdesk::domain::error::CotError;
pub use cotdesk::domain::record::{Bias, CotRecord, Dataset, PairData};
use cotdesk::ports::dataset_port::DatasetSource;
use cotdesk::ports::export_port::ExportSink;
use std::cell::RefCell;

/// Source returning a fixed body, or failing like an unreachable location.
pub struct MockSource {
    pub body: Option<String>,
}

impl MockSource {
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
        }
    }

    pub fn unreachable() -> Self {
        Self { body: None }
    }
}

impl DatasetSource for MockSource {
    fn location(&self) -> String {
        "mock://data.json".to_string()
    }

    fn fetch(&self) -> Result<String, CotError> {
        self.body.clone().ok_or_else(|| CotError::Load {
            location: self.location(),
            reason: "connection refused".into(),
        })
    }
}

/// Sink that keeps every delivered document in memory.
#[derive(Default)]
pub struct MemorySink {
    pub delivered: RefCell<Vec<(String, String)>>,
}

impl MemorySink {
    pub fn last(&self) -> Option<(String, String)> {
        self.delivered.borrow().last().cloned()
    }
}

impl ExportSink for MemorySink {
    fn deliver(&self, filename: &str, contents: &str) -> Result<String, CotError> {
        self.delivered
            .borrow_mut()
            .push((filename.to_string(), contents.to_string()));
        Ok(format!("memory://{filename}"))
    }
}

pub fn make_record(date: &str, longs: u64, shorts: u64) -> CotRecord {
    CotRecord {
        id: String::new(),
        date: date.to_string(),
        longs,
        shorts,
        change_long: 0,
        change_short: 0,
        pct_long: 0.0,
        pct_short: 0.0,
        net_positions: longs as i64 - shorts as i64,
        net_change: 0,
        bias: Bias::from_net(longs as i64 - shorts as i64),
        flip: String::new(),
    }
}

/// Clear every record id so datasets can be compared up to ids.
pub fn without_ids(dataset: &Dataset) -> Vec<PairData> {
    dataset
        .pairs()
        .iter()
        .cloned()
        .map(|mut p| {
            for r in &mut p.data {
                r.id.clear();
            }
            p
        })
        .collect()
}
