//! Session state container for the dataset.
//!
//! The store is owned by whichever surface runs the session and handed to
//! callers explicitly. Every effective mutation bumps [`Store::revision`] so
//! observers can tell the dataset was replaced.

use uuid::Uuid;

use super::error::CotError;
use super::record::{CotRecord, Dataset, PairData};

#[derive(Debug, Clone, Default)]
pub struct Store {
    dataset: Dataset,
    revision: u64,
}

/// Uppercased, trimmed pair identifier.
pub fn normalize_pair(name: &str) -> String {
    name.trim().to_uppercase()
}

fn fresh_id(pair: &PairData) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !pair.contains_id(&id) {
            return id;
        }
    }
}

impl Store {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            revision: 0,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn pair_mut(&mut self, pair: &str) -> Result<&mut PairData, CotError> {
        self.dataset
            .pair_mut(pair)
            .ok_or_else(|| CotError::UnknownPair {
                pair: pair.to_string(),
            })
    }

    /// Add an empty pair. The duplicate check runs on the normalized name, so
    /// "eurjpy" and "EURJPY" collide. Returns the stored identifier.
    pub fn add_pair(&mut self, name: &str) -> Result<String, CotError> {
        let pair = normalize_pair(name);
        if pair.is_empty() {
            return Err(CotError::InvalidPair {
                name: name.to_string(),
                reason: "name is empty".into(),
            });
        }
        if self.dataset.contains_pair(&pair) {
            return Err(CotError::DuplicatePair { pair });
        }

        self.dataset.push(PairData::new(pair.clone()));
        self.revision += 1;
        log::debug!("added pair {pair}");
        Ok(pair)
    }

    /// Replace the record with the same id in place, or prepend it as a new
    /// record (generating an id when it has none). The pair's records are
    /// re-sorted newest first either way. Returns the stored record's id.
    pub fn upsert_record(&mut self, pair: &str, mut record: CotRecord) -> Result<String, CotError> {
        let target = self.pair_mut(pair)?;

        let existing = if record.id.is_empty() {
            None
        } else {
            target.data.iter().position(|r| r.id == record.id)
        };

        let id = match existing {
            Some(idx) => {
                let id = record.id.clone();
                target.data[idx] = record;
                id
            }
            None => {
                if record.id.is_empty() {
                    record.id = fresh_id(target);
                }
                let id = record.id.clone();
                target.data.insert(0, record);
                id
            }
        };

        target.sort_by_date_desc();
        self.revision += 1;
        log::debug!("saved record {id} in {pair}");
        Ok(id)
    }

    /// Remove a record. Returns whether anything was removed; a missing id is
    /// a no-op.
    pub fn delete_record(&mut self, pair: &str, id: &str) -> Result<bool, CotError> {
        let target = self.pair_mut(pair)?;
        let before = target.data.len();
        target.data.retain(|r| r.id != id);
        let removed = target.data.len() != before;

        if removed {
            self.revision += 1;
            log::debug!("deleted record {id} from {pair}");
        }
        Ok(removed)
    }
}
