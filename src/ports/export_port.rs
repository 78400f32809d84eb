//! Export delivery port trait.

use crate::domain::error::CotError;

/// Download target for exported documents.
pub trait ExportSink {
    /// Deliver `contents` under `filename`. Returns a description of where it
    /// ended up.
    fn deliver(&self, filename: &str, contents: &str) -> Result<String, CotError>;
}
