//! Dataset source port trait.

use crate::domain::error::CotError;

/// Where the startup document comes from.
pub trait DatasetSource {
    /// Location shown in diagnostics, e.g. a file path.
    fn location(&self) -> String;

    /// Raw document body. Any error makes the loader fall back to the
    /// built-in dataset.
    fn fetch(&self) -> Result<String, CotError>;
}
