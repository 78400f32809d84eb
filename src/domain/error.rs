//! Domain error types.

/// Top-level error type for cotdesk.
#[derive(Debug, thiserror::Error)]
pub enum CotError {
    #[error("pair already exists: {pair}")]
    DuplicatePair { pair: String },

    #[error("invalid pair name {name:?}: {reason}")]
    InvalidPair { name: String, reason: String },

    #[error("unknown pair: {pair}")]
    UnknownPair { pair: String },

    #[error("failed to load dataset from {location}: {reason}")]
    Load { location: String, reason: String },

    #[error("failed to export {target}: {reason}")]
    Export { target: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&CotError> for std::process::ExitCode {
    fn from(err: &CotError) -> Self {
        let code: u8 = match err {
            CotError::Io(_) => 1,
            CotError::ConfigParse { .. } | CotError::ConfigInvalid { .. } => 2,
            CotError::Load { .. } | CotError::Export { .. } => 3,
            CotError::DuplicatePair { .. }
            | CotError::InvalidPair { .. }
            | CotError::UnknownPair { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
