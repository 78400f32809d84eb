//! Typed application settings built from a [`ConfigPort`].

use std::path::PathBuf;

use super::error::CotError;
use super::gate::{AccessGate, DEFAULT_GATE_CODE};
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_DATA_PATH: &str = "data.json";
pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct Settings {
    /// Startup document location.
    pub data_path: PathBuf,
    /// Directory exports are delivered into.
    pub export_dir: PathBuf,
    pub gate: AccessGate,
    pub listen: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            export_dir: PathBuf::from("."),
            gate: AccessGate::default(),
            listen: DEFAULT_LISTEN.to_string(),
        }
    }
}

fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<String>, CotError> {
    match config.get_string(section, key) {
        Some(v) if v.trim().is_empty() => Err(CotError::ConfigInvalid {
            section: section.into(),
            key: key.into(),
            reason: "value is empty".into(),
        }),
        Some(v) => Ok(Some(v.trim().to_string())),
        None => Ok(None),
    }
}

impl Settings {
    /// Every key is optional; present keys must not be blank.
    pub fn from_port(config: &dyn ConfigPort) -> Result<Self, CotError> {
        let defaults = Self::default();

        let data_path = non_empty(config, "data", "path")?
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);
        let export_dir = non_empty(config, "export", "dir")?
            .map(PathBuf::from)
            .unwrap_or(defaults.export_dir);
        let listen = non_empty(config, "web", "listen")?.unwrap_or(defaults.listen);

        let gate = if config.get_bool("gate", "enabled", true) {
            let code = non_empty(config, "gate", "code")?
                .unwrap_or_else(|| DEFAULT_GATE_CODE.to_string());
            AccessGate::new(code)
        } else {
            AccessGate::closed()
        };

        Ok(Self {
            data_path,
            export_dir,
            gate,
            listen,
        })
    }
}
