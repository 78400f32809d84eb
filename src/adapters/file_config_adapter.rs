//! INI file configuration adapter.
//!
//! Values are cleaned before they reach [`ConfigPort`] callers: an inline
//! `; comment` or `# comment` after whitespace is dropped, and one pair of
//! matching quotes is removed, so `code = "two words" ; admin` yields
//! `two words`.

use crate::domain::error::CotError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file(path: &Path) -> Result<Self, CotError> {
        let mut config = Ini::new();
        config.load(path).map_err(|reason| CotError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, CotError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| CotError::ConfigParse {
                file: "<inline>".into(),
                reason,
            })?;
        Ok(Self { config })
    }

    /// Adapter with no sections; every lookup falls back to its default.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }

    fn value(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key).map(|raw| clean_value(&raw))
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Some(true),
            "false" | "no" | "0" | "off" => Some(false),
            _ => None,
        }
    }
}

fn clean_value(raw: &str) -> String {
    let mut value = raw;
    for (idx, ch) in raw.char_indices() {
        if (ch == ';' || ch == '#') && raw[..idx].ends_with(char::is_whitespace) {
            value = &raw[..idx];
            break;
        }
    }
    let value = value.trim();

    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return value[1..value.len() - 1].to_string();
        }
    }
    value.to_string()
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.value(section, key)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.value(section, key)
            .and_then(|v| Self::parse_bool(&v))
            .unwrap_or(default)
    }
}
