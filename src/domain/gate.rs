//! Placeholder admin gate.
//!
//! NOT access control. The gate is a plain string comparison against a code
//! shipped in configuration (or the built-in default), with no session,
//! expiry, or secret handling. It only decides which view a caller gets.

/// Code accepted when configuration does not supply one.
pub const DEFAULT_GATE_CODE: &str = "mysecretcode";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Read-only view, always available.
    Public,
    /// Read/write view.
    Admin,
}

impl ViewMode {
    pub fn can_edit(self) -> bool {
        self == ViewMode::Admin
    }
}

#[derive(Debug, Clone)]
pub struct AccessGate {
    code: Option<String>,
}

impl AccessGate {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
        }
    }

    /// Gate that never opens the admin view.
    pub fn closed() -> Self {
        Self { code: None }
    }

    /// Exact, case-sensitive match of the supplied code.
    pub fn view_mode(&self, supplied: Option<&str>) -> ViewMode {
        match (&self.code, supplied) {
            (Some(code), Some(given)) if code == given => ViewMode::Admin,
            _ => ViewMode::Public,
        }
    }
}

impl Default for AccessGate {
    fn default() -> Self {
        Self::new(DEFAULT_GATE_CODE)
    }
}
