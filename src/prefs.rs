//! Persisted user preference: the "disable interactivity" flag.
//!
//! Stored as a tiny JSON object next to wherever `--prefs-file` points. A
//! missing file means defaults. The protocol never reads this; only the
//! client decides whether to connect at all.

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    #[error("prefs io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("prefs file is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefs {
    #[serde(default)]
    pub no_interaction: bool,
}

impl Prefs {
    /// Load prefs from `path`, falling back to defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError`] if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, PrefsError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write prefs to `path`, replacing any previous contents.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), PrefsError> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "prefs_test.rs"]
mod tests;
