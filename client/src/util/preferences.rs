//! Durable key-value storage for user preferences.
//!
//! SYSTEM CONTEXT
//! ==============
//! The theme store persists through this trait so the binary can back it
//! with a JSON file while tests use an in-memory map.

#[cfg(test)]
#[path = "preferences_test.rs"]
mod preferences_test;

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Errors produced by preference storage.
#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    #[error("preferences I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("preferences file {path} is not a JSON object: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`PrefsError`] if the value cannot be persisted.
    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError>;
}

/// Non-durable store for tests and ephemeral sessions.
#[derive(Clone, Debug, Default)]
pub struct MemoryPreferences {
    values: HashMap<String, String>,
}

impl MemoryPreferences {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Preferences stored as a flat JSON object on disk. Every `set` rewrites
/// the file.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferences {
    /// Load `path`, treating a missing file as empty.
    ///
    /// # Errors
    ///
    /// Returns a [`PrefsError`] if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PrefsError> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| PrefsError::Parse { path: path.clone(), source })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(PrefsError::Io { path, source }),
        };
        Ok(Self { path, values })
    }

    /// Start empty at `path` without reading it. The next `set` overwrites
    /// whatever is there.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), values: BTreeMap::new() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), PrefsError> {
        let io_err = |source| PrefsError::Io { path: self.path.clone(), source };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let raw = serde_json::to_string_pretty(&self.values)
            .map_err(|source| PrefsError::Parse { path: self.path.clone(), source })?;
        std::fs::write(&self.path, raw).map_err(io_err)
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError> {
        self.values.insert(key.to_owned(), value.to_owned());
        self.persist()
    }
}
