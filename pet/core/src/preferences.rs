//! User Preferences
//!
//! Two scalar string preferences survive restarts: the selected language and
//! the selected theme. The engine only needs a get/set key-value interface;
//! [`FilePreferences`] backs it with a small JSON file, [`MemoryPreferences`]
//! keeps it in memory for tests and headless runs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Preference key for the selected language code
pub const LANGUAGE_KEY: &str = "claude-pet-lang";

/// Preference key for the selected theme id
pub const THEME_KEY: &str = "claude-pet-theme";

/// Errors persisting preferences
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// Failed to write the preference file
    #[error("Failed to write preferences at {path}: {source}")]
    Write {
        /// File that was written
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Failed to serialize the preference map
    #[error("Failed to serialize preferences: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Key-value preference store
pub trait Preferences: Send + Sync {
    /// Read a preference
    fn get(&self, key: &str) -> Option<String>;

    /// Write a preference
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// In-memory preferences
#[derive(Clone, Debug, Default)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
}

impl MemoryPreferences {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with one value
    pub fn with(key: &str, value: &str) -> Self {
        let mut values = BTreeMap::new();
        values.insert(key.to_string(), value.to_string());
        Self { values }
    }
}

impl Preferences for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences persisted as a flat JSON object
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferences {
    /// Open the store, reading existing values if the file is present.
    ///
    /// A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt preferences file");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read preferences");
                BTreeMap::new()
            }
        };

        Self { path, values }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), PreferenceError> {
        let json = serde_json::to_string_pretty(&self.values)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| PreferenceError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        std::fs::write(&self.path, json + "\n").map_err(|source| PreferenceError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl Preferences for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }
}
