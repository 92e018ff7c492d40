//! Localization
//!
//! Resolves message keys to display text for the current language.
//!
//! Lookup order for `t(key)`:
//! 1. the current language's table
//! 2. the default language (`en`) table
//! 3. the key itself
//!
//! English ships compiled into the crate, so the widget always has text even
//! when the locale source is missing or broken.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::preferences::{Preferences, LANGUAGE_KEY};

/// Default (and fallback) language code
pub const DEFAULT_LANGUAGE: &str = "en";

const BUILTIN_EN: &str = include_str!("../locales/en.json");

/// Key → template table for one language
pub type StringTable = HashMap<String, String>;

/// Errors loading locale data
#[derive(Debug, Error)]
pub enum LocaleError {
    /// Failed to read a locale file
    #[error("Failed to read locale file at {path}: {source}")]
    Read {
        /// File that was read
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse a locale file
    #[error("Failed to parse locale file at {path}: {source}")]
    Parse {
        /// File that was parsed
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },
}

/// An available language
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// Language code (`en`, `ko`, ...)
    pub code: String,
    /// Display name
    pub name: String,
}

impl Language {
    fn english() -> Self {
        Self {
            code: DEFAULT_LANGUAGE.to_string(),
            name: "English".to_string(),
        }
    }
}

/// Provider of locale data
#[async_trait]
pub trait LocaleSource: Send + Sync {
    /// List the available languages
    async fn manifest(&self) -> Result<Vec<Language>, LocaleError>;

    /// Load one language's string table
    async fn load(&self, code: &str) -> Result<StringTable, LocaleError>;
}

/// Locale files on disk: `<dir>/index.json` plus `<dir>/<code>.json`
#[derive(Clone, Debug)]
pub struct DirLocaleSource {
    dir: PathBuf,
}

impl DirLocaleSource {
    /// Create a source rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, LocaleError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| LocaleError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        serde_json::from_slice(&bytes).map_err(|source| LocaleError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[async_trait]
impl LocaleSource for DirLocaleSource {
    async fn manifest(&self) -> Result<Vec<Language>, LocaleError> {
        Self::read_json(&self.dir.join("index.json")).await
    }

    async fn load(&self, code: &str) -> Result<StringTable, LocaleError> {
        Self::read_json(&self.dir.join(format!("{code}.json"))).await
    }
}

/// Message resolver for the current language
#[derive(Clone, Debug)]
pub struct Localizer {
    languages: Vec<Language>,
    strings: HashMap<String, StringTable>,
    current: String,
}

impl Localizer {
    /// Create a localizer with only the built-in English table
    pub fn new() -> Self {
        let mut strings = HashMap::new();
        strings.insert(DEFAULT_LANGUAGE.to_string(), builtin_english());
        Self {
            languages: vec![Language::english()],
            strings,
            current: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Load every language the source offers and restore the saved selection.
    ///
    /// Never fails: a broken manifest degrades to English only, a broken
    /// locale file to an empty table for that language.
    pub async fn initialize(&mut self, source: &dyn LocaleSource, prefs: &dyn Preferences) {
        let languages = match source.manifest().await {
            Ok(languages) if !languages.is_empty() => languages,
            Ok(_) => vec![Language::english()],
            Err(e) => {
                tracing::warn!(error = %e, "Locale manifest unavailable, using built-in English");
                vec![Language::english()]
            }
        };

        let loads = languages.iter().map(|lang| async move {
            let table = match source.load(&lang.code).await {
                Ok(table) => table,
                Err(e) => {
                    tracing::warn!(lang = %lang.code, error = %e, "Failed to load locale");
                    StringTable::new()
                }
            };
            (lang.code.clone(), table)
        });
        let tables = futures::future::join_all(loads).await;

        let mut strings = HashMap::new();
        strings.insert(DEFAULT_LANGUAGE.to_string(), builtin_english());
        for (code, table) in tables {
            strings.entry(code).or_insert_with(StringTable::new).extend(table);
        }

        self.languages = languages;
        self.strings = strings;

        let saved = prefs
            .get(LANGUAGE_KEY)
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        self.current = if self.strings.contains_key(&saved) {
            saved
        } else {
            DEFAULT_LANGUAGE.to_string()
        };

        tracing::debug!(
            lang = %self.current,
            available = self.languages.len(),
            "Localization ready"
        );
    }

    /// Resolve a key with no substitutions
    pub fn t(&self, key: &str) -> String {
        self.t_with(key, &[])
    }

    /// Resolve a key, replacing `{name}` with each variable's value
    pub fn t_with(&self, key: &str, vars: &[(&str, &str)]) -> String {
        let mut text = self
            .lookup(&self.current, key)
            .or_else(|| self.lookup(DEFAULT_LANGUAGE, key))
            .unwrap_or(key)
            .to_string();

        for (name, value) in vars {
            text = text.replacen(&format!("{{{name}}}"), value, 1);
        }
        text
    }

    fn lookup(&self, code: &str, key: &str) -> Option<&str> {
        self.strings
            .get(code)
            .and_then(|table| table.get(key))
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Current language code
    pub fn language(&self) -> &str {
        &self.current
    }

    /// Available languages
    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    /// Switch language and persist the choice.
    ///
    /// Returns `false` (and changes nothing) for unknown codes.
    pub fn set_language(&mut self, code: &str, prefs: &mut dyn Preferences) -> bool {
        if !self.strings.contains_key(code) {
            tracing::debug!(lang = %code, "Ignoring unknown language");
            return false;
        }

        self.current = code.to_string();
        if let Err(e) = prefs.set(LANGUAGE_KEY, code) {
            tracing::warn!(error = %e, "Failed to persist language");
        }
        true
    }

    /// Language after the current one in manifest order (wraps)
    pub fn next_language(&self) -> Option<&str> {
        let idx = self
            .languages
            .iter()
            .position(|l| l.code == self.current)
            .map_or(0, |i| i + 1);
        self.languages
            .get(idx % self.languages.len().max(1))
            .map(|l| l.code.as_str())
    }
}

impl Default for Localizer {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_english() -> StringTable {
    serde_json::from_str(BUILTIN_EN).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Built-in English table is invalid");
        StringTable::new()
    })
}
