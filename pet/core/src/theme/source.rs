//! Theme storage
//!
//! Themes live in directories: `<root>/<theme id>/config.json` plus any asset
//! files the config names. Two roots are scanned, the built-in one shipped
//! with the binary and a per-user one; assets are looked up in the user root
//! first so users can override built-in files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine;
use thiserror::Error;

use super::{Theme, ThemeConfig};

/// Errors listing themes or fetching theme assets
#[derive(Debug, Error)]
pub enum ThemeError {
    /// Theme id or filename would escape the theme directory
    #[error("Invalid asset path: {theme_id}/{filename}")]
    InvalidPath {
        /// Requested theme
        theme_id: String,
        /// Requested file
        filename: String,
    },

    /// Asset not present in any theme root
    #[error("Asset not found: {theme_id}/{filename}")]
    NotFound {
        /// Requested theme
        theme_id: String,
        /// Requested file
        filename: String,
    },

    /// Failed to read a file
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File that was read
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },
}

/// Provider of theme descriptors and their assets
#[async_trait]
pub trait ThemeSource: Send + Sync {
    /// List every available theme
    async fn list_themes(&self) -> Result<Vec<Theme>, ThemeError>;

    /// Fetch an asset as a `data:` URI
    async fn fetch_asset(&self, theme_id: &str, filename: &str) -> Result<String, ThemeError>;
}

/// Themes stored on disk
#[derive(Clone, Debug, Default)]
pub struct DirThemeSource {
    builtin_dir: Option<PathBuf>,
    user_dir: Option<PathBuf>,
}

impl DirThemeSource {
    /// Create a source over the given roots (either may be absent)
    pub fn new(builtin_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            builtin_dir,
            user_dir,
        }
    }

    async fn load_dir(dir: &Path, builtin: bool) -> Vec<Theme> {
        let mut themes = Vec::new();
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "Theme directory unavailable");
                return themes;
            }
        };

        let mut dirs = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.is_dir() {
                dirs.push((entry.file_name().to_string_lossy().to_string(), path));
            }
        }
        // read_dir order is platform-defined
        dirs.sort();

        for (id, path) in dirs {
            let config_path = path.join("config.json");
            let text = match tokio::fs::read_to_string(&config_path).await {
                Ok(text) => text,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    tracing::warn!(path = %config_path.display(), error = %e, "Skipping unreadable theme");
                    continue;
                }
            };
            match serde_json::from_str::<ThemeConfig>(&text) {
                Ok(config) => themes.push(config.into_theme(id, builtin)),
                Err(e) => {
                    tracing::warn!(path = %config_path.display(), error = %e, "Skipping invalid theme");
                }
            }
        }

        themes
    }
}

#[async_trait]
impl ThemeSource for DirThemeSource {
    async fn list_themes(&self) -> Result<Vec<Theme>, ThemeError> {
        let mut themes = Vec::new();
        if let Some(dir) = &self.builtin_dir {
            themes.extend(Self::load_dir(dir, true).await);
        }
        if let Some(dir) = &self.user_dir {
            themes.extend(Self::load_dir(dir, false).await);
        }

        tracing::debug!(count = themes.len(), "Listed themes");
        Ok(themes)
    }

    async fn fetch_asset(&self, theme_id: &str, filename: &str) -> Result<String, ThemeError> {
        if !is_plain_component(theme_id) || !is_plain_component(filename) {
            return Err(ThemeError::InvalidPath {
                theme_id: theme_id.to_string(),
                filename: filename.to_string(),
            });
        }

        let candidates = [&self.user_dir, &self.builtin_dir]
            .into_iter()
            .flatten()
            .map(|dir| dir.join(theme_id).join(filename));

        for path in candidates {
            if !path.is_file() {
                continue;
            }
            let data = tokio::fs::read(&path)
                .await
                .map_err(|source| ThemeError::Read {
                    path: path.clone(),
                    source,
                })?;
            return Ok(data_uri(&path, &data));
        }

        Err(ThemeError::NotFound {
            theme_id: theme_id.to_string(),
            filename: filename.to_string(),
        })
    }
}

fn is_plain_component(s: &str) -> bool {
    !s.is_empty() && !s.contains("..") && !s.contains('/') && !s.contains('\\')
}

/// MIME type for an asset, by extension
pub fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("ttf") => "font/ttf",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}

fn data_uri(path: &Path, data: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(data);
    format!("data:{};base64,{b64}", mime_for(path))
}
