//! Theme Registry
//!
//! Holds the available visual themes and the active one, and turns a
//! [`State`] into something a renderer can draw.
//!
//! # Character resolution
//!
//! 1. Image theme with a cached image for the state → that image
//! 2. Emoji theme declaring an emoji for the state → that emoji
//! 3. The state's built-in glyph
//!
//! The last tier always exists, so a broken or half-loaded theme still draws.
//!
//! # Caching
//!
//! Image assets are fetched once per `(theme id, filename)` and kept for the
//! life of the registry. Theme and asset counts are small, so nothing is
//! evicted.

mod source;

use std::collections::{BTreeSet, HashMap};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::events::lenient_string;
use crate::preferences::{Preferences, THEME_KEY};
use crate::states::State;

pub use source::{mime_for, DirThemeSource, ThemeError, ThemeSource};

/// Id of the theme used when nothing was saved
pub const DEFAULT_THEME_ID: &str = "default";

/// How a theme draws its character
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeKind {
    /// Per-state emoji overrides
    #[default]
    Emoji,
    /// Per-state image files
    Image,
    /// Any other declared type; draws built-in glyphs only
    #[serde(other)]
    Other,
}

/// Per-state asset reference
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateAsset {
    /// Emoji override (emoji themes)
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub emoji: Option<String>,
    /// Image filename (image themes)
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub src: Option<String>,
}

/// Declared colors; absent keys leave the current value alone
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    /// Background gradient start
    #[serde(default, alias = "bg_start", deserialize_with = "lenient_string")]
    pub bg_start: Option<String>,
    /// Background gradient end
    #[serde(default, alias = "bg_end", deserialize_with = "lenient_string")]
    pub bg_end: Option<String>,
    /// Accent color (`r, g, b` triple)
    #[serde(default, deserialize_with = "lenient_string")]
    pub accent: Option<String>,
    /// Text color
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
}

/// Declared font
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThemeFont {
    /// A font family name already available to the renderer
    Name(String),
    /// A font file shipped with the theme
    Face {
        /// Family name to bind
        family: String,
        /// Asset filename
        src: String,
    },
}

/// A visual theme
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Unique id (directory name for on-disk themes)
    pub id: String,
    /// Display name
    pub name: String,
    /// How the character is drawn
    #[serde(rename = "type", default)]
    pub kind: ThemeKind,
    /// State id → asset
    #[serde(default)]
    pub states: HashMap<String, StateAsset>,
    /// Declared colors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<ThemeColors>,
    /// Declared font
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<ThemeFont>,
    /// Shipped with the application rather than user-installed
    #[serde(default)]
    pub builtin: bool,
}

/// On-disk `config.json` shape; the id comes from the directory.
///
/// Every field is decoded on its own: a field with the wrong shape falls back
/// to its default instead of rejecting the whole theme.
#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct ThemeConfig {
    #[serde(default, deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient_or_default")]
    kind: ThemeKind,
    #[serde(default, deserialize_with = "lenient_states")]
    states: HashMap<String, StateAsset>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    colors: Option<ThemeColors>,
    /// A face missing its family or source is no custom font
    #[serde(default, deserialize_with = "lenient_or_default")]
    font: Option<ThemeFont>,
}

/// Decode `T`, or its default if the value has the wrong shape
fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default())
}

/// Keep the state entries that are objects; drop the rest
fn lenient_states<'de, D>(deserializer: D) -> Result<HashMap<String, StateAsset>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::Object(entries)) = value else {
        return Ok(HashMap::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|(id, asset)| Some((id, serde_json::from_value(asset).ok()?)))
        .collect())
}

impl ThemeConfig {
    pub(crate) fn into_theme(self, id: String, builtin: bool) -> Theme {
        Theme {
            name: self.name.unwrap_or_else(|| id.clone()),
            id,
            kind: self.kind,
            states: self.states,
            colors: self.colors,
            font: self.font,
            builtin,
        }
    }
}

/// The four color variables renderers style with
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// Background gradient start
    pub bg_start: String,
    /// Background gradient end
    pub bg_end: String,
    /// Accent color as `r, g, b`
    pub accent: String,
    /// Text color
    pub text: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            bg_start: "#2a1810".to_string(),
            bg_end: "#1a1008".to_string(),
            accent: "217, 119, 74".to_string(),
            text: "#e8c4a8".to_string(),
        }
    }
}

impl Palette {
    /// Apply a theme's colors: declared keys replace current values, no
    /// colors block at all restores the defaults.
    pub fn apply(&mut self, colors: Option<&ThemeColors>) {
        let Some(colors) = colors else {
            *self = Self::default();
            return;
        };
        let fields = [
            (&mut self.bg_start, &colors.bg_start),
            (&mut self.bg_end, &colors.bg_end),
            (&mut self.accent, &colors.accent),
            (&mut self.text, &colors.text),
        ];
        for (slot, value) in fields {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                *slot = value.to_string();
            }
        }
    }
}

/// A font face loaded from a theme asset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedFont {
    /// Bound family name
    pub family: String,
    /// Font data as a `data:` URI
    pub data_uri: String,
}

/// Styling handed to renderers with every view
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ThemeStyle {
    /// Colors
    pub palette: Palette,
    /// Custom font family, if one is bound
    pub font: Option<String>,
}

/// A renderable character
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Character {
    /// Emoji or other text glyph
    Glyph(String),
    /// Image as a `data:` URI
    Image(String),
}

/// Available themes plus the active one
pub struct ThemeRegistry {
    source: Box<dyn ThemeSource>,
    themes: Vec<Theme>,
    current: Option<usize>,
    /// `(theme id, filename)` → data URI
    image_cache: HashMap<(String, String), String>,
    palette: Palette,
    font_family: Option<String>,
    loaded_font: Option<LoadedFont>,
}

impl std::fmt::Debug for ThemeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeRegistry")
            .field("themes", &self.themes.len())
            .field("current", &self.current_theme_id())
            .field("cached_images", &self.image_cache.len())
            .finish_non_exhaustive()
    }
}

impl ThemeRegistry {
    /// Create an empty registry backed by `source`
    pub fn new(source: Box<dyn ThemeSource>) -> Self {
        Self {
            source,
            themes: Vec::new(),
            current: None,
            image_cache: HashMap::new(),
            palette: Palette::default(),
            font_family: None,
            loaded_font: None,
        }
    }

    /// Load the theme list and activate the saved, default or first theme.
    ///
    /// A failing source leaves the registry empty (built-in glyphs only).
    pub async fn initialize(&mut self, prefs: &mut dyn Preferences) {
        self.themes = match self.source.list_themes().await {
            Ok(themes) => themes,
            Err(e) => {
                tracing::warn!(error = %e, "Theme list unavailable");
                Vec::new()
            }
        };

        if let Some(saved) = prefs.get(THEME_KEY) {
            if self.index_of(&saved).is_some() {
                self.set_theme(&saved, prefs).await;
                return;
            }
            tracing::debug!(theme = %saved, "Saved theme no longer available");
        }

        let fallback = self
            .index_of(DEFAULT_THEME_ID)
            .or_else(|| (!self.themes.is_empty()).then_some(0));
        match fallback {
            Some(idx) => self.activate(idx).await,
            None => tracing::debug!("No themes available, using built-in glyphs"),
        }
    }

    /// Switch to theme `id` and persist the choice.
    ///
    /// Unknown ids are ignored. Returns whether the theme changed.
    pub async fn set_theme(&mut self, id: &str, prefs: &mut dyn Preferences) -> bool {
        let Some(idx) = self.index_of(id) else {
            tracing::debug!(theme = %id, "Ignoring unknown theme");
            return false;
        };

        if let Err(e) = prefs.set(THEME_KEY, id) {
            tracing::warn!(error = %e, "Failed to persist theme");
        }
        self.activate(idx).await;
        true
    }

    async fn activate(&mut self, idx: usize) {
        self.current = Some(idx);
        let theme = self.themes[idx].clone();
        tracing::info!(theme = %theme.id, kind = ?theme.kind, "Theme activated");

        if theme.kind == ThemeKind::Image {
            self.preload_images(&theme).await;
        }
        self.palette.apply(theme.colors.as_ref());
        self.apply_font(&theme).await;
    }

    async fn preload_images(&mut self, theme: &Theme) {
        let missing: BTreeSet<&str> = theme
            .states
            .values()
            .filter_map(|asset| asset.src.as_deref())
            .filter(|src| {
                !self
                    .image_cache
                    .contains_key(&(theme.id.clone(), (*src).to_string()))
            })
            .collect();

        let source = self.source.as_ref();
        let fetches = missing.into_iter().map(|src| async move {
            (src, source.fetch_asset(&theme.id, src).await)
        });
        for (src, result) in futures::future::join_all(fetches).await {
            match result {
                Ok(uri) => {
                    self.image_cache
                        .insert((theme.id.clone(), src.to_string()), uri);
                }
                Err(e) => {
                    tracing::warn!(theme = %theme.id, file = %src, error = %e, "Failed to load theme image");
                }
            }
        }
    }

    async fn apply_font(&mut self, theme: &Theme) {
        if let Some(previous) = self.loaded_font.take() {
            tracing::debug!(family = %previous.family, "Unloaded theme font");
        }
        self.font_family = None;

        match &theme.font {
            None => {}
            Some(ThemeFont::Name(name)) => self.font_family = Some(name.clone()),
            Some(ThemeFont::Face { family, src }) => {
                match self.source.fetch_asset(&theme.id, src).await {
                    Ok(data_uri) => {
                        self.loaded_font = Some(LoadedFont {
                            family: family.clone(),
                            data_uri,
                        });
                        self.font_family = Some(family.clone());
                    }
                    Err(e) => {
                        tracing::warn!(theme = %theme.id, error = %e, "Failed to load theme font");
                    }
                }
            }
        }
    }

    /// Character to draw for `state` under the active theme
    pub fn resolve_character(&self, state: &State) -> Character {
        if let Some(theme) = self.current() {
            let asset = theme.states.get(state.id.as_str());
            match theme.kind {
                ThemeKind::Image => {
                    let cached = asset
                        .and_then(|a| a.src.as_ref())
                        .and_then(|src| self.image_cache.get(&(theme.id.clone(), src.clone())));
                    if let Some(uri) = cached {
                        return Character::Image(uri.clone());
                    }
                }
                ThemeKind::Emoji => {
                    if let Some(emoji) = asset
                        .and_then(|a| a.emoji.as_deref())
                        .filter(|e| !e.is_empty())
                    {
                        return Character::Glyph(emoji.to_string());
                    }
                }
                ThemeKind::Other => {}
            }
        }
        Character::Glyph(state.glyph.to_string())
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.themes.iter().position(|t| t.id == id)
    }

    /// Active theme
    pub fn current(&self) -> Option<&Theme> {
        self.current.and_then(|idx| self.themes.get(idx))
    }

    /// Active theme id, `"default"` when none is active
    pub fn current_theme_id(&self) -> &str {
        self.current().map_or(DEFAULT_THEME_ID, |t| t.id.as_str())
    }

    /// Every known theme
    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    /// Theme after the active one in list order (wraps)
    pub fn next_theme_id(&self) -> Option<&str> {
        if self.themes.is_empty() {
            return None;
        }
        let idx = self.current.map_or(0, |i| (i + 1) % self.themes.len());
        Some(self.themes[idx].id.as_str())
    }

    /// Current colors
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Currently loaded font face, if the theme shipped one
    pub fn loaded_font(&self) -> Option<&LoadedFont> {
        self.loaded_font.as_ref()
    }

    /// Styling for the renderer
    pub fn style(&self) -> ThemeStyle {
        ThemeStyle {
            palette: self.palette.clone(),
            font: self.font_family.clone(),
        }
    }

    /// Number of cached images
    pub fn cached_images(&self) -> usize {
        self.image_cache.len()
    }
}
