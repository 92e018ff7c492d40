//! Theme and Colors
//!
//! Maps the engine's four palette variables onto terminal colors. Values are
//! CSS-style strings: `#rrggbb`, `#rgb`, or an `r, g, b` triple (the accent).
//! Anything unparsable falls back to the built-in palette.

use pet_core::Palette;
use ratatui::style::Color;

// ============================================================================
// Built-in palette (matches the engine defaults)
// ============================================================================

/// Background - dark roast
pub const DEFAULT_BG: Color = Color::Rgb(0x2a, 0x18, 0x10);

/// Background edge
pub const DEFAULT_BG_END: Color = Color::Rgb(0x1a, 0x10, 0x08);

/// Accent - warm orange
pub const DEFAULT_ACCENT: Color = Color::Rgb(217, 119, 74);

/// Text - pale sand
pub const DEFAULT_TEXT: Color = Color::Rgb(0xe8, 0xc4, 0xa8);

/// Dim text for key hints
pub const DIM_GRAY: Color = Color::Rgb(110, 100, 90);

/// Error red, used for the error animation
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Terminal colors for one frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TuiPalette {
    /// Main background
    pub bg: Color,
    /// Border/edge background
    pub bg_end: Color,
    /// Accent (borders, labels)
    pub accent: Color,
    /// Foreground text
    pub text: Color,
}

impl Default for TuiPalette {
    fn default() -> Self {
        Self {
            bg: DEFAULT_BG,
            bg_end: DEFAULT_BG_END,
            accent: DEFAULT_ACCENT,
            text: DEFAULT_TEXT,
        }
    }
}

impl From<&Palette> for TuiPalette {
    fn from(palette: &Palette) -> Self {
        let defaults = Self::default();
        Self {
            bg: parse_color(&palette.bg_start).unwrap_or(defaults.bg),
            bg_end: parse_color(&palette.bg_end).unwrap_or(defaults.bg_end),
            accent: parse_color(&palette.accent).unwrap_or(defaults.accent),
            text: parse_color(&palette.text).unwrap_or(defaults.text),
        }
    }
}

/// Parse `#rrggbb`, `#rgb` or `r, g, b`
pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }

    let parts: Vec<u8> = value
        .split(',')
        .map(|p| p.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [r, g, b] => Some(Color::Rgb(*r, *g, *b)),
        _ => None,
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some(Color::Rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        // #abc == #aabbcc
        3 => Some(Color::Rgb(
            channel(&hex[0..1])? * 17,
            channel(&hex[1..2])? * 17,
            channel(&hex[2..3])? * 17,
        )),
        _ => None,
    }
}
