//! Character Widget
//!
//! Draws one [`CharacterUnit`] centered in its area. Terminals cannot show
//! theme images, so image characters are drawn as `[state]`.

use pet_core::{Character, CharacterUnit, UnitSize};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthStr;

use crate::theme::{TuiPalette, ERROR_RED};

/// Style for an animation class
pub fn animation_style(animation: &str, palette: &TuiPalette) -> Style {
    let base = Style::default().fg(palette.text);
    match animation {
        "state-error" => base.fg(ERROR_RED).add_modifier(Modifier::BOLD),
        "state-notification" => base.fg(palette.accent).add_modifier(Modifier::SLOW_BLINK),
        "state-success" => base.fg(palette.accent).add_modifier(Modifier::BOLD),
        "state-idle" | "state-stop" => base.add_modifier(Modifier::DIM),
        _ => base,
    }
}

/// One character with its optional session label
pub struct CharacterWidget<'a> {
    unit: &'a CharacterUnit,
    palette: TuiPalette,
}

impl<'a> CharacterWidget<'a> {
    pub fn new(unit: &'a CharacterUnit, palette: TuiPalette) -> Self {
        Self { unit, palette }
    }

    fn text(&self) -> String {
        match &self.unit.character {
            Character::Glyph(glyph) => glyph.clone(),
            Character::Image(_) => format!("[{}]", self.unit.state_id),
        }
    }
}

fn centered_x(area: Rect, text: &str) -> u16 {
    let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
    area.x + area.width.saturating_sub(width) / 2
}

impl Widget for CharacterWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }

        let text = self.text();
        let style = animation_style(self.unit.animation, &self.palette);

        // Small units leave a row under the glyph for the label
        let label_rows = match (self.unit.size, self.unit.label) {
            (UnitSize::Small, Some(_)) => 2,
            _ => 0,
        };
        let y = area.y + area.height.saturating_sub(label_rows) / 2;
        buf.set_stringn(
            centered_x(area, &text),
            y,
            &text,
            usize::from(area.width),
            style,
        );

        if let (UnitSize::Small, Some(label)) = (self.unit.size, self.unit.label) {
            let label = format!("[{label}]");
            let label_y = y + 1;
            if label_y < area.bottom() {
                let label_style = Style::default()
                    .fg(self.palette.accent)
                    .add_modifier(Modifier::BOLD);
                buf.set_stringn(
                    centered_x(area, &label),
                    label_y,
                    &label,
                    usize::from(area.width),
                    label_style,
                );
            }
        }
    }
}
