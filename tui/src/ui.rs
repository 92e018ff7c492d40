//! Frame Layout
//!
//! ```text
//! ╭ claude-pet ─────────── Focus mode ╮
//! │ ╭────────────────────────────────╮ │
//! │ │ [B] Need your input!           │ │  bubble (hidden when empty)
//! │ ╰────────────────────────────────╯ │
//! │      📖          🔔          ✅    │  characters
//! │     [A]         [B]         [C]    │
//! │          Waiting for you           │  status
//! │ l Language  t Theme  f Focus  q Quit │  key hints
//! ╰────────────────────────────────────╯
//! ```

use pet_core::{DisplayView, Localizer};
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use ratatui::Frame;

use crate::theme::{TuiPalette, DIM_GRAY};
use crate::widgets::{BubbleWidget, CharacterWidget};

/// Key hint labels in the current language
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyHints {
    entries: Vec<(&'static str, String)>,
    focus_label: String,
}

impl KeyHints {
    /// Key labels in the current language
    pub fn from_localizer(i18n: &Localizer) -> Self {
        let entries = [
            ("l", "selectLang"),
            ("t", "selectTheme"),
            ("f", "focusMode"),
            ("r", "resetSessions"),
            ("q", "quit"),
        ]
        .into_iter()
        .map(|(key, label)| (key, i18n.t(label)))
        .collect();

        Self {
            entries,
            focus_label: i18n.t("focusMode"),
        }
    }

    fn line(&self) -> Line<'_> {
        let mut spans = Vec::new();
        for (i, (key, label)) in self.entries.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(*key, Style::default().add_modifier(Modifier::BOLD)));
            spans.push(Span::raw(" "));
            spans.push(Span::raw(label.as_str()));
        }
        Line::from(spans).style(Style::default().fg(DIM_GRAY))
    }
}

/// Draw one frame
pub fn draw(frame: &mut Frame, view: &DisplayView, hints: &KeyHints, quiet: bool) {
    let palette = TuiPalette::from(&view.style.palette);

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.accent))
        .style(Style::default().bg(palette.bg).fg(palette.text))
        .title(" claude-pet ");
    if quiet {
        block = block.title_top(
            Line::from(format!(" {} ", hints.focus_label))
                .right_aligned()
                .style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)),
        );
    }

    let area = frame.area();
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let bubble_height = BubbleWidget::height(&view.bubble, inner.width).min(inner.height / 2);
    let [bubble_area, character_area, status_area, hint_area] = Layout::vertical([
        Constraint::Length(bubble_height),
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    if view.has_bubble() {
        frame.render_widget(
            BubbleWidget::new(&view.bubble)
                .style(Style::default().fg(palette.text))
                .border_style(Style::default().fg(palette.accent)),
            bubble_area,
        );
    }

    draw_characters(frame, view, palette, character_area);

    frame.render_widget(
        Paragraph::new(view.status.as_str())
            .alignment(Alignment::Center)
            .style(Style::default().fg(palette.text).add_modifier(Modifier::BOLD)),
        status_area,
    );

    frame.render_widget(
        Paragraph::new(hints.line())
            .alignment(Alignment::Center)
            .style(Style::default().bg(palette.bg_end)),
        hint_area,
    );
}

fn draw_characters(frame: &mut Frame, view: &DisplayView, palette: TuiPalette, area: Rect) {
    let count = u32::try_from(view.units.len()).unwrap_or(u32::MAX);
    if count == 0 {
        return;
    }

    let columns = Layout::horizontal(
        view.units
            .iter()
            .map(|_| Constraint::Ratio(1, count))
            .collect::<Vec<_>>(),
    )
    .split(area);

    for (unit, column) in view.units.iter().zip(columns.iter()) {
        frame.render_widget(CharacterWidget::new(unit, palette), *column);
    }
}
