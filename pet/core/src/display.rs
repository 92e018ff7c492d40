//! Display Projection
//!
//! Turns the session set into a render-ready [`DisplayView`]. Nothing here
//! draws; a [`Renderer`] receives the view and decides how it looks.

use tokio::sync::mpsc;

use crate::i18n::Localizer;
use crate::session::Session;
use crate::states::{Bubble, State, StateId};
use crate::theme::{Character, ThemeRegistry, ThemeStyle};

/// How big a character is drawn
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitSize {
    /// Single character filling the widget
    Full,
    /// One of several side-by-side characters
    Small,
}

/// One drawn character
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterUnit {
    /// State being shown
    pub state_id: StateId,
    /// What to draw
    pub character: Character,
    /// Animation class
    pub animation: &'static str,
    /// Session label (multi-session only)
    pub label: Option<char>,
    /// Size class
    pub size: UnitSize,
}

/// Everything a renderer needs for one frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayView {
    /// Characters, in session creation order
    pub units: Vec<CharacterUnit>,
    /// Status line
    pub status: String,
    /// Bubble text; empty means hidden
    pub bubble: String,
    /// Active theme styling
    pub style: ThemeStyle,
}

impl DisplayView {
    /// Whether the bubble should be shown
    pub fn has_bubble(&self) -> bool {
        !self.bubble.is_empty()
    }

    /// Whether this is the multi-session layout
    pub fn is_multi(&self) -> bool {
        self.units.len() > 1
    }
}

/// Consumer of display views
pub trait Renderer: Send {
    /// Draw (or queue) a view
    fn render(&mut self, view: &DisplayView);
}

impl Renderer for mpsc::UnboundedSender<DisplayView> {
    fn render(&mut self, view: &DisplayView) {
        if self.send(view.clone()).is_err() {
            tracing::debug!("Renderer channel closed, dropping view");
        }
    }
}

/// Renderer that discards every view
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _view: &DisplayView) {}
}

/// Resolve bubble content to display text (empty when hidden)
pub fn resolve_bubble(bubble: &Bubble, i18n: &Localizer) -> String {
    match bubble {
        Bubble::Hidden => String::new(),
        Bubble::Text(text) => text.clone(),
        Bubble::Key { key, vars } => {
            let vars: Vec<(&str, &str)> = vars.iter().map(|(k, v)| (*k, v.as_str())).collect();
            i18n.t_with(key, &vars)
        }
    }
}

/// Project sessions seen within `timeout_ms` of `now` into a view
pub fn project(
    sessions: &[Session],
    now: u64,
    timeout_ms: u64,
    themes: &ThemeRegistry,
    i18n: &Localizer,
) -> DisplayView {
    let active: Vec<&Session> = sessions
        .iter()
        .filter(|s| s.idle_for(now) <= timeout_ms)
        .collect();
    let style = themes.style();

    match active.as_slice() {
        [] => {
            let idle = State::idle();
            DisplayView {
                units: vec![unit(&idle, None, UnitSize::Full, themes)],
                status: i18n.t(idle.status_key),
                bubble: String::new(),
                style,
            }
        }
        [only] => DisplayView {
            units: vec![unit(&only.state, None, UnitSize::Full, themes)],
            status: i18n.t(only.state.status_key),
            bubble: resolve_bubble(&only.state.bubble, i18n),
            style,
        },
        many => {
            let units = many
                .iter()
                .map(|s| unit(&s.state, Some(s.label), UnitSize::Small, themes))
                .collect();

            // Newest-created session wins ties
            let mut latest = many[0];
            for &s in &many[1..] {
                if s.last_seen_at >= latest.last_seen_at {
                    latest = s;
                }
            }

            let text = resolve_bubble(&latest.state.bubble, i18n);
            let bubble = if text.is_empty() {
                text
            } else {
                format!("[{}] {text}", latest.label)
            };

            DisplayView {
                units,
                status: i18n.t(latest.state.status_key),
                bubble,
                style,
            }
        }
    }
}

fn unit(state: &State, label: Option<char>, size: UnitSize, themes: &ThemeRegistry) -> CharacterUnit {
    CharacterUnit {
        state_id: state.id,
        character: themes.resolve_character(state),
        animation: state.animation,
        label,
        size,
    }
}
