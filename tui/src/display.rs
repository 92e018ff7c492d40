//! Display State
//!
//! The TUI's [`Renderer`]. The engine hands it a fresh [`DisplayView`] after
//! every change; the event loop redraws only when something arrived since the
//! last frame.

use pet_core::{DisplayView, Renderer};

/// Latest view plus a redraw flag
#[derive(Debug, Default)]
pub struct DisplayState {
    view: Option<DisplayView>,
    dirty: bool,
}

impl DisplayState {
    /// Nothing rendered yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent view, if the engine has rendered yet
    pub fn view(&self) -> Option<&DisplayView> {
        self.view.as_ref()
    }

    /// Whether a redraw is due
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Force a redraw (resize, focus toggle)
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clear the redraw flag after drawing
    pub fn mark_drawn(&mut self) {
        self.dirty = false;
    }
}

impl Renderer for DisplayState {
    fn render(&mut self, view: &DisplayView) {
        // Identical frames are not worth a redraw
        if self.view.as_ref() != Some(view) {
            self.view = Some(view.clone());
            self.dirty = true;
        }
    }
}
