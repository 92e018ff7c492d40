//! Pet TUI - Terminal widget for claude-pet
//!
//! Shows the pet in a small terminal pane: one big character when a single
//! assistant session is active, a labeled row of small characters when there
//! are several, plus the status line and speech bubble.
//!
//! # Architecture
//!
//! - **App**: select loop over terminal keys, hook events, reversion
//!   deadlines and the cleanup tick
//! - **Display**: the engine's renderer; keeps the latest view
//! - **UI**: frame layout
//! - **Widgets**: bubble and character units
//! - **Theme**: palette strings to terminal colors

pub mod app;
pub mod display;
pub mod theme;
pub mod ui;
pub mod widgets;

pub use app::App;
pub use display::DisplayState;
