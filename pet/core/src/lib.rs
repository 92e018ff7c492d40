//! Pet Core - Headless Session-State Engine for claude-pet
//!
//! This crate turns the hook events of one or more coding-assistant sessions
//! into what a small companion widget should show: which character, which
//! status line, which speech bubble. It is independent of any UI framework;
//! renderers plug in through the [`Renderer`] trait.
//!
//! # Architecture
//!
//! ```text
//!  hook payload (TCP)                          user commands
//!        │                                   (theme, language,
//!        ▼                                    reset, focus)
//!  ┌─────────────┐                                  │
//!  │ EventListener│                                  │
//!  └──────┬──────┘                                  │
//!         │ HookEvent                               │
//!  ┌──────┴──────────────────────────────────────────┴──────┐
//!  │                          Pet                            │
//!  │  classify ──► SessionStore ──► project ──► Renderer     │
//!  │                 (timers)          ▲                     │
//!  │                                   │                     │
//!  │                    ThemeRegistry ─┴─ Localizer          │
//!  └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Pet`]: owns every component and re-renders after each change
//! - [`SessionStore`]: live sessions plus their idle-reversion deadlines
//! - [`ThemeRegistry`]: themes, image cache, palette and font
//! - [`Localizer`]: message lookup with English fallback
//! - [`DisplayView`]: the render-ready description handed to renderers
//!
//! # Time
//!
//! Nothing in the engine sleeps or spawns timers. Reversions are deadlines;
//! the driver waits for [`Pet::next_deadline`] and calls
//! [`Pet::fire_due_reversions`]. All timestamps come from a [`Clock`].
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classifier;
pub mod clock;
pub mod config;
pub mod display;
pub mod events;
pub mod i18n;
pub mod pet;
pub mod preferences;
pub mod session;
pub mod states;
pub mod theme;
pub mod transport;

// Re-exports for convenience
pub use classifier::classify;
pub use clock::{Clock, ManualClock, SystemClock};
pub use display::{
    project, resolve_bubble, CharacterUnit, DisplayView, NullRenderer, Renderer, UnitSize,
};
pub use events::{Envelope, EventError, EventKind, HookEvent, ToolOutcome};
pub use i18n::{DirLocaleSource, Language, LocaleError, LocaleSource, Localizer};
pub use pet::Pet;
pub use preferences::{FilePreferences, MemoryPreferences, PreferenceError, Preferences};
pub use session::{Session, SessionStore};
pub use states::{Bubble, State, StateId};
pub use theme::{
    Character, DirThemeSource, Palette, Theme, ThemeError, ThemeKind, ThemeRegistry, ThemeSource,
    ThemeStyle,
};
pub use transport::{send_payload, EventListener, TransportError};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigSource, PetConfig,
    Timings,
};
