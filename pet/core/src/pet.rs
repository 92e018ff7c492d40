//! Pet Engine
//!
//! [`Pet`] owns one of everything: the session store, the theme registry,
//! the localizer, the preference store and the renderer. Every mutating
//! operation re-projects and renders before returning, so the renderer always
//! sees the latest view.
//!
//! The driver decides *when* things happen (inbound events, the next
//! reversion deadline, the cleanup tick, user commands); `Pet` decides *what*
//! happens. Handlers run to completion one at a time on `&mut self`.

use crate::clock::Clock;
use crate::config::PetConfig;
use crate::display::{project, DisplayView, Renderer};
use crate::events::HookEvent;
use crate::i18n::{LocaleSource, Localizer};
use crate::preferences::Preferences;
use crate::session::SessionStore;
use crate::theme::{ThemeRegistry, ThemeSource};

/// The pet engine
pub struct Pet<C: Clock, R: Renderer> {
    store: SessionStore<C>,
    themes: ThemeRegistry,
    i18n: Localizer,
    prefs: Box<dyn Preferences>,
    renderer: R,
    quiet: bool,
}

impl<C: Clock, R: Renderer> std::fmt::Debug for Pet<C, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pet")
            .field("sessions", &self.store.len())
            .field("theme", &self.themes.current_theme_id())
            .field("language", &self.i18n.language())
            .field("quiet", &self.quiet)
            .finish_non_exhaustive()
    }
}

impl<C: Clock, R: Renderer> Pet<C, R> {
    /// Create an engine with built-in English and no themes loaded yet
    pub fn new(
        config: &PetConfig,
        clock: C,
        renderer: R,
        prefs: Box<dyn Preferences>,
        theme_source: Box<dyn ThemeSource>,
    ) -> Self {
        Self {
            store: SessionStore::new(clock, config.timings),
            themes: ThemeRegistry::new(theme_source),
            i18n: Localizer::new(),
            prefs,
            renderer,
            quiet: false,
        }
    }

    /// Load locales, then themes, then draw the first frame
    pub async fn initialize(&mut self, locales: &dyn LocaleSource) {
        self.i18n.initialize(locales, self.prefs.as_ref()).await;
        self.themes.initialize(self.prefs.as_mut()).await;
        self.refresh();
    }

    /// Apply one inbound hook event
    pub fn handle_event(&mut self, event: HookEvent) {
        if self.quiet {
            tracing::debug!(session_id = %event.session_id(), "Focus mode, ignoring event");
            return;
        }
        let envelope = event.into_envelope();
        self.store.handle_event(&envelope, &self.i18n);
        self.refresh();
    }

    /// Fire every reversion whose deadline has passed
    pub fn fire_due_reversions(&mut self) -> bool {
        let changed = self.store.fire_due();
        if changed {
            self.refresh();
        }
        changed
    }

    /// Expire quiet sessions
    pub fn cleanup(&mut self) -> bool {
        let removed = self.store.cleanup();
        if removed {
            self.refresh();
        }
        removed
    }

    /// Drop all sessions
    pub fn reset(&mut self) {
        self.store.reset();
        self.refresh();
    }

    /// Switch theme; unknown ids are ignored
    pub async fn set_theme(&mut self, id: &str) -> bool {
        let changed = self.themes.set_theme(id, self.prefs.as_mut()).await;
        if changed {
            self.refresh();
        }
        changed
    }

    /// Advance to the next theme in list order
    pub async fn cycle_theme(&mut self) -> bool {
        match self.themes.next_theme_id().map(str::to_string) {
            Some(id) => self.set_theme(&id).await,
            None => false,
        }
    }

    /// Switch language; unknown codes are ignored
    pub fn set_language(&mut self, code: &str) -> bool {
        let changed = self.i18n.set_language(code, self.prefs.as_mut());
        if changed {
            self.refresh();
        }
        changed
    }

    /// Advance to the next language in manifest order
    pub fn cycle_language(&mut self) -> bool {
        match self.i18n.next_language().map(str::to_string) {
            Some(code) => self.set_language(&code),
            None => false,
        }
    }

    /// Enter or leave focus mode. Entering drops all sessions.
    pub fn set_quiet_mode(&mut self, quiet: bool) {
        if self.quiet == quiet {
            return;
        }
        self.quiet = quiet;
        tracing::info!(quiet, "Focus mode changed");
        if quiet {
            self.store.reset();
        }
        self.refresh();
    }

    /// Whether focus mode is on
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Earliest pending reversion deadline (clock ms)
    pub fn next_deadline(&self) -> Option<u64> {
        self.store.next_deadline()
    }

    /// Current view, without rendering it
    pub fn view(&self) -> DisplayView {
        let now = self.store.now();
        project(
            self.store.sessions(),
            now,
            self.store.timings().session_timeout_ms(),
            &self.themes,
            &self.i18n,
        )
    }

    /// Project and hand the view to the renderer
    pub fn refresh(&mut self) {
        let view = self.view();
        self.renderer.render(&view);
    }

    /// Session store
    pub fn sessions(&self) -> &SessionStore<C> {
        &self.store
    }

    /// Theme registry
    pub fn themes(&self) -> &ThemeRegistry {
        &self.themes
    }

    /// Localizer
    pub fn i18n(&self) -> &Localizer {
        &self.i18n
    }

    /// Renderer
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Renderer, mutably
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}
