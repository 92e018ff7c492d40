//! Main Application
//!
//! The App is a thin driver around the engine:
//! - Terminal events become user commands (theme, language, focus, reset)
//! - Hook events from the listener go straight to [`Pet::handle_event`]
//! - The next reversion deadline and the cleanup tick wake the loop
//! - A frame is drawn only when the engine produced a different view
//!
//! Nothing here polls on a fixed frame rate; the loop sleeps until one of
//! its wake-up sources fires.

use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use pet_core::{Clock, HookEvent, Pet, SystemClock};

use crate::display::DisplayState;
use crate::ui::{self, KeyHints};

/// Main application state
pub struct App<C: Clock = SystemClock> {
    /// The engine, rendering into our display state
    pet: Pet<C, DisplayState>,
    /// Parsed hook events from the listener
    events: mpsc::Receiver<HookEvent>,
    /// Is the app still running?
    running: bool,
}

impl<C: Clock> App<C> {
    /// Wrap an initialized engine
    pub fn new(pet: Pet<C, DisplayState>, events: mpsc::Receiver<HookEvent>) -> Self {
        Self {
            pet,
            events,
            running: true,
        }
    }

    /// The wrapped engine
    pub fn pet(&self) -> &Pet<C, DisplayState> {
        &self.pet
    }

    /// False once a quit key was pressed or the terminal closed
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Main event loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();

        let mut cleanup = tokio::time::interval(self.pet.sessions().timings().cleanup_interval);
        cleanup.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        cleanup.tick().await;

        self.pet.renderer_mut().mark_dirty();
        self.draw(terminal)?;

        while self.running {
            let wakeup = self.next_wakeup();

            tokio::select! {
                biased;

                // Terminal events - highest priority
                maybe_event = event_stream.next() => match maybe_event {
                    // Only handle Press events (not Release or Repeat)
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key).await;
                    }
                    Some(Ok(Event::Resize(_, _))) => self.pet.renderer_mut().mark_dirty(),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => tracing::warn!(error = %e, "Terminal event error"),
                    None => {
                        tracing::info!("Terminal event stream ended");
                        self.running = false;
                    }
                },

                Some(event) = self.events.recv() => self.handle_hook_event(event),

                () = tokio::time::sleep_until(wakeup.unwrap_or_else(Instant::now)), if wakeup.is_some() => {
                    self.on_deadline();
                }

                _ = cleanup.tick() => {
                    if self.pet.cleanup() {
                        tracing::debug!(remaining = self.pet.sessions().len(), "Expired idle sessions");
                    }
                }
            }

            if self.pet.renderer().is_dirty() {
                self.draw(terminal)?;
            }
        }

        Ok(())
    }

    /// Apply one hook event
    pub fn handle_hook_event(&mut self, event: HookEvent) {
        tracing::debug!(session_id = %event.session_id(), "Hook event");
        self.pet.handle_event(event);
    }

    /// A reversion deadline passed
    pub fn on_deadline(&mut self) {
        if !self.pet.fire_due_reversions() {
            tracing::trace!("Woke for a reversion that was not due");
        }
    }

    /// Handle keyboard input
    pub async fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('r') => self.pet.reset(),
            KeyCode::Char('t') => {
                if !self.pet.cycle_theme().await {
                    tracing::debug!("No other theme to switch to");
                }
            }
            KeyCode::Char('l') => {
                self.pet.cycle_language();
                // Key hints are localized too
                self.pet.renderer_mut().mark_dirty();
            }
            KeyCode::Char('f') => {
                let quiet = !self.pet.is_quiet();
                self.pet.set_quiet_mode(quiet);
                self.pet.renderer_mut().mark_dirty();
            }
            _ => {}
        }
    }

    /// Draw the latest view
    pub fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let view = match self.pet.renderer().view() {
            Some(view) => view.clone(),
            None => self.pet.view(),
        };
        let hints = KeyHints::from_localizer(self.pet.i18n());
        let quiet = self.pet.is_quiet();

        terminal.draw(|frame| ui::draw(frame, &view, &hints, quiet))?;
        self.pet.renderer_mut().mark_drawn();
        Ok(())
    }

    /// When the earliest pending reversion is due
    fn next_wakeup(&self) -> Option<Instant> {
        let deadline = self.pet.next_deadline()?;
        let now = self.pet.sessions().now();
        Some(Instant::now() + Duration::from_millis(deadline.saturating_sub(now)))
    }
}
