//! Session Store & Reconciler
//!
//! Tracks every live assistant session and the state it is showing.
//!
//! # Design Philosophy
//!
//! The store owns both the session mapping and the idle-reversion timers, so
//! nothing else can mutate them. Timers are plain deadlines keyed by session
//! id: the driver asks for [`SessionStore::next_deadline`], waits, and calls
//! [`SessionStore::fire_due`]. Scheduling always replaces the session's
//! previous deadline, so a session never has more than one pending reversion.
//!
//! All operations run to completion on the caller's thread and never fail.

use std::collections::HashMap;
use std::time::Duration;

use crate::classifier::classify;
use crate::clock::Clock;
use crate::config::{duration_ms, Timings};
use crate::events::{Envelope, EventKind, ToolOutcome};
use crate::i18n::Localizer;
use crate::states::State;

/// Rotating label alphabet, assigned in creation order
pub const LABELS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// One tracked assistant session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    /// External session id
    pub id: String,
    /// Display label
    pub label: char,
    /// What the session is currently showing
    pub state: State,
    /// Time of the last event for this session (ms)
    pub last_seen_at: u64,
}

impl Session {
    /// Milliseconds since the last event, as of `now`
    pub fn idle_for(&self, now: u64) -> u64 {
        now.saturating_sub(self.last_seen_at)
    }
}

/// A pending reversion to idle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ReversionTimer {
    due_at: u64,
}

/// Owner of all session state and reversion timers
#[derive(Debug)]
pub struct SessionStore<C: Clock> {
    clock: C,
    timings: Timings,
    /// Creation order
    sessions: Vec<Session>,
    timers: HashMap<String, ReversionTimer>,
    labels_assigned: usize,
}

impl<C: Clock> SessionStore<C> {
    /// Create an empty store
    pub fn new(clock: C, timings: Timings) -> Self {
        Self {
            clock,
            timings,
            sessions: Vec::new(),
            timers: HashMap::new(),
            labels_assigned: 0,
        }
    }

    /// The store's clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Current time according to the store's clock
    pub fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Timing constants in use
    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    /// Apply one event to its session, creating the session if needed.
    ///
    /// Returns the session's new state.
    pub fn handle_event(&mut self, envelope: &Envelope, i18n: &Localizer) -> &State {
        let now = self.clock.now_ms();
        let state = classify(&envelope.kind, i18n);
        let id = envelope.session_id.as_str();

        let idx = match self.position(id) {
            Some(idx) => idx,
            None => self.create(id, now),
        };

        tracing::debug!(
            session_id = %id,
            state = %state.id,
            "Session state updated"
        );

        let delay = match &envelope.kind {
            EventKind::PostToolUse {
                outcome: ToolOutcome::Success,
            } => Some(self.timings.success_revert),
            EventKind::PostToolUse {
                outcome: ToolOutcome::Failure,
            } => Some(self.timings.error_revert),
            EventKind::Stop => Some(self.timings.stop_revert),
            _ => None,
        };
        self.reschedule(id, now, delay);

        let session = &mut self.sessions[idx];
        session.state = state;
        session.last_seen_at = now;
        &session.state
    }

    fn create(&mut self, id: &str, now: u64) -> usize {
        let label = char::from(LABELS[self.labels_assigned % LABELS.len()]);
        self.labels_assigned += 1;

        tracing::info!(session_id = %id, label = %label, "New session");

        self.sessions.push(Session {
            id: id.to_string(),
            label,
            state: State::idle(),
            last_seen_at: now,
        });
        self.sessions.len() - 1
    }

    /// Cancel the session's pending reversion, then schedule a new one if
    /// `delay` is given. One step, so two timers never coexist.
    pub fn reschedule(&mut self, id: &str, now: u64, delay: Option<Duration>) {
        match delay {
            Some(delay) => {
                let due_at = now.saturating_add(duration_ms(delay));
                self.timers.insert(id.to_string(), ReversionTimer { due_at });
            }
            None => {
                self.timers.remove(id);
            }
        }
    }

    /// Cancel the session's pending reversion, if any
    pub fn cancel(&mut self, id: &str) -> bool {
        self.timers.remove(id).is_some()
    }

    /// Deadline of the pending reversion for `id`
    pub fn deadline_for(&self, id: &str) -> Option<u64> {
        self.timers.get(id).map(|t| t.due_at)
    }

    /// Earliest pending reversion deadline
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.values().map(|t| t.due_at).min()
    }

    /// Number of pending reversions
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Fire every reversion whose deadline has passed.
    ///
    /// A fired reversion sets the session to idle only if the session still
    /// exists and has been quiet for at least the reversion guard; otherwise
    /// it is dropped. Returns `true` if any session changed.
    pub fn fire_due(&mut self) -> bool {
        let now = self.clock.now_ms();
        let due: Vec<String> = self
            .timers
            .iter()
            .filter(|(_, t)| t.due_at <= now)
            .map(|(id, _)| id.clone())
            .collect();

        let guard = duration_ms(self.timings.reversion_guard);
        let mut changed = false;
        for id in due {
            self.timers.remove(&id);

            let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) else {
                continue;
            };
            if session.idle_for(now) < guard {
                tracing::debug!(session_id = %id, "Reversion skipped, session recently active");
                continue;
            }

            tracing::debug!(session_id = %id, from = %session.state.id, "Reverting to idle");
            session.state = State::idle();
            changed = true;
        }
        changed
    }

    /// Remove sessions quiet for longer than the session timeout.
    ///
    /// Returns `true` if anything was removed.
    pub fn cleanup(&mut self) -> bool {
        let now = self.clock.now_ms();
        let timeout = self.timings.session_timeout_ms();

        let before = self.sessions.len();
        let timers = &mut self.timers;
        self.sessions.retain(|s| {
            let keep = s.idle_for(now) <= timeout;
            if !keep {
                tracing::info!(session_id = %s.id, label = %s.label, "Session expired");
                timers.remove(&s.id);
            }
            keep
        });
        before != self.sessions.len()
    }

    /// Drop every session and timer and restart labels at `A`
    pub fn reset(&mut self) {
        tracing::info!(sessions = self.sessions.len(), "Resetting sessions");
        self.sessions.clear();
        self.timers.clear();
        self.labels_assigned = 0;
    }

    /// Look up a session
    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == id)
    }

    /// All sessions in creation order
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Sessions seen within the timeout as of `now`, in creation order
    pub fn active(&self, now: u64) -> impl Iterator<Item = &Session> {
        let timeout = self.timings.session_timeout_ms();
        self.sessions
            .iter()
            .filter(move |s| s.idle_for(now) <= timeout)
    }

    /// Number of tracked sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sessions are tracked
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::events::HookEvent;
    use crate::states::StateId;
    use serde_json::json;

    const T0: u64 = 1_000_000;

    fn store() -> (SessionStore<ManualClock>, ManualClock) {
        let clock = ManualClock::new(T0);
        (SessionStore::new(clock.clone(), Timings::default()), clock)
    }

    fn apply(store: &mut SessionStore<ManualClock>, event: HookEvent) -> StateId {
        store
            .handle_event(&event.into_envelope(), &Localizer::new())
            .id
    }

    fn state_of(store: &SessionStore<ManualClock>, id: &str) -> StateId {
        store.get(id).map(|s| s.state.id).unwrap()
    }

    #[test]
    fn test_first_event_creates_session() {
        let (mut store, _) = store();
        assert!(store.is_empty());

        assert_eq!(apply(&mut store, HookEvent::pre_tool_use("s1", "Read")), StateId::Read);
        let session = store.get("s1").unwrap();
        assert_eq!(session.label, 'A');
        assert_eq!(session.last_seen_at, T0);
        assert_eq!(store.pending_timers(), 0);
    }

    #[test]
    fn test_missing_session_id_groups_under_unknown() {
        let (mut store, _) = store();
        apply(&mut store, HookEvent::default());
        assert!(store.get("unknown").is_some());
    }

    #[test]
    fn test_reversion_delays_by_outcome() {
        let (mut store, _) = store();

        apply(&mut store, HookEvent::post_tool_use("ok", Some(json!({"success": true}))));
        apply(&mut store, HookEvent::post_tool_use("bad", Some(json!({"success": false}))));
        apply(&mut store, HookEvent::stop("done"));

        assert_eq!(store.deadline_for("ok"), Some(T0 + 1_500));
        assert_eq!(store.deadline_for("bad"), Some(T0 + 3_000));
        assert_eq!(store.deadline_for("done"), Some(T0 + 5_000));
        assert_eq!(store.next_deadline(), Some(T0 + 1_500));
    }

    #[test]
    fn test_success_reverts_to_idle() {
        let (mut store, clock) = store();
        apply(&mut store, HookEvent::pre_tool_use("s1", "Read"));
        apply(&mut store, HookEvent::post_tool_use("s1", Some(json!({"success": true}))));
        assert_eq!(state_of(&store, "s1"), StateId::Success);

        clock.advance(Duration::from_millis(1_499));
        assert!(!store.fire_due());
        assert_eq!(state_of(&store, "s1"), StateId::Success);

        clock.advance(Duration::from_millis(1));
        assert!(store.fire_due());
        assert_eq!(state_of(&store, "s1"), StateId::Idle);
        assert_eq!(store.next_deadline(), None);
    }

    #[test]
    fn test_fresh_event_cancels_pending_reversion() {
        let (mut store, clock) = store();
        apply(&mut store, HookEvent::post_tool_use("s1", None));
        clock.advance(Duration::from_millis(1_000));
        apply(&mut store, HookEvent::pre_tool_use("s1", "Bash"));
        assert_eq!(store.pending_timers(), 0);

        clock.advance(Duration::from_millis(5_000));
        assert!(!store.fire_due());
        assert_eq!(state_of(&store, "s1"), StateId::Bash);
    }

    #[test]
    fn test_reschedule_replaces_previous_timer() {
        let (mut store, clock) = store();
        apply(&mut store, HookEvent::stop("s1"));
        clock.advance(Duration::from_millis(1_000));
        apply(&mut store, HookEvent::post_tool_use("s1", None));

        assert_eq!(store.pending_timers(), 1);
        assert_eq!(store.deadline_for("s1"), Some(T0 + 1_000 + 1_500));
    }

    #[test]
    fn test_guard_blocks_reversion_for_recent_activity() {
        let (mut store, clock) = store();
        let timings = Timings {
            success_revert: Duration::from_millis(500),
            ..Timings::default()
        };
        store.timings = timings;

        apply(&mut store, HookEvent::post_tool_use("s1", None));
        clock.advance(Duration::from_millis(500));

        // Due, but the session was seen less than the guard ago
        assert!(!store.fire_due());
        assert_eq!(state_of(&store, "s1"), StateId::Success);
        assert_eq!(store.pending_timers(), 0);
    }

    #[test]
    fn test_guard_blocks_when_last_seen_moves_without_reschedule() {
        let (mut store, clock) = store();
        apply(&mut store, HookEvent::post_tool_use("s1", None));
        clock.advance(Duration::from_millis(1_200));

        // Touch last_seen without disturbing the timer
        store.sessions[0].last_seen_at = clock.now_ms();
        clock.advance(Duration::from_millis(300));

        assert!(!store.fire_due());
        assert_eq!(state_of(&store, "s1"), StateId::Success);
    }

    #[test]
    fn test_reversion_for_removed_session_is_noop() {
        let (mut store, clock) = store();
        apply(&mut store, HookEvent::stop("s1"));
        store.sessions.clear();

        clock.advance(Duration::from_millis(5_000));
        assert!(!store.fire_due());
        assert!(store.is_empty());
    }

    #[test]
    fn test_late_firing_still_reverts() {
        let (mut store, clock) = store();
        apply(&mut store, HookEvent::post_tool_use("s1", Some(json!({"success": false}))));
        clock.advance(Duration::from_millis(20_000));
        assert!(store.fire_due());
        assert_eq!(state_of(&store, "s1"), StateId::Idle);
    }

    #[test]
    fn test_cleanup_expires_quiet_sessions() {
        let (mut store, clock) = store();
        apply(&mut store, HookEvent::pre_tool_use("old", "Read"));
        clock.advance(Duration::from_millis(30_000));
        apply(&mut store, HookEvent::stop("new"));

        clock.advance(Duration::from_millis(30_000));
        // old is exactly at the timeout: still kept
        assert!(!store.cleanup());
        assert_eq!(store.len(), 2);

        clock.advance(Duration::from_millis(1));
        assert!(store.cleanup());
        assert!(store.get("old").is_none());
        assert!(store.get("new").is_some());
    }

    #[test]
    fn test_cleanup_drops_timers_of_removed_sessions() {
        let (mut store, clock) = store();
        apply(&mut store, HookEvent::stop("s1"));
        clock.advance(Duration::from_millis(60_001));

        assert!(store.cleanup());
        assert_eq!(store.pending_timers(), 0);
    }

    #[test]
    fn test_labels_follow_creation_order_and_wrap() {
        let (mut store, _) = store();
        for n in 0..27 {
            apply(&mut store, HookEvent::pre_tool_use(&format!("s{n}"), "Read"));
        }
        assert_eq!(store.get("s0").unwrap().label, 'A');
        assert_eq!(store.get("s1").unwrap().label, 'B');
        assert_eq!(store.get("s25").unwrap().label, 'Z');
        // 27th session collides with the first
        assert_eq!(store.get("s26").unwrap().label, 'A');

        // Revisiting a session keeps its label
        apply(&mut store, HookEvent::stop("s1"));
        assert_eq!(store.get("s1").unwrap().label, 'B');
    }

    #[test]
    fn test_reset_clears_everything_and_restarts_labels() {
        let (mut store, _) = store();
        apply(&mut store, HookEvent::stop("s1"));
        apply(&mut store, HookEvent::stop("s2"));

        store.reset();
        assert!(store.is_empty());
        assert_eq!(store.next_deadline(), None);

        apply(&mut store, HookEvent::pre_tool_use("s3", "Read"));
        assert_eq!(store.get("s3").unwrap().label, 'A');
    }

    #[test]
    fn test_active_filters_by_timeout() {
        let (mut store, clock) = store();
        apply(&mut store, HookEvent::pre_tool_use("a", "Read"));
        clock.advance(Duration::from_millis(60_001));
        apply(&mut store, HookEvent::pre_tool_use("b", "Read"));

        let active: Vec<&str> = store.active(clock.now_ms()).map(|s| s.id.as_str()).collect();
        assert_eq!(active, vec!["b"]);
    }
}
