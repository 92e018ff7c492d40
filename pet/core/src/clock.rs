//! Clock Abstraction
//!
//! The engine never reads the system time directly. Every timestamp
//! (`last_seen_at`, reversion deadlines, expiry checks) comes from a [`Clock`],
//! so the reconciler can be driven deterministically in tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Source of wall-clock time in milliseconds
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch.
    ///
    /// Implementations must never go backwards within one process;
    /// [`SystemClock`] clamps wall time to enforce this.
    fn now_ms(&self) -> u64;
}

/// Production clock backed by the system time
///
/// Wall time can step backwards (NTP, manual changes), so readings are
/// clamped to the highest value already returned. Clones share that floor.
#[derive(Clone, Debug, Default)]
pub struct SystemClock {
    floor: Arc<AtomicU64>,
}

impl SystemClock {
    /// Highest of `wall_ms` and every earlier reading
    fn clamp(&self, wall_ms: u64) -> u64 {
        self.floor.fetch_max(wall_ms, Ordering::SeqCst).max(wall_ms)
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        let wall = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default();
        self.clamp(wall)
    }
}

/// Manually advanced clock for tests and simulations
///
/// Clones share the same underlying time, so a test can keep one handle while
/// the engine owns another.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock frozen at `start_ms`
    #[must_use]
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        let ms = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    /// Jump to an absolute time (ignored if it would go backwards)
    pub fn set(&self, ms: u64) {
        self.now.fetch_max(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
