//! ---
//! conduit_section: "01-core-functionality"
//! conduit_subsection: "module"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "Shared primitives and utilities for the dispatching core."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

/// Largest absolute expiry date (epoch milliseconds) carried on the wire.
pub const MAX_EXPIRY_DATE_MS: i64 = i64::MAX;

/// Source of wall-clock time in epoch milliseconds.
///
/// Expiry dates, discovery timestamps and subscription validity windows are
/// all computed against a `Clock` so tests can pin time.
pub trait Clock: Debug + Send + Sync {
    /// Current time as milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    /// Shared handle, convenient for constructors taking `Arc<dyn Clock>`.
    pub fn shared() -> Arc<dyn Clock> {
        Arc::new(SystemClock)
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Manually driven clock for deterministic tests and simulations.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    /// Clock frozen at `now_ms` until moved.
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
        }
    }

    /// Jump to `now_ms`, backwards included.
    ///
    /// ```
    /// use conduit_common::time::{Clock, ManualClock};
    ///
    /// let clock = ManualClock::new(5_000);
    /// clock.set(1_000);
    /// assert_eq!(clock.now_ms(), 1_000);
    /// ```
    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    /// Move forward by `by`, saturating at `i64::MAX`.
    pub fn advance(&self, by: Duration) {
        let delta = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        let _ = self
            .now_ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(delta))
            });
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Absolute expiry for a message sent at `now_ms` with the given time-to-live,
/// saturating at [`MAX_EXPIRY_DATE_MS`].
pub fn expiry_from_ttl(now_ms: i64, ttl: Duration) -> i64 {
    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(MAX_EXPIRY_DATE_MS);
    now_ms.saturating_add(ttl_ms).min(MAX_EXPIRY_DATE_MS)
}
