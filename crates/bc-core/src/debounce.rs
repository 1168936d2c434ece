//! Keyed minimum-spacing filter for bouncy inputs.
//!
//! Physical buttons emit several edges per press. Producers run each edge
//! through a [`Debouncer`] before enqueuing a [`ClockEvent`](crate::ClockEvent),
//! so the tracker never sees the bounces.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Default minimum spacing between two events with the same key (300ms).
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Drops events that follow the previous admitted event of the same key too
/// closely.
#[derive(Debug, Clone)]
pub struct Debouncer<K> {
    spacing: Duration,
    last_admitted: HashMap<K, Instant>,
}

impl<K: Eq + Hash> Debouncer<K> {
    /// Creates a debouncer with the given minimum spacing.
    #[must_use]
    pub fn new(spacing: Duration) -> Self {
        Self {
            spacing,
            last_admitted: HashMap::new(),
        }
    }

    /// Returns `true` if an event for `key` at `now` should be let through.
    ///
    /// Rejected events do not extend the window.
    pub fn admit(&mut self, key: K, now: Instant) -> bool {
        if let Some(last) = self.last_admitted.get(&key) {
            if now.saturating_duration_since(*last) < self.spacing {
                return false;
            }
        }
        self.last_admitted.insert(key, now);
        true
    }

    /// Returns the configured spacing.
    #[must_use]
    pub const fn spacing(&self) -> Duration {
        self.spacing
    }
}

impl<K: Eq + Hash> Default for Debouncer<K> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
