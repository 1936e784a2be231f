use std::time::{Duration, Instant};

use log::trace;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Holds the latest input until it has been quiet for `delay`.
///
/// The caller supplies the clock, so the debouncer never sleeps or spawns;
/// it is polled from the same loop that feeds it.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Queues `value`, replacing and cancelling whatever was pending.
    pub fn push(&mut self, value: T, now: Instant) {
        if self.pending.is_some() {
            trace!("Debounce: pending input replaced");
        }
        self.pending = Some((value, now));
    }

    /// Returns the pending value once `delay` has passed since the last push.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let settled = matches!(
            &self.pending,
            Some((_, pushed_at)) if now.saturating_duration_since(*pushed_at) >= self.delay
        );

        match settled {
            true => self.flush(),
            false => None,
        }
    }

    /// Time left before a pending value settles.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending.as_ref().map(|(_, pushed_at)| {
            self.delay
                .saturating_sub(now.saturating_duration_since(*pushed_at))
        })
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Takes the pending value without waiting.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
