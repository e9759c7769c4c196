//! Exponential backoff with jitter.

use std::time::Duration;
use rand::Rng;

use crate::config::BackoffConfig;

/// Exponential backoff whose base delay grows by `multiplier` after every
/// call, capped at `max`, with `+/- jitter` applied to each returned delay.
#[derive(Debug, Clone)]
pub struct SimpleBackoff {
    current: Duration,
    min: Duration,
    max: Duration,
    multiplier: f64,
    jitter: f64,
}

impl SimpleBackoff {
    /// Create a backoff starting at `min`.
    ///
    /// `jitter` is clamped to `[0, 1)` and `multiplier` to at least 1.
    pub fn new(min: Duration, max: Duration, jitter: f64, multiplier: f64) -> Self {
        let max = max.max(min);
        Self {
            current: min,
            min,
            max,
            multiplier: if multiplier.is_nan() { 1.0 } else { multiplier.max(1.0) },
            jitter: if jitter.is_nan() { 0.0 } else { jitter.clamp(0.0, 0.999) },
        }
    }

    /// Un-jittered delay the next call to [`duration`](Self::duration) is based on.
    pub fn base(&self) -> Duration {
        self.current
    }

    /// Next delay to wait. Advances the base delay.
    pub fn duration(&mut self) -> Duration {
        let base = self.current;
        self.current = scale(base, self.multiplier).min(self.max);
        add_jitter(base, self.jitter)
    }

    /// Return to the initial delay.
    pub fn reset(&mut self) {
        self.current = self.min;
    }
}

impl From<&BackoffConfig> for SimpleBackoff {
    fn from(config: &BackoffConfig) -> Self {
        Self::new(
            Duration::from_millis(config.initial_delay_ms),
            Duration::from_millis(config.max_delay_ms),
            config.jitter,
            config.multiplier,
        )
    }
}

/// Scale `delay` by a random factor in `[1 - jitter, 1 + jitter)`.
fn add_jitter(delay: Duration, jitter: f64) -> Duration {
    if jitter <= 0.0 || delay.is_zero() {
        return delay;
    }
    let factor = rand::thread_rng().gen_range((1.0 - jitter)..(1.0 + jitter));
    scale(delay, factor)
}

/// Multiply a duration by a non-negative factor, rounding to whole nanoseconds.
fn scale(delay: Duration, factor: f64) -> Duration {
    // `as` saturates, so huge products clamp to u64::MAX nanoseconds.
    Duration::from_nanos((delay.as_nanos() as f64 * factor).round() as u64)
}
