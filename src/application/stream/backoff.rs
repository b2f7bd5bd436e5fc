//! Reconnect delay schedule.

use std::time::Duration;

/// Exponential backoff: starts at `min`, doubles per consecutive failure,
/// capped at `max`, and returns to `min` on [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct Backoff {
    min: Duration,
    max: Duration,
    current: Duration,
    failures: u32,
}

impl Backoff {
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        let max = max.max(min);
        Self {
            min,
            max,
            current: min,
            failures: 0,
        }
    }

    /// Delay before the next attempt; advances the schedule.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.failures = self.failures.saturating_add(1);
        self.current = self
            .current
            .checked_mul(2)
            .map_or(self.max, |next| next.min(self.max));
        delay
    }

    /// Back to the minimum delay after a successful connection.
    pub fn reset(&mut self) {
        self.current = self.min;
        self.failures = 0;
    }

    /// Consecutive failures since the last reset.
    #[must_use]
    pub fn failures(&self) -> u32 {
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected(k: u32, d0: Duration, dmax: Duration) -> Duration {
        d0.checked_mul(2u32.saturating_pow(k - 1)).map_or(dmax, |d| d.min(dmax))
    }

    #[test]
    fn delays_double_up_to_cap() {
        let d0 = Duration::from_secs(2);
        let dmax = Duration::from_secs(60);
        let mut backoff = Backoff::new(d0, dmax);

        let delays: Vec<u64> = (0..8).map(|_| backoff.next_delay().as_secs()).collect();
        assert_eq!(delays, vec![2, 4, 8, 16, 32, 60, 60, 60]);

        let mut backoff = Backoff::new(d0, dmax);
        for k in 1..=40 {
            assert_eq!(backoff.next_delay(), expected(k, d0, dmax), "attempt {k}");
        }
    }

    #[test]
    fn reset_returns_to_minimum() {
        let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(1));
        backoff.next_delay();
        backoff.next_delay();
        assert_eq!(backoff.failures(), 2);

        backoff.reset();
        assert_eq!(backoff.failures(), 0);
        assert_eq!(backoff.next_delay(), Duration::from_millis(100));
        assert_eq!(backoff.next_delay(), Duration::from_millis(200));
    }
}
