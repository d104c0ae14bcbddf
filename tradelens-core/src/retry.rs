//! Exponential backoff schedule shared by the HTTP clients.

use std::time::Duration;

/// Retry schedule: attempt 0 runs immediately, attempt `n` waits `base * 2^(n-1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Backoff {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// No retries, no waiting.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Delay before `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt - 1))
    }

    /// Attempts `0..=max_retries`.
    pub fn attempts(&self) -> std::ops::RangeInclusive<u32> {
        0..=self.max_retries
    }

    /// Sleep for the delay before `attempt`.
    pub fn wait(&self, attempt: u32) {
        let delay = self.delay(attempt);
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}
