use std::time::Duration;

use crate::client::consts::{MAX_RECONNECT_ATTEMPTS, RECONNECT_BASE_MS};

/// Exponential reconnection delay: `base * 2^attempt`, uncapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max_attempts: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(RECONNECT_BASE_MS), MAX_RECONNECT_ATTEMPTS)
    }
}

impl Backoff {
    pub fn new(base: Duration, max_attempts: u32) -> Self {
        Self { base, max_attempts }
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before reconnection attempt number `attempt` (zero based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor)
    }

    pub fn exhausted(&self, attempts: u32) -> bool {
        attempts >= self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delays() {
        let backoff = Backoff::default();
        let delays: Vec<u64> = (0..5).map(|a| backoff.delay(a).as_millis() as u64).collect();
        assert_eq!(delays, vec![2000, 4000, 8000, 16000, 32000]);
        assert_eq!(backoff.max_attempts(), 5);
    }

    #[test]
    fn test_exhausted() {
        let backoff = Backoff::default();
        assert!(!backoff.exhausted(4));
        assert!(backoff.exhausted(5));
    }

    #[test]
    fn test_huge_attempt_saturates() {
        let backoff = Backoff::new(Duration::from_secs(1), 100);
        assert_eq!(backoff.delay(40), Duration::from_secs(1).saturating_mul(u32::MAX));
    }
}
