//! Handshake retry policy.
//!
//! Capped exponential backoff with jitter: the delay after the `n`th failed
//! attempt is `min(max_delay, initial_delay * 2^(n-1))`, scaled by a random
//! factor in `[0.5, 1.0]` so that many clients do not reconnect in lockstep.

use std::time::Duration;

use rand::Rng;

/// Largest exponent applied to the initial delay
const MAX_EXPONENT: u32 = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Attempts made per `connect()`; never less than one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Un-jittered delay after failed attempt `failed` (1-based).
    pub fn base_delay(&self, failed: u32) -> Duration {
        let exponent = failed.saturating_sub(1).min(MAX_EXPONENT);
        self.initial_delay
            .saturating_mul(2u32.pow(exponent))
            .min(self.max_delay)
    }

    /// Delay to wait after failed attempt `failed` (1-based).
    pub fn delay(&self, failed: u32) -> Duration {
        let factor = rand::thread_rng().gen_range(0.5..=1.0);
        self.base_delay(failed).mul_f64(factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLACK: Duration = Duration::from_micros(1);

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 5,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1000),
        }
    }

    #[test]
    fn test_base_delay_doubles_then_caps() {
        let policy = policy();
        assert_eq!(policy.base_delay(1), Duration::from_millis(100));
        assert_eq!(policy.base_delay(2), Duration::from_millis(200));
        assert_eq!(policy.base_delay(4), Duration::from_millis(800));
        assert_eq!(policy.base_delay(5), Duration::from_millis(1000));
        assert_eq!(policy.base_delay(40), Duration::from_millis(1000));
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let policy = policy();
        for failed in 1..=6 {
            let base = policy.base_delay(failed);
            for _ in 0..50 {
                let delay = policy.delay(failed);
                // float scaling may be off by a nanosecond
                assert!(delay <= base + SLACK);
                assert!(delay + SLACK >= base / 2);
            }
        }
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let policy = RetryPolicy {
            max_attempts: 0,
            ..policy()
        };
        assert_eq!(policy.attempts(), 1);
    }
}
