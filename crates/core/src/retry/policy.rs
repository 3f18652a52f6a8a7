use std::time::Duration;

use super::error::RetryError;

/// Bounds for resubmitting unprocessed requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of submit calls allowed for one chunk, the first included.
    pub max_attempts: u32,
    /// Delay before the first resubmission.
    pub base_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_millis(4000),
        }
    }
}

impl RetryPolicy {
    /// Rejects policies that could never submit or whose base exceeds the cap.
    pub fn validate(&self) -> Result<(), RetryError> {
        if self.max_attempts == 0 {
            return Err(RetryError::InvalidPolicy(
                "max attempts must be at least 1".to_string(),
            ));
        }
        if self.base_delay > self.max_delay {
            return Err(RetryError::InvalidPolicy(format!(
                "base delay {:?} exceeds max delay {:?}",
                self.base_delay, self.max_delay
            )));
        }
        Ok(())
    }

    /// Delay after a failed submit with `attempt` retries already performed.
    ///
    /// `min(base * 2^attempt, max)`. Overflow saturates to `max`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(base_ms: u64, max_ms: u64) -> RetryPolicy {
        RetryPolicy {
            max_attempts: 8,
            base_delay: Duration::from_millis(base_ms),
            max_delay: Duration::from_millis(max_ms),
        }
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = policy(250, 4000);
        let delays: Vec<u128> = (0..6).map(|a| policy.backoff_delay(a).as_millis()).collect();
        assert_eq!(delays, vec![250, 500, 1000, 2000, 4000, 4000]);
    }

    #[test]
    fn test_backoff_never_exceeds_cap() {
        let policy = policy(250, 4000);
        assert!(policy.backoff_delay(10) <= Duration::from_millis(4000));
        for attempt in [31, 32, 64, u32::MAX] {
            assert_eq!(policy.backoff_delay(attempt), Duration::from_millis(4000));
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 8);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
        assert_eq!(policy.max_delay, Duration::from_millis(4000));
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_invalid_policies() {
        let mut zero = RetryPolicy::default();
        zero.max_attempts = 0;
        assert!(matches!(zero.validate(), Err(RetryError::InvalidPolicy(_))));

        assert!(matches!(
            policy(5000, 4000).validate(),
            Err(RetryError::InvalidPolicy(_))
        ));
    }
}
