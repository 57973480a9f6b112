use std::time::Duration;

/// How long to wait between two probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayStrategy {
    Constant(Duration),
    /// `initial * multiplier^(attempt - 1)`, capped at `max`.
    Exponential {
        initial: Duration,
        max: Duration,
        multiplier: u32,
    },
}

/// Supplies polling delays and enforces the overall stabilization budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffScheduler {
    strategy: DelayStrategy,
    timeout: Duration,
    max_attempts: Option<u32>,
}

impl BackoffScheduler {
    pub const fn new(strategy: DelayStrategy, timeout: Duration) -> Self {
        Self {
            strategy,
            timeout,
            max_attempts: None,
        }
    }

    pub const fn constant(delay: Duration, timeout: Duration) -> Self {
        Self::new(DelayStrategy::Constant(delay), timeout)
    }

    pub const fn exponential(
        initial: Duration,
        max: Duration,
        multiplier: u32,
        timeout: Duration,
    ) -> Self {
        Self::new(
            DelayStrategy::Exponential {
                initial,
                max,
                multiplier,
            },
            timeout,
        )
    }

    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_strategy(mut self, strategy: DelayStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> DelayStrategy {
        self.strategy
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// Delay to wait after probe number `attempt` (1-based).
    pub fn next_delay(&self, attempt: u32) -> Duration {
        match self.strategy {
            DelayStrategy::Constant(delay) => delay,
            DelayStrategy::Exponential {
                initial,
                max,
                multiplier,
            } => {
                let exponent = attempt.saturating_sub(1).min(31);
                initial
                    .checked_mul(multiplier.saturating_pow(exponent))
                    .map_or(max, |delay| delay.min(max))
            }
        }
    }

    /// Delay before the next probe, or `None` once the budget is spent:
    /// either `attempts` already reached `max_attempts`, or sleeping would
    /// carry the total elapsed time past the timeout.
    pub fn admit(&self, attempts: u32, elapsed: Duration) -> Option<Duration> {
        if self.max_attempts.is_some_and(|max| attempts >= max) {
            return None;
        }
        let delay = self.next_delay(attempts);
        match elapsed.checked_add(delay) {
            Some(total) if total <= self.timeout => Some(delay),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn test_constant_delay_is_flat() {
        let scheduler = BackoffScheduler::constant(5 * SECOND, 60 * SECOND);
        assert_eq!(scheduler.next_delay(1), 5 * SECOND);
        assert_eq!(scheduler.next_delay(40), 5 * SECOND);
    }

    #[test]
    fn test_exponential_delay_is_capped() {
        let scheduler = BackoffScheduler::exponential(SECOND, 10 * SECOND, 2, 600 * SECOND);
        assert_eq!(scheduler.next_delay(1), SECOND);
        assert_eq!(scheduler.next_delay(2), 2 * SECOND);
        assert_eq!(scheduler.next_delay(4), 8 * SECOND);
        assert_eq!(scheduler.next_delay(5), 10 * SECOND);
        assert_eq!(scheduler.next_delay(u32::MAX), 10 * SECOND);
    }

    #[test]
    fn test_admit_stops_before_timeout_is_crossed() {
        let scheduler = BackoffScheduler::constant(5 * SECOND, 12 * SECOND);
        assert_eq!(scheduler.admit(1, Duration::ZERO), Some(5 * SECOND));
        assert_eq!(scheduler.admit(2, 7 * SECOND), Some(5 * SECOND));
        assert_eq!(scheduler.admit(3, 8 * SECOND), None);
    }

    #[test]
    fn test_admit_respects_attempt_ceiling() {
        let scheduler = BackoffScheduler::constant(SECOND, 3600 * SECOND).with_max_attempts(3);
        assert!(scheduler.admit(2, Duration::ZERO).is_some());
        assert!(scheduler.admit(3, Duration::ZERO).is_none());
    }
}
