//! Sliding-window admission control for the whole channel

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Default length of the history window
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(30);

/// Default ceiling on sustained commands per second
pub const DEFAULT_MAX_RATE: f64 = 0.66;

/// One executed command
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRecord {
    pub command: String,
    pub timestamp: Instant,
}

/// Result of an admission check
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission {
    Admitted,
    /// Observed rate, in commands per second
    Rejected { rate: f64 },
}

impl Admission {
    #[cfg(test)]
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

/// Rate limiter over the history of executed commands.
///
/// A new command is admitted while `executed / (now - oldest) < max_rate`.
pub struct RateLimiter {
    history: VecDeque<DispatchRecord>,
    window: Duration,
    max_rate: f64,
}

impl RateLimiter {
    pub fn new(window: Duration, max_rate: f64) -> Self {
        Self {
            history: VecDeque::new(),
            window,
            max_rate,
        }
    }

    /// Decide on a pending command, then drop history older than the window.
    ///
    /// The pending command is not part of the history it is judged against.
    pub fn check(&mut self, now: Instant) -> Admission {
        let admission = self.evaluate(now);
        self.prune(now);
        admission
    }

    fn evaluate(&self, now: Instant) -> Admission {
        let Some(oldest) = self.history.front() else {
            return Admission::Admitted;
        };

        let elapsed = now.saturating_duration_since(oldest.timestamp).as_secs_f64();
        // Commands landing in the same instant count as an unbounded rate
        if elapsed <= 0.0 {
            return Admission::Rejected { rate: f64::INFINITY };
        }

        let rate = self.history.len() as f64 / elapsed;
        if rate < self.max_rate {
            Admission::Admitted
        } else {
            Admission::Rejected { rate }
        }
    }

    /// Remove records more than one window older than `now`
    pub fn prune(&mut self, now: Instant) {
        while let Some(oldest) = self.history.front() {
            if now.saturating_duration_since(oldest.timestamp) > self.window {
                tracing::trace!("Expired {} from rate history", oldest.command);
                self.history.pop_front();
            } else {
                break;
            }
        }
    }

    /// Append an executed command
    pub fn record(&mut self, command: impl Into<String>, now: Instant) {
        self.history.push_back(DispatchRecord {
            command: command.into(),
            timestamp: now,
        });
    }

    #[cfg(test)]
    pub fn history(&self) -> impl Iterator<Item = &DispatchRecord> {
        self.history.iter()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    #[cfg(test)]
    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, DEFAULT_MAX_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_empty_history_admits() {
        let mut limiter = RateLimiter::default();
        assert_eq!(limiter.check(Instant::now()), Admission::Admitted);
    }

    #[test]
    fn test_rejects_at_or_above_threshold() {
        let t0 = Instant::now();
        let mut limiter = RateLimiter::default();
        limiter.record("a", t0);

        // 1 command over 1s = 1.0/s
        assert!(!limiter.check(t0 + ms(1000)).is_admitted());
        // 1 command over 1.5s ~= 0.667/s, still too fast
        assert!(!limiter.check(t0 + ms(1500)).is_admitted());
        // 1 command over 2s = 0.5/s
        assert!(limiter.check(t0 + ms(2000)).is_admitted());
    }

    #[test]
    fn test_same_instant_rejects() {
        let t0 = Instant::now();
        let mut limiter = RateLimiter::default();
        limiter.record("a", t0);

        let admission = limiter.check(t0);
        assert_eq!(admission, Admission::Rejected { rate: f64::INFINITY });
    }

    #[test]
    fn test_check_does_not_record() {
        let t0 = Instant::now();
        let mut limiter = RateLimiter::default();
        limiter.check(t0);
        limiter.check(t0 + ms(10));
        assert!(limiter.is_empty());
    }

    #[test]
    fn test_prune_keeps_only_window() {
        let t0 = Instant::now();
        let mut limiter = RateLimiter::default();
        for i in 0..5 {
            limiter.record("a", t0 + Duration::from_secs(i * 10));
        }

        let now = t0 + Duration::from_secs(45);
        limiter.prune(now);

        assert_eq!(limiter.len(), 3);
        for record in limiter.history() {
            assert!(now.duration_since(record.timestamp) <= limiter.window());
        }
    }

    #[test]
    fn test_check_prunes_even_when_rejecting() {
        let t0 = Instant::now();
        let mut limiter = RateLimiter::default();
        limiter.record("old", t0);
        for i in 0..30 {
            limiter.record("burst", t0 + Duration::from_secs(31) + ms(i));
        }

        let admission = limiter.check(t0 + Duration::from_secs(31) + ms(40));
        assert!(!admission.is_admitted());
        assert!(limiter.history().all(|r| r.command == "burst"));
    }

    #[test]
    fn test_burst_is_throttled() {
        let t0 = Instant::now();
        let mut limiter = RateLimiter::default();
        let mut admitted = 0;
        let mut rejected = 0;

        // 20 commands in 2 seconds
        for i in 0..20 {
            let now = t0 + ms(i * 100);
            if limiter.check(now).is_admitted() {
                limiter.record("cmd", now);
                admitted += 1;
            } else {
                rejected += 1;
            }
        }

        assert!(admitted >= 1);
        assert!(rejected > 0);
        assert_eq!(limiter.len(), admitted);
        assert_eq!(admitted, 2);
    }
}
