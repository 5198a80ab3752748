//! Periodic scheduler - work driven by message arrival rather than a clock

use std::time::{Duration, Instant};
use crate::domain::entities::{CommandRegistry, DispatchOutcome, ExecutionEnv};

/// Default cadence for refreshing the channel roster
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Ticked once per processed line
pub struct PeriodicScheduler {
    refresh_interval: Duration,
    last_refresh: Option<Instant>,
}

impl PeriodicScheduler {
    pub fn new(refresh_interval: Duration) -> Self {
        Self {
            refresh_interval,
            last_refresh: None,
        }
    }

    /// Whether the roster should be refreshed now.
    ///
    /// The first call is always due. A due result restarts the interval
    /// whether or not the refresh that follows succeeds.
    pub fn refresh_due(&mut self, now: Instant) -> bool {
        let due = match self.last_refresh {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.refresh_interval,
        };
        if due {
            self.last_refresh = Some(now);
        }
        due
    }

    /// Restart the interval after a refresh made outside the tick
    pub fn mark_refreshed(&mut self, now: Instant) {
        self.last_refresh = Some(now);
    }

    #[cfg(test)]
    pub fn last_refresh(&self) -> Option<Instant> {
        self.last_refresh
    }

    /// Invoke every periodic handler with an empty sender and argument.
    ///
    /// Returns how many handlers ran.
    pub fn run_periodic(&self, registry: &mut CommandRegistry, env: ExecutionEnv<'_>) -> usize {
        let ExecutionEnv { dynamic, roster, replies } = env;
        let handlers = registry.periodic_handlers();

        for (name, handler) in &handlers {
            let env = ExecutionEnv {
                dynamic: &mut *dynamic,
                roster,
                replies: &mut *replies,
            };
            if let DispatchOutcome::Failed(e) = registry.run_guarded(env, name, handler.as_ref(), "", "") {
                tracing::debug!("Periodic command {} failed: {}", name, e);
            }
        }

        handlers.len()
    }
}

impl Default for PeriodicScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_INTERVAL)
    }
}
