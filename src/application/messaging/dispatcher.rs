//! Message dispatcher - Routes parsed lines through admission control to handlers

use std::time::Instant;

use crate::domain::entities::{CommandRegistry, DispatchOutcome, ExecutionEnv, Message, Roster};
use crate::domain::traits::RosterSource;
use crate::application::services::DynamicCommandStore;
use super::parser::{keep_alive_token, MessageParser};
use super::rate_limit::{Admission, RateLimiter};
use super::scheduler::PeriodicScheduler;

/// Something the loop has to write back to the connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Pong(String),
    Chat(String),
}

/// How a line was classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    KeepAlive,
    Unclassified,
    Chat,
    Command(DispatchOutcome),
    Rejected,
}

impl LineKind {
    /// Keep-alive requests bypass the scheduler tick
    pub fn ticks(&self) -> bool {
        !matches!(self, LineKind::KeepAlive)
    }
}

/// Owns all mutable command state for one connection
pub struct Dispatcher {
    parser: MessageParser,
    registry: CommandRegistry,
    dynamic: DynamicCommandStore,
    limiter: RateLimiter,
    scheduler: PeriodicScheduler,
    roster_source: Box<dyn RosterSource>,
    roster: Roster,
    replies: Vec<String>,
    outbound: Vec<Outbound>,
}

impl Dispatcher {
    pub fn new(
        registry: CommandRegistry,
        dynamic: DynamicCommandStore,
        roster_source: Box<dyn RosterSource>,
    ) -> Self {
        Self {
            parser: MessageParser::default(),
            registry,
            dynamic,
            limiter: RateLimiter::default(),
            scheduler: PeriodicScheduler::default(),
            roster_source,
            roster: Roster::default(),
            replies: Vec::new(),
            outbound: Vec::new(),
        }
    }

    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_scheduler(mut self, scheduler: PeriodicScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    #[cfg(test)]
    pub fn with_roster(mut self, roster: Roster) -> Self {
        self.roster = roster;
        self
    }

    #[cfg(test)]
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    #[cfg(test)]
    pub fn dynamic(&self) -> &DynamicCommandStore {
        &self.dynamic
    }

    #[cfg(test)]
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    #[cfg(test)]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Process one complete line
    pub fn handle_line(&mut self, line: &str, now: Instant) -> LineKind {
        if let Some(token) = keep_alive_token(line) {
            tracing::debug!("Keep-alive {}", token);
            self.outbound.push(Outbound::Pong(token.to_string()));
            return LineKind::KeepAlive;
        }

        let Some(message) = self.parser.parse(line) else {
            tracing::debug!("Skipping line: {}", line);
            return LineKind::Unclassified;
        };

        self.handle_message(message, now)
    }

    fn handle_message(&mut self, message: Message, now: Instant) -> LineKind {
        let Some(command) = message.command.as_deref() else {
            tracing::trace!("Chat: {}", message.raw);
            return LineKind::Chat;
        };

        tracing::info!("<{}> !{} {}", message.sender, command, message.argument);

        let admission = self.limiter.check(now);
        if let Admission::Rejected { rate } = admission {
            tracing::warn!("Too many commands ({:.2}/s), unable to process {}", rate, command);
            return LineKind::Rejected;
        }

        let env = ExecutionEnv {
            dynamic: &mut self.dynamic,
            roster: &self.roster,
            replies: &mut self.replies,
        };
        let outcome = self.registry.dispatch(env, &message.sender, command, &message.argument);
        if outcome.ran() {
            self.limiter.record(command, now);
        }
        self.collect_replies();

        LineKind::Command(outcome)
    }

    /// Fetch the roster now and restart the refresh interval
    pub async fn refresh_roster(&mut self, now: Instant) {
        self.scheduler.mark_refreshed(now);
        self.fetch_roster().await;
    }

    /// Scheduler tick: refresh the roster when due, then run periodic handlers
    pub async fn tick(&mut self, now: Instant) {
        if self.scheduler.refresh_due(now) {
            self.fetch_roster().await;
        }

        let env = ExecutionEnv {
            dynamic: &mut self.dynamic,
            roster: &self.roster,
            replies: &mut self.replies,
        };
        self.scheduler.run_periodic(&mut self.registry, env);
        self.collect_replies();
    }

    async fn fetch_roster(&mut self) {
        match self.roster_source.fetch().await {
            Ok(roster) => {
                tracing::debug!(
                    "Roster refreshed at {:?}: {} chatters, {} moderators",
                    roster.fetched_at,
                    roster.chatter_count,
                    roster.moderator_count()
                );
                self.roster = roster;
            }
            Err(e) => tracing::warn!("Unable to refresh roster, keeping previous: {}", e),
        }
    }

    /// Take everything queued for the connection, in order
    pub fn drain_outbound(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.outbound)
    }

    fn collect_replies(&mut self) {
        self.outbound.extend(self.replies.drain(..).map(Outbound::Chat));
    }
}
