use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::application::errors::CommandError;
use crate::domain::traits::DynamicCommands;
use super::Roster;

/// A chat command.
///
/// Handlers run synchronously on the ingestion loop and must return before
/// the next line is processed.
pub trait CommandHandler: Send + Sync {
    fn execute(&self, ctx: &mut CommandContext<'_>, sender: &str, argument: &str) -> Result<(), CommandError>;

    /// Periodic handlers are invoked with an empty sender and argument on
    /// every processed line and throttle themselves.
    fn periodic(&self) -> bool {
        false
    }
}

/// Everything a handler may touch while it runs
pub struct CommandContext<'a> {
    pub registry: &'a mut CommandRegistry,
    pub dynamic: &'a mut dyn DynamicCommands,
    pub roster: &'a Roster,
    replies: &'a mut Vec<String>,
}

impl<'a> CommandContext<'a> {
    /// Queue a message for the channel
    pub fn chat(&mut self, text: impl Into<String>) {
        self.replies.push(text.into());
    }

    pub fn is_moderator(&self, sender: &str) -> bool {
        self.roster.is_moderator(sender)
    }
}

/// The parts of the session a dispatch borrows, besides the registry itself
pub struct ExecutionEnv<'a> {
    pub dynamic: &'a mut dyn DynamicCommands,
    pub roster: &'a Roster,
    pub replies: &'a mut Vec<String>,
}

/// Command that always answers with one fixed message
pub struct CannedReply {
    message: String,
}

impl CannedReply {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl CommandHandler for CannedReply {
    fn execute(&self, ctx: &mut CommandContext<'_>, _sender: &str, _argument: &str) -> Result<(), CommandError> {
        ctx.chat(self.message.clone());
        Ok(())
    }
}

/// What happened to a dispatched command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Executed,
    Failed(String),
    Unknown,
}

impl DispatchOutcome {
    /// Whether the handler actually ran, successfully or not
    pub fn ran(&self) -> bool {
        !matches!(self, DispatchOutcome::Unknown)
    }
}

/// Live mapping from lowercase command name to handler
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, handler: Arc<dyn CommandHandler>) {
        self.commands.insert(name.to_lowercase(), handler);
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.commands.remove(&name.to_lowercase()).is_some()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        self.commands.get(&name.to_lowercase()).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(&name.to_lowercase())
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Handlers flagged as periodic, in name order
    pub fn periodic_handlers(&self) -> Vec<(String, Arc<dyn CommandHandler>)> {
        let mut handlers: Vec<(String, Arc<dyn CommandHandler>)> = self.commands
            .iter()
            .filter(|(_, h)| h.periodic())
            .map(|(name, h)| (name.clone(), Arc::clone(h)))
            .collect();
        handlers.sort_by(|a, b| a.0.cmp(&b.0));
        handlers
    }

    /// Look up `command` and run it.
    ///
    /// Handler errors and panics stop here: they are logged and reported as
    /// [`DispatchOutcome::Failed`], never propagated.
    pub fn dispatch(&mut self, env: ExecutionEnv<'_>, sender: &str, command: &str, argument: &str) -> DispatchOutcome {
        let name = command.to_lowercase();
        let Some(handler) = self.get(&name) else {
            tracing::warn!("Unknown command {} sent by {}", name, sender);
            return DispatchOutcome::Unknown;
        };
        self.run_guarded(env, &name, handler.as_ref(), sender, argument)
    }

    /// Run one handler with panics caught.
    ///
    /// The process panic hook still sees the panic; `main` routes it to the log.
    pub(crate) fn run_guarded(
        &mut self,
        env: ExecutionEnv<'_>,
        name: &str,
        handler: &dyn CommandHandler,
        sender: &str,
        argument: &str,
    ) -> DispatchOutcome {
        let mut ctx = CommandContext {
            registry: self,
            dynamic: env.dynamic,
            roster: env.roster,
            replies: env.replies,
        };

        let result = panic::catch_unwind(AssertUnwindSafe(|| handler.execute(&mut ctx, sender, argument)));
        let error = match result {
            Ok(Ok(())) => return DispatchOutcome::Executed,
            Ok(Err(e)) => e,
            Err(panic) => {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "handler panicked".to_string());
                CommandError::ExecutionFailed(detail)
            }
        };

        tracing::warn!("Unable to handle command {} sent by {}: {}", name, sender, error);
        DispatchOutcome::Failed(error.to_string())
    }
}
