//! Built-in commands and the startup registration table

use std::sync::Arc;

use crate::application::errors::CommandError;
use crate::domain::entities::{CommandContext, CommandHandler, CommandRegistry};
use super::dynamic_commands::ControlCommand;

/// Repeats the argument in chat when sent by a moderator
pub struct Echo;

impl CommandHandler for Echo {
    fn execute(&self, ctx: &mut CommandContext<'_>, sender: &str, argument: &str) -> Result<(), CommandError> {
        if ctx.is_moderator(sender) && !argument.is_empty() {
            ctx.chat(argument);
        }
        Ok(())
    }
}

/// Liveness check for moderators
pub struct Test;

impl CommandHandler for Test {
    fn execute(&self, ctx: &mut CommandContext<'_>, sender: &str, _argument: &str) -> Result<(), CommandError> {
        if ctx.is_moderator(sender) {
            ctx.chat("I'm here.");
        }
        Ok(())
    }
}

fn echo() -> Arc<dyn CommandHandler> {
    Arc::new(Echo)
}

fn test() -> Arc<dyn CommandHandler> {
    Arc::new(Test)
}

/// Commands available in every session, by name
pub const BUILTINS: &[(&str, fn() -> Arc<dyn CommandHandler>)] = &[
    ("echo", echo),
    ("test", test),
];

/// Register the built-in table plus the dynamic-command control command
pub fn register_builtins(registry: &mut CommandRegistry, control_name: &str) {
    for (name, constructor) in BUILTINS {
        registry.register(name, constructor());
    }
    registry.register(control_name, Arc::new(ControlCommand));

    tracing::info!("Loaded commands {:?}", registry.names());
}
