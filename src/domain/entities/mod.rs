//! Domain entities - Core business objects

pub mod message;
pub mod command;
pub mod roster;

pub use message::Message;
pub use command::{CannedReply, CommandContext, CommandHandler, CommandRegistry, DispatchOutcome, ExecutionEnv};
pub use roster::Roster;
