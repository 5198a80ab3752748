//! Adapters - Chat transport and channel-state integrations

pub mod chatters;
pub mod irc;

pub use chatters::ChattersSource;
pub use irc::IrcConnection;
