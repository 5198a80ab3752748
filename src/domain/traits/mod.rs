//! Domain traits - Abstractions for infrastructure implementations

pub mod connection;
pub mod roster;
pub mod store;

pub use connection::ChatConnection;
pub use roster::RosterSource;
pub use store::{CommandStore, DynamicCommands};
