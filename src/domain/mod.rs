//! Domain layer - Core business objects and the seams to the outside world
//! 
//! This layer contains:
//! - Entities: Message, command handlers and their registry, channel roster
//! - Traits: Abstractions for infrastructure (chat connection, roster source, command store)

pub mod entities;
pub mod traits;
