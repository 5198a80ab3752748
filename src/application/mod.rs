//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Services: Built-in commands, runtime-defined commands, the ingestion loop
//! - Errors: Domain-specific errors
//! - Messaging: Line framing, parsing, rate limiting, dispatching

pub mod errors;
pub mod services;
pub mod messaging;
