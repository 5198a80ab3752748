//! Message handling - Framing, parsing, admission control and dispatch

pub mod dispatcher;
pub mod framer;
pub mod parser;
pub mod rate_limit;
pub mod scheduler;


pub use dispatcher::{Dispatcher, Outbound};
pub use framer::LineFramer;
pub use rate_limit::RateLimiter;
pub use scheduler::PeriodicScheduler;
