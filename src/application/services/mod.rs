//! Application services - Built-in commands, runtime-defined commands and the chat loop

pub mod builtins;
pub mod chat_service;
pub mod dynamic_commands;

pub use builtins::register_builtins;
pub use chat_service::ChatService;
pub use dynamic_commands::{DynamicCommandStore, DEFAULT_CONTROL_NAME};
