//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: Persistence of runtime-defined commands
//! - Adapters: IRC transport and the chatters roster endpoint

pub mod config;
pub mod storage;
pub mod adapters;
