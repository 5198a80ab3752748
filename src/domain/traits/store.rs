use std::collections::BTreeMap;
use crate::application::errors::StorageError;
use crate::domain::entities::CommandRegistry;

/// CommandStore trait - durable name -> reply message mapping
///
/// `save` always receives the full mapping and replaces whatever was stored.
pub trait CommandStore: Send + Sync {
    fn load(&self) -> Result<BTreeMap<String, String>, StorageError>;
    fn save(&self, commands: &BTreeMap<String, String>) -> Result<(), StorageError>;
}

/// DynamicCommands trait - runtime-defined commands a handler may change
///
/// Implementations keep the live registry and their own mapping in step.
pub trait DynamicCommands: Send {
    /// Create or replace a canned reply
    fn add(&mut self, registry: &mut CommandRegistry, name: &str, message: &str);

    /// Remove a managed command; `false` if `name` is not managed here
    fn remove(&mut self, registry: &mut CommandRegistry, name: &str) -> bool;

    fn contains(&self, name: &str) -> bool;
}
