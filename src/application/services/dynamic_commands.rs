//! Runtime-defined canned-reply commands that survive restarts

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::errors::CommandError;
use crate::domain::entities::{CannedReply, CommandContext, CommandHandler, CommandRegistry};
use crate::domain::traits::{CommandStore, DynamicCommands};

/// Default name of the control command
pub const DEFAULT_CONTROL_NAME: &str = "bcbcommand";

const USAGE: &str = "Usage: set <name> <message> | remove <name>";

/// Keeps the persisted name -> message mapping and the live registry in step.
///
/// The in-memory mapping is the source of truth for the session; a failed
/// write is logged and the mutation stands.
pub struct DynamicCommandStore {
    backend: Box<dyn CommandStore>,
    commands: BTreeMap<String, String>,
}

impl DynamicCommandStore {
    pub fn new(backend: Box<dyn CommandStore>) -> Self {
        Self {
            backend,
            commands: BTreeMap::new(),
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::new(Box::new(crate::infrastructure::storage::MemoryCommandStore::new()))
    }

    /// Read the persisted mapping and register a canned reply for each entry.
    ///
    /// Call after the built-ins are registered: stored names that are already
    /// taken are skipped and stay unmanaged. An unreadable store is treated as
    /// empty. Returns the number loaded.
    pub fn load(&mut self, registry: &mut CommandRegistry) -> usize {
        let stored = match self.backend.load() {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Unable to read dynamic commands, starting empty: {}", e);
                BTreeMap::new()
            }
        };

        for (name, message) in stored {
            let name = name.to_lowercase();
            if registry.contains(&name) {
                tracing::warn!("Stored command {} collides with a built-in, skipping", name);
                continue;
            }
            registry.register(&name, Arc::new(CannedReply::new(message.clone())));
            self.commands.insert(name, message);
        }

        tracing::info!("Loaded dynamic commands {:?}", self.commands.keys().collect::<Vec<_>>());
        self.commands.len()
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.commands.get(&name.to_lowercase()).map(String::as_str)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn persist(&self) {
        if let Err(e) = self.backend.save(&self.commands) {
            tracing::warn!("Dynamic commands not saved, persisted copy is stale: {}", e);
        }
    }
}

impl DynamicCommands for DynamicCommandStore {
    /// Create or replace a canned reply and persist the full mapping
    fn add(&mut self, registry: &mut CommandRegistry, name: &str, message: &str) {
        let name = name.to_lowercase();
        self.commands.insert(name.clone(), message.to_string());
        registry.register(&name, Arc::new(CannedReply::new(message)));
        self.persist();
    }

    /// Remove a canned reply. Names this store does not manage are left alone.
    fn remove(&mut self, registry: &mut CommandRegistry, name: &str) -> bool {
        let name = name.to_lowercase();
        if self.commands.remove(&name).is_none() {
            return false;
        }
        registry.unregister(&name);
        self.persist();
        true
    }

    fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(&name.to_lowercase())
    }
}

/// Privileged control command: `set <name> <message...>` or `remove <name>`
pub struct ControlCommand;

impl CommandHandler for ControlCommand {
    fn execute(&self, ctx: &mut CommandContext<'_>, sender: &str, argument: &str) -> Result<(), CommandError> {
        if !ctx.is_moderator(sender) {
            tracing::info!("Ignoring command change from non-moderator {}", sender);
            return Ok(());
        }

        let args: Vec<&str> = argument.split_whitespace().collect();
        if args.len() < 2 {
            ctx.chat("Please provide at least 2 arguments.");
            return Ok(());
        }

        let name = args[1].to_lowercase();
        let message = args[2..].join(" ");

        match args[0] {
            "set" => {
                if message.is_empty() {
                    ctx.chat(USAGE);
                } else if ctx.registry.contains(&name) && !ctx.dynamic.contains(&name) {
                    ctx.chat(format!("Command {} is built in.", name));
                } else {
                    ctx.dynamic.add(ctx.registry, &name, &message);
                    tracing::info!("{} set command {}", sender, name);
                    ctx.chat(format!("Added command {}: {}", name, message));
                }
            }
            "remove" => {
                if ctx.dynamic.remove(ctx.registry, &name) {
                    tracing::info!("{} removed command {}", sender, name);
                    ctx.chat(format!("Removed command {}", name));
                }
            }
            _ => ctx.chat(USAGE),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{DispatchOutcome, ExecutionEnv, Roster};
    use crate::infrastructure::storage::{temp_store_path, JsonCommandFile};

    fn run(
        registry: &mut CommandRegistry,
        dynamic: &mut DynamicCommandStore,
        roster: &Roster,
        sender: &str,
        command: &str,
        argument: &str,
    ) -> (DispatchOutcome, Vec<String>) {
        let mut replies = Vec::new();
        let env = ExecutionEnv { dynamic, roster, replies: &mut replies };
        let outcome = registry.dispatch(env, sender, command, argument);
        (outcome, replies)
    }

    fn setup() -> (CommandRegistry, DynamicCommandStore, Roster) {
        let mut registry = CommandRegistry::new();
        registry.register(DEFAULT_CONTROL_NAME, Arc::new(ControlCommand));
        (registry, DynamicCommandStore::in_memory(), Roster::new().with_moderators(["alice"]))
    }

    #[test]
    fn test_add_then_reload_round_trip() {
        let path = temp_store_path();
        let mut registry = CommandRegistry::new();
        let mut store = DynamicCommandStore::new(Box::new(JsonCommandFile::new(&path)));
        store.add(&mut registry, "hi", "hello there");

        let mut fresh_registry = CommandRegistry::new();
        let mut fresh = DynamicCommandStore::new(Box::new(JsonCommandFile::new(&path)));
        assert_eq!(fresh.load(&mut fresh_registry), 1);

        let roster = Roster::new();
        let (outcome, replies) = run(&mut fresh_registry, &mut fresh, &roster, "bob", "hi", "");
        assert_eq!(outcome, DispatchOutcome::Executed);
        assert_eq!(replies, vec!["hello there".to_string()]);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_remove_clears_registry_and_persisted_copy() {
        let path = temp_store_path();
        let mut registry = CommandRegistry::new();
        let mut store = DynamicCommandStore::new(Box::new(JsonCommandFile::new(&path)));
        store.add(&mut registry, "hi", "hello");
        assert!(store.remove(&mut registry, "HI"));

        assert!(!registry.contains("hi"));
        let mut fresh_registry = CommandRegistry::new();
        let mut fresh = DynamicCommandStore::new(Box::new(JsonCommandFile::new(&path)));
        assert_eq!(fresh.load(&mut fresh_registry), 0);
        assert!(!fresh_registry.contains("hi"));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_remove_unmanaged_name_is_noop() {
        let (mut registry, mut store, _) = setup();
        assert!(!store.remove(&mut registry, DEFAULT_CONTROL_NAME));
        assert!(registry.contains(DEFAULT_CONTROL_NAME));
    }

    #[test]
    fn test_load_from_corrupt_file_is_empty() {
        let path = temp_store_path();
        std::fs::write(&path, "not json").unwrap();

        let mut registry = CommandRegistry::new();
        let mut store = DynamicCommandStore::new(Box::new(JsonCommandFile::new(&path)));
        assert_eq!(store.load(&mut registry), 0);
        assert!(registry.is_empty());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_failed_persist_keeps_live_command() {
        let path = std::env::temp_dir()
            .join(format!("bcb-bot-missing-{}", uuid::Uuid::new_v4()))
            .join("commands.json");
        let mut registry = CommandRegistry::new();
        let mut store = DynamicCommandStore::new(Box::new(JsonCommandFile::new(path)));

        store.add(&mut registry, "hi", "hello");
        assert!(registry.contains("hi"));
        assert_eq!(store.get("hi"), Some("hello"));
    }

    #[test]
    fn test_load_skips_names_taken_by_builtins() {
        let path = temp_store_path();
        std::fs::write(
            &path,
            r#"{"version":1,"commands":{"bcbcommand":"old reply","echo":"canned","hi":"hello"}}"#,
        )
        .unwrap();

        let mut registry = CommandRegistry::new();
        crate::application::services::register_builtins(&mut registry, DEFAULT_CONTROL_NAME);
        let mut store = DynamicCommandStore::new(Box::new(JsonCommandFile::new(&path)));
        assert_eq!(store.load(&mut registry), 1);
        assert!(!store.contains("echo"));
        assert!(!store.contains(DEFAULT_CONTROL_NAME));

        let roster = Roster::new().with_moderators(["alice"]);
        let (_, replies) = run(&mut registry, &mut store, &roster, "alice", DEFAULT_CONTROL_NAME, "set hey there");
        assert_eq!(replies, vec!["Added command hey: there".to_string()]);
        assert!(registry.contains("hey"));

        // echo is still the built-in, and remove cannot touch it
        let (_, replies) = run(&mut registry, &mut store, &roster, "alice", "echo", "loud");
        assert_eq!(replies, vec!["loud".to_string()]);
        let (_, replies) = run(&mut registry, &mut store, &roster, "alice", DEFAULT_CONTROL_NAME, "remove echo");
        assert!(replies.is_empty());
        assert!(registry.contains("echo"));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_control_set_and_remove() {
        let (mut registry, mut store, roster) = setup();

        let (_, replies) = run(&mut registry, &mut store, &roster, "alice", DEFAULT_CONTROL_NAME, "set Hi hello there");
        assert_eq!(replies, vec!["Added command hi: hello there".to_string()]);
        assert_eq!(store.get("hi"), Some("hello there"));

        let (_, replies) = run(&mut registry, &mut store, &roster, "carol", "hi", "");
        assert_eq!(replies, vec!["hello there".to_string()]);

        let (_, replies) = run(&mut registry, &mut store, &roster, "alice", DEFAULT_CONTROL_NAME, "remove hi");
        assert_eq!(replies, vec!["Removed command hi".to_string()]);
        assert!(!registry.contains("hi"));
    }

    #[test]
    fn test_control_ignores_non_moderators() {
        let (mut registry, mut store, roster) = setup();

        let (outcome, replies) = run(&mut registry, &mut store, &roster, "mallory", DEFAULT_CONTROL_NAME, "set hi pwned");
        assert_eq!(outcome, DispatchOutcome::Executed);
        assert!(replies.is_empty());
        assert!(store.is_empty());
        assert!(!registry.contains("hi"));
    }

    #[test]
    fn test_control_needs_two_arguments() {
        let (mut registry, mut store, roster) = setup();
        let (_, replies) = run(&mut registry, &mut store, &roster, "alice", DEFAULT_CONTROL_NAME, "set");
        assert_eq!(replies, vec!["Please provide at least 2 arguments.".to_string()]);
    }

    #[test]
    fn test_control_refuses_to_shadow_builtins() {
        let (mut registry, mut store, roster) = setup();
        let argument = format!("set {} gotcha", DEFAULT_CONTROL_NAME);

        let (_, replies) = run(&mut registry, &mut store, &roster, "alice", DEFAULT_CONTROL_NAME, &argument);
        assert_eq!(replies, vec![format!("Command {} is built in.", DEFAULT_CONTROL_NAME)]);
        assert!(store.is_empty());
    }

    #[test]
    fn test_control_set_without_message_or_unknown_action() {
        let (mut registry, mut store, roster) = setup();

        let (_, replies) = run(&mut registry, &mut store, &roster, "alice", DEFAULT_CONTROL_NAME, "set hi");
        assert_eq!(replies, vec![USAGE.to_string()]);

        let (_, replies) = run(&mut registry, &mut store, &roster, "alice", DEFAULT_CONTROL_NAME, "rename hi hey");
        assert_eq!(replies, vec![USAGE.to_string()]);
        assert!(store.is_empty());
    }

    #[test]
    fn test_control_remove_unknown_is_silent() {
        let (mut registry, mut store, roster) = setup();
        let (_, replies) = run(&mut registry, &mut store, &roster, "alice", DEFAULT_CONTROL_NAME, "remove ghost");
        assert!(replies.is_empty());
    }
}
