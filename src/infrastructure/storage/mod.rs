//! File-based storage for runtime-defined commands

use std::collections::BTreeMap;
use std::path::PathBuf;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::errors::StorageError;
use crate::domain::traits::CommandStore;

/// Current on-disk format version
pub const STORE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CommandFile {
    version: u32,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    commands: BTreeMap<String, String>,
}

/// JSON file store.
///
/// Every save rewrites the whole file through a temporary sibling and a
/// rename, so an interrupted write never leaves a half-written store behind.
pub struct JsonCommandFile {
    path: PathBuf,
}

impl JsonCommandFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CommandStore for JsonCommandFile {
    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        let file: CommandFile = serde_json::from_str(&content)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        if file.version != STORE_VERSION {
            return Err(StorageError::UnsupportedVersion(file.version));
        }

        Ok(file.commands)
    }

    fn save(&self, commands: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let file = CommandFile {
            version: STORE_VERSION,
            updated_at: Some(Utc::now()),
            commands: commands.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let temp = self.temp_path();
        std::fs::write(&temp, json)?;
        std::fs::rename(&temp, &self.path)?;

        tracing::debug!("Saved {} dynamic commands to {}", commands.len(), self.path.display());
        Ok(())
    }
}

/// In-process store, nothing survives the process
#[cfg(test)]
#[derive(Default)]
pub struct MemoryCommandStore {
    commands: std::sync::RwLock<BTreeMap<String, String>>,
}

#[cfg(test)]
impl MemoryCommandStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl CommandStore for MemoryCommandStore {
    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        self.commands
            .read()
            .map(|c| c.clone())
            .map_err(|_| StorageError::Serialization("Lock poisoned".to_string()))
    }

    fn save(&self, commands: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let mut stored = self.commands
            .write()
            .map_err(|_| StorageError::Serialization("Lock poisoned".to_string()))?;
        *stored = commands.clone();
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn temp_store_path() -> PathBuf {
    std::env::temp_dir().join(format!("bcb-bot-{}.json", uuid::Uuid::new_v4()))
}
