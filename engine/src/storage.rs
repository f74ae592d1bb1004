use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::error::StorageError;

/// Small key-value store for values that outlive a game.
pub trait Storage: Send {
    fn get(&self, key: &str) -> Option<u64>;
    fn set(&mut self, key: &str, value: u64) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: HashMap<String, u64>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<u64> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: u64) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Keeps all keys in one JSON object on disk, rewritten on every `set`.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    values: BTreeMap<String, u64>,
}

impl JsonFileStorage {
    /// Opens `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let text = fs::read_to_string(&path)?;
            serde_json::from_str(&text)?
        } else {
            debug!("No storage file at {}, starting empty", path.display());
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    /// Like `open`, but falls back to an empty store if the file is unreadable.
    pub fn open_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::open(path) {
            Ok(storage) => storage,
            Err(e) => {
                warn!("Ignoring unreadable storage file {}: {}", path.display(), e);
                Self {
                    path: path.to_path_buf(),
                    values: BTreeMap::new(),
                }
            }
        }
    }
}

impl Storage for JsonFileStorage {
    fn get(&self, key: &str) -> Option<u64> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: u64) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value);
        let text = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, text)?;
        debug!("Stored {}={} in {}", key, value, self.path.display());
        Ok(())
    }
}
