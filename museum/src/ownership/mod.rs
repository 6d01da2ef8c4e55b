//! Local, non-authoritative ownership record and the piloting toy built on it.

mod piloting;

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use bevy::prelude::*;

use crate::error::StorageError;

pub use piloting::{pilot_movement_system, PilotDirection, PilotingState, REWARD_THRESHOLD};

/// Model display name to "owned".
pub type OwnershipMap = BTreeMap<String, bool>;

/// Flat key-value persistence for the ownership map.
pub trait OwnershipStore: Send + Sync + 'static {
    fn load(&self) -> Result<OwnershipMap, StorageError>;

    fn save(&self, owned: &OwnershipMap) -> Result<(), StorageError>;
}

/// Pretty-printed JSON file. A missing file reads as an empty map.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OwnershipStore for JsonFileStore {
    fn load(&self) -> Result<OwnershipMap, StorageError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(OwnershipMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, owned: &OwnershipMap) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_vec_pretty(owned)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// In-memory store; clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<OwnershipMap>>,
}

impl MemoryStore {
    pub fn with_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(name, owned)| (name.into(), owned))
            .collect();
        Self {
            inner: Arc::new(Mutex::new(map)),
        }
    }

    pub fn snapshot(&self) -> OwnershipMap {
        self.inner
            .lock()
            .map(|map| map.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl OwnershipStore for MemoryStore {
    fn load(&self) -> Result<OwnershipMap, StorageError> {
        Ok(self.snapshot())
    }

    fn save(&self, owned: &OwnershipMap) -> Result<(), StorageError> {
        let mut map = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *map = owned.clone();
        Ok(())
    }
}

/// Which models the user owns, written through to its store on every change.
#[derive(Resource)]
pub struct OwnershipRecord {
    owned: OwnershipMap,
    store: Box<dyn OwnershipStore>,
}

impl OwnershipRecord {
    /// Loads once from `store` and merges `forced` names as owned. Forced
    /// entries live in memory until the next mutation persists them.
    pub fn load(store: Box<dyn OwnershipStore>, forced: &[String]) -> Self {
        let mut owned = match store.load() {
            Ok(owned) => owned,
            Err(err) => {
                warn!("could not read ownership record, starting empty: {err}");
                OwnershipMap::new()
            }
        };
        for name in forced {
            owned.insert(name.clone(), true);
        }
        debug!("ownership loaded: {} entries", owned.len());
        Self { owned, store }
    }

    pub fn set_owned(&mut self, name: &str) {
        if self.is_owned(name) {
            return;
        }
        self.owned.insert(name.to_string(), true);
        if let Err(err) = self.store.save(&self.owned) {
            error!("failed to persist ownership of {name}: {err}");
        }
    }

    pub fn is_owned(&self, name: &str) -> bool {
        self.owned.get(name).copied().unwrap_or(false)
    }

    pub fn owned_names(&self) -> impl Iterator<Item = &str> {
        self.owned
            .iter()
            .filter(|(_, owned)| **owned)
            .map(|(name, _)| name.as_str())
    }
}
