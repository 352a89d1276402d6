//! Persistent storage for the session's credentials.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};
use tempfile::NamedTempFile;

/// The slots a [`CredentialStore`] holds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    /// The raw bearer token.
    Token,
    /// The JSON-encoded user profile, minus its avatar.
    User,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Token, Slot::User];

    pub fn key(self) -> &'static str {
        match self {
            Slot::Token => "token",
            Slot::User => "user",
        }
    }
}

/// A synchronous key-value store which outlives the process.
///
/// Only the [`crate::SessionManager`] should write to a store, that way the
/// `user` slot never ends up holding an avatar.
pub trait CredentialStore: Send + Sync {
    fn get(&self, slot: Slot) -> Result<Option<String>, StoreError>;
    fn set(&self, slot: Slot, value: &str) -> Result<(), StoreError>;
    fn remove(&self, slot: Slot) -> Result<(), StoreError>;
}

/// Errors that may occur while reading or writing a [`CredentialStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Unable to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
    #[error("{} is not a valid credential file", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        error: serde_json::Error,
    },
}

/// A store which only lives as long as the process, mostly useful for
/// testing.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<Slot, String>>,
}

impl MemoryStore {
    pub fn new() -> Self { MemoryStore::default() }

    fn slots(&self) -> MutexGuard<'_, HashMap<Slot, String>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, slot: Slot) -> Result<Option<String>, StoreError> {
        Ok(self.slots().get(&slot).cloned())
    }

    fn set(&self, slot: Slot, value: &str) -> Result<(), StoreError> {
        self.slots().insert(slot, value.to_string());
        Ok(())
    }

    fn remove(&self, slot: Slot) -> Result<(), StoreError> {
        self.slots().remove(&slot);
        Ok(())
    }
}

/// A store backed by a small JSON file on disk.
///
/// The whole file is re-read and re-written on every operation, which is
/// fine for two short strings.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        FileStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path { &self.path }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(BTreeMap::new())
            },
            Err(error) => return Err(self.io_error(error)),
        };

        serde_json::from_str(&raw).map_err(|error| StoreError::Corrupt {
            path: self.path.clone(),
            error,
        })
    }

    fn save(&self, slots: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let raw = serde_json::to_string_pretty(slots).map_err(|error| {
            StoreError::Corrupt {
                path: self.path.clone(),
                error,
            }
        })?;
        log::trace!("Writing {} slots to {}", slots.len(), self.path.display());

        // write to a sibling file and swap it in, so a crash part way through
        // never leaves a truncated store behind
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp =
            NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        temp.write_all(raw.as_bytes())
            .map_err(|e| self.io_error(e))?;
        temp.persist(&self.path)
            .map_err(|e| self.io_error(e.error))?;

        Ok(())
    }

    fn modify<F>(&self, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut slots = match self.load() {
            Ok(slots) => slots,
            Err(e @ StoreError::Corrupt { .. }) => {
                log::warn!("{}, starting from an empty store", e);
                BTreeMap::new()
            },
            Err(e) => return Err(e),
        };
        change(&mut slots);
        self.save(&slots)
    }

    fn io_error(&self, error: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            error,
        }
    }
}

impl CredentialStore for FileStore {
    fn get(&self, slot: Slot) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut slots = self.load()?;
        Ok(slots.remove(slot.key()))
    }

    fn set(&self, slot: Slot, value: &str) -> Result<(), StoreError> {
        self.modify(|slots| {
            slots.insert(slot.key().to_string(), value.to_string());
        })
    }

    fn remove(&self, slot: Slot) -> Result<(), StoreError> {
        self.modify(|slots| {
            slots.remove(slot.key());
        })
    }
}
