//! Client-side watchlist.
//!
//! The watchlist holds full entry snapshots (not just ids) so it can be
//! rendered without a round trip. Every mutation rewrites one serialized
//! snapshot through a [`WatchlistStorage`] port.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::warn;

use crate::catalog::CatalogEntry;

#[derive(Debug, Error)]
pub enum WatchlistError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistence port for the serialized watchlist snapshot.
pub trait WatchlistStorage {
    /// The last written snapshot, if any.
    fn read(&self) -> Result<Option<String>, WatchlistError>;

    /// Replace the snapshot.
    fn write(&self, snapshot: &str) -> Result<(), WatchlistError>;
}

/// In-memory storage. Clones share the same slot, which lets tests simulate
/// a reload by building a second watchlist over a clone.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with a raw snapshot.
    pub fn with_snapshot(snapshot: &str) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(snapshot.to_string()))),
        }
    }
}

impl WatchlistStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>, WatchlistError> {
        self.slot
            .lock()
            .map(|slot| slot.clone())
            .map_err(|_| WatchlistError::Storage("storage lock poisoned".to_string()))
    }

    fn write(&self, snapshot: &str) -> Result<(), WatchlistError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| WatchlistError::Storage("storage lock poisoned".to_string()))?;
        *slot = Some(snapshot.to_string());
        Ok(())
    }
}

/// Snapshot kept in a JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WatchlistStorage for FileStorage {
    fn read(&self) -> Result<Option<String>, WatchlistError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, snapshot: &str) -> Result<(), WatchlistError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        // Write-then-rename so a crash never leaves a half-written snapshot
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, snapshot)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Saved entries, deduplicated by id, in the order they were added.
pub struct Watchlist<S: WatchlistStorage> {
    storage: S,
    items: Vec<CatalogEntry>,
}

impl<S: WatchlistStorage> Watchlist<S> {
    /// Restore the watchlist from storage.
    ///
    /// A missing, unreadable or corrupt snapshot yields an empty watchlist.
    pub fn load(storage: S) -> Self {
        let items = match storage.read() {
            Ok(Some(snapshot)) => match serde_json::from_str::<Vec<CatalogEntry>>(&snapshot) {
                Ok(items) => dedup(items),
                Err(e) => {
                    warn!(error = %e, "Discarding corrupt watchlist snapshot");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read watchlist snapshot");
                Vec::new()
            }
        };

        Self { storage, items }
    }

    pub fn items(&self) -> &[CatalogEntry] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|e| e.id == id)
    }

    /// Add an entry. Returns `false` (and changes nothing) if it is already saved.
    ///
    /// The in-memory list only changes once the new snapshot is written.
    pub fn add(&mut self, entry: CatalogEntry) -> Result<bool, WatchlistError> {
        if self.contains(&entry.id) {
            return Ok(false);
        }
        let mut next = self.items.clone();
        next.push(entry);
        self.commit(next)?;
        Ok(true)
    }

    /// Remove an entry by id. Returns whether it was present.
    pub fn remove(&mut self, id: &str) -> Result<bool, WatchlistError> {
        if !self.contains(id) {
            return Ok(false);
        }
        let next = self.items.iter().filter(|e| e.id != id).cloned().collect();
        self.commit(next)?;
        Ok(true)
    }

    /// Add the entry if absent, remove it if present. Returns the new membership.
    pub fn toggle(&mut self, entry: CatalogEntry) -> Result<bool, WatchlistError> {
        if self.contains(&entry.id) {
            self.remove(&entry.id)?;
            Ok(false)
        } else {
            self.add(entry)?;
            Ok(true)
        }
    }

    pub fn clear(&mut self) -> Result<(), WatchlistError> {
        self.commit(Vec::new())
    }

    fn commit(&mut self, next: Vec<CatalogEntry>) -> Result<(), WatchlistError> {
        let snapshot = serde_json::to_string(&next)?;
        self.storage.write(&snapshot)?;
        self.items = next;
        Ok(())
    }
}

fn dedup(items: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
    let mut unique: Vec<CatalogEntry> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.iter().any(|e| e.id == item.id) {
            unique.push(item);
        }
    }
    unique
}
