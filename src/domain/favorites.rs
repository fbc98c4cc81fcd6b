//! Favorite images and the key-value store they persist to

use super::ImageRef;
use crate::error::{ArchflashError, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Storage key holding the JSON array of favorite images
pub const FAVORITES_KEY: &str = "archFlashFavsImg";

/// String-keyed persistent storage
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Key-value store backed by a single JSON object file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location (~/.local/share/archflash/storage.json on Linux)
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("archflash").join("storage.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| {
            ArchflashError::PersistenceUnavailable(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            ArchflashError::PersistenceUnavailable(format!(
                "Failed to parse {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        // A corrupt file is replaced rather than blocking every later write
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ArchflashError::PersistenceUnavailable(format!(
                    "Failed to create storage directory: {}",
                    e
                ))
            })?;
        }

        let contents = serde_json::to_string_pretty(&entries).map_err(|e| {
            ArchflashError::PersistenceUnavailable(format!("Failed to serialize storage: {}", e))
        })?;

        // Write to a sibling file first so a crash never leaves half a document
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, contents)
            .and_then(|_| fs::rename(&staging, &self.path))
            .map_err(|e| {
                ArchflashError::PersistenceUnavailable(format!(
                    "Failed to write {}: {}",
                    self.path.display(),
                    e
                ))
            })
    }
}

/// In-memory store; clones share the same entries
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    unavailable: bool,
}

impl MemoryStore {
    /// A store whose every access fails, like storage disabled by the user
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::default();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }

    fn check(&self) -> Result<()> {
        if self.unavailable {
            return Err(ArchflashError::PersistenceUnavailable(
                "storage disabled".to_string(),
            ));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        let entries = self
            .entries
            .lock()
            .map_err(|_| ArchflashError::PersistenceUnavailable("store lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.check()?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ArchflashError::PersistenceUnavailable("store lock poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The favorite set, flushed in full to its store on every change
pub struct Favorites {
    images: HashSet<ImageRef>,
    store: Box<dyn KeyValueStore>,
    storage_available: bool,
}

impl std::fmt::Debug for Favorites {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Favorites")
            .field("images", &self.images)
            .field("storage_available", &self.storage_available)
            .finish()
    }
}

impl Favorites {
    /// Reads the saved favorites once. Unreadable or malformed data yields an
    /// empty set; the store is still written to on later changes.
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let (images, storage_available) = match store.get(FAVORITES_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<ImageRef>>(&raw) {
                Ok(list) => (list.into_iter().collect(), true),
                Err(e) => {
                    tracing::warn!(error = %e, "saved favorites are malformed, starting empty");
                    (HashSet::new(), true)
                }
            },
            Ok(None) => (HashSet::new(), true),
            Err(e) => {
                tracing::warn!(error = %e, "favorites storage unavailable, starting empty");
                (HashSet::new(), false)
            }
        };

        tracing::debug!(count = images.len(), "loaded favorites");

        Self {
            images,
            store,
            storage_available,
        }
    }

    pub fn contains(&self, image: &ImageRef) -> bool {
        self.images.contains(image)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Whether the last storage access succeeded
    pub fn storage_available(&self) -> bool {
        self.storage_available
    }

    /// Favorites in a stable (sorted) order
    pub fn to_sorted_vec(&self) -> Vec<ImageRef> {
        let mut list: Vec<ImageRef> = self.images.iter().cloned().collect();
        list.sort();
        list
    }

    /// Flips membership of `image`, persists the whole set and returns the
    /// new membership
    pub fn toggle(&mut self, image: &ImageRef) -> bool {
        let now_favorite = if self.images.remove(image) {
            false
        } else {
            self.images.insert(image.clone());
            true
        };

        self.persist();
        now_favorite
    }

    fn persist(&mut self) {
        let serialized = match serde_json::to_string(&self.to_sorted_vec()) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize favorites");
                return;
            }
        };

        match self.store.set(FAVORITES_KEY, &serialized) {
            Ok(()) => self.storage_available = true,
            Err(e) => {
                tracing::warn!(error = %e, "failed to save favorites");
                self.storage_available = false;
            }
        }
    }
}
