//! Persistence collaborators.
//!
//! - [`SnapshotStore`]: the document store, one whole-profile document per
//!   learner, overwritten on every save.
//! - [`LocalCache`]: a small synchronous key/value store (the local durable
//!   cache) used as a fallback between document-store round trips and for
//!   session and consent flags.
//!
//! File-backed implementations write to a temporary sibling and rename it
//! over the target, so readers never observe a half-written document.

use crate::progression::UserProfile;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed document: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("invalid document id '{0}'")]
    InvalidId(String),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Overwrite `path` with `contents` via a temp file and rename.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents).map_err(io_error(&tmp))?;
    fs::rename(&tmp, path).map_err(io_error(path))
}

// ==================== Snapshot store ====================

/// Document store for learner snapshots.
pub trait SnapshotStore: Send + Sync {
    fn load(&self, id: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Overwrite the whole snapshot keyed by `profile.id()`.
    fn save(&self, profile: &UserProfile) -> Result<(), StoreError>;
}

/// One pretty-printed `<id>.json` file per learner.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(io_error(&dir))?;
        Ok(Self { dir })
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        let valid = !id.is_empty()
            && !id.starts_with('.')
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", id)))
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self, id: &str) -> Result<Option<UserProfile>, StoreError> {
        let path = self.path_for(id)?;
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path)(e)),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let path = self.path_for(profile.id())?;
        let json = serde_json::to_vec_pretty(profile)?;
        write_atomic(&path, &json)?;
        debug!("Saved snapshot {}", path.display());
        Ok(())
    }
}

/// In-process document store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, UserProfile>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self, id: &str) -> Result<Option<UserProfile>, StoreError> {
        let documents = self.documents.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(documents.get(id).cloned())
    }

    fn save(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let mut documents = self.documents.lock().unwrap_or_else(PoisonError::into_inner);
        documents.insert(profile.id().to_string(), profile.clone());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

// ==================== Local cache ====================

/// Synchronous string key/value store.
pub trait LocalCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

pub fn read_json<T: DeserializeOwned>(
    cache: &dyn LocalCache,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match cache.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub fn write_json<T: Serialize>(
    cache: &dyn LocalCache,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    cache.set(key, &serde_json::to_string(value)?)
}

/// Cache persisted as a single JSON object file.
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileCache {
    /// Open the cache file at `path`, starting empty if it does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(io_error(&path)(e)),
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn update<F>(&self, mutate: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = entries.clone();
        mutate(&mut next);
        write_atomic(&self.path, &serde_json::to_vec_pretty(&next)?)?;
        *entries = next;
        Ok(())
    }
}

impl LocalCache for FileCache {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::LevelRules;
    use tempfile::TempDir;

    fn profile(id: &str) -> UserProfile {
        UserProfile::fresh(id, "Ada", "ada@example.com", None)
    }

    // ==================== JsonFileStore Tests ====================

    #[test]
    fn test_file_store_load_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        assert!(store.load("nobody").unwrap().is_none());
    }

    #[test]
    fn test_file_store_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        let saved = profile("uid-1").with_points(550, &LevelRules::default());

        store.save(&saved).unwrap();
        assert_eq!(store.load("uid-1").unwrap(), Some(saved));
    }

    #[test]
    fn test_file_store_overwrites_whole_document() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();

        store.save(&profile("uid-1").with_badges(["A", "B"])).unwrap();
        store.save(&profile("uid-1").with_badges(["C"])).unwrap();

        let loaded = store.load("uid-1").unwrap().unwrap();
        assert_eq!(loaded.badges(), &["C".to_string()]);
        assert!(!dir.path().join("uid-1.tmp").exists());
    }

    #[test]
    fn test_file_store_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        JsonFileStore::new(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_file_store_rejects_path_traversal() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();

        for id in ["", "../etc", "a/b", ".hidden"] {
            assert!(matches!(store.load(id), Err(StoreError::InvalidId(_))), "{}", id);
        }
    }

    #[test]
    fn test_file_store_malformed_document() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        fs::write(dir.path().join("uid-1.json"), "{not json").unwrap();

        assert!(matches!(store.load("uid-1"), Err(StoreError::Serde(_))));
    }

    // ==================== MemoryStore Tests ====================

    #[test]
    fn test_memory_store_counts_writes() {
        let store = MemoryStore::new();
        store.save(&profile("a")).unwrap();
        store.save(&profile("a")).unwrap();

        assert_eq!(store.write_count(), 2);
        assert!(store.load("a").unwrap().is_some());
        assert!(store.load("b").unwrap().is_none());
    }

    // ==================== FileCache Tests ====================

    #[test]
    fn test_file_cache_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");

        let cache = FileCache::open(&path).unwrap();
        cache.set("consent", "accepted").unwrap();
        drop(cache);

        let reopened = FileCache::open(&path).unwrap();
        assert_eq!(reopened.get("consent").unwrap().as_deref(), Some("accepted"));
    }

    #[test]
    fn test_file_cache_remove() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::open(dir.path().join("cache.json")).unwrap();
        cache.set("k", "v").unwrap();
        cache.remove("k").unwrap();
        cache.remove("never-set").unwrap();

        assert!(cache.get("k").unwrap().is_none());
    }

    #[test]
    fn test_file_cache_corrupt_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "[1, 2").unwrap();

        assert!(FileCache::open(&path).is_err());
    }

    // ==================== JSON Helper Tests ====================

    #[test]
    fn test_read_write_json_roundtrip_profile() {
        let cache = MemoryCache::new();
        let saved = profile("uid-1");

        write_json(&cache, "snapshot", &saved).unwrap();
        let loaded: Option<UserProfile> = read_json(&cache, "snapshot").unwrap();
        assert_eq!(loaded, Some(saved));
    }

    #[test]
    fn test_read_json_missing_key() {
        let cache = MemoryCache::new();
        let loaded: Option<UserProfile> = read_json(&cache, "snapshot").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_read_json_malformed_value() {
        let cache = MemoryCache::new();
        cache.set("snapshot", "nope").unwrap();
        let loaded: Result<Option<UserProfile>, _> = read_json(&cache, "snapshot");
        assert!(loaded.is_err());
    }
}
