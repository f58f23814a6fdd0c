use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use vocab_core::model::{FavoriteSet, UserProgress, WordItem};

/// Storage key holding the serialized `UserProgress` record.
pub const PROGRESS_KEY: &str = "user_progress";

/// Storage key holding the serialized favorites array.
pub const FAVORITES_KEY: &str = "savedWords";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    /// True when the record exists but could not be decoded.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, StorageError::Serialization(_))
    }
}

/// Raw string persistence: the provider every typed repository sits on.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value stored under `key`, or `None` if nothing was written yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key` in a single write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

//
// ─── TYPED REPOSITORIES ────────────────────────────────────────────────────────
//

#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Load the progress ledger.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the record is malformed, or
    /// `StorageError::Connection` if it cannot be read.
    async fn load_progress(&self) -> Result<Option<UserProgress>, StorageError>;

    /// Overwrite the progress ledger with `progress`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be encoded or written.
    async fn save_progress(&self, progress: &UserProgress) -> Result<(), StorageError>;
}

#[async_trait]
pub trait FavoritesRepository: Send + Sync {
    /// Load the saved words.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the record is malformed, or
    /// `StorageError::Connection` if it cannot be read.
    async fn load_favorites(&self) -> Result<Option<FavoriteSet>, StorageError>;

    /// Overwrite the saved words with `favorites`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be encoded or written.
    async fn save_favorites(&self, favorites: &FavoriteSet) -> Result<(), StorageError>;
}

async fn load_json<S, T>(store: &S, key: &str) -> Result<Option<T>, StorageError>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned + Send,
{
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|err| StorageError::Serialization(format!("{key}: {err}")))
}

async fn save_json<S, T>(store: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + Sync + ?Sized,
{
    let raw = serde_json::to_string(value)
        .map_err(|err| StorageError::Serialization(format!("{key}: {err}")))?;
    store.set(key, &raw).await
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> ProgressRepository for S {
    async fn load_progress(&self) -> Result<Option<UserProgress>, StorageError> {
        load_json(self, PROGRESS_KEY).await
    }

    async fn save_progress(&self, progress: &UserProgress) -> Result<(), StorageError> {
        save_json(self, PROGRESS_KEY, progress).await
    }
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> FavoritesRepository for S {
    async fn load_favorites(&self) -> Result<Option<FavoriteSet>, StorageError> {
        let words: Option<Vec<WordItem>> = load_json(self, FAVORITES_KEY).await?;
        Ok(words.map(FavoriteSet::from_words))
    }

    async fn save_favorites(&self, favorites: &FavoriteSet) -> Result<(), StorageError> {
        save_json(self, FAVORITES_KEY, &favorites.to_vec()).await
    }
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

/// Simple in-memory store for testing and prototyping.
///
/// Reads and writes can be made to fail on demand to exercise the
/// storage-unavailable paths of the services.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `get` fail with `StorageError::Connection`.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `set` fail with `StorageError::Connection`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("read failure injected".into()));
        }
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("write failure injected".into()));
        }
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// One async write lock per storage key, shared by every clone.
///
/// Services hold the lock for a key across their whole read-modify-write.
#[derive(Clone, Default)]
pub struct WriteLocks {
    keys: Arc<Mutex<HashMap<&'static str, Arc<tokio::sync::Mutex<()>>>>>,
}

impl WriteLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock guarding `key`, created on first use.
    #[must_use]
    pub fn for_key(&self, key: &'static str) -> Arc<tokio::sync::Mutex<()>> {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(keys.entry(key).or_default())
    }
}

/// Aggregates the typed repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub kv: Arc<dyn KeyValueStore>,
    pub progress: Arc<dyn ProgressRepository>,
    pub favorites: Arc<dyn FavoritesRepository>,
    pub locks: WriteLocks,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(InMemoryStore::new())
    }

    /// Wire every repository to the same key-value backend.
    #[must_use]
    pub fn from_store<S: KeyValueStore + Clone + 'static>(store: S) -> Self {
        let kv: Arc<dyn KeyValueStore> = Arc::new(store.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(store.clone());
        let favorites: Arc<dyn FavoritesRepository> = Arc::new(store);
        Self {
            kv,
            progress,
            favorites,
            locks: WriteLocks::new(),
        }
    }
}
