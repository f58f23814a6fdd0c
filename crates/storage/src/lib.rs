#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    FAVORITES_KEY, FavoritesRepository, InMemoryStore, KeyValueStore, PROGRESS_KEY,
    ProgressRepository, Storage, StorageError, WriteLocks,
};
