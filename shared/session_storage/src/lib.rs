//! Durable client-side key-value storage
//!
//! Holds the small amount of state a client keeps between runs, such as the
//! session token and the cached user profile. Two backends are provided:
//! [`FileStore`] for persistence across restarts and [`MemoryStore`] for
//! tests and ephemeral sessions.

mod error;
mod file;
mod memory;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::MemoryStore;

/// String key-value storage with atomic multi-key updates
pub trait KeyValueStore: Send + Sync {
    /// Reads a value; a missing key is `Ok(None)`
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing storage cannot be read or decoded
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Writes every entry in a single atomic step
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the update cannot be persisted; no entry is
    /// written in that case
    fn put_all(&self, entries: &[(&str, String)]) -> StorageResult<()>;

    /// Removes every key in a single atomic step; absent keys are ignored
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the update cannot be persisted
    fn remove_all(&self, keys: &[&str]) -> StorageResult<()>;
}
