use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tempfile::NamedTempFile;

use crate::{KeyValueStore, StorageError, StorageResult};

/// File name of the document inside the storage directory
const DOCUMENT_NAME: &str = "session.json";

type Document = BTreeMap<String, String>;

/// Durable store backed by a single JSON document on disk
///
/// Every mutation rewrites the whole document into a temporary file next to
/// it and renames it over the original, so readers see either the previous or
/// the next document, never a mix.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Opens (and creates if needed) a store rooted at `dir`
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created
    pub fn open(dir: impl AsRef<Path>) -> StorageResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        Ok(Self {
            path: dir.join(DOCUMENT_NAME),
            write_lock: Mutex::new(()),
        })
    }

    /// Location of the backing document
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> StorageResult<Document> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Document::new()),
            Err(err) => return Err(err.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Document::new());
        }

        serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    fn write_document(&self, document: &Document) -> StorageResult<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut staged = NamedTempFile::new_in(dir)?;

        let encoded = serde_json::to_vec_pretty(document)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        staged.write_all(&encoded)?;
        staged.as_file().sync_all()?;

        staged.persist(&self.path).map_err(|e| e.error)?;
        tracing::debug!(path = %self.path.display(), "Session document written");
        Ok(())
    }

    fn update<F>(&self, mutate: F) -> StorageResult<()>
    where
        F: FnOnce(&mut Document) -> bool,
    {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        // A corrupt document would otherwise block every later write
        let (mut document, reset) = match self.read_document() {
            Err(StorageError::Corrupt { path, reason }) => {
                tracing::warn!(path = %path.display(), "Overwriting corrupt storage document: {reason}");
                (Document::new(), true)
            }
            other => (other?, false),
        };

        // Skip the rewrite when nothing changed
        if mutate(&mut document) || reset {
            self.write_document(&document)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.read_document()?.remove(key))
    }

    fn put_all(&self, entries: &[(&str, String)]) -> StorageResult<()> {
        self.update(|document| {
            for (key, value) in entries {
                document.insert((*key).to_owned(), value.clone());
            }
            true
        })
    }

    fn remove_all(&self, keys: &[&str]) -> StorageResult<()> {
        self.update(|document| {
            let mut changed = false;
            for key in keys {
                changed |= document.remove(*key).is_some();
            }
            changed
        })
    }
}
