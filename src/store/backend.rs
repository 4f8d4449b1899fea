//! Storage backends for the record database and artifact content.

use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::{ProcGatherError, Result};
use crate::model::ArtifactId;

use super::schema::Database;

/// Where the record database and artifact content live.
///
/// A backend only moves whole documents; transactional semantics are
/// provided by [`LocalStore`](super::LocalStore) on top of `commit`.
pub trait StorageBackend: Send + Sync {
    /// Read the raw database document, or `None` if nothing was stored yet.
    fn load(&self) -> Result<Option<Value>>;

    /// Durably replace the database document. Must be all-or-nothing.
    fn commit(&self, db: &Database) -> Result<()>;

    /// Store the content of an artifact.
    fn write_blob(&self, id: ArtifactId, content: &[u8]) -> Result<()>;

    /// Read the content of an artifact, if any was stored.
    fn read_blob(&self, id: ArtifactId) -> Result<Option<Vec<u8>>>;

    /// Remove the content of an artifact. Missing content is not an error.
    fn remove_blob(&self, id: ArtifactId) -> Result<()>;

    /// Delete everything this backend stored. The database document goes
    /// last, so on failure it is still loadable.
    fn destroy(&self) -> Result<()>;
}

/// File-system backend.
///
/// Layout under the root directory:
/// - `store.json` - the record database
/// - `blobs/<artifact id>.bin` - artifact content
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Database file name.
    pub const DB_FILE: &'static str = "store.json";

    /// Create a backend rooted at `root`. Nothing is created until the
    /// first commit.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the database file path.
    pub fn db_path(&self) -> PathBuf {
        self.root.join(Self::DB_FILE)
    }

    fn blob_dir(&self) -> PathBuf {
        self.root.join("blobs")
    }

    fn blob_path(&self, id: ArtifactId) -> PathBuf {
        self.blob_dir().join(format!("{}.bin", id))
    }
}

/// Write to a sibling temp file, then rename over the target, so readers
/// never observe a partially written file.
fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);
    fs::write(&temp, content)?;
    fs::rename(&temp, path)?;
    Ok(())
}

impl StorageBackend for FileBackend {
    fn load(&self) -> Result<Option<Value>> {
        let path = self.db_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let raw = serde_json::from_str(&content).map_err(|e| {
            ProcGatherError::storage(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        Ok(Some(raw))
    }

    fn commit(&self, db: &Database) -> Result<()> {
        let content = serde_json::to_vec_pretty(db)
            .map_err(|e| ProcGatherError::storage(format!("Failed to serialize store: {}", e)))?;
        write_atomic(&self.db_path(), &content)
    }

    fn write_blob(&self, id: ArtifactId, content: &[u8]) -> Result<()> {
        write_atomic(&self.blob_path(id), content)
    }

    fn read_blob(&self, id: ArtifactId) -> Result<Option<Vec<u8>>> {
        match fs::read(self.blob_path(id)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove_blob(&self, id: ArtifactId) -> Result<()> {
        match fs::remove_file(self.blob_path(id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn destroy(&self) -> Result<()> {
        let blobs = self.blob_dir();
        if blobs.exists() {
            fs::remove_dir_all(blobs)?;
        }
        match fs::remove_file(self.db_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process backend, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    document: Mutex<Option<Value>>,
    blobs: Mutex<HashMap<ArtifactId, Vec<u8>>>,
}

impl MemoryBackend {
    /// An empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend preloaded with a raw database document.
    pub fn with_document(document: Value) -> Self {
        Self {
            document: Mutex::new(Some(document)),
            blobs: Mutex::new(HashMap::new()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| ProcGatherError::storage("Storage lock poisoned"))
}

impl StorageBackend for MemoryBackend {
    fn load(&self) -> Result<Option<Value>> {
        Ok(lock(&self.document)?.clone())
    }

    fn commit(&self, db: &Database) -> Result<()> {
        let value = serde_json::to_value(db)
            .map_err(|e| ProcGatherError::storage(format!("Failed to serialize store: {}", e)))?;
        *lock(&self.document)? = Some(value);
        Ok(())
    }

    fn write_blob(&self, id: ArtifactId, content: &[u8]) -> Result<()> {
        lock(&self.blobs)?.insert(id, content.to_vec());
        Ok(())
    }

    fn read_blob(&self, id: ArtifactId) -> Result<Option<Vec<u8>>> {
        Ok(lock(&self.blobs)?.get(&id).cloned())
    }

    fn remove_blob(&self, id: ArtifactId) -> Result<()> {
        lock(&self.blobs)?.remove(&id);
        Ok(())
    }

    fn destroy(&self) -> Result<()> {
        *lock(&self.document)? = None;
        lock(&self.blobs)?.clear();
        Ok(())
    }
}
