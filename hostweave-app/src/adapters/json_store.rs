//! JSON-file storage adapter.
//!
//! One data directory holds everything: `entries.json` (the nested entry
//! list), `history.json` (snapshots, oldest first), and `content/` with one
//! file per entry id. Documents are cached in memory and written through;
//! every write goes to a temp file first and is renamed into place, so a
//! crashed write never leaves a half-document behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use hostweave_core::error::{CoreError, CoreResult};
use hostweave_core::traits::{ContentStore, EntryRepository, SnapshotRepository};
use hostweave_core::types::{HistorySnapshot, HostsEntry};

const ENTRIES_FILE: &str = "entries.json";
const HISTORY_FILE: &str = "history.json";
const CONTENT_DIR: &str = "content";

/// JSON-file backed store implementing all three storage traits.
pub struct JsonStore {
    dir: PathBuf,
    entries: RwLock<Vec<HostsEntry>>,
    snapshots: RwLock<Vec<HistorySnapshot>>,
}

impl JsonStore {
    /// Open (or initialize) a store at `dir`.
    ///
    /// Missing directories are created; missing documents start empty.
    /// Reopening an existing directory restores all persisted state.
    pub async fn open(dir: impl Into<PathBuf>) -> CoreResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(dir.join(CONTENT_DIR))
            .await
            .map_err(storage_err)?;

        let entries = read_document(&dir.join(ENTRIES_FILE)).await?;
        let snapshots = read_document(&dir.join(HISTORY_FILE)).await?;

        Ok(Self {
            dir,
            entries: RwLock::new(entries),
            snapshots: RwLock::new(snapshots),
        })
    }

    fn entries_path(&self) -> PathBuf {
        self.dir.join(ENTRIES_FILE)
    }

    fn history_path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE)
    }

    fn content_path(&self, entry_id: &str) -> CoreResult<PathBuf> {
        // Ids come from the core as UUIDs; anything path-like is refused
        // rather than resolved.
        if entry_id.is_empty()
            || entry_id.contains(['/', '\\'])
            || entry_id.contains("..")
        {
            return Err(CoreError::StorageError(format!(
                "invalid entry id: {entry_id}"
            )));
        }
        Ok(self.dir.join(CONTENT_DIR).join(format!("{entry_id}.hosts")))
    }
}

fn storage_err(e: std::io::Error) -> CoreError {
    CoreError::StorageError(e.to_string())
}

/// Read and parse a JSON document, defaulting to empty when the file does
/// not exist yet.
async fn read_document<T: serde::de::DeserializeOwned + Default>(path: &Path) -> CoreResult<T> {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            serde_json::from_slice(&bytes).map_err(|e| CoreError::SerializationError(e.to_string()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(storage_err(e)),
    }
}

/// Serialize and write a document through a temp file + rename.
async fn write_document<T: serde::Serialize>(path: &Path, value: &T) -> CoreResult<()> {
    let bytes =
        serde_json::to_vec_pretty(value).map_err(|e| CoreError::SerializationError(e.to_string()))?;

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &bytes).await.map_err(storage_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(storage_err)
}

#[async_trait]
impl EntryRepository for JsonStore {
    async fn find_all(&self) -> CoreResult<Vec<HostsEntry>> {
        Ok(self.entries.read().await.clone())
    }

    async fn save_all(&self, entries: &[HostsEntry]) -> CoreResult<()> {
        let mut cache = self.entries.write().await;
        write_document(&self.entries_path(), &entries).await?;
        *cache = entries.to_vec();
        Ok(())
    }
}

#[async_trait]
impl SnapshotRepository for JsonStore {
    async fn find_all(&self) -> CoreResult<Vec<HistorySnapshot>> {
        Ok(self.snapshots.read().await.clone())
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<HistorySnapshot>> {
        Ok(self
            .snapshots
            .read()
            .await
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn append(&self, snapshot: &HistorySnapshot) -> CoreResult<()> {
        let mut cache = self.snapshots.write().await;
        let mut next = cache.clone();
        next.push(snapshot.clone());
        write_document(&self.history_path(), &next).await?;
        *cache = next;
        Ok(())
    }

    async fn delete(&self, id: &str) -> CoreResult<()> {
        let mut cache = self.snapshots.write().await;
        let next: Vec<HistorySnapshot> = cache.iter().filter(|s| s.id != id).cloned().collect();
        write_document(&self.history_path(), &next).await?;
        *cache = next;
        Ok(())
    }
}

#[async_trait]
impl ContentStore for JsonStore {
    async fn get(&self, entry_id: &str) -> CoreResult<Option<String>> {
        match tokio::fs::read_to_string(self.content_path(entry_id)?).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_err(e)),
        }
    }

    async fn set(&self, entry_id: &str, content: &str) -> CoreResult<()> {
        let path = self.content_path(entry_id)?;
        let tmp = path.with_extension("hosts.tmp");
        tokio::fs::write(&tmp, content.as_bytes())
            .await
            .map_err(storage_err)?;
        tokio::fs::rename(&tmp, &path).await.map_err(storage_err)
    }

    async fn remove(&self, entry_id: &str) -> CoreResult<()> {
        match tokio::fs::remove_file(self.content_path(entry_id)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_err(e)),
        }
    }
}
