//! # Artifact Metadata Index
//!
//! The index records an artifact's logical existence independently of the
//! physical file. The storage layer only needs lookup by (storage,
//! repository, path) and removal; `save` exists for the upload path.
//!
//! [`InMemoryArtifactEntryService`] keeps records in memory and can
//! snapshot them to a JSON file for tools that run one command per process.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use arca_core::{ArtifactEntry, RepositoryId, StorageError, StorageId};
use parking_lot::RwLock;

/// Persisted artifact metadata index.
pub trait ArtifactEntryService: Send + Sync {
    /// Look up a record. Absent records are `Ok(None)`.
    fn find_one_artifact(
        &self,
        storage_id: &StorageId,
        repository_id: &RepositoryId,
        artifact_path: &str,
    ) -> Result<Option<ArtifactEntry>, StorageError>;

    /// Insert or replace the record with the same key.
    fn save(&self, entry: ArtifactEntry) -> Result<ArtifactEntry, StorageError>;

    /// Remove a record. Removing an absent record succeeds.
    fn delete(&self, entry: &ArtifactEntry) -> Result<(), StorageError>;
}

type IndexKey = (StorageId, RepositoryId, String);

fn key_of(entry: &ArtifactEntry) -> IndexKey {
    (
        entry.storage_id.clone(),
        entry.repository_id.clone(),
        entry.artifact_path.clone(),
    )
}

/// In-process index.
#[derive(Debug, Default)]
pub struct InMemoryArtifactEntryService {
    entries: RwLock<BTreeMap<IndexKey, ArtifactEntry>>,
}

impl InMemoryArtifactEntryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON snapshot written by [`save_json`](Self::save_json). A
    /// missing file is an empty index.
    pub fn load_json(path: &Path) -> Result<Self, StorageError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let bytes = fs::read(path)?;
        let entries: Vec<ArtifactEntry> = serde_json::from_slice(&bytes).map_err(|e| {
            StorageError::Index(format!("index snapshot {} is not valid: {e}", path.display()))
        })?;
        let index = Self::new();
        {
            let mut map = index.entries.write();
            for entry in entries {
                map.insert(key_of(&entry), entry);
            }
        }
        Ok(index)
    }

    /// Write all records as a JSON array, replacing `path` atomically.
    pub fn save_json(&self, path: &Path) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(&self.entries())
            .map_err(|e| StorageError::Index(format!("failed to serialize index: {e}")))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Snapshot of all records, ordered by key.
    pub fn entries(&self) -> Vec<ArtifactEntry> {
        self.entries.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl ArtifactEntryService for InMemoryArtifactEntryService {
    fn find_one_artifact(
        &self,
        storage_id: &StorageId,
        repository_id: &RepositoryId,
        artifact_path: &str,
    ) -> Result<Option<ArtifactEntry>, StorageError> {
        let key = (
            storage_id.clone(),
            repository_id.clone(),
            artifact_path.to_string(),
        );
        Ok(self.entries.read().get(&key).cloned())
    }

    fn save(&self, mut entry: ArtifactEntry) -> Result<ArtifactEntry, StorageError> {
        let mut entries = self.entries.write();
        let key = key_of(&entry);
        if let Some(existing) = entries.get(&key) {
            entry.uuid = existing.uuid;
            entry.created = existing.created;
            entry.touch();
        }
        entries.insert(key, entry.clone());
        Ok(entry)
    }

    fn delete(&self, entry: &ArtifactEntry) -> Result<(), StorageError> {
        self.entries.write().remove(&key_of(entry));
        Ok(())
    }
}
