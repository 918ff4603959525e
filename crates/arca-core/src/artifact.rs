//! # Artifact Index Records
//!
//! `ArtifactEntry` is the persisted record tracking an artifact's logical
//! existence in the metadata index, keyed by (storage id, repository id,
//! artifact path). The physical file and the record live in independent
//! stores; the storage layer removes the record whenever it permanently
//! removes the file.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::{RepositoryId, StorageId};

/// An artifact's record in the metadata index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    pub uuid: Uuid,
    pub storage_id: StorageId,
    pub repository_id: RepositoryId,
    /// `/`-separated path relative to the repository root.
    pub artifact_path: String,
    /// Hex digests keyed by algorithm name.
    #[serde(default)]
    pub checksums: BTreeMap<String, String>,
    #[serde(default)]
    pub size_in_bytes: u64,
    pub created: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl ArtifactEntry {
    /// A fresh record with a random id and both timestamps set to now.
    pub fn new(storage_id: StorageId, repository_id: RepositoryId, artifact_path: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            uuid: Uuid::new_v4(),
            storage_id,
            repository_id,
            artifact_path: artifact_path.into(),
            checksums: BTreeMap::new(),
            size_in_bytes: 0,
            created: now,
            last_updated: now,
        }
    }

    pub fn with_checksums(mut self, checksums: BTreeMap<String, String>) -> Self {
        self.checksums = checksums;
        self
    }

    pub fn with_size(mut self, size_in_bytes: u64) -> Self {
        self.size_in_bytes = size_in_bytes;
        self
    }

    /// Mark the record as updated now.
    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }

    /// Returns `true` if this record is keyed by the given coordinates.
    pub fn matches(&self, storage_id: &StorageId, repository_id: &RepositoryId, artifact_path: &str) -> bool {
        &self.storage_id == storage_id
            && &self.repository_id == repository_id
            && self.artifact_path == artifact_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_on_full_key() {
        let entry = ArtifactEntry::new(StorageId::new("s"), RepositoryId::new("r"), "a/b.jar");
        assert!(entry.matches(&StorageId::new("s"), &RepositoryId::new("r"), "a/b.jar"));
        assert!(!entry.matches(&StorageId::new("s"), &RepositoryId::new("other"), "a/b.jar"));
        assert!(!entry.matches(&StorageId::new("s"), &RepositoryId::new("r"), "a/c.jar"));
    }

    #[test]
    fn json_shape() {
        let mut checksums = BTreeMap::new();
        checksums.insert("SHA-1".to_string(), "a9993e364706816aba3e25717850c26c9cd0d89d".to_string());
        let entry = ArtifactEntry::new(StorageId::new("s"), RepositoryId::new("r"), "abc.txt")
            .with_checksums(checksums)
            .with_size(3);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["storage_id"], "s");
        assert_eq!(value["artifact_path"], "abc.txt");
        assert_eq!(value["size_in_bytes"], 3);
        let back: ArtifactEntry = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }
}
