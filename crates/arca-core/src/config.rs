//! # Storage Configuration
//!
//! YAML description of the storages and repositories served by one
//! process. The digest algorithm set belongs to the storage; every
//! repository inside it inherits that set.
//!
//! ```yaml
//! storages:
//!   - id: storage0
//!     base_dir: /var/lib/arca/storage0
//!     digest_algorithms: [MD5, SHA-1]
//!     repositories:
//!       - id: releases
//!         layout: maven2
//!         trash_enabled: true
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::digest::DigestAlgorithmSet;
use crate::error::ConfigError;
use crate::identity::{RepositoryId, StorageId};
use crate::path::{Repository, DEFAULT_LAYOUT};

/// Root configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcaConfig {
    #[serde(default)]
    pub storages: Vec<StorageConfig>,
}

/// A storage unit: a base directory holding one directory per repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub id: String,
    pub base_dir: PathBuf,
    #[serde(default)]
    pub digest_algorithms: DigestAlgorithmSet,
    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,
}

/// A repository inside a storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub id: String,
    #[serde(default = "default_layout")]
    pub layout: String,
    #[serde(default = "default_trash_enabled")]
    pub trash_enabled: bool,
}

fn default_layout() -> String {
    DEFAULT_LAYOUT.to_string()
}

fn default_trash_enabled() -> bool {
    true
}

impl ArcaConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Check identifier rules: non-empty, unique storages, unique
    /// repositories per storage, a non-empty digest set per storage.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut storage_ids = HashSet::new();
        for storage in &self.storages {
            if storage.id.trim().is_empty() {
                return Err(ConfigError::Invalid("storage id must not be empty".into()));
            }
            if !storage_ids.insert(storage.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate storage id: {}",
                    storage.id
                )));
            }
            if storage.digest_algorithms.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "storage {} has an empty digest algorithm set",
                    storage.id
                )));
            }
            let mut repository_ids = HashSet::new();
            for repository in &storage.repositories {
                if repository.id.trim().is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "storage {} has a repository with an empty id",
                        storage.id
                    )));
                }
                if !repository_ids.insert(repository.id.as_str()) {
                    return Err(ConfigError::Invalid(format!(
                        "duplicate repository id {} in storage {}",
                        repository.id, storage.id
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn storage(&self, storage_id: &str) -> Option<&StorageConfig> {
        self.storages.iter().find(|s| s.id == storage_id)
    }

    /// Build the runtime [`Repository`] for a (storage, repository) pair.
    pub fn repository(&self, storage_id: &str, repository_id: &str) -> Option<Arc<Repository>> {
        let storage = self.storage(storage_id)?;
        let repository = storage.repositories.iter().find(|r| r.id == repository_id)?;
        Some(Arc::new(storage.build_repository(repository)))
    }
}

impl StorageConfig {
    /// Base directory of a repository in this storage.
    pub fn repository_dir(&self, repository_id: &str) -> PathBuf {
        self.base_dir.join(repository_id)
    }

    fn build_repository(&self, repository: &RepositoryConfig) -> Repository {
        Repository::new(
            StorageId::new(self.id.clone()),
            RepositoryId::new(repository.id.clone()),
            self.repository_dir(&repository.id),
        )
        .with_layout(repository.layout.clone())
        .with_trash_enabled(repository.trash_enabled)
        .with_digest_algorithms(self.digest_algorithms.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
storages:
  - id: storage0
    base_dir: /var/lib/arca/storage0
    digest_algorithms: [SHA-1, SHA-256]
    repositories:
      - id: releases
        layout: maven2
      - id: scratch
        trash_enabled: false
  - id: storage1
    base_dir: /var/lib/arca/storage1
"#;

    #[test]
    fn parses_with_defaults() {
        let config = ArcaConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.storages.len(), 2);

        let releases = config.repository("storage0", "releases").unwrap();
        assert_eq!(releases.layout(), "maven2");
        assert!(releases.trash_enabled());
        assert_eq!(
            releases.digest_algorithms().iter().collect::<Vec<_>>(),
            vec!["SHA-1", "SHA-256"]
        );
        assert_eq!(
            releases.base_dir(),
            Path::new("/var/lib/arca/storage0/releases")
        );

        let scratch = config.repository("storage0", "scratch").unwrap();
        assert_eq!(scratch.layout(), "raw");
        assert!(!scratch.trash_enabled());

        let storage1 = config.storage("storage1").unwrap();
        assert_eq!(storage1.digest_algorithms, DigestAlgorithmSet::default());
        assert!(config.repository("storage1", "releases").is_none());
    }

    #[test]
    fn rejects_duplicate_storage() {
        let yaml = "storages:\n  - {id: a, base_dir: /a}\n  - {id: a, base_dir: /b}\n";
        let err = ArcaConfig::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate storage id"));
    }

    #[test]
    fn rejects_duplicate_repository() {
        let yaml = "storages:\n  - id: a\n    base_dir: /a\n    repositories: [{id: r}, {id: r}]\n";
        let err = ArcaConfig::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate repository id r"));
    }

    #[test]
    fn rejects_empty_digest_set() {
        let yaml = "storages:\n  - id: a\n    base_dir: /a\n    digest_algorithms: []\n";
        assert!(matches!(
            ArcaConfig::from_yaml_str(yaml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        assert!(matches!(
            ArcaConfig::from_yaml_str("storages: [ {id: "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ArcaConfig::load(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("arca.yaml");
        std::fs::write(&file, SAMPLE).unwrap();
        let config = ArcaConfig::load(&file).unwrap();
        assert!(config.storage("storage0").is_some());
    }
}
