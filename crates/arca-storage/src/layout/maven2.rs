//! # Maven 2 Layout
//!
//! Files live at `<group path>/<artifactId>/<version>/<file>`, where an
//! artifact file name starts with `<artifactId>-<version>`. Snapshot
//! versions (`1.0-SNAPSHOT`) also match timestamped file names
//! (`lib-1.0-20240101.120000-1.jar`) through the base version `1.0`.
//!
//! `maven-metadata.xml` files at the artifact and version level describe
//! the available versions. Deleting a version directory leaves the
//! artifact-level metadata stale, so [`Maven2LayoutProvider::delete_metadata`]
//! removes it together with its checksum sidecars. Metadata that does not
//! list the deleted directory as a version is left alone.

use std::io::Read;

use arca_core::{
    AttributeValue, DigestAlgorithm, RepositoryFileAttributeType, RepositoryFileAttributes, RepositoryPath,
    StorageError,
};

use super::raw::has_checksum_extension;
use super::LayoutProvider;
use crate::backend::StorageBackend;

pub const ALIAS: &str = "maven2";

pub const METADATA_FILE: &str = "maven-metadata.xml";

const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

#[derive(Debug, Clone, Copy, Default)]
pub struct Maven2LayoutProvider;

/// `group:artifact:version` parsed from a repository-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenCoordinates {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl std::fmt::Display for MavenCoordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

impl MavenCoordinates {
    /// Parse an artifact file path. Returns `None` for paths that are not
    /// laid out as a Maven artifact file.
    pub fn parse(relative: &str) -> Option<Self> {
        let parts: Vec<&str> = relative.split('/').filter(|p| !p.is_empty()).collect();
        if parts.len() < 4 {
            return None;
        }
        let (&file, rest) = parts.split_last()?;
        let (&version, rest) = rest.split_last()?;
        let (&artifact_id, group) = rest.split_last()?;
        if group.is_empty() || file == METADATA_FILE {
            return None;
        }

        let matches_prefix = |v: &str| {
            let prefix = format!("{artifact_id}-{v}");
            file.len() > prefix.len() && file.starts_with(&prefix)
        };
        let base_version = version.strip_suffix(SNAPSHOT_SUFFIX);
        if !matches_prefix(version) && !base_version.is_some_and(matches_prefix) {
            return None;
        }

        Some(Self {
            group_id: group.join("."),
            artifact_id: artifact_id.to_string(),
            version: version.to_string(),
        })
    }
}

fn is_metadata(path: &RepositoryPath) -> bool {
    path.file_name() == Some(METADATA_FILE)
}

impl LayoutProvider for Maven2LayoutProvider {
    fn alias(&self) -> &'static str {
        ALIAS
    }

    fn repository_file_attributes(
        &self,
        path: &RepositoryPath,
        types: &[RepositoryFileAttributeType],
    ) -> Result<RepositoryFileAttributes, StorageError> {
        let checksum = has_checksum_extension(path);
        let metadata = is_metadata(path);
        let mut attributes = RepositoryFileAttributes::new();
        for &attribute in types {
            match attribute {
                RepositoryFileAttributeType::Checksum => {
                    attributes.insert(attribute, AttributeValue::Flag(checksum));
                }
                RepositoryFileAttributeType::Metadata => {
                    attributes.insert(attribute, AttributeValue::Flag(metadata));
                }
                RepositoryFileAttributeType::Artifact => {
                    let artifact =
                        !checksum && !metadata && MavenCoordinates::parse(&path.relativize()?).is_some();
                    attributes.insert(attribute, AttributeValue::Flag(artifact));
                }
                RepositoryFileAttributeType::Coordinates => {
                    if let Some(coordinates) = MavenCoordinates::parse(&path.relativize()?) {
                        attributes.insert(attribute, AttributeValue::Text(coordinates.to_string()));
                    }
                }
            }
        }
        Ok(attributes)
    }

    fn delete_metadata(&self, backend: &dyn StorageBackend, path: &RepositoryPath) -> Result<(), StorageError> {
        if !backend.is_directory(path) {
            return Ok(());
        }
        let (Some(parent), Some(version)) = (path.parent(), path.file_name()) else {
            return Ok(());
        };
        let metadata = parent.resolve(METADATA_FILE);
        if !backend.exists(&metadata) || !lists_version(backend, &metadata, version)? {
            return Ok(());
        }

        for algorithm in DigestAlgorithm::ALL {
            let sidecar = metadata.resolve_sibling(&format!("{METADATA_FILE}.{}", algorithm.extension()));
            if backend.exists(&sidecar) {
                backend.delete(&sidecar, true)?;
            }
        }
        backend.delete(&metadata, true)?;
        tracing::debug!(path = %metadata, "removed stale maven metadata");
        Ok(())
    }
}

/// Whether the metadata at `metadata` lists `version` among its versions,
/// which is what makes it artifact-level metadata for that version
/// directory rather than group-level metadata.
fn lists_version(backend: &dyn StorageBackend, metadata: &RepositoryPath, version: &str) -> Result<bool, StorageError> {
    let mut content = String::new();
    backend.open_read(metadata)?.read_to_string(&mut content)?;
    Ok(content.contains(&format!("<version>{version}</version>")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FsStorageBackend;
    use arca_core::attributes::flag;
    use arca_core::{Repository, RepositoryId, StorageId};
    use std::fs;
    use std::sync::Arc;

    const ARTIFACT_METADATA: &str = "<metadata><groupId>org.example</groupId><artifactId>lib</artifactId>\
        <versioning><versions><version>1.0</version></versions></versioning></metadata>";

    const GROUP_METADATA: &str = "<metadata><plugins><plugin><prefix>lib</prefix>\
        <artifactId>lib</artifactId></plugin></plugins></metadata>";

    fn root(base: &std::path::Path) -> RepositoryPath {
        RepositoryPath::root(Arc::new(
            Repository::new(StorageId::new("storage0"), RepositoryId::new("releases"), base).with_layout(ALIAS),
        ))
    }

    #[test]
    fn parses_release_coordinates() {
        let coordinates = MavenCoordinates::parse("org/example/lib/1.0/lib-1.0.jar").unwrap();
        assert_eq!(coordinates.to_string(), "org.example:lib:1.0");
        assert!(MavenCoordinates::parse("org/example/lib/1.0/lib-1.0-sources.jar").is_some());
    }

    #[test]
    fn parses_timestamped_snapshot() {
        let coordinates =
            MavenCoordinates::parse("org/example/lib/1.0-SNAPSHOT/lib-1.0-20240101.120000-1.jar").unwrap();
        assert_eq!(coordinates.version, "1.0-SNAPSHOT");
    }

    #[test]
    fn rejects_non_artifact_paths() {
        assert!(MavenCoordinates::parse("lib/1.0/lib-1.0.jar").is_none());
        assert!(MavenCoordinates::parse("org/example/lib/1.0/other-1.0.jar").is_none());
        assert!(MavenCoordinates::parse("org/example/lib/1.0/lib-1.0").is_none());
        assert!(MavenCoordinates::parse("org/example/lib/maven-metadata.xml").is_none());
    }

    #[test]
    fn classifies_files() {
        let root = root(std::path::Path::new("/srv/releases"));
        let types = [
            RepositoryFileAttributeType::Checksum,
            RepositoryFileAttributeType::Artifact,
            RepositoryFileAttributeType::Metadata,
            RepositoryFileAttributeType::Coordinates,
        ];

        let jar = Maven2LayoutProvider
            .repository_file_attributes(&root.resolve("org/example/lib/1.0/lib-1.0.jar"), &types)
            .unwrap();
        assert!(flag(&jar, RepositoryFileAttributeType::Artifact));
        assert_eq!(
            jar[&RepositoryFileAttributeType::Coordinates].as_text(),
            Some("org.example:lib:1.0")
        );

        let sha1 = Maven2LayoutProvider
            .repository_file_attributes(&root.resolve("org/example/lib/1.0/lib-1.0.jar.sha1"), &types)
            .unwrap();
        assert!(flag(&sha1, RepositoryFileAttributeType::Checksum));
        assert!(!flag(&sha1, RepositoryFileAttributeType::Artifact));

        let metadata = Maven2LayoutProvider
            .repository_file_attributes(&root.resolve("org/example/lib/maven-metadata.xml"), &types)
            .unwrap();
        assert!(flag(&metadata, RepositoryFileAttributeType::Metadata));
        assert!(!flag(&metadata, RepositoryFileAttributeType::Artifact));
        assert!(!metadata.contains_key(&RepositoryFileAttributeType::Coordinates));
    }

    #[test]
    fn deleting_version_directory_removes_artifact_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let root = root(dir.path());
        let artifact_dir = dir.path().join("org/example/lib");
        fs::create_dir_all(artifact_dir.join("1.0")).unwrap();
        fs::write(artifact_dir.join(METADATA_FILE), ARTIFACT_METADATA).unwrap();
        fs::write(artifact_dir.join("maven-metadata.xml.sha1"), "x").unwrap();
        let backend = FsStorageBackend::new();

        Maven2LayoutProvider
            .delete_metadata(&backend, &root.resolve("org/example/lib/1.0"))
            .unwrap();
        assert!(!artifact_dir.join(METADATA_FILE).exists());
        assert!(!artifact_dir.join("maven-metadata.xml.sha1").exists());
        assert!(!dir.path().join(".trash").exists());
    }

    #[test]
    fn deleting_artifact_directory_keeps_group_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let root = root(dir.path());
        let group_dir = dir.path().join("org/example");
        fs::create_dir_all(group_dir.join("lib/1.0")).unwrap();
        fs::write(group_dir.join(METADATA_FILE), GROUP_METADATA).unwrap();
        fs::write(group_dir.join("maven-metadata.xml.sha1"), "x").unwrap();

        Maven2LayoutProvider
            .delete_metadata(&FsStorageBackend::new(), &root.resolve("org/example/lib"))
            .unwrap();
        assert_eq!(fs::read_to_string(group_dir.join(METADATA_FILE)).unwrap(), GROUP_METADATA);
        assert!(group_dir.join("maven-metadata.xml.sha1").exists());
    }

    #[test]
    fn deleting_unlisted_version_keeps_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let root = root(dir.path());
        let artifact_dir = dir.path().join("org/example/lib");
        fs::create_dir_all(artifact_dir.join("2.0")).unwrap();
        fs::write(artifact_dir.join(METADATA_FILE), ARTIFACT_METADATA).unwrap();

        Maven2LayoutProvider
            .delete_metadata(&FsStorageBackend::new(), &root.resolve("org/example/lib/2.0"))
            .unwrap();
        assert!(artifact_dir.join(METADATA_FILE).exists());
    }

    #[test]
    fn deleting_a_file_keeps_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let root = root(dir.path());
        let version_dir = dir.path().join("org/example/lib/1.0");
        fs::create_dir_all(&version_dir).unwrap();
        fs::write(version_dir.join("lib-1.0.jar"), "jar").unwrap();
        fs::write(version_dir.join(METADATA_FILE), "<metadata/>").unwrap();

        Maven2LayoutProvider
            .delete_metadata(&FsStorageBackend::new(), &root.resolve("org/example/lib/1.0/lib-1.0.jar"))
            .unwrap();
        assert!(version_dir.join(METADATA_FILE).exists());
    }
}
