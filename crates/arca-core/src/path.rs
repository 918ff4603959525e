//! # Repositories and Repository Paths
//!
//! A [`Repository`] is a directory inside a storage, carrying the settings
//! the storage layer needs at I/O time: layout alias, trash policy and the
//! digest algorithm set of its owning storage.
//!
//! A [`RepositoryPath`] is an absolute filesystem path tagged with its owning
//! repository. Its identity is (storage id, repository id, path); an
//! [`ArtifactEntry`] looked up from the index may be attached to it once and
//! travels with clones made afterwards.

use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::artifact::ArtifactEntry;
use crate::digest::DigestAlgorithmSet;
use crate::error::StorageError;
use crate::identity::{RepositoryId, StorageId};

/// Name of the per-repository trash directory.
pub const TRASH_DIR: &str = ".trash";

/// Layout alias used when a repository does not name one.
pub const DEFAULT_LAYOUT: &str = "raw";

/// A repository within a storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    storage_id: StorageId,
    id: RepositoryId,
    layout: String,
    base_dir: PathBuf,
    trash_enabled: bool,
    digest_algorithms: DigestAlgorithmSet,
}

impl Repository {
    /// A repository with the raw layout, trash enabled and the default digest
    /// algorithm set.
    pub fn new(storage_id: StorageId, id: RepositoryId, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_id,
            id,
            layout: DEFAULT_LAYOUT.to_string(),
            base_dir: base_dir.into(),
            trash_enabled: true,
            digest_algorithms: DigestAlgorithmSet::default(),
        }
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = layout.into();
        self
    }

    pub fn with_trash_enabled(mut self, trash_enabled: bool) -> Self {
        self.trash_enabled = trash_enabled;
        self
    }

    pub fn with_digest_algorithms(mut self, algorithms: DigestAlgorithmSet) -> Self {
        self.digest_algorithms = algorithms;
        self
    }

    pub fn storage_id(&self) -> &StorageId {
        &self.storage_id
    }

    pub fn id(&self) -> &RepositoryId {
        &self.id
    }

    pub fn layout(&self) -> &str {
        &self.layout
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn trash_enabled(&self) -> bool {
        self.trash_enabled
    }

    pub fn digest_algorithms(&self) -> &DigestAlgorithmSet {
        &self.digest_algorithms
    }

    /// Root of this repository's trash area.
    pub fn trash_dir(&self) -> PathBuf {
        self.base_dir.join(TRASH_DIR)
    }
}

/// A path scoped to a repository.
#[derive(Debug, Clone)]
pub struct RepositoryPath {
    repository: Arc<Repository>,
    path: PathBuf,
    artifact_entry: OnceLock<ArtifactEntry>,
}

impl RepositoryPath {
    /// Tag an absolute path with its repository. The path is not required to
    /// live under the repository base directory; [`relativize`](Self::relativize)
    /// reports when it does not.
    pub fn new(repository: Arc<Repository>, path: impl Into<PathBuf>) -> Self {
        Self {
            repository,
            path: path.into(),
            artifact_entry: OnceLock::new(),
        }
    }

    /// The repository root.
    pub fn root(repository: Arc<Repository>) -> Self {
        let base = repository.base_dir().to_path_buf();
        Self::new(repository, base)
    }

    /// Resolve a repository-relative path (a leading `/` is ignored).
    pub fn resolve(&self, relative: impl AsRef<Path>) -> Self {
        let relative = relative.as_ref();
        let relative = relative.strip_prefix("/").unwrap_or(relative);
        Self::new(self.repository.clone(), self.path.join(relative))
    }

    /// A sibling of this path with the given file name.
    pub fn resolve_sibling(&self, file_name: &str) -> Self {
        let parent = self.path.parent().unwrap_or(&self.path);
        Self::new(self.repository.clone(), parent.join(file_name))
    }

    /// The parent path, or `None` at the repository root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        self.path
            .parent()
            .map(|p| Self::new(self.repository.clone(), p))
    }

    pub fn is_root(&self) -> bool {
        self.path == self.repository.base_dir()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    pub fn as_path(&self) -> &Path {
        &self.path
    }

    pub fn repository(&self) -> &Arc<Repository> {
        &self.repository
    }

    pub fn storage_id(&self) -> &StorageId {
        self.repository.storage_id()
    }

    pub fn repository_id(&self) -> &RepositoryId {
        self.repository.id()
    }

    /// The `/`-separated path relative to the repository root, as used for
    /// index keys. Fails if the path escapes the repository.
    pub fn relativize(&self) -> Result<String, StorageError> {
        let outside = || StorageError::OutsideRepository {
            path: self.path.clone(),
            root: self.repository.base_dir().to_path_buf(),
        };
        let relative = self
            .path
            .strip_prefix(self.repository.base_dir())
            .map_err(|_| outside())?;

        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                Component::CurDir => {}
                _ => return Err(outside()),
            }
        }
        Ok(parts.join("/"))
    }

    /// Returns `true` if the path lies inside the repository trash area.
    pub fn is_in_trash(&self) -> bool {
        self.path.starts_with(self.repository.trash_dir())
    }

    /// The cached index record, if one was attached.
    pub fn artifact_entry(&self) -> Option<&ArtifactEntry> {
        self.artifact_entry.get()
    }

    /// Attach an index record. Returns `false` if one was already attached.
    pub fn attach_artifact_entry(&self, entry: ArtifactEntry) -> bool {
        self.artifact_entry.set(entry).is_ok()
    }
}

impl PartialEq for RepositoryPath {
    fn eq(&self, other: &Self) -> bool {
        self.storage_id() == other.storage_id()
            && self.repository_id() == other.repository_id()
            && self.path == other.path
    }
}

impl Eq for RepositoryPath {}

impl std::hash::Hash for RepositoryPath {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.storage_id().hash(state);
        self.repository_id().hash(state);
        self.path.hash(state);
    }
}

impl std::fmt::Display for RepositoryPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
