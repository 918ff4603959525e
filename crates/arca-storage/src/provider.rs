//! # Layout Storage
//!
//! [`LayoutStorage`] decorates a raw [`StorageBackend`] with the behaviour
//! every repository layout shares:
//!
//! - **Digest streams.** Reads and writes of non-checksum paths compute the
//!   repository's digest algorithms over every byte.
//! - **Delete protocol.** Permanent removal of an artifact also removes its
//!   index record; trash and undelete operations notify listeners.
//! - **Attribute delegation.** Path classification is answered by the
//!   injected [`LayoutProvider`].
//!
//! Checksum sidecar management lives in [`crate::checksum`].
//!
//! ## Deletion
//!
//! `delete` first lets the layout drop metadata made stale by the delete.
//! A missing path is logged and treated as deleted. Every file removed goes
//! through `do_delete_path`, the single place where index records are
//! removed. A file moved to the trash keeps its record. A directory is
//! emptied file by file (deepest first) before the backend removes the
//! directory itself. Only non-directory deletes emit an
//! [`ArtifactEvent::PathDeleted`](crate::events::ArtifactEvent::PathDeleted).

use std::io::{self, Write};
use std::sync::Arc;

use arca_core::{ArtifactEntry, RepositoryFileAttributeType, RepositoryFileAttributes, RepositoryPath, StorageError};
use arca_io::{ByteRangeReader, LayoutReader, LayoutWriter, LazyReader, MultiDigest};

use crate::backend::StorageBackend;
use crate::context::StorageContext;
use crate::files;
use crate::layout::{layout_provider_for, LayoutProvider};

/// Input stream returned by [`LayoutStorage::new_input_stream`].
pub type LayoutInputStream = LayoutReader<LazyReader<ByteRangeReader>>;

/// Output stream returned by [`LayoutStorage::new_output_stream`].
pub type LayoutOutputStream = LayoutWriter<Box<dyn Write + Send>>;

/// Layout-aware storage over a raw backend.
#[derive(Clone)]
pub struct LayoutStorage {
    backend: Arc<dyn StorageBackend>,
    layout_provider: Arc<dyn LayoutProvider>,
    context: StorageContext,
}

impl LayoutStorage {
    pub fn new(
        backend: Arc<dyn StorageBackend>,
        layout_provider: Arc<dyn LayoutProvider>,
        context: StorageContext,
    ) -> Self {
        Self {
            backend,
            layout_provider,
            context,
        }
    }

    /// Storage using the built-in provider registered for `layout`.
    pub fn for_layout(
        backend: Arc<dyn StorageBackend>,
        layout: &str,
        context: StorageContext,
    ) -> Result<Self, StorageError> {
        Ok(Self::new(backend, layout_provider_for(layout)?, context))
    }

    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    pub fn layout_provider(&self) -> &Arc<dyn LayoutProvider> {
        &self.layout_provider
    }

    pub fn context(&self) -> &StorageContext {
        &self.context
    }

    pub(crate) fn is_checksum(&self, path: &RepositoryPath) -> Result<bool, StorageError> {
        files::is_checksum(self.layout_provider.as_ref(), path)
    }

    /// Open `path` for reading. The returned stream digests every byte read
    /// unless `path` is a checksum sidecar. The file itself is opened on the
    /// first read or seek.
    pub fn new_input_stream(&self, path: &RepositoryPath) -> Result<LayoutInputStream, StorageError> {
        if self.backend.is_directory(path) {
            return Err(StorageError::IsADirectory(path.as_path().to_path_buf()));
        }
        let digest = if self.is_checksum(path)? {
            MultiDigest::new()
        } else {
            MultiDigest::for_algorithms(path.repository().digest_algorithms())
        };

        let backend = self.backend.clone();
        let target = path.clone();
        let lazy = LazyReader::new(move || open_range_reader(backend, target));
        Ok(LayoutReader::with_digest(lazy, digest))
    }

    /// Create or truncate `path` for writing, creating missing parent
    /// directories. The returned stream digests every byte written unless
    /// `path` is a checksum sidecar.
    pub fn new_output_stream(&self, path: &RepositoryPath) -> Result<LayoutOutputStream, StorageError> {
        if self.backend.is_directory(path) {
            return Err(StorageError::IsADirectory(path.as_path().to_path_buf()));
        }
        let checksum = self.is_checksum(path)?;
        if let Some(parent) = path.parent() {
            self.backend.create_directories(&parent)?;
        }

        let mut writer = LayoutWriter::new(self.backend.open_write(path)?);
        if !checksum {
            for algorithm in path.repository().digest_algorithms().iter() {
                if let Err(e) = writer.add_algorithm(algorithm) {
                    tracing::error!(path = %path, algorithm, error = %e, "skipping digest algorithm");
                }
            }
        }
        Ok(writer)
    }

    /// Delete `path`. Without `force`, the backend moves files to the
    /// repository trash if it has one. Deleting a missing path succeeds.
    pub fn delete(&self, path: &RepositoryPath, force: bool) -> Result<(), StorageError> {
        tracing::debug!(
            storage = %path.storage_id(),
            repository = %path.repository_id(),
            path = %path,
            force,
            "Deleting {}",
            path
        );

        self.layout_provider.delete_metadata(self.backend.as_ref(), path)?;

        if !self.backend.exists(path) {
            tracing::warn!("Path not found: path-[{}]", path);
            return Ok(());
        }

        let directory = self.backend.is_directory(path);
        if directory {
            self.delete_directory(path, force)?;
        } else {
            self.do_delete_path(path, force)?;
        }

        if !directory {
            self.context.artifact_events.dispatch_artifact_path_deleted_event(path);
        }
        tracing::debug!("Deleted [{}]", path);
        Ok(())
    }

    fn delete_directory(&self, path: &RepositoryPath, force: bool) -> Result<(), StorageError> {
        let mut files = Vec::new();
        for entry in self.backend.walk(path) {
            let entry = entry?;
            if !self.backend.is_directory(&entry) {
                files.push(entry);
            }
        }
        files.reverse();
        for file in &files {
            self.do_delete_path(file, force)?;
        }
        self.backend.delete(path, force)
    }

    /// Remove one file, dropping its index record first if it is an
    /// artifact being removed for good. A file moved to the trash keeps its
    /// record. Index lookup failures are logged and do not prevent the
    /// physical delete.
    pub(crate) fn do_delete_path(&self, path: &RepositoryPath, force: bool) -> Result<(), StorageError> {
        if self.backend.moves_to_trash(path, force) {
            return self.backend.delete(path, force);
        }

        let artifact = match files::is_artifact(self.layout_provider.as_ref(), path) {
            Ok(artifact) => artifact,
            Err(e) => {
                tracing::error!(path = %path, error = %e, "failed to classify path; deleting without index cleanup");
                false
            }
        };

        if artifact {
            if let Some(entry) = self.artifact_entry(path) {
                self.context.artifact_entries.delete(&entry)?;
                tracing::debug!(path = %path, uuid = %entry.uuid, "removed artifact entry");
            }
        }

        self.backend.delete(path, force)
    }

    /// The index record for `path`: the one attached to the path, else the
    /// one found in the index (which is then attached).
    fn artifact_entry(&self, path: &RepositoryPath) -> Option<ArtifactEntry> {
        if let Some(entry) = path.artifact_entry() {
            return Some(entry.clone());
        }
        match self.fetch_artifact_entry(path) {
            Ok(Some(entry)) => {
                path.attach_artifact_entry(entry.clone());
                Some(entry)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::error!(path = %path, error = %e, "failed to look up artifact entry");
                None
            }
        }
    }

    fn fetch_artifact_entry(&self, path: &RepositoryPath) -> Result<Option<ArtifactEntry>, StorageError> {
        let relative = files::relativize(path)?;
        self.context
            .artifact_entries
            .find_one_artifact(path.storage_id(), path.repository_id(), &relative)
    }

    /// Permanently empty the trash of the repository owning `path`.
    pub fn delete_trash(&self, path: &RepositoryPath) -> Result<(), StorageError> {
        tracing::debug!(
            "Emptying trash for {}:{}",
            path.storage_id(),
            path.repository_id()
        );
        self.backend.delete_trash(path)?;
        self.context
            .repository_events
            .dispatch_empty_trash_event(path.storage_id(), path.repository_id());
        Ok(())
    }

    /// Restore the trashed counterpart of `path`.
    pub fn undelete(&self, path: &RepositoryPath) -> Result<(), StorageError> {
        tracing::debug!(
            "Attempting to restore: {} in {}:{}",
            path,
            path.storage_id(),
            path.repository_id()
        );
        self.backend.undelete(path)?;
        self.context
            .repository_events
            .dispatch_undelete_trash_event(path.storage_id(), path.repository_id());
        Ok(())
    }

    pub fn repository_file_attributes(
        &self,
        path: &RepositoryPath,
        types: &[RepositoryFileAttributeType],
    ) -> Result<RepositoryFileAttributes, StorageError> {
        self.layout_provider.repository_file_attributes(path, types)
    }
}

/// Open `path` as a reloadable range reader. Runs inside the lazy factory,
/// so the directory check is repeated against the current filesystem state.
fn open_range_reader(backend: Arc<dyn StorageBackend>, path: RepositoryPath) -> io::Result<ByteRangeReader> {
    if backend.is_directory(&path) {
        return Err(StorageError::IsADirectory(path.as_path().to_path_buf()).into_io());
    }
    let length = backend.size(&path).map_err(StorageError::into_io)?;
    let inner = backend.open_read(&path).map_err(StorageError::into_io)?;
    Ok(ByteRangeReader::new(inner, length)
        .with_reload_handler(move || backend.open_read(&path).map_err(StorageError::into_io)))
}

impl std::fmt::Debug for LayoutStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutStorage")
            .field("layout", &self.layout_provider.alias())
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
