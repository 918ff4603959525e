//! # Raw Storage Backend
//!
//! The path-addressed primitives the layout storage decorates: open, exist,
//! delete, walk and the trash lifecycle. [`FsStorageBackend`] implements them
//! on the local filesystem.
//!
//! ## Trash
//!
//! A repository with trash enabled keeps soft-deleted files under
//! `<repository>/.trash`, at the same relative location they occupied.
//! `delete(path, force = true)` bypasses the trash. `walk` never descends
//! into the trash area.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use arca_core::{RepositoryPath, StorageError, TRASH_DIR};
use walkdir::WalkDir;

/// Entries produced by [`StorageBackend::walk`]. A failure to read one entry
/// is yielded in place rather than ending the walk.
pub type WalkEntries<'a> = Box<dyn Iterator<Item = Result<RepositoryPath, StorageError>> + 'a>;

/// Raw path-based storage primitives.
pub trait StorageBackend: Send + Sync {
    fn open_read(&self, path: &RepositoryPath) -> Result<Box<dyn Read + Send>, StorageError>;

    /// Create or truncate a file. Parent directories must exist.
    fn open_write(&self, path: &RepositoryPath) -> Result<Box<dyn Write + Send>, StorageError>;

    fn exists(&self, path: &RepositoryPath) -> bool;

    fn is_directory(&self, path: &RepositoryPath) -> bool;

    fn size(&self, path: &RepositoryPath) -> Result<u64, StorageError>;

    fn create_directories(&self, path: &RepositoryPath) -> Result<(), StorageError>;

    /// Delete a file or directory tree. Without `force`, files go to the
    /// repository trash when the repository has one.
    fn delete(&self, path: &RepositoryPath, force: bool) -> Result<(), StorageError>;

    /// Returns `true` if `delete(path, force)` would move `path` to the
    /// trash rather than remove it.
    fn moves_to_trash(&self, path: &RepositoryPath, force: bool) -> bool;

    /// Permanently empty the trash of the repository owning `path`.
    fn delete_trash(&self, path: &RepositoryPath) -> Result<(), StorageError>;

    /// Restore the trashed counterpart of `path` (file or subtree).
    fn undelete(&self, path: &RepositoryPath) -> Result<(), StorageError>;

    /// Every path at or under `path`, parents before children.
    fn walk<'a>(&'a self, path: &RepositoryPath) -> WalkEntries<'a>;
}

/// Local filesystem backend.
#[derive(Debug, Clone, Default)]
pub struct FsStorageBackend;

impl FsStorageBackend {
    pub fn new() -> Self {
        Self
    }

    fn move_to_trash(&self, path: &RepositoryPath) -> Result<(), StorageError> {
        let relative = path.relativize()?;
        let trash = path.repository().trash_dir();
        let trashed = trash.join(relative);
        clear_trash_conflicts(&trash, &trashed)?;
        if let Some(parent) = trashed.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(path.as_path(), &trashed)?;
        tracing::debug!(path = %path, trash = %trashed.display(), "moved to trash");
        Ok(())
    }

    fn uses_trash(path: &RepositoryPath, force: bool) -> bool {
        !force && path.repository().trash_enabled() && !path.is_in_trash()
    }

    fn delete_directory(&self, path: &RepositoryPath, force: bool) -> Result<(), StorageError> {
        if Self::uses_trash(path, force) {
            let files: Vec<RepositoryPath> = self
                .walk(path)
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .filter(|p| !p.as_path().is_dir())
                .collect();
            for file in &files {
                self.move_to_trash(file)?;
            }
        }

        if path.is_root() {
            for entry in fs::read_dir(path.as_path())? {
                let entry = entry?;
                if entry.file_name() == TRASH_DIR {
                    continue;
                }
                remove_any(&entry.path())?;
            }
        } else {
            fs::remove_dir_all(path.as_path())?;
        }
        Ok(())
    }
}

/// Remove older trashed entries that would block moving a file to
/// `trashed`: a file standing where a parent directory is needed, or any
/// entry at `trashed` itself.
fn clear_trash_conflicts(trash: &Path, trashed: &Path) -> io::Result<()> {
    let Ok(relative) = trashed.strip_prefix(trash) else {
        return Ok(());
    };
    let mut current = trash.to_path_buf();
    let mut components = relative.components().peekable();
    while let Some(component) = components.next() {
        current.push(component);
        let metadata = match fs::symlink_metadata(&current) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };
        if components.peek().is_none() {
            tracing::debug!(path = %current.display(), "replacing trashed copy");
            return remove_any(&current);
        }
        if !metadata.is_dir() {
            tracing::debug!(path = %current.display(), "removing trashed file in the way of a directory");
            return fs::remove_file(&current);
        }
    }
    Ok(())
}

fn remove_any(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

fn restore_file(trashed: &Path, target: &Path) -> Result<(), StorageError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::rename(trashed, target)?;
    Ok(())
}

impl StorageBackend for FsStorageBackend {
    fn open_read(&self, path: &RepositoryPath) -> Result<Box<dyn Read + Send>, StorageError> {
        Ok(Box::new(fs::File::open(path.as_path())?))
    }

    fn open_write(&self, path: &RepositoryPath) -> Result<Box<dyn Write + Send>, StorageError> {
        Ok(Box::new(fs::File::create(path.as_path())?))
    }

    fn exists(&self, path: &RepositoryPath) -> bool {
        path.as_path().exists()
    }

    fn is_directory(&self, path: &RepositoryPath) -> bool {
        path.as_path().is_dir()
    }

    fn size(&self, path: &RepositoryPath) -> Result<u64, StorageError> {
        Ok(fs::metadata(path.as_path())?.len())
    }

    fn create_directories(&self, path: &RepositoryPath) -> Result<(), StorageError> {
        fs::create_dir_all(path.as_path())?;
        Ok(())
    }

    fn delete(&self, path: &RepositoryPath, force: bool) -> Result<(), StorageError> {
        let metadata = fs::symlink_metadata(path.as_path())?;
        if metadata.is_dir() {
            return self.delete_directory(path, force);
        }
        if Self::uses_trash(path, force) {
            self.move_to_trash(path)
        } else {
            fs::remove_file(path.as_path())?;
            tracing::debug!(path = %path, "removed");
            Ok(())
        }
    }

    fn moves_to_trash(&self, path: &RepositoryPath, force: bool) -> bool {
        Self::uses_trash(path, force)
    }

    fn delete_trash(&self, path: &RepositoryPath) -> Result<(), StorageError> {
        let trash = path.repository().trash_dir();
        if trash.exists() {
            fs::remove_dir_all(&trash)?;
        }
        Ok(())
    }

    fn undelete(&self, path: &RepositoryPath) -> Result<(), StorageError> {
        let relative = path.relativize()?;
        let trash = path.repository().trash_dir();
        let trashed = trash.join(&relative);
        if !trashed.exists() {
            tracing::debug!(path = %path, "nothing to restore");
            return Ok(());
        }
        if !trashed.is_dir() {
            return restore_file(&trashed, path.as_path());
        }

        for entry in WalkDir::new(&trashed) {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_dir() {
                continue;
            }
            let Ok(inner) = entry.path().strip_prefix(&trashed) else {
                continue;
            };
            restore_file(entry.path(), &path.as_path().join(inner))?;
        }
        fs::remove_dir_all(&trashed)?;
        Ok(())
    }

    fn walk<'a>(&'a self, path: &RepositoryPath) -> WalkEntries<'a> {
        let repository = path.repository().clone();
        let trash = repository.trash_dir();
        let root = path.as_path().to_path_buf();
        let entries = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| e.path() != trash)
            .map(move |entry| match entry {
                Ok(entry) => Ok(RepositoryPath::new(repository.clone(), entry.into_path())),
                Err(e) => {
                    let path = e.path().unwrap_or(&root).to_path_buf();
                    Err(StorageError::Walk {
                        path,
                        source: e.into(),
                    })
                }
            });
        Box::new(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arca_core::{Repository, RepositoryId, StorageId};
    use std::sync::Arc;

    fn repository(base: &Path, trash_enabled: bool) -> Arc<Repository> {
        Arc::new(
            Repository::new(StorageId::new("storage0"), RepositoryId::new("releases"), base)
                .with_trash_enabled(trash_enabled),
        )
    }

    fn write(path: &RepositoryPath, content: &str) {
        fs::create_dir_all(path.as_path().parent().unwrap()).unwrap();
        fs::write(path.as_path(), content).unwrap();
    }

    #[test]
    fn soft_delete_moves_to_trash_and_undelete_restores() {
        let dir = tempfile::tempdir().unwrap();
        let root = RepositoryPath::root(repository(dir.path(), true));
        let file = root.resolve("org/lib/1.0/lib-1.0.jar");
        write(&file, "jar");
        let backend = FsStorageBackend::new();

        backend.delete(&file, false).unwrap();
        assert!(!backend.exists(&file));
        let trashed = dir.path().join(".trash/org/lib/1.0/lib-1.0.jar");
        assert_eq!(fs::read_to_string(&trashed).unwrap(), "jar");

        backend.undelete(&file).unwrap();
        assert_eq!(fs::read_to_string(file.as_path()).unwrap(), "jar");
        assert!(!trashed.exists());
    }

    #[test]
    fn force_bypasses_trash() {
        let dir = tempfile::tempdir().unwrap();
        let root = RepositoryPath::root(repository(dir.path(), true));
        let file = root.resolve("a.txt");
        write(&file, "a");
        FsStorageBackend::new().delete(&file, true).unwrap();
        assert!(!file.as_path().exists());
        assert!(!dir.path().join(".trash/a.txt").exists());
    }

    #[test]
    fn trash_disabled_removes_permanently() {
        let dir = tempfile::tempdir().unwrap();
        let root = RepositoryPath::root(repository(dir.path(), false));
        let file = root.resolve("a.txt");
        write(&file, "a");
        FsStorageBackend::new().delete(&file, false).unwrap();
        assert!(!file.as_path().exists());
        assert!(!dir.path().join(".trash").exists());
    }

    #[test]
    fn directory_delete_trashes_files_and_keeps_root_trash() {
        let dir = tempfile::tempdir().unwrap();
        let root = RepositoryPath::root(repository(dir.path(), true));
        write(&root.resolve("x/a.txt"), "a");
        write(&root.resolve("x/y/b.txt"), "b");
        let backend = FsStorageBackend::new();

        backend.delete(&root, false).unwrap();
        assert!(!dir.path().join("x").exists());
        assert!(dir.path().join(".trash/x/a.txt").exists());
        assert!(dir.path().join(".trash/x/y/b.txt").exists());

        backend.undelete(&root).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("x/y/b.txt")).unwrap(), "b");
    }

    #[test]
    fn delete_trash_empties_repository_trash() {
        let dir = tempfile::tempdir().unwrap();
        let root = RepositoryPath::root(repository(dir.path(), true));
        let file = root.resolve("a.txt");
        write(&file, "a");
        let backend = FsStorageBackend::new();
        backend.delete(&file, false).unwrap();
        backend.delete_trash(&file).unwrap();
        assert!(!dir.path().join(".trash").exists());
        // Nothing left to restore.
        backend.undelete(&file).unwrap();
        assert!(!file.as_path().exists());
    }

    #[test]
    fn walk_skips_trash_and_orders_parents_first() {
        let dir = tempfile::tempdir().unwrap();
        let root = RepositoryPath::root(repository(dir.path(), true));
        write(&root.resolve("b/2.txt"), "2");
        write(&root.resolve("a.txt"), "1");
        write(&root.resolve(".trash/old.txt"), "old");
        let backend = FsStorageBackend::new();

        let walked: Vec<String> = backend
            .walk(&root)
            .map(|p| p.unwrap().relativize().unwrap())
            .collect();
        assert_eq!(walked, vec!["", "a.txt", "b", "b/2.txt"]);
    }

    #[test]
    fn walk_of_missing_path_yields_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = RepositoryPath::root(repository(dir.path(), true));
        let backend = FsStorageBackend::new();
        let missing = root.resolve("missing");
        let entries: Vec<_> = backend.walk(&missing).collect();
        assert_eq!(entries.len(), 1);
        match &entries[0] {
            Err(e @ StorageError::Walk { .. }) => {
                assert_eq!(e.path(), Some(missing.as_path()));
                assert_eq!(e.io_kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected walk error, got {other:?}"),
        }
    }

    #[test]
    fn trashed_file_on_ancestor_path_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let root = RepositoryPath::root(repository(dir.path(), true));
        let backend = FsStorageBackend::new();

        fs::write(dir.path().join("a"), "old file").unwrap();
        backend.delete(&root.resolve("a"), false).unwrap();
        assert!(dir.path().join(".trash/a").is_file());

        fs::create_dir(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("a/b.txt"), "new").unwrap();
        backend.delete(&root.resolve("a/b.txt"), false).unwrap();

        assert!(!dir.path().join("a/b.txt").exists());
        assert_eq!(fs::read_to_string(dir.path().join(".trash/a/b.txt")).unwrap(), "new");
    }

    #[test]
    fn trashed_directory_at_destination_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let root = RepositoryPath::root(repository(dir.path(), true));
        let backend = FsStorageBackend::new();

        fs::create_dir_all(dir.path().join(".trash/a/b.txt")).unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("a/b.txt"), "new").unwrap();
        backend.delete(&root.resolve("a/b.txt"), false).unwrap();

        assert_eq!(fs::read_to_string(dir.path().join(".trash/a/b.txt")).unwrap(), "new");
    }

    #[test]
    fn moves_to_trash_only_for_soft_deletes_outside_trash() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsStorageBackend::new();
        let with_trash = RepositoryPath::root(repository(dir.path(), true));
        let file = with_trash.resolve("a.txt");
        assert!(backend.moves_to_trash(&file, false));
        assert!(!backend.moves_to_trash(&file, true));
        assert!(!backend.moves_to_trash(&with_trash.resolve(".trash/a.txt"), false));

        let without = RepositoryPath::root(repository(dir.path(), false));
        assert!(!backend.moves_to_trash(&without.resolve("a.txt"), false));
    }

    #[test]
    fn delete_missing_is_an_error_at_this_layer() {
        let dir = tempfile::tempdir().unwrap();
        let root = RepositoryPath::root(repository(dir.path(), true));
        assert!(FsStorageBackend::new().delete(&root.resolve("nope"), false).is_err());
    }
}
