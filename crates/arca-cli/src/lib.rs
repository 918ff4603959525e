//! # arca-cli: Storage Administration
//!
//! Provides the `arca` command-line interface for maintenance work on
//! configured repositories. Every command runs through the same layout
//! storage the server uses, so index records and events stay consistent
//! with online operations.
//!
//! ## Subcommands
//!
//! - `arca checksum`: Regenerate checksum sidecars for a repository subtree.
//! - `arca delete`: Delete a path (to trash unless `--force`).
//! - `arca undelete`: Restore a path, or the whole repository, from trash.
//! - `arca empty-trash`: Permanently empty a repository's trash.
//!
//! ```bash
//! arca --config arca.yaml --index index.json checksum storage0 releases org/example --force
//! arca --config arca.yaml delete storage0 releases org/example/lib/1.0
//! ```

pub mod checksum;
pub mod trash;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use arca_core::{ArcaConfig, RepositoryPath};
use arca_storage::{
    ArtifactEvent, FsStorageBackend, InMemoryArtifactEntryService, LayoutStorage, RepositoryEvent, StorageContext,
};

/// Loaded configuration and metadata index for one CLI invocation.
#[derive(Debug)]
pub struct Session {
    config: ArcaConfig,
    index: Arc<InMemoryArtifactEntryService>,
    index_path: Option<PathBuf>,
    context: StorageContext,
}

impl Session {
    /// Load the configuration and, if given, the index snapshot. A missing
    /// snapshot file starts an empty index.
    pub fn open(config_path: &Path, index_path: Option<&Path>) -> Result<Self> {
        let config = ArcaConfig::load(config_path)
            .with_context(|| format!("failed to load configuration {}", config_path.display()))?;
        let index = match index_path {
            Some(path) => InMemoryArtifactEntryService::load_json(path)
                .with_context(|| format!("failed to load index {}", path.display()))?,
            None => InMemoryArtifactEntryService::new(),
        };
        tracing::debug!(records = index.len(), "loaded artifact index");
        Ok(Self::new(config, index, index_path.map(Path::to_path_buf)))
    }

    pub fn new(config: ArcaConfig, index: InMemoryArtifactEntryService, index_path: Option<PathBuf>) -> Self {
        let index = Arc::new(index);
        let context = StorageContext::with_index(index.clone());
        context.artifact_events.add_listener(Arc::new(log_artifact_event));
        context.repository_events.add_listener(Arc::new(log_repository_event));
        Self {
            config,
            index,
            index_path,
            context,
        }
    }

    pub fn index(&self) -> &InMemoryArtifactEntryService {
        &self.index
    }

    pub fn context(&self) -> &StorageContext {
        &self.context
    }

    /// Resolve a repository-relative path and the storage serving it. `None`
    /// addresses the repository root.
    pub fn resolve(
        &self,
        storage_id: &str,
        repository_id: &str,
        path: Option<&str>,
    ) -> Result<(LayoutStorage, RepositoryPath)> {
        let repository = self
            .config
            .repository(storage_id, repository_id)
            .with_context(|| format!("unknown repository {storage_id}:{repository_id}"))?;
        let storage = LayoutStorage::for_layout(
            Arc::new(FsStorageBackend::new()),
            repository.layout(),
            self.context.clone(),
        )
        .with_context(|| format!("repository {storage_id}:{repository_id} is misconfigured"))?;

        let root = RepositoryPath::root(repository);
        let path = match path {
            Some(relative) => root.resolve(relative),
            None => root,
        };
        // Rejects `..` escapes before anything touches the filesystem.
        path.relativize()?;
        Ok((storage, path))
    }

    /// Write the index snapshot back, if one was loaded.
    pub fn save_index(&self) -> Result<()> {
        if let Some(path) = &self.index_path {
            self.index
                .save_json(path)
                .with_context(|| format!("failed to save index {}", path.display()))?;
            tracing::debug!(path = %path.display(), records = self.index.len(), "saved artifact index");
        }
        Ok(())
    }
}

fn log_artifact_event(event: &ArtifactEvent) {
    match event {
        ArtifactEvent::PathDeleted(path) => {
            tracing::info!(
                storage = %path.storage_id(),
                repository = %path.repository_id(),
                path = %path,
                "artifact path deleted"
            );
        }
    }
}

fn log_repository_event(event: &RepositoryEvent) {
    match event {
        RepositoryEvent::EmptyTrash {
            storage_id,
            repository_id,
        } => tracing::info!(storage = %storage_id, repository = %repository_id, "trash emptied"),
        RepositoryEvent::UndeleteTrash {
            storage_id,
            repository_id,
        } => tracing::info!(storage = %storage_id, repository = %repository_id, "trash restored"),
    }
}
