//! Collaborators shared by every layout storage instance.

use std::sync::Arc;

use crate::events::{ArtifactEventListenerRegistry, RepositoryEventListenerRegistry};
use crate::index::{ArtifactEntryService, InMemoryArtifactEntryService};

/// The index service and event registries a [`LayoutStorage`](crate::LayoutStorage)
/// reports to. Cloning shares the underlying collaborators.
#[derive(Clone)]
pub struct StorageContext {
    pub artifact_entries: Arc<dyn ArtifactEntryService>,
    pub artifact_events: Arc<ArtifactEventListenerRegistry>,
    pub repository_events: Arc<RepositoryEventListenerRegistry>,
}

impl StorageContext {
    pub fn new(
        artifact_entries: Arc<dyn ArtifactEntryService>,
        artifact_events: Arc<ArtifactEventListenerRegistry>,
        repository_events: Arc<RepositoryEventListenerRegistry>,
    ) -> Self {
        Self {
            artifact_entries,
            artifact_events,
            repository_events,
        }
    }

    /// An in-memory index with empty registries.
    pub fn in_memory() -> Self {
        Self::with_index(Arc::new(InMemoryArtifactEntryService::new()))
    }

    /// The given index with empty registries.
    pub fn with_index(artifact_entries: Arc<dyn ArtifactEntryService>) -> Self {
        Self::new(
            artifact_entries,
            Arc::new(ArtifactEventListenerRegistry::new()),
            Arc::new(RepositoryEventListenerRegistry::new()),
        )
    }
}

impl std::fmt::Debug for StorageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageContext")
            .field("artifact_events", &self.artifact_events)
            .field("repository_events", &self.repository_events)
            .finish_non_exhaustive()
    }
}
