//! # Storage Events
//!
//! Fire-and-forget notifications emitted at each consistency-affecting
//! transition. Listeners run synchronously on the caller's thread, in
//! registration order. The listener list is cloned before dispatch so a
//! listener may register further listeners without deadlocking.

use std::sync::Arc;

use arca_core::{RepositoryId, RepositoryPath, StorageId};
use parking_lot::RwLock;

/// Events about individual artifact paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactEvent {
    /// A non-directory path was deleted (to trash or permanently).
    PathDeleted(RepositoryPath),
}

/// Events about a whole repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryEvent {
    EmptyTrash {
        storage_id: StorageId,
        repository_id: RepositoryId,
    },
    UndeleteTrash {
        storage_id: StorageId,
        repository_id: RepositoryId,
    },
}

pub trait ArtifactEventListener: Send + Sync {
    fn handle(&self, event: &ArtifactEvent);
}

pub trait RepositoryEventListener: Send + Sync {
    fn handle(&self, event: &RepositoryEvent);
}

impl<F> ArtifactEventListener for F
where
    F: Fn(&ArtifactEvent) + Send + Sync,
{
    fn handle(&self, event: &ArtifactEvent) {
        self(event)
    }
}

impl<F> RepositoryEventListener for F
where
    F: Fn(&RepositoryEvent) + Send + Sync,
{
    fn handle(&self, event: &RepositoryEvent) {
        self(event)
    }
}

/// Registry of artifact event listeners.
#[derive(Default)]
pub struct ArtifactEventListenerRegistry {
    listeners: RwLock<Vec<Arc<dyn ArtifactEventListener>>>,
}

impl ArtifactEventListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&self, listener: Arc<dyn ArtifactEventListener>) {
        self.listeners.write().push(listener);
    }

    pub fn dispatch(&self, event: &ArtifactEvent) {
        let listeners = self.listeners.read().clone();
        tracing::debug!(?event, listeners = listeners.len(), "dispatching artifact event");
        for listener in listeners {
            listener.handle(event);
        }
    }

    pub fn dispatch_artifact_path_deleted_event(&self, path: &RepositoryPath) {
        self.dispatch(&ArtifactEvent::PathDeleted(path.clone()));
    }
}

/// Registry of repository event listeners.
#[derive(Default)]
pub struct RepositoryEventListenerRegistry {
    listeners: RwLock<Vec<Arc<dyn RepositoryEventListener>>>,
}

impl RepositoryEventListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&self, listener: Arc<dyn RepositoryEventListener>) {
        self.listeners.write().push(listener);
    }

    pub fn dispatch(&self, event: &RepositoryEvent) {
        let listeners = self.listeners.read().clone();
        tracing::debug!(?event, listeners = listeners.len(), "dispatching repository event");
        for listener in listeners {
            listener.handle(event);
        }
    }

    pub fn dispatch_empty_trash_event(&self, storage_id: &StorageId, repository_id: &RepositoryId) {
        self.dispatch(&RepositoryEvent::EmptyTrash {
            storage_id: storage_id.clone(),
            repository_id: repository_id.clone(),
        });
    }

    pub fn dispatch_undelete_trash_event(&self, storage_id: &StorageId, repository_id: &RepositoryId) {
        self.dispatch(&RepositoryEvent::UndeleteTrash {
            storage_id: storage_id.clone(),
            repository_id: repository_id.clone(),
        });
    }
}

impl std::fmt::Debug for ArtifactEventListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactEventListenerRegistry")
            .field("listeners", &self.listeners.read().len())
            .finish()
    }
}

impl std::fmt::Debug for RepositoryEventListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryEventListenerRegistry")
            .field("listeners", &self.listeners.read().len())
            .finish()
    }
}
