//! # arca-storage: Layout-Aware Repository Storage
//!
//! Sits between repository services and the raw filesystem. A
//! [`LayoutStorage`] decorates a [`StorageBackend`] so that, whatever the
//! package layout:
//!
//! - artifact content and its checksum sidecars stay consistent,
//! - permanently removing an artifact also removes its metadata index record,
//! - trash, undelete and empty-trash transitions are announced to listeners.
//!
//! ## Modules
//!
//! | Module       | Concern                                                  |
//! |--------------|----------------------------------------------------------|
//! | `backend`    | raw path primitives, filesystem backend with trash       |
//! | `index`      | artifact metadata index service                          |
//! | `events`     | artifact and repository event registries                 |
//! | `layout`     | layout providers (`raw`, `maven2`)                       |
//! | `files`      | path classification helpers                              |
//! | `context`    | collaborators injected into the storage                  |
//! | `provider`   | digest streams and the delete protocol                   |
//! | `checksum`   | checksum sidecar paths and regeneration                  |

pub mod backend;
pub mod checksum;
pub mod context;
pub mod events;
pub mod files;
pub mod index;
pub mod layout;
pub mod provider;

pub use backend::{FsStorageBackend, StorageBackend, WalkEntries};
pub use checksum::{checksum_path, ChecksumFailure, ChecksumReport};
pub use context::StorageContext;
pub use events::{
    ArtifactEvent, ArtifactEventListener, ArtifactEventListenerRegistry, RepositoryEvent, RepositoryEventListener,
    RepositoryEventListenerRegistry,
};
pub use index::{ArtifactEntryService, InMemoryArtifactEntryService};
pub use layout::{layout_provider_for, LayoutProvider, Maven2LayoutProvider, RawLayoutProvider};
pub use provider::{LayoutInputStream, LayoutOutputStream, LayoutStorage};
