//! # Layout Providers
//!
//! A layout provider knows how a package format arranges files inside a
//! repository. The storage decorator never interprets paths itself; it asks
//! the provider which attributes a path has (checksum sidecar, artifact,
//! metadata) and routes accordingly.
//!
//! Two layouts are built in:
//!
//! | Alias    | Provider                 |
//! |----------|--------------------------|
//! | `raw`    | [`RawLayoutProvider`]    |
//! | `maven2` | [`Maven2LayoutProvider`] |

pub mod maven2;
pub mod raw;

use std::sync::Arc;

use arca_core::{RepositoryFileAttributeType, RepositoryFileAttributes, RepositoryPath, StorageError};

use crate::backend::StorageBackend;

pub use maven2::Maven2LayoutProvider;
pub use raw::RawLayoutProvider;

/// Layout-specific path classification.
pub trait LayoutProvider: Send + Sync {
    /// The alias repositories use to select this layout.
    fn alias(&self) -> &'static str;

    /// Answer the requested attribute queries for `path`. Types the layout
    /// does not understand are omitted from the result.
    fn repository_file_attributes(
        &self,
        path: &RepositoryPath,
        types: &[RepositoryFileAttributeType],
    ) -> Result<RepositoryFileAttributes, StorageError>;

    /// Remove layout metadata made stale by deleting `path`. Runs before the
    /// physical delete.
    fn delete_metadata(&self, _backend: &dyn StorageBackend, _path: &RepositoryPath) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Look up the built-in provider for a layout alias.
pub fn layout_provider_for(alias: &str) -> Result<Arc<dyn LayoutProvider>, StorageError> {
    match alias {
        raw::ALIAS => Ok(Arc::new(RawLayoutProvider)),
        maven2::ALIAS => Ok(Arc::new(Maven2LayoutProvider)),
        other => Err(StorageError::Layout(format!("unknown layout: {other}"))),
    }
}
