//! Path classification helpers over a layout provider.

use arca_core::attributes::flag;
use arca_core::{RepositoryFileAttributeType, RepositoryPath, StorageError};

use crate::layout::LayoutProvider;

fn has_attribute(
    provider: &dyn LayoutProvider,
    path: &RepositoryPath,
    attribute: RepositoryFileAttributeType,
) -> Result<bool, StorageError> {
    let attributes = provider.repository_file_attributes(path, &[attribute])?;
    Ok(flag(&attributes, attribute))
}

pub fn is_checksum(provider: &dyn LayoutProvider, path: &RepositoryPath) -> Result<bool, StorageError> {
    has_attribute(provider, path, RepositoryFileAttributeType::Checksum)
}

pub fn is_artifact(provider: &dyn LayoutProvider, path: &RepositoryPath) -> Result<bool, StorageError> {
    has_attribute(provider, path, RepositoryFileAttributeType::Artifact)
}

pub fn is_metadata(provider: &dyn LayoutProvider, path: &RepositoryPath) -> Result<bool, StorageError> {
    has_attribute(provider, path, RepositoryFileAttributeType::Metadata)
}

/// Layout coordinates of `path`, if the layout assigns any.
pub fn coordinates(provider: &dyn LayoutProvider, path: &RepositoryPath) -> Result<Option<String>, StorageError> {
    let attributes = provider.repository_file_attributes(path, &[RepositoryFileAttributeType::Coordinates])?;
    Ok(attributes
        .get(&RepositoryFileAttributeType::Coordinates)
        .and_then(|v| v.as_text())
        .map(str::to_string))
}

/// `/`-separated path relative to the repository root.
pub fn relativize(path: &RepositoryPath) -> Result<String, StorageError> {
    path.relativize()
}
