//! Raw layout: any file is an artifact unless it is a checksum sidecar.

use arca_core::attributes::AttributeValue;
use arca_core::{is_checksum_extension, RepositoryFileAttributeType, RepositoryFileAttributes, RepositoryPath, StorageError};

use super::LayoutProvider;

pub const ALIAS: &str = "raw";

#[derive(Debug, Clone, Copy, Default)]
pub struct RawLayoutProvider;

/// Returns `true` if the file extension names a digest algorithm.
pub(crate) fn has_checksum_extension(path: &RepositoryPath) -> bool {
    path.as_path()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(is_checksum_extension)
}

impl LayoutProvider for RawLayoutProvider {
    fn alias(&self) -> &'static str {
        ALIAS
    }

    fn repository_file_attributes(
        &self,
        path: &RepositoryPath,
        types: &[RepositoryFileAttributeType],
    ) -> Result<RepositoryFileAttributes, StorageError> {
        let checksum = has_checksum_extension(path);
        let mut attributes = RepositoryFileAttributes::new();
        for &attribute in types {
            let value = match attribute {
                RepositoryFileAttributeType::Checksum => AttributeValue::Flag(checksum),
                RepositoryFileAttributeType::Artifact => AttributeValue::Flag(!checksum && !path.is_root()),
                RepositoryFileAttributeType::Metadata => AttributeValue::Flag(false),
                RepositoryFileAttributeType::Coordinates => AttributeValue::Text(path.relativize()?),
            };
            attributes.insert(attribute, value);
        }
        Ok(attributes)
    }
}
