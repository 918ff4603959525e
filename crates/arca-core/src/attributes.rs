//! # Repository File Attributes
//!
//! Layout providers classify repository paths by answering attribute
//! queries. The storage layer only asks for the attributes it needs
//! (checksum, artifact) and routes everything else verbatim.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A layout-defined attribute of a repository path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositoryFileAttributeType {
    /// The path is a checksum sidecar.
    Checksum,
    /// The path is a package artifact tracked by the metadata index.
    Artifact,
    /// The path is layout metadata (e.g. `maven-metadata.xml`).
    Metadata,
    /// Layout-specific coordinates of the artifact.
    Coordinates,
}

/// The value of a single attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Flag(bool),
    Text(String),
}

impl AttributeValue {
    /// Interpret as a flag; text values are never `true`.
    pub fn is_true(&self) -> bool {
        matches!(self, Self::Flag(true))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Flag(_) => None,
        }
    }
}

/// The attributes a layout provider returned for a path.
pub type RepositoryFileAttributes = HashMap<RepositoryFileAttributeType, AttributeValue>;

/// Read a flag attribute, treating an absent entry as `false`.
pub fn flag(attributes: &RepositoryFileAttributes, attribute: RepositoryFileAttributeType) -> bool {
    attributes.get(&attribute).is_some_and(AttributeValue::is_true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_flag_is_false() {
        let mut attrs = RepositoryFileAttributes::new();
        assert!(!flag(&attrs, RepositoryFileAttributeType::Checksum));
        attrs.insert(RepositoryFileAttributeType::Checksum, AttributeValue::Flag(true));
        assert!(flag(&attrs, RepositoryFileAttributeType::Checksum));
    }

    #[test]
    fn text_is_not_a_flag() {
        let value = AttributeValue::Text("org.carl:lib:1.0".into());
        assert!(!value.is_true());
        assert_eq!(value.as_text(), Some("org.carl:lib:1.0"));
    }
}
