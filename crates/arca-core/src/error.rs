//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types used throughout Arca. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Structural violations (a directory where a leaf artifact was expected,
//!   a path outside its repository) carry the offending path.
//! - Maintenance failures (unsupported digest algorithms, index lookups) carry
//!   enough context to be logged and skipped by the caller.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Top-level error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The target is a directory where a leaf artifact was expected.
    #[error("the artifact path is a directory: [{0}]")]
    IsADirectory(PathBuf),

    /// The target does not exist.
    #[error("path not found: [{0}]")]
    NotFound(PathBuf),

    /// A configured digest algorithm cannot be instantiated.
    #[error("digest algorithm not supported: alg-[{0}]")]
    UnsupportedAlgorithm(String),

    /// The path cannot be expressed relative to its repository root.
    #[error("path [{path}] is outside repository root [{root}]")]
    OutsideRepository {
        /// The offending absolute path.
        path: PathBuf,
        /// The repository base directory.
        root: PathBuf,
    },

    /// The artifact metadata index rejected an operation.
    #[error("artifact index error: {0}")]
    Index(String),

    /// A layout provider could not classify a path.
    #[error("layout error: {0}")]
    Layout(String),

    /// An entry could not be read while walking a directory tree.
    #[error("failed to walk [{path}]: {source}")]
    Walk {
        /// The entry that could not be read.
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// IO error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    /// The `io::ErrorKind` this error maps to when surfaced through a
    /// `Read`/`Write` implementation.
    pub fn io_kind(&self) -> io::ErrorKind {
        match self {
            Self::IsADirectory(_) | Self::NotFound(_) => io::ErrorKind::NotFound,
            Self::UnsupportedAlgorithm(_) => io::ErrorKind::Unsupported,
            Self::OutsideRepository { .. } => io::ErrorKind::InvalidInput,
            Self::Io(e) | Self::Walk { source: e, .. } => e.kind(),
            Self::Index(_) | Self::Layout(_) => io::ErrorKind::Other,
        }
    }

    /// The filesystem entry this error is about, when it names one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::IsADirectory(path) | Self::NotFound(path) => Some(path.as_path()),
            Self::OutsideRepository { path, .. } | Self::Walk { path, .. } => Some(path.as_path()),
            Self::UnsupportedAlgorithm(_) | Self::Index(_) | Self::Layout(_) | Self::Io(_) => None,
        }
    }

    /// Convert into an `io::Error`, keeping this error as the source.
    pub fn into_io(self) -> io::Error {
        match self {
            Self::Io(e) => e,
            other => io::Error::new(other.io_kind(), other),
        }
    }
}

/// Error while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration {path}: {source}")]
    Read {
        /// The configuration file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The YAML document is malformed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The document parsed but violates a structural rule.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
