//! # arca-core: Foundational Types for Arca Artifact Storage
//!
//! Every other crate in the workspace depends on `arca-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype identifiers.** `StorageId` and `RepositoryId` are distinct
//!    types, so an index key cannot be assembled in the wrong order.
//!
//! 2. **Paths know their repository.** A `RepositoryPath` carries its owning
//!    `Repository` (layout, trash policy, digest algorithm set), so storage
//!    operations never consult a global registry.
//!
//! 3. **Digest names stay names.** A `DigestAlgorithmSet` keeps configured
//!    names verbatim; unsupported names are reported where a hasher is built,
//!    not rejected at configuration time.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `arca-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod artifact;
pub mod attributes;
pub mod config;
pub mod digest;
pub mod error;
pub mod identity;
pub mod path;

// Re-export primary types for ergonomic imports.
pub use artifact::ArtifactEntry;
pub use attributes::{AttributeValue, RepositoryFileAttributeType, RepositoryFileAttributes};
pub use config::{ArcaConfig, RepositoryConfig, StorageConfig};
pub use digest::{checksum_extension, is_checksum_extension, to_hex, DigestAlgorithm, DigestAlgorithmSet};
pub use error::{ConfigError, StorageError};
pub use identity::{RepositoryId, StorageId};
pub use path::{Repository, RepositoryPath, DEFAULT_LAYOUT, TRASH_DIR};
