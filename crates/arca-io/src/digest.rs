//! # Multi-Algorithm Digest
//!
//! `MultiDigest` feeds the same byte sequence to several hashers at once so
//! a single pass over an artifact yields every checksum its storage needs.
//! Results are keyed by the *configured* algorithm name, which is also the
//! name the checksum sidecar path is derived from.

use std::collections::BTreeMap;

use arca_core::{to_hex, DigestAlgorithm, DigestAlgorithmSet, StorageError};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

enum Hasher {
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

impl Hasher {
    fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Md5 => Self::Md5(Md5::new()),
            DigestAlgorithm::Sha1 => Self::Sha1(Sha1::new()),
            DigestAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            DigestAlgorithm::Sha384 => Self::Sha384(Sha384::new()),
            DigestAlgorithm::Sha512 => Self::Sha512(Sha512::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Md5(h) => h.update(data),
            Self::Sha1(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
            Self::Sha384(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            Self::Md5(h) => to_hex(&h.finalize()),
            Self::Sha1(h) => to_hex(&h.finalize()),
            Self::Sha256(h) => to_hex(&h.finalize()),
            Self::Sha384(h) => to_hex(&h.finalize()),
            Self::Sha512(h) => to_hex(&h.finalize()),
        }
    }
}

/// Several running digests over one byte stream.
#[derive(Default)]
pub struct MultiDigest {
    hashers: Vec<(String, Hasher)>,
}

impl MultiDigest {
    /// A digest computing nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a digest for every algorithm in `algorithms`. Unsupported names
    /// are logged and skipped; the remaining algorithms are still computed.
    pub fn for_algorithms(algorithms: &DigestAlgorithmSet) -> Self {
        let mut digest = Self::new();
        for name in algorithms.iter() {
            if let Err(e) = digest.add_algorithm(name) {
                tracing::error!(algorithm = name, error = %e, "skipping digest algorithm");
            }
        }
        digest
    }

    /// Start computing `name`. Adding a name twice is a no-op.
    pub fn add_algorithm(&mut self, name: &str) -> Result<(), StorageError> {
        let algorithm = DigestAlgorithm::from_name(name)
            .ok_or_else(|| StorageError::UnsupportedAlgorithm(name.to_string()))?;
        if self.hashers.iter().all(|(n, _)| n != name) {
            self.hashers.push((name.to_string(), Hasher::new(algorithm)));
        }
        Ok(())
    }

    /// Names being computed, in insertion order.
    pub fn algorithms(&self) -> impl Iterator<Item = &str> {
        self.hashers.iter().map(|(n, _)| n.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.hashers.is_empty()
    }

    pub fn update(&mut self, data: &[u8]) {
        for (_, hasher) in &mut self.hashers {
            hasher.update(data);
        }
    }

    /// Consume the digest, returning lowercase hex values keyed by name.
    pub fn finalize(self) -> BTreeMap<String, String> {
        self.hashers
            .into_iter()
            .map(|(name, hasher)| (name, hasher.finalize_hex()))
            .collect()
    }
}

impl std::fmt::Debug for MultiDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiDigest")
            .field("algorithms", &self.algorithms().collect::<Vec<_>>())
            .finish()
    }
}
