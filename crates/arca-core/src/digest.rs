//! # Digest Algorithm Naming
//!
//! Defines `DigestAlgorithm`, the set of hashes a storage can compute for
//! its artifacts, and `DigestAlgorithmSet`, the ordered list of algorithm
//! names configured per storage.
//!
//! Algorithm names are matched case-insensitively with hyphens ignored, so
//! `SHA-256`, `sha256` and `Sha-256` all name the same algorithm and map to
//! the same checksum sidecar extension (`sha256`).
//!
//! The set keeps the configured *names* rather than parsed algorithms: an
//! unknown name survives configuration and is reported (and skipped) at the
//! point a stream tries to instantiate it.

use serde::{Deserialize, Serialize};

/// A hash algorithm that can back a checksum sidecar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// MD5: legacy, still published by Maven repositories.
    Md5,
    /// SHA-1: default Maven checksum.
    Sha1,
    /// SHA-256.
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
}

impl DigestAlgorithm {
    /// Every supported algorithm, in canonical order.
    pub const ALL: [DigestAlgorithm; 5] = [
        Self::Md5,
        Self::Sha1,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
    ];

    /// Parse an algorithm name, ignoring case and hyphens.
    pub fn from_name(name: &str) -> Option<Self> {
        let ext = checksum_extension(name);
        Self::ALL.into_iter().find(|alg| alg.extension() == ext)
    }

    /// The conventional algorithm name (`MD5`, `SHA-1`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA-1",
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }

    /// The checksum sidecar extension, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    /// Length of the hex-encoded digest.
    pub fn hex_len(&self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha1 => 40,
            Self::Sha256 => 64,
            Self::Sha384 => 96,
            Self::Sha512 => 128,
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the checksum sidecar extension for an algorithm name: lowercased,
/// hyphens stripped. Works for names that do not parse as a known algorithm.
pub fn checksum_extension(algorithm_name: &str) -> String {
    algorithm_name.to_lowercase().replace('-', "")
}

/// Returns `true` if `ext` is the sidecar extension of a supported algorithm.
pub fn is_checksum_extension(ext: &str) -> bool {
    let ext = ext.to_ascii_lowercase();
    DigestAlgorithm::ALL.iter().any(|alg| alg.extension() == ext)
}

/// Render bytes as a lowercase hex string.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// The ordered set of digest algorithm names a storage computes for every
/// non-checksum artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct DigestAlgorithmSet(Vec<String>);

impl DigestAlgorithmSet {
    /// Build a set from names, dropping later duplicates (by extension) and
    /// blank entries while keeping first-seen order.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut kept: Vec<String> = Vec::new();
        for name in names {
            let name = name.into().trim().to_string();
            if name.is_empty() {
                continue;
            }
            let ext = checksum_extension(&name);
            if kept.iter().all(|k| checksum_extension(k) != ext) {
                kept.push(name);
            }
        }
        Self(kept)
    }

    /// The empty set, used for checksum sidecars.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Iterate the configured names in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of configured names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no algorithm is configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for DigestAlgorithmSet {
    /// Maven's traditional pair: MD5 and SHA-1.
    fn default() -> Self {
        Self::new([DigestAlgorithm::Md5.as_str(), DigestAlgorithm::Sha1.as_str()])
    }
}

impl From<Vec<String>> for DigestAlgorithmSet {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}

impl From<DigestAlgorithmSet> for Vec<String> {
    fn from(set: DigestAlgorithmSet) -> Self {
        set.0
    }
}
