//! # Checksum Sidecars
//!
//! Every artifact may carry one sidecar per configured digest algorithm,
//! named `<artifact>.<ext>` (`lib-1.0.jar.sha1`) and holding the lowercase
//! hex digest with nothing else.
//!
//! `write_checksum` regenerates the sidecars of one artifact from its
//! current content. `store_checksum` does the same for a whole subtree and
//! reports what it could not handle instead of stopping at the first bad
//! entry.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use arca_core::{checksum_extension, RepositoryPath, StorageError};
use serde::Serialize;

use crate::provider::LayoutStorage;

/// The sidecar path holding `algorithm`'s digest of `artifact`.
///
/// Algorithm names are normalized, so `"SHA-256"` and `"sha256"` name the
/// same sidecar.
pub fn checksum_path(artifact: &RepositoryPath, algorithm: &str) -> RepositoryPath {
    let mut name = OsString::from(artifact.as_path().as_os_str());
    name.push(".");
    name.push(checksum_extension(algorithm));
    RepositoryPath::new(artifact.repository().clone(), PathBuf::from(name))
}

/// A path `store_checksum` could not process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecksumFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a bulk checksum regeneration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChecksumReport {
    /// Non-checksum files examined.
    pub visited: usize,
    /// Sidecars written.
    pub written: usize,
    pub failures: Vec<ChecksumFailure>,
}

impl ChecksumReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, path: &Path, error: &StorageError) {
        tracing::error!(path = %path.display(), error = %error, "checksum regeneration failed");
        self.failures.push(ChecksumFailure {
            path: path.to_path_buf(),
            reason: error.to_string(),
        });
    }
}

impl LayoutStorage {
    /// See [`checksum_path`].
    pub fn checksum_path(&self, artifact: &RepositoryPath, algorithm: &str) -> RepositoryPath {
        checksum_path(artifact, algorithm)
    }

    /// Write the sidecars of `artifact` for every configured algorithm.
    /// Existing sidecars are kept unless `force` is set. Returns the number
    /// of sidecars written.
    pub fn write_checksum(&self, artifact: &RepositoryPath, force: bool) -> Result<usize, StorageError> {
        let digests: BTreeMap<String, String> = {
            let mut reader = self.new_input_stream(artifact)?;
            reader.finish()?.clone()
        };

        let mut written = 0;
        for algorithm in artifact.repository().digest_algorithms().iter() {
            let Some(hex) = digests.get(algorithm) else {
                tracing::warn!(path = %artifact, algorithm, "no digest computed; sidecar not written");
                continue;
            };
            let sidecar = checksum_path(artifact, algorithm);
            if !force && self.backend().exists(&sidecar) {
                tracing::debug!(path = %sidecar, "checksum exists; skipping");
                continue;
            }
            match self.write_sidecar(&sidecar, hex) {
                Ok(()) => {
                    written += 1;
                    tracing::debug!(path = %sidecar, algorithm, "wrote checksum");
                }
                Err(e) => {
                    tracing::error!(path = %sidecar, algorithm, error = %e, "failed to write checksum");
                }
            }
        }
        Ok(written)
    }

    fn write_sidecar(&self, sidecar: &RepositoryPath, hex: &str) -> Result<(), StorageError> {
        let mut out = self.new_output_stream(sidecar)?;
        out.write_all(hex.as_bytes())?;
        out.finish()?;
        Ok(())
    }

    /// Regenerate sidecars for every artifact at or under `base`.
    ///
    /// Entries that cannot be walked, classified or digested are logged,
    /// recorded in the report and skipped.
    pub fn store_checksum(&self, base: &RepositoryPath, force: bool) -> Result<ChecksumReport, StorageError> {
        if !self.backend().exists(base) {
            return Err(StorageError::NotFound(base.as_path().to_path_buf()));
        }

        let mut report = ChecksumReport::default();
        for entry in self.backend().walk(base) {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    report.fail(e.path().unwrap_or(base.as_path()), &e);
                    continue;
                }
            };
            if self.backend().is_directory(&path) {
                continue;
            }
            match self.is_checksum(&path) {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    report.fail(path.as_path(), &e);
                    continue;
                }
            }

            report.visited += 1;
            match self.write_checksum(&path, force) {
                Ok(written) => report.written += written,
                Err(e) => report.fail(path.as_path(), &e),
            }
        }

        tracing::info!(
            base = %base,
            visited = report.visited,
            written = report.written,
            failures = report.failures.len(),
            "checksum regeneration finished"
        );
        Ok(report)
    }
}
