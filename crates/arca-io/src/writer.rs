//! # Digesting Writer
//!
//! `LayoutWriter` computes digests over every byte accepted by the wrapped
//! writer. Only bytes the inner writer reports as written are digested, so a
//! short write never desynchronizes the hash from the stored content.

use std::collections::BTreeMap;
use std::io::{self, Write};

use arca_core::StorageError;

use crate::digest::MultiDigest;

/// A writer that digests what passes through it.
pub struct LayoutWriter<W: Write> {
    inner: W,
    digest: MultiDigest,
}

impl<W: Write> LayoutWriter<W> {
    /// Wrap `inner` with no algorithms attached.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            digest: MultiDigest::new(),
        }
    }

    /// Attach an algorithm. Must be called before the first write for the
    /// digest to cover the whole content.
    pub fn add_algorithm(&mut self, name: &str) -> Result<(), StorageError> {
        self.digest.add_algorithm(name)
    }

    pub fn algorithms(&self) -> Vec<&str> {
        self.digest.algorithms().collect()
    }

    /// Flush and close the inner writer, returning the hex digests keyed by
    /// algorithm name.
    pub fn finish(mut self) -> io::Result<BTreeMap<String, String>> {
        self.inner.flush()?;
        let Self { inner, digest } = self;
        drop(inner);
        Ok(digest.finalize())
    }
}

impl<W: Write> Write for LayoutWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.digest.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write> std::fmt::Debug for LayoutWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutWriter")
            .field("digest", &self.digest)
            .finish()
    }
}
