//! # Digesting Reader
//!
//! `LayoutReader` computes the configured digests over every byte read from
//! the wrapped reader. Digest values become visible only once the inner
//! reader reports end of stream; a reader dropped or repositioned before
//! that point never exposes a value, so a partial hash cannot be mistaken
//! for a checksum.

use std::collections::BTreeMap;
use std::io::{self, Read, Seek, SeekFrom};

use arca_core::DigestAlgorithmSet;

use crate::digest::MultiDigest;

enum DigestState {
    Streaming(MultiDigest),
    Complete(BTreeMap<String, String>),
    Abandoned,
}

/// A reader that digests what passes through it.
pub struct LayoutReader<R> {
    inner: R,
    state: DigestState,
}

impl<R: Read> LayoutReader<R> {
    /// Wrap `inner`, computing every supported algorithm in `algorithms`.
    /// An empty set yields a plain pass-through reader.
    pub fn new(inner: R, algorithms: &DigestAlgorithmSet) -> Self {
        Self::with_digest(inner, MultiDigest::for_algorithms(algorithms))
    }

    pub fn with_digest(inner: R, digest: MultiDigest) -> Self {
        Self {
            inner,
            state: DigestState::Streaming(digest),
        }
    }

    /// Hex digest for `algorithm`, available once the stream is exhausted.
    pub fn message_digest_hex(&self, algorithm: &str) -> Option<&str> {
        self.digests()?.get(algorithm).map(String::as_str)
    }

    /// All digests, available once the stream is exhausted.
    pub fn digests(&self) -> Option<&BTreeMap<String, String>> {
        match &self.state {
            DigestState::Complete(values) => Some(values),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, DigestState::Complete(_))
    }

    /// Names of the algorithms this reader computes. Empty once the digest
    /// has been abandoned by a seek.
    pub fn algorithms(&self) -> Vec<&str> {
        match &self.state {
            DigestState::Streaming(digest) => digest.algorithms().collect(),
            DigestState::Complete(values) => values.keys().map(String::as_str).collect(),
            DigestState::Abandoned => Vec::new(),
        }
    }

    /// Read to the end, discarding the bytes, and return the digests.
    pub fn finish(&mut self) -> io::Result<&BTreeMap<String, String>> {
        io::copy(self, &mut io::sink())?;
        self.digests().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                "stream was repositioned; digest is incomplete",
            )
        })
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for LayoutReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if let DigestState::Streaming(digest) = &mut self.state {
            if n == 0 && !buf.is_empty() {
                let digest = std::mem::take(digest);
                self.state = DigestState::Complete(digest.finalize());
            } else {
                digest.update(&buf[..n]);
            }
        }
        Ok(n)
    }
}

impl<R: Read + Seek> Seek for LayoutReader<R> {
    /// Any repositioning other than querying the current offset abandons
    /// the digest: the bytes seen no longer form the artifact's content.
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        if pos != SeekFrom::Current(0) && !self.is_complete() {
            self.state = DigestState::Abandoned;
        }
        self.inner.seek(pos)
    }
}

impl<R> std::fmt::Debug for LayoutReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            DigestState::Streaming(_) => "streaming",
            DigestState::Complete(_) => "complete",
            DigestState::Abandoned => "abandoned",
        };
        f.debug_struct("LayoutReader").field("state", &state).finish()
    }
}
