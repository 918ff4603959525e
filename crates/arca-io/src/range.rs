//! # Reloadable Byte-Range Reader
//!
//! Range requests (`Range: bytes=…`) need to reposition within an artifact.
//! Moving forward is a skip; moving backward on a plain file stream is
//! impossible, so `ByteRangeReader` asks its reload handler for a fresh
//! stream positioned at offset zero and skips forward from there.

use std::io::{self, Read, Seek, SeekFrom};

/// Reopens the underlying content from the beginning.
pub trait ReloadableInputHandler: Send {
    fn reload(&mut self) -> io::Result<Box<dyn Read + Send>>;
}

impl<F> ReloadableInputHandler for F
where
    F: FnMut() -> io::Result<Box<dyn Read + Send>> + Send,
{
    fn reload(&mut self) -> io::Result<Box<dyn Read + Send>> {
        self()
    }
}

/// A reader over content of known length that can be repositioned and
/// limited to a byte range.
pub struct ByteRangeReader {
    inner: Box<dyn Read + Send>,
    reload_handler: Option<Box<dyn ReloadableInputHandler>>,
    length: u64,
    position: u64,
    end: Option<u64>,
}

impl ByteRangeReader {
    /// Wrap a stream positioned at offset zero of content `length` bytes long.
    pub fn new(inner: Box<dyn Read + Send>, length: u64) -> Self {
        Self {
            inner,
            reload_handler: None,
            length,
            position: 0,
            end: None,
        }
    }

    pub fn with_reload_handler(mut self, handler: impl ReloadableInputHandler + 'static) -> Self {
        self.reload_handler = Some(Box::new(handler));
        self
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    /// Restrict reading to `[start, end)`. `None` reads to the end of content.
    pub fn set_range(&mut self, start: u64, end: Option<u64>) -> io::Result<()> {
        if let Some(end) = end {
            if end < start {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("invalid byte range {start}-{end}"),
                ));
            }
        }
        self.end = None;
        self.seek(SeekFrom::Start(start))?;
        self.end = end.map(|e| e.min(self.length));
        Ok(())
    }

    fn reload(&mut self) -> io::Result<()> {
        let handler = self.reload_handler.as_mut().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::Unsupported,
                "cannot seek backwards without a reload handler",
            )
        })?;
        self.inner = handler.reload()?;
        self.position = 0;
        Ok(())
    }

    fn skip(&mut self, count: u64) -> io::Result<()> {
        let skipped = io::copy(&mut (&mut self.inner).take(count), &mut io::sink())?;
        self.position += skipped;
        if skipped < count {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("content ended at offset {}", self.position),
            ));
        }
        Ok(())
    }
}

impl Read for ByteRangeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let limit = match self.end {
            Some(end) if self.position >= end => return Ok(0),
            Some(end) => (end - self.position).min(buf.len() as u64) as usize,
            None => buf.len(),
        };
        let n = self.inner.read(&mut buf[..limit])?;
        self.position += n as u64;
        Ok(n)
    }
}

impl Seek for ByteRangeReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => self.length.checked_add_signed(delta),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
        }
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "seek before start of content"))?;

        if target < self.position {
            self.reload()?;
        }
        self.skip(target - self.position)?;
        Ok(self.position)
    }
}

impl std::fmt::Debug for ByteRangeReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteRangeReader")
            .field("length", &self.length)
            .field("position", &self.position)
            .field("end", &self.end)
            .field("reloadable", &self.reload_handler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const CONTENT: &[u8] = b"0123456789";

    fn reloadable(reloads: Arc<AtomicUsize>) -> ByteRangeReader {
        ByteRangeReader::new(Box::new(Cursor::new(CONTENT.to_vec())), CONTENT.len() as u64)
            .with_reload_handler(move || -> io::Result<Box<dyn Read + Send>> {
                reloads.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(Cursor::new(CONTENT.to_vec())))
            })
    }

    #[test]
    fn forward_seek_skips_without_reload() {
        let reloads = Arc::new(AtomicUsize::new(0));
        let mut reader = reloadable(reloads.clone());
        reader.seek(SeekFrom::Start(7)).unwrap();
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, "789");
        assert_eq!(reloads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn backward_seek_reloads() {
        let reloads = Arc::new(AtomicUsize::new(0));
        let mut reader = reloadable(reloads.clone());
        let mut buf = [0u8; 6];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(reader.seek(SeekFrom::Current(-4)).unwrap(), 2);
        let mut out = [0u8; 3];
        reader.read_exact(&mut out).unwrap();
        assert_eq!(&out, b"234");
        assert_eq!(reloads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn backward_seek_without_handler_fails() {
        let mut reader = ByteRangeReader::new(Box::new(Cursor::new(CONTENT.to_vec())), 10);
        reader.seek(SeekFrom::Start(5)).unwrap();
        let err = reader.seek(SeekFrom::Start(1)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }

    #[test]
    fn range_limits_reads() {
        let reloads = Arc::new(AtomicUsize::new(0));
        let mut reader = reloadable(reloads);
        reader.set_range(3, Some(6)).unwrap();
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, "345");

        reader.set_range(0, None).unwrap();
        out.clear();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, "0123456789");
    }

    #[test]
    fn seek_from_end() {
        let reloads = Arc::new(AtomicUsize::new(0));
        let mut reader = reloadable(reloads);
        assert_eq!(reader.seek(SeekFrom::End(-2)).unwrap(), 8);
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, "89");
    }

    #[test]
    fn invalid_ranges_rejected() {
        let reloads = Arc::new(AtomicUsize::new(0));
        let mut reader = reloadable(reloads);
        assert!(reader.set_range(5, Some(2)).is_err());
        assert!(reader.seek(SeekFrom::Current(-1)).is_err());
        assert_eq!(
            reader.seek(SeekFrom::Start(11)).unwrap_err().kind(),
            io::ErrorKind::UnexpectedEof
        );
    }
}
