//! # Lazily Initialized Reader
//!
//! Opening a stream for every path a caller merely inspects would pay for a
//! file open, a size lookup and reload-handler setup each time. `LazyReader`
//! holds the setup as a factory and runs it exactly once, on the first
//! `read` or `seek`. A failed setup is remembered: later calls return an
//! error of the same kind without invoking the factory again.

use std::io::{self, Read, Seek, SeekFrom};

type Factory<R> = Box<dyn FnOnce() -> io::Result<R> + Send>;

enum LazyState<R> {
    Pending(Factory<R>),
    Ready(R),
    Failed { kind: io::ErrorKind, message: String },
    Poisoned,
}

/// A reader whose construction is deferred until first use.
pub struct LazyReader<R> {
    state: LazyState<R>,
}

impl<R> LazyReader<R> {
    pub fn new<F>(factory: F) -> Self
    where
        F: FnOnce() -> io::Result<R> + Send + 'static,
    {
        Self {
            state: LazyState::Pending(Box::new(factory)),
        }
    }

    /// Returns `true` once the factory has run successfully.
    pub fn is_initialized(&self) -> bool {
        matches!(self.state, LazyState::Ready(_))
    }

    fn target(&mut self) -> io::Result<&mut R> {
        if matches!(self.state, LazyState::Pending(_)) {
            if let LazyState::Pending(factory) = std::mem::replace(&mut self.state, LazyState::Poisoned) {
                match factory() {
                    Ok(reader) => self.state = LazyState::Ready(reader),
                    Err(e) => {
                        self.state = LazyState::Failed {
                            kind: e.kind(),
                            message: e.to_string(),
                        };
                        return Err(e);
                    }
                }
            }
        }

        match &mut self.state {
            LazyState::Ready(reader) => Ok(reader),
            LazyState::Failed { kind, message } => Err(io::Error::new(*kind, message.clone())),
            LazyState::Pending(_) | LazyState::Poisoned => Err(io::Error::new(
                io::ErrorKind::Other,
                "lazy stream initialization did not complete",
            )),
        }
    }
}

impl<R: Read> Read for LazyReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.target()?.read(buf)
    }
}

impl<R: Seek> Seek for LazyReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.target()?.seek(pos)
    }
}

impl<R> std::fmt::Debug for LazyReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyReader")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn factory_runs_once_on_first_read() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut reader = LazyReader::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Cursor::new(b"hello".to_vec()))
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!reader.is_initialized());

        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, "hello");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(reader.is_initialized());
    }

    #[test]
    fn dropped_unread_never_runs_factory() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let reader = LazyReader::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Cursor::new(Vec::<u8>::new()))
        });
        drop(reader);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failure_is_sticky() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut reader: LazyReader<Cursor<Vec<u8>>> = LazyReader::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(io::Error::new(io::ErrorKind::NotFound, "gone"))
        });
        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).unwrap_err().kind(), io::ErrorKind::NotFound);
        let second = reader.read(&mut buf).unwrap_err();
        assert_eq!(second.kind(), io::ErrorKind::NotFound);
        assert!(second.to_string().contains("gone"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn seek_initializes() {
        let mut reader = LazyReader::new(|| Ok(Cursor::new(b"abcdef".to_vec())));
        reader.seek(SeekFrom::Start(4)).unwrap();
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, "ef");
    }
}
