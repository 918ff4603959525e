//! # arca-io: Digest Stream Wrappers
//!
//! Reader and writer decorators used by the storage layer to keep checksums
//! consistent with content without a second pass over the bytes:
//!
//! - **`MultiDigest`** runs several hashers (MD5, SHA-1, SHA-2 family) over
//!   one byte stream.
//! - **`LayoutReader`** / **`LayoutWriter`** digest everything read or
//!   written, exposing hex values only when the stream is complete.
//! - **`LazyReader`** defers stream setup to the first byte requested.
//! - **`ByteRangeReader`** repositions within content of known length,
//!   reloading the source for backward seeks.
//!
//! Streams are not `Sync`; one opened stream belongs to one caller.

pub mod digest;
pub mod lazy;
pub mod range;
pub mod reader;
pub mod writer;

pub use digest::MultiDigest;
pub use lazy::LazyReader;
pub use range::{ByteRangeReader, ReloadableInputHandler};
pub use reader::LayoutReader;
pub use writer::LayoutWriter;
