//! Chunk-file container for TrueCrowd resources.
//!
//! A chunk file is a small header followed by tagged chunks. Each chunk carries a
//! type uid, a version counter, a debug name and a payload that is stored verbatim
//! (no framing inside the payload), protected by a CRC32C checksum.
//!
//! # Example
//!
//! ```
//! use truecrowd_chunk::{ChunkFile, ChunkFileBuilder};
//!
//! let mut builder = ChunkFileBuilder::new(*b"PC64");
//! builder.add_chunk(0x1234, "Example", 1, vec![1, 2, 3])?;
//! let bytes = builder.build();
//!
//! let file = ChunkFile::parse(&bytes)?;
//! assert_eq!(file.find(0x1234).unwrap().data, vec![1, 2, 3]);
//! # Ok::<(), truecrowd_chunk::Error>(())
//! ```

mod error;
mod file;
mod header;

pub use error::{Error, Result};
pub use file::{Chunk, ChunkFile, ChunkFileBuilder};
pub use header::{ChunkHeader, FileHeader};
