//! Error types for chunk files.

use thiserror::Error;

/// Errors that can occur when reading or writing chunk files.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] truecrowd_common::Error),

    /// Chunk debug name does not fit the header.
    #[error("chunk name {name:?} is longer than {max} bytes")]
    NameTooLong { name: String, max: usize },

    /// Payload offset or size points outside the file.
    #[error("chunk {uid:#010x} payload out of bounds (offset {offset}, size {size}, file {file_len})")]
    PayloadOutOfBounds {
        uid: u32,
        offset: usize,
        size: usize,
        file_len: usize,
    },

    /// CRC32C checksum mismatch.
    #[error("chunk {uid:#010x} checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { uid: u32, expected: u32, actual: u32 },

    /// No chunk with the requested uid.
    #[error("no chunk with uid {0:#010x}")]
    ChunkNotFound(u32),
}

/// Result type for chunk operations.
pub type Result<T> = std::result::Result<T, Error>;
