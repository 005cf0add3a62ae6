//! On-disk headers of a chunk file.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Size of the inline chunk debug name.
pub const CHUNK_NAME_LEN: usize = 32;

/// Payloads start and end on this alignment.
pub const PAYLOAD_ALIGN: usize = 16;

/// File header at offset 0.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct FileHeader {
    /// Always [`FileHeader::MAGIC`].
    pub magic: [u8; 4],
    /// Target platform tag, e.g. `PC64`.
    pub platform: [u8; 4],
    /// Container format version.
    pub format_version: u32,
    /// Number of chunks that follow.
    pub chunk_count: u32,
}

impl FileHeader {
    /// Magic bytes at the start of every chunk file.
    pub const MAGIC: &'static [u8; 4] = b"QCHK";

    /// Current container format version.
    pub const FORMAT_VERSION: u32 = 1;
}

/// Header preceding each chunk payload.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct ChunkHeader {
    /// Type tag of the payload.
    pub uid: u32,
    /// Payload version counter.
    pub version: u32,
    /// NUL-padded debug name.
    pub name: [u8; CHUNK_NAME_LEN],
    /// Payload size in bytes (without padding).
    pub data_size: u32,
    /// CRC32C of the payload.
    pub checksum: u32,
    /// Offset of the payload from the start of this header.
    pub data_offset: u32,
    /// Reserved, zero.
    pub _reserved: [u32; 3],
}

impl ChunkHeader {
    /// Debug name as a string, up to the first NUL.
    pub fn name(&self) -> &str {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(CHUNK_NAME_LEN);
        std::str::from_utf8(&self.name[..end]).unwrap_or("")
    }
}
