//! Chunk file building and parsing.

use std::path::Path;

use memmap2::Mmap;
use truecrowd_common::{crc, BinaryReader};
use zerocopy::IntoBytes;

use crate::header::{ChunkHeader, FileHeader, CHUNK_NAME_LEN, PAYLOAD_ALIGN};
use crate::{Error, Result};

/// One chunk: type tag, version, debug name and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Type tag of the payload.
    pub uid: u32,
    /// Payload version counter.
    pub version: u32,
    /// Debug name.
    pub name: String,
    /// Payload bytes, exactly as written.
    pub data: Vec<u8>,
}

/// Builder for chunk files.
#[derive(Debug)]
pub struct ChunkFileBuilder {
    platform: [u8; 4],
    chunks: Vec<Chunk>,
}

impl ChunkFileBuilder {
    /// Create a builder for the given platform tag.
    pub fn new(platform: [u8; 4]) -> Self {
        Self {
            platform,
            chunks: Vec::new(),
        }
    }

    /// Append a chunk.
    pub fn add_chunk(
        &mut self,
        uid: u32,
        name: &str,
        version: u32,
        data: Vec<u8>,
    ) -> Result<&mut Self> {
        if name.len() >= CHUNK_NAME_LEN {
            return Err(Error::NameTooLong {
                name: name.to_string(),
                max: CHUNK_NAME_LEN - 1,
            });
        }

        self.chunks.push(Chunk {
            uid,
            version,
            name: name.to_string(),
            data,
        });
        Ok(self)
    }

    /// Serialize the file.
    pub fn build(&self) -> Vec<u8> {
        let header = FileHeader {
            magic: *FileHeader::MAGIC,
            platform: self.platform,
            format_version: FileHeader::FORMAT_VERSION,
            chunk_count: self.chunks.len() as u32,
        };

        let mut output = Vec::new();
        output.extend_from_slice(header.as_bytes());

        for chunk in &self.chunks {
            let mut name = [0u8; CHUNK_NAME_LEN];
            name[..chunk.name.len()].copy_from_slice(chunk.name.as_bytes());

            let chunk_header = ChunkHeader {
                uid: chunk.uid,
                version: chunk.version,
                name,
                data_size: chunk.data.len() as u32,
                checksum: crc::checksum(&chunk.data),
                data_offset: std::mem::size_of::<ChunkHeader>() as u32,
                _reserved: [0; 3],
            };

            output.extend_from_slice(chunk_header.as_bytes());
            output.extend_from_slice(&chunk.data);
            output.resize(output.len().next_multiple_of(PAYLOAD_ALIGN), 0);
        }

        output
    }

    /// Serialize the file and write it to disk.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.build();
        std::fs::write(path, &bytes)?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote chunk file");
        Ok(())
    }
}

/// A parsed chunk file.
#[derive(Debug, Clone)]
pub struct ChunkFile {
    platform: [u8; 4],
    chunks: Vec<Chunk>,
}

impl ChunkFile {
    /// Open and parse a chunk file (memory-mapped while parsing).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        // SAFETY: the mapping is only read while parsing and every payload is copied out.
        let mmap = unsafe { Mmap::map(&file)? };
        Self::parse(&mmap)
    }

    /// Parse a chunk file, verifying every payload checksum.
    pub fn parse(data: &[u8]) -> Result<Self> {
        BinaryReader::new(data).expect_magic(FileHeader::MAGIC)?;
        let mut reader = BinaryReader::new(data);
        let header: FileHeader = reader.read_struct()?;

        // Each chunk needs at least its header, so the count from the file is capped by the data.
        let max_chunks = data.len() / std::mem::size_of::<ChunkHeader>();
        let mut chunks = Vec::with_capacity((header.chunk_count as usize).min(max_chunks));
        for _ in 0..header.chunk_count {
            let start = reader.position();
            let chunk_header: ChunkHeader = reader.read_struct()?;

            let offset = start + chunk_header.data_offset as usize;
            let size = chunk_header.data_size as usize;
            let payload = data
                .get(offset..offset.saturating_add(size))
                .ok_or(Error::PayloadOutOfBounds {
                    uid: chunk_header.uid,
                    offset,
                    size,
                    file_len: data.len(),
                })?;

            let actual = crc::checksum(payload);
            if actual != chunk_header.checksum {
                return Err(Error::ChecksumMismatch {
                    uid: chunk_header.uid,
                    expected: chunk_header.checksum,
                    actual,
                });
            }

            chunks.push(Chunk {
                uid: chunk_header.uid,
                version: chunk_header.version,
                name: chunk_header.name().to_string(),
                data: payload.to_vec(),
            });

            reader.seek((offset + size).next_multiple_of(PAYLOAD_ALIGN));
        }

        Ok(Self {
            platform: header.platform,
            chunks,
        })
    }

    /// Platform tag of the file.
    pub fn platform(&self) -> &[u8; 4] {
        &self.platform
    }

    /// All chunks in file order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// First chunk with the given uid.
    pub fn find(&self, uid: u32) -> Option<&Chunk> {
        self.chunks.iter().find(|c| c.uid == uid)
    }

    /// First chunk with the given uid, or [`Error::ChunkNotFound`].
    pub fn require(&self, uid: u32) -> Result<&Chunk> {
        self.find(uid).ok_or(Error::ChunkNotFound(uid))
    }
}
