//! CRC32C checksum utilities.
//!
//! Chunk payloads carry a CRC32C (Castagnoli) checksum so a truncated or patched
//! database is rejected before it is interpreted.

/// Compute the CRC32C checksum of a byte slice.
///
/// Uses hardware acceleration when available (SSE4.2 on x86).
#[inline]
pub fn checksum(data: &[u8]) -> u32 {
    crc32c::crc32c(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_checksum() {
        assert_eq!(checksum(&[]), 0);
    }

    #[test]
    fn test_detects_change() {
        assert_ne!(checksum(b"TrueCrowdDB"), checksum(b"TrueCrowdDC"));
    }
}
