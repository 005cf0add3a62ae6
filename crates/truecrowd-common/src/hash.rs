//! The engine's 32-bit symbol hashes.
//!
//! Symbols are CRC-32 values computed MSB-first with polynomial `0x04C11DB7`, an
//! initial value of `0xFFFFFFFF` and no final xor. The upper-cased variant folds
//! ASCII `a-z` to `A-Z` before hashing, so `"bone_head"` and `"BONE_HEAD"` share an id.
//!
//! Both functions are `const` so well-known ids (chunk tags, resource type ids) can
//! be computed at compile time.

const POLYNOMIAL: u32 = 0x04C1_1DB7;

const TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u32) << 24;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ POLYNOMIAL
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

#[inline]
const fn step(crc: u32, byte: u8) -> u32 {
    (crc << 8) ^ TABLE[((crc >> 24) ^ byte as u32) as usize & 0xFF]
}

/// Case-sensitive symbol hash of a string.
pub const fn hash32(s: &str) -> u32 {
    let bytes = s.as_bytes();
    let mut crc = 0xFFFF_FFFF;
    let mut i = 0;
    while i < bytes.len() {
        crc = step(crc, bytes[i]);
        i += 1;
    }
    crc
}

/// Upper-cased symbol hash of a string.
pub const fn hash_upper32(s: &str) -> u32 {
    let bytes = s.as_bytes();
    let mut crc = 0xFFFF_FFFF;
    let mut i = 0;
    while i < bytes.len() {
        crc = step(crc, bytes[i].to_ascii_uppercase());
        i += 1;
    }
    crc
}
