//! Common utilities for TrueCrowd.
//!
//! This crate provides the foundational pieces shared by every TrueCrowd crate:
//!
//! - [`BinaryReader`] - Zero-copy binary reading from byte slices
//! - [`hash`] - The engine's 32-bit symbol hashes (case-sensitive and upper-cased)
//! - [`crc`] - CRC32C checksums for container payloads
//! - [`SymbolTable`] - Symbol interning with reverse lookup and dictionary files

mod error;
mod reader;
mod symbol;

pub mod crc;
pub mod hash;

pub use error::{Error, Result};
pub use reader::{cstr_at, BinaryReader};
pub use symbol::{CaseMode, SymbolTable, ESCAPE_MARKER};

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
