//! TrueCrowd - crowd resource database conversion library.
//!
//! This crate provides a unified interface to the TrueCrowd crates and the
//! file-level conversions the `truecrowd` tool performs.
//!
//! # Crates
//!
//! - [`truecrowd_common`] - Binary reading, symbol hashes, symbol tables
//! - [`truecrowd_xml`] - XML document model
//! - [`truecrowd_chunk`] - Chunk-file container
//! - [`truecrowd_db`] - Crowd database builder, image IO and exporter
//!
//! # Example
//!
//! ```no_run
//! use truecrowd::prelude::*;
//!
//! // crowd.xml -> crowd.bin + crowd_qsymbols.txt
//! let scribed = truecrowd::scribe_file("crowd.xml")?;
//! println!("wrote {}", scribed.binary.display());
//!
//! // crowd.bin -> crowd.xml
//! let mut symbols = SymbolTable::new();
//! symbols.load(&scribed.symbols)?;
//! truecrowd::convert_file(&scribed.binary, &symbols, &ExportOptions::default())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod convert;
mod error;

pub use truecrowd_chunk as chunk;
pub use truecrowd_common as common;
pub use truecrowd_db as db;
pub use truecrowd_xml as xml;

pub use convert::{
    convert_file, scribe_file, symbols_path, Converted, Scribed, SYMBOLS_SUFFIX,
};
pub use error::{Error, Result};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use truecrowd_chunk::{ChunkFile, ChunkFileBuilder};
    pub use truecrowd_common::{hash, BinaryReader, CaseMode, SymbolTable};
    pub use truecrowd_db::{build, CrowdDatabase, ExportOptions, Summary, XmlExporter};
    pub use truecrowd_xml::{XmlDocument, XmlNode};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
