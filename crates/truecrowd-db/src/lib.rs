//! TrueCrowd crowd resource database.
//!
//! A crowd database lists the entity archetypes of a crowd system together with
//! every resource (models, LODs, texture sets) each component type can use. It
//! exists in two forms: a contiguous binary image stored in a chunk file, and an
//! editable XML document. This crate converts between them.
//!
//! # Quick Start
//!
//! ```no_run
//! use truecrowd_common::SymbolTable;
//! use truecrowd_db::{build, CrowdDatabase, ExportOptions};
//! use truecrowd_xml::XmlDocument;
//!
//! // XML to binary
//! let built = build(&XmlDocument::open("crowd.xml")?)?;
//! built.database.save("crowd.bin")?;
//! built.symbols.save("crowd_qsymbols.txt")?;
//!
//! // Binary to XML
//! let db = CrowdDatabase::open("crowd.bin")?;
//! let mut symbols = SymbolTable::new();
//! symbols.load("crowd_qsymbols.txt")?;
//! db.to_xml(&symbols).save("crowd.xml", &ExportOptions::default())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Architecture
//!
//! - **Estimate** ([`estimate()`]): counts every variable-length region of a document
//! - **Layout** ([`Layout`], [`Arenas`]): region offsets and pre-sized, non-growing arenas
//! - **Builder** ([`build`], [`DatabaseBuilder`]): fills the arenas and resolves references
//! - **Database** ([`CrowdDatabase`]): read accessors, image and chunk-file IO
//! - **Export** ([`XmlExporter`]): projects a database back to XML

mod builder;
mod database;
mod error;
mod estimate;
mod export;
mod layout;
mod types;

pub mod structs;

pub use builder::{
    build, prop_set_uid, resource_path_uid, Build, BuildReport, DatabaseBuilder, FixupSlot,
    PendingFixup, Warning, LEGACY_ROOT_TAG, ROOT_TAG,
};
pub use database::{
    CrowdDatabase, Summary, CHUNK_NAME, CHUNK_UID, CHUNK_VERSION, NAME_UID, PLATFORM, TYPE_UID,
};
pub use error::{Error, ReferenceKind, Result};
pub use estimate::estimate;
pub use export::{Export, ExportOptions, XmlExporter, UNRESOLVED_HEADER};
pub use layout::{Arena, Arenas, Layout, Region, StringPool, REGION_ALIGN};
pub use structs::Estimate;
pub use types::ResourceType;
