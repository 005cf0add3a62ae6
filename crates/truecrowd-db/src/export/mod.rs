//! Projecting a database back to its XML form.
//!
//! Identifiers are rendered through a [`SymbolTable`](truecrowd_common::SymbolTable).
//! Ids without a known spelling become `~0xXXXXXXXX~` placeholders, which the
//! builder reads back as the same raw id, and are listed in comments after the
//! root element.

mod xml;

use std::path::Path;

use truecrowd_xml::XmlDocument;

use crate::Result;

pub use xml::XmlExporter;

/// Text header of the unresolved-symbol comment block.
pub const UNRESOLVED_HEADER: &str = " List of unresolved symbols ";

/// Output formatting options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Spaces per nesting level.
    pub indent: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { indent: 4 }
    }
}

/// Result of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub document: XmlDocument,
    /// Ids rendered as placeholders, ascending.
    pub unresolved: Vec<u32>,
}

impl Export {
    /// Render the document as text.
    pub fn to_xml_string(&self, options: &ExportOptions) -> Result<String> {
        let mut out = Vec::new();
        self.document.write_xml(&mut out, options.indent)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Write the document to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P, options: &ExportOptions) -> Result<()> {
        self.document.save(path, options.indent)?;
        Ok(())
    }
}

impl crate::CrowdDatabase {
    /// Export the database, rendering ids through `symbols`.
    pub fn to_xml(&self, symbols: &truecrowd_common::SymbolTable) -> Export {
        XmlExporter::new(self, symbols).export()
    }
}
