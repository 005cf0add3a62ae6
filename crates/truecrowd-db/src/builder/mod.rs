//! Building a crowd database from its XML form.
//!
//! A build runs in four passes over one owned context:
//!
//! 1. [`estimate`](crate::estimate()) counts every region,
//! 2. [`Arenas::allocate`] reserves exactly that much storage,
//! 3. the filler walks the document again and appends records,
//! 4. the fixup pass resolves `HighResolutionResource` names to indices.
//!
//! # Example
//!
//! ```
//! use truecrowd_db::build;
//! use truecrowd_xml::XmlDocument;
//!
//! let doc = XmlDocument::parse(r#"
//!     <TrueCrowdDataBase>
//!         <Definition><Tags><Tag>Civilian</Tag></Tags></Definition>
//!         <ComponentEntries>
//!             <Component name="Body">
//!                 <Resource name="Ped_A" type="0"><Tag>Civilian</Tag></Resource>
//!             </Component>
//!         </ComponentEntries>
//!     </TrueCrowdDataBase>"#)?;
//!
//! let built = build(&doc)?;
//! assert_eq!(built.database.resource_entries().len(), 1);
//! assert!(built.report.warnings.is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod fill;
mod fixup;
pub(crate) mod nodes;

use std::fmt;

use truecrowd_common::hash::hash32;
use truecrowd_common::SymbolTable;
use truecrowd_xml::{XmlDocument, XmlNode};
use zerocopy::FromZeros;

use crate::database::{CrowdDatabase, NAME_UID, TYPE_UID};
use crate::estimate::estimate_sections;
use crate::layout::{Arenas, Layout};
use crate::structs::{DatabaseHeader, Estimate};
use crate::Result;

pub use fixup::{FixupSlot, PendingFixup};
pub use nodes::{LEGACY_ROOT_TAG, ROOT_TAG};

/// A non-fatal problem found while building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// The definition has no `<Tags>` element.
    MissingTags,
    /// A resource `type` is absent or not a known resource type.
    InvalidResourceType {
        resource: String,
        value: Option<i32>,
    },
    /// A resource names a tag the definition does not list.
    UnknownTag { resource: String, tag: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTags => write!(f, "definition has no <Tags>"),
            Self::InvalidResourceType {
                resource,
                value: Some(value),
            } => write!(f, "resource '{resource}' has invalid type {value}"),
            Self::InvalidResourceType {
                resource,
                value: None,
            } => write!(f, "resource '{resource}' has no type"),
            Self::UnknownTag { resource, tag } => {
                write!(f, "resource '{resource}' uses undefined tag '{tag}'")
            }
        }
    }
}

/// Sizing and diagnostics of a finished build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Region counts the arenas were allocated with.
    pub estimate: Estimate,
    pub warnings: Vec<Warning>,
}

/// Everything a build produces.
#[derive(Debug, Clone)]
pub struct Build {
    pub database: CrowdDatabase,
    /// Every identifier spelling minted during the build.
    pub symbols: SymbolTable,
    pub report: BuildReport,
}

/// Build a database from a parsed document.
pub fn build(document: &XmlDocument) -> Result<Build> {
    DatabaseBuilder::new(&document.root).build()
}

/// Owned state of a single build.
#[derive(Debug)]
pub struct DatabaseBuilder<'a> {
    root: &'a XmlNode,
    symbols: SymbolTable,
    fixups: Vec<PendingFixup>,
    warnings: Vec<Warning>,
}

impl<'a> DatabaseBuilder<'a> {
    /// Prepare a build of the document rooted at `root`.
    pub fn new(root: &'a XmlNode) -> Self {
        Self {
            root,
            symbols: SymbolTable::new(),
            fixups: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Seed the symbol table, e.g. with spellings from an earlier build.
    pub fn with_symbols(mut self, symbols: SymbolTable) -> Self {
        self.symbols = symbols;
        self
    }

    /// Run every pass and return the finished database.
    pub fn build(mut self) -> Result<Build> {
        let sections = nodes::Sections::locate(self.root)?;
        let estimate = estimate_sections(&sections)?;
        let mut arenas = Arenas::allocate(&estimate);

        let mut header = DatabaseHeader::new_zeroed();
        header.type_uid = TYPE_UID;
        header.name_uid = NAME_UID;
        header.counts = estimate;

        let mut filler = fill::Filler {
            arenas: &mut arenas,
            definition: &mut header.definition,
            symbols: &mut self.symbols,
            fixups: &mut self.fixups,
            warnings: &mut self.warnings,
        };
        filler.fill(&sections)?;

        let resolved = fixup::resolve(&mut arenas, &self.fixups)?;
        arenas.check_filled(&estimate)?;
        header.total_size = Layout::compute(&estimate).total_size() as u32;

        for warning in &self.warnings {
            tracing::warn!("{warning}");
        }
        tracing::info!(
            resources = estimate.resource_entries,
            texture_sets = estimate.texture_sets,
            fixups = resolved,
            symbols = self.symbols.len(),
            warnings = self.warnings.len(),
            "built crowd database"
        );

        Ok(Build {
            database: CrowdDatabase::from_parts(header, arenas),
            symbols: self.symbols,
            report: BuildReport {
                estimate,
                warnings: self.warnings,
            },
        })
    }
}

/// Path id of a resource: hash of `Data\<TypePath>\<name>`.
pub fn resource_path_uid(type_path: &str, name: &str) -> u32 {
    hash32(&format!("Data\\{type_path}\\{name}"))
}

/// Property-set id of a resource: hash of `TrueCrowd-<TypePath>-<name>`.
pub fn prop_set_uid(type_path: &str, name: &str) -> u32 {
    hash32(&format!("TrueCrowd-{type_path}-{name}"))
}
