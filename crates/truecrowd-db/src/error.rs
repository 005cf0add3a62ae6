//! Error types for building, reading and exporting crowd databases.

use thiserror::Error;

use crate::layout::Region;

/// What a `HighResolutionResource` reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// A resource entry, searched by resource name.
    Model,
    /// A texture set, searched by texture-set name.
    TextureSet,
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Model => f.write_str("Model"),
            Self::TextureSet => f.write_str("TextureSet"),
        }
    }
}

fn owner_suffix(owner: &Option<String>) -> String {
    match owner {
        Some(owner) => format!(" (in '{owner}')"),
        None => String::new(),
    }
}

/// Errors that can occur when working with crowd databases.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] truecrowd_common::Error),

    /// XML error.
    #[error("{0}")]
    Xml(#[from] truecrowd_xml::Error),

    /// Chunk container error.
    #[error("{0}")]
    Chunk(#[from] truecrowd_chunk::Error),

    /// The document root has the wrong tag.
    #[error("unexpected root element <{actual}> (expected <{expected}>)")]
    UnexpectedRoot {
        expected: &'static str,
        actual: String,
    },

    /// A required element is missing.
    #[error("missing <{tag}> in <{parent}>")]
    MissingTag {
        tag: &'static str,
        parent: &'static str,
    },

    /// A required attribute is missing.
    #[error("<{tag}> is missing attribute '{attribute}'{}", owner_suffix(.owner))]
    MissingAttribute {
        tag: &'static str,
        attribute: &'static str,
        owner: Option<String>,
    },

    /// A required text body is empty.
    #[error("<{tag}> has no text{}", owner_suffix(.owner))]
    MissingText {
        tag: &'static str,
        owner: Option<String>,
    },

    /// An attribute value could not be parsed.
    #[error("<{tag}> attribute '{attribute}' has invalid value '{value}'{}", owner_suffix(.owner))]
    InvalidAttribute {
        tag: &'static str,
        attribute: &'static str,
        value: String,
        owner: Option<String>,
    },

    /// A fixed-capacity array would overflow.
    #[error("too many <{what}> elements (capacity {capacity}){}", owner_suffix(.owner))]
    CapacityExceeded {
        what: &'static str,
        capacity: usize,
        owner: Option<String>,
    },

    /// A name does not fit its inline storage.
    #[error("name '{name}' is too long (max {max} bytes)")]
    NameTooLong { name: String, max: usize },

    /// A high-resolution reference names nothing in the database.
    #[error("failed to fix resource offset for {name} ({kind})")]
    UnresolvedReference { name: String, kind: ReferenceKind },

    /// An arena was pushed past its estimated capacity.
    #[error("{region} arena overflow (capacity {capacity})")]
    ArenaOverflow { region: Region, capacity: usize },

    /// A filled arena does not match its estimate.
    #[error("{region} holds {actual} elements but {expected} were estimated")]
    LayoutMismatch {
        region: Region,
        expected: usize,
        actual: usize,
    },

    /// The image does not start with a crowd database header.
    #[error("invalid type uid: 0x{actual:08X} (expected 0x{expected:08X})")]
    InvalidTypeUid { expected: u32, actual: u32 },

    /// The image size disagrees with its header.
    #[error("image size mismatch: header says {expected} bytes, found {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// An index or range points outside its region.
    #[error("{region} index {index} out of bounds (length {len})")]
    IndexOutOfBounds { region: Region, index: u32, len: usize },
}

/// Result type for crowd database operations.
pub type Result<T> = std::result::Result<T, Error>;
