//! Error type for file-level conversions.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while converting files.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error.
    #[error("{0}")]
    Db(#[from] truecrowd_db::Error),

    /// XML error.
    #[error("{0}")]
    Xml(#[from] truecrowd_xml::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] truecrowd_common::Error),

    /// The input path has no file stem to derive output names from.
    #[error("cannot derive output file names from {0}")]
    InvalidPath(PathBuf),
}

/// Result type for conversions.
pub type Result<T> = std::result::Result<T, Error>;
