//! Symbol interning and symbol dictionaries.
//!
//! Identifiers in a crowd database are stored as 32-bit symbol hashes. A
//! [`SymbolTable`] mints those ids from readable names while remembering the
//! spelling, so a later export can render them back. Dictionaries are plain text,
//! one `0xXXXXXXXX spelling` line per symbol.

use std::hash::BuildHasherDefault;
use std::io::{BufRead, Write};
use std::path::Path;

use hashbrown::HashMap as FastHashMap;
use rustc_hash::FxHasher;

use crate::hash::{hash32, hash_upper32};
use crate::{Error, Result};

type FxHashMap<K, V> = FastHashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Prefix marking an identifier that is already a raw hexadecimal id.
pub const ESCAPE_MARKER: char = '~';

/// Which hash variant an identifier is minted with.
///
/// Two identifiers are equal only if both spelling and case mode agree, so every
/// field kind must always use the same mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseMode {
    /// Hash the bytes as written.
    Sensitive,
    /// Fold ASCII letters to upper case before hashing.
    Upper,
}

impl CaseMode {
    /// Hash `text` with this case mode.
    #[inline]
    pub fn hash(self, text: &str) -> u32 {
        match self {
            Self::Sensitive => hash32(text),
            Self::Upper => hash_upper32(text),
        }
    }
}

/// Interns identifier strings into 32-bit ids and resolves them back.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    names: FxHashMap<u32, String>,
}

impl SymbolTable {
    /// Create an empty symbol table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text` and return its id.
    ///
    /// The first spelling of an id wins, except that a case-sensitive intern
    /// replaces a spelling that only matches the id once upper-cased.
    ///
    /// Text starting with [`ESCAPE_MARKER`] is an explicit raw id (`~1A2B3C4D`,
    /// `~0x1A2B3C4D~`) and is returned without being recorded.
    pub fn intern(&mut self, text: &str, case: CaseMode) -> u32 {
        if let Some(raw) = text.strip_prefix(ESCAPE_MARKER) {
            return parse_escaped(raw);
        }

        let id = case.hash(text);
        let stored = self.names.entry(id).or_insert_with(|| text.to_string());
        // A spelling kept for a case-sensitive id must hash to it unfolded.
        if case == CaseMode::Sensitive && hash32(stored) != id {
            *stored = text.to_string();
        }
        id
    }

    /// Record a known spelling for `id` (used when loading dictionaries).
    ///
    /// Existing spellings are kept.
    pub fn insert(&mut self, id: u32, text: impl Into<String>) {
        self.names.entry(id).or_insert_with(|| text.into());
    }

    /// Look up the spelling of `id`.
    pub fn lookup(&self, id: u32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Number of known symbols.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the table knows no symbols.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All symbols sorted by id.
    pub fn sorted(&self) -> Vec<(u32, &str)> {
        let mut entries: Vec<_> = self
            .names
            .iter()
            .map(|(&id, name)| (id, name.as_str()))
            .collect();
        entries.sort_unstable_by_key(|&(id, _)| id);
        entries
    }

    /// Write the table as a dictionary, sorted by id.
    pub fn write_dictionary<W: Write>(&self, writer: &mut W) -> Result<()> {
        for (id, name) in self.sorted() {
            writeln!(writer, "0x{:08X} {}", id, name)?;
        }
        Ok(())
    }

    /// Save the table as a dictionary file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        self.write_dictionary(&mut file)?;
        file.flush()?;
        Ok(())
    }

    /// Read dictionary lines into this table, returning how many lines were loaded.
    pub fn read_dictionary<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        let mut loaded = 0;
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim_end_matches(['\r', '\n']);
            if trimmed.trim().is_empty() {
                continue;
            }

            let malformed = || Error::MalformedDictionary {
                line: index + 1,
                text: trimmed.to_string(),
            };

            let (id, name) = trimmed.split_once(' ').ok_or_else(malformed)?;
            let digits = id
                .strip_prefix("0x")
                .or_else(|| id.strip_prefix("0X"))
                .unwrap_or(id);
            let id = u32::from_str_radix(digits, 16).map_err(|_| malformed())?;

            self.insert(id, name);
            loaded += 1;
        }

        tracing::debug!(loaded, "read symbol dictionary");
        Ok(loaded)
    }

    /// Load a dictionary file into this table.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let file = std::fs::File::open(path)?;
        self.read_dictionary(std::io::BufReader::new(file))
    }
}

/// Parse the body of an escaped id.
///
/// Reads the longest run of leading hex digits (after an optional `0x`), so a
/// trailing `~` is ignored; an empty run yields 0 and overflow saturates.
fn parse_escaped(raw: &str) -> u32 {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);

    let mut value: u64 = 0;
    for c in digits.chars() {
        let Some(digit) = c.to_digit(16) else {
            break;
        };
        value = (value << 4) | u64::from(digit);
        if value > u64::from(u32::MAX) {
            return u32::MAX;
        }
    }
    value as u32
}
