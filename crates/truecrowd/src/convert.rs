//! File-level conversions between XML and chunk files.
//!
//! Output files are written next to their input: `crowd.xml` scribes to
//! `crowd.bin` plus the dictionary `crowd_qsymbols.txt`, and `crowd.bin`
//! converts to `crowd.xml`. Nothing is written when a build fails.

use std::path::{Path, PathBuf};

use truecrowd_common::SymbolTable;
use truecrowd_db::{build, BuildReport, CrowdDatabase, ExportOptions, Summary};
use truecrowd_xml::XmlDocument;

use crate::{Error, Result};

/// Suffix appended to the file stem of a symbol dictionary.
pub const SYMBOLS_SUFFIX: &str = "_qsymbols.txt";

/// Files written by [`scribe_file`].
#[derive(Debug, Clone)]
pub struct Scribed {
    pub binary: PathBuf,
    pub symbols: PathBuf,
    pub report: BuildReport,
    pub summary: Summary,
}

/// File written by [`convert_file`].
#[derive(Debug, Clone)]
pub struct Converted {
    pub xml: PathBuf,
    /// Ids that had no spelling in the dictionary.
    pub unresolved: Vec<u32>,
}

/// Dictionary path that belongs to `path`.
pub fn symbols_path(path: &Path) -> Result<PathBuf> {
    let stem = path
        .file_stem()
        .ok_or_else(|| Error::InvalidPath(path.to_path_buf()))?;
    let mut name = stem.to_os_string();
    name.push(SYMBOLS_SUFFIX);
    Ok(path.with_file_name(name))
}

/// Build `input` (XML) and write the chunk file and its symbol dictionary.
pub fn scribe_file<P: AsRef<Path>>(input: P) -> Result<Scribed> {
    let input = input.as_ref();
    let document = XmlDocument::open(input)?;
    let built = build(&document)?;

    let binary = input.with_extension("bin");
    let symbols = symbols_path(input)?;
    let chunk = built.database.to_chunk_file()?;
    built.symbols.save(&symbols)?;
    if let Err(err) = std::fs::write(&binary, &chunk) {
        // Leave no dictionary without its database.
        let _ = std::fs::remove_file(&symbols);
        return Err(err.into());
    }

    tracing::info!(
        input = %input.display(),
        output = %binary.display(),
        symbols = built.symbols.len(),
        "scribed crowd database"
    );

    Ok(Scribed {
        binary,
        symbols,
        summary: built.database.summary(),
        report: built.report,
    })
}

/// Read `input` (chunk file) and write it as XML.
pub fn convert_file<P: AsRef<Path>>(
    input: P,
    symbols: &SymbolTable,
    options: &ExportOptions,
) -> Result<Converted> {
    let input = input.as_ref();
    let database = CrowdDatabase::open(input)?;
    let export = database.to_xml(symbols);

    let xml = input.with_extension("xml");
    export.save(&xml, options)?;

    tracing::info!(
        input = %input.display(),
        output = %xml.display(),
        unresolved = export.unresolved.len(),
        "converted crowd database"
    );

    Ok(Converted {
        xml,
        unresolved: export.unresolved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CROWD: &str = r#"<TrueCrowdDataBase>
    <Definition>
        <Entity name="Ped"><EntityComponent name="Body" required="1"/></Entity>
        <Tags><Tag>Civilian</Tag></Tags>
    </Definition>
    <ComponentEntries>
        <Component name="Body">
            <Resource name="Ped_A" type="0"><Tag>Civilian</Tag></Resource>
        </Component>
    </ComponentEntries>
</TrueCrowdDataBase>
"#;

    #[test]
    fn test_symbols_path() {
        let path = symbols_path(Path::new("data/crowd.xml")).unwrap();
        assert_eq!(path, Path::new("data/crowd_qsymbols.txt"));
    }

    #[test]
    fn test_scribe_then_convert() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("crowd.xml");
        std::fs::write(&input, CROWD).unwrap();

        let scribed = scribe_file(&input).unwrap();
        assert!(scribed.binary.exists());
        assert_eq!(scribed.summary.resource_entries, 1);
        assert!(scribed.report.warnings.is_empty());

        let mut symbols = SymbolTable::new();
        symbols.load(&scribed.symbols).unwrap();
        std::fs::remove_file(&input).unwrap();

        let converted = convert_file(&scribed.binary, &symbols, &ExportOptions::default()).unwrap();
        assert!(converted.unresolved.is_empty());
        assert_eq!(converted.xml, input);

        let text = std::fs::read_to_string(&input).unwrap();
        assert!(text.contains(r#"<Resource name="Ped_A" type="0">"#));
        assert!(text.contains("<Tag>Civilian</Tag>"));
    }

    #[test]
    fn test_failed_write_removes_dictionary() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("crowd.xml");
        std::fs::write(&input, CROWD).unwrap();
        // A directory in place of the output file makes the chunk write fail.
        std::fs::create_dir(dir.path().join("crowd.bin")).unwrap();

        assert!(matches!(scribe_file(&input), Err(Error::Io(_))));
        assert!(!dir.path().join("crowd_qsymbols.txt").exists());
    }

    #[test]
    fn test_failed_build_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.xml");
        std::fs::write(&input, "<TrueCrowdDataBase><Definition/></TrueCrowdDataBase>").unwrap();

        assert!(scribe_file(&input).is_err());
        assert!(!dir.path().join("broken.bin").exists());
        assert!(!dir.path().join("broken_qsymbols.txt").exists());
    }
}
