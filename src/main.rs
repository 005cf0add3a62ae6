//! TrueCrowd CLI - converts crowd resource databases between XML and binary.
//!
//! This is the main entry point for the `truecrowd` command-line application.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use truecrowd::prelude::*;

/// TrueCrowd - crowd resource database converter
#[derive(Parser)]
#[command(name = "truecrowd")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build XML databases into binary chunk files plus symbol dictionaries
    Scribe {
        /// Input XML files or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,
    },

    /// Convert binary chunk files back to XML
    Convert {
        /// Input binary files or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Symbol dictionaries used to render identifiers
        #[arg(short, long = "qsymbols", env = "TRUECROWD_QSYMBOLS", value_delimiter = ',')]
        qsymbols: Vec<PathBuf>,

        /// Spaces per indentation level
        #[arg(long, default_value_t = 4)]
        indent: usize,
    },

    /// Print the contents summary of a binary chunk file
    Info {
        /// Input binary file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Commands::Scribe { inputs } => cmd_scribe(&inputs)?,
        Commands::Convert {
            inputs,
            qsymbols,
            indent,
        } => cmd_convert(&inputs, &qsymbols, &ExportOptions { indent })?,
        Commands::Info { input } => cmd_info(&input)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("truecrowd={level},truecrowd_db={level}")))
        .context("Invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
    Ok(())
}

fn cmd_scribe(patterns: &[String]) -> Result<()> {
    let inputs = expand_inputs(patterns)?;
    run_batch(&inputs, |input| {
        let scribed = truecrowd::scribe_file(input)?;
        tracing::debug!(
            binary = %scribed.binary.display(),
            symbols = %scribed.symbols.display(),
            warnings = scribed.report.warnings.len(),
            "wrote outputs"
        );
        Ok(())
    })
}

fn cmd_convert(patterns: &[String], dictionaries: &[PathBuf], options: &ExportOptions) -> Result<()> {
    let inputs = expand_inputs(patterns)?;

    let mut shared = SymbolTable::new();
    for path in dictionaries {
        load_dictionary(&mut shared, path);
    }

    run_batch(&inputs, |input| {
        let mut symbols = shared.clone();
        if dictionaries.is_empty() {
            let sibling = truecrowd::symbols_path(input)?;
            if sibling.exists() {
                load_dictionary(&mut symbols, &sibling);
            }
        }
        if symbols.is_empty() {
            tracing::warn!(
                input = %input.display(),
                "no symbol dictionary loaded, identifiers will be written as raw ids"
            );
        }

        let converted = truecrowd::convert_file(input, &symbols, options)?;
        if !converted.unresolved.is_empty() {
            tracing::warn!(
                output = %converted.xml.display(),
                count = converted.unresolved.len(),
                "unresolved symbols listed at the end of the file"
            );
        }
        Ok(())
    })
}

/// Load a dictionary into `symbols`; a failure only costs readable names.
fn load_dictionary(symbols: &mut SymbolTable, path: &Path) {
    match symbols.load(path) {
        Ok(loaded) => tracing::info!(path = %path.display(), loaded, "loaded symbol dictionary"),
        Err(err) => tracing::warn!(
            path = %path.display(),
            "failed to load symbol dictionary, symbols will be shown as raw ids: {err}"
        ),
    }
}

fn cmd_info(input: &Path) -> Result<()> {
    let start = Instant::now();
    let database = CrowdDatabase::open(input)
        .with_context(|| format!("Failed to open {}", input.display()))?;
    let summary = database.summary();

    println!("Loaded {} in {:?}", input.display(), start.elapsed());
    println!("  image size:       {} bytes", summary.image_size);
    println!("  entities:         {}", summary.entities);
    println!("  components:       {}", summary.components);
    println!("  tags:             {}", summary.tags);
    println!("  resources:        {}", summary.resource_entries);
    println!("  LODs:             {}", summary.lods);
    println!("  model parts:      {}", summary.model_parts);
    println!("  texture sets:     {}", summary.texture_sets);
    println!("  colour tints:     {}", summary.colour_tints);
    println!("  override params:  {}", summary.override_params);
    println!("  string bytes:     {}", summary.string_bytes);

    for (index, component) in database.components().iter().enumerate() {
        println!(
            "  [{index:2}] {:<32} {} resources",
            component.name(),
            database.resources_of(index).len()
        );
    }

    Ok(())
}

/// Run `job` for every input, continuing past failures.
fn run_batch<F>(inputs: &[PathBuf], mut job: F) -> Result<()>
where
    F: FnMut(&Path) -> Result<()>,
{
    let start = Instant::now();
    let pb = if inputs.len() > 1 {
        let pb = ProgressBar::new(inputs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut failed = 0usize;
    for input in inputs {
        pb.set_message(input.display().to_string());
        if let Err(err) = job(input) {
            failed += 1;
            pb.suspend(|| tracing::error!(input = %input.display(), "{err:#}"));
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    tracing::info!(
        processed = inputs.len(),
        failed,
        elapsed = ?start.elapsed(),
        "done"
    );
    if failed > 0 {
        anyhow::bail!("{failed} of {} files failed", inputs.len());
    }
    Ok(())
}

/// Expand glob patterns; plain paths are taken as-is.
fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            inputs.push(PathBuf::from(pattern));
            continue;
        }

        let before = inputs.len();
        for entry in glob::glob(pattern).with_context(|| format!("Invalid pattern {pattern}"))? {
            inputs.push(entry.with_context(|| format!("Failed to read match of {pattern}"))?);
        }
        if inputs.len() == before {
            tracing::warn!(pattern = %pattern, "pattern matched no files");
        }
    }

    if inputs.is_empty() {
        anyhow::bail!("No input files");
    }
    Ok(inputs)
}
