//! Helpers shared by the command line tools.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use folio_core::MemoryDocument;
use tracing_subscriber::EnvFilter;

/// Output format for results.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text, one result per line (default)
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Installs the stderr log subscriber.
///
/// `-d` forces debug level; otherwise `RUST_LOG` is honoured, falling back to warnings.
pub fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Opens `outfile` for writing, or stdout for "-".
pub fn open_output(outfile: &str) -> Result<Box<dyn Write>> {
    if outfile == "-" {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    let file = File::create(outfile)
        .with_context(|| format!("failed to create output file {outfile}"))?;
    Ok(Box::new(BufWriter::new(file)))
}

/// Reads a JSON page dump.
pub fn load_document(path: &Path) -> Result<MemoryDocument> {
    MemoryDocument::from_path(path)
        .with_context(|| format!("failed to read page dump {}", path.display()))
}

/// Converts a 1-indexed page number to a page index.
pub fn page_index(page: usize) -> Result<usize> {
    match page.checked_sub(1) {
        Some(index) => Ok(index),
        None => bail!("page numbers start at 1"),
    }
}
