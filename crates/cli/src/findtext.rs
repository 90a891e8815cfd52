//! findtext - Search a page for a pattern
//!
//! Reads a JSON page dump and prints every match of a pattern with its character
//! range and bounding rectangle.

mod common;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use folio_core::{SearchFlags, TextItem, TextPage};
use serde::Serialize;

use common::{OutputFormat, init_logging, load_document, open_output, page_index};

/// Search a page for a pattern.
#[derive(Parser, Debug)]
#[command(name = "findtext")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a JSON page dump
    file: PathBuf,

    /// Text to search for
    pattern: String,

    /// Page number (1-indexed)
    #[arg(short = 'p', long, default_value = "1")]
    page: usize,

    /// Character index to start searching from
    #[arg(short = 's', long, default_value = "0")]
    start: usize,

    /// Compare case-sensitively
    #[arg(short = 'c', long = "match-case", action = ArgAction::SetTrue)]
    match_case: bool,

    /// Only report matches bounded by non-alphanumeric characters
    #[arg(short = 'w', long = "whole-word", action = ArgAction::SetTrue)]
    whole_word: bool,

    /// Allow overlapping matches
    #[arg(long, action = ArgAction::SetTrue)]
    consecutive: bool,

    /// Only report the index of the first match
    #[arg(long, action = ArgAction::SetTrue)]
    first: bool,

    /// Output format
    #[arg(short = 't', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,
}

impl Args {
    fn flags(&self) -> SearchFlags {
        SearchFlags {
            match_case: self.match_case,
            match_whole_word: self.whole_word,
            consecutive: self.consecutive,
        }
    }
}

#[derive(Serialize)]
struct FirstMatch {
    index: Option<usize>,
}

/// One tab-separated line: start, length, text, then the bounding rectangle.
fn format_match(item: &TextItem) -> String {
    let bbox = item.bounding_rect();
    format!(
        "{}\t{}\t{}\t{},{},{},{}",
        item.start_index().map_or_else(|| "-".to_string(), |i| i.to_string()),
        item.length(),
        item.text(),
        bbox.left,
        bbox.top,
        bbox.right,
        bbox.bottom
    )
}

fn run(args: &Args) -> Result<()> {
    let doc = load_document(&args.file)?;
    let index = page_index(args.page)?;
    if index >= doc.pages.len() {
        bail!(
            "page {} not found ({} has {} pages)",
            args.page,
            args.file.display(),
            doc.pages.len()
        );
    }
    let page = TextPage::load(&doc, index)?;
    let mut output = open_output(&args.outfile)?;

    if args.first {
        let found = page
            .find(&args.pattern, args.flags(), args.start)
            .with_context(|| format!("search failed on page {}", args.page))?;
        match args.format {
            OutputFormat::Text => match found {
                Some(i) => writeln!(output, "{i}")?,
                None => writeln!(output, "not found")?,
            },
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut output, &FirstMatch { index: found })?;
                writeln!(output)?;
            }
        }
    } else {
        let matches = page
            .find_all(&args.pattern, args.flags(), args.start)
            .with_context(|| format!("search failed on page {}", args.page))?;
        match args.format {
            OutputFormat::Text => {
                for item in &matches {
                    writeln!(output, "{}", format_match(item))?;
                }
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut output, &matches)?;
                writeln!(output)?;
            }
        }
    }

    output.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);
    run(&args)
}
