//! boundtext - Extract the text inside a rectangle of a page
//!
//! Reads a JSON page dump and prints the text whose characters fall inside the
//! given rectangle, as individual segments, lines, or one aggregated block.

mod common;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use folio_core::{AggregateParams, DetailLevel, Rect, TextPage};

use common::{OutputFormat, init_logging, load_document, open_output, page_index};

/// Extract the text inside a rectangle of a page.
#[derive(Parser, Debug)]
#[command(name = "boundtext")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a JSON page dump
    file: PathBuf,

    /// Page number (1-indexed)
    #[arg(short = 'p', long, default_value = "1")]
    page: usize,

    /// Query rectangle as LEFT,TOP,RIGHT,BOTTOM in page coordinates
    #[arg(short = 'r', long, value_parser = parse_rect, allow_hyphen_values = true)]
    rect: Rect,

    /// Output shape: segments, line or all
    #[arg(short = 'l', long, default_value = "line", value_parser = parse_detail)]
    detail: DetailLevel,

    /// Output format
    #[arg(short = 't', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Minimum share of a character box (percent) that must lie inside the rectangle
    #[arg(long = "min-overlap", default_value = "50.0")]
    min_overlap: f64,

    /// Line overlap ratio (relative to segment height)
    #[arg(long = "line-overlap", default_value = "0.5")]
    line_overlap: f64,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,
}

/// Parse a rectangle given as four comma-separated numbers.
fn parse_rect(s: &str) -> std::result::Result<Rect, String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid rectangle {s:?}: {e}"))?;
    let &[left, top, right, bottom] = values.as_slice() else {
        return Err(format!(
            "rectangle needs 4 values (LEFT,TOP,RIGHT,BOTTOM), got {}",
            values.len()
        ));
    };
    if top < bottom || right < left {
        return Err(format!(
            "rectangle {s:?} is inverted: need RIGHT >= LEFT and TOP >= BOTTOM"
        ));
    }
    Ok(Rect::new(left, top, right, bottom))
}

fn parse_detail(s: &str) -> std::result::Result<DetailLevel, String> {
    s.parse::<DetailLevel>().map_err(|e| e.to_string())
}

fn run(args: &Args) -> Result<()> {
    let params = AggregateParams::new(
        args.min_overlap,
        args.line_overlap,
        AggregateParams::default().line_separator,
    )?;
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

    let page = TextPage::load(&doc, index)?.with_params(params);
    let items = page
        .bounded_text_info(&args.rect, args.detail)
        .with_context(|| format!("failed to extract text from page {}", args.page))?;

    let mut output = open_output(&args.outfile)?;
    match args.format {
        OutputFormat::Text => {
            for item in &items {
                writeln!(output, "{item}")?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut output, &items)?;
            writeln!(output)?;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rect() {
        assert_eq!(
            parse_rect("0,10.5, 20,-2").unwrap(),
            Rect::new(0.0, 10.5, 20.0, -2.0)
        );
        assert!(parse_rect("1,2,3").is_err());
        assert!(parse_rect("a,b,c,d").is_err());
        assert!(parse_rect("0,0,10,10").is_err());
    }

    #[test]
    fn test_parse_detail() {
        assert_eq!(parse_detail("all").unwrap(), DetailLevel::AggregateAll);
        assert_eq!(parse_detail("segments").unwrap(), DetailLevel::IndividualSegments);
        assert!(parse_detail("paragraph").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "boundtext",
            "dump.json",
            "--rect",
            "0,100,50,0",
            "--detail",
            "all",
            "-t",
            "json",
        ])
        .unwrap();
        assert_eq!(args.page, 1);
        assert_eq!(args.detail, DetailLevel::AggregateAll);
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.rect, Rect::new(0.0, 100.0, 50.0, 0.0));
    }
}
