//! High-level text extraction API.
//!
//! One-call helpers that open a page session, run a single operation and release
//! the session before returning, on success and on failure alike:
//! - `with_text_page()` - Run a closure against a scoped page session
//! - `extract_text()` / `extract_document_text()` - Plain page text
//! - `extract_bounded_text()` - Aggregated text inside a rectangle
//! - `find_text()` - All matches of a pattern with geometry

use itertools::Itertools;
use tracing::debug;

use crate::document::TextPage;
use crate::engine::{SearchFlags, TextEngine};
use crate::error::Result;
use crate::layout::{AggregateParams, DetailLevel, TextItem};
use crate::utils::Rect;

/// Separator written between pages by [`extract_document_text`].
pub const PAGE_SEPARATOR: &str = "\x0c";

/// Options for bounded text extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedTextOptions {
    /// Zero-indexed page to read.
    pub page_index: usize,

    /// Output shape of the aggregation.
    pub level: DetailLevel,

    /// Aggregation parameters. None uses the defaults.
    pub params: Option<AggregateParams>,
}

impl Default for BoundedTextOptions {
    fn default() -> Self {
        Self {
            page_index: 0,
            level: DetailLevel::AggregateByLine,
            params: None,
        }
    }
}

/// Opens page `page_index`, passes the session to `f` and releases it afterwards.
///
/// The session is dropped when this function returns, including when `f` fails.
pub fn with_text_page<E, T, F>(engine: &E, page_index: usize, f: F) -> Result<T>
where
    E: TextEngine,
    F: FnOnce(&TextPage<E::Page>) -> Result<T>,
{
    let page = TextPage::load(engine, page_index)?;
    f(&page)
}

/// All text on one page.
pub fn extract_text<E: TextEngine>(engine: &E, page_index: usize) -> Result<String> {
    with_text_page(engine, page_index, |page| page.text())
}

/// Text of every page, pages joined by [`PAGE_SEPARATOR`].
pub fn extract_document_text<E: TextEngine>(engine: &E) -> Result<String> {
    let pages = (0..engine.page_count()).map(|i| extract_text(engine, i));
    itertools::process_results(pages, |mut texts| texts.join(PAGE_SEPARATOR))
}

/// Text inside `query` on the page named by `options`, aggregated at `options.level`.
///
/// # Example
/// ```ignore
/// use folio_core::api::{BoundedTextOptions, extract_bounded_text};
/// use folio_core::{DetailLevel, MemoryDocument, Rect};
///
/// let doc = MemoryDocument::from_path("page.json")?;
/// let options = BoundedTextOptions { level: DetailLevel::AggregateAll, ..Default::default() };
/// let items = extract_bounded_text(&doc, &Rect::new(0.0, 800.0, 600.0, 0.0), &options)?;
/// ```
pub fn extract_bounded_text<E: TextEngine>(
    engine: &E,
    query: &Rect,
    options: &BoundedTextOptions,
) -> Result<Vec<TextItem>> {
    let params = options.params.clone().unwrap_or_default();
    let page = TextPage::load(engine, options.page_index)?.with_params(params);
    let items = page.bounded_text_info(query, options.level)?;
    debug!(
        page = options.page_index,
        level = %options.level,
        items = items.len(),
        "extracted bounded text"
    );
    Ok(items)
}

/// All matches of `pattern` on one page, starting at character `start`.
pub fn find_text<E: TextEngine>(
    engine: &E,
    page_index: usize,
    pattern: &str,
    flags: SearchFlags,
    start: usize,
) -> Result<Vec<TextItem>> {
    with_text_page(engine, page_index, |page| page.find_all(pattern, flags, start))
}
