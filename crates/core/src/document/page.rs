//! Text page session.
//!
//! A [`TextPage`] owns one engine text handle and the lazily computed character
//! info for that page. Dropping the session or calling [`TextPage::close`]
//! releases the handle; any later call returns [`TextError::Disposed`].
//!
//! The session is single-threaded. The character cache is filled at most once
//! unless [`TextPage::refresh_char_info`] is called, and refreshing needs
//! exclusive access.

use once_cell::unsync::OnceCell;
use tracing::{debug, trace};

use crate::engine::{TextEngine, TextPageBackend, unicode_char};
use crate::error::{Result, TextError};
use crate::layout::{AggregateParams, DetailLevel, TextItem, aggregate_bounded_text};
use crate::utils::{CharIndex, Rect};

/// Per-character items of a page plus a spatial index over their boxes.
struct PageChars {
    items: Vec<TextItem>,
    index: CharIndex,
}

/// Text session for a single page.
pub struct TextPage<P: TextPageBackend> {
    backend: Option<P>,
    page_index: usize,
    params: AggregateParams,
    chars: OnceCell<PageChars>,
}

impl<P: TextPageBackend> TextPage<P> {
    /// Acquires the text handle of `page_index` from `engine`.
    ///
    /// Engine failures are returned as is and no session is created.
    pub fn load<E>(engine: &E, page_index: usize) -> Result<Self>
    where
        E: TextEngine<Page = P>,
    {
        let backend = engine.load_text_page(page_index)?;
        debug!(page = page_index, "acquired text page");
        Ok(Self::from_backend(backend, page_index))
    }

    /// Wraps an already acquired engine handle.
    pub fn from_backend(backend: P, page_index: usize) -> Self {
        Self {
            backend: Some(backend),
            page_index,
            params: AggregateParams::default(),
            chars: OnceCell::new(),
        }
    }

    pub fn with_params(mut self, params: AggregateParams) -> Self {
        self.params = params;
        self
    }

    pub fn set_params(&mut self, params: AggregateParams) {
        self.params = params;
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn is_closed(&self) -> bool {
        self.backend.is_none()
    }

    /// Releases the engine handle and drops the character cache.
    /// Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.backend.take().is_some() {
            self.chars.take();
            debug!(page = self.page_index, "released text page");
        }
    }

    pub(crate) fn backend(&self) -> Result<&P> {
        self.backend.as_ref().ok_or(TextError::Disposed("text page"))
    }

    fn check_index(&self, index: usize) -> Result<&P> {
        let backend = self.backend()?;
        let count = backend.count_chars();
        if index >= count {
            return Err(TextError::IndexOutOfRange { index, count });
        }
        Ok(backend)
    }

    pub fn count_chars(&self) -> Result<usize> {
        Ok(self.backend()?.count_chars())
    }

    pub fn char_at(&self, index: usize) -> Result<char> {
        let backend = self.check_index(index)?;
        Ok(unicode_char(backend.unicode(index)))
    }

    pub fn char_box(&self, index: usize) -> Result<Rect> {
        Ok(self.check_index(index)?.char_box(index))
    }

    pub fn font_size(&self, index: usize) -> Result<f64> {
        Ok(self.check_index(index)?.font_size(index))
    }

    /// All text on the page.
    pub fn text(&self) -> Result<String> {
        let count = self.count_chars()?;
        self.text_range(0, count)
    }

    /// Text of up to `count` characters starting at `start`.
    ///
    /// `count` is clamped to the end of the page; a `start` past the end is an error.
    pub fn text_range(&self, start: usize, count: usize) -> Result<String> {
        let backend = self.backend()?;
        let total = backend.count_chars();
        if start > total {
            return Err(TextError::IndexOutOfRange {
                index: start,
                count: total,
            });
        }
        let end = start.saturating_add(count).min(total);
        Ok((start..end).map(|i| unicode_char(backend.unicode(i))).collect())
    }

    fn page_chars(&self) -> Result<&PageChars> {
        let backend = self.backend()?;
        self.chars.get_or_try_init(|| {
            let count = backend.count_chars();
            let items: Vec<TextItem> = (0..count)
                .map(|i| TextItem::for_char(unicode_char(backend.unicode(i)), i, backend.char_box(i)))
                .collect();
            let index = CharIndex::new(&items);
            debug!(page = self.page_index, chars = count, "loaded character info");
            Ok(PageChars { items, index })
        })
    }

    /// One single-character item per page character, in document order.
    ///
    /// Computed on first use and cached for the lifetime of the session.
    pub fn all_char_info(&self) -> Result<&[TextItem]> {
        Ok(&self.page_chars()?.items)
    }

    /// Discards the cached character info and recomputes it.
    pub fn refresh_char_info(&mut self) -> Result<&[TextItem]> {
        self.backend()?;
        self.chars.take();
        trace!(page = self.page_index, "character info invalidated");
        self.all_char_info()
    }

    /// Run rectangles reported by the engine for `count` characters from `start`.
    pub fn run_rects(&self, start: usize, count: usize) -> Result<Vec<Rect>> {
        let backend = self.backend()?;
        let n = backend.count_rects(start, count);
        Ok((0..n).filter_map(|i| backend.rect(i)).collect())
    }

    /// Run rectangles for the whole page.
    pub fn all_rects(&self) -> Result<Vec<Rect>> {
        let count = self.count_chars()?;
        self.run_rects(0, count)
    }

    /// Union of the boxes of `count` characters from `start`, plus the boxes.
    pub fn rect_for_range(&self, start: usize, count: usize) -> Result<(Rect, Vec<Rect>)> {
        let chars = self.all_char_info()?;
        if start > chars.len() {
            return Err(TextError::IndexOutOfRange {
                index: start,
                count: chars.len(),
            });
        }
        let end = start.saturating_add(count).min(chars.len());
        let boxes: Vec<Rect> = chars[start..end].iter().map(TextItem::bounding_rect).collect();
        Ok((Rect::union_all(&boxes), boxes))
    }

    /// Index of the character at page position (`x`, `y`).
    ///
    /// A character whose box contains the point wins. Otherwise the nearest
    /// character whose box, grown by the tolerances, contains the point is used.
    pub fn char_index_at_pos(
        &self,
        x: f64,
        y: f64,
        x_tolerance: f64,
        y_tolerance: f64,
    ) -> Result<Option<usize>> {
        let chars = self.all_char_info()?;
        if let Some(hit) = chars
            .iter()
            .position(|c| !c.bounding_rect().is_empty() && c.bounding_rect().contains_point(x, y))
        {
            return Ok(Some(hit));
        }

        let distance = |r: &Rect| {
            let cx = (r.left + r.right) / 2.0;
            let cy = (r.top + r.bottom) / 2.0;
            (cx - x).powi(2) + (cy - y).powi(2)
        };
        let nearest = chars
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                c.bounding_rect()
                    .expand(x_tolerance, y_tolerance)
                    .contains_point(x, y)
            })
            .min_by(|(_, a), (_, b)| {
                distance(&a.bounding_rect()).total_cmp(&distance(&b.bounding_rect()))
            })
            .map(|(i, _)| i);
        Ok(nearest)
    }

    /// Plain text of the characters whose boxes intersect `query`, in document order.
    pub fn bounded_text(&self, query: &Rect) -> Result<String> {
        let chars = self.all_char_info()?;
        Ok(chars
            .iter()
            .filter(|c| c.bounding_rect().intersects(query))
            .map(TextItem::text)
            .collect())
    }

    /// Text inside `query` aggregated at `level`.
    ///
    /// Returns an empty vector when nothing is selected.
    pub fn bounded_text_info(&self, query: &Rect, level: DetailLevel) -> Result<Vec<TextItem>> {
        let runs = self.all_rects()?;
        let chars = self.page_chars()?;
        Ok(aggregate_bounded_text(
            &runs,
            &chars.items,
            &chars.index,
            query,
            level,
            &self.params,
        ))
    }
}

impl<P: TextPageBackend> Drop for TextPage<P> {
    fn drop(&mut self) {
        self.close();
    }
}
