//! Text search over a page session.

use tracing::debug;

use super::page::TextPage;
use crate::engine::{SearchCursor, SearchFlags, TextPageBackend};
use crate::error::{Result, TextError};
use crate::layout::TextItem;
use crate::utils::Rect;

/// An open search on a [`TextPage`].
///
/// Borrows the page, so the page cannot be closed while a search is open. The
/// engine cursor is released when the search is closed or dropped.
pub struct TextSearch<C: SearchCursor> {
    cursor: Option<C>,
}

impl<C: SearchCursor> TextSearch<C> {
    fn new(cursor: C) -> Self {
        Self {
            cursor: Some(cursor),
        }
    }

    fn cursor(&self) -> Result<&C> {
        self.cursor.as_ref().ok_or(TextError::Disposed("search cursor"))
    }

    /// Advances to the next match. Returns false once matches are exhausted.
    pub fn find_next(&mut self) -> Result<bool> {
        let cursor = self
            .cursor
            .as_mut()
            .ok_or(TextError::Disposed("search cursor"))?;
        Ok(cursor.find_next())
    }

    /// Start of the current match, if any.
    pub fn result_index(&self) -> Result<Option<usize>> {
        Ok(self.cursor()?.result_index())
    }

    /// Length of the current match in characters.
    pub fn result_count(&self) -> Result<usize> {
        Ok(self.cursor()?.result_count())
    }

    pub fn is_closed(&self) -> bool {
        self.cursor.is_none()
    }

    pub fn close(&mut self) {
        self.cursor.take();
    }
}

impl<P: TextPageBackend> TextPage<P> {
    /// Opens a search for `pattern` starting at character `start`.
    pub fn search(
        &self,
        pattern: &str,
        flags: SearchFlags,
        start: usize,
    ) -> Result<TextSearch<P::Cursor<'_>>> {
        let backend = self.backend()?;
        Ok(TextSearch::new(backend.find_start(pattern, flags, start)))
    }

    /// Index of the first match at or after `start`.
    pub fn find(&self, pattern: &str, flags: SearchFlags, start: usize) -> Result<Option<usize>> {
        let mut search = self.search(pattern, flags, start)?;
        if search.find_next()? {
            search.result_index()
        } else {
            Ok(None)
        }
    }

    /// Every match at or after `start`, with its text and character boxes.
    pub fn find_all(&self, pattern: &str, flags: SearchFlags, start: usize) -> Result<Vec<TextItem>> {
        let chars = self.all_char_info()?;
        let mut search = self.search(pattern, flags, start)?;
        let mut matches = Vec::new();

        while search.find_next()? {
            let Some(index) = search.result_index()? else {
                break;
            };
            let count = search.result_count()?;
            let end = index.saturating_add(count).min(chars.len());
            let span = &chars[index.min(end)..end];

            let text: String = span.iter().map(TextItem::text).collect();
            let boxes: Vec<Rect> = span.iter().map(TextItem::bounding_rect).collect();
            matches.push(TextItem::new(
                text,
                Some(index),
                count,
                Rect::union_all(&boxes),
                boxes,
            ));
        }
        search.close();

        debug!(
            page = self.page_index(),
            pattern,
            matches = matches.len(),
            "search finished"
        );
        Ok(matches)
    }
}
