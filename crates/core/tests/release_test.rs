//! Tests that engine pages and search cursors are released as soon as their owner goes away.

use std::cell::Cell;
use std::rc::Rc;

use folio_core::api::{find_text, with_text_page};
use folio_core::engine::{MemoryPage, MemoryTextPage};
use folio_core::{
    EngineError, Rect, SearchCursor, SearchFlags, TextEngine, TextError, TextPage,
    TextPageBackend,
};

// ============================================================================
// Test engine
// ============================================================================

#[derive(Default)]
struct Releases {
    pages: Rc<Cell<usize>>,
    cursors: Rc<Cell<usize>>,
}

impl Releases {
    fn pages(&self) -> usize {
        self.pages.get()
    }

    fn cursors(&self) -> usize {
        self.cursors.get()
    }
}

/// One-page engine over "abc abc" whose pages and cursors count their drops.
struct CountingEngine {
    page: MemoryPage,
    releases: Releases,
}

impl CountingEngine {
    fn new() -> Self {
        let mut page = MemoryPage::default();
        page.push_line("abc abc", 0.0, 0.0, 10.0, 10.0);
        Self {
            page,
            releases: Releases::default(),
        }
    }
}

impl TextEngine for CountingEngine {
    type Page = CountingPage;

    fn page_count(&self) -> usize {
        1
    }

    fn load_text_page(&self, page_index: usize) -> Result<CountingPage, EngineError> {
        if page_index != 0 {
            return Err(EngineError::Page);
        }
        Ok(CountingPage {
            inner: MemoryTextPage::new(self.page.chars.clone()),
            text: self.page.chars.iter().filter_map(|c| char::from_u32(c.unicode)).collect(),
            dropped: Rc::clone(&self.releases.pages),
            cursor_dropped: Rc::clone(&self.releases.cursors),
        })
    }
}

struct CountingPage {
    inner: MemoryTextPage,
    text: Vec<char>,
    dropped: Rc<Cell<usize>>,
    cursor_dropped: Rc<Cell<usize>>,
}

impl Drop for CountingPage {
    fn drop(&mut self) {
        self.dropped.set(self.dropped.get() + 1);
    }
}

impl TextPageBackend for CountingPage {
    type Cursor<'a> = CountingCursor;

    fn count_chars(&self) -> usize {
        self.inner.count_chars()
    }

    fn unicode(&self, index: usize) -> u32 {
        self.inner.unicode(index)
    }

    fn char_box(&self, index: usize) -> Rect {
        self.inner.char_box(index)
    }

    fn count_rects(&self, start: usize, count: usize) -> usize {
        self.inner.count_rects(start, count)
    }

    fn rect(&self, rect_index: usize) -> Option<Rect> {
        self.inner.rect(rect_index)
    }

    fn find_start(&self, pattern: &str, _flags: SearchFlags, start: usize) -> CountingCursor {
        let needle: Vec<char> = pattern.chars().collect();
        let hits = if needle.is_empty() {
            Vec::new()
        } else {
            self.text
                .windows(needle.len())
                .enumerate()
                .skip(start)
                .filter(|(_, window)| *window == needle.as_slice())
                .map(|(i, _)| i)
                .collect()
        };
        CountingCursor {
            hits,
            position: None,
            len: needle.len(),
            dropped: Rc::clone(&self.cursor_dropped),
        }
    }
}

struct CountingCursor {
    hits: Vec<usize>,
    position: Option<usize>,
    len: usize,
    dropped: Rc<Cell<usize>>,
}

impl Drop for CountingCursor {
    fn drop(&mut self) {
        self.dropped.set(self.dropped.get() + 1);
    }
}

impl SearchCursor for CountingCursor {
    fn find_next(&mut self) -> bool {
        let next = self.position.map_or(0, |p| p + 1);
        self.position = Some(next);
        next < self.hits.len()
    }

    fn result_index(&self) -> Option<usize> {
        self.position.and_then(|p| self.hits.get(p).copied())
    }

    fn result_count(&self) -> usize {
        if self.result_index().is_some() { self.len } else { 0 }
    }
}

// ============================================================================
// Search cursors
// ============================================================================

#[test]
fn test_find_releases_its_cursor() {
    let engine = CountingEngine::new();
    let page = TextPage::load(&engine, 0).unwrap();

    assert_eq!(page.find("abc", SearchFlags::default(), 1).unwrap(), Some(4));
    assert_eq!(engine.releases.cursors(), 1);

    assert_eq!(page.find("xyz", SearchFlags::default(), 0).unwrap(), None);
    assert_eq!(engine.releases.cursors(), 2);
    assert_eq!(engine.releases.pages(), 0);
}

#[test]
fn test_find_all_releases_its_cursor() {
    let engine = CountingEngine::new();
    let page = TextPage::load(&engine, 0).unwrap();

    let matches = page.find_all("abc", SearchFlags::default(), 0).unwrap();
    let starts: Vec<_> = matches.iter().map(|m| m.start_index()).collect();
    assert_eq!(starts, vec![Some(0), Some(4)]);
    assert_eq!(engine.releases.cursors(), 1);
    assert_eq!(engine.releases.pages(), 0);
}

#[test]
fn test_abandoned_search_releases_cursor_on_drop() {
    let engine = CountingEngine::new();
    let page = TextPage::load(&engine, 0).unwrap();

    let mut search = page.search("abc", SearchFlags::default(), 0).unwrap();
    assert!(search.find_next().unwrap());
    assert_eq!(engine.releases.cursors(), 0);

    drop(search);
    assert_eq!(engine.releases.cursors(), 1);
}

#[test]
fn test_closed_search_is_released_once() {
    let engine = CountingEngine::new();
    let page = TextPage::load(&engine, 0).unwrap();

    let mut search = page.search("abc", SearchFlags::default(), 0).unwrap();
    search.close();
    assert_eq!(engine.releases.cursors(), 1);
    search.close();
    drop(search);
    assert_eq!(engine.releases.cursors(), 1);
}

// ============================================================================
// Pages
// ============================================================================

#[test]
fn test_session_releases_page_on_close_and_drop() {
    let engine = CountingEngine::new();

    let mut page = TextPage::load(&engine, 0).unwrap();
    page.close();
    assert_eq!(engine.releases.pages(), 1);
    drop(page);
    assert_eq!(engine.releases.pages(), 1);

    let page = TextPage::load(&engine, 0).unwrap();
    assert_eq!(engine.releases.pages(), 1);
    drop(page);
    assert_eq!(engine.releases.pages(), 2);
}

#[test]
fn test_with_text_page_releases_page_when_closure_fails() {
    let engine = CountingEngine::new();

    let err = with_text_page(&engine, 0, |page| {
        let mut search = page.search("abc", SearchFlags::default(), 0)?;
        search.find_next()?;
        page.char_at(99)
    })
    .unwrap_err();

    assert!(matches!(err, TextError::IndexOutOfRange { index: 99, .. }));
    assert_eq!(engine.releases.cursors(), 1);
    assert_eq!(engine.releases.pages(), 1);
}

#[test]
fn test_high_level_search_releases_everything() {
    let engine = CountingEngine::new();

    let found = find_text(&engine, 0, "abc", SearchFlags::default(), 0).unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(engine.releases.cursors(), 1);
    assert_eq!(engine.releases.pages(), 1);

    assert!(find_text(&engine, 3, "abc", SearchFlags::default(), 0).is_err());
    assert_eq!(engine.releases.pages(), 1);
}
