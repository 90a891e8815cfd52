//! In-memory text engine.
//!
//! Implements the engine contract over character records held in memory, usually
//! deserialized from a JSON page dump:
//!
//! ```json
//! { "pages": [ { "chars": [
//!     { "unicode": 72, "bbox": { "left": 0, "top": 10, "right": 6, "bottom": 0 } }
//! ] } ] }
//! ```
//!
//! Characters are grouped into runs the way a native engine reports them: a run
//! continues while the next character sits on the same line and follows closely
//! to the right. Line-break characters end a run and are not part of any run.

use std::cell::RefCell;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EngineError, SearchCursor, SearchFlags, TextEngine, TextPageBackend, unicode_char};
use crate::error::Result;
use crate::utils::Rect;

/// Minimum vertical overlap between neighbouring characters, relative to the
/// smaller height, for them to share a run.
const RUN_LINE_OVERLAP: f64 = 0.5;

/// Maximum horizontal gap between neighbouring characters of a run, relative to
/// the larger character height.
const RUN_CHAR_MARGIN: f64 = 2.0;

/// One character record of a page dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryChar {
    pub unicode: u32,
    pub bbox: Rect,
    #[serde(default)]
    pub font_size: f64,
}

impl MemoryChar {
    pub fn new(ch: char, bbox: Rect) -> Self {
        Self {
            unicode: ch as u32,
            bbox,
            font_size: 0.0,
        }
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn as_char(&self) -> char {
        unicode_char(self.unicode)
    }

    fn is_line_break(&self) -> bool {
        matches!(self.as_char(), '\r' | '\n')
    }
}

/// Character records of one page, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryPage {
    #[serde(default)]
    pub chars: Vec<MemoryChar>,
}

impl MemoryPage {
    pub fn new(chars: Vec<MemoryChar>) -> Self {
        Self { chars }
    }

    /// Appends a line of text laid out left to right with fixed-width cells.
    ///
    /// Each character gets a box `advance` wide and `height` tall whose bottom edge
    /// sits at `bottom`. Returns `self` for chaining.
    pub fn push_line(
        &mut self,
        text: &str,
        left: f64,
        bottom: f64,
        advance: f64,
        height: f64,
    ) -> &mut Self {
        for (i, ch) in text.chars().enumerate() {
            let x = left + advance * i as f64;
            self.chars.push(
                MemoryChar::new(ch, Rect::new(x, bottom + height, x + advance, bottom))
                    .with_font_size(height),
            );
        }
        self
    }

    /// Appends a generated `\r\n` pair with zero-area boxes after the last character.
    pub fn push_line_break(&mut self) -> &mut Self {
        let anchor = self
            .chars
            .last()
            .map(|c| Rect::point(c.bbox.right, c.bbox.bottom))
            .unwrap_or_default();
        self.chars.push(MemoryChar::new('\r', anchor));
        self.chars.push(MemoryChar::new('\n', anchor));
        self
    }

    pub fn text(&self) -> String {
        self.chars.iter().map(MemoryChar::as_char).collect()
    }
}

/// A document held in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryDocument {
    #[serde(default)]
    pub pages: Vec<MemoryPage>,
}

impl MemoryDocument {
    pub fn new(pages: Vec<MemoryPage>) -> Self {
        Self { pages }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let doc = Self::from_reader(BufReader::new(file))?;
        debug!(
            path = %path.as_ref().display(),
            pages = doc.pages.len(),
            "loaded page dump"
        );
        Ok(doc)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl TextEngine for MemoryDocument {
    type Page = MemoryTextPage;

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn load_text_page(&self, page_index: usize) -> std::result::Result<MemoryTextPage, EngineError> {
        let page = self.pages.get(page_index).ok_or(EngineError::Page)?;
        Ok(MemoryTextPage::new(page.chars.clone()))
    }
}

/// Text handle for one in-memory page.
#[derive(Debug)]
pub struct MemoryTextPage {
    chars: Vec<MemoryChar>,
    /// Result of the last `count_rects` call.
    rects: RefCell<Vec<Rect>>,
}

impl MemoryTextPage {
    /// Wraps character records, normalizing boxes given in the wrong edge order.
    pub fn new(mut chars: Vec<MemoryChar>) -> Self {
        for ch in &mut chars {
            ch.bbox = ch.bbox.normalized();
        }
        Self {
            chars,
            rects: RefCell::new(Vec::new()),
        }
    }

    fn runs(&self, start: usize, count: usize) -> Vec<Rect> {
        let end = start.saturating_add(count).min(self.chars.len());
        let start = start.min(end);

        let mut runs = Vec::new();
        // (run so far, box of its last character)
        let mut current: Option<(Rect, Rect)> = None;

        for ch in &self.chars[start..end] {
            if ch.is_line_break() {
                if let Some((run, _)) = current.take() {
                    runs.push(run);
                }
                continue;
            }
            current = match current {
                Some((run, last)) if continues_run(&last, &ch.bbox) => {
                    Some((run.union(&ch.bbox), ch.bbox))
                }
                Some((run, _)) => {
                    runs.push(run);
                    Some((ch.bbox, ch.bbox))
                }
                None => Some((ch.bbox, ch.bbox)),
            };
        }
        if let Some((run, _)) = current {
            runs.push(run);
        }
        runs
    }
}

fn continues_run(prev: &Rect, next: &Rect) -> bool {
    let overlap = prev.top.min(next.top) - prev.bottom.max(next.bottom);
    let min_height = prev.height().min(next.height());
    let same_line = if min_height > 0.0 {
        overlap / min_height >= RUN_LINE_OVERLAP
    } else {
        overlap >= 0.0
    };
    if !same_line || next.left < prev.left {
        return false;
    }
    let gap = next.left - prev.right;
    gap <= RUN_CHAR_MARGIN * prev.height().max(next.height())
}

impl TextPageBackend for MemoryTextPage {
    type Cursor<'a> = MemoryCursor<'a>;

    fn count_chars(&self) -> usize {
        self.chars.len()
    }

    fn unicode(&self, index: usize) -> u32 {
        self.chars[index].unicode
    }

    fn char_box(&self, index: usize) -> Rect {
        self.chars[index].bbox
    }

    fn font_size(&self, index: usize) -> f64 {
        self.chars[index].font_size
    }

    fn count_rects(&self, start: usize, count: usize) -> usize {
        let runs = self.runs(start, count);
        let n = runs.len();
        *self.rects.borrow_mut() = runs;
        n
    }

    fn rect(&self, rect_index: usize) -> Option<Rect> {
        self.rects.borrow().get(rect_index).copied()
    }

    fn find_start(&self, pattern: &str, flags: SearchFlags, start: usize) -> MemoryCursor<'_> {
        MemoryCursor::new(&self.chars, pattern, flags, start)
    }
}

/// Search cursor over an in-memory page.
#[derive(Debug)]
pub struct MemoryCursor<'a> {
    chars: &'a [MemoryChar],
    pattern: Vec<char>,
    flags: SearchFlags,
    next_start: usize,
    /// (start, length) of the current match
    current: Option<(usize, usize)>,
}

impl<'a> MemoryCursor<'a> {
    fn new(chars: &'a [MemoryChar], pattern: &str, flags: SearchFlags, start: usize) -> Self {
        Self {
            chars,
            pattern: pattern.chars().collect(),
            flags,
            next_start: start,
            current: None,
        }
    }

    fn char_matches(&self, text: char, pattern: char) -> bool {
        text == pattern || (!self.flags.match_case && text.to_lowercase().eq(pattern.to_lowercase()))
    }

    fn is_word_char(&self, index: usize) -> bool {
        self.chars
            .get(index)
            .is_some_and(|c| c.as_char().is_alphanumeric())
    }

    fn matches_at(&self, start: usize) -> bool {
        let window = &self.chars[start..start + self.pattern.len()];
        let text_matches = window
            .iter()
            .zip(&self.pattern)
            .all(|(c, &p)| self.char_matches(c.as_char(), p));
        if !text_matches {
            return false;
        }
        if self.flags.match_whole_word {
            let before = start > 0 && self.is_word_char(start - 1);
            let after = self.is_word_char(start + self.pattern.len());
            return !before && !after;
        }
        true
    }
}

impl SearchCursor for MemoryCursor<'_> {
    fn find_next(&mut self) -> bool {
        let plen = self.pattern.len();
        if plen == 0 || plen > self.chars.len() {
            self.current = None;
            return false;
        }
        let last_start = self.chars.len() - plen;
        let mut i = self.next_start;
        while i <= last_start {
            if self.matches_at(i) {
                self.current = Some((i, plen));
                self.next_start = if self.flags.consecutive { i + 1 } else { i + plen };
                return true;
            }
            i += 1;
        }
        self.next_start = self.chars.len();
        self.current = None;
        false
    }

    fn result_index(&self) -> Option<usize> {
        self.current.map(|(start, _)| start)
    }

    fn result_count(&self) -> usize {
        self.current.map_or(0, |(_, len)| len)
    }
}
