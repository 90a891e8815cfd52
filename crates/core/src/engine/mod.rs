//! Text engine contract.
//!
//! The native extraction engine is an external collaborator. These traits describe
//! what the session layer needs from it:
//!
//! - [`TextEngine`]: a loaded document that hands out text pages
//! - [`TextPageBackend`]: one page's character stream, run rectangles and search
//! - [`SearchCursor`]: an incremental search over a page
//!
//! Handles are released by `Drop`. The session layer never calls an explicit
//! close on the backend, so every exit path releases the handle.
//!
//! [`memory`] provides a pure-Rust implementation over character records.

pub mod memory;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::Rect;

pub use memory::{MemoryChar, MemoryCursor, MemoryDocument, MemoryPage, MemoryTextPage};

/// Converts an engine codepoint to a `char`, substituting U+FFFD for invalid values.
pub fn unicode_char(codepoint: u32) -> char {
    char::from_u32(codepoint).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Failure statuses reported by the engine.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineError {
    #[error("unknown error")]
    Unknown,
    #[error("file not found or could not be opened")]
    File,
    #[error("file not in PDF format or corrupted")]
    Format,
    #[error("password required or incorrect password")]
    Password,
    #[error("unsupported security scheme")]
    Security,
    #[error("page not found or content error")]
    Page,
}

/// Search options understood by the engine's search cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct SearchFlags {
    /// Compare characters case-sensitively.
    pub match_case: bool,
    /// Only report matches bounded by non-alphanumeric characters.
    pub match_whole_word: bool,
    /// Resume one character after the previous match start, allowing overlaps.
    pub consecutive: bool,
}

impl SearchFlags {
    pub const MATCH_CASE: u32 = 0x1;
    pub const MATCH_WHOLE_WORD: u32 = 0x2;
    pub const CONSECUTIVE: u32 = 0x4;

    /// Builds flags from the engine bit mask. Unknown bits are ignored.
    pub const fn from_bits(bits: u32) -> Self {
        Self {
            match_case: bits & Self::MATCH_CASE != 0,
            match_whole_word: bits & Self::MATCH_WHOLE_WORD != 0,
            consecutive: bits & Self::CONSECUTIVE != 0,
        }
    }

    pub const fn bits(&self) -> u32 {
        let mut bits = 0;
        if self.match_case {
            bits |= Self::MATCH_CASE;
        }
        if self.match_whole_word {
            bits |= Self::MATCH_WHOLE_WORD;
        }
        if self.consecutive {
            bits |= Self::CONSECUTIVE;
        }
        bits
    }
}

/// A loaded document able to open text pages.
pub trait TextEngine {
    type Page: TextPageBackend;

    fn page_count(&self) -> usize;

    /// Acquires the text handle for one page.
    fn load_text_page(&self, page_index: usize) -> Result<Self::Page, EngineError>;
}

/// Character stream of one page.
///
/// Index arguments are validated by the session layer, so implementations may
/// assume `index < count_chars()`.
pub trait TextPageBackend {
    type Cursor<'a>: SearchCursor
    where
        Self: 'a;

    fn count_chars(&self) -> usize;

    /// Unicode codepoint of the character at `index`.
    fn unicode(&self, index: usize) -> u32;

    /// Bounding box of the character at `index`, normalized so that `top >= bottom`.
    fn char_box(&self, index: usize) -> Rect;

    /// Font size of the character at `index`, or 0 when unknown.
    fn font_size(&self, _index: usize) -> f64 {
        0.0
    }

    /// Computes the run rectangles covering `count` characters from `start` and
    /// returns how many there are. Subsequent `rect` calls index into this result.
    fn count_rects(&self, start: usize, count: usize) -> usize;

    /// Run rectangle at `rect_index` from the last `count_rects` call.
    fn rect(&self, rect_index: usize) -> Option<Rect>;

    /// Opens a search cursor positioned before the first match at or after `start`.
    fn find_start(&self, pattern: &str, flags: SearchFlags, start: usize) -> Self::Cursor<'_>;
}

/// Incremental search over a page. Released on drop.
pub trait SearchCursor {
    /// Advances to the next match. Returns false once the matches are exhausted.
    fn find_next(&mut self) -> bool;

    /// Character index where the current match starts.
    fn result_index(&self) -> Option<usize>;

    /// Number of characters in the current match.
    fn result_count(&self) -> usize;
}
