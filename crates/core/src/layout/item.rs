//! Text item: a piece of extracted text together with its geometry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::{HasBBox, Rect};

/// Extracted text with its bounding rectangle and per-character boxes.
///
/// Items built from a contiguous character range (single characters, search
/// matches) carry the index of their first character. Items assembled by the
/// aggregator from a filtered or merged selection have no start index.
///
/// `char_boxes` may be longer than `length` suggests once placeholder boxes for
/// inserted separators have been appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    text: String,
    start_index: Option<usize>,
    length: usize,
    bounding_rect: Rect,
    char_boxes: Vec<Rect>,
}

impl TextItem {
    pub fn new(
        text: impl Into<String>,
        start_index: Option<usize>,
        length: usize,
        bounding_rect: Rect,
        char_boxes: Vec<Rect>,
    ) -> Self {
        Self {
            text: text.into(),
            start_index,
            length,
            bounding_rect,
            char_boxes,
        }
    }

    /// Item for a single character at `index`.
    pub fn for_char(ch: char, index: usize, bbox: Rect) -> Self {
        Self::new(ch.to_string(), Some(index), 1, bbox, vec![bbox])
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Index of the first character, or `None` for synthetic aggregates.
    pub fn start_index(&self) -> Option<usize> {
        self.start_index
    }

    /// True if the item does not map to one contiguous character range.
    pub fn is_synthetic(&self) -> bool {
        self.start_index.is_none()
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn bounding_rect(&self) -> Rect {
        self.bounding_rect
    }

    pub fn char_boxes(&self) -> &[Rect] {
        &self.char_boxes
    }

    /// Appends `separator` and then `other` to this item.
    ///
    /// One placeholder box per separator character is expected in `placeholders`;
    /// they are inserted ahead of `other`'s boxes. The result is synthetic.
    pub(crate) fn extend<I>(&mut self, separator: &str, placeholders: I, other: &TextItem)
    where
        I: IntoIterator<Item = Rect>,
    {
        self.text.push_str(separator);
        self.text.push_str(&other.text);
        self.length += separator.chars().count() + other.length;
        self.bounding_rect = self.bounding_rect.union(&other.bounding_rect);
        self.char_boxes.extend(placeholders);
        self.char_boxes.extend_from_slice(&other.char_boxes);
        self.start_index = None;
    }
}

impl HasBBox for TextItem {
    fn bbox(&self) -> Rect {
        self.bounding_rect
    }
}

impl fmt::Display for TextItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_char() {
        let bbox = Rect::new(1.0, 10.0, 5.0, 0.0);
        let item = TextItem::for_char('x', 7, bbox);
        assert_eq!(item.text(), "x");
        assert_eq!(item.start_index(), Some(7));
        assert!(!item.is_synthetic());
        assert_eq!(item.length(), 1);
        assert_eq!(item.char_boxes(), &[bbox]);
        assert_eq!(item.to_string(), "x");
    }

    #[test]
    fn test_extend_appends_separator_and_boxes() {
        let a_box = Rect::new(0.0, 10.0, 5.0, 0.0);
        let b_box = Rect::new(8.0, 12.0, 13.0, 2.0);
        let gap = Rect::new(5.0, 12.0, 8.0, 0.0);
        let mut a = TextItem::for_char('a', 0, a_box);
        let b = TextItem::for_char('b', 2, b_box);

        a.extend(" ", [gap], &b);

        assert_eq!(a.text(), "a b");
        assert_eq!(a.length(), 3);
        assert!(a.is_synthetic());
        assert_eq!(a.bounding_rect(), Rect::new(0.0, 12.0, 13.0, 0.0));
        assert_eq!(a.char_boxes(), &[a_box, gap, b_box]);
    }

    #[test]
    fn test_serializes_to_json() {
        let item = TextItem::for_char('q', 3, Rect::new(0.0, 1.0, 1.0, 0.0));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["text"], "q");
        assert_eq!(json["start_index"], 3);
        assert_eq!(json["char_boxes"].as_array().unwrap().len(), 1);
    }
}
