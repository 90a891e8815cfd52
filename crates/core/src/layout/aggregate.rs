//! Bounded text aggregation.
//!
//! Turns a page's run rectangles and per-character items into text segments for
//! a query rectangle:
//!
//! 1. Every run rectangle that intersects the query contributes one segment made
//!    of the characters it fully contains that also overlap the query enough.
//! 2. Segments are sorted top to bottom, then left to right.
//! 3. Depending on the [`DetailLevel`], segments are returned as is, merged into
//!    lines, or merged into a single item.

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::item::TextItem;
use super::params::AggregateParams;
use crate::error::{Result, TextError};
use crate::utils::{CharIndex, Rect};

/// How much spatial merging is applied to bounded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetailLevel {
    /// One item holding all lines joined by the line separator.
    #[serde(rename = "all", alias = "aggregate_all")]
    AggregateAll = 1,
    /// One item per visual line.
    #[serde(rename = "line", alias = "lines", alias = "aggregate_by_line")]
    AggregateByLine = 2,
    /// One item per engine run, unmerged.
    #[serde(rename = "segments", alias = "individual_segments")]
    IndividualSegments = 3,
}

impl DetailLevel {
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AggregateAll => "all",
            Self::AggregateByLine => "line",
            Self::IndividualSegments => "segments",
        }
    }
}

impl TryFrom<i32> for DetailLevel {
    type Error = TextError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            1 => Ok(Self::AggregateAll),
            2 => Ok(Self::AggregateByLine),
            3 => Ok(Self::IndividualSegments),
            other => Err(TextError::UnknownDetailLevel(other.to_string())),
        }
    }
}

impl FromStr for DetailLevel {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "aggregate_all" => Ok(Self::AggregateAll),
            "line" | "lines" | "aggregate_by_line" => Ok(Self::AggregateByLine),
            "segments" | "individual_segments" => Ok(Self::IndividualSegments),
            _ => Err(TextError::UnknownDetailLevel(s.to_string())),
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregates the characters selected by `query` at the requested detail level.
///
/// `chars` holds one item per page character in document order and `index` must
/// have been built from it.
pub fn aggregate_bounded_text(
    runs: &[Rect],
    chars: &[TextItem],
    index: &CharIndex,
    query: &Rect,
    level: DetailLevel,
    params: &AggregateParams,
) -> Vec<TextItem> {
    let mut segments = collect_segments(runs, chars, index, query, params);
    sort_reading_order(&mut segments);

    let result = match level {
        DetailLevel::IndividualSegments => segments,
        DetailLevel::AggregateByLine => merge_lines(segments, params),
        DetailLevel::AggregateAll => {
            let lines = merge_lines(segments, params);
            aggregate_lines(&lines, &params.line_separator)
                .into_iter()
                .collect()
        }
    };

    debug!(
        runs = runs.len(),
        chars = chars.len(),
        level = %level,
        items = result.len(),
        "aggregated bounded text"
    );
    result
}

/// Builds one segment per run rectangle intersecting `query`.
///
/// A character belongs to a segment when the run rectangle fully contains its box
/// and at least `min_char_overlap_percent` of the box lies inside `query`. Runs
/// that end up with no characters produce no segment.
pub fn collect_segments(
    runs: &[Rect],
    chars: &[TextItem],
    index: &CharIndex,
    query: &Rect,
    params: &AggregateParams,
) -> Vec<TextItem> {
    let mut segments = Vec::new();

    for run in runs.iter().filter(|run| run.intersects(query)) {
        let selected: Vec<&TextItem> = index
            .find_within(run)
            .into_iter()
            .filter_map(|id| chars.get(id))
            .filter(|c| query.contains_partially(&c.bounding_rect(), params.min_char_overlap_percent))
            .collect();
        if selected.is_empty() {
            continue;
        }

        let text: String = selected.iter().map(|c| c.text()).collect();
        let char_boxes: Vec<Rect> = selected.iter().map(|c| c.bounding_rect()).collect();
        let bounding_rect = Rect::union_all(&char_boxes);
        trace!(run = ?run, text = %text, "segment");
        segments.push(TextItem::new(
            text,
            None,
            selected.len(),
            bounding_rect,
            char_boxes,
        ));
    }

    segments
}

/// Sorts segments top to bottom (by bottom edge), then left to right.
///
/// The sort is stable, so segments with equal keys keep their run order.
pub fn sort_reading_order(segments: &mut [TextItem]) {
    segments.sort_by_key(|s| {
        let bbox = s.bounding_rect();
        (Reverse(OrderedFloat(bbox.bottom)), OrderedFloat(bbox.left))
    });
}

/// True if `segment` cannot continue `line` and has to open a new one.
///
/// The threshold is derived from the segment's height, not the line's.
fn starts_new_line(line: &Rect, segment: &Rect, overlap_ratio: f64) -> bool {
    segment.top < line.bottom || (segment.top - line.bottom) < segment.height() * overlap_ratio
}

/// Greedily merges sorted segments into lines in a single pass.
///
/// Each merged segment is preceded by a space and a placeholder box spanning the
/// horizontal gap between the line and the segment.
pub fn merge_lines(segments: Vec<TextItem>, params: &AggregateParams) -> Vec<TextItem> {
    let mut iter = segments.into_iter();
    let Some(mut current) = iter.next() else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    for segment in iter {
        let line_box = current.bounding_rect();
        let seg_box = segment.bounding_rect();
        if starts_new_line(&line_box, &seg_box, params.line_overlap_ratio) {
            lines.push(std::mem::replace(&mut current, segment));
            continue;
        }

        let merged = line_box.union(&seg_box);
        let gap = Rect::new(
            line_box.right,
            merged.top,
            line_box.right.max(seg_box.left),
            merged.bottom,
        );
        current.extend(" ", [gap], &segment);
    }
    lines.push(current);
    lines
}

/// Joins lines into one item with `separator` between each pair.
///
/// Each separator character gets a zero-area placeholder box at the bottom-right
/// corner of the line before it. Returns `None` when there are no lines.
pub fn aggregate_lines(lines: &[TextItem], separator: &str) -> Option<TextItem> {
    let (first, rest) = lines.split_first()?;
    let separator_len = separator.chars().count();

    let mut total = first.clone();
    let mut previous = first.bounding_rect();
    for line in rest {
        let anchor = Rect::point(previous.right, previous.bottom);
        total.extend(
            separator,
            std::iter::repeat_n(anchor, separator_len),
            line,
        );
        previous = line.bounding_rect();
    }
    Some(total)
}
