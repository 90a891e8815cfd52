//! Geometry and spatial lookup helpers.
//!
//! Provides:
//! - `Rect`, an axis-aligned rectangle in page space with the y axis pointing up
//!   (`top >= bottom`)
//! - Union, intersection, containment and partial-containment tests
//! - `CharIndex`, an R-tree over character boxes used by the aggregator

use rstar::{AABB, RTree, RTreeObject};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in page coordinates.
///
/// The page y axis points up, so a well-formed rectangle has `top >= bottom`.
/// The zero rectangle is valid and is used as the empty value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    /// The degenerate zero rectangle.
    pub const ZERO: Rect = Rect {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Zero-area rectangle located at a single point.
    pub const fn point(x: f64, y: f64) -> Self {
        Self::new(x, y, x, y)
    }

    /// Same rectangle with its edges reordered so that `left <= right` and `top >= bottom`.
    pub fn normalized(&self) -> Rect {
        Rect::new(
            self.left.min(self.right),
            self.top.max(self.bottom),
            self.left.max(self.right),
            self.top.min(self.bottom),
        )
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// True if the rectangle has no positive area.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::new(
            self.left.min(other.left),
            self.top.max(other.top),
            self.right.max(other.right),
            self.bottom.min(other.bottom),
        )
    }

    /// Folds `union` over all rectangles. Returns the zero rectangle for empty input.
    pub fn union_all<'a, I>(rects: I) -> Rect
    where
        I: IntoIterator<Item = &'a Rect>,
    {
        rects
            .into_iter()
            .copied()
            .reduce(|acc, r| acc.union(&r))
            .unwrap_or_default()
    }

    /// Strict overlap test. Rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right
            && self.right > other.left
            && self.top > other.bottom
            && self.bottom < other.top
    }

    /// True if `other` lies entirely inside `self` (edges inclusive).
    pub fn contains(&self, other: &Rect) -> bool {
        self.left <= other.left
            && self.right >= other.right
            && self.top >= other.top
            && self.bottom <= other.bottom
    }

    /// True if the point lies inside the rectangle (edges inclusive).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.left <= x && x <= self.right && self.bottom <= y && y <= self.top
    }

    /// Overlapping region of two intersecting rectangles.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        Some(Rect::new(
            self.left.max(other.left),
            self.top.min(other.top),
            self.right.min(other.right),
            self.bottom.max(other.bottom),
        ))
    }

    /// True if the rectangles intersect and at least `min_percent` percent of the
    /// area of `other` falls inside `self`.
    ///
    /// A degenerate `other` has no area to cover, so the result is always false for it.
    pub fn contains_partially(&self, other: &Rect, min_percent: f64) -> bool {
        if other.is_empty() {
            return false;
        }
        match self.intersection(other) {
            Some(overlap) => overlap.area() >= other.area() * (min_percent / 100.0),
            None => false,
        }
    }

    /// Grows the rectangle by `dx` on the left and right and `dy` on the top and bottom.
    pub fn expand(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(
            self.left - dx,
            self.top + dy,
            self.right + dx,
            self.bottom - dy,
        )
    }

    fn envelope(&self) -> AABB<[f64; 2]> {
        AABB::from_corners([self.left, self.bottom], [self.right, self.top])
    }
}

/// Trait for objects that have a bounding box.
pub trait HasBBox {
    fn bbox(&self) -> Rect;
}

impl HasBBox for Rect {
    fn bbox(&self) -> Rect {
        *self
    }
}

#[derive(Clone)]
struct CharNode {
    id: usize,
    bbox: Rect,
}

impl RTreeObject for CharNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.bbox.envelope()
    }
}

/// Static R-tree over a page's character boxes.
///
/// Ids are positions in the slice the index was built from, so they match
/// character indices when built from the page's character info.
pub struct CharIndex {
    tree: RTree<CharNode>,
    len: usize,
}

impl CharIndex {
    /// Bulk-loads the index from objects in document order.
    pub fn new<T: HasBBox>(objs: &[T]) -> Self {
        let nodes: Vec<CharNode> = objs
            .iter()
            .enumerate()
            .map(|(id, obj)| CharNode {
                id,
                bbox: obj.bbox(),
            })
            .collect();
        let len = nodes.len();
        Self {
            tree: RTree::bulk_load(nodes),
            len,
        }
    }

    /// Ids of all objects fully contained by `region`, in ascending order.
    pub fn find_within(&self, region: &Rect) -> Vec<usize> {
        let mut ids: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&region.envelope())
            .filter(|node| region.contains(&node.bbox))
            .map(|node| node.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
