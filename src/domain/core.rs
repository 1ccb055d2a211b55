//! Core domain types and predicates
//!
//! This module defines the pure geometric types the region value type is
//! built on. Everything here works on integer pixel coordinates and has no
//! knowledge of any region engine or platform API.

/// Classification of a region's current representation.
///
/// `Empty` and `Simple` regions live entirely in the cheap rectangle domain;
/// only `Complex` regions carry an authoritative engine-backed shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// The region covers nothing.
    Empty,
    /// The region is exactly one rectangle.
    Simple,
    /// The region is a union of rectangles not representable as one rectangle.
    Complex,
}

/// Rectangle in pixel coordinates, stored as its four edges.
///
/// `right` and `bottom` are exclusive, so a rectangle is empty whenever
/// `right <= left` or `bottom <= top`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// The zero rectangle, used as the bounding box of an empty region.
    pub const ZERO: Rect = Rect {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };

    /// Creates a rectangle from two corners.
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates a rectangle from an origin and a size.
    ///
    /// Width and height are added to the origin; they are not treated as a
    /// second corner.
    pub fn from_xywh(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            left: x,
            top: y,
            right: x + w,
            bottom: y + h,
        }
    }

    /// Returns the width of the rectangle (may be zero or negative).
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Returns the height of the rectangle (may be zero or negative).
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Returns true if the rectangle encloses no area.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Returns true if `other` lies within or equals this rectangle on all
    /// four edges (inclusive containment).
    pub fn covers(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.right <= self.right
            && other.top >= self.top
            && other.bottom <= self.bottom
    }

    /// Returns true if the open interiors of the two rectangles intersect.
    ///
    /// Rectangles that merely share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.right <= other.left
            || other.right <= self.left
            || self.bottom <= other.top
            || other.bottom <= self.top)
    }

    /// Returns the smallest rectangle containing both rectangles.
    pub fn envelope(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Returns the rectangle intersection (max of left/top, min of
    /// right/bottom). The result may be empty.
    pub fn intersection(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_basic_properties() {
        let rect = Rect::new(10, 20, 110, 70);
        assert_eq!(rect.width(), 100);
        assert_eq!(rect.height(), 50);
        assert!(!rect.is_empty());
        assert!(Rect::ZERO.is_empty());
        assert!(Rect::new(5, 5, 5, 10).is_empty());
    }

    #[test]
    fn rect_from_xywh_adds_size_to_origin() {
        let rect = Rect::from_xywh(10, 20, 30, 40);
        assert_eq!(rect, Rect::new(10, 20, 40, 60));
    }

    #[test]
    fn covers_is_inclusive() {
        let outer = Rect::new(0, 0, 100, 100);
        assert!(outer.covers(&Rect::new(10, 10, 90, 90)));
        assert!(outer.covers(&outer));
        assert!(outer.covers(&Rect::new(0, 0, 100, 50)));
        assert!(!outer.covers(&Rect::new(-1, 0, 100, 100)));
        assert!(!outer.covers(&Rect::new(0, 0, 101, 100)));
    }

    #[test]
    fn overlap_excludes_edge_adjacency() {
        let a = Rect::new(0, 0, 50, 50);
        assert!(a.overlaps(&Rect::new(40, 40, 60, 60)));
        assert!(a.overlaps(&a));
        // Sharing an edge is not overlapping.
        assert!(!a.overlaps(&Rect::new(50, 0, 100, 50)));
        assert!(!a.overlaps(&Rect::new(0, 50, 50, 100)));
        assert!(!a.overlaps(&Rect::new(60, 60, 70, 70)));
    }

    #[test]
    fn envelope_and_intersection() {
        let a = Rect::new(0, 0, 50, 50);
        let b = Rect::new(25, 25, 100, 100);
        assert_eq!(a.envelope(&b), Rect::new(0, 0, 100, 100));
        assert_eq!(a.intersection(&b), Rect::new(25, 25, 50, 50));

        // Disjoint rectangles intersect to an empty rectangle.
        let c = Rect::new(60, 60, 70, 70);
        assert!(a.intersection(&c).is_empty());
    }
}
