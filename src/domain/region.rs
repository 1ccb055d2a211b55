//! Hybrid rectangle/region value type
//!
//! [`Region`] tracks an arbitrary union of axis-aligned rectangles while
//! staying in the cheap rectangle domain for the overwhelmingly common cases
//! of an empty region or a single rectangle. Only when an operation genuinely
//! produces a shape that one rectangle cannot represent does it call through
//! the [`RegionEngine`] and keep an engine handle as backing.
//!
//! The backing handle is retained across transitions back to a rectangle or
//! empty region, marked stale rather than released, so flipping between
//! simple and complex does not reallocate the engine object.

use std::fmt;
use std::mem;

use log::{debug, warn};

use crate::domain::core::{Rect, RegionKind};
use crate::domain::region_data::{self, HEADER_SIZE, RECT_SIZE, RegionDataHeader};
use crate::engine::RegionEngine;
use crate::engine::bands::BandEngine;

/// Relationship between a region and its backing engine handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// No engine handle has been created yet.
    NoHandle,
    /// A handle exists but no longer matches the region's shape.
    Stale,
    /// The handle holds the region's current shape.
    Valid,
}

/// Owned backing handle in one of three states.
///
/// Validity is decoupled from existence: a handle that stops matching the
/// region's shape is kept as `Stale` and rewritten in place the next time a
/// handle is needed, instead of being released and recreated.
enum Backing<H> {
    None,
    Stale(H),
    Valid(H),
}

impl<H> Backing<H> {
    fn state(&self) -> HandleState {
        match self {
            Backing::None => HandleState::NoHandle,
            Backing::Stale(_) => HandleState::Stale,
            Backing::Valid(_) => HandleState::Valid,
        }
    }

    fn is_valid(&self) -> bool {
        matches!(self, Backing::Valid(_))
    }

    /// Demotes a valid handle to stale, keeping the handle itself.
    fn invalidate(&mut self) {
        if let Backing::Valid(_) = self {
            if let Backing::Valid(handle) = mem::replace(self, Backing::None) {
                *self = Backing::Stale(handle);
            }
        }
    }

    /// Moves the handle out regardless of its state, leaving `None`.
    fn take(&mut self) -> Option<H> {
        match mem::replace(self, Backing::None) {
            Backing::None => None,
            Backing::Stale(handle) | Backing::Valid(handle) => Some(handle),
        }
    }

    fn valid(&self) -> Option<&H> {
        match self {
            Backing::Valid(handle) => Some(handle),
            _ => None,
        }
    }
}

/// A 2D region held as empty, a single rectangle, or an engine-backed union
/// of rectangles.
///
/// The bounding box is the entire region for `Empty` and `Simple` kinds and
/// the tightest enclosing rectangle for `Complex` ones. Operations decide
/// locally whether they can stay in the rectangle domain and only fall back
/// to the engine when they cannot.
///
/// ```
/// use tactile_region::{Rect, Region, RegionKind};
///
/// let mut clip: Region = Region::new();
/// clip.union_with_rect(Rect::new(0, 0, 50, 50));
/// clip.union_with_rect(Rect::new(50, 0, 100, 50));
/// // Two rectangles sharing top and bottom merge without an engine call.
/// assert_eq!(clip.kind(), RegionKind::Simple);
/// assert_eq!(clip.bounding_box(), Rect::new(0, 0, 100, 50));
/// ```
pub struct Region<E: RegionEngine = BandEngine> {
    bounding_box: Rect,
    kind: RegionKind,
    backing: Backing<E::Handle>,
}

impl<E: RegionEngine> Region<E> {
    /// Creates an empty region.
    pub fn new() -> Self {
        Self {
            bounding_box: Rect::ZERO,
            kind: RegionKind::Empty,
            backing: Backing::None,
        }
    }

    /// Creates a region holding one rectangle.
    pub fn from_rect(rect: Rect) -> Self {
        let mut region = Self::new();
        region.become_rect(rect);
        region
    }

    /// Creates a region holding one rectangle given as origin plus size.
    pub fn from_xywh(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self::from_rect(Rect::from_xywh(x, y, w, h))
    }

    /// Creates a region that is the union of two rectangles.
    pub fn from_rects(first: Rect, second: Rect) -> Self {
        let mut region = Self::from_rect(first);
        region.union_rect_with_rect(second);
        region
    }

    /// Creates a region that is the union of two regions.
    pub fn from_regions(first: &Region<E>, second: &Region<E>) -> Self {
        let mut region = Self::new();
        region.become_region(first);
        region.union_with(second);
        region
    }

    /// Creates a region by copying the shape of a borrowed engine handle.
    ///
    /// The handle stays owned by the caller. A malformed handle yields an
    /// empty region.
    pub fn from_handle_ref(handle: &E::Handle) -> Self {
        let mut region = Self::new();
        region.union_with_handle(handle);
        region
    }

    /// Creates a region that takes ownership of an engine handle.
    ///
    /// A malformed handle yields an empty region and the handle is released,
    /// not retained.
    pub fn from_handle(handle: E::Handle) -> Self {
        let mut region = Self::new();
        region.attach(handle);
        region
    }

    /// Returns the region's classification.
    pub fn kind(&self) -> RegionKind {
        self.kind
    }

    /// Returns the bounding box: the entire region when simple, the tightest
    /// enclosing rectangle when complex, the zero rectangle when empty.
    pub fn bounding_box(&self) -> Rect {
        self.bounding_box
    }

    /// Returns the bounding box as origin plus size.
    pub fn bounding_box_xywh(&self) -> (i32, i32, i32, i32) {
        let rect = self.bounding_box;
        (rect.left, rect.top, rect.width(), rect.height())
    }

    /// Returns true if the region covers nothing.
    pub fn is_empty(&self) -> bool {
        self.kind == RegionKind::Empty
    }

    /// Reports whether a backing engine handle exists and whether it matches
    /// the region's current shape.
    pub fn handle_state(&self) -> HandleState {
        self.backing.state()
    }

    /// Resets the region to empty.
    ///
    /// A backing handle is kept as stale for reuse rather than released.
    pub fn clear(&mut self) {
        self.bounding_box = Rect::ZERO;
        self.kind = RegionKind::Empty;
        self.backing.invalidate();
    }

    /// Replaces this region with an empty one and returns the old value,
    /// handle ownership included.
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::new())
    }

    /// Adds a rectangle to the region.
    pub fn union_with_rect(&mut self, rect: Rect) {
        match self.kind {
            RegionKind::Empty => self.become_rect(rect),
            RegionKind::Simple => self.union_rect_with_rect(rect),
            RegionKind::Complex => {
                if rect.covers(&self.bounding_box) {
                    self.become_rect(rect);
                } else {
                    self.union_rect_become_complex(rect);
                }
            }
        }
    }

    /// Adds a rectangle given as origin plus size.
    pub fn union_with_xywh(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.union_with_rect(Rect::from_xywh(x, y, w, h));
    }

    /// Adds another region to this region.
    pub fn union_with(&mut self, other: &Region<E>) {
        match other.kind {
            RegionKind::Simple => self.union_with_rect(other.bounding_box),
            RegionKind::Complex => {
                // Covering the other region already makes the union a no-op.
                if self.kind == RegionKind::Simple && self.bounding_box.covers(&other.bounding_box)
                {
                    return;
                }
                let had_bounds = self.kind != RegionKind::Empty;
                let Some(src) = other.backing.valid() else {
                    return;
                };
                self.materialize();
                let Backing::Valid(dst) = &mut self.backing else {
                    return;
                };
                match E::combine_or(dst, src) {
                    Some(kind) => {
                        self.kind = kind;
                        if had_bounds {
                            self.bounding_box = self.bounding_box.envelope(&other.bounding_box);
                        } else {
                            // Nothing to envelope with; the other region's
                            // bounds are the result's bounds.
                            self.bounding_box = other.bounding_box;
                        }
                    }
                    None => self.clear(),
                }
            }
            RegionKind::Empty => {}
        }
    }

    /// Adds the shape of a borrowed engine handle, treated as an opaque
    /// complex region.
    ///
    /// A malformed handle degrades this region to empty.
    pub fn union_with_handle(&mut self, handle: &E::Handle) {
        self.materialize();
        let Backing::Valid(dst) = &mut self.backing else {
            return;
        };
        match E::combine_or(dst, handle) {
            Some(_) => {
                let bounds = E::bounds(dst);
                match bounds {
                    Some((kind, rect)) => {
                        self.kind = kind;
                        self.bounding_box = rect;
                    }
                    None => self.clear(),
                }
            }
            None => {
                warn!("union with malformed engine handle, becoming empty");
                self.clear();
            }
        }
    }

    /// Reduces the region to its intersection with a rectangle.
    pub fn intersect_with_rect(&mut self, rect: Rect) {
        match self.kind {
            RegionKind::Simple => {
                // A covering rectangle changes nothing, and skipping the
                // assignments below preserves a still-valid handle.
                if self.backing.is_valid() && rect.covers(&self.bounding_box) {
                    return;
                }
                self.bounding_box = self.bounding_box.intersection(&rect);
                self.backing.invalidate();
                if self.bounding_box.is_empty() {
                    self.clear();
                }
            }
            RegionKind::Complex => {
                if rect.covers(&self.bounding_box) {
                    return;
                }
                self.materialize();
                let Backing::Valid(dst) = &mut self.backing else {
                    return;
                };
                let combined =
                    E::with_rect_handle(rect, |scratch| E::combine_and(&mut *dst, scratch));
                let bounds = combined.and_then(|_| E::bounds(dst));
                match bounds {
                    Some((kind, bounds)) => {
                        self.kind = kind;
                        self.bounding_box = bounds;
                    }
                    None => self.clear(),
                }
            }
            RegionKind::Empty => {}
        }
    }

    /// Reduces the region to its intersection with a rectangle given as
    /// origin plus size.
    pub fn intersect_with_xywh(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.intersect_with_rect(Rect::from_xywh(x, y, w, h));
    }

    /// Reduces the region to its intersection with another region.
    pub fn intersect_with(&mut self, other: &Region<E>) {
        match other.kind {
            RegionKind::Simple => self.intersect_with_rect(other.bounding_box),
            RegionKind::Complex => {
                if self.kind == RegionKind::Empty {
                    return;
                }
                // Disjoint bounding boxes settle the intersection without an
                // engine call.
                if !self.bounding_box.overlaps(&other.bounding_box) {
                    self.clear();
                    return;
                }
                let Some(src) = other.backing.valid() else {
                    return;
                };
                self.materialize();
                let Backing::Valid(dst) = &mut self.backing else {
                    return;
                };
                let combined = E::combine_and(dst, src);
                let bounds = combined.and_then(|_| E::bounds(dst));
                match bounds {
                    Some((kind, bounds)) => {
                        self.kind = kind;
                        self.bounding_box = bounds;
                    }
                    None => self.clear(),
                }
            }
            RegionKind::Empty => self.clear(),
        }
    }

    /// Reduces the region to its intersection with the shape of a borrowed
    /// engine handle.
    ///
    /// A malformed handle degrades this region to empty.
    pub fn intersect_with_handle(&mut self, handle: &E::Handle) {
        if self.kind == RegionKind::Empty {
            return;
        }
        self.materialize();
        let Backing::Valid(dst) = &mut self.backing else {
            return;
        };
        match E::combine_and(dst, handle) {
            Some(_) => {
                let bounds = E::bounds(dst);
                match bounds {
                    Some((kind, rect)) => {
                        self.kind = kind;
                        self.bounding_box = rect;
                    }
                    None => self.clear(),
                }
            }
            None => {
                warn!("intersection with malformed engine handle, becoming empty");
                self.clear();
            }
        }
    }

    /// Returns a new region that is the union of this region and another.
    /// Neither input is mutated.
    pub fn union(&self, other: &Region<E>) -> Region<E> {
        if self.kind == RegionKind::Simple && other.kind == RegionKind::Simple {
            let mut region = Self::from_rect(other.bounding_box);
            region.union_rect_with_rect(self.bounding_box);
            region
        } else {
            let mut region = other.clone();
            region.union_with(self);
            region
        }
    }

    /// Returns a new region that is the union of this region and a
    /// rectangle.
    pub fn union_rect(&self, rect: Rect) -> Region<E> {
        let mut region = Self::from_rect(rect);
        if self.kind == RegionKind::Simple {
            region.union_rect_with_rect(self.bounding_box);
        } else {
            region.union_with(self);
        }
        region
    }

    /// Returns a new region that is the union of this region and the shape
    /// of a borrowed engine handle. A malformed handle yields an empty
    /// result.
    pub fn union_handle(&self, handle: &E::Handle) -> Region<E> {
        let mut region = Self::from_handle_ref(handle);
        region.union_with(self);
        region
    }

    /// Returns a new region that is the intersection of this region and
    /// another. Neither input is mutated.
    pub fn intersect(&self, other: &Region<E>) -> Region<E> {
        let mut region = other.clone();
        region.intersect_with(self);
        region
    }

    /// Returns a new region that is the intersection of this region and a
    /// rectangle.
    pub fn intersect_rect(&self, rect: Rect) -> Region<E> {
        let mut region = Self::from_rect(rect);
        region.intersect_with(self);
        region
    }

    /// Returns a new region that is the intersection of this region and the
    /// shape of a borrowed engine handle. A malformed handle yields an empty
    /// result.
    pub fn intersect_handle(&self, handle: &E::Handle) -> Region<E> {
        let mut region = Self::from_handle_ref(handle);
        region.intersect_with(self);
        region
    }

    /// Returns the rectangles reconstructing the region's covered area.
    ///
    /// Empty regions produce no rectangles and simple regions exactly one.
    /// Complex regions return the engine's decomposition unmodified; an
    /// inconsistent decomposition degrades to an empty list.
    pub fn rects(&self) -> Vec<Rect> {
        match self.kind {
            RegionKind::Empty => Vec::new(),
            RegionKind::Simple => vec![self.bounding_box],
            RegionKind::Complex => {
                let data = self.region_data();
                if data.len() < HEADER_SIZE + RECT_SIZE {
                    return Vec::new();
                }
                let header = match RegionDataHeader::parse(&data) {
                    Ok(header) => header,
                    Err(err) => {
                        debug!("discarding inconsistent region data: {err}");
                        return Vec::new();
                    }
                };
                let mut rects = Vec::with_capacity(header.count as usize);
                for index in 0..header.count as usize {
                    rects.push(region_data::read_rect(&data, HEADER_SIZE + index * RECT_SIZE));
                }
                rects
            }
        }
    }

    /// Serializes the region as a header plus rectangle array, suitable for
    /// APIs consuming dirty-rect buffers.
    ///
    /// Valid for all three kinds; see [`crate::domain::region_data`] for the
    /// layout. A missing or empty engine decomposition yields an empty
    /// buffer, never an error.
    pub fn region_data(&self) -> Vec<u8> {
        match self.kind {
            RegionKind::Empty => {
                let mut bytes = Vec::with_capacity(HEADER_SIZE);
                RegionDataHeader::for_rects(0, Rect::ZERO).write_to(&mut bytes);
                bytes
            }
            RegionKind::Simple => {
                let mut bytes = Vec::with_capacity(HEADER_SIZE + RECT_SIZE);
                RegionDataHeader::for_rects(1, self.bounding_box).write_to(&mut bytes);
                region_data::write_rect(&self.bounding_box, &mut bytes);
                bytes
            }
            RegionKind::Complex => {
                let Some(handle) = self.backing.valid() else {
                    return Vec::new();
                };
                let Some(rects) = E::decompose(handle) else {
                    debug!("engine produced no decomposition, returning empty buffer");
                    return Vec::new();
                };
                if rects.is_empty() {
                    return Vec::new();
                }
                let mut bytes = Vec::with_capacity(HEADER_SIZE + rects.len() * RECT_SIZE);
                RegionDataHeader::for_rects(rects.len() as u32, self.bounding_box)
                    .write_to(&mut bytes);
                for rect in &rects {
                    region_data::write_rect(rect, &mut bytes);
                }
                bytes
            }
        }
    }

    /// Takes ownership of an engine handle, making it this region's shape.
    ///
    /// Any previously owned handle is released. A malformed handle leaves
    /// the region empty and is released, not retained.
    pub fn attach(&mut self, handle: E::Handle) {
        match E::bounds(&handle) {
            Some((kind, rect)) => {
                self.kind = kind;
                self.bounding_box = rect;
                // Replacing the backing drops the old handle.
                self.backing = Backing::Valid(handle);
            }
            None => {
                warn!("attaching malformed engine handle, becoming empty");
                self.backing = Backing::None;
                self.clear();
            }
        }
    }

    /// Hands ownership of the backing handle to the caller, materializing it
    /// first if needed. The region becomes empty.
    pub fn detach(&mut self) -> E::Handle {
        let was_valid = self.backing.is_valid();
        let rect = match self.kind {
            RegionKind::Empty => Rect::ZERO,
            _ => self.bounding_box,
        };
        let handle = match self.backing.take() {
            Some(handle) if was_valid => handle,
            Some(mut handle) => {
                E::set_rect(&mut handle, rect);
                handle
            }
            None => E::create_from_rect(rect),
        };
        self.clear();
        handle
    }

    /// Returns a new engine handle holding a copy of this region's shape.
    /// The region itself is unchanged.
    pub fn detach_copy(&self) -> E::Handle {
        self.clone().detach()
    }

    /// Turns this region into exactly `rect`, demoting any backing handle to
    /// stale.
    fn become_rect(&mut self, rect: Rect) {
        self.bounding_box = rect;
        self.kind = RegionKind::Simple;
        self.backing.invalidate();
    }

    /// Turns this region into a copy of another region. Complex shapes are
    /// re-derived through an engine combine rather than aliasing the other
    /// region's handle.
    fn become_region(&mut self, other: &Region<E>) {
        match other.kind {
            RegionKind::Simple => self.become_rect(other.bounding_box),
            RegionKind::Complex => {
                self.clear();
                self.materialize();
                let Some(src) = other.backing.valid() else {
                    return;
                };
                let Backing::Valid(dst) = &mut self.backing else {
                    return;
                };
                if let Some(kind) = E::combine_or(dst, src) {
                    self.kind = kind;
                    self.bounding_box = other.bounding_box;
                }
            }
            RegionKind::Empty => self.clear(),
        }
    }

    /// Union of two rectangles; only called while this region is simple.
    ///
    /// Runs the fast-merge checks in order: containment either way, then the
    /// shared-edge merges, and only then the engine combine.
    fn union_rect_with_rect(&mut self, other: Rect) {
        let me = self.bounding_box;

        if me.covers(&other) {
            // No assignments needed, which also preserves a valid handle.
            return;
        }
        if other.covers(&me) {
            self.become_rect(other);
            return;
        }

        // Same top and bottom with touching or overlapping spans merge into
        // one rectangle.
        if me.top == other.top && me.bottom == other.bottom {
            if !(me.left > other.right || other.left > me.right) {
                self.become_rect(Rect::new(
                    me.left.min(other.left),
                    me.top,
                    me.right.max(other.right),
                    me.bottom,
                ));
                return;
            }
        }
        // Symmetric case: same left and right, vertically touching or
        // overlapping.
        else if me.left == other.left && me.right == other.right {
            if !(me.top > other.bottom || other.top > me.bottom) {
                self.become_rect(Rect::new(
                    me.left,
                    me.top.min(other.top),
                    me.right,
                    me.bottom.max(other.bottom),
                ));
                return;
            }
        }

        self.union_rect_become_complex(other);
    }

    /// Engine OR combine with a bare rectangle; the combine result's kind
    /// replaces ours and the bounding box grows to the envelope.
    fn union_rect_become_complex(&mut self, other: Rect) {
        self.materialize();
        let Backing::Valid(dst) = &mut self.backing else {
            return;
        };
        let combined = E::with_rect_handle(other, |scratch| E::combine_or(&mut *dst, scratch));
        match combined {
            Some(kind) => {
                self.kind = kind;
                self.bounding_box = self.bounding_box.envelope(&other);
            }
            None => self.clear(),
        }
    }

    /// Ensures the backing handle exists and matches the current shape.
    ///
    /// A stale handle is rewritten in place; only a missing one is
    /// allocated. Complex regions always hold a valid handle already.
    fn materialize(&mut self) {
        if self.backing.is_valid() {
            return;
        }
        let rect = match self.kind {
            RegionKind::Empty => Rect::ZERO,
            _ => self.bounding_box,
        };
        let handle = match self.backing.take() {
            Some(mut handle) => {
                E::set_rect(&mut handle, rect);
                handle
            }
            None => E::create_from_rect(rect),
        };
        self.backing = Backing::Valid(handle);
    }
}

impl<E: RegionEngine> Default for Region<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: RegionEngine> Clone for Region<E> {
    fn clone(&self) -> Self {
        let mut region = Self::new();
        region.become_region(self);
        region
    }
}

impl<E: RegionEngine> PartialEq for Region<E> {
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind {
            return false;
        }
        match self.kind {
            RegionKind::Empty => true,
            RegionKind::Simple => self.bounding_box == other.bounding_box,
            // Bounding-box equality is necessary but not sufficient here;
            // only the engine knows the exact shapes.
            RegionKind::Complex => match (self.backing.valid(), other.backing.valid()) {
                (Some(a), Some(b)) => E::equals(a, b),
                _ => false,
            },
        }
    }
}

impl<E: RegionEngine> Eq for Region<E> {}

impl<E: RegionEngine> PartialEq<Rect> for Region<E> {
    /// A region equals a bare rectangle iff it is simple with exactly those
    /// edges.
    fn eq(&self, rect: &Rect) -> bool {
        self.kind == RegionKind::Simple && self.bounding_box == *rect
    }
}

impl<E: RegionEngine> fmt::Debug for Region<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("kind", &self.kind)
            .field("bounding_box", &self.bounding_box)
            .field("handle", &self.handle_state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::bands::{Band, BandHandle, Span};

    const RECT_A: Rect = Rect {
        left: 0,
        top: 0,
        right: 50,
        bottom: 50,
    };
    const RECT_B: Rect = Rect {
        left: 50,
        top: 0,
        right: 100,
        bottom: 50,
    };
    const RECT_C: Rect = Rect {
        left: 0,
        top: 50,
        right: 50,
        bottom: 100,
    };
    const RECT_D: Rect = Rect {
        left: 50,
        top: 50,
        right: 100,
        bottom: 100,
    };
    const RECT_AB: Rect = Rect {
        left: 0,
        top: 0,
        right: 100,
        bottom: 50,
    };
    const RECT_CD: Rect = Rect {
        left: 0,
        top: 50,
        right: 100,
        bottom: 100,
    };
    const RECT_ABCD: Rect = Rect {
        left: 0,
        top: 0,
        right: 100,
        bottom: 100,
    };

    fn complex_ad() -> Region {
        let mut region: Region = Region::from_rect(RECT_A);
        region.union_with_rect(RECT_D);
        assert_eq!(region.kind(), RegionKind::Complex);
        region
    }

    fn malformed_handle() -> BandHandle {
        BandHandle::from_raw_bands(vec![Band {
            top: 10,
            bottom: 0,
            spans: vec![Span { left: 0, right: 10 }],
        }])
    }

    fn header_consistent(bytes: &[u8], count: u32, bounds: Rect) -> bool {
        match RegionDataHeader::parse(bytes) {
            Ok(header) => header.count == count && header.bounds == bounds,
            Err(_) => false,
        }
    }

    #[test]
    fn new_region_is_empty() {
        let region: Region = Region::new();
        assert_eq!(region.kind(), RegionKind::Empty);
        assert!(region.is_empty());
        assert_eq!(region.bounding_box(), Rect::ZERO);
        assert_eq!(region.handle_state(), HandleState::NoHandle);
        assert!(region.rects().is_empty());
    }

    #[test]
    fn construction_and_rect_equality() {
        let a: Region = Region::from_rect(RECT_A);
        let b: Region = Region::from_xywh(50, 0, 50, 50);
        assert_eq!(a.kind(), RegionKind::Simple);
        assert_eq!(a, RECT_A);
        assert_eq!(b, RECT_B);
        assert_ne!(a, b);

        let empty1: Region = Region::new();
        let empty2: Region = Region::new();
        assert_eq!(empty1, empty2);
        assert_ne!(empty1, a);
        // An empty region never equals a bare rectangle.
        assert_ne!(empty1, Rect::ZERO);
    }

    #[test]
    fn bounding_box_xywh_form() {
        let c: Region = Region::from_rect(RECT_C);
        assert_eq!(c.bounding_box_xywh(), (0, 50, 50, 50));
    }

    #[test]
    fn union_on_empty_becomes_simple() {
        let mut region: Region = Region::new();
        region.union_with_rect(RECT_A);
        assert_eq!(region.kind(), RegionKind::Simple);
        assert_eq!(region.bounding_box(), RECT_A);
    }

    #[test]
    fn union_contained_rect_is_a_noop() {
        let mut region: Region = Region::from_rect(RECT_A);
        region.union_with_xywh(1, 1, 48, 48);
        assert_eq!(region, RECT_A);
        assert_eq!(region.handle_state(), HandleState::NoHandle);
    }

    #[test]
    fn union_noop_preserves_valid_handle() {
        // Intersecting a complex region down to one rectangle leaves a
        // simple region whose handle is still valid.
        let mut region = complex_ad();
        region.intersect_with_rect(RECT_A);
        assert_eq!(region.kind(), RegionKind::Simple);
        assert_eq!(region.handle_state(), HandleState::Valid);

        region.union_with_rect(Rect::new(10, 10, 20, 20));
        assert_eq!(region, RECT_A);
        assert_eq!(region.handle_state(), HandleState::Valid);
    }

    #[test]
    fn union_covering_rect_replaces_simple() {
        let mut region: Region = Region::from_rect(RECT_A);
        region.union_with_rect(Rect::new(-1, -1, 51, 51));
        assert_eq!(region, Rect::new(-1, -1, 51, 51));
    }

    #[test]
    fn union_merges_rects_sharing_top_and_bottom() {
        let mut region: Region = Region::from_rect(RECT_A);
        region.union_with_rect(RECT_B);
        assert_eq!(region.kind(), RegionKind::Simple);
        assert_eq!(region.bounding_box(), RECT_AB);

        // Overlapping spans merge too.
        let mut region: Region = Region::from_rect(RECT_A);
        region.union_with_rect(Rect::new(40, 0, 100, 50));
        assert_eq!(region, RECT_AB);
    }

    #[test]
    fn union_merges_rects_sharing_left_and_right() {
        let mut region: Region = Region::from_rect(RECT_A);
        region.union_with_rect(RECT_C);
        assert_eq!(region.kind(), RegionKind::Simple);
        assert_eq!(region.bounding_box(), Rect::new(0, 0, 50, 100));
    }

    #[test]
    fn union_disjoint_aligned_rects_goes_complex() {
        // Same top and bottom but a gap between the spans.
        let mut region: Region = Region::from_rect(RECT_A);
        region.union_with_rect(Rect::new(51, 0, 101, 50));
        assert_eq!(region.kind(), RegionKind::Complex);
        assert_eq!(region.bounding_box(), Rect::new(0, 0, 101, 50));

        // Same left and right but a vertical gap.
        let mut region: Region = Region::from_rect(RECT_A);
        region.union_with_rect(Rect::new(0, 51, 50, 101));
        assert_eq!(region.kind(), RegionKind::Complex);
        assert_eq!(region.bounding_box(), Rect::new(0, 0, 50, 101));
    }

    #[test]
    fn union_diagonal_rects_goes_complex_in_insertion_order() {
        let region = complex_ad();
        assert_eq!(region.bounding_box(), RECT_ABCD);
        assert_eq!(region.handle_state(), HandleState::Valid);
        assert_eq!(region.rects(), vec![RECT_A, RECT_D]);
    }

    #[test]
    fn union_rect_covering_complex_collapses_to_simple() {
        let mut region = complex_ad();
        region.union_with_rect(RECT_ABCD);
        assert_eq!(region.kind(), RegionKind::Simple);
        assert_eq!(region.bounding_box(), RECT_ABCD);
        // The handle is kept for reuse, just no longer valid.
        assert_eq!(region.handle_state(), HandleState::Stale);
    }

    #[test]
    fn full_reconstruction_collapses_to_simple() {
        let mut region: Region = Region::new();
        region.union_with_rect(RECT_A);
        assert_eq!(region, RECT_A);
        region.union_with_rect(RECT_D);
        assert_eq!(region.kind(), RegionKind::Complex);
        assert_eq!(region.bounding_box(), RECT_ABCD);
        region.union_with_rect(RECT_C);
        assert_eq!(region.kind(), RegionKind::Complex);
        assert_eq!(region.bounding_box(), RECT_ABCD);
        region.union_with_rect(RECT_B);
        assert_eq!(region.kind(), RegionKind::Simple);
        assert_eq!(region.bounding_box(), RECT_ABCD);
    }

    #[test]
    fn row_merges_then_region_union_stays_simple() {
        let mut top: Region = Region::new();
        top.union_with_rect(RECT_A);
        top.union_with_rect(RECT_B);
        assert_eq!(top, RECT_AB);

        let mut bottom: Region = Region::new();
        bottom.union_with_rect(RECT_C);
        bottom.union_with_rect(RECT_D);
        assert_eq!(bottom, RECT_CD);

        top.union_with(&bottom);
        assert_eq!(top.kind(), RegionKind::Simple);
        assert_eq!(top.bounding_box(), RECT_ABCD);
    }

    #[test]
    fn union_with_complex_covered_by_simple_is_a_noop() {
        let mut region: Region = Region::from_rect(RECT_ABCD);
        let other = complex_ad();
        region.union_with(&other);
        assert_eq!(region, RECT_ABCD);
        assert_eq!(region.handle_state(), HandleState::NoHandle);
    }

    #[test]
    fn union_of_empty_with_complex_copies_bounds() {
        let mut region: Region = Region::new();
        let other = complex_ad();
        region.union_with(&other);
        assert_eq!(region.kind(), RegionKind::Complex);
        assert_eq!(region.bounding_box(), other.bounding_box());
        assert_eq!(region, other);
    }

    #[test]
    fn union_with_empty_region_is_a_noop() {
        let mut region = complex_ad();
        let snapshot = region.clone();
        region.union_with(&Region::new());
        assert_eq!(region, snapshot);
        assert_eq!(region.kind(), RegionKind::Complex);
    }

    #[test]
    fn union_with_itself_changes_nothing() {
        let mut region = complex_ad();
        let snapshot = region.clone();
        region.union_with(&snapshot);
        assert_eq!(region, snapshot);
        assert_eq!(region.kind(), snapshot.kind());
        assert_eq!(region.bounding_box(), snapshot.bounding_box());
        assert_eq!(region.rects(), snapshot.rects());
    }

    #[test]
    fn union_coverage_is_order_independent() {
        let a = complex_ad();
        let mut b: Region = Region::from_rect(RECT_B);
        b.union_with_rect(RECT_C);

        let ab = a.union(&b);
        let ba = b.union(&a);
        assert_eq!(ab, ba);
        assert_eq!(ab.bounding_box(), ba.bounding_box());
        assert_eq!(ab.rects(), ba.rects());

        // The inputs survive untouched.
        assert_eq!(a, complex_ad());
        assert_eq!(b.bounding_box(), RECT_ABCD);
    }

    #[test]
    fn complex_equality_ignores_construction_order() {
        let mut forward: Region = Region::new();
        forward.union_with_rect(RECT_A);
        forward.union_with_rect(RECT_D);

        let mut reverse: Region = Region::new();
        reverse.union_with_rect(RECT_D);
        reverse.union_with_rect(RECT_A);

        assert_eq!(forward, reverse);

        let mut other: Region = Region::new();
        other.union_with_rect(RECT_B);
        other.union_with_rect(RECT_C);
        assert_ne!(forward, other);
    }

    #[test]
    fn value_form_union_with_rect_does_not_mutate() {
        let a: Region = Region::from_rect(RECT_A);
        let merged = a.union_rect(RECT_B);
        assert_eq!(merged, RECT_AB);
        assert_eq!(a, RECT_A);

        let complex = complex_ad();
        let grown = complex.union_rect(RECT_B);
        assert_eq!(grown.kind(), RegionKind::Complex);
        assert_eq!(grown.bounding_box(), RECT_ABCD);
        assert_eq!(complex, complex_ad());
    }

    #[test]
    fn intersect_simple_shrinks_to_overlap() {
        let mut region: Region = Region::from_rect(RECT_A);
        region.intersect_with_rect(Rect::new(25, 25, 75, 75));
        assert_eq!(region, Rect::new(25, 25, 50, 50));
    }

    #[test]
    fn intersect_simple_disjoint_becomes_empty() {
        let mut region: Region = Region::from_rect(RECT_A);
        region.intersect_with_rect(Rect::new(60, 60, 70, 70));
        assert!(region.is_empty());
        assert_eq!(region.bounding_box(), Rect::ZERO);
    }

    #[test]
    fn intersect_simple_covered_with_valid_handle_is_a_noop() {
        let mut region = complex_ad();
        region.intersect_with_rect(RECT_A);
        assert_eq!(region, RECT_A);
        assert_eq!(region.handle_state(), HandleState::Valid);

        region.intersect_with_rect(Rect::new(-10, -10, 60, 60));
        assert_eq!(region, RECT_A);
        assert_eq!(region.handle_state(), HandleState::Valid);
    }

    #[test]
    fn intersect_complex_covering_rect_is_a_noop() {
        let mut region = complex_ad();
        let snapshot = region.clone();
        region.intersect_with_rect(RECT_ABCD);
        assert_eq!(region, snapshot);
        assert_eq!(region.kind(), RegionKind::Complex);
        assert_eq!(region.handle_state(), HandleState::Valid);
    }

    #[test]
    fn intersect_complex_with_quadrant_collapses_to_simple() {
        let mut region = complex_ad();
        region.intersect_with_rect(RECT_D);
        assert_eq!(region.kind(), RegionKind::Simple);
        assert_eq!(region.bounding_box(), RECT_D);
    }

    #[test]
    fn intersect_complex_with_disjoint_complex_skips_the_engine() {
        let mut region = complex_ad();
        let mut far: Region = Region::from_rect(Rect::new(200, 200, 250, 250));
        far.union_with_rect(Rect::new(260, 260, 300, 300));
        assert_eq!(far.kind(), RegionKind::Complex);

        region.intersect_with(&far);
        assert!(region.is_empty());
    }

    #[test]
    fn intersect_complex_regions_keeps_overlap() {
        let mut region = complex_ad();
        let mut cross: Region = Region::from_rect(Rect::new(25, 25, 75, 75));
        cross.union_with_rect(Rect::new(200, 200, 300, 300));
        assert_eq!(cross.kind(), RegionKind::Complex);

        region.intersect_with(&cross);
        assert_eq!(region.kind(), RegionKind::Complex);
        assert_eq!(
            region.rects(),
            vec![Rect::new(25, 25, 50, 50), Rect::new(50, 50, 75, 75)]
        );
    }

    #[test]
    fn intersect_with_empty_region_clears() {
        let mut region = complex_ad();
        region.intersect_with(&Region::new());
        assert!(region.is_empty());
        // The handle survives as stale for reuse.
        assert_eq!(region.handle_state(), HandleState::Stale);
    }

    #[test]
    fn empty_region_ignores_intersection() {
        let mut region: Region = Region::new();
        region.intersect_with_rect(RECT_A);
        assert!(region.is_empty());
        region.intersect_with(&complex_ad());
        assert!(region.is_empty());
        assert_eq!(region.handle_state(), HandleState::NoHandle);
    }

    #[test]
    fn value_form_intersections_do_not_mutate() {
        let region = complex_ad();
        let clipped = region.intersect_rect(RECT_A);
        assert_eq!(clipped, RECT_A);
        assert_eq!(region, complex_ad());

        let mut other: Region = Region::from_rect(RECT_B);
        other.union_with_rect(RECT_C);
        let overlap = region.intersect(&other);
        assert!(overlap.is_empty());
        assert_eq!(other.bounding_box(), RECT_ABCD);
    }

    #[test]
    fn region_data_for_all_kinds() {
        let empty: Region = Region::new();
        let bytes = empty.region_data();
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert!(header_consistent(&bytes, 0, Rect::ZERO));

        let simple: Region = Region::from_rect(RECT_A);
        let bytes = simple.region_data();
        assert_eq!(bytes.len(), HEADER_SIZE + RECT_SIZE);
        assert!(header_consistent(&bytes, 1, RECT_A));
        assert_eq!(region_data::read_rect(&bytes, HEADER_SIZE), RECT_A);

        let complex = complex_ad();
        let bytes = complex.region_data();
        assert_eq!(bytes.len(), HEADER_SIZE + 2 * RECT_SIZE);
        assert!(header_consistent(&bytes, 2, RECT_ABCD));
        assert_eq!(region_data::read_rect(&bytes, HEADER_SIZE), RECT_A);
        assert_eq!(
            region_data::read_rect(&bytes, HEADER_SIZE + RECT_SIZE),
            RECT_D
        );
    }

    #[test]
    fn detach_then_attach_round_trips() {
        let mut region = complex_ad();
        let snapshot = region.clone();

        let handle = region.detach();
        assert!(region.is_empty());
        assert_eq!(region.handle_state(), HandleState::NoHandle);

        region.attach(handle);
        assert_eq!(region, snapshot);
        assert_eq!(region.handle_state(), HandleState::Valid);
    }

    #[test]
    fn detach_materializes_for_simple_and_empty_regions() {
        let mut simple: Region = Region::from_rect(RECT_A);
        let handle = simple.detach();
        assert!(simple.is_empty());
        let round: Region = Region::from_handle(handle);
        assert_eq!(round, RECT_A);

        let mut empty: Region = Region::new();
        let handle = empty.detach();
        let round: Region = Region::from_handle(handle);
        assert!(round.is_empty());
    }

    #[test]
    fn detach_copy_leaves_the_region_alone() {
        let region = complex_ad();
        let handle = region.detach_copy();
        assert_eq!(region, complex_ad());

        let copy: Region = Region::from_handle(handle);
        assert_eq!(copy, region);
    }

    #[test]
    fn from_handle_ref_borrows_without_consuming() {
        let donor = complex_ad();
        let handle = donor.detach_copy();

        let copy: Region = Region::from_handle_ref(&handle);
        assert_eq!(copy, donor);

        // The handle is still usable afterwards.
        let owner: Region = Region::from_handle(handle);
        assert_eq!(owner, donor);
    }

    #[test]
    fn malformed_handle_degrades_operations_to_empty() {
        let bad = malformed_handle();

        let borrowed: Region = Region::from_handle_ref(&bad);
        assert!(borrowed.is_empty());

        let attached: Region = Region::from_handle(malformed_handle());
        assert!(attached.is_empty());
        assert_eq!(attached.handle_state(), HandleState::NoHandle);

        let mut region: Region = Region::from_rect(RECT_A);
        region.union_with_handle(&bad);
        assert!(region.is_empty());

        let mut region: Region = Region::from_rect(RECT_A);
        region.intersect_with_handle(&bad);
        assert!(region.is_empty());

        let mut region = complex_ad();
        region.attach(malformed_handle());
        assert!(region.is_empty());
        assert_eq!(region.handle_state(), HandleState::NoHandle);
    }

    #[test]
    fn union_and_intersect_with_good_handles() {
        let donor = complex_ad();
        let handle = donor.detach_copy();

        let mut region: Region = Region::from_rect(RECT_B);
        region.union_with_handle(&handle);
        assert_eq!(region.kind(), RegionKind::Complex);
        assert_eq!(region.bounding_box(), RECT_ABCD);
        assert_eq!(region.rects(), vec![RECT_AB, RECT_D]);

        let mut region: Region = Region::from_rect(RECT_AB);
        region.intersect_with_handle(&handle);
        assert_eq!(region, RECT_A);

        let value = donor.union_handle(&handle);
        assert_eq!(value, donor);
        let value = donor.intersect_handle(&handle);
        assert_eq!(value, donor);
    }

    #[test]
    fn clear_keeps_the_handle_stale_for_reuse() {
        let mut region = complex_ad();
        assert_eq!(region.handle_state(), HandleState::Valid);

        region.clear();
        assert!(region.is_empty());
        assert_eq!(region.bounding_box(), Rect::ZERO);
        assert_eq!(region.handle_state(), HandleState::Stale);

        // Rebuilding a complex shape revalidates the retained handle.
        region.union_with_rect(RECT_A);
        region.union_with_rect(RECT_D);
        assert_eq!(region.kind(), RegionKind::Complex);
        assert_eq!(region.handle_state(), HandleState::Valid);
        assert_eq!(region.rects(), vec![RECT_A, RECT_D]);
    }

    #[test]
    fn take_moves_the_value_out() {
        let mut region = complex_ad();
        let snapshot = region.clone();

        let moved = region.take();
        assert_eq!(moved, snapshot);
        assert_eq!(moved.handle_state(), HandleState::Valid);
        assert!(region.is_empty());
        assert_eq!(region.handle_state(), HandleState::NoHandle);
    }

    #[test]
    fn clone_is_a_deep_logical_copy() {
        let original = complex_ad();
        let mut copy = original.clone();
        assert_eq!(copy, original);

        // Mutating the copy leaves the original alone.
        copy.union_with_rect(RECT_B);
        assert_ne!(copy, original);
        assert_eq!(original.rects(), vec![RECT_A, RECT_D]);
    }

    #[test]
    fn pair_constructors() {
        let merged: Region = Region::from_rects(RECT_A, RECT_B);
        assert_eq!(merged, RECT_AB);

        let diagonal: Region = Region::from_rects(RECT_A, RECT_D);
        assert_eq!(diagonal.kind(), RegionKind::Complex);
        assert_eq!(diagonal.rects(), vec![RECT_A, RECT_D]);

        let a: Region = Region::from_rect(RECT_A);
        let d: Region = Region::from_rect(RECT_D);
        let combined = Region::from_regions(&a, &d);
        assert_eq!(combined, diagonal);
    }
}
