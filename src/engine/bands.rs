//! Portable y-band boolean-region engine
//!
//! Shapes are kept in a canonical scanline form: bands sorted top to bottom,
//! each holding sorted, disjoint, non-touching x-spans, with adjacent bands
//! holding identical span lists coalesced into one. The canonical form makes
//! handle equality structural and decomposition order deterministic
//! (top-to-bottom, left-to-right), matching the convention native scanline
//! region engines use.

use std::cell::RefCell;

use crate::domain::core::{Rect, RegionKind};
use crate::engine::RegionEngine;

/// Horizontal run of covered pixels inside one band, `left..right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub left: i32,
    pub right: i32,
}

/// Horizontal strip `top..bottom` covered by one or more spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Band {
    pub top: i32,
    pub bottom: i32,
    pub spans: Vec<Span>,
}

/// An engine object holding one region's shape as a band list.
///
/// Handles produced by [`BandEngine`] are always in canonical form. A handle
/// built through [`BandHandle::from_raw_bands`] may not be; every engine
/// operation checks well-formedness first and treats a malformed handle the
/// way a native engine treats a bogus resource handle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BandHandle {
    bands: Vec<Band>,
}

impl BandHandle {
    /// Wraps a raw band list without validating it.
    ///
    /// This is the interop escape hatch: the resulting handle may be
    /// malformed, and engine operations will then report it as such.
    pub fn from_raw_bands(bands: Vec<Band>) -> Self {
        Self { bands }
    }

    /// Returns the classification of the shape this handle holds.
    pub fn kind(&self) -> RegionKind {
        match self.bands.as_slice() {
            [] => RegionKind::Empty,
            [band] if band.spans.len() == 1 => RegionKind::Simple,
            _ => RegionKind::Complex,
        }
    }

    /// Checks the canonical-form invariants: bands ordered and disjoint in
    /// y, spans ordered, positive, and non-touching in x, and no pair of
    /// touching bands with identical span lists.
    pub fn is_well_formed(&self) -> bool {
        let mut prev_bottom: Option<i32> = None;
        let mut prev_spans: Option<&[Span]> = None;
        for band in &self.bands {
            if band.top >= band.bottom || band.spans.is_empty() {
                return false;
            }
            if let Some(bottom) = prev_bottom {
                if band.top < bottom {
                    return false;
                }
                if band.top == bottom && prev_spans == Some(band.spans.as_slice()) {
                    return false;
                }
            }
            let mut prev_right: Option<i32> = None;
            for span in &band.spans {
                if span.left >= span.right {
                    return false;
                }
                if let Some(right) = prev_right {
                    if span.left <= right {
                        return false;
                    }
                }
                prev_right = Some(span.right);
            }
            prev_bottom = Some(band.bottom);
            prev_spans = Some(&band.spans);
        }
        true
    }
}

#[derive(Clone, Copy)]
enum CombineOp {
    Or,
    And,
}

/// Boolean-region engine backed by the in-crate band representation.
pub struct BandEngine;

thread_local! {
    // One scratch handle per thread, rewritten in place for each
    // rectangle-to-engine-object conversion.
    static SCRATCH: RefCell<BandHandle> = RefCell::new(BandHandle::default());
}

impl RegionEngine for BandEngine {
    type Handle = BandHandle;

    fn create_from_rect(rect: Rect) -> BandHandle {
        let mut handle = BandHandle::default();
        Self::set_rect(&mut handle, rect);
        handle
    }

    fn set_rect(handle: &mut BandHandle, rect: Rect) {
        handle.bands.clear();
        if !rect.is_empty() {
            handle.bands.push(Band {
                top: rect.top,
                bottom: rect.bottom,
                spans: vec![Span {
                    left: rect.left,
                    right: rect.right,
                }],
            });
        }
    }

    fn combine_or(dst: &mut BandHandle, src: &BandHandle) -> Option<RegionKind> {
        combine_into(dst, src, CombineOp::Or)
    }

    fn combine_and(dst: &mut BandHandle, src: &BandHandle) -> Option<RegionKind> {
        combine_into(dst, src, CombineOp::And)
    }

    fn bounds(handle: &BandHandle) -> Option<(RegionKind, Rect)> {
        if !handle.is_well_formed() {
            return None;
        }
        let (Some(first), Some(last)) = (handle.bands.first(), handle.bands.last()) else {
            return Some((RegionKind::Empty, Rect::ZERO));
        };
        let mut left = i32::MAX;
        let mut right = i32::MIN;
        for band in &handle.bands {
            // Spans are sorted, so the edges of the band are its first and
            // last span.
            if let (Some(a), Some(b)) = (band.spans.first(), band.spans.last()) {
                left = left.min(a.left);
                right = right.max(b.right);
            }
        }
        let rect = Rect::new(left, first.top, right, last.bottom);
        Some((handle.kind(), rect))
    }

    fn decompose(handle: &BandHandle) -> Option<Vec<Rect>> {
        if !handle.is_well_formed() {
            return None;
        }
        let mut rects = Vec::new();
        for band in &handle.bands {
            for span in &band.spans {
                rects.push(Rect::new(span.left, band.top, span.right, band.bottom));
            }
        }
        Some(rects)
    }

    fn equals(a: &BandHandle, b: &BandHandle) -> bool {
        // Canonical form makes structural equality exact shape equality.
        a.is_well_formed() && b.is_well_formed() && a.bands == b.bands
    }

    fn with_rect_handle<R>(rect: Rect, f: impl FnOnce(&BandHandle) -> R) -> R {
        SCRATCH.with(|cell| match cell.try_borrow_mut() {
            Ok(mut scratch) => {
                Self::set_rect(&mut scratch, rect);
                f(&scratch)
            }
            // Reentrant call while the scratch handle is in use: hand out a
            // fresh temporary instead of aliasing it.
            Err(_) => f(&Self::create_from_rect(rect)),
        })
    }
}

fn combine_into(dst: &mut BandHandle, src: &BandHandle, op: CombineOp) -> Option<RegionKind> {
    if !dst.is_well_formed() || !src.is_well_formed() {
        return None;
    }
    dst.bands = combine_bands(&dst.bands, &src.bands, op);
    Some(dst.kind())
}

/// Sweeps both band lists over their merged y-breakpoints and applies the
/// span-list operation per strip, re-coalescing adjacent strips that end up
/// with identical spans.
fn combine_bands(a: &[Band], b: &[Band], op: CombineOp) -> Vec<Band> {
    let mut ys: Vec<i32> = a
        .iter()
        .chain(b.iter())
        .flat_map(|band| [band.top, band.bottom])
        .collect();
    ys.sort_unstable();
    ys.dedup();

    let mut out: Vec<Band> = Vec::new();
    for pair in ys.windows(2) {
        let (top, bottom) = (pair[0], pair[1]);
        let spans_a = spans_at(a, top);
        let spans_b = spans_at(b, top);
        let spans = match op {
            CombineOp::Or => union_spans(spans_a, spans_b),
            CombineOp::And => intersect_spans(spans_a, spans_b),
        };
        if spans.is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.bottom == top && last.spans == spans => last.bottom = bottom,
            _ => out.push(Band { top, bottom, spans }),
        }
    }
    out
}

/// Returns the spans of the band covering scanline `y`, if any.
///
/// Strips are cut at every band edge, so a band either covers the whole
/// strip starting at `y` or none of it.
fn spans_at(bands: &[Band], y: i32) -> &[Span] {
    bands
        .iter()
        .find(|band| band.top <= y && y < band.bottom)
        .map(|band| band.spans.as_slice())
        .unwrap_or(&[])
}

fn union_spans(a: &[Span], b: &[Span]) -> Vec<Span> {
    let mut out: Vec<Span> = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() || j < b.len() {
        let next = if j == b.len() || (i < a.len() && a[i].left <= b[j].left) {
            let span = a[i];
            i += 1;
            span
        } else {
            let span = b[j];
            j += 1;
            span
        };
        match out.last_mut() {
            // Touching spans coalesce into one.
            Some(last) if next.left <= last.right => last.right = last.right.max(next.right),
            _ => out.push(next),
        }
    }
    out
}

fn intersect_spans(a: &[Span], b: &[Span]) -> Vec<Span> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let left = a[i].left.max(b[j].left);
        let right = a[i].right.min(b[j].right);
        if left < right {
            out.push(Span { left, right });
        }
        if a[i].right < b[j].right {
            i += 1;
        } else {
            j += 1;
        }
    }
    out
}
