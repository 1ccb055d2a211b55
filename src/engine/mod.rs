//! Boolean-region engines
//!
//! The region value type stays in the cheap rectangle domain whenever it can
//! and calls through the narrow [`RegionEngine`] contract only when a shape
//! genuinely needs a general rectangle-union representation. The portable
//! [`bands::BandEngine`] implements that contract everywhere; on Windows,
//! [`gdi::GdiEngine`] binds the same contract to native GDI regions.

pub mod bands;
#[cfg(windows)]
pub mod gdi;

use crate::domain::core::{Rect, RegionKind};

/// Contract a boolean-region engine must provide to back complex regions.
///
/// A handle is an opaque, exclusively owned engine object holding one
/// region's authoritative shape. Operations that can receive an externally
/// supplied handle report a malformed one by returning `None`; a malformed
/// handle is never an error, the caller degrades the affected region to
/// empty instead.
pub trait RegionEngine {
    /// Opaque engine object owning one region's shape. Dropping the handle
    /// releases the engine resource.
    type Handle: 'static;

    /// Creates a new handle holding exactly `rect`.
    fn create_from_rect(rect: Rect) -> Self::Handle;

    /// Rewrites an existing handle to hold exactly `rect`, reusing its
    /// allocation. This is how a stale handle is refreshed in place instead
    /// of being released and recreated.
    fn set_rect(handle: &mut Self::Handle, rect: Rect);

    /// Combines `src` into `dst` with logical OR, mutating `dst` in place.
    ///
    /// The returned kind reports whether the combined shape collapsed to
    /// empty or a single rectangle. Returns `None` if either handle is
    /// malformed, leaving `dst` in an unspecified but releasable state.
    fn combine_or(dst: &mut Self::Handle, src: &Self::Handle) -> Option<RegionKind>;

    /// Combines `src` into `dst` with logical AND, mutating `dst` in place.
    ///
    /// Same contract as [`RegionEngine::combine_or`].
    fn combine_and(dst: &mut Self::Handle, src: &Self::Handle) -> Option<RegionKind>;

    /// Returns the handle's kind and tightest bounding rectangle, or `None`
    /// for a malformed handle. An empty handle reports the zero rectangle.
    fn bounds(handle: &Self::Handle) -> Option<(RegionKind, Rect)>;

    /// Returns the rectangles reconstructing the handle's covered area, or
    /// `None` for a malformed handle.
    ///
    /// The order is engine-defined but deterministic for identical handles.
    fn decompose(handle: &Self::Handle) -> Option<Vec<Rect>>;

    /// Exact-shape equality of two handles. A malformed handle equals
    /// nothing.
    fn equals(a: &Self::Handle, b: &Self::Handle) -> bool;

    /// Runs `f` against a scratch handle holding exactly `rect`.
    ///
    /// The scratch handle converts a bare rectangle into an engine object
    /// for combine calls without allocating a fresh handle every time. It is
    /// confined to the calling thread; a reentrant call must receive a
    /// separate temporary rather than an aliased scratch object.
    fn with_rect_handle<R>(rect: Rect, f: impl FnOnce(&Self::Handle) -> R) -> R;
}
