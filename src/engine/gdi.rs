//! GDI-backed boolean-region engine
//!
//! Binds the [`RegionEngine`] contract to native Win32 `HRGN` objects. GDI
//! reports a bogus handle through `RGN_ERROR` style return values rather
//! than errors, which maps directly onto the contract's `None` results.

use std::cell::RefCell;

use windows::Win32::Foundation::RECT;
use windows::Win32::Graphics::Gdi::{
    COMPLEXREGION, CombineRgn, CreateRectRgn, DeleteObject, EqualRgn, GetRegionData, GetRgnBox,
    HRGN, NULLREGION, RGN_AND, RGN_OR, RGNDATA, SIMPLEREGION, SetRectRgn,
};

use crate::domain::core::{Rect, RegionKind};
use crate::domain::region_data::{self, HEADER_SIZE, RECT_SIZE, RegionDataHeader};
use crate::engine::RegionEngine;

/// Owned GDI region handle, released on drop.
pub struct GdiHandle(HRGN);

impl GdiHandle {
    /// Wraps a raw `HRGN`, taking ownership of it.
    pub fn from_raw(hrgn: HRGN) -> Self {
        Self(hrgn)
    }

    /// Returns the raw `HRGN` without giving up ownership.
    pub fn as_raw(&self) -> HRGN {
        self.0
    }

    /// Releases ownership of the raw `HRGN`; the caller must delete it.
    pub fn into_raw(self) -> HRGN {
        let hrgn = self.0;
        std::mem::forget(self);
        hrgn
    }
}

impl Drop for GdiHandle {
    fn drop(&mut self) {
        if !self.0.is_invalid() {
            let _ = unsafe { DeleteObject(self.0) };
        }
    }
}

fn win32_rect(rect: Rect) -> RECT {
    RECT {
        left: rect.left,
        top: rect.top,
        right: rect.right,
        bottom: rect.bottom,
    }
}

fn domain_rect(rect: &RECT) -> Rect {
    Rect {
        left: rect.left,
        top: rect.top,
        right: rect.right,
        bottom: rect.bottom,
    }
}

/// Maps a GDI region-type return value onto a region kind.
///
/// `RGN_ERROR` (and anything else out of range) means the call received a
/// bogus handle.
fn kind_from_gdi(value: i32) -> Option<RegionKind> {
    match value {
        v if v == NULLREGION.0 => Some(RegionKind::Empty),
        v if v == SIMPLEREGION.0 => Some(RegionKind::Simple),
        v if v == COMPLEXREGION.0 => Some(RegionKind::Complex),
        _ => None,
    }
}

/// Boolean-region engine backed by Win32 GDI regions.
pub struct GdiEngine;

thread_local! {
    // One scratch HRGN per thread for rectangle-to-region conversion,
    // mirroring the classic TLS temp-region pattern.
    static SCRATCH: RefCell<Option<GdiHandle>> = const { RefCell::new(None) };
}

impl RegionEngine for GdiEngine {
    type Handle = GdiHandle;

    fn create_from_rect(rect: Rect) -> GdiHandle {
        let rc = win32_rect(rect);
        GdiHandle(unsafe { CreateRectRgn(rc.left, rc.top, rc.right, rc.bottom) })
    }

    fn set_rect(handle: &mut GdiHandle, rect: Rect) {
        let rc = win32_rect(rect);
        let _ = unsafe { SetRectRgn(handle.0, rc.left, rc.top, rc.right, rc.bottom) };
    }

    fn combine_or(dst: &mut GdiHandle, src: &GdiHandle) -> Option<RegionKind> {
        kind_from_gdi(unsafe { CombineRgn(dst.0, dst.0, src.0, RGN_OR) }.0)
    }

    fn combine_and(dst: &mut GdiHandle, src: &GdiHandle) -> Option<RegionKind> {
        kind_from_gdi(unsafe { CombineRgn(dst.0, dst.0, src.0, RGN_AND) }.0)
    }

    fn bounds(handle: &GdiHandle) -> Option<(RegionKind, Rect)> {
        let mut rc = RECT::default();
        let kind = kind_from_gdi(unsafe { GetRgnBox(handle.0, &mut rc) }.0)?;
        Some((kind, domain_rect(&rc)))
    }

    fn decompose(handle: &GdiHandle) -> Option<Vec<Rect>> {
        let size = unsafe { GetRegionData(handle.0, 0, None) };
        if size == 0 {
            return None;
        }
        let mut buffer = vec![0u8; size as usize];
        let written = unsafe {
            GetRegionData(
                handle.0,
                size,
                Some(buffer.as_mut_ptr() as *mut RGNDATA),
            )
        };
        if written == 0 {
            return None;
        }
        // RGNDATAHEADER and the crate's serialized header share one layout,
        // so the buffer can be validated with the same contract.
        let header = RegionDataHeader::parse(&buffer).ok()?;
        let mut rects = Vec::with_capacity(header.count as usize);
        for index in 0..header.count as usize {
            rects.push(region_data::read_rect(&buffer, HEADER_SIZE + index * RECT_SIZE));
        }
        Some(rects)
    }

    fn equals(a: &GdiHandle, b: &GdiHandle) -> bool {
        unsafe { EqualRgn(a.0, b.0) }.as_bool()
    }

    fn with_rect_handle<R>(rect: Rect, f: impl FnOnce(&GdiHandle) -> R) -> R {
        SCRATCH.with(|cell| match cell.try_borrow_mut() {
            Ok(mut slot) => {
                let handle = slot.get_or_insert_with(|| Self::create_from_rect(rect));
                Self::set_rect(handle, rect);
                f(handle)
            }
            // Reentrant call while the scratch region is in use: hand out a
            // fresh temporary instead of aliasing it.
            Err(_) => f(&Self::create_from_rect(rect)),
        })
    }
}
