//! Hybrid rectangle/region value type for clip-area and dirty-rect tracking.
//!
//! A [`Region`] represents an arbitrary union of axis-aligned rectangles but
//! avoids the cost of a general boolean-region engine for the common cases:
//! an empty region or a single rectangle is tracked as a tagged bounding box,
//! and rectangle fast-merge heuristics keep unions in that cheap domain
//! wherever possible. Only genuinely complex shapes are backed by an engine
//! handle, which is retained and reused across transitions back to the
//! rectangle domain.
//!
//! The engine behind complex shapes is pluggable through [`RegionEngine`].
//! [`BandEngine`] is the portable default; on Windows the same contract can
//! be bound to native GDI regions via `engine::gdi::GdiEngine`.

pub mod domain;
pub mod engine;

pub use domain::core::{Rect, RegionKind};
pub use domain::region::{HandleState, Region};
pub use engine::RegionEngine;
pub use engine::bands::BandEngine;
#[cfg(windows)]
pub use engine::gdi::GdiEngine;
