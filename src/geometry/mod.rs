//! Screen geometry.
//!
//! Regions of the raid screen are described declaratively relative to the
//! screenshot size and resolved to concrete pixel rectangles on demand.

pub mod region;

pub use region::{resolve, Axis, Bound, Rect, Region, RegionError};
