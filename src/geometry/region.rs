//! Region descriptors and their resolution into pixel rectangles.
//!
//! Each axis of a [`Region`] is either a window centered on the axis or an
//! explicit pair of bounds. Bounds can be fractions of the axis length or
//! absolute pixel offsets; negative values of either kind count back from the
//! far edge of the axis.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Axis-aligned pixel rectangle, half-open: `[x0, x1) × [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Rect {
    /// Builds a rectangle from its top-left and bottom-right corners.
    pub fn new(top_left: (u32, u32), bottom_right: (u32, u32)) -> Self {
        Self {
            x0: top_left.0,
            y0: top_left.1,
            x1: bottom_right.0,
            y1: bottom_right.1,
        }
    }

    pub fn top_left(&self) -> (u32, u32) {
        (self.x0, self.y0)
    }

    pub fn bottom_right(&self) -> (u32, u32) {
        (self.x1, self.y1)
    }

    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Moves a rectangle expressed in the coordinates of `self` back into
    /// the coordinates of the image `self` was cut from.
    pub fn translate_from(&self, inner: Rect) -> Rect {
        Rect {
            x0: self.x0 + inner.x0,
            y0: self.y0 + inner.y0,
            x1: self.x0 + inner.x1,
            y1: self.y0 + inner.y1,
        }
    }
}

/// One end of an explicit axis span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    /// Fraction of the axis length, in `[-1, 1]`.
    Fraction(f64),
    /// Absolute pixel offset.
    Pixels(i32),
}

impl From<f64> for Bound {
    fn from(v: f64) -> Self {
        Bound::Fraction(v)
    }
}

impl From<i32> for Bound {
    fn from(v: i32) -> Self {
        Bound::Pixels(v)
    }
}

/// Descriptor of one axis of a region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Axis {
    /// Window centered on the axis, sized as a fraction of the axis or in pixels.
    Centered(Bound),
    /// Explicit low and high bounds.
    Bounds(Bound, Bound),
}

impl From<f64> for Axis {
    fn from(v: f64) -> Self {
        Axis::Centered(Bound::Fraction(v))
    }
}

impl From<i32> for Axis {
    fn from(v: i32) -> Self {
        Axis::Centered(Bound::Pixels(v))
    }
}

impl<A: Into<Bound>, B: Into<Bound>> From<(A, B)> for Axis {
    fn from((lo, hi): (A, B)) -> Self {
        Axis::Bounds(lo.into(), hi.into())
    }
}

/// Declarative two-dimensional region of a screenshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x: Axis,
    pub y: Axis,
}

impl Region {
    /// `Region::new(0.35, (0.15, 0.29))` is a centered 35% wide band between
    /// 15% and 29% of the height.
    pub fn new(x: impl Into<Axis>, y: impl Into<Axis>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    #[error("region is inverted on the {axis} axis ({lo} > {hi})")]
    Inverted { axis: char, lo: u32, hi: u32 },
}

/// Resolves `region` against an image of `size` (width, height).
///
/// Both corners are clipped to the image. A rectangle whose low corner ends
/// up past its high corner is a misconfigured descriptor.
pub fn resolve(size: (u32, u32), region: &Region) -> Result<Rect, RegionError> {
    let (x0, x1) = resolve_axis(&region.x, size.0, 'x')?;
    let (y0, y1) = resolve_axis(&region.y, size.1, 'y')?;
    Ok(Rect { x0, y0, x1, y1 })
}

fn resolve_axis(axis: &Axis, size: u32, name: char) -> Result<(u32, u32), RegionError> {
    let s = size as f64;

    let (lo, hi) = match *axis {
        Axis::Centered(Bound::Pixels(n)) => {
            let half = n.unsigned_abs() as f64 / 2.0;
            (round(s / 2.0 - half - 1.0), round(s / 2.0 + half - 1.0))
        }
        Axis::Centered(Bound::Fraction(f)) => {
            let mid = (s - 1.0) / 2.0;
            let half = f.abs() * (s - 1.0) / 2.0;
            (round(mid - half), round(mid + half))
        }
        Axis::Bounds(lo, hi) => (resolve_bound(lo, size), resolve_bound(hi, size)),
    };

    let lo = clip(lo, size);
    let hi = clip(hi, size);

    if lo > hi {
        return Err(RegionError::Inverted { axis: name, lo, hi });
    }

    Ok((lo, hi))
}

fn resolve_bound(bound: Bound, size: u32) -> i64 {
    let v = match bound {
        Bound::Fraction(f) => round((size as f64 - 1.0) * f),
        Bound::Pixels(p) => p as i64,
    };
    if v < 0 { v + size as i64 } else { v }
}

fn round(v: f64) -> i64 {
    v.round_ties_even() as i64
}

fn clip(v: i64, size: u32) -> u32 {
    v.clamp(0, size as i64) as u32
}
