//! Axis-aligned rectangles and the overlap math shared by the region mergers.

use serde::{Deserialize, Serialize};

/// Integer rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    #[inline]
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// True when the closed boxes touch or overlap.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        intersect_rect(
            self.x,
            self.y,
            self.right(),
            self.bottom(),
            other.x,
            other.y,
            other.right(),
            other.bottom(),
        )
    }

    /// Area of the intersection, zero when the boxes are disjoint or only touch.
    pub fn overlap_area(&self, other: &Rect) -> i64 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        if x2 <= x1 || y2 <= y1 {
            return 0;
        }
        (x2 - x1) as i64 * (y2 - y1) as i64
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        Rect::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Overlap relative to each box, scaled by the area ratio:
    /// `(overlap / (a1 * a1/a2), overlap / (a2 * a1/a2))`.
    ///
    /// `None` when either box has zero area.
    pub fn overlap_ratios(&self, other: &Rect) -> Option<(f64, f64)> {
        let a1 = self.area() as f64;
        let a2 = other.area() as f64;
        if a1 <= 0.0 || a2 <= 0.0 {
            return None;
        }
        let overlap = self.overlap_area(other) as f64;
        let ratio = a1 / a2;
        Some((overlap / (a1 * ratio), overlap / (a2 * ratio)))
    }

    /// Map from a working resolution back to the source resolution.
    ///
    /// Non-positive and NaN factors leave the rectangle unchanged.
    pub fn unscale(&self, scale: f32) -> Rect {
        if !(scale > 0.0) || scale == 1.0 {
            return *self;
        }
        let s = scale as f64;
        Rect::new(
            (self.x as f64 / s).round() as i32,
            (self.y as f64 / s).round() as i32,
            (self.width as f64 / s).round() as i32,
            (self.height as f64 / s).round() as i32,
        )
    }
}

/// A merged detection: averaged rectangle plus the number of raw hits behind it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(flatten)]
    pub rect: Rect,
    pub total: u32,
}

/// Intersection test on two boxes given by their corners `(x0,y0)-(x1,y1)`
/// and `(x2,y2)-(x3,y3)`. Touching edges count as intersecting.
#[allow(clippy::too_many_arguments)]
#[inline]
pub fn intersect_rect(
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    x3: i32,
    y3: i32,
) -> bool {
    !(x2 > x1 || x3 < x0 || y2 > y1 || y3 < y0)
}
