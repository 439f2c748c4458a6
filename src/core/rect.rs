//! Fixed-Point Axis-Aligned Rectangle
//!
//! Collision geometry for the sweep and resolution passes. A rectangle is
//! a top-left corner plus a size; screen coordinates, +y down.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::fixed::{fixed_max, fixed_min, Fixed};
use super::vec2::FixedVec2;

/// Axis-aligned rectangle with fixed-point corner and size.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FixedRect {
    /// Top-left corner
    pub pos: FixedVec2,
    /// Width (x) and height (y); both non-negative by construction
    pub size: FixedVec2,
}

/// Axis of the smaller overlap between two intersecting rectangles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Correct along x
    Horizontal,
    /// Correct along y
    Vertical,
}

impl FixedRect {
    /// Create a rectangle from corner and size.
    #[inline]
    pub const fn new(pos: FixedVec2, size: FixedVec2) -> Self {
        Self { pos, size }
    }

    /// Create from individual components.
    #[inline]
    pub const fn from_parts(x: Fixed, y: Fixed, w: Fixed, h: Fixed) -> Self {
        Self {
            pos: FixedVec2::new(x, y),
            size: FixedVec2::new(w, h),
        }
    }

    /// Left edge x.
    #[inline]
    pub fn left(&self) -> Fixed {
        self.pos.x
    }

    /// Right edge x.
    #[inline]
    pub fn right(&self) -> Fixed {
        self.pos.x.wrapping_add(self.size.x)
    }

    /// Top edge y (smaller y, screen coordinates).
    #[inline]
    pub fn top(&self) -> Fixed {
        self.pos.y
    }

    /// Bottom edge y (larger y).
    #[inline]
    pub fn bottom(&self) -> Fixed {
        self.pos.y.wrapping_add(self.size.y)
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> FixedVec2 {
        FixedVec2::new(
            self.pos.x.wrapping_add(self.size.x >> 1),
            self.pos.y.wrapping_add(self.size.y >> 1),
        )
    }

    /// Translate by an offset.
    #[inline]
    pub fn translated(&self, offset: FixedVec2) -> Self {
        Self {
            pos: self.pos.add(offset),
            size: self.size,
        }
    }

    /// Point containment test (edges inclusive on top/left, exclusive
    /// on bottom/right, matching the intersection test).
    #[inline]
    pub fn contains_point(&self, point: FixedVec2) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }

    /// Strict overlap test. Touching edges do not intersect.
    #[inline]
    pub fn intersects(&self, other: &FixedRect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Overlap region, if any.
    pub fn intersection(&self, other: &FixedRect) -> Option<FixedRect> {
        if !self.intersects(other) {
            return None;
        }
        let left = fixed_max(self.left(), other.left());
        let top = fixed_max(self.top(), other.top());
        let right = fixed_min(self.right(), other.right());
        let bottom = fixed_min(self.bottom(), other.bottom());
        Some(FixedRect::from_parts(
            left,
            top,
            right.wrapping_sub(left),
            bottom.wrapping_sub(top),
        ))
    }

    /// Penetration depths along both axes for two intersecting rects.
    /// Returns `None` when the rects do not overlap.
    pub fn penetration(&self, other: &FixedRect) -> Option<FixedVec2> {
        let overlap = self.intersection(other)?;
        Some(overlap.size)
    }

    /// Smallest push-out vector that moves `self` out of `other`.
    ///
    /// The correction is along the axis with the smaller overlap; its sign
    /// points away from `other`'s center. Returns `None` without overlap.
    pub fn push_out(&self, other: &FixedRect) -> Option<(FixedVec2, Axis)> {
        let overlap = self.intersection(other)?;
        let self_center = self.center();
        let other_center = other.center();

        if overlap.size.x < overlap.size.y {
            let dx = if self_center.x < other_center.x {
                overlap.size.x.wrapping_neg()
            } else {
                overlap.size.x
            };
            Some((FixedVec2::new(dx, 0), Axis::Horizontal))
        } else {
            let dy = if self_center.y < other_center.y {
                overlap.size.y.wrapping_neg()
            } else {
                overlap.size.y
            };
            Some((FixedVec2::new(0, dy), Axis::Vertical))
        }
    }
}

impl fmt::Debug for FixedRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y) = self.pos.to_floats();
        let (w, h) = self.size.to_floats();
        write!(f, "Rect({:.3}, {:.3}, {:.3}x{:.3})", x, y, w, h)
    }
}

// =============================================================================
// TESTS
// =============================================================================
