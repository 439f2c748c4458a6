//! Fixed-Point 2D Vector
//!
//! Deterministic 2D vector operations for game physics.
//! All operations use fixed-point arithmetic. Screen coordinates:
//! +x is right, +y is down.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

use super::fixed::{fixed_clamp, fixed_div, fixed_mul, fixed_sqrt, Fixed, FIXED_ONE};

/// 2D vector with fixed-point components.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FixedVec2 {
    /// X component (Q16.16 fixed-point)
    pub x: Fixed,
    /// Y component (Q16.16 fixed-point)
    pub y: Fixed,
}

impl FixedVec2 {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Unit vector pointing right (+X)
    pub const RIGHT: Self = Self { x: FIXED_ONE, y: 0 };

    /// Unit vector pointing down (+Y, screen coordinates)
    pub const DOWN: Self = Self { x: 0, y: FIXED_ONE };

    /// Create a new vector from fixed-point components.
    #[inline]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create a vector from integer components.
    #[inline]
    pub const fn from_ints(x: i32, y: i32) -> Self {
        Self {
            x: x << super::fixed::FIXED_SCALE,
            y: y << super::fixed::FIXED_SCALE,
        }
    }

    /// Add another vector.
    #[inline]
    pub fn add(self, other: Self) -> Self {
        Self {
            x: self.x.wrapping_add(other.x),
            y: self.y.wrapping_add(other.y),
        }
    }

    /// Subtract another vector.
    #[inline]
    pub fn sub(self, other: Self) -> Self {
        Self {
            x: self.x.wrapping_sub(other.x),
            y: self.y.wrapping_sub(other.y),
        }
    }

    /// Scale by a fixed-point scalar.
    #[inline]
    pub fn scale(self, scalar: Fixed) -> Self {
        Self {
            x: fixed_mul(self.x, scalar),
            y: fixed_mul(self.y, scalar),
        }
    }

    /// Divide by a fixed-point scalar.
    #[inline]
    pub fn div_scalar(self, scalar: Fixed) -> Self {
        Self {
            x: fixed_div(self.x, scalar),
            y: fixed_div(self.y, scalar),
        }
    }

    /// Squared length (avoids sqrt - prefer this for comparisons).
    #[inline]
    pub fn length_squared(self) -> Fixed {
        fixed_mul(self.x, self.x).wrapping_add(fixed_mul(self.y, self.y))
    }

    /// Length (magnitude). Prefer `length_squared` when possible.
    #[inline]
    pub fn length(self) -> Fixed {
        fixed_sqrt(self.length_squared())
    }

    /// Squared distance to another point.
    #[inline]
    pub fn distance_squared(self, other: Self) -> Fixed {
        let dx = self.x.wrapping_sub(other.x);
        let dy = self.y.wrapping_sub(other.y);
        fixed_mul(dx, dx).wrapping_add(fixed_mul(dy, dy))
    }

    /// Distance to another point. Prefer `distance_squared` when possible.
    #[inline]
    pub fn distance(self, other: Self) -> Fixed {
        fixed_sqrt(self.distance_squared(other))
    }

    /// Normalize to unit length.
    /// Returns ZERO if length is zero.
    #[inline]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == 0 {
            return Self::ZERO;
        }
        self.div_scalar(len)
    }

    /// Dot product with another vector.
    #[inline]
    pub fn dot(self, other: Self) -> Fixed {
        fixed_mul(self.x, other.x).wrapping_add(fixed_mul(self.y, other.y))
    }

    /// Clamp both components to a range.
    #[inline]
    pub fn clamp(self, min: Fixed, max: Fixed) -> Self {
        Self {
            x: fixed_clamp(self.x, min, max),
            y: fixed_clamp(self.y, min, max),
        }
    }

    /// Linear interpolation between two vectors.
    /// t = 0 returns self, t = FIXED_ONE returns other.
    #[inline]
    pub fn lerp(self, other: Self, t: Fixed) -> Self {
        let dx = other.x.wrapping_sub(self.x);
        let dy = other.y.wrapping_sub(self.y);
        Self {
            x: self.x.wrapping_add(fixed_mul(dx, t)),
            y: self.y.wrapping_add(fixed_mul(dy, t)),
        }
    }

    /// Negate both components.
    #[inline]
    pub fn negate(self) -> Self {
        Self {
            x: self.x.wrapping_neg(),
            y: self.y.wrapping_neg(),
        }
    }

    /// Convert to float tuple for logging/collaborator layers.
    #[inline]
    pub fn to_floats(self) -> (f32, f32) {
        (
            self.x as f32 / FIXED_ONE as f32,
            self.y as f32 / FIXED_ONE as f32,
        )
    }
}

// Operator overloads for ergonomics
impl Add for FixedVec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.add(rhs)
    }
}

impl Sub for FixedVec2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.sub(rhs)
    }
}

impl Neg for FixedVec2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        self.negate()
    }
}

impl fmt::Debug for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (fx, fy) = self.to_floats();
        write!(f, "Vec2({:.3}, {:.3})", fx, fy)
    }
}

impl fmt::Display for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (fx, fy) = self.to_floats();
        write!(f, "({:.3}, {:.3})", fx, fy)
    }
}

// =============================================================================
// TESTS
// =============================================================================
