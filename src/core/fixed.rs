//! Q16.16 Fixed-Point Arithmetic
//!
//! Deterministic fixed-point math for gameplay simulation.
//! All operations use integer arithmetic only - no floats in gameplay logic.
//!
//! ## Format: Q16.16
//!
//! 32-bit signed integer, 16 bits integer part, 16 bits fractional part.
//! Range roughly -32768.0 to +32767.99998, precision 1/65536. A level is
//! at most a few thousand units wide, so the range is comfortable.
//!
//! Coordinates are screen-style: y grows downward, gravity is a positive
//! y acceleration.

/// Q16.16 fixed-point number stored as i32.
/// 16 bits integer, 16 bits fractional.
pub type Fixed = i32;

/// Number of fractional bits (16)
pub const FIXED_SCALE: i32 = 16;

/// 1.0 in fixed-point (65536)
pub const FIXED_ONE: Fixed = 1 << FIXED_SCALE;

/// 0.5 in fixed-point (32768)
pub const FIXED_HALF: Fixed = FIXED_ONE >> 1;

/// Maximum positive value
pub const FIXED_MAX: Fixed = i32::MAX;

/// Minimum negative value
pub const FIXED_MIN: Fixed = i32::MIN;

// =============================================================================
// GAMEPLAY CONSTANTS (All as integer literals - NO float conversion!)
// =============================================================================

/// Frame duration: 1/60 second = round(65536/60) = 1092
pub const FRAME_DT: Fixed = 1092;

/// Gravity acceleration: 30.0 units/sec^2 (y grows downward)
pub const GRAVITY: Fixed = 1966080;

/// Terminal fall speed: 18.0 units/sec
pub const MAX_FALL_VELOCITY: Fixed = 1179648;

/// Player run speed: 6.0 units/sec
pub const PLAYER_RUN_SPEED: Fixed = 393216;

/// Player jump velocity: 12.0 units/sec upward
pub const PLAYER_JUMP_VELOCITY: Fixed = 786432;

/// Upward velocity a ball gets when it bounces off massive terrain: 10.0
pub const BALL_BOUNCE_VELOCITY: Fixed = 655360;

/// Vertical-speed threshold below which a ball hitting terrain is
/// destroyed instead of bounced: 0.35 units/sec
pub const BALL_VERTICAL_EPS: Fixed = 22937;

/// How far a bumped box rises before settling: 0.4 units
pub const BOX_BUMP_HEIGHT: Fixed = 26214;

/// Speed of the box bump animation: 3.0 units/sec
pub const BOX_BUMP_SPEED: Fixed = 196608;

/// Minimum spin-box spin time: 5.0 seconds
pub const SPIN_MIN_SECONDS: Fixed = 327680;

/// Fixed extension added whenever a spin box finds a blocker still
/// overlapping at spin end: 2.0 seconds
pub const SPIN_EXTENSION_SECONDS: Fixed = 131072;

/// Interval between cosmetic ball particle emissions: 0.1 seconds
pub const BALL_PARTICLE_INTERVAL: Fixed = 6553;

/// Default editor snap distance: 0.5 units
pub const SNAP_DISTANCE: Fixed = 32768;

// =============================================================================
// CORE OPERATIONS (All deterministic, wrapping semantics)
// =============================================================================

/// Convert a compile-time float to fixed-point.
///
/// # Warning
/// Only use at compile-time or initialization. NEVER in the frame loop.
///
/// # Example
/// ```
/// use ridge_runner::core::fixed::{to_fixed, FIXED_ONE};
/// const MY_VALUE: i32 = to_fixed(2.5);
/// assert_eq!(MY_VALUE, FIXED_ONE * 2 + FIXED_ONE / 2);
/// ```
#[inline]
pub const fn to_fixed(f: f64) -> Fixed {
    (f * (FIXED_ONE as f64)) as Fixed
}

/// Convert fixed-point to float for display/logging.
///
/// # Warning
/// Only use for output. NEVER use the result in game logic.
#[inline]
pub fn to_float(f: Fixed) -> f32 {
    f as f32 / FIXED_ONE as f32
}

/// Multiply two fixed-point numbers.
///
/// Uses i64 intermediate to prevent overflow, then truncates.
#[inline]
pub fn fixed_mul(a: Fixed, b: Fixed) -> Fixed {
    let wide = (a as i64) * (b as i64);
    (wide >> FIXED_SCALE) as Fixed
}

/// Divide two fixed-point numbers.
///
/// Pre-shifts the numerator to maintain precision.
/// Returns 0 on divide-by-zero (deterministic, never panics).
#[inline]
pub fn fixed_div(a: Fixed, b: Fixed) -> Fixed {
    if b == 0 {
        return 0;
    }
    let wide = (a as i64) << FIXED_SCALE;
    (wide / b as i64) as Fixed
}

/// Square root using Newton-Raphson iteration.
///
/// Returns 0 for non-positive inputs. Uses exactly 6 iterations so every
/// platform computes the same result.
#[inline]
pub fn fixed_sqrt(x: Fixed) -> Fixed {
    if x <= 0 {
        return 0;
    }

    let mut guess = (x >> 1).max(1);

    // guess = (guess + x/guess) / 2, fixed iteration count
    for _ in 0..6 {
        let div = fixed_div(x, guess);
        guess = (guess.wrapping_add(div)) >> 1;

        if guess == 0 {
            guess = 1;
        }
    }

    guess
}

/// Absolute value of a fixed-point number.
#[inline]
pub fn fixed_abs(x: Fixed) -> Fixed {
    if x < 0 { x.wrapping_neg() } else { x }
}

/// Minimum of two fixed-point numbers.
#[inline]
pub fn fixed_min(a: Fixed, b: Fixed) -> Fixed {
    if a < b { a } else { b }
}

/// Maximum of two fixed-point numbers.
#[inline]
pub fn fixed_max(a: Fixed, b: Fixed) -> Fixed {
    if a > b { a } else { b }
}

/// Clamp a fixed-point number to a range.
#[inline]
pub fn fixed_clamp(value: Fixed, min: Fixed, max: Fixed) -> Fixed {
    fixed_max(min, fixed_min(max, value))
}

/// Linear interpolation: a + (b - a) * t
/// where t is in fixed-point (0.0 = 0, 1.0 = FIXED_ONE)
#[inline]
pub fn fixed_lerp(a: Fixed, b: Fixed, t: Fixed) -> Fixed {
    let diff = b.wrapping_sub(a);
    a.wrapping_add(fixed_mul(diff, t))
}

// =============================================================================
// TESTS
// =============================================================================
