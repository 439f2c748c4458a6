//! Collision Model
//!
//! Pure pairwise validation plus a sweep/resolve pass. Validation is a
//! total function over sprite classes with no side effects, so the
//! editor can ask "would these touch?" without running the game; the
//! resolve step applies the smallest single-axis correction and zeroes
//! the blocked velocity component.

use serde::{Deserialize, Serialize};

use crate::core::fixed::{fixed_abs, fixed_mul, Fixed, FRAME_DT};
use crate::core::rect::Axis;
use crate::game::boxes::{BoxData, InvisibleMode};
use crate::game::sprite::{ArrayKind, Category, Sprite, SpriteId, SpriteKind, SpriteManager};

// =============================================================================
// TYPES
// =============================================================================

/// Outcome of pairwise collision validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionCheck {
    /// This pair of classes can never collide; no overlap test needed
    NotPossible,
    /// The pair could collide but does not right now
    NotValid,
    /// Overlap is reported to handlers but never blocks movement
    Internal,
    /// Overlap blocks movement and gets a positional correction
    Blocking,
}

/// Which side of the mover made contact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionDirection {
    /// Contact on the mover's left side
    Left,
    /// Contact on the mover's right side
    Right,
    /// Contact above the mover
    Up,
    /// Contact below the mover
    Down,
}

/// One detected contact, recorded before any handler runs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionEvent {
    /// The moving sprite
    pub this: SpriteId,
    /// The sprite it touched
    pub other: SpriteId,
    /// Validation outcome (always `Internal` or `Blocking` here)
    pub check: CollisionCheck,
    /// Dispatch category of the partner
    pub other_category: Category,
    /// Contact side from the mover's perspective
    pub direction: CollisionDirection,
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Pairwise collision validation: what would happen if `this` touched
/// `other`? Pure over the two sprites' current state; callers test
/// geometric overlap separately.
///
/// The rules, in precedence order:
/// * inactive, spawned-target, or destroy-marked partners never collide
/// * a ghost-mode player passes through everything (reported, no block)
/// * passive and unknown classes never collide
/// * a ball never collides with sprites of its origin's class
/// * climbable overlap is reported but never blocks
/// * half-massive blocks only a downward mover arriving from above
/// * massive, lava, boxes, enemies and the player block
pub fn validate_collision(this: &Sprite, other: &Sprite) -> CollisionCheck {
    if !this.base.active || !other.collision_target() || this.base.id == other.base.id {
        return CollisionCheck::NotPossible;
    }

    if let SpriteKind::Player(player) = &this.kind {
        if player.ghost_ticks > 0 {
            // Ghost-only boxes are the one surface solid for a ghost
            if let SpriteKind::Box(data) = &other.kind {
                if data.invisible == InvisibleMode::Ghost
                    && data.useable()
                    && other.base.array == ArrayKind::Active
                {
                    return CollisionCheck::Blocking;
                }
            }
            return CollisionCheck::Internal;
        }
    }

    match (this.base.array, other.base.array) {
        (ArrayKind::Passive | ArrayKind::Unknown, _)
        | (_, ArrayKind::Passive | ArrayKind::Unknown) => CollisionCheck::NotPossible,
        (_, ArrayKind::Climbable) => CollisionCheck::Internal,
        (_, ArrayKind::HalfMassive) => {
            if let SpriteKind::Ball(ball) = &this.kind {
                if ball.origin == ArrayKind::HalfMassive {
                    return CollisionCheck::NotPossible;
                }
            }
            validate_half_massive(this, other)
        }
        (_, ArrayKind::Massive | ArrayKind::Lava) => CollisionCheck::Blocking,
        (_, ArrayKind::Active | ArrayKind::Enemy | ArrayKind::Player) => {
            if let SpriteKind::Ball(ball) = &this.kind {
                if ball.origin == other.base.array {
                    return CollisionCheck::NotPossible;
                }
            }
            match &other.kind {
                SpriteKind::Box(data) => validate_box(this, other, data),
                SpriteKind::Item(_) | SpriteKind::Particle => CollisionCheck::Internal,
                _ => CollisionCheck::Blocking,
            }
        }
    }
}

/// Half-massive platforms block only a mover that is falling and whose
/// feet were at or above the platform top at the start of the step.
/// A mover rising or already inside passes through.
fn validate_half_massive(this: &Sprite, other: &Sprite) -> CollisionCheck {
    if this.base.vel.y <= 0 {
        return CollisionCheck::Internal;
    }
    let step = fixed_mul(this.base.vel.y, FRAME_DT);
    let this_bottom = this.base.col_rect().bottom();
    let other_top = other.base.col_rect().top();
    // Feet were above the surface before this step's movement
    if this_bottom.wrapping_sub(step) <= other_top {
        CollisionCheck::Blocking
    } else {
        CollisionCheck::Internal
    }
}

/// Box collision depends on the box's visibility mode. A plain or
/// hidden-until-activated box is solid; a ghost-only box passes every
/// non-ghost mover (the ghost-player case is handled before the class
/// dispatch); an invisible semi-massive box is touchable only from
/// below. Exhausted boxes in an invisible mode stop colliding entirely.
fn validate_box(this: &Sprite, other: &Sprite, data: &BoxData) -> CollisionCheck {
    match data.invisible {
        InvisibleMode::Visible | InvisibleMode::UntilActivated => CollisionCheck::Blocking,
        InvisibleMode::Ghost => CollisionCheck::NotPossible,
        InvisibleMode::SemiMassive => {
            if !data.useable() {
                return CollisionCheck::NotPossible;
            }
            validate_semi_massive(this, other)
        }
    }
}

/// Invisible semi-massive boxes block only a rising mover whose head
/// was at or below the box bottom at the start of the step, so a jump
/// from underneath bumps them and everything else passes through.
fn validate_semi_massive(this: &Sprite, other: &Sprite) -> CollisionCheck {
    if this.base.vel.y >= 0 {
        return CollisionCheck::Internal;
    }
    let step = fixed_mul(this.base.vel.y, FRAME_DT);
    let this_top = this.base.col_rect().top();
    let other_bottom = other.base.col_rect().bottom();
    if this_top.wrapping_sub(step) >= other_bottom {
        CollisionCheck::Blocking
    } else {
        CollisionCheck::Internal
    }
}

// =============================================================================
// SWEEP AND RESOLVE
// =============================================================================

/// Find every current contact for `mover`, in target id order.
///
/// Events are only collected here; no state changes. Handlers run over
/// the returned list afterwards so that detection is independent of
/// handler side effects.
pub fn sweep_sprite(sprites: &SpriteManager, mover: SpriteId) -> Vec<CollisionEvent> {
    let Some(this) = sprites.get(mover) else {
        return Vec::new();
    };
    if !this.base.active {
        return Vec::new();
    }
    let this_rect = this.base.col_rect();

    let mut events = Vec::new();
    for (id, other) in sprites.iter() {
        if *id == mover {
            continue;
        }
        let check = validate_collision(this, other);
        if check == CollisionCheck::NotPossible {
            continue;
        }
        let other_rect = other.base.col_rect();
        if !this_rect.intersects(&other_rect) {
            continue;
        }
        let Some((correction, axis)) = this_rect.push_out(&other_rect) else {
            continue;
        };
        let direction = direction_from_correction(correction.x, correction.y, axis);
        events.push(CollisionEvent {
            this: mover,
            other: *id,
            check,
            other_category: other.category(),
            direction,
        });
    }
    events
}

/// Apply the positional correction for one blocking contact: move the
/// sprite out along the smaller penetration axis and zero the velocity
/// component into the surface.
pub fn resolve_blocking(sprites: &mut SpriteManager, event: &CollisionEvent) {
    if event.check != CollisionCheck::Blocking {
        return;
    }
    let Some(other_rect) = sprites.get(event.other).map(|s| s.base.col_rect()) else {
        return;
    };
    let Some(this) = sprites.get_mut(event.this) else {
        return;
    };
    let this_rect = this.base.col_rect();
    let Some((correction, axis)) = this_rect.push_out(&other_rect) else {
        return;
    };
    this.base.pos = this.base.pos.add(correction);
    match axis {
        Axis::Horizontal => {
            // Only cancel velocity into the surface
            if (correction.x > 0) != (this.base.vel.x > 0) {
                this.base.vel.x = 0;
            }
        }
        Axis::Vertical => {
            if (correction.y > 0) != (this.base.vel.y > 0) {
                this.base.vel.y = 0;
            }
        }
    }
}

/// Resolve a set of blocking contacts for one mover. Each pass picks
/// the contact with the smallest remaining penetration, applies its
/// correction, and re-measures the rest from the corrected position;
/// contacts a prior correction already separated are skipped. Applying
/// the shallowest correction first keeps the mover against the nearest
/// obstacle instead of shoving it through one.
pub fn resolve_blocking_all(sprites: &mut SpriteManager, events: &[CollisionEvent]) {
    let mut remaining: Vec<&CollisionEvent> = events
        .iter()
        .filter(|e| e.check == CollisionCheck::Blocking)
        .collect();

    while !remaining.is_empty() {
        let mut smallest: Option<(usize, Fixed)> = None;
        for (i, event) in remaining.iter().enumerate() {
            let Some(this_rect) = sprites.get(event.this).map(|s| s.base.col_rect()) else {
                continue;
            };
            let Some(other_rect) = sprites.get(event.other).map(|s| s.base.col_rect()) else {
                continue;
            };
            let Some((correction, _)) = this_rect.push_out(&other_rect) else {
                continue;
            };
            // One component is always zero
            let depth = fixed_abs(correction.x.wrapping_add(correction.y));
            match smallest {
                Some((_, best)) if best <= depth => {}
                _ => smallest = Some((i, depth)),
            }
        }
        let Some((index, _)) = smallest else {
            break;
        };
        let event = remaining.swap_remove(index);
        resolve_blocking(sprites, event);
    }
}

/// Contact side of the mover, from the correction pushing it away.
fn direction_from_correction(cx: Fixed, cy: Fixed, axis: Axis) -> CollisionDirection {
    match axis {
        Axis::Horizontal => {
            if cx > 0 {
                CollisionDirection::Left
            } else {
                CollisionDirection::Right
            }
        }
        Axis::Vertical => {
            if cy > 0 {
                CollisionDirection::Up
            } else {
                CollisionDirection::Down
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
