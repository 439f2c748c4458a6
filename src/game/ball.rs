//! Ball Projectiles
//!
//! Thrown fire and ice balls. Balls are always runtime-spawned, fall
//! under gravity, bounce off floors with a fixed upward velocity, and
//! are destroyed by walls, slow vertical contacts, resistant enemies
//! and the level bounds (except the open top edge).

use serde::{Deserialize, Serialize};

use crate::core::fixed::{
    fixed_abs, fixed_mul, Fixed, BALL_BOUNCE_VELOCITY, BALL_PARTICLE_INTERVAL, BALL_VERTICAL_EPS,
    GRAVITY, MAX_FALL_VELOCITY,
};
use crate::core::vec2::FixedVec2;
use crate::game::collision::{CollisionDirection, CollisionEvent};
use crate::game::sprite::{ArrayKind, SpriteBase, SpriteKind, SpriteManager, SpriteId};

/// Element of a ball, deciding which enemies resist it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallElement {
    /// Burns; resisted by fire-proof enemies
    Fire,
    /// Freezes; resisted by ice-proof enemies
    Ice,
}

impl BallElement {
    /// Level-file attribute value.
    pub fn as_attr(&self) -> &'static str {
        match self {
            Self::Fire => "fire",
            Self::Ice => "ice",
        }
    }
}

/// What a ball collision handler decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BallOutcome {
    /// Keep flying
    None,
    /// Bounced off a floor; velocity already updated
    Bounced,
    /// Destroy the ball (and emit the explosion event)
    Destroy,
    /// Destroy the ball and kill the enemy it hit
    DestroyAndKill(SpriteId),
}

/// Per-sprite ball payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BallData {
    /// Fire or ice
    pub element: BallElement,
    /// Collision class of the thrower; the ball ignores that class
    pub origin: ArrayKind,
    /// Countdown to the next trail particle
    pub particle_timer: Fixed,
    /// Cosmetic roll angle, radians as fixed-point
    pub rotation: Fixed,
}

impl BallData {
    /// Create a ball payload for a thrower of the given class.
    pub fn new(element: BallElement, origin: ArrayKind) -> Self {
        Self {
            element,
            origin,
            particle_timer: BALL_PARTICLE_INTERVAL,
            rotation: 0,
        }
    }
}

/// Integrate one frame of ball motion: gravity clamped to terminal
/// velocity, then position. Returns `true` each time the particle
/// timer elapses so the caller can emit a trail particle.
pub fn update_ball(base: &mut SpriteBase, data: &mut BallData, dt: Fixed) -> bool {
    base.vel.y = (base.vel.y.wrapping_add(fixed_mul(GRAVITY, dt))).min(MAX_FALL_VELOCITY);
    base.pos = base.pos.add(base.vel.scale(dt));

    // Roll proportional to horizontal speed
    data.rotation = data.rotation.wrapping_add(fixed_mul(base.vel.x, dt));

    data.particle_timer = data.particle_timer.wrapping_sub(dt);
    if data.particle_timer <= 0 {
        data.particle_timer = data.particle_timer.wrapping_add(BALL_PARTICLE_INTERVAL);
        true
    } else {
        false
    }
}

/// Decide the ball's reaction to one blocking contact.
///
/// * Vertical contact while moving slower than the bounce threshold
///   destroys the ball; otherwise it bounces up at the fixed bounce
///   velocity regardless of impact speed.
/// * Horizontal contact always destroys it.
/// * An enemy contact kills the enemy unless the enemy resists this
///   element, in which case only the ball dies.
pub fn ball_hit(
    sprites: &mut SpriteManager,
    ball: SpriteId,
    event: &CollisionEvent,
) -> BallOutcome {
    let resistant_enemy = match sprites.get(event.other).map(|s| &s.kind) {
        Some(SpriteKind::Enemy(enemy)) => Some(enemy.resistant),
        _ => None,
    };

    let Some(sprite) = sprites.get_mut(ball) else {
        return BallOutcome::None;
    };
    let SpriteKind::Ball(_) = &sprite.kind else {
        return BallOutcome::None;
    };

    if let Some(resistant) = resistant_enemy {
        return if resistant {
            BallOutcome::Destroy
        } else {
            BallOutcome::DestroyAndKill(event.other)
        };
    }

    match event.direction {
        CollisionDirection::Down | CollisionDirection::Up => {
            if fixed_abs(sprite.base.vel.y) < BALL_VERTICAL_EPS {
                BallOutcome::Destroy
            } else if event.direction == CollisionDirection::Down {
                sprite.base.vel.y = -BALL_BOUNCE_VELOCITY;
                BallOutcome::Bounced
            } else {
                // Ceiling: drop straight down
                sprite.base.vel.y = 0;
                BallOutcome::Bounced
            }
        }
        CollisionDirection::Left | CollisionDirection::Right => BallOutcome::Destroy,
    }
}

/// Whether a ball at `pos` has left the playable area. The top edge is
/// open so a thrown ball can arc above the level.
pub fn out_of_bounds(pos: FixedVec2, size: FixedVec2, bounds: crate::core::rect::FixedRect) -> bool {
    pos.x.wrapping_add(size.x) < bounds.left()
        || pos.x > bounds.right()
        || pos.y > bounds.bottom()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{to_fixed, FRAME_DT};
    use crate::core::rect::FixedRect;
    use crate::game::collision::CollisionCheck;
    use crate::game::follower::EnemyData;
    use crate::game::sprite::Category;

    fn spawn_ball(mgr: &mut SpriteManager, vel: FixedVec2) -> SpriteId {
        let id = mgr.alloc_id();
        let mut base = SpriteBase::new(
            id,
            FixedVec2::new(to_fixed(5.0), to_fixed(5.0)),
            FixedVec2::new(to_fixed(0.5), to_fixed(0.5)),
        );
        base.array = ArrayKind::Active;
        base.vel = vel;
        mgr.spawn(base, SpriteKind::Ball(BallData::new(BallElement::Fire, ArrayKind::Player)))
    }

    fn floor_event(ball: SpriteId, other: SpriteId) -> CollisionEvent {
        CollisionEvent {
            this: ball,
            other,
            check: CollisionCheck::Blocking,
            other_category: Category::Massive,
            direction: CollisionDirection::Down,
        }
    }

    #[test]
    fn test_gravity_clamps_at_terminal_velocity() {
        let mut mgr = SpriteManager::new();
        let id = spawn_ball(&mut mgr, FixedVec2::ZERO);
        let mut data = BallData::new(BallElement::Fire, ArrayKind::Player);
        let sprite = mgr.get_mut(id).unwrap();
        for _ in 0..600 {
            update_ball(&mut sprite.base, &mut data, FRAME_DT);
        }
        assert_eq!(sprite.base.vel.y, MAX_FALL_VELOCITY);
    }

    #[test]
    fn test_fast_floor_hit_bounces_at_fixed_speed() {
        let mut mgr = SpriteManager::new();
        let floor = mgr.add_terrain(
            FixedVec2::new(0, to_fixed(6.0)),
            FixedVec2::new(to_fixed(20.0), to_fixed(1.0)),
            ArrayKind::Massive,
            "ground",
        );
        // Scenario: falling at (0, 9): bounce
        let id = spawn_ball(&mut mgr, FixedVec2::new(0, to_fixed(9.0)));
        let outcome = ball_hit(&mut mgr, id, &floor_event(id, floor));
        assert_eq!(outcome, BallOutcome::Bounced);
        assert_eq!(mgr.get(id).unwrap().base.vel.y, -BALL_BOUNCE_VELOCITY);
    }

    #[test]
    fn test_slow_vertical_hit_destroys() {
        let mut mgr = SpriteManager::new();
        let floor = mgr.add_terrain(
            FixedVec2::new(0, to_fixed(6.0)),
            FixedVec2::new(to_fixed(20.0), to_fixed(1.0)),
            ArrayKind::Massive,
            "ground",
        );
        // Scenario: rolling at (6, 0): vertical speed under threshold
        let id = spawn_ball(&mut mgr, FixedVec2::new(to_fixed(6.0), to_fixed(0.1)));
        let outcome = ball_hit(&mut mgr, id, &floor_event(id, floor));
        assert_eq!(outcome, BallOutcome::Destroy);
    }

    #[test]
    fn test_wall_hit_destroys() {
        let mut mgr = SpriteManager::new();
        let wall = mgr.add_terrain(
            FixedVec2::new(to_fixed(6.0), 0),
            FixedVec2::new(to_fixed(1.0), to_fixed(20.0)),
            ArrayKind::Massive,
            "wall",
        );
        let id = spawn_ball(&mut mgr, FixedVec2::new(to_fixed(6.0), to_fixed(9.0)));
        let mut event = floor_event(id, wall);
        event.direction = CollisionDirection::Right;
        assert_eq!(ball_hit(&mut mgr, id, &event), BallOutcome::Destroy);
    }

    #[test]
    fn test_resistant_enemy_survives_the_ball() {
        let mut mgr = SpriteManager::new();
        let enemy = {
            let id = mgr.alloc_id();
            let mut base = SpriteBase::new(
                id,
                FixedVec2::new(to_fixed(5.0), to_fixed(5.0)),
                FixedVec2::new(to_fixed(1.0), to_fixed(1.0)),
            );
            base.array = ArrayKind::Enemy;
            let mut data = EnemyData::default();
            data.resistant = true;
            mgr.add(base, SpriteKind::Enemy(data))
        };
        let id = spawn_ball(&mut mgr, FixedVec2::new(to_fixed(6.0), 0));
        let mut event = floor_event(id, enemy);
        event.other_category = Category::Enemy;
        event.direction = CollisionDirection::Right;
        assert_eq!(ball_hit(&mut mgr, id, &event), BallOutcome::Destroy);

        // A plain enemy dies with the ball
        if let SpriteKind::Enemy(data) = &mut mgr.get_mut(enemy).unwrap().kind {
            data.resistant = false;
        }
        let id2 = spawn_ball(&mut mgr, FixedVec2::new(to_fixed(6.0), 0));
        let mut event = floor_event(id2, enemy);
        event.other_category = Category::Enemy;
        assert_eq!(
            ball_hit(&mut mgr, id2, &event),
            BallOutcome::DestroyAndKill(enemy)
        );
    }

    #[test]
    fn test_out_of_bounds_top_is_open() {
        let bounds = FixedRect::new(
            FixedVec2::ZERO,
            FixedVec2::new(to_fixed(100.0), to_fixed(50.0)),
        );
        let size = FixedVec2::new(to_fixed(0.5), to_fixed(0.5));
        assert!(!out_of_bounds(
            FixedVec2::new(to_fixed(10.0), to_fixed(-30.0)),
            size,
            bounds
        ));
        assert!(out_of_bounds(
            FixedVec2::new(to_fixed(10.0), to_fixed(51.0)),
            size,
            bounds
        ));
        assert!(out_of_bounds(
            FixedVec2::new(to_fixed(-2.0), to_fixed(10.0)),
            size,
            bounds
        ));
        assert!(out_of_bounds(
            FixedVec2::new(to_fixed(101.0), to_fixed(10.0)),
            size,
            bounds
        ));
    }

    #[test]
    fn test_particle_timer_fires_on_interval() {
        let mut mgr = SpriteManager::new();
        let id = spawn_ball(&mut mgr, FixedVec2::new(to_fixed(6.0), 0));
        let mut data = BallData::new(BallElement::Fire, ArrayKind::Player);
        let sprite = mgr.get_mut(id).unwrap();

        let mut fired = 0;
        for _ in 0..60 {
            if update_ball(&mut sprite.base, &mut data, FRAME_DT) {
                fired += 1;
            }
        }
        // One second at a 0.1s interval
        assert!((9..=11).contains(&fired), "fired {fired} particles");
    }
}
