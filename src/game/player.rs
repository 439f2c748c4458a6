//! Player
//!
//! Input-driven player physics and the player-side collision handlers:
//! landing, wall stops, box bumps from below, enemy stomps and hurt.

use serde::{Deserialize, Serialize};

use crate::core::fixed::{
    fixed_mul, to_fixed, Fixed, GRAVITY, MAX_FALL_VELOCITY, PLAYER_JUMP_VELOCITY,
    PLAYER_RUN_SPEED,
};
use crate::core::vec2::FixedVec2;
use crate::game::ball::{BallData, BallElement};
use crate::game::collision::{CollisionDirection, CollisionEvent};
use crate::game::sprite::{ArrayKind, SpriteBase, SpriteId, SpriteKind, SpriteManager};

/// One frame of player input, replayable for determinism.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Horizontal intent: -1, 0 or 1
    pub move_x: i8,
    /// Jump pressed this frame
    pub jump: bool,
    /// Shoot pressed this frame
    pub shoot: bool,
}

/// Per-sprite player payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerData {
    /// Standing on a surface as of the last resolution pass
    pub on_ground: bool,
    /// Editor ghost mode countdown; while positive the player ignores
    /// all blocking collisions
    pub ghost_ticks: u32,
    /// Post-hurt invincibility countdown
    pub invincible_ticks: u32,
    /// Facing used for shots, updated from input
    pub facing_right: bool,
    /// Element of thrown balls
    pub element: BallElement,
}

impl PlayerData {
    /// Create a grounded, mortal player.
    pub fn new() -> Self {
        Self {
            on_ground: false,
            ghost_ticks: 0,
            invincible_ticks: 0,
            facing_right: true,
            element: BallElement::Fire,
        }
    }
}

impl Default for PlayerData {
    fn default() -> Self {
        Self::new()
    }
}

/// What the player-side collision handlers decided this frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerFrameActions {
    /// Boxes bumped from below, to activate
    pub bumped_boxes: Vec<SpriteId>,
    /// Enemies stomped, to kill
    pub stomped: Vec<SpriteId>,
    /// The player touched an enemy from the side and takes a hit
    pub hurt: bool,
    /// Items overlapped, to collect
    pub collected: Vec<SpriteId>,
    /// The player touched lava
    pub in_lava: bool,
}

/// Apply one frame of input and physics to the player sprite.
pub fn update_player(base: &mut SpriteBase, data: &mut PlayerData, input: InputFrame, dt: Fixed) {
    base.vel.x = match input.move_x.signum() {
        -1 => -PLAYER_RUN_SPEED,
        1 => PLAYER_RUN_SPEED,
        _ => 0,
    };
    if input.move_x != 0 {
        data.facing_right = input.move_x > 0;
    }

    if input.jump && data.on_ground {
        base.vel.y = -PLAYER_JUMP_VELOCITY;
        data.on_ground = false;
    }

    base.vel.y = (base.vel.y.wrapping_add(fixed_mul(GRAVITY, dt))).min(MAX_FALL_VELOCITY);
    base.pos = base.pos.add(base.vel.scale(dt));

    data.ghost_ticks = data.ghost_ticks.saturating_sub(1);
    data.invincible_ticks = data.invincible_ticks.saturating_sub(1);

    // Ground contact is re-proven every frame by the resolution pass
    data.on_ground = false;
}

/// Interpret the player's contacts for this frame. The returned action
/// set is applied by the level pipeline after all sweeps, so handler
/// order cannot influence detection.
pub fn handle_player_collisions(
    sprites: &SpriteManager,
    player: SpriteId,
    events: &[CollisionEvent],
) -> PlayerFrameActions {
    let mut actions = PlayerFrameActions::default();
    let invincible = match sprites.get(player).map(|s| &s.kind) {
        Some(SpriteKind::Player(data)) => data.invincible_ticks > 0,
        _ => return actions,
    };

    for event in events {
        let Some(other) = sprites.get(event.other) else {
            continue;
        };
        match &other.kind {
            SpriteKind::Box(_) => {
                // Only a head hit from below activates the box
                if event.direction == CollisionDirection::Up {
                    actions.bumped_boxes.push(event.other);
                }
            }
            SpriteKind::Enemy(enemy) if enemy.alive => {
                if event.direction == CollisionDirection::Down {
                    actions.stomped.push(event.other);
                } else if !invincible {
                    actions.hurt = true;
                }
            }
            SpriteKind::Item(_) => actions.collected.push(event.other),
            _ => {
                if other.base.array == ArrayKind::Lava {
                    actions.in_lava = true;
                }
            }
        }
    }
    actions
}

/// Record ground contact after the resolution pass.
pub fn note_ground_contact(data: &mut PlayerData, events: &[CollisionEvent]) {
    if events
        .iter()
        .any(|e| e.direction == CollisionDirection::Down)
    {
        data.on_ground = true;
    }
}

/// Spawn a thrown ball in front of the player, inheriting the facing
/// as horizontal velocity. Returns the new sprite's id.
pub fn shoot_ball(sprites: &mut SpriteManager, player: SpriteId) -> Option<SpriteId> {
    let (pos, facing_right, element) = match sprites.get(player) {
        Some(sprite) => match &sprite.kind {
            SpriteKind::Player(data) => (
                sprite.base.pos,
                data.facing_right,
                data.element,
            ),
            _ => return None,
        },
        None => return None,
    };

    let id = sprites.alloc_id();
    let offset = if facing_right {
        FixedVec2::new(to_fixed(0.8), to_fixed(0.2))
    } else {
        FixedVec2::new(to_fixed(-0.5), to_fixed(0.2))
    };
    let mut base = SpriteBase::new(
        id,
        pos.add(offset),
        FixedVec2::new(to_fixed(0.5), to_fixed(0.5)),
    );
    base.array = ArrayKind::Active;
    base.image = match element {
        BallElement::Fire => "gfx/ball_fire.png".to_string(),
        BallElement::Ice => "gfx/ball_ice.png".to_string(),
    };
    base.vel = FixedVec2::new(
        if facing_right {
            to_fixed(8.0)
        } else {
            to_fixed(-8.0)
        },
        to_fixed(-2.0),
    );
    Some(sprites.spawn(base, SpriteKind::Ball(BallData::new(element, ArrayKind::Player))))
}

// =============================================================================
// TESTS
// =============================================================================
