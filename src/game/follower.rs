//! Path Followers
//!
//! Sprites that ride a named path: moving platforms and patrolling
//! enemies. The binding is by path identifier, so a follower whose
//! path is missing simply holds its authored start position.

use serde::{Deserialize, Serialize};

use crate::core::fixed::{fixed_mul, to_fixed, Fixed};
use crate::core::vec2::FixedVec2;
use crate::game::path::{Path, PathState};

/// Facing of a walking enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    /// Walking toward negative x
    Left,
    /// Walking toward positive x
    Right,
}

impl Facing {
    /// Parse from the level-file attribute value.
    pub fn from_attr(value: &str) -> Self {
        match value {
            "left" => Self::Left,
            _ => Self::Right,
        }
    }

    /// Level-file attribute value.
    pub fn as_attr(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Flip to the opposite facing.
    pub fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// A path binding plus traversal cursor and speed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathFollower {
    /// Identifier of the path to follow; may not resolve
    pub path_id: String,
    /// Traversal cursor
    pub state: PathState,
    /// Arc-length speed in units per second
    pub speed: Fixed,
}

impl PathFollower {
    /// Bind to a path identifier at the default speed.
    pub fn new(path_id: &str, speed: Fixed) -> Self {
        Self {
            path_id: path_id.to_string(),
            state: PathState::default(),
            speed,
        }
    }

    /// Advance along the resolved path by one frame and return the new
    /// level-space position, or `None` when the path does not resolve
    /// (the follower then keeps its current position).
    ///
    /// On a mirror path the cursor reverses at each terminus, so the
    /// follower shuttles back and forth.
    pub fn advance(&mut self, path: Option<&Path>, dt: Fixed) -> Option<FixedVec2> {
        let path = path?;
        let distance = fixed_mul(self.speed, dt);
        if !self.state.path_move(Some(path), distance) {
            self.state.move_toggle();
        }
        Some(self.state.level_position(path))
    }
}

/// Per-sprite moving platform payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformData {
    /// Path binding
    pub follower: PathFollower,
    /// Position delta applied this frame, used to carry riders
    pub frame_delta: FixedVec2,
}

impl PlatformData {
    /// Create a platform bound to `path_id`.
    pub fn new(path_id: &str, speed: Fixed) -> Self {
        Self {
            follower: PathFollower::new(path_id, speed),
            frame_delta: FixedVec2::ZERO,
        }
    }
}

/// Per-sprite enemy payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyData {
    /// Dead enemies stop updating and colliding
    pub alive: bool,
    /// Resists ball projectiles of any element
    pub resistant: bool,
    /// Optional path binding; unbound enemies walk on the ground
    pub follower: Option<PathFollower>,
    /// Ground walk speed when unbound
    pub walk_speed: Fixed,
    /// Current facing
    pub facing: Facing,
}

impl Default for EnemyData {
    fn default() -> Self {
        Self {
            alive: true,
            resistant: false,
            follower: None,
            walk_speed: to_fixed(1.5),
            facing: Facing::Left,
        }
    }
}

impl EnemyData {
    /// Create a ground-walking enemy.
    pub fn walker(walk_speed: Fixed, facing: Facing) -> Self {
        Self {
            walk_speed,
            facing,
            ..Default::default()
        }
    }

    /// Create a path-bound enemy.
    pub fn path_bound(path_id: &str, speed: Fixed) -> Self {
        Self {
            follower: Some(PathFollower::new(path_id, speed)),
            ..Default::default()
        }
    }

    /// Signed walk velocity from speed and facing.
    pub fn walk_velocity(&self) -> Fixed {
        match self.facing {
            Facing::Left => -self.walk_speed,
            Facing::Right => self.walk_speed,
        }
    }

    /// Turn around after hitting a wall.
    pub fn turn_around(&mut self) {
        self.facing = self.facing.flipped();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{fixed_abs, FRAME_DT};
    use crate::game::path::PathMode;

    fn straight_path(mode: PathMode) -> Path {
        let mut path = Path::new("rail", FixedVec2::new(to_fixed(2.0), to_fixed(3.0)), mode);
        path.add_segment(FixedVec2::ZERO, FixedVec2::new(to_fixed(4.0), 0));
        path
    }

    #[test]
    fn test_follower_position_is_anchor_plus_offset() {
        let path = straight_path(PathMode::Rewind);
        let mut follower = PathFollower::new("rail", to_fixed(2.0));
        follower.state.move_start_forward(&path);

        // One second at speed 2: two units along, offset from anchor
        let mut pos = FixedVec2::ZERO;
        for _ in 0..60 {
            if let Some(p) = follower.advance(Some(&path), FRAME_DT) {
                pos = p;
            }
        }
        assert!(fixed_abs(pos.x - to_fixed(4.0)) < 1200, "x was {}", pos.x);
        assert!(fixed_abs(pos.y - to_fixed(3.0)) < 300);
    }

    #[test]
    fn test_unbound_follower_stays_put() {
        let mut follower = PathFollower::new("missing", to_fixed(2.0));
        assert_eq!(follower.advance(None, FRAME_DT), None);
        assert_eq!(follower.state, PathState::default());
    }

    #[test]
    fn test_mirror_follower_shuttles() {
        let path = straight_path(PathMode::Mirror);
        let mut follower = PathFollower::new("rail", to_fixed(4.0));
        follower.state.move_start_forward(&path);

        let mut min_x = i32::MAX;
        let mut max_x = i32::MIN;
        // 3 seconds at speed 4 over a 4-unit path: several reversals
        for _ in 0..180 {
            if let Some(p) = follower.advance(Some(&path), FRAME_DT) {
                min_x = min_x.min(p.x);
                max_x = max_x.max(p.x);
            }
        }
        // Never leaves the rail, touches both ends
        assert!(min_x >= to_fixed(2.0) && max_x <= to_fixed(6.0));
        assert!(fixed_abs(min_x - to_fixed(2.0)) < 6000);
        assert!(fixed_abs(max_x - to_fixed(6.0)) < 6000);
    }

    #[test]
    fn test_enemy_walk_velocity_follows_facing() {
        let mut enemy = EnemyData::walker(to_fixed(1.5), Facing::Left);
        assert_eq!(enemy.walk_velocity(), -to_fixed(1.5));
        enemy.turn_around();
        assert_eq!(enemy.walk_velocity(), to_fixed(1.5));
    }

    #[test]
    fn test_facing_attr_round_trip() {
        assert_eq!(Facing::from_attr("left"), Facing::Left);
        assert_eq!(Facing::from_attr("right"), Facing::Right);
        assert_eq!(Facing::from_attr(Facing::Left.as_attr()), Facing::Left);
    }
}
