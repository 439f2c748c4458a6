//! Runtime Context
//!
//! Explicit per-level runtime state that the frame pipeline threads
//! through update calls: the current mode, the camera, and the active
//! player handle. Nothing here is global.

use serde::{Deserialize, Serialize};

use crate::core::fixed::Fixed;
use crate::core::rect::FixedRect;
use crate::core::vec2::FixedVec2;
use crate::game::sprite::SpriteId;

/// Top-level runtime mode of a level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Normal play
    #[default]
    Normal,
    /// Editing; physics paused, picking active
    Editor,
    /// Camera is flying along a path; play input is ignored
    CameraFly,
}

/// Viewport center plus the level-space rectangle it may show.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Camera {
    /// Viewport center in level coordinates
    pub center: FixedVec2,
    /// Half-extent of the viewport
    pub half_size: FixedVec2,
    /// Rectangle the viewport must stay inside
    pub limits: FixedRect,
}

impl Camera {
    /// Camera with the given viewport half-size, limited to `limits`.
    pub fn new(half_size: FixedVec2, limits: FixedRect) -> Self {
        Self {
            center: half_size,
            half_size,
            limits,
        }
    }

    /// Move the center by a delta, then clamp to the limits.
    pub fn move_by(&mut self, delta: FixedVec2) {
        self.center = self.center.add(delta);
        self.clamp();
    }

    /// Center on a target point, then clamp to the limits.
    pub fn follow(&mut self, target: FixedVec2) {
        self.center = target;
        self.clamp();
    }

    /// Replace the limit rectangle and re-clamp.
    pub fn set_limits(&mut self, limits: FixedRect) {
        self.limits = limits;
        self.clamp();
    }

    /// Clamp the center so the viewport stays inside the limits. A
    /// limit rect smaller than the viewport pins the camera to the
    /// limit center on that axis.
    pub fn clamp(&mut self) {
        self.center.x = clamp_axis(
            self.center.x,
            self.limits.left(),
            self.limits.right(),
            self.half_size.x,
        );
        self.center.y = clamp_axis(
            self.center.y,
            self.limits.top(),
            self.limits.bottom(),
            self.half_size.y,
        );
    }

    /// Level-space rectangle currently visible.
    pub fn view_rect(&self) -> FixedRect {
        FixedRect::new(
            self.center.sub(self.half_size),
            self.half_size.scale(crate::core::fixed::to_fixed(2.0)),
        )
    }
}

fn clamp_axis(center: Fixed, lo: Fixed, hi: Fixed, half: Fixed) -> Fixed {
    let min = lo.wrapping_add(half);
    let max = hi.wrapping_sub(half);
    if min > max {
        // Limits narrower than the viewport
        lo.wrapping_add(hi.wrapping_sub(lo) / 2)
    } else {
        center.clamp(min, max)
    }
}

/// The runtime state threaded through every update call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameContext {
    /// Current mode
    pub mode: GameMode,
    /// The viewport
    pub camera: Camera,
    /// The controllable player, when one exists
    pub active_player: Option<SpriteId>,
}

impl GameContext {
    /// Context in normal mode with the given camera.
    pub fn new(camera: Camera) -> Self {
        Self {
            mode: GameMode::Normal,
            camera,
            active_player: None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::to_fixed;

    fn camera() -> Camera {
        Camera::new(
            FixedVec2::new(to_fixed(10.0), to_fixed(7.0)),
            FixedRect::new(
                FixedVec2::ZERO,
                FixedVec2::new(to_fixed(100.0), to_fixed(50.0)),
            ),
        )
    }

    #[test]
    fn test_camera_clamps_to_limits() {
        let mut cam = camera();
        cam.follow(FixedVec2::new(to_fixed(2.0), to_fixed(2.0)));
        assert_eq!(cam.center.x, to_fixed(10.0));
        assert_eq!(cam.center.y, to_fixed(7.0));

        cam.follow(FixedVec2::new(to_fixed(99.0), to_fixed(49.0)));
        assert_eq!(cam.center.x, to_fixed(90.0));
        assert_eq!(cam.center.y, to_fixed(43.0));
    }

    #[test]
    fn test_camera_free_inside_limits() {
        let mut cam = camera();
        let target = FixedVec2::new(to_fixed(50.0), to_fixed(25.0));
        cam.follow(target);
        assert_eq!(cam.center, target);
    }

    #[test]
    fn test_narrow_limits_pin_camera() {
        let mut cam = camera();
        cam.set_limits(FixedRect::new(
            FixedVec2::ZERO,
            FixedVec2::new(to_fixed(8.0), to_fixed(50.0)),
        ));
        cam.follow(FixedVec2::new(to_fixed(100.0), to_fixed(25.0)));
        assert_eq!(cam.center.x, to_fixed(4.0), "pinned to the limit center");
    }

    #[test]
    fn test_view_rect_matches_center() {
        let mut cam = camera();
        cam.follow(FixedVec2::new(to_fixed(50.0), to_fixed(25.0)));
        let view = cam.view_rect();
        assert_eq!(view.left(), to_fixed(40.0));
        assert_eq!(view.top(), to_fixed(18.0));
        assert_eq!(view.right(), to_fixed(60.0));
        assert_eq!(view.bottom(), to_fixed(32.0));
    }
}
