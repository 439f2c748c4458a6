//! Editor Support
//!
//! Picking and edge snapping for the level editor. The editor holds
//! weak sprite handles (hover, selection, drag target) that must be
//! cleared whenever the level flushes destroyed sprites.

use serde::{Deserialize, Serialize};

use crate::core::fixed::{fixed_abs, Fixed, SNAP_DISTANCE};
use crate::core::rect::FixedRect;
use crate::core::vec2::FixedVec2;
use crate::game::sprite::{SpriteId, SpriteManager};

/// The editor's mouse-interaction state. All handles are weak; a
/// flushed sprite id is dropped here without any other effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseState {
    /// Sprite under the cursor
    pub hover: Option<SpriteId>,
    /// Currently selected sprite
    pub selected: Option<SpriteId>,
    /// Sprite being dragged
    pub active: Option<SpriteId>,
}

impl MouseState {
    /// Drop every handle that points at a removed sprite. Call with
    /// the id list returned by the level's flush.
    pub fn clear_refs(&mut self, removed: &[SpriteId]) {
        for slot in [&mut self.hover, &mut self.selected, &mut self.active] {
            if let Some(id) = *slot {
                if removed.contains(&id) {
                    *slot = None;
                }
            }
        }
    }
}

/// Topmost sprite under `point`, for hover and selection. Pure query
/// over the sprite manager; inactive sprites are skipped.
pub fn object_at(sprites: &SpriteManager, point: FixedVec2) -> Option<SpriteId> {
    sprites.from_position(point)
}

/// Snap a dragged rectangle to nearby sprite edges.
///
/// Each axis snaps independently to the nearest facing edge pair
/// (left-to-right, right-to-left, top-to-bottom, bottom-to-top, plus
/// same-edge alignment) within [`SNAP_DISTANCE`]. Returns the snapped
/// top-left position, or `None` when no edge is in range on either
/// axis. The dragged sprite itself is excluded.
pub fn snap_to_object(
    sprites: &SpriteManager,
    dragged: SpriteId,
    rect: FixedRect,
) -> Option<FixedVec2> {
    let mut best_x: Option<(Fixed, Fixed)> = None;
    let mut best_y: Option<(Fixed, Fixed)> = None;

    for (id, sprite) in sprites.iter() {
        if *id == dragged || !sprite.base.active {
            continue;
        }
        let other = sprite.base.col_rect();

        // Candidate x positions for the dragged rect's left edge
        let x_candidates = [
            other.right(),                          // flush to the right of other
            other.left().wrapping_sub(rect.size.x), // flush to the left
            other.left(),                           // align left edges
            other.right().wrapping_sub(rect.size.x), // align right edges
        ];
        for candidate in x_candidates {
            consider(&mut best_x, rect.pos.x, candidate);
        }

        let y_candidates = [
            other.bottom(),
            other.top().wrapping_sub(rect.size.y),
            other.top(),
            other.bottom().wrapping_sub(rect.size.y),
        ];
        for candidate in y_candidates {
            consider(&mut best_y, rect.pos.y, candidate);
        }
    }

    if best_x.is_none() && best_y.is_none() {
        return None;
    }
    Some(FixedVec2::new(
        best_x.map_or(rect.pos.x, |(_, pos)| pos),
        best_y.map_or(rect.pos.y, |(_, pos)| pos),
    ))
}

/// Keep `candidate` if it is within the snap distance and closer than
/// the best so far.
fn consider(best: &mut Option<(Fixed, Fixed)>, current: Fixed, candidate: Fixed) {
    let distance = fixed_abs(candidate.wrapping_sub(current));
    if distance > SNAP_DISTANCE {
        return;
    }
    if best.map_or(true, |(d, _)| distance < d) {
        *best = Some((distance, candidate));
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::to_fixed;
    use crate::game::sprite::ArrayKind;

    fn manager_with_block() -> (SpriteManager, SpriteId) {
        let mut mgr = SpriteManager::new();
        let block = mgr.add_terrain(
            FixedVec2::new(to_fixed(10.0), to_fixed(10.0)),
            FixedVec2::new(to_fixed(2.0), to_fixed(2.0)),
            ArrayKind::Massive,
            "gfx/block.png",
        );
        (mgr, block)
    }

    #[test]
    fn test_object_at_picks_topmost() {
        let (mut mgr, under) = manager_with_block();
        let over = mgr.add_terrain(
            FixedVec2::new(to_fixed(10.0), to_fixed(10.0)),
            FixedVec2::new(to_fixed(2.0), to_fixed(2.0)),
            ArrayKind::Passive,
            "gfx/deco.png",
        );
        let hit = object_at(&mgr, FixedVec2::new(to_fixed(11.0), to_fixed(11.0)));
        assert_eq!(hit, Some(over));
        assert_ne!(hit, Some(under));

        assert_eq!(
            object_at(&mgr, FixedVec2::new(to_fixed(50.0), to_fixed(50.0))),
            None
        );
    }

    #[test]
    fn test_snap_right_edge_to_left_edge() {
        let (mut mgr, _) = manager_with_block();
        let dragged = mgr.add_terrain(
            FixedVec2::new(to_fixed(8.7), to_fixed(5.0)),
            FixedVec2::new(to_fixed(1.0), to_fixed(1.0)),
            ArrayKind::Massive,
            "gfx/block.png",
        );
        // Dragged right edge at 9.7; block left edge at 10: snap flush
        let snapped = snap_to_object(
            &mgr,
            dragged,
            mgr.get(dragged).unwrap().base.col_rect(),
        )
        .unwrap();
        assert_eq!(snapped.x, to_fixed(9.0));
    }

    #[test]
    fn test_snap_both_axes_independently() {
        let (mut mgr, _) = manager_with_block();
        let dragged = mgr.add_terrain(
            FixedVec2::new(to_fixed(12.1), to_fixed(9.8)),
            FixedVec2::new(to_fixed(1.0), to_fixed(1.0)),
            ArrayKind::Massive,
            "gfx/block.png",
        );
        let snapped = snap_to_object(
            &mgr,
            dragged,
            mgr.get(dragged).unwrap().base.col_rect(),
        )
        .unwrap();
        // x flush against the block's right edge, y aligned to its top
        assert_eq!(snapped.x, to_fixed(12.0));
        assert_eq!(snapped.y, to_fixed(10.0));
    }

    #[test]
    fn test_no_snap_beyond_distance() {
        let (mgr, block) = manager_with_block();
        let far = FixedRect::new(
            FixedVec2::new(to_fixed(20.0), to_fixed(20.0)),
            FixedVec2::new(to_fixed(1.0), to_fixed(1.0)),
        );
        assert_eq!(snap_to_object(&mgr, block, far), None);
    }

    #[test]
    fn test_dragged_sprite_does_not_snap_to_itself() {
        let mut mgr = SpriteManager::new();
        let only = mgr.add_terrain(
            FixedVec2::new(to_fixed(3.3), to_fixed(3.3)),
            FixedVec2::new(to_fixed(1.0), to_fixed(1.0)),
            ArrayKind::Massive,
            "gfx/block.png",
        );
        let rect = mgr.get(only).unwrap().base.col_rect();
        assert_eq!(snap_to_object(&mgr, only, rect), None);
    }

    #[test]
    fn test_clear_refs_drops_only_removed() {
        let mut state = MouseState {
            hover: Some(SpriteId(1)),
            selected: Some(SpriteId(2)),
            active: Some(SpriteId(1)),
        };
        state.clear_refs(&[SpriteId(1)]);
        assert_eq!(state.hover, None);
        assert_eq!(state.active, None);
        assert_eq!(state.selected, Some(SpriteId(2)));
    }
}
