//! Path Engine
//!
//! Geometric polylines traversed by arc length. Moving platforms and
//! patrolling enemies bind to a path by its string identifier and drive
//! their position from a per-follower traversal cursor.
//!
//! Segments are authored in path-local coordinates relative to the
//! path's anchor. Segments do not have to be geometrically contiguous;
//! traversal simply walks the list by distance, so a disjoint segment
//! makes the follower jump - that is authored behavior, not a bug.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::fixed::Fixed;
use crate::core::vec2::FixedVec2;
use crate::game::sprite::SpriteId;

/// What happens when a traversal cursor reaches a path terminus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathMode {
    /// `path_move` returns `false` at the terminus and clamps there;
    /// the caller is expected to reverse direction via `move_toggle`.
    Mirror,
    /// The cursor silently wraps to the opposite terminus and keeps
    /// going; `path_move` keeps returning `true`.
    Rewind,
}

/// One line segment of a path, with precomputed direction and length.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSegment {
    /// Start point (path-local coordinates)
    pub start: FixedVec2,
    /// End point (path-local coordinates)
    pub end: FixedVec2,
    /// Unit direction from start to end; ZERO when length is zero
    pub dir: FixedVec2,
    /// Euclidean length
    pub length: Fixed,
}

impl PathSegment {
    /// Create a segment and compute its derived fields.
    pub fn new(start: FixedVec2, end: FixedVec2) -> Self {
        let mut seg = Self {
            start,
            end,
            dir: FixedVec2::ZERO,
            length: 0,
        };
        seg.update();
        seg
    }

    /// Recompute unit direction and length from the endpoints.
    ///
    /// Must be called any time an endpoint changes - this is the one
    /// mandatory invariant-restoring operation of the path engine.
    pub fn update(&mut self) {
        let delta = self.end.sub(self.start);
        self.length = delta.length();
        self.dir = if self.length == 0 {
            FixedVec2::ZERO
        } else {
            delta.div_scalar(self.length)
        };
    }

    /// Point at `distance` along the segment from its start.
    pub fn point_at(&self, distance: Fixed) -> FixedVec2 {
        self.start.add(self.dir.scale(distance))
    }
}

/// A named polyline. Followers reference it by identifier (a weak,
/// name-based back-reference); the path tracks its linked followers so
/// level teardown can clear their bindings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Path {
    /// Unique identifier within the level
    pub identifier: String,
    /// Anchor position in level coordinates; segment coordinates are
    /// relative to this
    pub anchor: FixedVec2,
    /// Ordered segment list
    pub segments: Vec<PathSegment>,
    /// Terminus behavior
    pub mode: PathMode,
    /// Sprites currently bound to this path
    pub followers: Vec<SpriteId>,
}

impl Path {
    /// Create an empty path.
    pub fn new(identifier: &str, anchor: FixedVec2, mode: PathMode) -> Self {
        Self {
            identifier: identifier.to_string(),
            anchor,
            segments: Vec::new(),
            mode,
            followers: Vec::new(),
        }
    }

    /// Append a segment.
    pub fn add_segment(&mut self, start: FixedVec2, end: FixedVec2) {
        self.segments.push(PathSegment::new(start, end));
    }

    /// Total arc length over all segments.
    pub fn total_length(&self) -> Fixed {
        self.segments
            .iter()
            .fold(0, |acc: Fixed, seg| acc.wrapping_add(seg.length))
    }

    /// Register a follower so it can be unbound on destruction.
    pub fn link_follower(&mut self, id: SpriteId) {
        if !self.followers.contains(&id) {
            self.followers.push(id);
        }
    }

    /// Remove a follower registration.
    pub fn unlink_follower(&mut self, id: SpriteId) {
        self.followers.retain(|f| *f != id);
    }
}

/// Per-follower traversal cursor.
///
/// Owned by the follower; references a [`Path`] only through the
/// follower's stored identifier, which may legitimately not resolve
/// during partial level loads. All movement on an unresolved path is a
/// no-op returning `false`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathState {
    /// Current segment index
    pub segment_index: usize,
    /// Arc-length position within the current segment
    pub segment_pos: Fixed,
    /// Traversal direction
    pub forward: bool,
    /// Cached path-local offset of the cursor
    pub offset: FixedVec2,
}

impl Default for PathState {
    fn default() -> Self {
        Self {
            segment_index: 0,
            segment_pos: 0,
            forward: true,
            offset: FixedVec2::ZERO,
        }
    }
}

impl PathState {
    /// Reset the cursor to the first segment's start, moving forward.
    pub fn move_start_forward(&mut self, path: &Path) {
        self.segment_index = 0;
        self.segment_pos = 0;
        self.forward = true;
        self.refresh_offset(path);
    }

    /// Reset the cursor to the last segment's end, moving backward.
    pub fn move_start_backward(&mut self, path: &Path) {
        if path.segments.is_empty() {
            *self = Self::default();
            self.forward = false;
            return;
        }
        self.segment_index = path.segments.len() - 1;
        self.segment_pos = path.segments[self.segment_index].length;
        self.forward = false;
        self.refresh_offset(path);
    }

    /// Flip the traversal direction without moving.
    pub fn move_toggle(&mut self) {
        self.forward = !self.forward;
    }

    /// Advance the cursor along the path by `distance` units of arc
    /// length, crossing segment boundaries as needed. The traversal
    /// direction comes from the internal forward/backward flag.
    ///
    /// Return contract (asymmetric between modes, by design - callers
    /// must handle both):
    ///
    /// * `Mirror` mode: returns `false` exactly when the cursor reaches
    ///   a terminus; the position clamps at the terminus and stays there
    ///   until the caller reverses direction with [`move_toggle`].
    /// * `Rewind` mode: the cursor silently wraps to the opposite
    ///   terminus and continues; the call keeps returning `true`.
    ///
    /// A `None` path (unresolved identifier) or an empty/zero-length
    /// segment list is a no-op returning `false` - never an error.
    ///
    /// [`move_toggle`]: PathState::move_toggle
    pub fn path_move(&mut self, path: Option<&Path>, distance: Fixed) -> bool {
        let Some(path) = path else {
            return false;
        };
        if path.segments.is_empty() || path.total_length() == 0 {
            return false;
        }

        // Clamp a stale index (editor may have removed segments)
        if self.segment_index >= path.segments.len() {
            self.segment_index = path.segments.len() - 1;
            self.segment_pos = 0;
        }

        let mut remaining = distance.max(0);
        let result = loop {
            let seg = &path.segments[self.segment_index];

            if self.forward {
                let seg_left = seg.length.wrapping_sub(self.segment_pos);
                if remaining <= seg_left {
                    self.segment_pos = self.segment_pos.wrapping_add(remaining);
                    break true;
                }
                remaining = remaining.wrapping_sub(seg_left);

                if self.segment_index + 1 < path.segments.len() {
                    self.segment_index += 1;
                    self.segment_pos = 0;
                } else {
                    match path.mode {
                        PathMode::Mirror => {
                            self.segment_pos = seg.length;
                            break false;
                        }
                        PathMode::Rewind => {
                            self.segment_index = 0;
                            self.segment_pos = 0;
                        }
                    }
                }
            } else {
                let seg_left = self.segment_pos;
                if remaining <= seg_left {
                    self.segment_pos = self.segment_pos.wrapping_sub(remaining);
                    break true;
                }
                remaining = remaining.wrapping_sub(seg_left);

                if self.segment_index > 0 {
                    self.segment_index -= 1;
                    self.segment_pos = path.segments[self.segment_index].length;
                } else {
                    match path.mode {
                        PathMode::Mirror => {
                            self.segment_pos = 0;
                            break false;
                        }
                        PathMode::Rewind => {
                            self.segment_index = path.segments.len() - 1;
                            self.segment_pos = path.segments[self.segment_index].length;
                        }
                    }
                }
            }
        };

        self.refresh_offset(path);
        result
    }

    /// Recompute the cached path-local offset from the cursor.
    fn refresh_offset(&mut self, path: &Path) {
        if let Some(seg) = path.segments.get(self.segment_index) {
            self.offset = seg.point_at(self.segment_pos);
        }
    }

    /// Cursor position in level coordinates.
    pub fn level_position(&self, path: &Path) -> FixedVec2 {
        path.anchor.add(self.offset)
    }
}

/// Resolve a path identifier against a level's path table.
///
/// A missing identifier returns `None` - paths may legitimately not
/// exist yet during partial level loads.
pub fn resolve_path<'a>(paths: &'a BTreeMap<String, Path>, identifier: &str) -> Option<&'a Path> {
    paths.get(identifier)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{fixed_abs, to_fixed, FIXED_ONE};
    use proptest::prelude::*;

    fn l_path(mode: PathMode) -> Path {
        // 10 right, then 5 down: total length 15
        let mut path = Path::new("patrol", FixedVec2::ZERO, mode);
        path.add_segment(FixedVec2::ZERO, FixedVec2::new(to_fixed(10.0), 0));
        path.add_segment(
            FixedVec2::new(to_fixed(10.0), 0),
            FixedVec2::new(to_fixed(10.0), to_fixed(5.0)),
        );
        path
    }

    #[test]
    fn test_segment_update_invariants() {
        let seg = PathSegment::new(FixedVec2::ZERO, FixedVec2::new(to_fixed(3.0), to_fixed(4.0)));
        assert!((seg.length - to_fixed(5.0)).abs() < 300, "length should be ~5.0");
        // Unit direction magnitude ~1
        let mag = seg.dir.length();
        assert!((mag - FIXED_ONE).abs() < 300, "direction should be unit length");

        // Zero-length segment: zero direction, zero length
        let zero = PathSegment::new(FixedVec2::ZERO, FixedVec2::ZERO);
        assert_eq!(zero.length, 0);
        assert_eq!(zero.dir, FixedVec2::ZERO);
    }

    #[test]
    fn test_segment_update_after_endpoint_change() {
        let mut seg = PathSegment::new(FixedVec2::ZERO, FixedVec2::new(to_fixed(1.0), 0));
        seg.end = FixedVec2::new(0, to_fixed(2.0));
        seg.update();
        assert!((seg.length - to_fixed(2.0)).abs() < 300);
        assert!(seg.dir.y > 0 && seg.dir.x == 0);
    }

    #[test]
    fn test_move_crosses_segment_boundary() {
        let path = l_path(PathMode::Mirror);
        let mut state = PathState::default();
        state.move_start_forward(&path);

        // 12 units: 10 along segment 0, 2 into segment 1
        assert!(state.path_move(Some(&path), to_fixed(12.0)));
        assert_eq!(state.segment_index, 1);
        assert!(fixed_abs(state.segment_pos - to_fixed(2.0)) < 300);
        assert!(fixed_abs(state.offset.x - to_fixed(10.0)) < 300);
        assert!(fixed_abs(state.offset.y - to_fixed(2.0)) < 300);
    }

    #[test]
    fn test_mirror_clamps_and_returns_false() {
        let path = l_path(PathMode::Mirror);
        let mut state = PathState::default();
        state.move_start_forward(&path);

        // Overshoot the 15-unit path
        assert!(!state.path_move(Some(&path), to_fixed(20.0)));
        // Clamped exactly at the terminus
        assert_eq!(state.segment_index, 1);
        assert_eq!(state.segment_pos, path.segments[1].length);

        // Stays clamped and keeps reporting false until the caller toggles
        assert!(!state.path_move(Some(&path), to_fixed(1.0)));
        assert_eq!(state.segment_pos, path.segments[1].length);

        state.move_toggle();
        assert!(state.path_move(Some(&path), to_fixed(1.0)));
        assert!(state.segment_pos < path.segments[1].length);
    }

    #[test]
    fn test_rewind_wraps_and_never_returns_false() {
        let path = l_path(PathMode::Rewind);
        let mut state = PathState::default();
        state.move_start_forward(&path);

        for _ in 0..100 {
            assert!(state.path_move(Some(&path), to_fixed(4.0)));
        }
    }

    #[test]
    fn test_rewind_wrap_position() {
        let path = l_path(PathMode::Rewind);
        let mut state = PathState::default();
        state.move_start_forward(&path);

        // 16 units on a 15-unit path: wraps to 1 unit past the start
        assert!(state.path_move(Some(&path), to_fixed(16.0)));
        assert_eq!(state.segment_index, 0);
        assert!(fixed_abs(state.segment_pos - to_fixed(1.0)) < 600);
    }

    #[test]
    fn test_backward_traversal() {
        let path = l_path(PathMode::Mirror);
        let mut state = PathState::default();
        state.move_start_backward(&path);

        assert!(state.path_move(Some(&path), to_fixed(7.0)));
        // 5 back through segment 1, 2 into segment 0
        assert_eq!(state.segment_index, 0);
        assert!(fixed_abs(state.segment_pos - to_fixed(8.0)) < 600);

        // Run to the start terminus
        assert!(!state.path_move(Some(&path), to_fixed(20.0)));
        assert_eq!(state.segment_index, 0);
        assert_eq!(state.segment_pos, 0);
    }

    #[test]
    fn test_unbound_path_is_noop() {
        let mut state = PathState::default();
        assert!(!state.path_move(None, to_fixed(5.0)));
        assert_eq!(state, PathState::default());
    }

    #[test]
    fn test_empty_path_cannot_move() {
        let path = Path::new("empty", FixedVec2::ZERO, PathMode::Rewind);
        let mut state = PathState::default();
        assert!(!state.path_move(Some(&path), to_fixed(5.0)));
    }

    #[test]
    fn test_follower_links() {
        let mut path = l_path(PathMode::Mirror);
        path.link_follower(SpriteId(3));
        path.link_follower(SpriteId(3));
        path.link_follower(SpriteId(5));
        assert_eq!(path.followers, vec![SpriteId(3), SpriteId(5)]);

        path.unlink_follower(SpriteId(3));
        assert_eq!(path.followers, vec![SpriteId(5)]);
    }

    proptest! {
        #[test]
        fn prop_rewind_always_moves(step in 1i32..to_fixed(6.0)) {
            let path = l_path(PathMode::Rewind);
            let mut state = PathState::default();
            state.move_start_forward(&path);

            for _ in 0..50 {
                prop_assert!(state.path_move(Some(&path), step));
                // Cursor stays within the current segment's bounds
                let seg = &path.segments[state.segment_index];
                prop_assert!(state.segment_pos >= 0);
                prop_assert!(state.segment_pos <= seg.length);
            }
        }

        #[test]
        fn prop_mirror_forward_is_monotonic(step in 1i32..to_fixed(2.0)) {
            let path = l_path(PathMode::Mirror);
            let mut state = PathState::default();
            state.move_start_forward(&path);

            let mut last = (state.segment_index, state.segment_pos);
            loop {
                let moved = state.path_move(Some(&path), step);
                let now = (state.segment_index, state.segment_pos);
                prop_assert!(now >= last, "mirror cursor must be monotonic");
                last = now;
                if !moved {
                    break;
                }
            }
            // Ended exactly at the terminus
            prop_assert_eq!(state.segment_index, path.segments.len() - 1);
            prop_assert_eq!(state.segment_pos, path.segments[1].length);
        }
    }
}
