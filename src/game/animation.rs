//! Timed Image-List Animation
//!
//! The rendering/state foundation for all visible moving entities. An
//! animation owns an ordered list of (surface name, duration) pairs and
//! advances through a configurable sub-range of it as simulated time
//! accumulates. The core never touches pixel data - surfaces are names
//! resolved by the rendering collaborator.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::fixed::{fixed_mul, Fixed, FIXED_ONE};

/// One animation frame: a surface name plus how long it is shown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimFrame {
    /// Surface name, resolved by the rendering collaborator
    pub surface: String,
    /// Display duration in fixed-point seconds
    pub duration: Fixed,
}

/// Animation component: image list, cycling sub-range and time cursor.
///
/// Not every stored image has to be part of the cycling range; explicit
/// `set_image` calls can point at any stored index.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnimationFrames {
    frames: Vec<AnimFrame>,

    /// Currently displayed frame, `None` until an image is set
    current: Option<usize>,

    /// First index of the cycling range (inclusive)
    start_index: usize,

    /// Last index of the cycling range (inclusive)
    end_index: usize,

    /// Accumulated time not yet consumed by frame advances
    accumulated: Fixed,

    /// Animation speed modifier (FIXED_ONE = authored speed)
    pub speed_modifier: Fixed,

    /// Whether the cycling advance runs at all
    pub enabled: bool,
}

impl Default for AnimationFrames {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationFrames {
    /// Create an empty animation.
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            current: None,
            start_index: 0,
            end_index: 0,
            accumulated: 0,
            speed_modifier: FIXED_ONE,
            enabled: true,
        }
    }

    /// Append a frame. The cycling range grows to include it.
    pub fn add_frame(&mut self, surface: &str, duration: Fixed) {
        self.frames.push(AnimFrame {
            surface: surface.to_string(),
            duration,
        });
        self.end_index = self.frames.len() - 1;
        if self.current.is_none() {
            self.current = Some(0);
        }
    }

    /// Number of stored frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True when no frames are stored.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Restrict the cycling range to a stored sub-range.
    ///
    /// Out-of-range bounds are an authoring error: logged and clamped.
    pub fn set_range(&mut self, start: usize, end: usize) {
        if self.frames.is_empty() {
            warn!(start, end, "animation range set on empty image list");
            return;
        }
        let max = self.frames.len() - 1;
        if start > max || end > max || start > end {
            warn!(start, end, frames = self.frames.len(), "animation range out of bounds, clamping");
        }
        self.start_index = start.min(max);
        self.end_index = end.min(max).max(self.start_index);
    }

    /// Point the displayed image at an explicit stored index.
    ///
    /// An out-of-range index is a recoverable authoring error: a warning
    /// is logged and the image is left unset.
    pub fn set_image(&mut self, index: usize) {
        if index >= self.frames.len() {
            warn!(index, frames = self.frames.len(), "animation image index out of range, image left unset");
            self.current = None;
            return;
        }
        self.current = Some(index);
        self.accumulated = 0;
    }

    /// Surface name of the currently displayed frame, if any.
    pub fn current_surface(&self) -> Option<&str> {
        self.current
            .and_then(|i| self.frames.get(i))
            .map(|f| f.surface.as_str())
    }

    /// Currently displayed frame index, if any.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Advance the animation by `dt` seconds of simulated time.
    ///
    /// Elapsed time is scaled by the speed modifier; when the accumulated
    /// time exceeds the current frame's duration the index advances,
    /// wrapping from the end of the cycling range back to its start.
    pub fn update(&mut self, dt: Fixed) {
        if !self.enabled || self.frames.is_empty() {
            return;
        }

        let Some(mut index) = self.current else {
            return;
        };

        // A frame outside the cycling range does not advance; it stays
        // until re-pointed (explicitly set images are sticky).
        if index < self.start_index || index > self.end_index {
            return;
        }

        self.accumulated = self
            .accumulated
            .wrapping_add(fixed_mul(dt, self.speed_modifier));

        loop {
            let duration = self.frames[index].duration;
            if duration <= 0 || self.accumulated < duration {
                break;
            }
            self.accumulated -= duration;
            index = if index >= self.end_index {
                self.start_index
            } else {
                index + 1
            };
        }

        self.current = Some(index);
    }

    /// Reset the cursor to the start of the cycling range.
    pub fn reset(&mut self) {
        if !self.frames.is_empty() {
            self.current = Some(self.start_index);
        }
        self.accumulated = 0;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{to_fixed, FRAME_DT};

    // Exactly six ticks per image, so advances land on tick boundaries
    const FRAME_TIME: Fixed = FRAME_DT * 6;

    fn three_frame_anim() -> AnimationFrames {
        let mut anim = AnimationFrames::new();
        anim.add_frame("walk_0", FRAME_TIME);
        anim.add_frame("walk_1", FRAME_TIME);
        anim.add_frame("walk_2", FRAME_TIME);
        anim
    }

    #[test]
    fn test_advance_and_wrap() {
        let mut anim = three_frame_anim();
        assert_eq!(anim.current_surface(), Some("walk_0"));

        // Six ticks of accumulated time reach the frame duration exactly
        for _ in 0..6 {
            anim.update(FRAME_DT);
        }
        assert_eq!(anim.current_surface(), Some("walk_1"));

        for _ in 0..12 {
            anim.update(FRAME_DT);
        }
        // Wrapped past walk_2 back to walk_0
        assert_eq!(anim.current_surface(), Some("walk_0"));
    }

    #[test]
    fn test_subrange_wraps_to_range_start() {
        let mut anim = three_frame_anim();
        anim.set_range(1, 2);
        anim.set_image(1);

        for _ in 0..12 {
            anim.update(FRAME_DT);
        }
        // Cycled 1 -> 2 -> 1, never back to index 0
        assert_eq!(anim.current_index(), Some(1));
    }

    #[test]
    fn test_out_of_range_image_left_unset() {
        let mut anim = three_frame_anim();
        anim.set_image(99);
        assert_eq!(anim.current_surface(), None);

        // Updating an unset animation is a no-op, not a crash
        anim.update(FRAME_DT);
        assert_eq!(anim.current_surface(), None);
    }

    #[test]
    fn test_speed_modifier() {
        let mut anim = three_frame_anim();
        anim.speed_modifier = to_fixed(2.0);

        // Double speed: 3 ticks instead of 6 to advance
        for _ in 0..3 {
            anim.update(FRAME_DT);
        }
        assert_eq!(anim.current_surface(), Some("walk_1"));
    }

    #[test]
    fn test_disabled_does_not_advance() {
        let mut anim = three_frame_anim();
        anim.enabled = false;

        for _ in 0..100 {
            anim.update(FRAME_DT);
        }
        assert_eq!(anim.current_surface(), Some("walk_0"));
    }

    #[test]
    fn test_explicit_image_outside_range_is_sticky() {
        let mut anim = three_frame_anim();
        anim.set_range(0, 1);
        anim.set_image(2);

        for _ in 0..100 {
            anim.update(FRAME_DT);
        }
        // Index 2 is outside the cycling range: stays put
        assert_eq!(anim.current_index(), Some(2));
    }
}
