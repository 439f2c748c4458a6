//! Sprite Model
//!
//! Every visible or interactive object in a level is a [`Sprite`]: a
//! shared [`SpriteBase`] (position, velocity, collision rect, animation)
//! plus a kind-specific payload. Sprites live in a [`SpriteManager`]
//! keyed by [`SpriteId`]; iteration order over the manager is the id
//! order, which keeps the simulation deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::rect::FixedRect;
use crate::core::vec2::FixedVec2;
use crate::game::animation::AnimationFrames;
use crate::game::ball::BallData;
use crate::game::boxes::{BoxData, ItemType};
use crate::game::follower::{EnemyData, PlatformData};
use crate::game::player::PlayerData;

// =============================================================================
// IDENTITY
// =============================================================================

/// Stable handle to a sprite within one level.
///
/// Ids are never reused within a level's lifetime, so a stale handle
/// held across a destruction simply stops resolving instead of aliasing
/// a new sprite.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SpriteId(pub u32);

impl std::fmt::Display for SpriteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Collision-behavior class of a sprite. This is what the pairwise
/// collision validation keys on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrayKind {
    /// Decoration; never collides
    Passive,
    /// Solid terrain; blocks from every side
    Massive,
    /// Solid only when landed on from above
    HalfMassive,
    /// Overlappable; reported for climbing logic, never blocks
    Climbable,
    /// Interactive object (boxes, items, projectiles)
    Active,
    /// Hostile object
    Enemy,
    /// The player
    Player,
    /// Deadly surface
    Lava,
    /// Not yet classified; treated as passive
    Unknown,
}

impl ArrayKind {
    /// Parse the kind from its level-file attribute value.
    pub fn from_attr(value: &str) -> Self {
        match value {
            "passive" => Self::Passive,
            "massive" => Self::Massive,
            "halfmassive" => Self::HalfMassive,
            "climbable" => Self::Climbable,
            "active" => Self::Active,
            "enemy" => Self::Enemy,
            "player" => Self::Player,
            "lava" => Self::Lava,
            _ => Self::Unknown,
        }
    }

    /// Level-file attribute value for this kind.
    pub fn as_attr(&self) -> &'static str {
        match self {
            Self::Passive => "passive",
            Self::Massive => "massive",
            Self::HalfMassive => "halfmassive",
            Self::Climbable => "climbable",
            Self::Active => "active",
            Self::Enemy => "enemy",
            Self::Player => "player",
            Self::Lava => "lava",
            Self::Unknown => "unknown",
        }
    }
}

/// Coarse dispatch category of a collision partner. Collision handlers
/// match on `(own kind, partner category)` pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    /// The player sprite
    Player,
    /// An enemy sprite
    Enemy,
    /// Massive or half-massive terrain
    Massive,
    /// A box sprite
    Box,
    /// Anything else
    Other,
}

// =============================================================================
// SPRITE
// =============================================================================

/// State shared by every sprite kind.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpriteBase {
    /// Stable handle
    pub id: SpriteId,
    /// Current position (top-left, level coordinates, +y down)
    pub pos: FixedVec2,
    /// Authored start position; the respawn / editor-reset target
    pub start_pos: FixedVec2,
    /// Velocity in units per second
    pub vel: FixedVec2,
    /// Collision rect offset relative to `pos`
    pub col_offset: FixedVec2,
    /// Collision rect size
    pub col_size: FixedVec2,
    /// Draw size (may differ from the collision size)
    pub draw_size: FixedVec2,
    /// Collision-behavior class
    pub array: ArrayKind,
    /// Current image identifier
    pub image: String,
    /// Timed animation component
    pub animation: AnimationFrames,
    /// True for sprites created at runtime (projectiles, spawned
    /// items, particles). Spawned sprites are never saved and never
    /// act as collision targets.
    pub spawned: bool,
    /// Latched once destruction is requested; guards idempotence
    pub auto_destroy: bool,
    /// Inactive sprites are skipped by update and collision
    pub active: bool,
}

impl SpriteBase {
    /// Create a sprite base at `pos` with the given collision size.
    pub fn new(id: SpriteId, pos: FixedVec2, col_size: FixedVec2) -> Self {
        Self {
            id,
            pos,
            start_pos: pos,
            vel: FixedVec2::ZERO,
            col_offset: FixedVec2::ZERO,
            col_size,
            draw_size: col_size,
            array: ArrayKind::Unknown,
            image: String::new(),
            animation: AnimationFrames::new(),
            spawned: false,
            auto_destroy: false,
            active: true,
        }
    }

    /// Collision rectangle at the current position.
    pub fn col_rect(&self) -> FixedRect {
        FixedRect::new(self.pos.add(self.col_offset), self.col_size)
    }

    /// Collision rectangle the sprite would occupy at `pos`.
    pub fn col_rect_at(&self, pos: FixedVec2) -> FixedRect {
        FixedRect::new(pos.add(self.col_offset), self.col_size)
    }

    /// Move so the collision rect's top-left lands at `rect_pos`.
    pub fn set_col_rect_pos(&mut self, rect_pos: FixedVec2) {
        self.pos = rect_pos.sub(self.col_offset);
    }
}

/// Kind-specific sprite payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SpriteKind {
    /// Static level geometry or decoration
    Terrain,
    /// The controllable player
    Player(PlayerData),
    /// A hostile sprite, optionally path-bound
    Enemy(EnemyData),
    /// A hittable box
    Box(BoxData),
    /// A ball projectile
    Ball(BallData),
    /// A path-following moving platform
    Platform(PlatformData),
    /// A collectible item
    Item(ItemType),
    /// A short-lived visual particle
    Particle,
}

/// A level object: shared base plus kind payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Sprite {
    /// Shared state
    pub base: SpriteBase,
    /// Kind payload
    pub kind: SpriteKind,
}

impl Sprite {
    /// Coarse dispatch category of this sprite as a collision partner.
    pub fn category(&self) -> Category {
        match &self.kind {
            SpriteKind::Player(_) => Category::Player,
            SpriteKind::Enemy(_) => Category::Enemy,
            SpriteKind::Box(_) => Category::Box,
            _ => match self.base.array {
                ArrayKind::Massive | ArrayKind::HalfMassive => Category::Massive,
                _ => Category::Other,
            },
        }
    }

    /// Whether this sprite may be the *target* of a collision.
    /// Spawned and inactive sprites still move and sweep, but nothing
    /// collides against them.
    pub fn collision_target(&self) -> bool {
        self.base.active && !self.base.spawned && !self.base.auto_destroy
    }
}

// =============================================================================
// MANAGER
// =============================================================================

/// Owning arena for a level's sprites.
///
/// The map is a `BTreeMap` so that iteration is by ascending id, which
/// is also creation order. Destruction is two-phase: `mark_destroyed`
/// latches the flag mid-frame, `sweep_removed` actually drops the
/// entries at a well-defined point after all handlers ran.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SpriteManager {
    sprites: BTreeMap<SpriteId, Sprite>,
    next_id: u32,
}

impl SpriteManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next sprite id without inserting anything.
    pub fn alloc_id(&mut self) -> SpriteId {
        let id = SpriteId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Insert a sprite built from a base and kind, returning its id.
    pub fn add(&mut self, base: SpriteBase, kind: SpriteKind) -> SpriteId {
        let id = base.id;
        debug_assert!(!self.sprites.contains_key(&id));
        self.sprites.insert(id, Sprite { base, kind });
        id
    }

    /// Resolve a handle. Stale handles return `None`.
    pub fn get(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.get(&id)
    }

    /// Resolve a handle mutably.
    pub fn get_mut(&mut self, id: SpriteId) -> Option<&mut Sprite> {
        self.sprites.get_mut(&id)
    }

    /// Number of live sprites (including ones marked for destruction
    /// but not yet swept).
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    /// True when no sprites are live.
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Iterate sprites in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&SpriteId, &Sprite)> {
        self.sprites.iter()
    }

    /// Iterate sprites mutably in id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&SpriteId, &mut Sprite)> {
        self.sprites.iter_mut()
    }

    /// All live ids in ascending order. Snapshotting the id list lets
    /// update loops mutate the manager while walking a stable order.
    pub fn ids(&self) -> Vec<SpriteId> {
        self.sprites.keys().copied().collect()
    }

    /// Request destruction of a sprite. Returns `true` only for the
    /// first request; repeat calls (and calls on stale handles) return
    /// `false` and have no effect.
    pub fn mark_destroyed(&mut self, id: SpriteId) -> bool {
        match self.sprites.get_mut(&id) {
            Some(sprite) if !sprite.base.auto_destroy => {
                sprite.base.auto_destroy = true;
                sprite.base.active = false;
                debug!(sprite = %id, "sprite marked for destruction");
                true
            }
            _ => false,
        }
    }

    /// Drop every sprite marked for destruction, returning their ids
    /// so the caller can unlink weak references.
    pub fn sweep_removed(&mut self) -> Vec<SpriteId> {
        let removed: Vec<SpriteId> = self
            .sprites
            .iter()
            .filter(|(_, s)| s.base.auto_destroy)
            .map(|(id, _)| *id)
            .collect();
        for id in &removed {
            self.sprites.remove(id);
        }
        removed
    }

    /// Topmost sprite whose collision rect contains `point`, searching
    /// from the highest id down (later objects draw on top).
    pub fn from_position(&self, point: FixedVec2) -> Option<SpriteId> {
        self.sprites
            .iter()
            .rev()
            .find(|(_, s)| s.base.active && s.base.col_rect().contains_point(point))
            .map(|(id, _)| *id)
    }
}

// Convenience constructors used by the loader and the demo binary.
impl SpriteManager {
    /// Add a static terrain sprite of the given collision class.
    pub fn add_terrain(
        &mut self,
        pos: FixedVec2,
        size: FixedVec2,
        array: ArrayKind,
        image: &str,
    ) -> SpriteId {
        let id = self.alloc_id();
        let mut base = SpriteBase::new(id, pos, size);
        base.array = array;
        base.image = image.to_string();
        self.add(base, SpriteKind::Terrain)
    }

    /// Spawn a runtime sprite: marked spawned, excluded from saves and
    /// from being a collision target.
    pub fn spawn(&mut self, mut base: SpriteBase, kind: SpriteKind) -> SpriteId {
        base.spawned = true;
        self.add(base, kind)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::to_fixed;

    fn base_at(mgr: &mut SpriteManager, x: f64, y: f64) -> SpriteBase {
        let id = mgr.alloc_id();
        SpriteBase::new(
            id,
            FixedVec2::new(to_fixed(x), to_fixed(y)),
            FixedVec2::new(to_fixed(1.0), to_fixed(1.0)),
        )
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut mgr = SpriteManager::new();
        let b = base_at(&mut mgr, 0.0, 0.0);
        let first = mgr.add(b, SpriteKind::Terrain);

        assert!(mgr.mark_destroyed(first));
        mgr.sweep_removed();

        let b = base_at(&mut mgr, 0.0, 0.0);
        let second = mgr.add(b, SpriteKind::Terrain);
        assert_ne!(first, second);
        assert!(mgr.get(first).is_none(), "stale handle must not resolve");
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut mgr = SpriteManager::new();
        let b = base_at(&mut mgr, 0.0, 0.0);
        let id = mgr.add(b, SpriteKind::Terrain);

        assert!(mgr.mark_destroyed(id));
        assert!(!mgr.mark_destroyed(id), "second request must be a no-op");
        assert_eq!(mgr.sweep_removed(), vec![id]);
        assert!(!mgr.mark_destroyed(id), "stale handle must be a no-op");
    }

    #[test]
    fn test_marked_sprite_survives_until_sweep() {
        let mut mgr = SpriteManager::new();
        let b = base_at(&mut mgr, 0.0, 0.0);
        let id = mgr.add(b, SpriteKind::Terrain);

        mgr.mark_destroyed(id);
        assert!(mgr.get(id).is_some(), "entry lives until the sweep");
        assert!(!mgr.get(id).unwrap().collision_target());
        mgr.sweep_removed();
        assert!(mgr.get(id).is_none());
    }

    #[test]
    fn test_iteration_is_id_ordered() {
        let mut mgr = SpriteManager::new();
        let ids: Vec<SpriteId> = (0..5)
            .map(|i| {
                let b = base_at(&mut mgr, f64::from(i), 0.0);
                mgr.add(b, SpriteKind::Terrain)
            })
            .collect();
        let seen: Vec<SpriteId> = mgr.iter().map(|(id, _)| *id).collect();
        assert_eq!(seen, ids);
    }

    #[test]
    fn test_from_position_prefers_topmost() {
        let mut mgr = SpriteManager::new();
        let a = mgr.add_terrain(
            FixedVec2::ZERO,
            FixedVec2::new(to_fixed(2.0), to_fixed(2.0)),
            ArrayKind::Massive,
            "ground",
        );
        let b = mgr.add_terrain(
            FixedVec2::ZERO,
            FixedVec2::new(to_fixed(2.0), to_fixed(2.0)),
            ArrayKind::Passive,
            "overlay",
        );
        assert!(a < b);
        let hit = mgr.from_position(FixedVec2::new(to_fixed(1.0), to_fixed(1.0)));
        assert_eq!(hit, Some(b), "later sprite draws on top and wins picking");
    }

    #[test]
    fn test_spawned_sprites_are_not_targets() {
        let mut mgr = SpriteManager::new();
        let b = base_at(&mut mgr, 0.0, 0.0);
        let id = mgr.spawn(b, SpriteKind::Particle);
        let sprite = mgr.get(id).unwrap();
        assert!(sprite.base.spawned);
        assert!(!sprite.collision_target());
    }

    #[test]
    fn test_array_kind_attr_round_trip() {
        for kind in [
            ArrayKind::Passive,
            ArrayKind::Massive,
            ArrayKind::HalfMassive,
            ArrayKind::Climbable,
            ArrayKind::Active,
            ArrayKind::Enemy,
            ArrayKind::Player,
            ArrayKind::Lava,
        ] {
            assert_eq!(ArrayKind::from_attr(kind.as_attr()), kind);
        }
        assert_eq!(ArrayKind::from_attr("garbage"), ArrayKind::Unknown);
    }

    #[test]
    fn test_col_rect_uses_offset() {
        let mut mgr = SpriteManager::new();
        let mut b = base_at(&mut mgr, 5.0, 5.0);
        b.col_offset = FixedVec2::new(to_fixed(0.25), to_fixed(0.5));
        let rect = b.col_rect();
        assert_eq!(rect.pos.x, to_fixed(5.25));
        assert_eq!(rect.pos.y, to_fixed(5.5));

        b.set_col_rect_pos(FixedVec2::new(to_fixed(1.0), to_fixed(1.0)));
        assert_eq!(b.pos.x, to_fixed(0.75));
        assert_eq!(b.pos.y, to_fixed(0.5));
    }
}
