//! Level Manager
//!
//! Owns every runtime structure of one level and steps the simulation
//! with a fixed-order frame pipeline:
//!
//! 1. animation and background updates
//! 2. object updates (boxes, balls, enemies, platforms)
//! 3. player input and physics
//! 4. player-vs-world collision resolution and handlers
//! 5. late updates (platform rider carry)
//! 6. object-vs-object collision resolution
//! 7. camera update, then the destroyed-sprite flush
//!
//! The order is part of the determinism contract: the same level, seed
//! and input sequence always produce the same state hash.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::fixed::{
    fixed_mul, to_fixed, Fixed, FRAME_DT, GRAVITY, MAX_FALL_VELOCITY, SPIN_EXTENSION_SECONDS,
};
use crate::core::hash::{compute_state_hash, StateHash};
use crate::core::rect::FixedRect;
use crate::core::rng::DeterministicRng;
use crate::core::vec2::FixedVec2;
use crate::game::ball::{self, BallOutcome};
use crate::game::boxes::{BoxContent, BoxKind, ItemType};
use crate::game::collision::{
    resolve_blocking, resolve_blocking_all, sweep_sprite, CollisionCheck, CollisionDirection,
    CollisionEvent,
};
use crate::game::context::{Camera, GameContext, GameMode};
use crate::game::events::GameEvent;
use crate::game::path::{Path, PathState};
use crate::game::player::{
    handle_player_collisions, note_ground_contact, shoot_ball, update_player, InputFrame,
};
use crate::game::sprite::{ArrayKind, Sprite, SpriteBase, SpriteId, SpriteKind, SpriteManager};

// =============================================================================
// CONFIG AND METADATA
// =============================================================================

/// Tunable core constants, stored with the level so a saved level
/// replays identically even if the defaults change later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Downward acceleration in units per second squared
    pub gravity: Fixed,
    /// Terminal fall velocity
    pub max_fall_velocity: Fixed,
    /// Invincibility window after a hit, in ticks
    pub hurt_invincible_ticks: u32,
    /// Camera flight speed along a path
    pub camera_flight_speed: Fixed,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            max_fall_velocity: MAX_FALL_VELOCITY,
            hurt_invincible_ticks: 120,
            camera_flight_speed: to_fixed(8.0),
        }
    }
}

/// Level metadata carried through load and save.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelInfo {
    /// Display name
    pub name: String,
    /// Author credit
    pub author: String,
    /// Music track asset path
    pub music: String,
}

/// A parallax background layer. Purely data here; the renderer derives
/// the scroll position from the camera and the speed factors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Background {
    /// Image asset path
    pub image: String,
    /// Parallax factor per axis; `FIXED_ONE` scrolls with the level
    pub speed: FixedVec2,
    /// Base offset in level coordinates
    pub offset: FixedVec2,
}

/// Everything one frame step produced.
#[derive(Clone, Debug, Default)]
pub struct FrameResult {
    /// Events, sorted by tick, priority, then sprite id
    pub events: Vec<GameEvent>,
    /// Sprites removed by the end-of-frame flush
    pub removed: Vec<SpriteId>,
}

/// An in-progress camera flight along a path.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct CameraFlight {
    path_id: String,
    state: PathState,
    prev_mode: GameMode,
}

// =============================================================================
// LEVEL
// =============================================================================

/// A loaded level and its full runtime state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Level {
    /// All sprites
    pub sprites: SpriteManager,
    /// Named paths
    pub paths: BTreeMap<String, Path>,
    /// Parallax background layers
    pub backgrounds: Vec<Background>,
    /// Metadata
    pub info: LevelInfo,
    /// File-format version this level was loaded from
    pub engine_version: i32,
    /// Playable area; the camera is limited to it and balls leaving it
    /// (except over the top) are destroyed
    pub bounds: FixedRect,
    /// Stored core constants
    pub config: CoreConfig,
    /// Runtime context (mode, camera, active player)
    pub context: GameContext,
    /// Simulation tick counter
    pub tick: u32,
    /// Seed the RNG was created from
    pub rng_seed: u64,
    /// Deterministic RNG for random box contents
    pub rng: DeterministicRng,
    #[serde(skip)]
    pending_events: Vec<GameEvent>,
    camera_flight: Option<CameraFlight>,
}

impl Level {
    /// Create an empty level over the given playable bounds.
    pub fn new(bounds: FixedRect, rng_seed: u64) -> Self {
        let camera = Camera::new(
            FixedVec2::new(to_fixed(10.0), to_fixed(7.5)),
            bounds,
        );
        Self {
            sprites: SpriteManager::new(),
            paths: BTreeMap::new(),
            backgrounds: Vec::new(),
            info: LevelInfo::default(),
            engine_version: crate::game::loader::CURRENT_ENGINE_VERSION,
            bounds,
            config: CoreConfig::default(),
            context: GameContext::new(camera),
            tick: 0,
            rng_seed,
            rng: DeterministicRng::new(rng_seed),
            pending_events: Vec::new(),
            camera_flight: None,
        }
    }

    /// Add a path, replacing any existing path with the same
    /// identifier.
    pub fn add_path(&mut self, path: Path) {
        if self.paths.insert(path.identifier.clone(), path).is_some() {
            warn!("replaced an existing path with the same identifier");
        }
    }

    /// Request destruction of a sprite. The first request emits a
    /// destruction event and returns `true`; repeats and stale handles
    /// are no-ops returning `false`. The sprite is actually removed by
    /// the end-of-frame flush.
    pub fn destroy_sprite(&mut self, id: SpriteId) -> bool {
        if self.sprites.mark_destroyed(id) {
            self.pending_events
                .push(GameEvent::sprite_destroyed(self.tick, id));
            true
        } else {
            false
        }
    }

    /// Step the simulation by one frame.
    pub fn update(&mut self, input: InputFrame) -> FrameResult {
        let dt = FRAME_DT;
        match self.context.mode {
            GameMode::Editor => return self.finish_frame(),
            GameMode::CameraFly => {
                self.tick = self.tick.wrapping_add(1);
                self.update_camera_flight(dt);
                return self.finish_frame();
            }
            GameMode::Normal => {}
        }

        self.tick = self.tick.wrapping_add(1);
        self.update_animations(dt);
        self.update_objects(dt);
        self.update_player_phase(input, dt);
        self.resolve_player();
        self.update_late();
        self.resolve_objects(dt);
        self.update_camera();
        self.finish_frame()
    }

    // =========================================================================
    // PIPELINE PHASES
    // =========================================================================

    fn update_animations(&mut self, dt: Fixed) {
        for (_, sprite) in self.sprites.iter_mut() {
            if !sprite.base.active {
                continue;
            }
            sprite.base.animation.update(dt);
            if let Some(surface) = sprite.base.animation.current_surface() {
                if sprite.base.image != surface {
                    sprite.base.image = surface.to_string();
                }
            }
        }
    }

    fn update_objects(&mut self, dt: Fixed) {
        for id in self.sprites.ids() {
            let dispatch = match self.sprites.get(id) {
                Some(sprite) if sprite.base.active => match &sprite.kind {
                    SpriteKind::Box(_) => ObjectDispatch::Box,
                    SpriteKind::Ball(_) => ObjectDispatch::Ball,
                    SpriteKind::Enemy(_) => ObjectDispatch::Enemy,
                    SpriteKind::Platform(_) => ObjectDispatch::Platform,
                    _ => continue,
                },
                _ => continue,
            };
            match dispatch {
                ObjectDispatch::Box => self.update_box(id, dt),
                ObjectDispatch::Ball => self.update_one_ball(id, dt),
                ObjectDispatch::Enemy => self.update_enemy(id, dt),
                ObjectDispatch::Platform => self.update_platform(id, dt),
            }
        }
    }

    fn update_box(&mut self, id: SpriteId, dt: Fixed) {
        let expired = {
            let Some(sprite) = self.sprites.get_mut(id) else {
                return;
            };
            let SpriteKind::Box(data) = &mut sprite.kind else {
                return;
            };
            data.update_bump(dt);
            data.tick_spin(dt)
        };
        if !expired {
            return;
        }

        // The spin window wants to close; it may not while someone is
        // standing inside the box.
        let obstructed = {
            let Some(sprite) = self.sprites.get(id) else {
                return;
            };
            let rect = sprite.base.col_rect();
            self.sprites.iter().any(|(other_id, other)| {
                *other_id != id
                    && other.base.active
                    && matches!(
                        other.base.array,
                        ArrayKind::Player | ArrayKind::Enemy
                    )
                    && rect.intersects(&other.base.col_rect())
            })
        };

        let Some(sprite) = self.sprites.get_mut(id) else {
            return;
        };
        let SpriteKind::Box(data) = &mut sprite.kind else {
            return;
        };
        if obstructed {
            data.extend_spin(SPIN_EXTENSION_SECONDS);
        } else {
            data.close_spin();
            sprite.base.array = data.effective_array();
        }
    }

    fn update_one_ball(&mut self, id: SpriteId, dt: Fixed) {
        let bounds = self.bounds;
        let mut emit_particle = None;
        let mut gone = false;
        if let Some(sprite) = self.sprites.get_mut(id) {
            let Sprite { base, kind } = sprite;
            if let SpriteKind::Ball(data) = kind {
                if ball::update_ball(base, data, dt) {
                    emit_particle = Some((base.pos, data.element));
                }
                gone = ball::out_of_bounds(base.pos, base.col_size, bounds);
            }
        }
        if let Some((pos, element)) = emit_particle {
            self.pending_events
                .push(GameEvent::particle_emitted(self.tick, pos, element));
        }
        if gone {
            debug!(sprite = %id, "ball left the level bounds");
            self.destroy_sprite(id);
        }
    }

    fn update_enemy(&mut self, id: SpriteId, dt: Fixed) {
        let Self { sprites, paths, .. } = self;
        let Some(sprite) = sprites.get_mut(id) else {
            return;
        };
        let Sprite { base, kind } = sprite;
        let SpriteKind::Enemy(data) = kind else {
            return;
        };
        if !data.alive {
            return;
        }
        if let Some(follower) = &mut data.follower {
            let path = paths.get(&follower.path_id);
            if let Some(pos) = follower.advance(path, dt) {
                base.pos = pos;
            }
        } else {
            base.vel.x = data.walk_velocity();
            base.vel.y =
                (base.vel.y.wrapping_add(fixed_mul(GRAVITY, dt))).min(MAX_FALL_VELOCITY);
            base.pos = base.pos.add(base.vel.scale(dt));
        }
    }

    fn update_platform(&mut self, id: SpriteId, dt: Fixed) {
        let Self { sprites, paths, .. } = self;
        let Some(sprite) = sprites.get_mut(id) else {
            return;
        };
        let Sprite { base, kind } = sprite;
        let SpriteKind::Platform(data) = kind else {
            return;
        };
        let path = paths.get(&data.follower.path_id);
        match data.follower.advance(path, dt) {
            Some(pos) => {
                data.frame_delta = pos.sub(base.pos);
                base.pos = pos;
            }
            None => data.frame_delta = FixedVec2::ZERO,
        }
    }

    fn update_player_phase(&mut self, input: InputFrame, dt: Fixed) {
        let Some(player_id) = self.context.active_player else {
            return;
        };
        let mut shot = false;
        if let Some(sprite) = self.sprites.get_mut(player_id) {
            let Sprite { base, kind } = sprite;
            if let SpriteKind::Player(data) = kind {
                update_player(base, data, input, dt);
                shot = input.shoot;
            }
        }
        if shot {
            if let Some(ball_id) = shoot_ball(&mut self.sprites, player_id) {
                let element = match self.sprites.get(ball_id).map(|s| &s.kind) {
                    Some(SpriteKind::Ball(data)) => data.element,
                    _ => return,
                };
                self.pending_events
                    .push(GameEvent::ball_spawned(self.tick, ball_id, element));
            }
        }
    }

    fn resolve_player(&mut self) {
        let Some(player_id) = self.context.active_player else {
            return;
        };
        let events = sweep_sprite(&self.sprites, player_id);

        // Positional corrections first, shallowest penetration leading
        resolve_blocking_all(&mut self.sprites, &events);

        // The level edges block everyone, ghost form included
        let bounds = self.bounds;
        let mut edge_ground = false;
        if let Some(sprite) = self.sprites.get_mut(player_id) {
            let contact = clamp_to_bounds(&mut sprite.base, &bounds);
            edge_ground = contact.grounded;
        }

        let blocking: Vec<CollisionEvent> = events
            .iter()
            .filter(|e| e.check == CollisionCheck::Blocking)
            .cloned()
            .collect();
        if let Some(sprite) = self.sprites.get_mut(player_id) {
            if let SpriteKind::Player(data) = &mut sprite.kind {
                note_ground_contact(data, &blocking);
                if edge_ground {
                    data.on_ground = true;
                }
            }
        }

        let actions = handle_player_collisions(&self.sprites, player_id, &events);
        for box_id in actions.bumped_boxes {
            self.activate_box(box_id);
        }
        for enemy_id in actions.stomped {
            self.kill_enemy(enemy_id, Some(player_id));
            // Stomp rebound
            if let Some(sprite) = self.sprites.get_mut(player_id) {
                sprite.base.vel.y = -to_fixed(6.0);
            }
        }
        for item_id in actions.collected {
            self.pending_events
                .push(GameEvent::sound_played(self.tick, "collect"));
            self.destroy_sprite(item_id);
        }
        if actions.hurt || actions.in_lava {
            self.hurt_player(player_id);
        }
    }

    fn update_late(&mut self) {
        // Carry riders standing on platforms by each platform's delta
        let platforms: Vec<(SpriteId, FixedVec2, FixedRect)> = self
            .sprites
            .iter()
            .filter_map(|(id, sprite)| match &sprite.kind {
                SpriteKind::Platform(data) if data.frame_delta != FixedVec2::ZERO => {
                    Some((*id, data.frame_delta, sprite.base.col_rect()))
                }
                _ => None,
            })
            .collect();
        if platforms.is_empty() {
            return;
        }

        let riders: Vec<(SpriteId, FixedVec2)> = self
            .sprites
            .iter()
            .filter(|(_, s)| {
                s.base.active
                    && matches!(s.base.array, ArrayKind::Player | ArrayKind::Enemy)
            })
            .filter_map(|(id, sprite)| {
                let rect = sprite.base.col_rect();
                platforms
                    .iter()
                    .find(|(_, _, plat)| standing_on(&rect, plat))
                    .map(|(_, delta, _)| (*id, *delta))
            })
            .collect();

        for (id, delta) in riders {
            if let Some(sprite) = self.sprites.get_mut(id) {
                sprite.base.pos = sprite.base.pos.add(delta);
            }
        }
    }

    fn resolve_objects(&mut self, _dt: Fixed) {
        for id in self.sprites.ids() {
            let is_ball;
            let is_walker;
            match self.sprites.get(id).map(|s| &s.kind) {
                Some(SpriteKind::Ball(_)) => {
                    is_ball = true;
                    is_walker = false;
                }
                Some(SpriteKind::Enemy(data)) => {
                    is_ball = false;
                    is_walker = data.alive && data.follower.is_none();
                }
                _ => continue,
            }
            if is_ball {
                self.resolve_ball(id);
            } else if is_walker {
                self.resolve_walker(id);
            }
        }
    }

    fn resolve_ball(&mut self, id: SpriteId) {
        let events = sweep_sprite(&self.sprites, id);
        let Some(event) = events
            .iter()
            .find(|e| e.check == CollisionCheck::Blocking)
        else {
            return;
        };
        match ball::ball_hit(&mut self.sprites, id, event) {
            BallOutcome::None | BallOutcome::Bounced => {
                resolve_blocking(&mut self.sprites, event);
            }
            BallOutcome::Destroy => self.explode_ball(id),
            BallOutcome::DestroyAndKill(enemy_id) => {
                self.kill_enemy(enemy_id, Some(id));
                self.explode_ball(id);
            }
        }
    }

    fn resolve_walker(&mut self, id: SpriteId) {
        let events = sweep_sprite(&self.sprites, id);
        resolve_blocking_all(&mut self.sprites, &events);
        let mut turned = events.iter().any(|e| {
            e.check == CollisionCheck::Blocking
                && matches!(
                    e.direction,
                    CollisionDirection::Left | CollisionDirection::Right
                )
        });
        let bounds = self.bounds;
        if let Some(sprite) = self.sprites.get_mut(id) {
            let contact = clamp_to_bounds(&mut sprite.base, &bounds);
            if contact.walled {
                turned = true;
            }
        }
        if turned {
            if let Some(sprite) = self.sprites.get_mut(id) {
                if let SpriteKind::Enemy(data) = &mut sprite.kind {
                    data.turn_around();
                }
            }
        }
    }

    fn update_camera(&mut self) {
        if let Some(player_id) = self.context.active_player {
            if let Some(sprite) = self.sprites.get(player_id) {
                let center = sprite.base.col_rect().center();
                self.context.camera.follow(center);
            }
        }
    }

    fn finish_frame(&mut self) -> FrameResult {
        let removed = self.flush_destroyed();
        let mut events = std::mem::take(&mut self.pending_events);
        events.sort();
        FrameResult { events, removed }
    }

    // =========================================================================
    // HANDLERS
    // =========================================================================

    /// Activate a box bumped from below: bump animation, depletion,
    /// then the kind-specific effect.
    pub fn activate_box(&mut self, id: SpriteId) {
        let tick = self.tick;
        let (exhausted, kind_effect, box_pos) = {
            let Some(sprite) = self.sprites.get_mut(id) else {
                return;
            };
            let pos = sprite.base.pos;
            let SpriteKind::Box(data) = &mut sprite.kind else {
                return;
            };
            data.start_bump();
            let allowed = data.consume_use();
            let exhausted = allowed && data.useable_count == 0;
            let effect = if allowed {
                match &data.kind {
                    BoxKind::Bonus { content } => BoxEffect::Dispense(*content),
                    BoxKind::Spin(_) => {
                        data.start_spin();
                        sprite.base.array = data.effective_array();
                        BoxEffect::None
                    }
                    BoxKind::Text { text } => BoxEffect::Text(text.clone()),
                }
            } else {
                BoxEffect::Refused
            };
            (exhausted, effect, pos)
        };

        match kind_effect {
            BoxEffect::Refused => {
                self.pending_events
                    .push(GameEvent::sound_played(tick, "box_dead"));
                return;
            }
            BoxEffect::None => {
                self.pending_events
                    .push(GameEvent::box_activated(tick, id, None));
            }
            BoxEffect::Text(text) => {
                self.pending_events
                    .push(GameEvent::box_activated(tick, id, None));
                self.pending_events.push(GameEvent::text_shown(tick, text));
            }
            BoxEffect::Dispense(content) => {
                let item = match content {
                    BoxContent::Empty => None,
                    BoxContent::Item(item) => Some(item),
                    BoxContent::Random => {
                        self.rng.choose(&ItemType::ALL).copied()
                    }
                };
                self.pending_events
                    .push(GameEvent::box_activated(tick, id, item));
                if let Some(item) = item {
                    let item_id = self.spawn_item(item, box_pos);
                    self.pending_events
                        .push(GameEvent::item_spawned(tick, item_id, item));
                }
            }
        }
        if exhausted {
            self.pending_events.push(GameEvent::box_exhausted(tick, id));
        }
    }

    /// Kill an enemy: it stops updating and colliding and is removed
    /// by the flush.
    pub fn kill_enemy(&mut self, id: SpriteId, killed_by: Option<SpriteId>) {
        let killed = {
            let Some(sprite) = self.sprites.get_mut(id) else {
                return;
            };
            let SpriteKind::Enemy(data) = &mut sprite.kind else {
                return;
            };
            if !data.alive {
                return;
            }
            data.alive = false;
            true
        };
        if killed {
            self.pending_events
                .push(GameEvent::enemy_killed(self.tick, id, killed_by));
            self.destroy_sprite(id);
        }
    }

    fn hurt_player(&mut self, player_id: SpriteId) {
        let hurt = {
            let Some(sprite) = self.sprites.get_mut(player_id) else {
                return;
            };
            let SpriteKind::Player(data) = &mut sprite.kind else {
                return;
            };
            if data.invincible_ticks > 0 {
                false
            } else {
                data.invincible_ticks = self.config.hurt_invincible_ticks;
                true
            }
        };
        if hurt {
            self.pending_events
                .push(GameEvent::player_hurt(self.tick, player_id));
        }
    }

    fn explode_ball(&mut self, id: SpriteId) {
        let info = match self.sprites.get(id) {
            Some(sprite) => match &sprite.kind {
                SpriteKind::Ball(data) => Some((data.element, sprite.base.pos)),
                _ => None,
            },
            None => None,
        };
        if let Some((element, pos)) = info {
            // Through destroy_sprite so every ball death carries the
            // same destruction event as any other sprite
            if self.destroy_sprite(id) {
                self.pending_events
                    .push(GameEvent::ball_exploded(self.tick, id, element, pos));
            }
        }
    }

    fn spawn_item(&mut self, item: ItemType, box_pos: FixedVec2) -> SpriteId {
        let id = self.sprites.alloc_id();
        let mut base = SpriteBase::new(
            id,
            box_pos.add(FixedVec2::new(0, -to_fixed(1.0))),
            FixedVec2::new(to_fixed(1.0), to_fixed(1.0)),
        );
        base.array = ArrayKind::Active;
        base.image = format!("gfx/item_{}.png", item.as_attr());
        self.sprites.spawn(base, SpriteKind::Item(item))
    }

    // =========================================================================
    // CAMERA FLIGHT
    // =========================================================================

    /// Begin a camera flight along a path. Play input is ignored until
    /// the flight finishes, after which the previous mode is restored.
    pub fn start_camera_flight(&mut self, path_id: &str) {
        let mut state = PathState::default();
        if let Some(path) = self.paths.get(path_id) {
            state.move_start_forward(path);
        }
        self.camera_flight = Some(CameraFlight {
            path_id: path_id.to_string(),
            state,
            prev_mode: self.context.mode,
        });
        self.context.mode = GameMode::CameraFly;
    }

    fn update_camera_flight(&mut self, dt: Fixed) {
        let Some(mut flight) = self.camera_flight.take() else {
            self.context.mode = GameMode::Normal;
            return;
        };

        let (finished, completed) = match self.paths.get(&flight.path_id) {
            None => (true, false),
            Some(path) => {
                let distance = fixed_mul(self.config.camera_flight_speed, dt);
                let moved = flight.state.path_move(Some(path), distance);
                self.context
                    .camera
                    .follow(flight.state.level_position(path));
                (!moved, !moved)
            }
        };

        if finished {
            self.context.mode = flight.prev_mode;
            self.pending_events.push(GameEvent::camera_flight_finished(
                self.tick,
                &flight.path_id,
                completed,
            ));
        } else {
            self.camera_flight = Some(flight);
        }
    }

    // =========================================================================
    // FLUSH AND HASH
    // =========================================================================

    /// Drop every destroy-marked sprite and unlink all weak references
    /// to it (path follower lists). Returns the removed ids so outer
    /// layers (the editor) can clear their own handles.
    pub fn flush_destroyed(&mut self) -> Vec<SpriteId> {
        let removed = self.sprites.sweep_removed();
        if removed.is_empty() {
            return removed;
        }
        for path in self.paths.values_mut() {
            for id in &removed {
                path.unlink_follower(*id);
            }
        }
        if let Some(active) = self.context.active_player {
            if removed.contains(&active) {
                self.context.active_player = None;
            }
        }
        removed
    }

    /// Hash the complete simulation-relevant state. Two levels with
    /// equal hashes are in the same state for replay purposes.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.rng_seed, |hasher| {
            let rng_state = self.rng.state();
            hasher.update_u64(rng_state[0]);
            hasher.update_u64(rng_state[1]);
            hasher.update_u32(self.sprites.len() as u32);
            for (id, sprite) in self.sprites.iter() {
                hasher.update_u32(id.0);
                hasher.update_vec2(sprite.base.pos);
                hasher.update_vec2(sprite.base.vel);
                hasher.update_str(sprite.base.array.as_attr());
                hasher.update_bool(sprite.base.active);
                hasher.update_bool(sprite.base.spawned);
            }
            for (name, path) in &self.paths {
                hasher.update_str(name);
                hasher.update_vec2(path.anchor);
                hasher.update_u32(path.segments.len() as u32);
            }
        })
    }
}

enum ObjectDispatch {
    Box,
    Ball,
    Enemy,
    Platform,
}

enum BoxEffect {
    None,
    Refused,
    Text(String),
    Dispense(BoxContent),
}

/// Boundary contact produced by `clamp_to_bounds`.
#[derive(Clone, Copy, Debug, Default)]
struct BoundsContact {
    /// Pushed back at the left or right level edge
    walled: bool,
    /// Pushed back at the level bottom
    grounded: bool,
}

/// Keep a sprite's collision rect inside the playable bounds. The top
/// edge is open so jumps may leave the visible area; the left, right
/// and bottom edges block with the velocity into the edge cancelled.
fn clamp_to_bounds(base: &mut SpriteBase, bounds: &FixedRect) -> BoundsContact {
    let mut contact = BoundsContact::default();
    let rect = base.col_rect();
    if rect.left() < bounds.left() {
        base.pos.x = base.pos.x.wrapping_add(bounds.left().wrapping_sub(rect.left()));
        if base.vel.x < 0 {
            base.vel.x = 0;
        }
        contact.walled = true;
    } else if rect.right() > bounds.right() {
        base.pos.x = base.pos.x.wrapping_sub(rect.right().wrapping_sub(bounds.right()));
        if base.vel.x > 0 {
            base.vel.x = 0;
        }
        contact.walled = true;
    }
    let rect = base.col_rect();
    if rect.bottom() > bounds.bottom() {
        base.pos.y = base.pos.y.wrapping_sub(rect.bottom().wrapping_sub(bounds.bottom()));
        if base.vel.y > 0 {
            base.vel.y = 0;
        }
        contact.grounded = true;
    }
    contact
}

/// Feet-on-surface test: horizontal overlap and the rider's bottom
/// within a small band of the platform top.
fn standing_on(rider: &FixedRect, platform: &FixedRect) -> bool {
    let eps = to_fixed(0.1);
    let bottom = rider.bottom();
    let top = platform.top();
    rider.left() < platform.right()
        && rider.right() > platform.left()
        && bottom >= top.wrapping_sub(eps)
        && bottom <= top.wrapping_add(eps)
}

// =============================================================================
// TESTS
// =============================================================================
