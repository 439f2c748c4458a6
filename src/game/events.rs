//! Frame Events
//!
//! Events generated during simulation. Sounds and cosmetic effects cross
//! to the collaborator layers (audio, rendering) exclusively through
//! these, so the core itself stays headless and deterministic.

use serde::{Deserialize, Serialize};

use crate::core::vec2::FixedVec2;
use crate::game::ball::BallElement;
use crate::game::boxes::ItemType;
use crate::game::sprite::SpriteId;

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Destructions processed first
    Destruction = 0,
    /// Then damage
    Damage = 1,
    /// Then activations (boxes, text)
    Activation = 2,
    /// Then spawns
    Spawn = 3,
    /// Then fire-and-forget audio
    Audio = 4,
    /// Lowest priority
    Other = 255,
}

/// Frame event data.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum GameEventData {
    /// A sprite was destroyed and will be removed at end of frame
    SpriteDestroyed {
        sprite_id: SpriteId,
    },

    /// A ball hit something and exploded (cosmetic terminal animation)
    BallExploded {
        sprite_id: SpriteId,
        element: BallElement,
        position: FixedVec2,
    },

    /// Cosmetic particle emitted by a flying ball
    ParticleEmitted {
        position: FixedVec2,
        element: BallElement,
    },

    /// An enemy was killed
    EnemyKilled {
        sprite_id: SpriteId,
        killed_by: Option<SpriteId>,
    },

    /// The player took damage
    PlayerHurt {
        sprite_id: SpriteId,
    },

    /// A box was activated (bumped)
    BoxActivated {
        sprite_id: SpriteId,
        content: Option<ItemType>,
    },

    /// A box became permanently exhausted
    BoxExhausted {
        sprite_id: SpriteId,
    },

    /// An item popped out of a box
    ItemSpawned {
        sprite_id: SpriteId,
        item: ItemType,
    },

    /// A ball was fired
    BallSpawned {
        sprite_id: SpriteId,
        element: BallElement,
    },

    /// A text box was read
    TextShown {
        text: String,
    },

    /// Fire-and-forget sound request for the audio collaborator
    SoundPlayed {
        name: String,
    },

    /// A camera fly-along-path sequence ended
    CameraFlightFinished {
        path: String,
        completed: bool,
    },
}

/// A frame event with timing and priority.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when the event occurred
    pub tick: u32,

    /// Processing priority
    pub priority: EventPriority,

    /// Sprite involved (for tie-breaking)
    pub sprite_id: Option<SpriteId>,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, priority: EventPriority, data: GameEventData) -> Self {
        let sprite_id = match &data {
            GameEventData::SpriteDestroyed { sprite_id } => Some(*sprite_id),
            GameEventData::BallExploded { sprite_id, .. } => Some(*sprite_id),
            GameEventData::EnemyKilled { sprite_id, .. } => Some(*sprite_id),
            GameEventData::PlayerHurt { sprite_id } => Some(*sprite_id),
            GameEventData::BoxActivated { sprite_id, .. } => Some(*sprite_id),
            GameEventData::BoxExhausted { sprite_id } => Some(*sprite_id),
            GameEventData::ItemSpawned { sprite_id, .. } => Some(*sprite_id),
            GameEventData::BallSpawned { sprite_id, .. } => Some(*sprite_id),
            _ => None,
        };

        Self {
            tick,
            priority,
            sprite_id,
            data,
        }
    }

    /// Create sprite destroyed event.
    pub fn sprite_destroyed(tick: u32, sprite_id: SpriteId) -> Self {
        Self::new(
            tick,
            EventPriority::Destruction,
            GameEventData::SpriteDestroyed { sprite_id },
        )
    }

    /// Create ball exploded event.
    pub fn ball_exploded(
        tick: u32,
        sprite_id: SpriteId,
        element: BallElement,
        position: FixedVec2,
    ) -> Self {
        Self::new(
            tick,
            EventPriority::Destruction,
            GameEventData::BallExploded {
                sprite_id,
                element,
                position,
            },
        )
    }

    /// Create enemy killed event.
    pub fn enemy_killed(tick: u32, sprite_id: SpriteId, killed_by: Option<SpriteId>) -> Self {
        Self::new(
            tick,
            EventPriority::Destruction,
            GameEventData::EnemyKilled {
                sprite_id,
                killed_by,
            },
        )
    }

    /// Create player hurt event.
    pub fn player_hurt(tick: u32, sprite_id: SpriteId) -> Self {
        Self::new(tick, EventPriority::Damage, GameEventData::PlayerHurt { sprite_id })
    }

    /// Create box activated event.
    pub fn box_activated(tick: u32, sprite_id: SpriteId, content: Option<ItemType>) -> Self {
        Self::new(
            tick,
            EventPriority::Activation,
            GameEventData::BoxActivated { sprite_id, content },
        )
    }

    /// Create box exhausted event.
    pub fn box_exhausted(tick: u32, sprite_id: SpriteId) -> Self {
        Self::new(
            tick,
            EventPriority::Activation,
            GameEventData::BoxExhausted { sprite_id },
        )
    }

    /// Create item spawned event.
    pub fn item_spawned(tick: u32, sprite_id: SpriteId, item: ItemType) -> Self {
        Self::new(
            tick,
            EventPriority::Spawn,
            GameEventData::ItemSpawned { sprite_id, item },
        )
    }

    /// Create ball spawned event.
    pub fn ball_spawned(tick: u32, sprite_id: SpriteId, element: BallElement) -> Self {
        Self::new(
            tick,
            EventPriority::Spawn,
            GameEventData::BallSpawned { sprite_id, element },
        )
    }

    /// Create particle emitted event.
    pub fn particle_emitted(tick: u32, position: FixedVec2, element: BallElement) -> Self {
        Self::new(
            tick,
            EventPriority::Other,
            GameEventData::ParticleEmitted { position, element },
        )
    }

    /// Create text shown event.
    pub fn text_shown(tick: u32, text: String) -> Self {
        Self::new(tick, EventPriority::Activation, GameEventData::TextShown { text })
    }

    /// Create sound played event.
    pub fn sound_played(tick: u32, name: &str) -> Self {
        Self::new(
            tick,
            EventPriority::Audio,
            GameEventData::SoundPlayed {
                name: name.to_string(),
            },
        )
    }

    /// Create camera flight finished event.
    pub fn camera_flight_finished(tick: u32, path: &str, completed: bool) -> Self {
        Self::new(
            tick,
            EventPriority::Other,
            GameEventData::CameraFlightFinished {
                path: path.to_string(),
                completed,
            },
        )
    }
}

impl PartialEq for GameEvent {
    fn eq(&self, other: &Self) -> bool {
        self.tick == other.tick
            && self.priority == other.priority
            && self.sprite_id == other.sprite_id
    }
}

impl Eq for GameEvent {}

impl PartialOrd for GameEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GameEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Sort by: tick, then priority, then sprite id
        self.tick
            .cmp(&other.tick)
            .then(self.priority.cmp(&other.priority))
            .then(self.sprite_id.cmp(&other.sprite_id))
    }
}
