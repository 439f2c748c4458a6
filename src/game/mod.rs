//! Game Logic Module
//!
//! The whole platformer runtime. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `sprite`: Sprite model, classification, owning arena
//! - `animation`: Timed image-list animation component
//! - `collision`: Pairwise validation, sweep and resolution
//! - `path`: Polyline paths and traversal cursors
//! - `follower`: Path-bound platforms and enemies
//! - `player`: Input-driven player physics and handlers
//! - `ball`: Thrown projectile behavior
//! - `boxes`: Bonus, spin and text boxes
//! - `level`: Level manager and the frame pipeline
//! - `loader`: Level file load/save and migrations
//! - `editor`: Picking, snapping, weak editor handles
//! - `context`: Mode, camera, active player
//! - `events`: Game events for replay/verification

pub mod animation;
pub mod ball;
pub mod boxes;
pub mod collision;
pub mod context;
pub mod editor;
pub mod events;
pub mod follower;
pub mod level;
pub mod loader;
pub mod path;
pub mod player;
pub mod sprite;

// Re-export key types
pub use collision::{CollisionCheck, CollisionDirection, CollisionEvent};
pub use context::{Camera, GameContext, GameMode};
pub use events::GameEvent;
pub use level::{FrameResult, Level};
pub use loader::{load_level, save_level, LevelError, CURRENT_ENGINE_VERSION};
pub use player::InputFrame;
pub use sprite::{ArrayKind, Sprite, SpriteId, SpriteManager};
