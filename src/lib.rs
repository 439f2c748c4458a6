//! # Ridge Runner Core
//!
//! Deterministic runtime core of a 2D side-scrolling platformer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     RIDGE RUNNER CORE                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/            - Deterministic primitives                 │
//! │  ├── fixed.rs     - Q16.16 fixed-point arithmetic            │
//! │  ├── vec2.rs      - 2D vector with fixed-point               │
//! │  ├── rect.rs      - Axis-aligned rectangles and push-out     │
//! │  ├── rng.rs       - Deterministic Xorshift128+ PRNG          │
//! │  └── hash.rs      - State hashing for replay verification    │
//! │                                                              │
//! │  game/            - Platformer logic (deterministic)         │
//! │  ├── sprite.rs    - Sprite model and owning arena            │
//! │  ├── collision.rs - Pairwise validation and resolution       │
//! │  ├── path.rs      - Polyline paths and traversal             │
//! │  ├── follower.rs  - Platforms and enemies on paths           │
//! │  ├── player.rs    - Player physics and handlers              │
//! │  ├── ball.rs      - Projectiles                              │
//! │  ├── boxes.rs     - Bonus / spin / text boxes                │
//! │  ├── level.rs     - Frame pipeline and level state           │
//! │  ├── loader.rs    - Level files and version migrations       │
//! │  └── editor.rs    - Picking and snapping                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! Everything in `core/` and `game/` is **100% deterministic**:
//! - No floating-point arithmetic in game logic
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time dependencies
//! - All randomness from seeded Xorshift128+
//!
//! Given the same level file, RNG seed and input sequence, a run
//! produces **identical state hashes** on any platform.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use crate::core::fixed::{Fixed, FIXED_HALF, FIXED_ONE, FIXED_SCALE};
pub use crate::core::rect::FixedRect;
pub use crate::core::rng::DeterministicRng;
pub use crate::core::vec2::FixedVec2;
pub use game::level::{FrameResult, Level};
pub use game::player::InputFrame;
pub use game::sprite::{SpriteId, SpriteManager};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;
