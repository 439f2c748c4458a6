//! Core deterministic primitives.
//!
//! All types in this module are designed for perfect cross-platform
//! determinism. The rest of the crate builds gameplay on top of them.

pub mod fixed;
pub mod hash;
pub mod rect;
pub mod rng;
pub mod vec2;

// Re-export core types
pub use fixed::{Fixed, FIXED_HALF, FIXED_ONE, FIXED_SCALE};
pub use hash::compute_state_hash;
pub use rect::FixedRect;
pub use rng::DeterministicRng;
pub use vec2::FixedVec2;
