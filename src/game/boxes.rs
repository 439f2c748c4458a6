//! Box Family
//!
//! Hittable boxes: bonus boxes that dispense items, spin boxes that
//! become passable for a timed window, and text boxes that show a
//! message. All share the bump animation and the useable-count
//! depletion model.

use serde::{Deserialize, Serialize};

use crate::core::fixed::{
    fixed_mul, Fixed, BOX_BUMP_HEIGHT, BOX_BUMP_SPEED, SPIN_MIN_SECONDS,
};
use crate::game::sprite::ArrayKind;

// =============================================================================
// ITEMS
// =============================================================================

/// Collectible item kinds a box can dispense.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    /// Growth powerup
    Mushroom,
    /// Fire powerup
    Fireberry,
    /// Temporary invincibility
    Star,
    /// Extra life
    Moon,
}

impl ItemType {
    /// Parse from the level-file attribute value.
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "mushroom" => Some(Self::Mushroom),
            "fireberry" => Some(Self::Fireberry),
            "star" => Some(Self::Star),
            "moon" => Some(Self::Moon),
            _ => None,
        }
    }

    /// Level-file attribute value.
    pub fn as_attr(&self) -> &'static str {
        match self {
            Self::Mushroom => "mushroom",
            Self::Fireberry => "fireberry",
            Self::Star => "star",
            Self::Moon => "moon",
        }
    }

    /// All item kinds, used for random box contents.
    pub const ALL: [ItemType; 4] = [
        ItemType::Mushroom,
        ItemType::Fireberry,
        ItemType::Star,
        ItemType::Moon,
    ];
}

// =============================================================================
// BOX STATE
// =============================================================================

/// What a bonus box dispenses on activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoxContent {
    /// Nothing; the box still bumps and depletes
    Empty,
    /// A fixed item
    Item(ItemType),
    /// An item drawn from the level RNG at activation time
    Random,
}

/// Visibility mode of a box. Beyond drawing, `Ghost` and `SemiMassive`
/// change who the box collides with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvisibleMode {
    /// Always drawn, always solid
    Visible,
    /// Hidden and solid until first activated, drawn afterwards
    UntilActivated,
    /// Drawn and solid only for a player in ghost form
    Ghost,
    /// Never drawn outside the editor; touchable only from below
    SemiMassive,
}

impl InvisibleMode {
    /// Parse from the level-file attribute value.
    pub fn from_attr(value: &str) -> Self {
        match value {
            "until_activated" => Self::UntilActivated,
            "ghost" => Self::Ghost,
            "semi_massive" => Self::SemiMassive,
            _ => Self::Visible,
        }
    }

    /// Level-file attribute value.
    pub fn as_attr(&self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::UntilActivated => "until_activated",
            Self::Ghost => "ghost",
            Self::SemiMassive => "semi_massive",
        }
    }
}

/// Spin-window state of a spin box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpinState {
    /// Solid, waiting to be hit
    Idle,
    /// Passable; counts down the remaining window
    Spinning {
        /// Time left in the window
        remaining: Fixed,
    },
}

/// Box behavior variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoxKind {
    /// Dispenses its content when bumped from below
    Bonus {
        /// What activation dispenses
        content: BoxContent,
    },
    /// Becomes passable for a timed window when bumped
    Spin(SpinState),
    /// Shows a message when bumped
    Text {
        /// The message to show
        text: String,
    },
}

/// Vertical bump animation of a hit box. The box rises a fixed height
/// and settles back; position offsets are cosmetic and do not affect
/// the collision rect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BumpState {
    /// At rest
    Idle,
    /// Moving up
    Rising {
        /// Current upward offset
        offset: Fixed,
    },
    /// Returning down
    Settling {
        /// Current upward offset
        offset: Fixed,
    },
}

/// Per-sprite box payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoxData {
    /// Behavior variant
    pub kind: BoxKind,
    /// Remaining activations: `-1` is infinite, `0` is exhausted
    pub useable_count: i32,
    /// Invisibility behavior
    pub invisible: InvisibleMode,
    /// Set once the box has been activated at least once
    pub activated: bool,
    /// Bump animation state
    pub bump: BumpState,
}

impl BoxData {
    /// Create a box with the default single activation.
    pub fn new(kind: BoxKind) -> Self {
        Self {
            kind,
            useable_count: 1,
            invisible: InvisibleMode::Visible,
            activated: false,
            bump: BumpState::Idle,
        }
    }

    /// Whether the box can still be activated.
    pub fn useable(&self) -> bool {
        self.useable_count != 0
    }

    /// Consume one activation. Infinite boxes never deplete, and an
    /// exhausted box stays at zero. Returns `true` when the activation
    /// was allowed.
    pub fn consume_use(&mut self) -> bool {
        match self.useable_count {
            0 => false,
            -1 => {
                self.activated = true;
                true
            }
            _ => {
                self.useable_count -= 1;
                self.activated = true;
                true
            }
        }
    }

    /// Start the bump animation. Re-bumping a moving box restarts it.
    pub fn start_bump(&mut self) {
        self.bump = BumpState::Rising { offset: 0 };
    }

    /// Advance the bump animation, returning the current cosmetic
    /// upward draw offset.
    pub fn update_bump(&mut self, dt: Fixed) -> Fixed {
        let step = fixed_mul(BOX_BUMP_SPEED, dt);
        match self.bump {
            BumpState::Idle => 0,
            BumpState::Rising { offset } => {
                let next = offset.wrapping_add(step);
                if next >= BOX_BUMP_HEIGHT {
                    self.bump = BumpState::Settling { offset: BOX_BUMP_HEIGHT };
                    BOX_BUMP_HEIGHT
                } else {
                    self.bump = BumpState::Rising { offset: next };
                    next
                }
            }
            BumpState::Settling { offset } => {
                let next = offset.wrapping_sub(step);
                if next <= 0 {
                    self.bump = BumpState::Idle;
                    0
                } else {
                    self.bump = BumpState::Settling { offset: next };
                    next
                }
            }
        }
    }

    /// Current bump draw offset without advancing.
    pub fn bump_offset(&self) -> Fixed {
        match self.bump {
            BumpState::Idle => 0,
            BumpState::Rising { offset } | BumpState::Settling { offset } => offset,
        }
    }

    /// Whether the box currently blocks movement. A spinning spin box
    /// is passable; everything else keeps its solid class (exhausted
    /// boxes stay solid).
    pub fn blocks(&self) -> bool {
        !matches!(self.kind, BoxKind::Spin(SpinState::Spinning { .. }))
    }

    /// Start the spin window on a spin box. Returns `false` for other
    /// box kinds.
    pub fn start_spin(&mut self) -> bool {
        if let BoxKind::Spin(state) = &mut self.kind {
            *state = SpinState::Spinning {
                remaining: SPIN_MIN_SECONDS,
            };
            true
        } else {
            false
        }
    }

    /// Count down the spin window by `dt`. Returns `true` when the
    /// window just expired this call; the caller then decides whether
    /// the box may actually close or must extend (someone is standing
    /// in it).
    pub fn tick_spin(&mut self, dt: Fixed) -> bool {
        if let BoxKind::Spin(SpinState::Spinning { remaining }) = &mut self.kind {
            *remaining = remaining.wrapping_sub(dt);
            if *remaining <= 0 {
                *remaining = 0;
                return true;
            }
        }
        false
    }

    /// Close an expired spin window.
    pub fn close_spin(&mut self) {
        if let BoxKind::Spin(state) = &mut self.kind {
            *state = SpinState::Idle;
        }
    }

    /// Extend an expired spin window by `extra` because the box cannot
    /// close yet.
    pub fn extend_spin(&mut self, extra: Fixed) {
        if let BoxKind::Spin(state) = &mut self.kind {
            *state = SpinState::Spinning { remaining: extra };
        }
    }

    /// Collision class the box sprite should currently carry.
    pub fn effective_array(&self) -> ArrayKind {
        if self.blocks() {
            ArrayKind::Active
        } else {
            ArrayKind::Passive
        }
    }
}

/// Seconds of bump travel in one direction, exposed for tests.
pub fn bump_travel_seconds() -> Fixed {
    crate::core::fixed::fixed_div(BOX_BUMP_HEIGHT, BOX_BUMP_SPEED)
}

// =============================================================================
// TESTS
// =============================================================================
