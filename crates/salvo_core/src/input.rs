//! Per-tick player input.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Everything the host polled for one tick.
///
/// # Example
///
/// ```
/// use glam::Vec2;
/// use salvo_core::input::InputFrame;
///
/// let input = InputFrame::default()
///     .with_movement(Vec2::new(1.0, 0.0))
///     .with_aim(Vec2::new(0.25, 0.1))
///     .with_primary(true);
/// assert!(input.primary);
/// assert!(!input.start);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputFrame {
    /// `x` is thrust (forward positive), `y` is turn (clockwise positive).
    /// Each component is clamped to `[-1, 1]`.
    pub movement: Vec2,
    /// Cursor in screen space, origin at the centre, roughly `[-0.5, 0.5]`.
    pub aim: Vec2,
    /// Fire every non-cannon turret.
    pub primary: bool,
    /// Fire the cannon.
    pub secondary: bool,
    /// Leave the start screen.
    pub start: bool,
}

impl InputFrame {
    /// Input that only presses start.
    #[must_use]
    pub fn start() -> Self {
        Self {
            start: true,
            ..Self::default()
        }
    }

    /// Set the movement vector (clamped).
    #[must_use]
    pub fn with_movement(mut self, movement: Vec2) -> Self {
        self.movement = movement.clamp(Vec2::NEG_ONE, Vec2::ONE);
        self
    }

    /// Set the cursor.
    #[must_use]
    pub fn with_aim(mut self, aim: Vec2) -> Self {
        self.aim = aim;
        self
    }

    /// Hold or release the primary trigger.
    #[must_use]
    pub fn with_primary(mut self, held: bool) -> Self {
        self.primary = held;
        self
    }

    /// Hold or release the secondary trigger.
    #[must_use]
    pub fn with_secondary(mut self, held: bool) -> Self {
        self.secondary = held;
        self
    }
}
