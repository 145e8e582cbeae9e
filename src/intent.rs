//! Input intent components.
//!
//! Intents carry what the player wants this frame: two movement axes, the jump
//! button and the camera stick. Device mapping lives in the host game; the
//! motor only sees normalized axes and button states.

use bevy::prelude::*;

/// Zero out an axis whose magnitude is within `threshold`.
#[inline]
pub fn apply_dead_zone(value: f32, threshold: f32) -> f32 {
    if value.abs() <= threshold {
        0.0
    } else {
        value
    }
}

/// Apply [`apply_dead_zone`] to both axes independently.
#[inline]
pub fn apply_dead_zone_2d(value: Vec2, threshold: f32) -> Vec2 {
    Vec2::new(
        apply_dead_zone(value.x, threshold),
        apply_dead_zone(value.y, threshold),
    )
}

/// Movement intent for a character motor.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use msg_character_motor::prelude::*;
///
/// let mut input = MotorInput::new();
/// input.set_movement(Vec2::new(0.1, 1.0));
/// assert_eq!(input.effective_movement(0.16), Vec2::new(0.0, 1.0));
///
/// input.set_jump_pressed(true);
/// assert!(input.jump_just_pressed());
/// ```
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct MotorInput {
    /// Raw movement axes: `x` is right, `y` is forward. Each in `[-1, 1]`.
    pub movement: Vec2,
    /// Whether the jump button is held.
    ///
    /// Set this every frame from whatever source drives the character. The
    /// motor detects the press edge itself and uses the held state for
    /// variable-height jumps.
    pub jump_pressed: bool,
    /// Jump state seen by the previous act tick (for edge detection).
    pub(crate) jump_pressed_prev: bool,
}

impl MotorInput {
    /// Create an idle input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the movement axes, clamped to `[-1, 1]` each.
    pub fn set_movement(&mut self, movement: Vec2) {
        self.movement = movement.clamp(Vec2::NEG_ONE, Vec2::ONE);
    }

    /// Set whether the jump button is held.
    pub fn set_jump_pressed(&mut self, pressed: bool) {
        self.jump_pressed = pressed;
    }

    /// Clear movement and jump.
    pub fn clear(&mut self) {
        self.movement = Vec2::ZERO;
        self.jump_pressed = false;
    }

    /// Whether jump went from released to held since the last act tick.
    #[inline]
    pub fn jump_just_pressed(&self) -> bool {
        self.jump_pressed && !self.jump_pressed_prev
    }

    /// Movement axes after the dead zone.
    #[inline]
    pub fn effective_movement(&self, dead_zone: f32) -> Vec2 {
        apply_dead_zone_2d(self.movement, dead_zone)
    }

    /// Remember the current button state for the next edge check.
    pub(crate) fn latch(&mut self) {
        self.jump_pressed_prev = self.jump_pressed;
    }
}

/// Camera stick and recentre button for a follow camera.
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct CameraInput {
    /// Raw camera stick: `x` orbits, `y` zooms. Each in `[-1, 1]`.
    pub look: Vec2,
    /// Whether the recentre button is held.
    pub recenter_pressed: bool,
    pub(crate) recenter_pressed_prev: bool,
}

impl CameraInput {
    /// Set the camera stick, clamped to `[-1, 1]` each.
    pub fn set_look(&mut self, look: Vec2) {
        self.look = look.clamp(Vec2::NEG_ONE, Vec2::ONE);
    }

    /// Set whether the recentre button is held.
    pub fn set_recenter_pressed(&mut self, pressed: bool) {
        self.recenter_pressed = pressed;
    }

    /// Whether recentre went from released to held since the last tick.
    #[inline]
    pub fn recenter_just_pressed(&self) -> bool {
        self.recenter_pressed && !self.recenter_pressed_prev
    }

    pub(crate) fn latch(&mut self) {
        self.recenter_pressed_prev = self.recenter_pressed;
    }
}
