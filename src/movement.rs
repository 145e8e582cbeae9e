//! Movement integration.
//!
//! Turns two input axes and the previous speed into a speed and a horizontal
//! velocity, mapped relative to the follow camera.

use bevy::prelude::*;

use crate::config::MotorConfig;

/// Project a vector onto the ground plane.
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Flattened forward direction of a rotation. Falls back to `-Z`.
#[inline]
pub fn forward_of(rotation: Quat) -> Vec3 {
    flatten(rotation * Vec3::NEG_Z).normalize_or(Vec3::NEG_Z)
}

/// Yaw-only rotation facing `direction` on the ground plane.
///
/// Returns `None` when `direction` has no horizontal component.
pub fn look_rotation(direction: Vec3) -> Option<Quat> {
    let flat = flatten(direction).normalize_or_zero();
    if flat == Vec3::ZERO {
        return None;
    }
    Some(Quat::from_rotation_y(f32::atan2(-flat.x, -flat.z)))
}

/// Horizontal forward/right basis of the follow camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    /// Flattened camera forward.
    pub forward: Vec3,
    /// Flattened camera right.
    pub right: Vec3,
}

impl Default for CameraBasis {
    fn default() -> Self {
        Self {
            forward: Vec3::NEG_Z,
            right: Vec3::X,
        }
    }
}

impl CameraBasis {
    /// Basis of a camera with the given rotation.
    ///
    /// A camera looking straight down uses its up vector as forward.
    pub fn from_rotation(rotation: Quat) -> Self {
        let mut forward = flatten(rotation * Vec3::NEG_Z);
        if forward.length_squared() < 1e-6 {
            forward = flatten(rotation * Vec3::Y);
        }
        let forward = forward.normalize_or(Vec3::NEG_Z);
        Self {
            forward,
            right: forward.cross(Vec3::Y),
        }
    }

    /// World direction for input axes (`x` right, `y` forward).
    #[inline]
    pub fn target_direction(&self, input: Vec2) -> Vec3 {
        self.forward * input.y + self.right * input.x
    }
}

/// New speed from input and the previous speed.
///
/// Any input sets the speed to `(|x| + |y|) * run_speed`; no input
/// decelerates. The result is always within `[0, run_speed]`.
pub fn integrate_speed(input: Vec2, previous_speed: f32, config: &MotorConfig, dt: f32) -> f32 {
    let speed = if input != Vec2::ZERO {
        (input.x.abs() + input.y.abs()) * config.run_speed
    } else {
        previous_speed - config.deceleration * dt
    };
    speed.clamp(0.0, config.run_speed)
}

/// Horizontal velocity while airborne.
///
/// Carries `momentum` and adds reduced control. The momentum itself is
/// nudged towards the target direction and kept within run speed.
pub fn air_velocity(momentum: &mut Vec3, target: Vec3, speed: f32, config: &MotorConfig) -> Vec3 {
    let velocity = *momentum + target * speed * config.air_control;
    *momentum = flatten(*momentum + target * config.air_momentum_gain).clamp_length_max(config.run_speed);
    velocity
}
