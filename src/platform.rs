//! Moving platform riding.
//!
//! While the character stands in a platform's trigger volume it drifts with
//! the platform every tick. Leaving the volume stops the drift immediately.

use bevy::log::debug;
use bevy::prelude::*;

use crate::motor::CharacterMotor;

/// Motion of a moving platform, written by whatever drives the platform.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Default)]
#[reflect(Component)]
pub struct MovingPlatform {
    /// Unit direction the platform is currently moving in.
    pub current_direction: Vec3,
    /// Platform speed.
    pub move_speed: f32,
}

impl MovingPlatform {
    /// Create a platform motion. The direction is normalized.
    pub fn new(direction: Vec3, speed: f32) -> Self {
        Self {
            current_direction: direction.normalize_or_zero(),
            move_speed: speed,
        }
    }

    /// Platform velocity.
    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.current_direction * self.move_speed
    }

    /// Vertical speed added to a jump launched from this platform.
    ///
    /// Only a rising platform contributes.
    pub fn vertical_boost(&self) -> f32 {
        if self.current_direction.y > 0.0 {
            self.current_direction.y * self.move_speed
        } else {
            0.0
        }
    }
}

impl CharacterMotor {
    /// Remember the platform volume the character entered.
    pub fn attach_platform(&mut self, platform: Entity) {
        debug!("entered platform {platform:?}");
        self.attached_platform = Some(platform);
    }

    /// Forget a platform volume the character left. Drift stops at once.
    pub fn detach_platform(&mut self, platform: Entity) {
        if self.attached_platform == Some(platform) {
            debug!("left platform {platform:?}");
            self.attached_platform = None;
            self.riding_platform = false;
        }
    }

    /// Drift for one tick on `platform`.
    ///
    /// Pass `None` when the attached platform no longer exists. Returns the
    /// offset to add to the character's position.
    pub fn ride(&mut self, platform: Option<&MovingPlatform>, dt: f32) -> Vec3 {
        match (self.attached_platform, platform) {
            (Some(_), Some(platform)) => {
                self.riding_platform = true;
                platform.velocity() * dt
            }
            _ => {
                self.riding_platform = false;
                Vec3::ZERO
            }
        }
    }
}
