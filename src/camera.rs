//! Follow camera.
//!
//! A [`CameraRig`] chases a point behind and above its target at one of three
//! zoom levels and keeps turning to look at the target's head. Catch-up speed
//! grows with the square of the distance from the target, so a camera left
//! far behind closes the gap quickly.
//!
//! The stick zooms (vertical, on an edge past the threshold) and orbits
//! (horizontal, while held). A recentre press swings the camera behind the
//! character. An idle character pulls the camera slowly behind it.

use bevy::log::debug;
use bevy::prelude::*;

use crate::config::CameraConfig;
use crate::intent::{apply_dead_zone_2d, CameraInput};
use crate::movement::{forward_of, CameraBasis};

/// Highest zoom level.
pub const MAX_ZOOM_LEVEL: usize = 2;

/// State of a follow camera.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
#[require(CameraInput, CameraConfig, Transform)]
pub struct CameraRig {
    /// Character being followed.
    pub target: Entity,
    /// Zoom level in `0..=MAX_ZOOM_LEVEL`.
    pub zoom_level: usize,
    /// A recentre swing is in progress.
    pub is_rotating: bool,
    /// Only look at the target, e.g. after it fell out of the level.
    pub is_paused: bool,
    /// The zoom stick has not returned below the threshold yet.
    pub(crate) zooming: bool,
    /// Degrees of recentre swing left, signed.
    pub(crate) recenter_remaining: f32,
}

/// Pose and motion of the followed character for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowTarget {
    /// Character position (capsule center).
    pub position: Vec3,
    /// Character rotation.
    pub rotation: Quat,
    /// Character speed. Zero lets the camera realign.
    pub speed: f32,
    /// Character height.
    pub body_height: f32,
}

impl FollowTarget {
    /// A stationary target of height 2.
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            speed: 0.0,
            body_height: 2.0,
        }
    }

    /// Builder: set the speed.
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Builder: set the body height.
    pub fn with_body_height(mut self, height: f32) -> Self {
        self.body_height = height;
        self
    }

    /// Top of the character's head.
    #[inline]
    pub fn head(&self) -> Vec3 {
        self.position + Vec3::Y * self.body_height * 0.5
    }
}

/// Wrap an angle in degrees into `[-180, 180)`.
#[inline]
pub fn wrap_degrees(degrees: f32) -> f32 {
    (degrees + 180.0).rem_euclid(360.0) - 180.0
}

/// Signed yaw in degrees that turns horizontal direction `from` onto `to`.
pub fn yaw_difference(from: Vec3, to: Vec3) -> f32 {
    let heading = |d: Vec3| f32::atan2(-d.x, -d.z);
    wrap_degrees((heading(to) - heading(from)).to_degrees())
}

fn orbit(camera: &mut Transform, pivot: Vec3, degrees: f32) {
    camera.rotate_around(pivot, Quat::from_rotation_y(degrees.to_radians()));
}

impl CameraRig {
    /// Follow `target`.
    pub fn new(target: Entity) -> Self {
        Self {
            target,
            zoom_level: 0,
            is_rotating: false,
            is_paused: false,
            zooming: false,
            recenter_remaining: 0.0,
        }
    }

    /// Builder: start at a zoom level, clamped.
    pub fn with_zoom_level(mut self, level: usize) -> Self {
        self.zoom_level = level.min(MAX_ZOOM_LEVEL);
        self
    }

    /// Advance the camera by one frame.
    ///
    /// With `may_follow` false, or while paused, the camera stays in place
    /// and only turns to look at the target.
    pub fn follow(
        &mut self,
        camera: &mut Transform,
        input: &CameraInput,
        target: &FollowTarget,
        config: &CameraConfig,
        may_follow: bool,
        dt: f32,
    ) {
        let head = target.head();
        if may_follow && !self.is_paused {
            let look = apply_dead_zone_2d(input.look, config.dead_zone);
            self.update_zoom(look.y, config);

            if !self.is_rotating && look.x.abs() > config.stick_threshold {
                orbit(camera, head, look.x.signum() * config.orbit_speed * dt);
            }
            if input.recenter_just_pressed() {
                self.start_recenter(camera, target);
            }
            self.swing(camera, target, config, dt);
            self.chase(camera, head, config, dt);
        }
        look_at_smoothly(camera, head, config.rotate_smooth * dt);
    }

    fn update_zoom(&mut self, stick: f32, config: &CameraConfig) {
        if stick.abs() <= config.stick_threshold {
            self.zooming = false;
            return;
        }
        if self.zooming {
            return;
        }
        self.zooming = true;
        self.zoom_level = if stick > 0.0 {
            (self.zoom_level + 1).min(MAX_ZOOM_LEVEL)
        } else {
            self.zoom_level.saturating_sub(1)
        };
        debug!("camera zoom level {}", self.zoom_level);
    }

    fn start_recenter(&mut self, camera: &Transform, target: &FollowTarget) {
        let forward = CameraBasis::from_rotation(camera.rotation).forward;
        let difference = yaw_difference(forward, forward_of(target.rotation));
        if difference != 0.0 {
            debug!("camera recentring by {difference:.1} degrees");
            self.recenter_remaining = difference;
            self.is_rotating = true;
        }
    }

    /// Recentre swing, or the slow idle realign.
    fn swing(&mut self, camera: &mut Transform, target: &FollowTarget, config: &CameraConfig, dt: f32) {
        let head = target.head();
        if self.is_rotating {
            let step = (config.recenter_speed * dt).min(self.recenter_remaining.abs())
                * self.recenter_remaining.signum();
            orbit(camera, head, step);
            self.recenter_remaining -= step;
            if self.recenter_remaining.abs() <= 1e-3 {
                self.recenter_remaining = 0.0;
                self.is_rotating = false;
            }
            return;
        }

        if target.speed == 0.0 {
            let forward = CameraBasis::from_rotation(camera.rotation).forward;
            let difference = yaw_difference(forward, forward_of(target.rotation));
            if difference.abs() > config.realign_tolerance {
                let step = (config.realign_speed * dt).min(difference.abs());
                orbit(camera, head, step * difference.signum());
            }
        }
    }

    fn chase(&self, camera: &mut Transform, head: Vec3, config: &CameraConfig, dt: f32) {
        let distance = config.distance(self.zoom_level);
        let forward = CameraBasis::from_rotation(camera.rotation).forward;
        let goal = head - forward * distance + Vec3::Y * config.height(self.zoom_level);

        let offset = (head - camera.translation).length();
        let damping = if offset > distance {
            config.far_damping
        } else {
            config.near_damping
        };
        let t = (damping * offset * offset * dt).clamp(0.0, 1.0);
        camera.translation = camera.translation.lerp(goal, t);
    }
}

fn look_at_smoothly(camera: &mut Transform, point: Vec3, t: f32) {
    if (point - camera.translation).length_squared() < 1e-6 {
        return;
    }
    let goal = camera.looking_at(point, Vec3::Y).rotation;
    camera.rotation = camera.rotation.slerp(goal, t.clamp(0.0, 1.0));
}
