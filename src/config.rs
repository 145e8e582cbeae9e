//! Motor and camera configuration components.
//!
//! Both configs are plain data: reflected for inspection, serializable so
//! tuning can live in asset files, and validated before use.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, ensure_range, ConfigError};

/// Tuning for a [`CharacterMotor`](crate::motor::CharacterMotor).
///
/// Distances are in world units, speeds in units per second, angles in
/// degrees and durations in seconds.
#[derive(Component, Reflect, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct MotorConfig {
    // === Physics ===
    /// Downward acceleration applied while airborne.
    pub gravity: f32,
    /// Fastest possible fall or slide speed.
    pub terminal_velocity: f32,
    /// Distance to ground within which the character counts as grounded.
    pub ground_tolerance: f32,

    // === Movement ===
    /// Maximum horizontal speed.
    pub run_speed: f32,
    /// Speed lost per second while there is no movement input.
    pub deceleration: f32,
    /// Per-axis input magnitude at or below which the axis reads as zero.
    pub dead_zone: f32,
    /// Fraction of input-driven speed available while airborne.
    pub air_control: f32,
    /// Amount the target direction nudges the carried air momentum per tick.
    pub air_momentum_gain: f32,
    /// Forward clearance that releases the against-wall lock.
    pub wall_release_distance: f32,
    /// Drop below the feet after which walking off an edge becomes a fall.
    /// Smaller drops keep the character grounded and snap it down.
    pub ledge_fall_distance: f32,

    // === Jumping ===
    /// Whether the character can jump at all.
    pub use_jump: bool,
    /// Vertical velocity of a normal jump.
    pub jump_speed: f32,
    /// Whether releasing the jump button cuts the jump short.
    pub use_variable_height_jump: bool,
    /// Vertical velocity a released jump is cut down to.
    pub short_jump_speed: f32,
    /// Fraction of `jump_speed` below which a released jump is cut.
    pub jump_cut_fraction: f32,
    /// Whether a second jump is allowed shortly after landing.
    pub use_double_jump: bool,
    /// Vertical velocity of a double jump.
    pub double_jump_speed: f32,
    /// Seconds after a first-jump landing during which a double jump is allowed.
    pub double_jump_window: f32,
    /// Length of the landing animation. Landing begins once the estimated
    /// time to ground drops below this.
    pub fall_animation_duration: f32,
    /// Delay between the end of a fall and the landing sound.
    pub landing_cue_delay: f32,

    // === Sliding ===
    /// Whether steep slopes make the character slide.
    pub use_slide: bool,
    /// Divides the slide acceleration.
    pub slide_friction: f32,
    /// Steepest slope the character can stand on.
    pub max_walkable_slope: f32,
    /// Slopes steeper than this are walls, not slides.
    pub wall_slope: f32,

    // === Body ===
    /// Radius of the character capsule.
    pub capsule_radius: f32,
    /// Total height of the character capsule.
    pub capsule_height: f32,
    /// Probe hits closer than this are reported as contacts.
    pub contact_distance: f32,

    // === Poles ===
    /// Rotation around a pole at full horizontal input, degrees per second.
    pub pole_rotation_speed: f32,
    /// Fraction of `run_speed` used to climb a pole.
    pub pole_climb_fraction: f32,
    /// Space kept between the top of the character and the top of a pole.
    pub pole_cap_clearance: f32,
    /// Standoff error tolerated before the character is pushed back out.
    pub pole_standoff_tolerance: f32,

    // === Feedback ===
    /// Grounded travel distance between footstep signals.
    pub footstep_stride: f32,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            gravity: 40.0,
            terminal_velocity: 20.0,
            ground_tolerance: 0.05,

            run_speed: 8.0,
            deceleration: 25.0,
            dead_zone: 0.16,
            air_control: 0.5,
            air_momentum_gain: 0.1,
            wall_release_distance: 0.15,
            ledge_fall_distance: 0.5,

            use_jump: true,
            jump_speed: 10.0,
            use_variable_height_jump: true,
            short_jump_speed: 4.0,
            jump_cut_fraction: 0.75,
            use_double_jump: true,
            double_jump_speed: 16.0,
            double_jump_window: 0.5,
            fall_animation_duration: 1.0,
            landing_cue_delay: 0.3,

            use_slide: true,
            slide_friction: 2.0,
            max_walkable_slope: 40.0,
            wall_slope: 80.0,

            capsule_radius: 0.5,
            capsule_height: 2.0,
            contact_distance: 0.1,

            pole_rotation_speed: 120.0,
            pole_climb_fraction: 0.25,
            pole_cap_clearance: 1.0,
            pole_standoff_tolerance: 0.01,

            footstep_stride: 1.6,
        }
    }
}

impl MotorConfig {
    /// Config for the player character.
    pub fn player() -> Self {
        Self::default()
    }

    /// Low-gravity config with long, controllable jumps.
    pub fn floaty() -> Self {
        Self {
            gravity: 20.0,
            terminal_velocity: 12.0,
            air_control: 0.8,
            double_jump_window: 0.8,
            ..default()
        }
    }

    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("gravity", self.gravity)?;
        ensure_positive("terminal_velocity", self.terminal_velocity)?;
        ensure_positive("ground_tolerance", self.ground_tolerance)?;
        ensure_positive("run_speed", self.run_speed)?;
        ensure_positive("deceleration", self.deceleration)?;
        ensure_range("dead_zone", self.dead_zone, 0.0, 0.99)?;
        ensure_range("air_control", self.air_control, 0.0, 1.0)?;
        ensure_range("air_momentum_gain", self.air_momentum_gain, 0.0, self.run_speed)?;
        ensure_range("wall_release_distance", self.wall_release_distance, 0.0, 10.0)?;
        ensure_range("ledge_fall_distance", self.ledge_fall_distance, self.ground_tolerance, 10.0)?;
        ensure_positive("jump_speed", self.jump_speed)?;
        ensure_range("short_jump_speed", self.short_jump_speed, 0.0, self.jump_speed)?;
        ensure_range("jump_cut_fraction", self.jump_cut_fraction, 0.0, 1.0)?;
        ensure_positive("double_jump_speed", self.double_jump_speed)?;
        ensure_range("double_jump_window", self.double_jump_window, 0.0, 10.0)?;
        ensure_range("fall_animation_duration", self.fall_animation_duration, 0.0, 10.0)?;
        ensure_range("landing_cue_delay", self.landing_cue_delay, 0.0, 10.0)?;
        ensure_positive("slide_friction", self.slide_friction)?;
        ensure_range("max_walkable_slope", self.max_walkable_slope, 0.0, 90.0)?;
        ensure_range("wall_slope", self.wall_slope, self.max_walkable_slope, 90.0)?;
        ensure_positive("capsule_radius", self.capsule_radius)?;
        ensure_positive("capsule_height", self.capsule_height)?;
        ensure_positive("contact_distance", self.contact_distance)?;
        ensure_range("pole_rotation_speed", self.pole_rotation_speed, 0.0, 3600.0)?;
        ensure_range("pole_climb_fraction", self.pole_climb_fraction, 0.0, 1.0)?;
        ensure_range("pole_cap_clearance", self.pole_cap_clearance, 0.0, 100.0)?;
        ensure_range("pole_standoff_tolerance", self.pole_standoff_tolerance, 0.0, 1.0)?;
        ensure_positive("footstep_stride", self.footstep_stride)?;
        Ok(())
    }

    /// Speed at or below which a released jump is cut.
    #[inline]
    pub fn jump_cut_speed(&self) -> f32 {
        self.jump_speed * self.jump_cut_fraction
    }

    /// Vertical speed used to climb a pole.
    #[inline]
    pub fn pole_climb_speed(&self) -> f32 {
        self.run_speed * self.pole_climb_fraction
    }

    /// Builder: set gravity and terminal velocity.
    pub fn with_gravity(mut self, gravity: f32, terminal_velocity: f32) -> Self {
        self.gravity = gravity;
        self.terminal_velocity = terminal_velocity;
        self
    }

    /// Builder: set ground tolerance.
    pub fn with_ground_tolerance(mut self, tolerance: f32) -> Self {
        self.ground_tolerance = tolerance;
        self
    }

    /// Builder: set run speed and deceleration.
    pub fn with_movement(mut self, run_speed: f32, deceleration: f32) -> Self {
        self.run_speed = run_speed;
        self.deceleration = deceleration;
        self
    }

    /// Builder: set the input dead zone.
    pub fn with_dead_zone(mut self, dead_zone: f32) -> Self {
        self.dead_zone = dead_zone;
        self
    }

    /// Builder: set air control.
    pub fn with_air_control(mut self, air_control: f32) -> Self {
        self.air_control = air_control;
        self
    }

    /// Builder: set normal and short jump speeds.
    pub fn with_jump(mut self, jump_speed: f32, short_jump_speed: f32) -> Self {
        self.jump_speed = jump_speed;
        self.short_jump_speed = short_jump_speed;
        self
    }

    /// Builder: set double jump speed and window.
    pub fn with_double_jump(mut self, speed: f32, window: f32) -> Self {
        self.double_jump_speed = speed;
        self.double_jump_window = window;
        self
    }

    /// Builder: enable or disable jumping.
    pub fn with_jump_enabled(mut self, enabled: bool) -> Self {
        self.use_jump = enabled;
        self
    }

    /// Builder: enable or disable the double jump.
    pub fn with_double_jump_enabled(mut self, enabled: bool) -> Self {
        self.use_double_jump = enabled;
        self
    }

    /// Builder: enable or disable variable-height jumps.
    pub fn with_variable_height_jump(mut self, enabled: bool) -> Self {
        self.use_variable_height_jump = enabled;
        self
    }

    /// Builder: enable or disable sliding.
    pub fn with_slide_enabled(mut self, enabled: bool) -> Self {
        self.use_slide = enabled;
        self
    }

    /// Builder: set slide friction.
    pub fn with_slide_friction(mut self, friction: f32) -> Self {
        self.slide_friction = friction;
        self
    }

    /// Builder: set the walkable and wall slope limits.
    pub fn with_slope_limits(mut self, max_walkable: f32, wall: f32) -> Self {
        self.max_walkable_slope = max_walkable;
        self.wall_slope = wall;
        self
    }

    /// Builder: set capsule dimensions.
    pub fn with_capsule(mut self, radius: f32, height: f32) -> Self {
        self.capsule_radius = radius;
        self.capsule_height = height;
        self
    }
}

/// Tuning for a follow [`CameraRig`](crate::camera::CameraRig).
#[derive(Component, Reflect, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct CameraConfig {
    /// Follow distance per zoom level.
    pub zoom_distances: [f32; 3],
    /// Follow height above the character's head per zoom level.
    pub zoom_heights: [f32; 3],
    /// Stick deflection needed to zoom or orbit.
    pub stick_threshold: f32,
    /// Per-axis dead zone for the camera stick.
    pub dead_zone: f32,
    /// Orbit speed while the stick is held, degrees per second.
    pub orbit_speed: f32,
    /// Speed at which an idle camera swings behind the character.
    pub realign_speed: f32,
    /// Speed of a requested recentre.
    pub recenter_speed: f32,
    /// Yaw difference tolerated before an idle camera realigns.
    pub realign_tolerance: f32,
    /// Position damping while farther than the follow distance.
    pub far_damping: f32,
    /// Position damping while within the follow distance.
    pub near_damping: f32,
    /// Look-at smoothing, per second.
    pub rotate_smooth: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            zoom_distances: [7.0, 10.0, 13.0],
            zoom_heights: [1.0, 4.0, 14.0],
            stick_threshold: 0.98,
            dead_zone: 0.16,
            orbit_speed: 84.0,
            realign_speed: 30.0,
            recenter_speed: 360.0,
            realign_tolerance: 2.0,
            far_damping: 0.04,
            near_damping: 0.018,
            rotate_smooth: 2.5,
        }
    }
}

impl CameraConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for distance in self.zoom_distances {
            ensure_positive("zoom_distances", distance)?;
        }
        for height in self.zoom_heights {
            ensure_range("zoom_heights", height, -100.0, 100.0)?;
        }
        ensure_range("stick_threshold", self.stick_threshold, 0.0, 1.0)?;
        ensure_range("dead_zone", self.dead_zone, 0.0, self.stick_threshold)?;
        ensure_positive("orbit_speed", self.orbit_speed)?;
        ensure_positive("realign_speed", self.realign_speed)?;
        ensure_positive("recenter_speed", self.recenter_speed)?;
        ensure_range("realign_tolerance", self.realign_tolerance, 0.0, 180.0)?;
        ensure_positive("far_damping", self.far_damping)?;
        ensure_positive("near_damping", self.near_damping)?;
        ensure_positive("rotate_smooth", self.rotate_smooth)?;
        Ok(())
    }

    /// Follow distance for a zoom level, clamped into range.
    pub fn distance(&self, zoom_level: usize) -> f32 {
        self.zoom_distances[zoom_level.min(self.zoom_distances.len() - 1)]
    }

    /// Follow height for a zoom level, clamped into range.
    pub fn height(&self, zoom_level: usize) -> f32 {
        self.zoom_heights[zoom_level.min(self.zoom_heights.len() - 1)]
    }

    /// Builder: set the zoom tables.
    pub fn with_zoom(mut self, distances: [f32; 3], heights: [f32; 3]) -> Self {
        self.zoom_distances = distances;
        self.zoom_heights = heights;
        self
    }

    /// Builder: set the far and near damping coefficients.
    pub fn with_damping(mut self, far: f32, near: f32) -> Self {
        self.far_damping = far;
        self.near_damping = near;
        self
    }
}
