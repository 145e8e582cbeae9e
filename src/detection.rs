//! Environment probe results.
//!
//! The physics backend casts the character's collision volume down, up and
//! forward once per fixed tick. The results are stored in [`MotorSenses`] and
//! handed to the motor as an immutable snapshot, so every decision made during
//! one act tick sees the same view of the world.

use bevy::prelude::*;

use crate::collision::CollisionContact;

/// Distance reported when a probe hits nothing.
pub const NO_HIT_DISTANCE: f32 = 100.0;

/// Ground tolerance multiplier while riding a moving platform.
pub const RIDING_TOLERANCE_SCALE: f32 = 3.0;

/// Ceiling distance at which an ascending jump is cut off.
pub const CEILING_CONTACT_DISTANCE: f32 = 0.01;

/// Distances to the nearest surface in the three probed directions.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct ProbeResult {
    /// Distance to the surface below.
    pub distance_to_ground: f32,
    /// Distance to the surface above.
    pub distance_to_ceiling: f32,
    /// Distance to the surface in front of the character.
    pub distance_to_forward: f32,
}

impl Default for ProbeResult {
    fn default() -> Self {
        Self {
            distance_to_ground: NO_HIT_DISTANCE,
            distance_to_ceiling: NO_HIT_DISTANCE,
            distance_to_forward: NO_HIT_DISTANCE,
        }
    }
}

impl ProbeResult {
    /// Create a probe result, clamping each distance into `[0, NO_HIT_DISTANCE]`.
    pub fn new(ground: f32, ceiling: f32, forward: f32) -> Self {
        Self {
            distance_to_ground: Self::clamp_distance(Some(ground)),
            distance_to_ceiling: Self::clamp_distance(Some(ceiling)),
            distance_to_forward: Self::clamp_distance(Some(forward)),
        }
    }

    /// Run the three probes through `cast`.
    ///
    /// `cast` receives a unit direction and returns the hit distance, or
    /// `None` when nothing was hit.
    pub fn sense(forward: Vec3, mut cast: impl FnMut(Vec3) -> Option<f32>) -> Self {
        let forward = Vec3::new(forward.x, 0.0, forward.z).normalize_or(Vec3::NEG_Z);
        Self {
            distance_to_ground: Self::clamp_distance(cast(Vec3::NEG_Y)),
            distance_to_ceiling: Self::clamp_distance(cast(Vec3::Y)),
            distance_to_forward: Self::clamp_distance(cast(forward)),
        }
    }

    /// Map a raw cast result onto the probe range.
    pub fn clamp_distance(distance: Option<f32>) -> f32 {
        distance
            .filter(|d| d.is_finite())
            .map_or(NO_HIT_DISTANCE, |d| d.clamp(0.0, NO_HIT_DISTANCE))
    }

    /// Grounded predicate.
    ///
    /// While riding a platform the tolerance is tripled to absorb jitter from
    /// the platform's own motion.
    pub fn is_grounded(&self, tolerance: f32, riding_platform: bool) -> bool {
        let tolerance = if riding_platform {
            tolerance * RIDING_TOLERANCE_SCALE
        } else {
            tolerance
        };
        self.distance_to_ground <= tolerance
    }

    /// Whether an ascending character has reached a ceiling.
    pub fn touching_ceiling(&self) -> bool {
        self.distance_to_ceiling <= CEILING_CONTACT_DISTANCE
    }

    /// Estimated seconds until the ground is reached at `vertical_velocity`.
    ///
    /// Returns infinity for a zero velocity instead of dividing by zero.
    pub fn time_to_ground(&self, vertical_velocity: f32) -> f32 {
        if vertical_velocity == 0.0 {
            return f32::INFINITY;
        }
        (self.distance_to_ground / vertical_velocity).abs()
    }
}

/// Per-character sensing snapshot.
///
/// Written during the fixed-step sense phase, read during the act phase.
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct MotorSenses {
    /// Latest probe distances.
    pub probes: ProbeResult,
    /// Contacts reported since the last sense tick, in arrival order.
    #[reflect(ignore)]
    pub contacts: Vec<CollisionContact>,
}

impl MotorSenses {
    /// Create a snapshot from probe distances with no contacts.
    pub fn from_probes(probes: ProbeResult) -> Self {
        Self {
            probes,
            contacts: Vec::new(),
        }
    }

    /// Builder: append a contact.
    pub fn with_contact(mut self, contact: CollisionContact) -> Self {
        self.contacts.push(contact);
        self
    }

    /// Distance to the surface in front of the character.
    pub fn distance_to_forward(&self) -> f32 {
        self.probes.distance_to_forward
    }
}
