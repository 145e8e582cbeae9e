//! Collision data structures.
//!
//! These structures carry what the external collision layer reports to the
//! motor: shape cast hits, surface contacts and trigger-volume overlaps.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Information about a shape cast collision.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollisionData {
    /// Distance to the hit point.
    pub distance: f32,
    /// Normal of the surface at hit point.
    pub normal: Vec3,
    /// World position of the hit point.
    pub point: Vec3,
    /// Entity that was hit (if any).
    pub entity: Option<Entity>,
}

impl CollisionData {
    /// Create a collision result.
    pub fn new(distance: f32, normal: Vec3, point: Vec3, entity: Option<Entity>) -> Self {
        Self {
            distance,
            normal,
            point,
            entity,
        }
    }
}

/// Gameplay classification of a surface or volume.
///
/// Attach to level geometry. Untagged geometry is treated as [`SurfaceTag::Other`].
#[derive(
    Component, Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[reflect(Component)]
pub enum SurfaceTag {
    /// Walkable or slideable level terrain.
    Terrain,
    /// A moving platform.
    Platform,
    /// An enemy body. Never causes sliding.
    Enemy,
    /// Water, spikes and other natural hazards.
    Hazard,
    /// A climbable pole.
    Pole,
    /// Anything else.
    #[default]
    Other,
}

/// A single contact between the character and a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionContact {
    /// Surface normal at the contact (unit length).
    pub normal: Vec3,
    /// Tag of the touched surface.
    pub tag: SurfaceTag,
    /// Direction the character was moving when the contact occurred.
    pub move_direction: Vec3,
}

impl CollisionContact {
    /// Create a contact. Degenerate normals fall back to world up.
    pub fn new(normal: Vec3, tag: SurfaceTag, move_direction: Vec3) -> Self {
        let normal = normal.normalize_or_zero();
        Self {
            normal: if normal == Vec3::ZERO { Vec3::Y } else { normal },
            tag,
            move_direction,
        }
    }

    /// Slope of the touched surface in degrees (0 = flat floor, 90 = wall).
    pub fn slope_degrees(&self) -> f32 {
        self.normal.dot(Vec3::Y).clamp(-1.0, 1.0).acos().to_degrees()
    }

    /// Whether the touched surface belongs to an enemy.
    pub fn is_enemy(&self) -> bool {
        self.tag == SurfaceTag::Enemy
    }

    /// Horizontal direction pointing into the touched surface.
    pub fn into_surface(&self) -> Vec3 {
        let flat = Vec3::new(self.move_direction.x, 0.0, self.move_direction.z).normalize_or_zero();
        if flat != Vec3::ZERO {
            return flat;
        }
        Vec3::new(-self.normal.x, 0.0, -self.normal.z).normalize_or_zero()
    }
}

/// Contact event delivered by the collision layer for a character.
#[derive(Event, Debug, Clone, Copy)]
pub struct SurfaceContact {
    /// The character that touched the surface.
    pub character: Entity,
    /// Contact details.
    pub contact: CollisionContact,
}

/// Trigger-volume overlap changes delivered by the collision layer.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerVolumeEvent {
    /// The character started overlapping a volume.
    Entered {
        /// The character entity.
        character: Entity,
        /// The volume entity.
        volume: Entity,
    },
    /// The character stopped overlapping a volume.
    Exited {
        /// The character entity.
        character: Entity,
        /// The volume entity.
        volume: Entity,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn collision_data_hit() {
        let cast = CollisionData::new(5.0, Vec3::Y, Vec3::new(10.0, 0.0, 0.0), None);

        assert_eq!(cast.distance, 5.0);
        assert_eq!(cast.normal, Vec3::Y);
        assert_eq!(cast.point, Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn collision_data_with_entity() {
        let entity = Entity::from_raw(42);
        let cast = CollisionData::new(3.0, Vec3::X, Vec3::ZERO, Some(entity));

        assert_eq!(cast.entity, Some(entity));
    }

    #[test]
    fn slope_of_flat_floor_is_zero() {
        let contact = CollisionContact::new(Vec3::Y, SurfaceTag::Terrain, Vec3::NEG_Y);
        assert_relative_eq!(contact.slope_degrees(), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn slope_of_tilted_surface() {
        let normal = Vec3::new(1.0, 1.0, 0.0);
        let contact = CollisionContact::new(normal, SurfaceTag::Terrain, Vec3::NEG_Y);
        assert_relative_eq!(contact.slope_degrees(), 45.0, epsilon = 1e-3);
    }

    #[test]
    fn slope_of_wall_is_ninety() {
        let contact = CollisionContact::new(Vec3::NEG_Z, SurfaceTag::Other, Vec3::Z);
        assert_relative_eq!(contact.slope_degrees(), 90.0, epsilon = 1e-3);
    }

    #[test]
    fn zero_normal_falls_back_to_up() {
        let contact = CollisionContact::new(Vec3::ZERO, SurfaceTag::Other, Vec3::ZERO);
        assert_eq!(contact.normal, Vec3::Y);
        assert!(!contact.slope_degrees().is_nan());
    }

    #[test]
    fn into_surface_prefers_move_direction() {
        let contact = CollisionContact::new(Vec3::Z, SurfaceTag::Other, Vec3::new(0.0, -1.0, -2.0));
        assert_relative_eq!(contact.into_surface().z, -1.0, epsilon = 1e-5);

        let still = CollisionContact::new(Vec3::Z, SurfaceTag::Other, Vec3::ZERO);
        assert_relative_eq!(still.into_surface().z, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn enemy_tag_is_detected() {
        let contact = CollisionContact::new(Vec3::Y, SurfaceTag::Enemy, Vec3::ZERO);
        assert!(contact.is_enemy());
    }
}
