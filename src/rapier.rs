//! Rapier3D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier3D.
//! Enable with the `rapier3d` feature.
//!
//! Probes are capsule shape casts against the Rapier query pipeline. Sensor
//! colliders become trigger volumes: their collision events are translated
//! into [`TriggerVolumeEvent`]s. Displacement is fed to a
//! [`KinematicCharacterController`] when the character has one.

use bevy::log::trace;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use bevy_rapier3d::rapier::geometry::CollisionEventFlags;

use crate::backend::CharacterPhysicsBackend;
use crate::collision::{CollisionContact, CollisionData, SurfaceContact, SurfaceTag, TriggerVolumeEvent};
use crate::config::MotorConfig;
use crate::detection::{MotorSenses, ProbeResult};
use crate::motor::CharacterMotor;
use crate::movement::forward_of;
use crate::CharacterMotorSet;

/// Longest probe cast. Anything farther reads as no hit.
pub const MAX_PROBE_DISTANCE: f32 = 10.0;

/// Rapier3D physics backend for the character motor.
pub struct Rapier3dBackend;

impl CharacterPhysicsBackend for Rapier3dBackend {
    fn plugin() -> impl Plugin {
        Rapier3dBackendPlugin
    }

    fn move_character(world: &mut World, entity: Entity, displacement: Vec3) {
        if let Some(mut controller) = world.get_mut::<KinematicCharacterController>(entity) {
            let pending = controller.translation.unwrap_or(Vec3::ZERO);
            controller.translation = Some(pending + displacement);
        } else if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.translation += displacement;
        }
    }
}

/// Plugin that sets up Rapier3D-specific systems for the character motor.
pub struct Rapier3dBackendPlugin;

impl Plugin for Rapier3dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            rapier_sense_environment.in_set(CharacterMotorSet::Sensors),
        );
        app.add_systems(
            Update,
            translate_sensor_events.before(CharacterMotorSet::Triggers),
        );
    }
}

/// Capsule matching the motor's body dimensions.
pub fn capsule_for(config: &MotorConfig) -> Collider {
    let half_segment = (config.capsule_height * 0.5 - config.capsule_radius).max(0.0);
    Collider::capsule_y(half_segment, config.capsule_radius)
}

/// Cast `shape` from `origin` along `direction`.
fn rapier_shapecast(
    context: &RapierContext,
    shape: &Collider,
    origin: Vec3,
    rotation: Quat,
    direction: Vec3,
    max_distance: f32,
    filter: QueryFilter,
) -> Option<CollisionData> {
    context
        .cast_shape(
            origin,
            rotation,
            direction,
            shape,
            ShapeCastOptions {
                max_time_of_impact: max_distance,
                stop_at_penetration: false,
                ..default()
            },
            filter,
        )
        .map(|(hit_entity, hit)| {
            let mut normal = hit.details.map(|d| d.normal1).unwrap_or(-direction);
            // Keep the normal facing the caster.
            if normal.dot(direction) > 0.0 {
                normal = -normal;
            }
            let point = origin + direction * hit.time_of_impact;
            CollisionData::new(hit.time_of_impact, normal, point, Some(hit_entity))
        })
}

/// Probe down, up and forward from every character and report close hits as
/// surface contacts.
fn rapier_sense_environment(
    rapier_context: ReadRapierContext,
    mut q_characters: Query<
        (
            Entity,
            &GlobalTransform,
            &MotorConfig,
            &mut MotorSenses,
            Option<&Collider>,
            Option<&CollisionGroups>,
        ),
        With<CharacterMotor>,
    >,
    q_tags: Query<&SurfaceTag>,
    mut contacts: EventWriter<SurfaceContact>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, transform, config, mut senses, collider, groups) in &mut q_characters {
        let (_, rotation, origin) = transform.to_scale_rotation_translation();
        let fallback = capsule_for(config);
        let shape = collider.unwrap_or(&fallback);
        let forward = forward_of(rotation);

        let mut filter = QueryFilter::default()
            .exclude_rigid_body(entity)
            .exclude_collider(entity)
            .exclude_sensors();
        if let Some(groups) = groups {
            filter = filter.groups(*groups);
        }

        let mut hits = Vec::with_capacity(3);
        senses.probes = ProbeResult::sense(forward, |direction| {
            let hit = rapier_shapecast(&context, shape, origin, rotation, direction, MAX_PROBE_DISTANCE, filter)?;
            hits.push((direction, hit));
            Some(hit.distance)
        });

        for (direction, hit) in hits {
            // Ceiling hits are handled by the probe alone.
            if direction == Vec3::Y || hit.distance > config.contact_distance {
                continue;
            }
            let tag = hit
                .entity
                .and_then(|e| q_tags.get(e).ok())
                .copied()
                .unwrap_or_default();
            let move_direction = if direction == Vec3::NEG_Y { Vec3::ZERO } else { direction };
            trace!("{entity:?} touching {tag:?} at {:.3}", hit.distance);
            contacts.write(SurfaceContact {
                character: entity,
                contact: CollisionContact::new(hit.normal, tag, move_direction),
            });
        }
    }
}

/// Turn sensor collisions involving a character into trigger-volume events.
fn translate_sensor_events(
    mut collisions: EventReader<CollisionEvent>,
    q_motors: Query<(), With<CharacterMotor>>,
    mut triggers: EventWriter<TriggerVolumeEvent>,
) {
    for event in collisions.read() {
        let (a, b, flags, entered) = match *event {
            CollisionEvent::Started(a, b, flags) => (a, b, flags, true),
            CollisionEvent::Stopped(a, b, flags) => (a, b, flags, false),
        };
        if !flags.contains(CollisionEventFlags::SENSOR) {
            continue;
        }
        let (character, volume) = if q_motors.contains(a) {
            (a, b)
        } else if q_motors.contains(b) {
            (b, a)
        } else {
            continue;
        };
        triggers.write(if entered {
            TriggerVolumeEvent::Entered { character, volume }
        } else {
            TriggerVolumeEvent::Exited { character, volume }
        });
    }
}

/// Bundle for creating a kinematic character with Rapier3D physics.
///
/// The character is moved only by the motor, through the kinematic
/// character controller, and raises collision events so sensor volumes
/// (platforms, poles) are noticed.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use msg_character_motor::prelude::*;
/// use msg_character_motor::rapier::Rapier3dCharacterBundle;
///
/// fn spawn_player(mut commands: Commands) {
///     let config = MotorConfig::player();
///     commands.spawn((
///         Transform::from_xyz(0.0, 2.0, 0.0),
///         CharacterMotor::new(),
///         Rapier3dCharacterBundle::from_config(&config),
///         config,
///     ));
/// }
/// ```
#[derive(Bundle)]
pub struct Rapier3dCharacterBundle {
    /// Kinematic body driven by the controller.
    pub rigid_body: RigidBody,
    /// Collision shape.
    pub collider: Collider,
    /// Applies the motor's displacement with collision resolution.
    pub controller: KinematicCharacterController,
    /// Raise events for sensor overlaps.
    pub active_events: ActiveEvents,
    /// Let a kinematic body touch fixed sensors.
    pub active_collision_types: ActiveCollisionTypes,
}

impl Rapier3dCharacterBundle {
    /// Bundle with a capsule matching the config.
    pub fn from_config(config: &MotorConfig) -> Self {
        Self {
            rigid_body: RigidBody::KinematicPositionBased,
            collider: capsule_for(config),
            controller: KinematicCharacterController {
                snap_to_ground: None,
                ..default()
            },
            active_events: ActiveEvents::COLLISION_EVENTS,
            active_collision_types: ActiveCollisionTypes::default()
                | ActiveCollisionTypes::KINEMATIC_STATIC
                | ActiveCollisionTypes::KINEMATIC_KINEMATIC,
        }
    }

    /// Builder: replace the collider.
    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.collider = collider;
        self
    }
}

impl Default for Rapier3dCharacterBundle {
    fn default() -> Self {
        Self::from_config(&MotorConfig::default())
    }
}

/// Bundle for a sensor volume that attaches characters on overlap.
///
/// Give the same entity a [`MovingPlatform`](crate::platform::MovingPlatform)
/// or [`Pole`](crate::pole::Pole) as well.
#[derive(Bundle)]
pub struct Rapier3dTriggerBundle {
    /// What the volume is.
    pub tag: SurfaceTag,
    /// Volume shape.
    pub collider: Collider,
    /// Marks the collider as a sensor.
    pub sensor: Sensor,
    /// Raise events for overlaps.
    pub active_events: ActiveEvents,
}

impl Rapier3dTriggerBundle {
    /// Sensor volume with the given tag and shape.
    pub fn new(tag: SurfaceTag, collider: Collider) -> Self {
        Self {
            tag,
            collider,
            sensor: Sensor,
            active_events: ActiveEvents::COLLISION_EVENTS,
        }
    }
}
