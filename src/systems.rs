//! Core motor systems.
//!
//! The fixed-step sense phase fills [`MotorSenses`]; the variable-step act
//! phase runs [`CharacterMotor::act`] once per character and applies the
//! result through the physics backend. Systems that move characters are
//! generic over the backend.

use bevy::log::{debug, trace, warn};
use bevy::prelude::*;

use crate::backend::CharacterPhysicsBackend;
use crate::camera::{CameraRig, FollowTarget};
use crate::collision::{SurfaceContact, SurfaceTag, TriggerVolumeEvent};
use crate::config::{CameraConfig, MotorConfig};
use crate::detection::MotorSenses;
use crate::force::ApplyForce;
use crate::intent::{CameraInput, MotorInput};
use crate::motor::{CharacterMotor, TickContext};
use crate::movement::CameraBasis;
use crate::platform::MovingPlatform;
use crate::pole::{Pole, PoleGeometry};
use crate::session::{session_gate, SessionGate, SessionState};
use crate::signals::MotorSignalEvent;
use crate::state::{Airborne, DamageState, Grounded};

/// Variable-step delta, with a fallback for the first frame and tests.
fn frame_delta(world: &World) -> f32 {
    world
        .get_resource::<Time>()
        .map(|t| t.delta_secs())
        .filter(|&d| d > 0.0)
        .unwrap_or(1.0 / 60.0)
}

/// Append contact events to the receiving character's snapshot.
///
/// Contacts accumulate until the next act tick consumes them.
pub fn record_surface_contacts(
    mut contacts: EventReader<SurfaceContact>,
    mut q_senses: Query<&mut MotorSenses>,
) {
    for event in contacts.read() {
        if let Ok(mut senses) = q_senses.get_mut(event.character) {
            senses.contacts.push(event.contact);
        }
    }
}

/// Attach characters to platforms and poles whose volumes they enter.
pub fn handle_trigger_volumes(
    mut events: EventReader<TriggerVolumeEvent>,
    q_tags: Query<&SurfaceTag>,
    mut q_motors: Query<&mut CharacterMotor>,
) {
    for event in events.read() {
        match *event {
            TriggerVolumeEvent::Entered { character, volume } => {
                let Ok(mut motor) = q_motors.get_mut(character) else {
                    continue;
                };
                match q_tags.get(volume) {
                    Ok(SurfaceTag::Platform) => motor.attach_platform(volume),
                    Ok(SurfaceTag::Pole) => {
                        debug!("{character:?} reached pole {volume:?}");
                        motor.attach_pole(volume);
                    }
                    _ => {}
                }
            }
            TriggerVolumeEvent::Exited { character, volume } => {
                if let Ok(mut motor) = q_motors.get_mut(character) {
                    motor.detach_platform(volume);
                }
            }
        }
    }
}

/// Forward [`ApplyForce`] requests to the target motors.
pub fn handle_force_requests(
    mut requests: EventReader<ApplyForce>,
    mut q_motors: Query<(&mut CharacterMotor, &MotorConfig)>,
) {
    for request in requests.read() {
        if let Ok((mut motor, config)) = q_motors.get_mut(request.character) {
            motor.apply_force(request.direction, request.amount, config);
        }
    }
}

/// Run one act tick for every character and apply the result.
pub fn drive_motors<B: CharacterPhysicsBackend>(world: &mut World) {
    let gate = session_gate(world.get_resource::<SessionState>());
    let dt = frame_delta(world);

    let entities: Vec<Entity> = world
        .query_filtered::<Entity, With<CharacterMotor>>()
        .iter(world)
        .collect();

    for entity in entities {
        let Some(mut motor) = world.get::<CharacterMotor>(entity).cloned() else {
            continue;
        };
        let input = world.get::<MotorInput>(entity).cloned().unwrap_or_default();
        let config = world.get::<MotorConfig>(entity).cloned().unwrap_or_default();
        let senses = world.get::<MotorSenses>(entity).cloned().unwrap_or_default();
        let transform = world.get::<Transform>(entity).copied().unwrap_or_default();
        let damage_suppressed = world
            .get::<DamageState>(entity)
            .is_some_and(DamageState::suppresses_control);

        match gate {
            SessionGate::Run => {}
            SessionGate::Frozen => {
                motor.freeze();
                world.entity_mut(entity).insert(motor);
                latch_input(world, entity);
                continue;
            }
            SessionGate::Halted => {
                latch_input(world, entity);
                continue;
            }
        }

        let camera = match motor.camera {
            Some(camera) => match world.get::<Transform>(camera) {
                Some(camera_transform) => CameraBasis::from_rotation(camera_transform.rotation),
                None => {
                    warn!("camera {camera:?} of {entity:?} is gone, mapping input to world axes");
                    motor.camera = None;
                    CameraBasis::default()
                }
            },
            None => CameraBasis::default(),
        };
        let pole = motor.attached_pole.and_then(|pole| pole_geometry(world, pole));
        let platform = motor
            .attached_platform
            .and_then(|platform| world.get::<MovingPlatform>(platform).copied());

        let mut ctx = TickContext::new(&senses)
            .with_pose(transform.translation, transform.rotation)
            .with_camera(camera)
            .with_damage_suppressed(damage_suppressed);
        if let Some(pole) = pole {
            ctx = ctx.with_pole(pole);
        }
        if let Some(platform) = platform {
            ctx = ctx.with_platform(platform);
        }

        let step = motor.act(&input, &ctx, &config, dt);

        B::move_character(world, entity, step.displacement);
        if let Some(rotation) = step.rotation {
            if let Some(mut transform) = world.get_mut::<Transform>(entity) {
                transform.rotation = rotation;
            }
        }
        world.entity_mut(entity).insert(motor);
        if let Some(mut senses) = world.get_mut::<MotorSenses>(entity) {
            senses.contacts.clear();
        }
        latch_input(world, entity);

        for signal in step.signals {
            trace!("{entity:?} signal {signal:?}");
            world.send_event(MotorSignalEvent {
                character: entity,
                signal,
            });
        }
    }
}

fn latch_input(world: &mut World, entity: Entity) {
    if let Some(mut input) = world.get_mut::<MotorInput>(entity) {
        input.latch();
    }
}

fn pole_geometry(world: &World, pole: Entity) -> Option<PoleGeometry> {
    let shape = world.get::<Pole>(pole)?;
    let transform = world.get::<Transform>(pole)?;
    Some(shape.geometry(transform.translation))
}

/// Drift characters with the platform they stand on.
///
/// Runs after the act tick as a separate position adjustment.
pub fn ride_platforms<B: CharacterPhysicsBackend>(world: &mut World) {
    if session_gate(world.get_resource::<SessionState>()) != SessionGate::Run {
        return;
    }
    let dt = frame_delta(world);

    let riders: Vec<(Entity, Entity)> = world
        .query::<(Entity, &CharacterMotor)>()
        .iter(world)
        .filter_map(|(e, motor)| motor.attached_platform.map(|platform| (e, platform)))
        .collect();

    for (entity, platform) in riders {
        let motion = world.get::<MovingPlatform>(platform).copied();
        let offset = match world.get_mut::<CharacterMotor>(entity) {
            Some(mut motor) => motor.ride(motion.as_ref(), dt),
            None => continue,
        };
        if offset != Vec3::ZERO {
            B::move_character(world, entity, offset);
        }
    }
}

/// Sync state marker components with the motor's mode.
///
/// Sliding counts as grounded. A character on a pole or under a force
/// carries neither marker.
pub fn sync_state_markers(
    mut commands: Commands,
    q_motors: Query<(Entity, &CharacterMotor, Has<Grounded>, Has<Airborne>)>,
) {
    for (entity, motor, has_grounded, has_airborne) in &q_motors {
        let grounded = motor.mode.is_grounded() || motor.mode.is_sliding();
        let airborne = motor.mode.is_airborne();

        if grounded && !has_grounded {
            commands.entity(entity).insert(Grounded);
        } else if !grounded && has_grounded {
            commands.entity(entity).remove::<Grounded>();
        }

        if airborne && !has_airborne {
            commands.entity(entity).insert(Airborne);
        } else if !airborne && has_airborne {
            commands.entity(entity).remove::<Airborne>();
        }
    }
}

/// Move every follow camera.
pub fn follow_cameras(
    time: Res<Time>,
    session: Option<Res<SessionState>>,
    mut q_rigs: Query<(&mut CameraRig, &mut Transform, &mut CameraInput, &CameraConfig), Without<CharacterMotor>>,
    q_targets: Query<(&Transform, &CharacterMotor, &MotorConfig), Without<CameraRig>>,
) {
    let dt = Some(time.delta_secs()).filter(|&d| d > 0.0).unwrap_or(1.0 / 60.0);
    let may_follow = session.as_deref().is_none_or(SessionState::camera_may_follow);

    for (mut rig, mut transform, mut input, config) in &mut q_rigs {
        if let Ok((target_transform, motor, motor_config)) = q_targets.get(rig.target) {
            let target = FollowTarget::new(target_transform.translation, target_transform.rotation)
                .with_speed(motor.current_speed())
                .with_body_height(motor_config.capsule_height);
            rig.follow(&mut transform, &input, &target, config, may_follow, dt);
        }
        input.latch();
    }
}

/// Report invalid motor configs when they are added or changed.
pub fn validate_motor_configs(q_configs: Query<(Entity, &MotorConfig), Changed<MotorConfig>>) {
    for (entity, config) in &q_configs {
        if let Err(error) = config.validate() {
            warn!("invalid motor config on {entity:?}: {error}");
        }
    }
}

/// Report invalid camera configs when they are added or changed.
pub fn validate_camera_configs(q_configs: Query<(Entity, &CameraConfig), Changed<CameraConfig>>) {
    for (entity, config) in &q_configs {
        if let Err(error) = config.validate() {
            warn!("invalid camera config on {entity:?}: {error}");
        }
    }
}
