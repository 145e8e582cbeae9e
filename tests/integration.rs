//! Integration tests for the character motor.
//!
//! These tests run the full plugin in a headless app. A scripted backend
//! feeds probe distances from a resource, so every test controls exactly what
//! the motor senses and checks what it does with it.

use std::time::Duration;

use approx::assert_relative_eq;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use msg_character_motor::prelude::*;

const DT: f32 = 1.0 / 60.0;

/// Probe distances reported for every character on each sense tick.
#[derive(Resource, Clone, Copy)]
struct ScriptedProbes(ProbeResult);

impl Default for ScriptedProbes {
    fn default() -> Self {
        Self(ProbeResult::new(0.0, 100.0, 100.0))
    }
}

/// Signals raised so far.
#[derive(Resource, Default)]
struct RecordedSignals(Vec<MotorSignal>);

/// Backend whose sensors read [`ScriptedProbes`] and whose characters move by
/// their `Transform`.
struct ScriptedBackend;

impl CharacterPhysicsBackend for ScriptedBackend {
    fn plugin() -> impl Plugin {
        ScriptedBackendPlugin
    }
}

struct ScriptedBackendPlugin;

impl Plugin for ScriptedBackendPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ScriptedProbes>();
        app.add_systems(
            FixedUpdate,
            scripted_sensors.in_set(CharacterMotorSet::Sensors),
        );
    }
}

fn scripted_sensors(probes: Res<ScriptedProbes>, mut q_senses: Query<&mut MotorSenses>) {
    for mut senses in &mut q_senses {
        senses.probes = probes.0;
    }
}

fn record_signals(mut events: EventReader<MotorSignalEvent>, mut recorded: ResMut<RecordedSignals>) {
    recorded.0.extend(events.read().map(|e| e.signal));
}

/// Create a minimal test app with the scripted backend.
///
/// Frames advance by exactly one 60 Hz step. The fixed schedule is run by
/// hand in [`tick`], once per frame.
fn create_test_app() -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins);
    app.add_plugins(CharacterMotorPlugin::<ScriptedBackend>::default());
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / 60.0,
    )));
    app.insert_resource(Time::<Fixed>::from_seconds(3600.0));
    app.init_resource::<RecordedSignals>();
    app.add_systems(Update, record_signals.after(CharacterMotorSet::Act));

    app.finish();
    app.cleanup();
    app
}

/// Run one sense tick followed by one frame.
fn tick(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
    app.update();
}

/// Run the app for N frames.
fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        tick(app);
    }
}

fn set_probes(app: &mut App, ground: f32, ceiling: f32, forward: f32) {
    app.world_mut().resource_mut::<ScriptedProbes>().0 = ProbeResult::new(ground, ceiling, forward);
}

fn spawn_character(app: &mut App, position: Vec3) -> Entity {
    app.world_mut()
        .spawn((
            Transform::from_translation(position),
            CharacterMotor::new(),
            MotorConfig::default(),
        ))
        .id()
}

fn set_movement(app: &mut App, entity: Entity, movement: Vec2) {
    app.world_mut()
        .get_mut::<MotorInput>(entity)
        .unwrap()
        .set_movement(movement);
}

fn set_jump(app: &mut App, entity: Entity, pressed: bool) {
    app.world_mut()
        .get_mut::<MotorInput>(entity)
        .unwrap()
        .set_jump_pressed(pressed);
}

fn motor(app: &App, entity: Entity) -> &CharacterMotor {
    app.world().get::<CharacterMotor>(entity).unwrap()
}

fn position(app: &App, entity: Entity) -> Vec3 {
    app.world().get::<Transform>(entity).unwrap().translation
}

fn signals(app: &App) -> &[MotorSignal] {
    &app.world().resource::<RecordedSignals>().0
}

fn contact_with_slope(degrees: f32, tag: SurfaceTag) -> CollisionContact {
    let radians = degrees.to_radians();
    CollisionContact::new(Vec3::new(0.0, radians.cos(), radians.sin()), tag, Vec3::ZERO)
}

// ==================== Movement Tests ====================

mod movement {
    use super::*;

    #[test]
    fn spawned_character_gets_required_components() {
        let mut app = create_test_app();
        let character = app.world_mut().spawn(CharacterMotor::new()).id();
        tick(&mut app);

        assert!(app.world().get::<MotorInput>(character).is_some());
        assert!(app.world().get::<MotorSenses>(character).is_some());
        assert!(app.world().get::<MotorConfig>(character).is_some());
    }

    #[test]
    fn running_forward_moves_along_negative_z() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app, Vec3::ZERO);
        set_movement(&mut app, character, Vec2::new(0.0, 1.0));

        run_frames(&mut app, 30);

        let config = MotorConfig::default();
        let pos = position(&app, character);
        assert_relative_eq!(pos.z, -config.run_speed * 30.0 * DT, epsilon = 1e-3);
        assert_relative_eq!(pos.x, 0.0, epsilon = 1e-4);
        assert_eq!(motor(&app, character).current_speed(), config.run_speed);
        assert!(app.world().get::<Grounded>(character).is_some());
        assert!(app.world().get::<Airborne>(character).is_none());
    }

    #[test]
    fn movement_is_relative_to_the_camera() {
        let mut app = create_test_app();
        // Camera looking along -X.
        let camera = app
            .world_mut()
            .spawn(Transform::from_xyz(10.0, 2.0, 0.0).looking_at(Vec3::ZERO, Vec3::Y))
            .id();
        let character = app
            .world_mut()
            .spawn((Transform::default(), CharacterMotor::new().with_camera(camera)))
            .id();
        set_movement(&mut app, character, Vec2::new(0.0, 1.0));

        run_frames(&mut app, 10);

        let pos = position(&app, character);
        assert!(pos.x < -1.0);
        assert_relative_eq!(pos.z, 0.0, epsilon = 1e-3);
        let facing = app.world().get::<Transform>(character).unwrap().rotation * Vec3::NEG_Z;
        assert_relative_eq!(facing.x, -1.0, epsilon = 1e-4);
    }

    #[test]
    fn missing_camera_falls_back_to_world_axes() {
        let mut app = create_test_app();
        let camera = app.world_mut().spawn(Transform::default()).id();
        let character = app
            .world_mut()
            .spawn((Transform::default(), CharacterMotor::new().with_camera(camera)))
            .id();
        app.world_mut().despawn(camera);
        set_movement(&mut app, character, Vec2::new(1.0, 0.0));

        tick(&mut app);

        assert!(motor(&app, character).camera.is_none());
        assert!(position(&app, character).x > 0.0);
    }

    #[test]
    fn input_inside_dead_zone_does_nothing() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app, Vec3::ZERO);
        set_movement(&mut app, character, Vec2::new(0.16, -0.1));

        run_frames(&mut app, 10);

        assert_eq!(position(&app, character), Vec3::ZERO);
    }
}

// ==================== Jump Tests ====================

mod jumping {
    use super::*;

    #[test]
    fn jump_launches_and_raises_signals() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app, Vec3::ZERO);
        set_jump(&mut app, character, true);

        tick(&mut app);

        let config = MotorConfig::default();
        assert_eq!(motor(&app, character).vertical_velocity, config.jump_speed);
        assert_relative_eq!(position(&app, character).y, config.jump_speed * DT, epsilon = 1e-5);
        assert!(signals(&app).contains(&MotorSignal::JumpStart));
        assert!(signals(&app).contains(&MotorSignal::JumpSound));

        tick(&mut app);
        assert!(app.world().get::<Airborne>(character).is_some());
        assert!(app.world().get::<Grounded>(character).is_none());
    }

    #[test]
    fn held_jump_fires_once() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app, Vec3::ZERO);
        set_jump(&mut app, character, true);
        tick(&mut app);

        // Land while still holding the button.
        app.world_mut().get_mut::<CharacterMotor>(character).unwrap().vertical_velocity = -1.0;
        tick(&mut app);
        assert!(motor(&app, character).mode.is_grounded());

        tick(&mut app);
        assert!(motor(&app, character).mode.is_grounded());
        let starts = signals(&app).iter().filter(|s| **s == MotorSignal::JumpStart).count();
        assert_eq!(starts, 1);
    }

    #[test]
    fn released_jump_is_cut_short() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app, Vec3::ZERO);
        set_jump(&mut app, character, true);
        tick(&mut app);

        set_probes(&mut app, 1.0, 100.0, 100.0);
        run_frames(&mut app, 4);
        set_jump(&mut app, character, false);
        tick(&mut app);

        let config = MotorConfig::default();
        let vv = motor(&app, character).vertical_velocity;
        assert!(vv <= config.short_jump_speed);
        assert!(vv > 0.0);
    }

    #[test]
    fn double_jump_after_landing() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app, Vec3::ZERO);
        set_jump(&mut app, character, true);
        tick(&mut app);
        set_jump(&mut app, character, false);

        // Fall back onto the ground.
        set_probes(&mut app, 3.0, 100.0, 100.0);
        run_frames(&mut app, 30);
        set_probes(&mut app, 0.0, 100.0, 100.0);
        app.world_mut().get_mut::<CharacterMotor>(character).unwrap().vertical_velocity = -2.0;
        tick(&mut app);

        let window = motor(&app, character).mode.double_jump_window();
        assert!(window > 0.0);

        set_jump(&mut app, character, true);
        tick(&mut app);

        let config = MotorConfig::default();
        assert_eq!(motor(&app, character).vertical_velocity, config.double_jump_speed);
        assert_eq!(motor(&app, character).mode.double_jump_window(), 0.0);
    }

    #[test]
    fn jump_request_is_ignored_when_disabled() {
        let mut app = create_test_app();
        let character = app
            .world_mut()
            .spawn((
                Transform::default(),
                CharacterMotor::new(),
                MotorConfig::default().with_jump_enabled(false),
            ))
            .id();
        set_jump(&mut app, character, true);
        tick(&mut app);
        assert!(motor(&app, character).mode.is_grounded());
    }
}

// ==================== Contact Tests ====================

mod contacts {
    use super::*;

    #[test]
    fn steep_terrain_starts_a_slide() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app, Vec3::ZERO);
        app.world_mut().send_event(SurfaceContact {
            character,
            contact: contact_with_slope(45.0, SurfaceTag::Terrain),
        });

        tick(&mut app);
        assert!(motor(&app, character).mode.is_sliding());
        assert!(signals(&app).contains(&MotorSignal::SlideLoopStarted));
        assert!(app.world().get::<Grounded>(character).is_some());

        let mut last = 0.0;
        for _ in 0..10 {
            tick(&mut app);
            let speed = motor(&app, character).mode.slide().unwrap().speed;
            assert!(speed > last);
            last = speed;
        }
        assert!(position(&app, character).y < 0.0);
    }

    #[test]
    fn contacts_are_consumed_once() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app, Vec3::ZERO);
        app.world_mut().send_event(SurfaceContact {
            character,
            contact: contact_with_slope(45.0, SurfaceTag::Terrain),
        });
        tick(&mut app);
        assert!(app.world().get::<MotorSenses>(character).unwrap().contacts.is_empty());
    }

    #[test]
    fn steep_enemy_does_not_slide() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app, Vec3::ZERO);
        app.world_mut().send_event(SurfaceContact {
            character,
            contact: contact_with_slope(45.0, SurfaceTag::Enemy),
        });
        tick(&mut app);
        assert!(motor(&app, character).mode.is_grounded());
    }

    #[test]
    fn wall_blocks_until_clear() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app, Vec3::ZERO);
        set_movement(&mut app, character, Vec2::new(0.0, 1.0));
        set_probes(&mut app, 0.0, 100.0, 0.05);
        app.world_mut().send_event(SurfaceContact {
            character,
            contact: CollisionContact::new(Vec3::Z, SurfaceTag::Terrain, Vec3::NEG_Z),
        });

        run_frames(&mut app, 5);
        assert!(motor(&app, character).mode.is_grounded());
        assert!(motor(&app, character).against_wall.is_some());
        assert_relative_eq!(position(&app, character).z, 0.0);

        set_probes(&mut app, 0.0, 100.0, 2.0);
        run_frames(&mut app, 5);
        assert!(motor(&app, character).against_wall.is_none());
        assert!(position(&app, character).z < 0.0);
    }
}

// ==================== Force Tests ====================

mod force {
    use super::*;

    #[test]
    fn apply_force_event_pushes_the_character() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app, Vec3::ZERO);
        set_movement(&mut app, character, Vec2::new(0.0, 1.0));
        app.world_mut()
            .send_event(ApplyForce::new(character, Vec3::X, 5.0));

        tick(&mut app);

        let config = MotorConfig::default();
        let pos = position(&app, character);
        assert_relative_eq!(pos.x, (5.0 - config.gravity * DT) * DT, epsilon = 1e-5);
        assert_relative_eq!(pos.z, 0.0);
        assert!(motor(&app, character).mode.is_force_overridden());
        assert!(app.world().get::<Grounded>(character).is_none());
    }

    #[test]
    fn control_returns_after_the_push_decays() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app, Vec3::ZERO);
        app.world_mut()
            .send_event(ApplyForce::new(character, Vec3::X, 2.0));
        run_frames(&mut app, 10);

        assert!(!motor(&app, character).external_force.is_active());
        assert!(motor(&app, character).mode.is_grounded());
        let settled = position(&app, character).x;

        run_frames(&mut app, 5);
        assert_relative_eq!(position(&app, character).x, settled);
    }

    #[test]
    fn damage_suppresses_control() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app, Vec3::ZERO);
        app.world_mut()
            .entity_mut(character)
            .insert(DamageState::taking(DamagePhase::TakeDamage));
        set_movement(&mut app, character, Vec2::new(1.0, 1.0));

        run_frames(&mut app, 5);
        assert_eq!(position(&app, character), Vec3::ZERO);

        app.world_mut()
            .entity_mut(character)
            .insert(DamageState::default());
        tick(&mut app);
        assert_ne!(position(&app, character), Vec3::ZERO);
    }
}

// ==================== Trigger Volume Tests ====================

mod triggers {
    use super::*;

    #[test]
    fn platform_carries_the_character_until_exit() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app, Vec3::ZERO);
        let platform = app
            .world_mut()
            .spawn((SurfaceTag::Platform, MovingPlatform::new(Vec3::X, 2.0)))
            .id();
        app.world_mut().send_event(TriggerVolumeEvent::Entered {
            character,
            volume: platform,
        });

        run_frames(&mut app, 30);
        assert!(motor(&app, character).riding_platform);
        assert_relative_eq!(position(&app, character).x, 1.0, epsilon = 1e-3);

        app.world_mut().send_event(TriggerVolumeEvent::Exited {
            character,
            volume: platform,
        });
        tick(&mut app);
        let after_exit = position(&app, character).x;
        run_frames(&mut app, 10);
        assert_eq!(position(&app, character).x, after_exit);
        assert!(!motor(&app, character).riding_platform);
    }

    #[test]
    fn despawned_platform_stops_the_drift() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app, Vec3::ZERO);
        let platform = app
            .world_mut()
            .spawn((SurfaceTag::Platform, MovingPlatform::new(Vec3::X, 2.0)))
            .id();
        app.world_mut().send_event(TriggerVolumeEvent::Entered {
            character,
            volume: platform,
        });
        run_frames(&mut app, 5);
        app.world_mut().despawn(platform);
        tick(&mut app);
        let x = position(&app, character).x;
        run_frames(&mut app, 5);
        assert_eq!(position(&app, character).x, x);
    }

    #[test]
    fn untagged_volume_is_ignored() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app, Vec3::ZERO);
        let volume = app.world_mut().spawn(SurfaceTag::Hazard).id();
        app.world_mut().send_event(TriggerVolumeEvent::Entered { character, volume });
        tick(&mut app);
        assert!(motor(&app, character).attached_platform.is_none());
        assert!(motor(&app, character).attached_pole.is_none());
    }

    #[test]
    fn pole_volume_attaches_and_jump_detaches() {
        let mut app = create_test_app();
        set_probes(&mut app, 2.0, 100.0, 100.0);
        let character = spawn_character(&mut app, Vec3::new(0.6, 3.0, 0.0));
        let pole = app
            .world_mut()
            .spawn((
                SurfaceTag::Pole,
                Pole::new(0.1, 6.0),
                Transform::from_xyz(0.0, 3.0, 0.0),
            ))
            .id();
        app.world_mut().send_event(TriggerVolumeEvent::Entered {
            character,
            volume: pole,
        });

        run_frames(&mut app, 5);
        assert_eq!(motor(&app, character).mode, LocomotionMode::OnPole { pole });
        assert!(signals(&app).contains(&MotorSignal::PoleAttached));
        assert_relative_eq!(position(&app, character).y, 3.0);
        assert!(app.world().get::<Grounded>(character).is_none());
        assert!(app.world().get::<Airborne>(character).is_none());

        set_jump(&mut app, character, true);
        tick(&mut app);
        assert!(motor(&app, character).mode.is_airborne());
        assert!(motor(&app, character).attached_pole.is_none());
        assert!(signals(&app).contains(&MotorSignal::PoleDetached));
    }
}

// ==================== Session Tests ====================

mod session {
    use super::*;

    #[test]
    fn paused_session_freezes_the_motor() {
        let mut app = create_test_app();
        app.insert_resource(SessionState {
            is_playing: false,
            is_level_end: false,
        });
        let character = spawn_character(&mut app, Vec3::ZERO);
        set_movement(&mut app, character, Vec2::new(0.0, 1.0));

        run_frames(&mut app, 10);
        assert_eq!(position(&app, character), Vec3::ZERO);

        app.world_mut().resource_mut::<SessionState>().is_playing = true;
        tick(&mut app);
        assert!(position(&app, character).z < 0.0);
    }

    #[test]
    fn level_end_stops_the_motor() {
        let mut app = create_test_app();
        app.insert_resource(SessionState {
            is_playing: true,
            is_level_end: true,
        });
        let character = spawn_character(&mut app, Vec3::ZERO);
        set_movement(&mut app, character, Vec2::new(0.0, 1.0));
        run_frames(&mut app, 10);
        assert_eq!(position(&app, character), Vec3::ZERO);
    }

    #[test]
    fn paused_session_stops_platform_drift() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app, Vec3::ZERO);
        let platform = app
            .world_mut()
            .spawn((SurfaceTag::Platform, MovingPlatform::new(Vec3::X, 2.0)))
            .id();
        app.world_mut().send_event(TriggerVolumeEvent::Entered {
            character,
            volume: platform,
        });
        tick(&mut app);

        app.insert_resource(SessionState {
            is_playing: false,
            is_level_end: false,
        });
        tick(&mut app);
        let x = position(&app, character).x;
        run_frames(&mut app, 5);
        assert_eq!(position(&app, character).x, x);
        assert!(!motor(&app, character).riding_platform);
    }
}

// ==================== Camera Tests ====================

mod camera {
    use super::*;

    fn spawn_camera(app: &mut App, target: Entity, position: Vec3) -> Entity {
        app.world_mut()
            .spawn((Transform::from_translation(position), CameraRig::new(target)))
            .id()
    }

    #[test]
    fn far_camera_catches_up_behind_the_character() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app, Vec3::ZERO);
        let camera = spawn_camera(&mut app, character, Vec3::new(0.0, 2.0, 100.0));

        tick(&mut app);

        let config = CameraConfig::default();
        let head = Vec3::new(0.0, 1.0, 0.0);
        let expected = head + Vec3::new(0.0, config.height(0), config.distance(0));
        let translation = app.world().get::<Transform>(camera).unwrap().translation;
        assert_relative_eq!(translation.distance(expected), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn stick_zooms_out_one_level_per_push() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app, Vec3::ZERO);
        let camera = spawn_camera(&mut app, character, Vec3::new(0.0, 2.0, 7.0));

        app.world_mut()
            .get_mut::<CameraInput>(camera)
            .unwrap()
            .set_look(Vec2::new(0.0, 1.0));
        run_frames(&mut app, 3);
        assert_eq!(app.world().get::<CameraRig>(camera).unwrap().zoom_level, 1);
    }

    #[test]
    fn paused_session_keeps_camera_in_place() {
        let mut app = create_test_app();
        app.insert_resource(SessionState {
            is_playing: false,
            is_level_end: false,
        });
        let character = spawn_character(&mut app, Vec3::ZERO);
        let camera = spawn_camera(&mut app, character, Vec3::new(20.0, 5.0, 20.0));

        tick(&mut app);

        let transform = app.world().get::<Transform>(camera).unwrap();
        assert_eq!(transform.translation, Vec3::new(20.0, 5.0, 20.0));
        assert_ne!(transform.rotation, Quat::IDENTITY);
    }
}
