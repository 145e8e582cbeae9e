//! The character motor.
//!
//! [`CharacterMotor`] owns all locomotion state and is advanced by
//! [`CharacterMotor::act`], a pure function of the input, an immutable sensing
//! snapshot and the config. Everything the motor needs from the world arrives
//! through [`TickContext`]; everything it wants done to the world leaves through
//! [`MotorStep`].
//!
//! One act tick resolves, in order: the landing cue, the external force,
//! contacts, and then exactly one of three control paths. Force or damage
//! override wins over a pole attachment, which wins over free movement.

use bevy::log::{debug, trace};
use bevy::prelude::*;

use crate::config::MotorConfig;
use crate::detection::{MotorSenses, ProbeResult};
use crate::force::ExternalForce;
use crate::intent::MotorInput;
use crate::movement::{air_velocity, forward_of, integrate_speed, look_rotation, CameraBasis};
use crate::platform::MovingPlatform;
use crate::pole::PoleGeometry;
use crate::signals::{MotorAnimation, MotorSignal};
use crate::state::{AirState, LocomotionMode};

/// Vertical velocity kept while standing so time-to-ground estimates never
/// divide by zero.
pub const RESTING_VERTICAL_VELOCITY: f32 = -0.1;

/// Locomotion state of one character.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
#[require(MotorSenses, MotorInput, MotorConfig)]
pub struct CharacterMotor {
    /// Active locomotion mode.
    pub mode: LocomotionMode,
    /// Speed from the movement integrator, in `[0, run_speed]`.
    pub current_speed: f32,
    /// Speed at the start of the last tick.
    pub previous_speed: f32,
    /// Vertical velocity. Positive is up.
    pub vertical_velocity: f32,
    /// Horizontal velocity of the last tick.
    pub horizontal_velocity: Vec3,
    /// Horizontal velocity carried through the air.
    pub air_momentum: Vec3,
    /// Active push, if any.
    pub external_force: ExternalForce,
    /// Horizontal direction into a wall the character is pressed against.
    pub against_wall: Option<Vec3>,
    /// Platform volume the character is standing in.
    pub attached_platform: Option<Entity>,
    /// Pole the character is holding.
    pub attached_pole: Option<Entity>,
    /// Whether platform drift is currently being applied.
    pub riding_platform: bool,
    /// Follow camera whose basis maps movement input.
    pub camera: Option<Entity>,
    /// Forward clearance from the last sensing snapshot.
    pub distance_to_forward: f32,
    /// Continuous animation parameters.
    pub animation: MotorAnimation,
    /// Pending externally requested jump.
    pub(crate) jump_triggered: bool,
    /// Seconds until the landing sound, if scheduled.
    pub(crate) landing_cue: Option<f32>,
    /// Grounded distance travelled since the last footstep.
    pub(crate) stride: f32,
}

impl Default for CharacterMotor {
    fn default() -> Self {
        Self {
            mode: LocomotionMode::default(),
            current_speed: 0.0,
            previous_speed: 0.0,
            vertical_velocity: RESTING_VERTICAL_VELOCITY,
            horizontal_velocity: Vec3::ZERO,
            air_momentum: Vec3::ZERO,
            external_force: ExternalForce::default(),
            against_wall: None,
            attached_platform: None,
            attached_pole: None,
            riding_platform: false,
            camera: None,
            distance_to_forward: 0.0,
            animation: MotorAnimation::default(),
            jump_triggered: false,
            landing_cue: None,
            stride: 0.0,
        }
    }
}

/// Read-only view of the world for one act tick.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    /// Sensing snapshot from the last fixed tick.
    pub senses: &'a MotorSenses,
    /// Character position (capsule center).
    pub position: Vec3,
    /// Character rotation.
    pub rotation: Quat,
    /// Horizontal basis of the follow camera.
    pub camera: CameraBasis,
    /// Geometry of the attached pole, if it still exists.
    pub pole: Option<PoleGeometry>,
    /// The platform being ridden, if any.
    pub platform: Option<MovingPlatform>,
    /// Whether a damage reaction suppresses control.
    pub damage_suppressed: bool,
}

impl<'a> TickContext<'a> {
    /// Context at the origin with the default camera basis.
    pub fn new(senses: &'a MotorSenses) -> Self {
        Self {
            senses,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            camera: CameraBasis::default(),
            pole: None,
            platform: None,
            damage_suppressed: false,
        }
    }

    /// Builder: set the character pose.
    pub fn with_pose(mut self, position: Vec3, rotation: Quat) -> Self {
        self.position = position;
        self.rotation = rotation;
        self
    }

    /// Builder: set the camera basis.
    pub fn with_camera(mut self, camera: CameraBasis) -> Self {
        self.camera = camera;
        self
    }

    /// Builder: set the attached pole geometry.
    pub fn with_pole(mut self, pole: PoleGeometry) -> Self {
        self.pole = Some(pole);
        self
    }

    /// Builder: set the ridden platform.
    pub fn with_platform(mut self, platform: MovingPlatform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Builder: set damage suppression.
    pub fn with_damage_suppressed(mut self, suppressed: bool) -> Self {
        self.damage_suppressed = suppressed;
        self
    }
}

/// Result of one act tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotorStep {
    /// Combined velocity of this tick.
    pub velocity: Vec3,
    /// Displacement to apply once this tick.
    pub displacement: Vec3,
    /// New facing, if it changed.
    pub rotation: Option<Quat>,
    /// Cues raised during the tick, in order.
    pub signals: Vec<MotorSignal>,
}

impl CharacterMotor {
    /// Create an idle, grounded motor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: use `camera` as the follow camera for input mapping.
    pub fn with_camera(mut self, camera: Entity) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Current movement speed.
    #[inline]
    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    /// Forward clearance from the last sensing snapshot.
    #[inline]
    pub fn distance_to_forward(&self) -> f32 {
        self.distance_to_forward
    }

    /// Push the character. Control is overridden until the push decays.
    ///
    /// Cancels a pending landing sound.
    pub fn apply_force(&mut self, direction: Vec3, amount: f32, config: &MotorConfig) {
        self.external_force = ExternalForce::new(direction, amount, config.terminal_velocity);
        self.landing_cue = None;
        debug!(
            "external force applied: {:?} x {:.2}",
            self.external_force.direction, self.external_force.amount
        );
    }

    /// Request a jump on the next tick regardless of ground contact, e.g.
    /// when bouncing off an enemy.
    pub fn trigger_jump(&mut self) {
        self.jump_triggered = true;
    }

    /// Stop background work while the session is paused.
    pub fn freeze(&mut self) {
        self.landing_cue = None;
        self.riding_platform = false;
    }

    /// Whether a landing sound is scheduled.
    pub fn landing_cue_pending(&self) -> bool {
        self.landing_cue.is_some()
    }

    /// Advance the motor by one tick.
    pub fn act(
        &mut self,
        input: &MotorInput,
        ctx: &TickContext,
        config: &MotorConfig,
        dt: f32,
    ) -> MotorStep {
        let mut step = MotorStep::default();
        let probes = ctx.senses.probes;
        let movement = input.effective_movement(config.dead_zone);
        let grounded = probes.is_grounded(config.ground_tolerance, self.riding_platform);
        self.distance_to_forward = probes.distance_to_forward;

        self.tick_landing_cue(dt, &mut step.signals);
        self.external_force
            .decay(config.gravity, config.terminal_velocity, dt);

        self.animation.turn_rate = movement.x;
        self.animation.hanging = false;
        self.animation.climbing = false;

        if self.external_force.is_active() || ctx.damage_suppressed {
            self.act_overridden(grounded, config, dt, &mut step);
        } else {
            if self.mode.is_force_overridden() {
                self.resume_control(grounded);
            }
            match self.reachable_pole(ctx, config) {
                Some((pole, geometry)) => {
                    self.act_on_pole(pole, geometry, input, movement, ctx, config, dt, &mut step);
                }
                None => {
                    if self.attached_pole.is_some() || self.mode.is_on_pole() {
                        self.detach_pole(grounded, &mut step.signals);
                    }
                    self.act_free(input, movement, grounded, ctx, config, dt, &mut step);
                }
            }
        }

        step.displacement = step.velocity * dt;
        if step.displacement.y < 0.0 && !self.mode.is_sliding() {
            step.displacement.y = step.displacement.y.max(-probes.distance_to_ground);
        }

        trace!(
            "motor tick: mode={} speed={:.2} vv={:.2} displacement={:?}",
            self.mode.name(),
            self.current_speed,
            self.vertical_velocity,
            step.displacement
        );
        step
    }

    fn act_overridden(&mut self, grounded: bool, config: &MotorConfig, dt: f32, step: &mut MotorStep) {
        if !self.mode.is_force_overridden() {
            debug!("control overridden from {}", self.mode.name());
            if self.mode.is_sliding() {
                step.signals.push(MotorSignal::SlideLoopStopped);
            }
            self.mode = LocomotionMode::ForceOverridden;
            self.landing_cue = None;
        }
        if !grounded {
            self.apply_gravity(config, dt);
        }
        self.horizontal_velocity = self.external_force.velocity().with_y(0.0);
        step.velocity = self.external_force.velocity();
    }

    fn resume_control(&mut self, grounded: bool) {
        self.mode = if grounded {
            self.vertical_velocity = RESTING_VERTICAL_VELOCITY;
            LocomotionMode::grounded()
        } else {
            LocomotionMode::Airborne(AirState::fall())
        };
        self.air_momentum = Vec3::ZERO;
        debug!("control restored, now {}", self.mode.name());
    }

    #[allow(clippy::too_many_arguments)]
    fn act_free(
        &mut self,
        input: &MotorInput,
        movement: Vec2,
        grounded: bool,
        ctx: &TickContext,
        config: &MotorConfig,
        dt: f32,
        step: &mut MotorStep,
    ) {
        let probes = ctx.senses.probes;
        self.resolve_contacts(&ctx.senses.contacts, grounded, config, &mut step.signals);
        self.settle_on_ground(grounded, &probes, ctx.rotation, config, &mut step.signals);

        self.previous_speed = self.current_speed;
        self.current_speed = integrate_speed(movement, self.current_speed, config, dt);
        let target = ctx.camera.target_direction(movement);

        if self.against_wall.is_some() && probes.distance_to_forward > config.wall_release_distance {
            trace!("wall lock released");
            self.against_wall = None;
        }

        let mut facing = ctx.rotation;
        // Without input the character stands still; the decaying speed only
        // feeds animation and the camera.
        let mut horizontal = match self.mode {
            LocomotionMode::Sliding(_) => Vec3::ZERO,
            _ if movement == Vec2::ZERO => Vec3::ZERO,
            LocomotionMode::Airborne(_) => {
                air_velocity(&mut self.air_momentum, target, self.current_speed, config)
            }
            _ => {
                if let Some(rotation) = look_rotation(target) {
                    facing = rotation;
                    step.rotation = Some(rotation);
                }
                forward_of(facing) * self.current_speed
            }
        };
        if let Some(wall) = self.against_wall {
            if horizontal.dot(wall) > 0.0 {
                horizontal = Vec3::ZERO;
            }
        }
        horizontal = horizontal.with_y(0.0).clamp_length_max(config.run_speed);

        if config.use_jump {
            self.process_jump(input, &probes, grounded, forward_of(facing), ctx.platform.as_ref(), config, dt, &mut step.signals);
        }

        if self.mode.is_grounded()
            && (self.current_speed - self.previous_speed).abs() >= config.run_speed * 0.5
        {
            step.signals.push(MotorSignal::DustBurst);
        }

        self.tick_slide(grounded, config, dt, &mut step.signals);

        if !grounded {
            self.apply_gravity(config, dt);
        }

        self.horizontal_velocity = horizontal;
        step.velocity = match self.mode {
            LocomotionMode::Sliding(slide) => slide.direction * slide.speed,
            _ => horizontal.with_y(self.vertical_velocity),
        };

        self.tick_footsteps(grounded, horizontal.length() * dt, config, &mut step.signals);
        if grounded && self.vertical_velocity <= 0.0 {
            self.animation.speed_fraction = self.current_speed / config.run_speed;
        }
    }

    /// Ledge handling for a grounded character.
    ///
    /// Small drops keep the character grounded; larger ones start a fall.
    fn settle_on_ground(
        &mut self,
        grounded: bool,
        probes: &ProbeResult,
        rotation: Quat,
        config: &MotorConfig,
        signals: &mut Vec<MotorSignal>,
    ) {
        if !self.mode.is_grounded() {
            return;
        }
        if grounded {
            self.vertical_velocity = RESTING_VERTICAL_VELOCITY;
        } else if probes.distance_to_ground > config.ledge_fall_distance && self.vertical_velocity <= 0.0 {
            debug!("walked off a ledge");
            self.mode = LocomotionMode::Airborne(AirState::fall());
            self.vertical_velocity = RESTING_VERTICAL_VELOCITY;
            self.air_momentum = forward_of(rotation) * self.current_speed;
            signals.push(MotorSignal::JumpLoop);
        }
    }

    pub(crate) fn apply_gravity(&mut self, config: &MotorConfig, dt: f32) {
        self.vertical_velocity =
            (self.vertical_velocity - config.gravity * dt).max(-config.terminal_velocity);
    }

    fn tick_footsteps(
        &mut self,
        grounded: bool,
        travelled: f32,
        config: &MotorConfig,
        signals: &mut Vec<MotorSignal>,
    ) {
        if !(grounded && self.mode.is_grounded()) {
            self.stride = 0.0;
            return;
        }
        self.stride += travelled;
        if self.stride >= config.footstep_stride {
            self.stride %= config.footstep_stride;
            signals.push(MotorSignal::Footstep);
        }
    }
}
