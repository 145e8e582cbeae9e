//! Pole climbing.
//!
//! While attached, the character is held at a fixed standoff from the pole
//! axis and between the pole's base and a point below its cap. Horizontal
//! input orbits the pole, vertical input climbs, and jumping lets go.

use bevy::log::debug;
use bevy::prelude::*;

use crate::config::MotorConfig;
use crate::intent::MotorInput;
use crate::motor::{CharacterMotor, MotorStep, TickContext, RESTING_VERTICAL_VELOCITY};
use crate::movement::{forward_of, look_rotation};
use crate::signals::MotorSignal;
use crate::state::{AirState, LocomotionMode};

/// Largest rotation around a pole in one tick, in degrees.
const MAX_POLE_STEP_DEGREES: f32 = 179.0;

/// A climbable pole. Its center is the entity's translation plus `offset`.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct Pole {
    /// Pole radius.
    pub radius: f32,
    /// Pole height.
    pub height: f32,
    /// Center of the pole relative to the entity.
    pub offset: Vec3,
}

impl Default for Pole {
    fn default() -> Self {
        Self {
            radius: 0.1,
            height: 6.0,
            offset: Vec3::ZERO,
        }
    }
}

impl Pole {
    /// Create a pole centered on its entity.
    pub fn new(radius: f32, height: f32) -> Self {
        Self {
            radius,
            height,
            offset: Vec3::ZERO,
        }
    }

    /// World-space geometry for a pole entity at `translation`.
    pub fn geometry(&self, translation: Vec3) -> PoleGeometry {
        PoleGeometry {
            center: translation + self.offset,
            radius: self.radius,
            height: self.height,
        }
    }
}

/// World-space shape of a pole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoleGeometry {
    /// Center point.
    pub center: Vec3,
    /// Radius.
    pub radius: f32,
    /// Height.
    pub height: f32,
}

impl PoleGeometry {
    /// Height of the pole's base.
    #[inline]
    pub fn base(&self) -> f32 {
        self.center.y - self.height * 0.5
    }

    /// Height of the pole's top.
    #[inline]
    pub fn top(&self) -> f32 {
        self.center.y + self.height * 0.5
    }

    /// Point on the axis at the given height.
    #[inline]
    pub fn axis_at(&self, y: f32) -> Vec3 {
        Vec3::new(self.center.x, y, self.center.z)
    }

    /// Whether a character of `body_height` centered at `position` overlaps
    /// the pole's vertical extent.
    pub fn spans(&self, position: Vec3, body_height: f32) -> bool {
        let half = body_height * 0.5;
        position.y - half <= self.top() && position.y + half >= self.base()
    }
}

impl CharacterMotor {
    /// Grab a pole. Takes effect on the next act tick.
    pub fn attach_pole(&mut self, pole: Entity) {
        self.attached_pole = Some(pole);
    }

    /// The attached pole, if it still exists and the character is within
    /// its vertical extent.
    pub(crate) fn reachable_pole(
        &self,
        ctx: &TickContext,
        config: &MotorConfig,
    ) -> Option<(Entity, PoleGeometry)> {
        let pole = self.attached_pole?;
        let geometry = ctx.pole?;
        geometry
            .spans(ctx.position, config.capsule_height)
            .then_some((pole, geometry))
    }

    /// Let go of the pole without jumping.
    pub(crate) fn detach_pole(&mut self, grounded: bool, signals: &mut Vec<MotorSignal>) {
        self.attached_pole = None;
        if self.mode.is_on_pole() {
            debug!("left the pole");
            self.vertical_velocity = RESTING_VERTICAL_VELOCITY;
            self.mode = if grounded {
                LocomotionMode::grounded()
            } else {
                LocomotionMode::Airborne(AirState::fall())
            };
            signals.push(MotorSignal::PoleDetached);
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn act_on_pole(
        &mut self,
        pole: Entity,
        geometry: PoleGeometry,
        input: &MotorInput,
        movement: Vec2,
        ctx: &TickContext,
        config: &MotorConfig,
        dt: f32,
        step: &mut MotorStep,
    ) {
        if self.mode != (LocomotionMode::OnPole { pole }) {
            debug!("grabbed pole {pole:?}");
            if self.mode.is_sliding() {
                step.signals.push(MotorSignal::SlideLoopStopped);
            }
            self.mode = LocomotionMode::OnPole { pole };
            self.vertical_velocity = RESTING_VERTICAL_VELOCITY;
            self.against_wall = None;
            self.air_momentum = Vec3::ZERO;
            step.signals.push(MotorSignal::PoleAttached);
        }

        let position = ctx.position;
        let half_height = config.capsule_height * 0.5;
        let axis = geometry.axis_at(position.y);
        let offset = position - axis;
        let mut velocity = Vec3::ZERO;

        // Hold the standoff distance.
        let standoff = config.capsule_radius + geometry.radius;
        let error = standoff - offset.length();
        if error.abs() > config.pole_standoff_tolerance {
            let outward = offset.normalize_or(-forward_of(ctx.rotation));
            velocity += outward * error;
        }

        // Stay between the base and the cap.
        let top_limit = geometry.top() - config.pole_cap_clearance;
        let feet = position.y - half_height;
        let at_top = position.y >= top_limit;
        let at_bottom = !at_top && feet <= geometry.base();
        if at_top {
            velocity.y -= position.y - top_limit;
        } else if at_bottom {
            velocity.y += geometry.base() - feet;
        }

        if movement.x != 0.0 && dt > 0.0 {
            let degrees = (-movement.x * config.pole_rotation_speed * dt)
                .clamp(-MAX_POLE_STEP_DEGREES, MAX_POLE_STEP_DEGREES);
            let rotated = axis + Quat::from_rotation_y(degrees.to_radians()) * offset;
            velocity += (rotated - position) / dt;
        }

        let mut climb = movement.y;
        if climb != 0.0 {
            if at_top {
                climb = climb.min(0.0);
            } else if at_bottom {
                if climb < 0.0 {
                    self.jump_off_pole(ctx, config, step);
                    return;
                }
                climb = climb.max(0.0);
            }
            velocity.y += climb * config.pole_climb_speed();
        }

        if input.jump_just_pressed() {
            self.jump_off_pole(ctx, config, step);
            return;
        }

        self.horizontal_velocity = velocity.with_y(0.0);
        step.velocity = velocity;
        step.rotation = look_rotation(axis - position);
        self.animation.hanging = true;
        self.animation.climbing = movement != Vec2::ZERO;
    }

    fn jump_off_pole(&mut self, ctx: &TickContext, config: &MotorConfig, step: &mut MotorStep) {
        debug!("jumped off the pole");
        self.attached_pole = None;
        step.signals.push(MotorSignal::PoleDetached);
        self.start_jump(forward_of(ctx.rotation), ctx.platform.as_ref(), config, &mut step.signals);
        step.velocity = self.air_momentum.with_y(self.vertical_velocity);
    }
}
