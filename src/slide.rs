//! Slope sliding and wall contacts.

use bevy::log::debug;
use bevy::prelude::*;

use crate::collision::CollisionContact;
use crate::config::MotorConfig;
use crate::motor::{CharacterMotor, RESTING_VERTICAL_VELOCITY};
use crate::signals::MotorSignal;
use crate::state::{AirState, LocomotionMode, SlideState};

/// Slopes steeper than this face downwards and are ignored.
const OVERHANG_SLOPE: f32 = 100.0;

/// How the motor reacts to a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceClass {
    /// Standable ground.
    Walkable,
    /// Too steep to stand on: slide down it.
    Slide,
    /// Too steep to slide on: block movement into it.
    Wall,
    /// A ceiling or overhang.
    Overhead,
}

/// Classify a contact by slope and tag.
///
/// Enemies are never slid on. Slopes up to and including `wall_slope` slide,
/// steeper ones are walls.
pub fn classify(contact: &CollisionContact, config: &MotorConfig) -> SurfaceClass {
    let slope = contact.slope_degrees();
    if slope > OVERHANG_SLOPE {
        SurfaceClass::Overhead
    } else if slope > config.max_walkable_slope && slope <= config.wall_slope && !contact.is_enemy() {
        SurfaceClass::Slide
    } else if slope >= config.wall_slope {
        SurfaceClass::Wall
    } else {
        SurfaceClass::Walkable
    }
}

/// Downhill direction along a surface with the given normal.
///
/// The component of "down" orthogonal to `normal`, normalized. Zero when the
/// surface is flat.
pub fn slide_direction(normal: Vec3) -> Vec3 {
    (Vec3::NEG_Y - Vec3::NEG_Y.dot(normal) * normal).normalize_or_zero()
}

impl CharacterMotor {
    /// React to the contacts sensed since the last tick.
    ///
    /// Contacts are applied in arrival order, so the last one wins.
    pub(crate) fn resolve_contacts(
        &mut self,
        contacts: &[CollisionContact],
        grounded: bool,
        config: &MotorConfig,
        signals: &mut Vec<MotorSignal>,
    ) {
        for contact in contacts {
            match classify(contact, config) {
                SurfaceClass::Slide => {
                    if config.use_slide
                        && grounded
                        && matches!(self.mode, LocomotionMode::Grounded { .. } | LocomotionMode::Sliding(_))
                    {
                        self.slide_on(contact, signals);
                    }
                }
                SurfaceClass::Wall => {
                    self.against_wall = Some(contact.into_surface());
                    self.stop_sliding(signals);
                }
                SurfaceClass::Walkable => {
                    self.against_wall = None;
                    self.stop_sliding(signals);
                }
                SurfaceClass::Overhead => {}
            }
        }
    }

    fn slide_on(&mut self, contact: &CollisionContact, signals: &mut Vec<MotorSignal>) {
        let direction = slide_direction(contact.normal);
        let slope = contact.slope_degrees();
        match &mut self.mode {
            LocomotionMode::Sliding(slide) => {
                slide.direction = direction;
                slide.slope = slope;
            }
            _ => {
                debug!("slide started on {slope:.1} degree slope");
                self.mode = LocomotionMode::Sliding(SlideState {
                    speed: 0.0,
                    direction,
                    slope,
                });
                self.against_wall = None;
                self.vertical_velocity = RESTING_VERTICAL_VELOCITY;
                signals.push(MotorSignal::SlideLoopStarted);
            }
        }
    }

    /// Leave the slide for the ground, if sliding.
    pub(crate) fn stop_sliding(&mut self, signals: &mut Vec<MotorSignal>) {
        if self.mode.is_sliding() {
            debug!("slide ended");
            self.mode = LocomotionMode::grounded();
            signals.push(MotorSignal::SlideLoopStopped);
        }
    }

    /// Advance an active slide by one tick.
    ///
    /// Losing the ground turns the slide into a fall.
    pub(crate) fn tick_slide(
        &mut self,
        grounded: bool,
        config: &MotorConfig,
        dt: f32,
        signals: &mut Vec<MotorSignal>,
    ) {
        let LocomotionMode::Sliding(slide) = &mut self.mode else {
            return;
        };
        if !grounded {
            let carried = (slide.direction * slide.speed).with_y(0.0);
            debug!("slid off the ground");
            self.mode = LocomotionMode::Airborne(AirState::fall());
            self.air_momentum = carried.clamp_length_max(config.run_speed);
            signals.push(MotorSignal::SlideLoopStopped);
            signals.push(MotorSignal::JumpLoop);
            return;
        }
        slide.speed = (slide.speed + slide.slope / config.gravity / config.slide_friction * dt)
            .min(config.terminal_velocity);
    }
}
