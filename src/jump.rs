//! Jump and fall state machine.
//!
//! A flight runs `Start -> Loop -> End` and finishes with a landing. Landing
//! from a normal jump opens a short window in which a second, stronger jump is
//! allowed; landing from that double jump closes it again.

use bevy::log::debug;
use bevy::prelude::*;

use crate::config::MotorConfig;
use crate::detection::ProbeResult;
use crate::intent::MotorInput;
use crate::motor::{CharacterMotor, RESTING_VERTICAL_VELOCITY};
use crate::platform::MovingPlatform;
use crate::signals::MotorSignal;
use crate::state::{AirState, JumpPhase, LocomotionMode};

impl CharacterMotor {
    /// One tick of the jump state machine.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn process_jump(
        &mut self,
        input: &MotorInput,
        probes: &ProbeResult,
        grounded: bool,
        facing: Vec3,
        platform: Option<&MovingPlatform>,
        config: &MotorConfig,
        dt: f32,
        signals: &mut Vec<MotorSignal>,
    ) {
        if config.use_variable_height_jump && !input.jump_pressed {
            self.cut_jump(config);
        }

        if let LocomotionMode::Airborne(air) = self.mode {
            if self.vertical_velocity > 0.0 {
                if probes.touching_ceiling() {
                    debug!("hit the ceiling");
                    self.enter_fall_loop(signals);
                }
            } else if self.vertical_velocity < 0.0 {
                if air.phase == JumpPhase::Start {
                    self.enter_fall_loop(signals);
                }
                let near_ground = probes.time_to_ground(self.vertical_velocity)
                    <= config.fall_animation_duration;
                if near_ground || grounded {
                    self.end_fall(config, signals);
                }
            }

            if grounded && self.vertical_velocity <= 0.0 {
                self.land(config, signals);
            }
        }

        if let LocomotionMode::Grounded { double_jump_window } = &mut self.mode {
            *double_jump_window = (*double_jump_window - dt).max(0.0);
        }

        let jump_pressed = grounded && input.jump_just_pressed();
        let window_open = self.mode.double_jump_window() > 0.0;
        if config.use_double_jump && jump_pressed && window_open {
            self.start_double_jump(facing, platform, config, signals);
        } else if jump_pressed || self.jump_triggered {
            self.start_jump(facing, platform, config, signals);
        }
        self.jump_triggered = false;
    }

    /// Cut a rising jump down to the short-jump speed once it has lost a
    /// quarter of its launch speed.
    fn cut_jump(&mut self, config: &MotorConfig) {
        let jumped = self.mode.air().is_some_and(|air| air.jumped);
        if jumped
            && self.vertical_velocity > config.short_jump_speed
            && self.vertical_velocity <= config.jump_cut_speed()
        {
            self.vertical_velocity = config.short_jump_speed;
        }
    }

    /// Launch a normal jump.
    pub(crate) fn start_jump(
        &mut self,
        facing: Vec3,
        platform: Option<&MovingPlatform>,
        config: &MotorConfig,
        signals: &mut Vec<MotorSignal>,
    ) {
        debug!("jump");
        self.vertical_velocity = config.jump_speed;
        self.launch(AirState::jump(), facing, platform, signals);
    }

    /// Launch a double jump and close the window.
    fn start_double_jump(
        &mut self,
        facing: Vec3,
        platform: Option<&MovingPlatform>,
        config: &MotorConfig,
        signals: &mut Vec<MotorSignal>,
    ) {
        debug!("double jump");
        self.vertical_velocity = config.double_jump_speed;
        self.launch(AirState::double_jump(), facing, platform, signals);
    }

    fn launch(
        &mut self,
        air: AirState,
        facing: Vec3,
        platform: Option<&MovingPlatform>,
        signals: &mut Vec<MotorSignal>,
    ) {
        if self.mode.is_sliding() {
            signals.push(MotorSignal::SlideLoopStopped);
        }
        self.mode = LocomotionMode::Airborne(air);
        self.air_momentum = facing * self.current_speed;
        self.stride = 0.0;

        if self.riding_platform {
            if let Some(platform) = platform {
                self.vertical_velocity += platform.vertical_boost();
            }
        }

        signals.push(MotorSignal::JumpStart);
        signals.push(MotorSignal::JumpSound);
    }

    /// Switch to the falling loop, as if the apex had been reached.
    fn enter_fall_loop(&mut self, signals: &mut Vec<MotorSignal>) {
        if let LocomotionMode::Airborne(air) = &mut self.mode {
            air.phase = JumpPhase::Loop;
            self.vertical_velocity = RESTING_VERTICAL_VELOCITY;
            signals.push(MotorSignal::JumpLoop);
        }
    }

    /// Start the landing animation and schedule the landing sound.
    fn end_fall(&mut self, config: &MotorConfig, signals: &mut Vec<MotorSignal>) {
        if let LocomotionMode::Airborne(air) = &mut self.mode {
            if air.phase != JumpPhase::End {
                air.phase = JumpPhase::End;
                self.landing_cue = Some(config.landing_cue_delay);
                signals.push(MotorSignal::JumpEnd);
            }
        }
    }

    fn land(&mut self, config: &MotorConfig, signals: &mut Vec<MotorSignal>) {
        self.end_fall(config, signals);
        let Some(air) = self.mode.air().copied() else {
            return;
        };
        let double_jump_window = if config.use_double_jump && air.jumped && !air.double_jump {
            config.double_jump_window
        } else {
            0.0
        };
        debug!("landed, double jump window {double_jump_window:.2}s");
        self.mode = LocomotionMode::Grounded { double_jump_window };
        self.vertical_velocity = RESTING_VERTICAL_VELOCITY;
        self.air_momentum = Vec3::ZERO;
        signals.push(MotorSignal::Landed);
    }

    /// Count down the delayed landing sound.
    pub(crate) fn tick_landing_cue(&mut self, dt: f32, signals: &mut Vec<MotorSignal>) {
        let Some(remaining) = self.landing_cue.as_mut() else {
            return;
        };
        *remaining -= dt;
        if *remaining <= 0.0 {
            self.landing_cue = None;
            signals.push(MotorSignal::LandingSound);
        }
    }
}
