//! Animation, audio and effect cues.
//!
//! The motor decides when feedback should fire but does not own playback.
//! Discrete cues are sent as [`MotorSignalEvent`]s; continuous animation
//! parameters are kept on the motor as [`MotorAnimation`].

use bevy::prelude::*;

/// A fire-and-forget cue raised by the motor.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorSignal {
    /// A jump started.
    JumpStart,
    /// The falling loop started.
    JumpLoop,
    /// The landing animation started.
    JumpEnd,
    /// The character touched down.
    Landed,
    /// Play the jump sound.
    JumpSound,
    /// Play the landing sound.
    LandingSound,
    /// Start the looping slide sound.
    SlideLoopStarted,
    /// Stop the looping slide sound.
    SlideLoopStopped,
    /// Spawn a dust cloud after a sudden speed change.
    DustBurst,
    /// Play a footstep.
    Footstep,
    /// The character grabbed a pole.
    PoleAttached,
    /// The character let go of a pole.
    PoleDetached,
}

/// Event carrying a [`MotorSignal`] for a character.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorSignalEvent {
    /// The character that raised the signal.
    pub character: Entity,
    /// The signal.
    pub signal: MotorSignal,
}

/// Continuous animation parameters, refreshed every act tick.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Default)]
pub struct MotorAnimation {
    /// Running speed as a fraction of run speed, in `[0, 1]`.
    pub speed_fraction: f32,
    /// Horizontal input, used as the turn rate.
    pub turn_rate: f32,
    /// Hanging on a pole.
    pub hanging: bool,
    /// Moving along a pole.
    pub climbing: bool,
}
