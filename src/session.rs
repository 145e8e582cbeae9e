//! Game session gating.
//!
//! The host game may insert a [`SessionState`] resource to pause the motor or
//! stop it at the end of a level. Without the resource the motor always runs.

use bevy::prelude::*;

/// Play state of the owning game session.
#[derive(Resource, Reflect, Debug, Clone, Copy, PartialEq, Eq)]
#[reflect(Resource)]
pub struct SessionState {
    /// False while paused or while a dialog is showing.
    pub is_playing: bool,
    /// True once the level has ended.
    pub is_level_end: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            is_playing: true,
            is_level_end: false,
        }
    }
}

/// What the motor should do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionGate {
    /// Advance normally.
    Run,
    /// Paused: freeze timers and cancel background work.
    Frozen,
    /// Level over: leave the motor untouched.
    Halted,
}

impl SessionState {
    /// Gate for the motor.
    pub fn gate(&self) -> SessionGate {
        if !self.is_playing {
            SessionGate::Frozen
        } else if self.is_level_end {
            SessionGate::Halted
        } else {
            SessionGate::Run
        }
    }

    /// Whether the camera may move, not just look at the character.
    pub fn camera_may_follow(&self) -> bool {
        self.is_playing && !self.is_level_end
    }
}

/// Gate for an optional session. A missing session means always playing.
pub fn session_gate(session: Option<&SessionState>) -> SessionGate {
    session.map_or(SessionGate::Run, SessionState::gate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_session_runs() {
        assert_eq!(session_gate(None), SessionGate::Run);
    }

    #[test]
    fn paused_session_freezes() {
        let session = SessionState {
            is_playing: false,
            is_level_end: true,
        };
        assert_eq!(session_gate(Some(&session)), SessionGate::Frozen);
        assert!(!session.camera_may_follow());
    }

    #[test]
    fn level_end_halts() {
        let session = SessionState {
            is_playing: true,
            is_level_end: true,
        };
        assert_eq!(session.gate(), SessionGate::Halted);
        assert!(!session.camera_may_follow());
    }

    #[test]
    fn default_session_plays() {
        assert_eq!(SessionState::default().gate(), SessionGate::Run);
        assert!(SessionState::default().camera_may_follow());
    }
}
