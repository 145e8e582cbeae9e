//! Locomotion state.
//!
//! [`LocomotionMode`] is the motor's single source of truth for what the
//! character is doing. Mode-specific data lives in the variant payloads, so a
//! value that only makes sense in one mode (the double-jump window, the slide
//! speed) cannot outlive that mode.
//!
//! The [`Grounded`] and [`Airborne`] markers mirror the mode for queries and
//! are kept in sync by the motor systems.

use bevy::prelude::*;

/// Visual and logical phase of a jump or fall.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JumpPhase {
    /// Rising from the jump.
    #[default]
    Start,
    /// Falling, waiting to get close to the ground.
    Loop,
    /// About to touch down; the landing animation is playing.
    End,
}

/// Payload of [`LocomotionMode::Airborne`].
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Default)]
pub struct AirState {
    /// Current jump phase.
    pub phase: JumpPhase,
    /// Whether this flight began with a jump (as opposed to walking off a ledge).
    pub jumped: bool,
    /// Whether this flight began with a double jump.
    pub double_jump: bool,
}

impl AirState {
    /// Flight started by a normal jump.
    pub fn jump() -> Self {
        Self {
            phase: JumpPhase::Start,
            jumped: true,
            double_jump: false,
        }
    }

    /// Flight started by a double jump.
    pub fn double_jump() -> Self {
        Self {
            phase: JumpPhase::Start,
            jumped: true,
            double_jump: true,
        }
    }

    /// Fall without a jump, e.g. off a ledge or a slide.
    pub fn fall() -> Self {
        Self {
            phase: JumpPhase::Loop,
            jumped: false,
            double_jump: false,
        }
    }
}

/// Payload of [`LocomotionMode::Sliding`].
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Default)]
pub struct SlideState {
    /// Current slide speed, never above terminal velocity.
    pub speed: f32,
    /// Downhill direction along the surface. Unit length or zero.
    pub direction: Vec3,
    /// Slope of the surface being slid on, in degrees.
    pub slope: f32,
}

/// The character's primary locomotion mode. Exactly one is active.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub enum LocomotionMode {
    /// Standing or running on walkable ground.
    Grounded {
        /// Seconds left in which a double jump is allowed.
        double_jump_window: f32,
    },
    /// Jumping or falling.
    Airborne(AirState),
    /// Sliding down a steep slope.
    Sliding(SlideState),
    /// Attached to a climbable pole.
    OnPole {
        /// The pole entity.
        pole: Entity,
    },
    /// Control is suppressed by an external force or by damage.
    ForceOverridden,
}

impl Default for LocomotionMode {
    fn default() -> Self {
        Self::Grounded {
            double_jump_window: 0.0,
        }
    }
}

impl LocomotionMode {
    /// Grounded with a closed double-jump window.
    pub fn grounded() -> Self {
        Self::default()
    }

    /// Whether the mode is [`LocomotionMode::Grounded`].
    pub fn is_grounded(&self) -> bool {
        matches!(self, Self::Grounded { .. })
    }

    /// Whether the mode is [`LocomotionMode::Airborne`].
    pub fn is_airborne(&self) -> bool {
        matches!(self, Self::Airborne(_))
    }

    /// Whether the mode is [`LocomotionMode::Sliding`].
    pub fn is_sliding(&self) -> bool {
        matches!(self, Self::Sliding(_))
    }

    /// Whether the mode is [`LocomotionMode::OnPole`].
    pub fn is_on_pole(&self) -> bool {
        matches!(self, Self::OnPole { .. })
    }

    /// Whether the mode is [`LocomotionMode::ForceOverridden`].
    pub fn is_force_overridden(&self) -> bool {
        matches!(self, Self::ForceOverridden)
    }

    /// Remaining double-jump window. Zero outside [`LocomotionMode::Grounded`].
    pub fn double_jump_window(&self) -> f32 {
        match self {
            Self::Grounded { double_jump_window } => *double_jump_window,
            _ => 0.0,
        }
    }

    /// Air payload, if airborne.
    pub fn air(&self) -> Option<&AirState> {
        match self {
            Self::Airborne(air) => Some(air),
            _ => None,
        }
    }

    /// Slide payload, if sliding.
    pub fn slide(&self) -> Option<&SlideState> {
        match self {
            Self::Sliding(slide) => Some(slide),
            _ => None,
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Grounded { .. } => "grounded",
            Self::Airborne(_) => "airborne",
            Self::Sliding(_) => "sliding",
            Self::OnPole { .. } => "on_pole",
            Self::ForceOverridden => "force_overridden",
        }
    }
}

/// Animation phase reported by a health system while damage plays out.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DamagePhase {
    /// Any phase that does not restrict control.
    #[default]
    Other,
    /// The hit reaction.
    TakeDamage,
    /// Getting back up after a hit.
    StandUp,
}

/// Damage state written by an external health system.
///
/// Control is suppressed while `taking_damage` is set and the phase is
/// [`DamagePhase::TakeDamage`] or [`DamagePhase::StandUp`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct DamageState {
    /// Whether the character is currently taking damage.
    pub taking_damage: bool,
    /// Current damage animation phase.
    pub phase: DamagePhase,
}

impl DamageState {
    /// Damage state in the given phase.
    pub fn taking(phase: DamagePhase) -> Self {
        Self {
            taking_damage: true,
            phase,
        }
    }

    /// Whether movement control is suppressed.
    pub fn suppresses_control(&self) -> bool {
        self.taking_damage && matches!(self.phase, DamagePhase::TakeDamage | DamagePhase::StandUp)
    }
}

/// Marker component indicating the character is grounded.
///
/// Present while the mode is [`LocomotionMode::Grounded`] or
/// [`LocomotionMode::Sliding`].
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use msg_character_motor::prelude::*;
///
/// // Grounded is a marker component - just use it in queries
/// fn check_grounded(grounded: Option<&Grounded>) -> bool {
///     grounded.is_some()
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the character is airborne.
///
/// Mutually exclusive with [`Grounded`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;
