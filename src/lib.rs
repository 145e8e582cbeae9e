//! # `msg_character_motor`
//!
//! A 3D platformer character motor and follow camera with physics backend
//! abstraction.
//!
//! This crate provides a kinematic character motor that:
//! - Runs relative to a follow camera with a momentum-preserving air control
//! - Jumps with variable height, a double jump window and a ceiling cutoff
//! - Slides down steep slopes and stops at walls
//! - Rides moving platforms and climbs poles
//! - Yields control to external pushes (knockback) until they decay
//! - Abstracts the physics backend for easy swapping (Rapier3D included)
//!
//! ## Architecture
//!
//! Each frame is split into two phases:
//! 1. **Sense** (`FixedUpdate`): the backend casts the character's capsule
//!    down, up and forward and records surface contacts into
//!    [`MotorSenses`](detection::MotorSenses)
//! 2. **Act** (`Update`): [`CharacterMotor::act`](motor::CharacterMotor::act)
//!    turns input and that snapshot into one displacement, which the backend
//!    applies once. Platform drift and the follow camera run afterwards.
//!
//! The motor is a single tagged [`LocomotionMode`](state::LocomotionMode):
//! grounded, airborne, sliding, on a pole or force-overridden.
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use msg_character_motor::prelude::*;
//!
//! // Create motor components for a player character
//! let motor = CharacterMotor::new();
//! let config = MotorConfig::player();
//! let input = MotorInput::default();
//!
//! // These can be spawned with a physics bundle and a Transform
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod camera;
pub mod collision;
pub mod config;
pub mod detection;
pub mod error;
pub mod force;
pub mod intent;
pub mod jump;
pub mod motor;
pub mod movement;
pub mod platform;
pub mod pole;
pub mod session;
pub mod signals;
pub mod slide;
pub mod state;
pub mod systems;

#[cfg(feature = "rapier3d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::CharacterPhysicsBackend;
    pub use crate::camera::{CameraRig, FollowTarget};
    pub use crate::collision::{CollisionContact, SurfaceContact, SurfaceTag, TriggerVolumeEvent};
    pub use crate::config::{CameraConfig, MotorConfig};
    pub use crate::detection::{MotorSenses, ProbeResult};
    pub use crate::error::ConfigError;
    pub use crate::force::{ApplyForce, ExternalForce};
    pub use crate::intent::{CameraInput, MotorInput};
    pub use crate::motor::{CharacterMotor, MotorStep, TickContext};
    pub use crate::movement::CameraBasis;
    pub use crate::platform::MovingPlatform;
    pub use crate::pole::{Pole, PoleGeometry};
    pub use crate::session::SessionState;
    pub use crate::signals::{MotorAnimation, MotorSignal, MotorSignalEvent};
    pub use crate::state::{
        AirState, Airborne, DamagePhase, DamageState, Grounded, JumpPhase, LocomotionMode,
    };
    pub use crate::{CharacterMotorPlugin, CharacterMotorSet};

    #[cfg(feature = "rapier3d")]
    pub use crate::rapier::{Rapier3dBackend, Rapier3dCharacterBundle, Rapier3dTriggerBundle};
}

/// System sets for the motor, in execution order within their schedule.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterMotorSet {
    /// `FixedUpdate`: backend probes write [`MotorSenses`](detection::MotorSenses).
    Sensors,
    /// `FixedUpdate`: surface contact events are added to the snapshot.
    Contacts,
    /// `Update`: trigger volumes and force requests.
    Triggers,
    /// `Update`: the act tick and platform drift.
    Act,
    /// `Update`: follow cameras.
    Camera,
}

/// Main plugin for the character motor.
///
/// This plugin is generic over a physics backend `B` which provides the
/// sensing systems and applies displacement.
///
/// # Type Parameters
/// - `B`: The physics backend implementation (e.g., `Rapier3dBackend`)
///
/// # Examples
///
/// With Rapier3D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use msg_character_motor::prelude::*;
///
/// App::new()
///     .add_plugins(MinimalPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
///     .add_plugins(CharacterMotorPlugin::<Rapier3dBackend>::default())
///     .run();
/// ```
pub struct CharacterMotorPlugin<B: backend::CharacterPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::CharacterPhysicsBackend> Default for CharacterMotorPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::CharacterPhysicsBackend> Plugin for CharacterMotorPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<motor::CharacterMotor>();
        app.register_type::<config::MotorConfig>();
        app.register_type::<config::CameraConfig>();
        app.register_type::<intent::MotorInput>();
        app.register_type::<intent::CameraInput>();
        app.register_type::<detection::MotorSenses>();
        app.register_type::<collision::SurfaceTag>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<state::DamageState>();
        app.register_type::<platform::MovingPlatform>();
        app.register_type::<pole::Pole>();
        app.register_type::<camera::CameraRig>();
        app.register_type::<session::SessionState>();

        app.add_event::<collision::SurfaceContact>();
        app.add_event::<collision::TriggerVolumeEvent>();
        app.add_event::<force::ApplyForce>();
        app.add_event::<signals::MotorSignalEvent>();

        app.configure_sets(
            FixedUpdate,
            (CharacterMotorSet::Sensors, CharacterMotorSet::Contacts).chain(),
        );
        app.configure_sets(
            Update,
            (
                CharacterMotorSet::Triggers,
                CharacterMotorSet::Act,
                CharacterMotorSet::Camera,
            )
                .chain(),
        );

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        // Sense phase
        app.add_systems(
            FixedUpdate,
            systems::record_surface_contacts.in_set(CharacterMotorSet::Contacts),
        );

        // Act phase
        app.add_systems(
            Update,
            (
                systems::validate_motor_configs,
                systems::validate_camera_configs,
                systems::handle_trigger_volumes,
                systems::handle_force_requests,
            )
                .chain()
                .in_set(CharacterMotorSet::Triggers),
        );
        app.add_systems(
            Update,
            (
                systems::drive_motors::<B>,
                systems::ride_platforms::<B>,
                systems::sync_state_markers,
            )
                .chain()
                .in_set(CharacterMotorSet::Act),
        );
        app.add_systems(
            Update,
            systems::follow_cameras.in_set(CharacterMotorSet::Camera),
        );
    }
}
