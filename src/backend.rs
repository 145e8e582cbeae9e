//! Physics backend abstraction.
//!
//! The motor never queries world geometry itself. A backend installs the
//! sensor systems that fill [`MotorSenses`](crate::detection::MotorSenses)
//! during [`CharacterMotorSet::Sensors`](crate::CharacterMotorSet::Sensors)
//! and decides how a computed displacement reaches the character. This keeps
//! the motor independent of the physics engine (Rapier3D, a custom
//! kinematic solver, or a scripted test harness).

use bevy::prelude::*;

/// Trait for physics backend implementations.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use msg_character_motor::backend::NoOpBackendPlugin;
/// use msg_character_motor::prelude::*;
///
/// /// Backend that moves characters by their `Transform` and senses nothing.
/// struct TransformOnly;
///
/// impl CharacterPhysicsBackend for TransformOnly {
///     fn plugin() -> impl Plugin {
///         NoOpBackendPlugin
///     }
/// }
///
/// App::new()
///     .add_plugins(MinimalPlugins)
///     .add_plugins(CharacterMotorPlugin::<TransformOnly>::default());
/// ```
pub trait CharacterPhysicsBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Apply one tick's displacement to a character.
    ///
    /// The default translates the character's `Transform`.
    fn move_character(world: &mut World, entity: Entity, displacement: Vec3) {
        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.translation += displacement;
        }
    }
}

/// Empty plugin for backends that don't need additional setup.
pub struct NoOpBackendPlugin;

impl Plugin for NoOpBackendPlugin {
    fn build(&self, _app: &mut App) {}
}
