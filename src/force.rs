//! External force override.
//!
//! Knockback and similar pushes are applied through [`ApplyForce`] events or
//! [`CharacterMotor::apply_force`](crate::motor::CharacterMotor::apply_force).
//! While a force is active it replaces all directional control.

use bevy::prelude::*;

/// A push applied to the character from outside.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Default)]
pub struct ExternalForce {
    /// Push vector. Its length scales the push along with `amount`.
    pub direction: Vec3,
    /// Remaining speed of the push.
    pub amount: f32,
}

impl ExternalForce {
    /// Create a force. The direction is kept as given and the amount is
    /// clamped into `[0, max_amount]`.
    pub fn new(direction: Vec3, amount: f32, max_amount: f32) -> Self {
        Self {
            direction,
            amount: amount.clamp(0.0, max_amount),
        }
    }

    /// Whether the force still overrides control.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.amount > 0.0
    }

    /// Velocity the force imposes this tick.
    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.direction * self.amount
    }

    /// Decay the amount linearly at `rate` per second, clamped into
    /// `[0, max_amount]`.
    pub fn decay(&mut self, rate: f32, max_amount: f32, dt: f32) {
        if self.amount > 0.0 {
            self.amount = (self.amount - rate * dt).clamp(0.0, max_amount);
        }
    }
}

/// Request to push a character, typically sent by a damage system.
#[derive(Event, Debug, Clone, Copy)]
pub struct ApplyForce {
    /// The character to push.
    pub character: Entity,
    /// Push direction. Used as given, so its length scales the push.
    pub direction: Vec3,
    /// Initial push speed.
    pub amount: f32,
}

impl ApplyForce {
    /// Create a force request.
    pub fn new(character: Entity, direction: Vec3, amount: f32) -> Self {
        Self {
            character,
            direction,
            amount,
        }
    }
}
