//! Shared movable, damageable actor state

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Identity of a simulated actor, unique within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Opaque handle the backend uses for an actor's collider and presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColliderHandle(pub u32);

/// Physical and health state common to every actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub collider: ColliderHandle,
    pub pos: Vec3,
    pub vel: Vec3,
    pub max_speed: f32,
    pub acceleration: f32,
    /// Drops below zero on death; never clamped from below
    pub health: f32,
    pub max_health: f32,
    /// Set by the controller when it is pushing the actor this frame.
    /// Friction only applies while this is false.
    pub walking: bool,
}

impl Entity {
    pub fn new(
        id: EntityId,
        collider: ColliderHandle,
        pos: Vec3,
        max_health: f32,
        max_speed: f32,
        acceleration: f32,
    ) -> Self {
        Self {
            id,
            collider,
            pos,
            vel: Vec3::ZERO,
            max_speed,
            acceleration,
            health: max_health,
            max_health,
            walking: false,
        }
    }

    /// Advance one frame: speed cap, friction, then position.
    pub fn integrate(&mut self, dt: f32, friction: f32) {
        let mut speed = self.vel.length();
        if speed > self.max_speed {
            self.vel = self.vel / speed * self.max_speed;
            speed = self.max_speed;
        }

        if !self.walking {
            let slowdown = friction * dt;
            if slowdown >= speed {
                self.vel = Vec3::ZERO;
            } else {
                self.vel -= self.vel / speed * slowdown;
            }
        }

        self.pos += self.vel * dt;
    }

    /// Apply a health delta, capped at `max_health`.
    pub fn alter_health(&mut self, delta: f32) {
        self.health = (self.health + delta).min(self.max_health);
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}
