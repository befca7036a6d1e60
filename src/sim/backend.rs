//! Contract between the simulation and the host engine
//!
//! The engine owns collision geometry, animation and audio. The simulation only
//! asks it questions (probe hits, contacts, whether a death animation is over)
//! and notifies it of lifecycle changes. Notifications are fire-and-forget.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::entity::ColliderHandle;

/// Collision layer bits used to filter probes
pub mod layers {
    /// Things enemy melee can strike (the player and traps)
    pub const BODY: u32 = 1 << 1;
    /// Things the player's beam can strike (walkers and traps)
    pub const TARGET: u32 = 1 << 2;
}

/// What an actor looks like to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorKind {
    Player,
    Walker,
    Trap,
}

impl ActorKind {
    /// Layers a probe must include to strike this actor
    pub fn layers(self) -> u32 {
        match self {
            ActorKind::Player => layers::BODY,
            ActorKind::Walker => layers::TARGET,
            ActorKind::Trap => layers::BODY | layers::TARGET,
        }
    }
}

/// Transient query shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeShape {
    /// Infinite half-line; `dir` need not be normalized
    Ray { origin: Vec3, dir: Vec3 },
    /// Finite segment from `a` to `b`
    Segment { a: Vec3, b: Vec3 },
}

/// A hit test request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    pub shape: ProbeShape,
    /// Only colliders sharing a bit with this mask are reported.
    /// Static geometry is always reported.
    pub mask: u32,
}

impl Probe {
    pub fn ray(origin: Vec3, dir: Vec3, mask: u32) -> Self {
        Self {
            shape: ProbeShape::Ray { origin, dir },
            mask,
        }
    }

    pub fn segment(a: Vec3, b: Vec3, mask: u32) -> Self {
        Self {
            shape: ProbeShape::Segment { a, b },
            mask,
        }
    }

    pub fn origin(&self) -> Vec3 {
        match self.shape {
            ProbeShape::Ray { origin, .. } => origin,
            ProbeShape::Segment { a, .. } => a,
        }
    }
}

/// What a probe touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// An actor's collider
    Collider(ColliderHandle),
    /// Walls and other level geometry
    Static,
}

/// One entry of a probe result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeHit {
    pub target: HitTarget,
    /// Distance from the probe origin
    pub distance: f32,
    pub point: Vec3,
}

/// A collider started touching something this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub from: ColliderHandle,
    pub into: HitTarget,
}

/// Cosmetic feedback the simulation asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// A sliding trap came to rest
    TrapStop,
    /// A sliding trap struck an actor
    TrapImpact,
    /// A walker started its attack windup
    AttackWindup,
    /// The player took damage
    PlayerHurt,
}

/// Services the host engine provides to the simulation
pub trait Backend {
    /// Create the visual and collider for a new actor
    fn spawn_presentation(&mut self, handle: ColliderHandle, kind: ActorKind, pos: Vec3);

    /// Destroy everything the engine holds for `handle`
    fn release_presentation(&mut self, handle: ColliderHandle);

    /// Start the death animation. The collider stops taking part in hit tests.
    fn begin_death_presentation(&mut self, handle: ColliderHandle);

    /// Whether the spawn animation has finished
    fn is_spawn_presentation_complete(&self, _handle: ColliderHandle) -> bool {
        true
    }

    /// Whether the death animation has finished
    fn is_death_presentation_complete(&self, handle: ColliderHandle) -> bool;

    /// All hits along a probe, in no particular order
    fn query_collisions(&mut self, probe: &Probe) -> Vec<ProbeHit>;

    /// Correct a desired position against level geometry
    fn resolve_position(&mut self, _handle: ColliderHandle, desired: Vec3) -> Vec3 {
        desired
    }

    /// Contacts that began since the last call
    fn drain_contacts(&mut self) -> Vec<Contact> {
        Vec::new()
    }

    fn effect(&mut self, _handle: ColliderHandle, _effect: Effect) {}
}
