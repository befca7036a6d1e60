//! Player and enemy actors
//!
//! Every actor wraps an [`Entity`]. Enemies carry a policy variant with the
//! state their controller needs; behaviour lives in `ai`.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::backend::ActorKind;
use super::entity::{ColliderHandle, Entity, EntityId};
use crate::tuning::Tuning;

/// Capabilities every simulated actor exposes
pub trait Actor {
    fn entity(&self) -> &Entity;
    fn entity_mut(&mut self) -> &mut Entity;
    fn kind(&self) -> ActorKind;

    fn integrate(&mut self, dt: f32, friction: f32) {
        self.entity_mut().integrate(dt, friction);
    }

    /// Health change from combat
    fn on_damage(&mut self, delta: f32) {
        self.entity_mut().alter_health(delta);
    }

    /// Immune actors absorb hits without changing health
    fn is_immune(&self) -> bool {
        false
    }
}

/// Where an actor lives inside the game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityRef {
    Player,
    Enemy(EntityId),
    Trap(EntityId),
}

/// Result of the player's beam this frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    /// Where the beam stopped
    pub end: Vec3,
    /// Whether it damaged something
    pub scored: bool,
}

/// The player's avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub entity: Entity,
    pub score: u64,
    /// Facing in degrees, derived from the aim point
    pub heading: f32,
    /// Last known aim point on the ground plane
    pub aim: Vec2,
    /// Set while the beam is firing
    pub beam: Option<Beam>,
}

impl Player {
    pub fn new(id: EntityId, collider: ColliderHandle, tuning: &Tuning) -> Self {
        let t = &tuning.player;
        Self {
            entity: Entity::new(
                id,
                collider,
                Vec3::ZERO,
                t.max_health,
                t.max_speed,
                t.acceleration,
            ),
            score: 0,
            heading: 0.0,
            aim: Vec2::ZERO,
            beam: None,
        }
    }
}

impl Actor for Player {
    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }

    fn kind(&self) -> ActorKind {
        ActorKind::Player
    }
}

/// Walker melee state machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AttackState {
    /// Counting down to the next windup
    Idle { wait: f32 },
    /// Attack is coming; the hit resolves when `remaining` runs out
    Windup { remaining: f32, wait_after: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkerBrain {
    pub attack: AttackState,
}

/// Axis a trap slides along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideAxis {
    X,
    Y,
}

impl SlideAxis {
    /// Component of `v` along this axis
    #[inline]
    pub fn along(self, v: Vec3) -> f32 {
        match self {
            SlideAxis::X => v.x,
            SlideAxis::Y => v.y,
        }
    }

    /// Component of `v` across this axis
    #[inline]
    pub fn across(self, v: Vec3) -> f32 {
        match self {
            SlideAxis::X => v.y,
            SlideAxis::Y => v.x,
        }
    }

    #[inline]
    pub fn unit(self) -> Vec3 {
        match self {
            SlideAxis::X => Vec3::X,
            SlideAxis::Y => Vec3::Y,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrapBrain {
    pub axis: SlideAxis,
    /// -1 or +1 while sliding, 0 at rest
    pub direction: f32,
    /// The player has already been hit during this slide
    pub ignore_player: bool,
}

impl TrapBrain {
    #[inline]
    pub fn is_sliding(&self) -> bool {
        self.direction != 0.0
    }

    /// Come to rest and re-arm the player hit
    pub fn stop(&mut self) {
        self.direction = 0.0;
        self.ignore_player = false;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EnemyPolicy {
    Walker(WalkerBrain),
    Trap(TrapBrain),
}

/// Any hostile actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub entity: Entity,
    /// Awarded to the player when this enemy dies
    pub score_value: u32,
    pub heading: f32,
    /// Spawn animation still playing; the controller waits for it
    pub spawning: bool,
    pub policy: EnemyPolicy,
}

impl Enemy {
    pub fn walker(id: EntityId, collider: ColliderHandle, pos: Vec3, tuning: &Tuning) -> Self {
        let t = &tuning.walker;
        Self {
            entity: Entity::new(id, collider, pos, t.max_health, t.max_speed, t.acceleration),
            score_value: t.score_value,
            heading: 0.0,
            spawning: true,
            policy: EnemyPolicy::Walker(WalkerBrain {
                attack: AttackState::Idle { wait: 0.0 },
            }),
        }
    }

    pub fn trap(
        id: EntityId,
        collider: ColliderHandle,
        pos: Vec3,
        axis: SlideAxis,
        tuning: &Tuning,
    ) -> Self {
        let t = &tuning.trap;
        Self {
            entity: Entity::new(id, collider, pos, t.max_health, t.max_speed, t.acceleration),
            score_value: 1,
            heading: 0.0,
            spawning: false,
            policy: EnemyPolicy::Trap(TrapBrain {
                axis,
                direction: 0.0,
                ignore_player: false,
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> EntityId {
        self.entity.id
    }

    pub fn walker_brain(&self) -> Option<&WalkerBrain> {
        match &self.policy {
            EnemyPolicy::Walker(brain) => Some(brain),
            EnemyPolicy::Trap(_) => None,
        }
    }

    pub fn trap_brain(&self) -> Option<&TrapBrain> {
        match &self.policy {
            EnemyPolicy::Trap(brain) => Some(brain),
            EnemyPolicy::Walker(_) => None,
        }
    }

    pub fn trap_brain_mut(&mut self) -> Option<&mut TrapBrain> {
        match &mut self.policy {
            EnemyPolicy::Trap(brain) => Some(brain),
            EnemyPolicy::Walker(_) => None,
        }
    }
}

impl Actor for Enemy {
    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }

    fn kind(&self) -> ActorKind {
        match self.policy {
            EnemyPolicy::Walker(_) => ActorKind::Walker,
            EnemyPolicy::Trap(_) => ActorKind::Trap,
        }
    }

    fn on_damage(&mut self, delta: f32) {
        if !self.is_immune() {
            self.entity.alter_health(delta);
        }
    }

    fn is_immune(&self) -> bool {
        matches!(self.policy, EnemyPolicy::Trap(_))
    }
}
