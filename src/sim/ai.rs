//! Per-frame controllers
//!
//! Controllers only set velocity, facing and controller state. Integration,
//! hit resolution and contacts are handled by the caller.

use glam::Vec3;
use rand::Rng;

use super::actor::{AttackState, Enemy, EnemyPolicy, Player, TrapBrain, WalkerBrain};
use super::backend::{Probe, layers};
use super::entity::Entity;
use super::tick::FrameInput;
use crate::tuning::{TrapTuning, Tuning, WalkerTuning};
use crate::{heading_to_forward, heading_toward, planar};

/// What the controllers may observe about the world
#[derive(Debug, Clone, Copy)]
pub struct AiContext {
    pub player_pos: Vec3,
}

/// Outcome of one controller update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Continue,
    /// A walker just began winding up an attack
    Windup,
    /// A walker's windup finished; resolve this probe
    Strike(Probe),
}

/// Apply held directions and aim to the player.
///
/// Each direction adds a full step of acceleration on its own world axis, so
/// diagonals end up faster than straight lines.
pub fn drive_player(player: &mut Player, input: &FrameInput, dt: f32) {
    let e = &mut player.entity;
    let step = e.acceleration * dt;

    e.walking = false;
    if input.up {
        e.walking = true;
        e.vel.y += step;
    }
    if input.down {
        e.walking = true;
        e.vel.y -= step;
    }
    if input.left {
        e.walking = true;
        e.vel.x -= step;
    }
    if input.right {
        e.walking = true;
        e.vel.x += step;
    }

    if let Some(aim) = input.aim {
        player.aim = aim;
    }
    let to_aim = player.aim - planar(e.pos);
    if to_aim.length() > 0.001 {
        player.heading = heading_toward(to_aim);
    }
}

/// Run the enemy's policy for one frame
pub fn think<R: Rng>(
    enemy: &mut Enemy,
    ctx: &AiContext,
    tuning: &Tuning,
    rng: &mut R,
    dt: f32,
) -> Decision {
    if enemy.spawning {
        return Decision::Continue;
    }

    match &mut enemy.policy {
        EnemyPolicy::Walker(brain) => think_walker(
            &mut enemy.entity,
            &mut enemy.heading,
            brain,
            ctx,
            &tuning.walker,
            rng,
            dt,
        ),
        EnemyPolicy::Trap(brain) => {
            think_trap(&mut enemy.entity, brain, ctx, &tuning.trap, dt);
            Decision::Continue
        }
    }
}

/// Tell a walker whether its strike connected
pub fn strike_resolved(enemy: &mut Enemy, landed: bool, tuning: &WalkerTuning) {
    if !landed {
        return;
    }
    if let EnemyPolicy::Walker(brain) = &mut enemy.policy {
        brain.attack = AttackState::Idle {
            wait: tuning.recover_wait,
        };
    }
}

/// Melee probe from the walker's position along its facing
pub fn melee_probe(entity: &Entity, heading: f32, reach: f32) -> Probe {
    let forward = heading_to_forward(heading).extend(0.0);
    Probe::segment(entity.pos, entity.pos + forward * reach, layers::BODY)
}

fn think_walker<R: Rng>(
    entity: &mut Entity,
    heading: &mut f32,
    brain: &mut WalkerBrain,
    ctx: &AiContext,
    t: &WalkerTuning,
    rng: &mut R,
    dt: f32,
) -> Decision {
    let to_player = ctx.player_pos - entity.pos;
    let to_player_2d = planar(to_player);
    *heading = heading_toward(to_player_2d);

    if to_player_2d.length() > t.engage_distance() {
        entity.walking = true;
        let dir = to_player_2d.normalize_or_zero().extend(0.0);
        entity.vel += dir * entity.acceleration * dt;
        brain.attack = AttackState::Idle {
            wait: t.approach_wait,
        };
        return Decision::Continue;
    }

    entity.walking = false;
    entity.vel = Vec3::ZERO;

    match brain.attack {
        AttackState::Windup {
            remaining,
            wait_after,
        } => {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                brain.attack = AttackState::Idle { wait: wait_after };
                Decision::Strike(melee_probe(entity, *heading, t.attack_distance))
            } else {
                brain.attack = AttackState::Windup {
                    remaining,
                    wait_after,
                };
                Decision::Continue
            }
        }
        AttackState::Idle { wait } => {
            let wait = wait - dt;
            if wait <= 0.0 {
                let (lo, hi) = (t.wait_min.min(t.wait_max), t.wait_min.max(t.wait_max));
                brain.attack = AttackState::Windup {
                    remaining: t.attack_delay,
                    wait_after: rng.random_range(lo..=hi),
                };
                Decision::Windup
            } else {
                brain.attack = AttackState::Idle { wait };
                Decision::Continue
            }
        }
    }
}

fn think_trap(entity: &mut Entity, brain: &mut TrapBrain, ctx: &AiContext, t: &TrapTuning, dt: f32) {
    if brain.is_sliding() {
        entity.walking = true;
        entity.vel += brain.axis.unit() * brain.direction * entity.acceleration * dt;
        return;
    }

    entity.walking = false;
    let offset = ctx.player_pos - entity.pos;
    if brain.axis.across(offset).abs() < t.detection_band {
        brain.direction = 1.0f32.copysign(brain.axis.along(offset));
    }
}
