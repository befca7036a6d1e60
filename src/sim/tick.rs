//! Frame update
//!
//! Core game loop that advances the simulation by one variable-length frame.

use glam::Vec2;

use super::actor::{Actor, EntityRef};
use super::ai::{self, AiContext, Decision};
use super::backend::{Backend, Contact, Effect, HitTarget};
use super::combat;
use super::lifecycle;
use super::state::{GameEvent, GamePhase, GameState};

/// Player input sampled once per frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Fire the beam this frame
    pub shoot: bool,
    /// Aim point on the ground plane; the last one is kept when absent
    pub aim: Option<Vec2>,
}

/// Advance the game state by one frame
pub fn tick<B: Backend>(state: &mut GameState, backend: &mut B, input: &FrameInput, dt: f32) {
    state.events.clear();

    if state.phase != GamePhase::Running {
        return;
    }
    if !state.player.entity.is_alive() {
        state.end_game();
        return;
    }

    state.elapsed += dt;
    state.frame += 1;
    let health_before = state.player.entity.health;

    update_player(state, backend, input, dt);

    // Spawn timer
    if state.difficulty.tick_spawn(dt) {
        state.try_spawn_walker(backend);
    }

    update_walkers(state, backend, dt);
    update_traps(state, backend, dt);

    for contact in backend.drain_contacts() {
        handle_trap_contact(state, backend, contact);
    }

    collect_dead(state, backend);

    let timeout = state.tuning.director.death_timeout;
    for id in lifecycle::reap(&mut state.dying, backend, dt, timeout) {
        state.events.push(GameEvent::EnemyReleased { id });
    }

    // Difficulty ramp
    if state.difficulty.tick_difficulty(dt, &state.tuning.director) {
        let d = &state.difficulty;
        log::debug!(
            "Difficulty raised: {} enemies, spawn every {:.1}s",
            d.max_enemies,
            d.spawn_interval
        );
        state.events.push(GameEvent::DifficultyRaised {
            max_enemies: d.max_enemies,
            spawn_interval: d.spawn_interval,
        });
    }

    let health = state.player.entity.health;
    if health < health_before {
        backend.effect(state.player.entity.collider, Effect::PlayerHurt);
        state.events.push(GameEvent::PlayerHurt { health });
    }
    if health <= 0.0 {
        state.end_game();
    }
}

fn update_player<B: Backend>(state: &mut GameState, backend: &mut B, input: &FrameInput, dt: f32) {
    let friction = state.tuning.friction;
    let player = &mut state.player;
    ai::drive_player(player, input, dt);
    player.integrate(dt, friction);
    player.entity.pos = backend.resolve_position(player.entity.collider, player.entity.pos);

    if input.shoot {
        combat::fire_beam(state, backend, dt);
    } else {
        state.player.beam = None;
    }
}

fn update_walkers<B: Backend>(state: &mut GameState, backend: &mut B, dt: f32) {
    let friction = state.tuning.friction;

    for i in 0..state.enemies.len() {
        let ctx = AiContext {
            player_pos: state.player.entity.pos,
        };
        let enemy = &mut state.enemies[i];
        let handle = enemy.entity.collider;
        if enemy.spawning && backend.is_spawn_presentation_complete(handle) {
            enemy.spawning = false;
        }

        let decision = ai::think(enemy, &ctx, &state.tuning, &mut state.rng, dt);
        enemy.integrate(dt, friction);
        enemy.entity.pos = backend.resolve_position(handle, enemy.entity.pos);

        match decision {
            Decision::Continue => {}
            Decision::Windup => backend.effect(handle, Effect::AttackWindup),
            Decision::Strike(probe) => {
                let delta = -state.tuning.walker.attack_damage;
                let resolution = combat::resolve(state, backend, &probe, delta);
                ai::strike_resolved(&mut state.enemies[i], resolution.landed(), &state.tuning.walker);
            }
        }
    }
}

fn update_traps<B: Backend>(state: &mut GameState, backend: &mut B, dt: f32) {
    let ctx = AiContext {
        player_pos: state.player.entity.pos,
    };
    let friction = state.tuning.friction;

    for trap in &mut state.traps {
        ai::think(trap, &ctx, &state.tuning, &mut state.rng, dt);
        trap.integrate(dt, friction);
        trap.entity.pos = backend.resolve_position(trap.entity.collider, trap.entity.pos);
    }
}

/// A sliding trap touched something. Walls and other traps stop it; actors
/// take damage and the slide goes on.
fn handle_trap_contact<B: Backend>(state: &mut GameState, backend: &mut B, contact: Contact) {
    let Some(EntityRef::Trap(trap_id)) = state.lookup(contact.from) else {
        return;
    };
    let sliding = state
        .trap_mut(trap_id)
        .and_then(|t| t.trap_brain())
        .is_some_and(|brain| brain.is_sliding());
    if !sliding {
        return;
    }

    let into = match contact.into {
        HitTarget::Static => None,
        HitTarget::Collider(handle) => match state.lookup(handle) {
            Some(EntityRef::Trap(_)) => None,
            Some(other) => Some(other),
            // Already dead
            None => return,
        },
    };

    match into {
        None => {
            if let Some(brain) = state.trap_mut(trap_id).and_then(|t| t.trap_brain_mut()) {
                brain.stop();
            }
            backend.effect(contact.from, Effect::TrapStop);
            state.events.push(GameEvent::TrapStopped { id: trap_id });
        }
        Some(EntityRef::Player) => {
            let damage = state.tuning.trap.player_damage;
            let already_hit = state
                .trap_mut(trap_id)
                .and_then(|t| t.trap_brain_mut())
                .map(|brain| std::mem::replace(&mut brain.ignore_player, true))
                .unwrap_or(true);
            if !already_hit {
                state.player.on_damage(-damage);
            }
            backend.effect(contact.from, Effect::TrapImpact);
        }
        Some(target) => {
            let damage = state.tuning.trap.enemy_damage;
            if let Some(actor) = state.actor_mut(target) {
                actor.on_damage(-damage);
            }
            backend.effect(contact.from, Effect::TrapImpact);
        }
    }
}

/// Move walkers that died this frame into the dying collection
fn collect_dead<B: Backend>(state: &mut GameState, backend: &mut B) {
    if state.enemies.iter().all(|e| e.entity.is_alive()) {
        return;
    }

    let (alive, dead): (Vec<_>, Vec<_>) = std::mem::take(&mut state.enemies)
        .into_iter()
        .partition(|e| e.entity.is_alive());
    state.enemies = alive;

    for enemy in dead {
        let id = enemy.id();
        state.unregister(enemy.entity.collider);
        state.player.score += u64::from(enemy.score_value);
        state.kills += 1;
        state.events.push(GameEvent::EnemyKilled {
            id,
            score_value: enemy.score_value,
        });
        log::debug!("Enemy {} killed, score {}", id.0, state.player.score);
        state.dying.push(lifecycle::begin_dying(enemy, backend));
    }
}
