//! Session state and the collections the director owns
//!
//! Everything the simulation mutates lives in [`GameState`]. Randomness comes
//! from a seeded PCG so a session replays exactly from its seed and inputs.

use std::collections::BTreeMap;

use glam::Vec3;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actor::{Actor, Enemy, EntityRef, Player, SlideAxis};
use super::backend::{ActorKind, Backend};
use super::entity::{ColliderHandle, EntityId};
use super::lifecycle::Dying;
use crate::consts::*;
use crate::tuning::{DirectorTuning, Tuning};

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Created but `start_game` not called yet
    NotStarted,
    Running,
    /// The player died; ticks do nothing until the next `start_game`
    GameOver,
}

/// Spawn cadence and the difficulty ramp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    pub spawn_interval: f32,
    pub spawn_timer: f32,
    pub max_enemies: usize,
    pub difficulty_interval: f32,
    pub difficulty_timer: f32,
    /// Difficulty steps taken this session
    pub steps: u32,
}

impl Difficulty {
    pub fn new(t: &DirectorTuning) -> Self {
        Self {
            spawn_interval: t.initial_spawn_interval,
            spawn_timer: t.initial_spawn_interval,
            max_enemies: t.initial_max_enemies.min(t.max_enemies_ceiling),
            difficulty_interval: t.difficulty_interval,
            difficulty_timer: t.difficulty_interval,
            steps: 0,
        }
    }

    /// Count down the spawn timer. True when a spawn attempt is due; the timer
    /// is re-armed either way, so a skipped spawn is never made up later.
    pub fn tick_spawn(&mut self, dt: f32) -> bool {
        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            self.spawn_timer = self.spawn_interval;
            true
        } else {
            false
        }
    }

    /// Count down the difficulty timer, raising difficulty when it expires
    pub fn tick_difficulty(&mut self, dt: f32, t: &DirectorTuning) -> bool {
        self.difficulty_timer -= dt;
        if self.difficulty_timer <= 0.0 {
            self.difficulty_timer = self.difficulty_interval;
            self.raise(t);
            true
        } else {
            false
        }
    }

    /// One more concurrent enemy and a shorter spawn interval, within limits
    pub fn raise(&mut self, t: &DirectorTuning) {
        self.max_enemies = (self.max_enemies + 1).min(t.max_enemies_ceiling);
        self.spawn_interval = (self.spawn_interval - t.spawn_interval_step).max(t.min_spawn_interval);
        self.steps += 1;
    }
}

/// Things that happened during the last tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemySpawned { id: EntityId },
    EnemyKilled { id: EntityId, score_value: u32 },
    /// The enemy's death presentation finished and it left the simulation
    EnemyReleased { id: EntityId },
    PlayerHurt { health: f32 },
    TrapStopped { id: EntityId },
    DifficultyRaised { max_enemies: usize, spawn_interval: f32 },
    GameOver { score: u64 },
}

/// Candidate trap positions along one wall
pub fn trap_slots() -> Vec<f32> {
    let count = (2.0 * ARENA_HALF_EXTENT / TRAP_SLOT_SPACING).round() as i32;
    (1..count)
        .map(|i| -ARENA_HALF_EXTENT + i as f32 * TRAP_SLOT_SPACING)
        .filter(|slot| slot.abs() > TRAP_SLOT_CLEARANCE)
        .collect()
}

/// Fixed enemy spawn positions, evenly spaced along each wall
pub fn spawn_points() -> Vec<Vec3> {
    let n = SPAWN_POINTS_PER_WALL;
    let line = SPAWN_LINE;
    (0..n)
        .flat_map(|i| {
            let coord = -line + (i as f32 + 0.5) * 2.0 * line / n as f32;
            [
                Vec3::new(-line, coord, 0.0),
                Vec3::new(line, coord, 0.0),
                Vec3::new(coord, -line, 0.0),
                Vec3::new(coord, line, 0.0),
            ]
        })
        .collect()
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Seconds simulated since `start_game`
    pub elapsed: f32,
    /// Ticks simulated since `start_game`
    pub frame: u64,
    /// Walkers killed this session
    pub kills: u32,
    pub difficulty: Difficulty,
    pub player: Player,
    /// Live walking enemies
    pub enemies: Vec<Enemy>,
    pub traps: Vec<Enemy>,
    /// Dead walkers waiting for their death presentation
    pub dying: Vec<Dying>,
    pub spawn_points: Vec<Vec3>,
    /// Events from the last tick
    pub events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
    colliders: BTreeMap<ColliderHandle, EntityRef>,
    next_id: u32,
}

impl GameState {
    /// Create a session that has not started yet
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let player = Player::new(EntityId(0), ColliderHandle(0), &tuning);
        Self {
            seed,
            difficulty: Difficulty::new(&tuning.director),
            tuning,
            phase: GamePhase::NotStarted,
            elapsed: 0.0,
            frame: 0,
            kills: 0,
            player,
            enemies: Vec::new(),
            traps: Vec::new(),
            dying: Vec::new(),
            spawn_points: spawn_points(),
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            colliders: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Reset everything and begin a fresh run
    pub fn start_game<B: Backend>(&mut self, backend: &mut B) {
        self.clear(backend);

        let (id, handle) = self.allocate();
        self.player = Player::new(id, handle, &self.tuning);
        self.colliders.insert(handle, EntityRef::Player);
        backend.spawn_presentation(handle, ActorKind::Player, self.player.entity.pos);

        self.difficulty = Difficulty::new(&self.tuning.director);
        self.elapsed = 0.0;
        self.frame = 0;
        self.kills = 0;
        self.events.clear();

        self.seed_traps(backend);

        self.phase = GamePhase::Running;
        log::info!(
            "Game started (seed {}, {} traps, {} spawn points)",
            self.seed,
            self.traps.len(),
            self.spawn_points.len()
        );
    }

    /// Release every actor's presentation and empty the collections
    pub fn clear<B: Backend>(&mut self, backend: &mut B) {
        for enemy in self.enemies.drain(..).chain(self.traps.drain(..)) {
            backend.release_presentation(enemy.entity.collider);
        }
        for dying in self.dying.drain(..) {
            backend.release_presentation(dying.enemy.entity.collider);
        }
        if self.phase != GamePhase::NotStarted {
            backend.release_presentation(self.player.entity.collider);
        }
        self.colliders.clear();
    }

    /// Move to game over; idempotent
    pub fn end_game(&mut self) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.player.beam = None;
        self.events.push(GameEvent::GameOver {
            score: self.player.score,
        });
        log::info!(
            "Game over: score {} after {:.1}s ({} kills)",
            self.player.score,
            self.elapsed,
            self.kills
        );
    }

    /// Allocate a fresh entity id and collider handle
    pub fn allocate(&mut self) -> (EntityId, ColliderHandle) {
        let raw = self.next_id;
        self.next_id += 1;
        (EntityId(raw), ColliderHandle(raw))
    }

    /// Which actor owns a collider
    pub fn lookup(&self, handle: ColliderHandle) -> Option<EntityRef> {
        self.colliders.get(&handle).copied()
    }

    /// Forget a collider; hit tests against it are blocked from now on
    pub fn unregister(&mut self, handle: ColliderHandle) {
        self.colliders.remove(&handle);
    }

    pub fn actor_mut(&mut self, target: EntityRef) -> Option<&mut dyn Actor> {
        match target {
            EntityRef::Player => Some(&mut self.player),
            EntityRef::Enemy(id) => self
                .enemies
                .iter_mut()
                .find(|e| e.id() == id)
                .map(|e| e as &mut dyn Actor),
            EntityRef::Trap(id) => self
                .traps
                .iter_mut()
                .find(|e| e.id() == id)
                .map(|e| e as &mut dyn Actor),
        }
    }

    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id() == id)
    }

    pub fn trap_mut(&mut self, id: EntityId) -> Option<&mut Enemy> {
        self.traps.iter_mut().find(|e| e.id() == id)
    }

    /// Spawn a walker at a random spawn point if the cap allows
    pub fn try_spawn_walker<B: Backend>(&mut self, backend: &mut B) -> Option<EntityId> {
        if self.enemies.len() >= self.difficulty.max_enemies {
            return None;
        }
        let pos = *self.spawn_points.choose(&mut self.rng)?;

        let (id, handle) = self.allocate();
        self.enemies.push(Enemy::walker(id, handle, pos, &self.tuning));
        self.colliders.insert(handle, EntityRef::Enemy(id));
        backend.spawn_presentation(handle, ActorKind::Walker, pos);
        self.events.push(GameEvent::EnemySpawned { id });
        log::debug!("Walker {} spawned at ({:.1}, {:.1})", id.0, pos.x, pos.y);
        Some(id)
    }

    /// Place a trap on the wall
    pub fn add_trap<B: Backend>(&mut self, pos: Vec3, axis: SlideAxis, backend: &mut B) -> EntityId {
        let (id, handle) = self.allocate();
        self.traps.push(Enemy::trap(id, handle, pos, axis, &self.tuning));
        self.colliders.insert(handle, EntityRef::Trap(id));
        backend.spawn_presentation(handle, ActorKind::Trap, pos);
        id
    }

    /// Scatter traps over the four walls, each in a distinct slot.
    /// North and south traps slide along y, east and west along x.
    fn seed_traps<B: Backend>(&mut self, backend: &mut B) {
        let slots = trap_slots();
        let mut free: [Vec<f32>; 4] = std::array::from_fn(|_| slots.clone());
        let line = SPAWN_LINE;

        for _ in 0..self.tuning.trap.traps_per_side {
            for (side, side_slots) in free.iter_mut().enumerate() {
                if side_slots.is_empty() {
                    log::warn!("Wall {side} has no free trap slots left");
                    continue;
                }
                let slot = side_slots.remove(self.rng.random_range(0..side_slots.len()));
                let (pos, axis) = match side {
                    0 => (Vec3::new(slot, line, 0.0), SlideAxis::Y),
                    1 => (Vec3::new(slot, -line, 0.0), SlideAxis::Y),
                    2 => (Vec3::new(line, slot, 0.0), SlideAxis::X),
                    _ => (Vec3::new(-line, slot, 0.0), SlideAxis::X),
                };
                self.add_trap(pos, axis, backend);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::test_support::ScriptedBackend;
    use proptest::prelude::*;

    #[test]
    fn trap_slots_skip_the_middle() {
        let slots = trap_slots();
        assert_eq!(slots.len(), 34);
        assert!(slots.iter().all(|s| s.abs() > 1.0 && s.abs() < 8.0));
        assert!((slots[0] + 7.6).abs() < 1e-4);
    }

    #[test]
    fn spawn_points_line_the_walls() {
        let points = spawn_points();
        assert_eq!(points.len(), 20);
        for p in &points {
            assert!((p.x.abs() - 7.0).abs() < 1e-5 || (p.y.abs() - 7.0).abs() < 1e-5);
            assert!(p.x.abs() <= 7.0 + 1e-5 && p.y.abs() <= 7.0 + 1e-5);
        }
    }

    #[test]
    fn start_game_seeds_traps_in_distinct_slots() {
        let mut state = GameState::new(42, Tuning::default());
        let mut backend = ScriptedBackend::default();
        state.start_game(&mut backend);

        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.traps.len(), 8);
        for (i, a) in state.traps.iter().enumerate() {
            for b in &state.traps[i + 1..] {
                assert!(a.entity.pos.distance(b.entity.pos) > 0.1);
            }
            let brain = a.trap_brain().unwrap();
            let expected = if a.entity.pos.y.abs() == 7.0 {
                SlideAxis::Y
            } else {
                SlideAxis::X
            };
            assert_eq!(brain.axis, expected);
        }
        // player + traps presented
        assert_eq!(backend.spawned.len(), 9);
        assert_eq!(backend.spawned[0].1, ActorKind::Player);
        assert_eq!(state.lookup(state.player.entity.collider), Some(EntityRef::Player));
    }

    #[test]
    fn same_seed_same_layout() {
        let mut a = GameState::new(7, Tuning::default());
        let mut b = GameState::new(7, Tuning::default());
        a.start_game(&mut ScriptedBackend::default());
        b.start_game(&mut ScriptedBackend::default());
        let pa: Vec<_> = a.traps.iter().map(|t| t.entity.pos).collect();
        let pb: Vec<_> = b.traps.iter().map(|t| t.entity.pos).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn too_many_traps_runs_out_of_slots_quietly() {
        let mut tuning = Tuning::default();
        tuning.trap.traps_per_side = 40;
        let mut state = GameState::new(3, tuning);
        state.start_game(&mut ScriptedBackend::default());
        assert_eq!(state.traps.len(), 4 * 34);
    }

    #[test]
    fn restart_releases_everything() {
        let mut state = GameState::new(5, Tuning::default());
        let mut backend = ScriptedBackend::default();
        state.start_game(&mut backend);
        state.try_spawn_walker(&mut backend).unwrap();
        let old_player = state.player.entity.collider;
        state.player.score = 12;

        state.start_game(&mut backend);

        assert_eq!(backend.released.len(), 1 + 8 + 1);
        assert!(backend.released.contains(&old_player));
        assert!(state.enemies.is_empty());
        assert_eq!(state.traps.len(), 8);
        assert_eq!(state.player.score, 0);
        assert_eq!(state.lookup(old_player), None);
    }

    #[test]
    fn spawn_respects_cap() {
        let mut state = GameState::new(5, Tuning::default());
        let mut backend = ScriptedBackend::default();
        state.start_game(&mut backend);

        assert!(state.try_spawn_walker(&mut backend).is_some());
        assert!(state.try_spawn_walker(&mut backend).is_some());
        assert!(state.try_spawn_walker(&mut backend).is_none());
        assert_eq!(state.enemies.len(), 2);
        assert!(state.enemies.iter().all(|e| state.spawn_points.contains(&e.entity.pos)));
    }

    #[test]
    fn skipped_spawn_rearms_timer() {
        let mut d = Difficulty::new(&DirectorTuning::default());
        assert!(!d.tick_spawn(0.5));
        assert!(d.tick_spawn(0.5));
        assert_eq!(d.spawn_timer, 1.0);
    }

    #[test]
    fn game_over_is_recorded_once() {
        let mut state = GameState::new(5, Tuning::default());
        state.start_game(&mut ScriptedBackend::default());
        state.end_game();
        state.end_game();
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.events, vec![GameEvent::GameOver { score: 0 }]);
    }

    proptest! {
        #[test]
        fn difficulty_ramp_saturates(n in 0u32..60) {
            let t = DirectorTuning::default();
            let mut d = Difficulty::new(&t);
            for _ in 0..n {
                d.raise(&t);
            }
            let expected_cap = (t.initial_max_enemies + n as usize).min(t.max_enemies_ceiling);
            let expected_interval =
                (t.initial_spawn_interval - n as f32 * t.spawn_interval_step).max(t.min_spawn_interval);
            prop_assert_eq!(d.max_enemies, expected_cap);
            prop_assert!((d.spawn_interval - expected_interval).abs() < 1e-4);
            prop_assert_eq!(d.steps, n);
        }

        #[test]
        fn difficulty_timer_expiries_raise(n in 1u32..30) {
            let t = DirectorTuning::default();
            let mut d = Difficulty::new(&t);
            let mut raised = 0;
            // one full interval per call
            for _ in 0..n {
                if d.tick_difficulty(t.difficulty_interval, &t) {
                    raised += 1;
                }
            }
            prop_assert_eq!(raised, n);
            prop_assert_eq!(d.max_enemies, (2 + n as usize).min(20));
            prop_assert_eq!(d.difficulty_timer, t.difficulty_interval);
        }
    }
}
