//! Engine stand-in for running sessions without a renderer
//!
//! Tracks one sphere per actor, answers probes against the spheres and the
//! arena walls, reports new trap contacts, and plays spawn and death
//! "animations" as plain countdowns.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec3;
use serde::Serialize;

use super::geometry::{self, Wall};
use crate::consts::COLLIDER_RADIUS;
use crate::sim::{ActorKind, Backend, ColliderHandle, Contact, Effect, HitTarget, Probe, ProbeHit, ProbeShape};

/// Default length of the spawn animation in seconds
pub const SPAWN_PRESENTATION_SECS: f32 = 0.5;
/// Default length of the death animation in seconds
pub const DEATH_PRESENTATION_SECS: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Presence {
    Spawning { remaining: f32 },
    Active,
    Dying { remaining: f32 },
}

#[derive(Debug, Clone)]
struct Body {
    kind: ActorKind,
    pos: Vec3,
    presence: Presence,
}

impl Body {
    fn is_dying(&self) -> bool {
        matches!(self.presence, Presence::Dying { .. })
    }
}

/// Something a trap can be resting against
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Touch {
    Wall(Wall),
    Body(ColliderHandle),
}

impl Touch {
    fn target(self) -> HitTarget {
        match self {
            Touch::Wall(_) => HitTarget::Static,
            Touch::Body(handle) => HitTarget::Collider(handle),
        }
    }
}

/// Counters for the end-of-session summary
#[derive(Debug, Clone, Default, Serialize)]
pub struct PresentationStats {
    pub spawned: u32,
    pub released: u32,
    pub deaths: u32,
    pub trap_stops: u32,
    pub trap_impacts: u32,
    pub windups: u32,
    pub player_hurts: u32,
}

/// Headless [`Backend`]
#[derive(Debug, Clone)]
pub struct HeadlessBackend {
    bodies: BTreeMap<ColliderHandle, Body>,
    touching: BTreeMap<ColliderHandle, BTreeSet<Touch>>,
    spawn_secs: f32,
    death_secs: f32,
    pub stats: PresentationStats,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new(SPAWN_PRESENTATION_SECS, DEATH_PRESENTATION_SECS)
    }
}

impl HeadlessBackend {
    pub fn new(spawn_secs: f32, death_secs: f32) -> Self {
        Self {
            bodies: BTreeMap::new(),
            touching: BTreeMap::new(),
            spawn_secs,
            death_secs,
            stats: PresentationStats::default(),
        }
    }

    /// Advance presentation timers; call once per frame
    pub fn advance(&mut self, dt: f32) {
        for body in self.bodies.values_mut() {
            body.presence = match body.presence {
                Presence::Spawning { remaining } if remaining - dt <= 0.0 => Presence::Active,
                Presence::Spawning { remaining } => Presence::Spawning {
                    remaining: remaining - dt,
                },
                Presence::Dying { remaining } => Presence::Dying {
                    remaining: (remaining - dt).max(0.0),
                },
                Presence::Active => Presence::Active,
            };
        }
    }

    /// Colliders currently known
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn position(&self, handle: ColliderHandle) -> Option<Vec3> {
        self.bodies.get(&handle).map(|b| b.pos)
    }

    fn hit_distance(shape: ProbeShape, center: Vec3) -> Option<(f32, Vec3)> {
        match shape {
            ProbeShape::Ray { origin, dir } => {
                let dir = dir.try_normalize()?;
                let t = geometry::ray_sphere(origin, dir, center, COLLIDER_RADIUS)?;
                Some((t, origin + dir * t))
            }
            ProbeShape::Segment { a, b } => {
                let (dir, len) = segment_dir(a, b)?;
                let t = geometry::ray_sphere(a, dir, center, COLLIDER_RADIUS)?;
                (t <= len).then(|| (t, a + dir * t))
            }
        }
    }

    fn wall_hit(shape: ProbeShape) -> Option<(f32, Vec3)> {
        let (origin, dir, limit) = match shape {
            ProbeShape::Ray { origin, dir } => (origin, dir.try_normalize()?, f32::INFINITY),
            ProbeShape::Segment { a, b } => {
                let (dir, len) = segment_dir(a, b)?;
                (a, dir, len)
            }
        };
        let (t, _) = geometry::ray_walls(origin, dir)?;
        (t <= limit).then(|| (t, origin + dir * t))
    }

    /// What a trap is resting against right now
    fn current_touches(&self, handle: ColliderHandle, pos: Vec3) -> BTreeSet<Touch> {
        let walls = geometry::touching_walls(pos).map(Touch::Wall);
        let bodies = self
            .bodies
            .iter()
            .filter(|(other, body)| **other != handle && !body.is_dying())
            .filter(|(_, body)| geometry::bodies_touch(pos, body.pos))
            .map(|(other, _)| Touch::Body(*other));
        walls.chain(bodies).collect()
    }
}

fn segment_dir(a: Vec3, b: Vec3) -> Option<(Vec3, f32)> {
    let delta = b - a;
    let len = delta.length();
    let dir = delta.try_normalize()?;
    Some((dir, len))
}

impl Backend for HeadlessBackend {
    fn spawn_presentation(&mut self, handle: ColliderHandle, kind: ActorKind, pos: Vec3) {
        // only walkers animate in
        let presence = if kind == ActorKind::Walker && self.spawn_secs > 0.0 {
            Presence::Spawning {
                remaining: self.spawn_secs,
            }
        } else {
            Presence::Active
        };
        self.bodies.insert(handle, Body { kind, pos, presence });
        self.stats.spawned += 1;
    }

    fn release_presentation(&mut self, handle: ColliderHandle) {
        if self.bodies.remove(&handle).is_some() {
            self.stats.released += 1;
        }
        self.touching.remove(&handle);
        for touches in self.touching.values_mut() {
            touches.remove(&Touch::Body(handle));
        }
    }

    fn begin_death_presentation(&mut self, handle: ColliderHandle) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.presence = Presence::Dying {
                remaining: self.death_secs,
            };
            self.stats.deaths += 1;
        }
    }

    fn is_spawn_presentation_complete(&self, handle: ColliderHandle) -> bool {
        !matches!(
            self.bodies.get(&handle).map(|b| b.presence),
            Some(Presence::Spawning { .. })
        )
    }

    fn is_death_presentation_complete(&self, handle: ColliderHandle) -> bool {
        match self.bodies.get(&handle).map(|b| b.presence) {
            Some(Presence::Dying { remaining }) => remaining <= 0.0,
            Some(_) => false,
            None => true,
        }
    }

    fn query_collisions(&mut self, probe: &Probe) -> Vec<ProbeHit> {
        let mut hits: Vec<ProbeHit> = self
            .bodies
            .iter()
            .filter(|(_, body)| !body.is_dying() && body.kind.layers() & probe.mask != 0)
            .filter_map(|(handle, body)| {
                let (distance, point) = Self::hit_distance(probe.shape, body.pos)?;
                Some(ProbeHit {
                    target: HitTarget::Collider(*handle),
                    distance,
                    point,
                })
            })
            .collect();

        if let Some((distance, point)) = Self::wall_hit(probe.shape) {
            hits.push(ProbeHit {
                target: HitTarget::Static,
                distance,
                point,
            });
        }
        hits
    }

    fn resolve_position(&mut self, handle: ColliderHandle, desired: Vec3) -> Vec3 {
        let pos = geometry::clamp_to_arena(desired);
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.pos = pos;
        }
        pos
    }

    fn drain_contacts(&mut self) -> Vec<Contact> {
        let traps: Vec<(ColliderHandle, Vec3)> = self
            .bodies
            .iter()
            .filter(|(_, body)| body.kind == ActorKind::Trap && !body.is_dying())
            .map(|(handle, body)| (*handle, body.pos))
            .collect();

        let mut contacts = Vec::new();
        for (handle, pos) in traps {
            let now = self.current_touches(handle, pos);
            let before = self.touching.get(&handle);
            contacts.extend(
                now.iter()
                    .filter(|touch| before.is_none_or(|set| !set.contains(*touch)))
                    .map(|touch| Contact {
                        from: handle,
                        into: touch.target(),
                    }),
            );
            self.touching.insert(handle, now);
        }
        contacts
    }

    fn effect(&mut self, _handle: ColliderHandle, effect: Effect) {
        let counter = match effect {
            Effect::TrapStop => &mut self.stats.trap_stops,
            Effect::TrapImpact => &mut self.stats.trap_impacts,
            Effect::AttackWindup => &mut self.stats.windups,
            Effect::PlayerHurt => &mut self.stats.player_hurts,
        };
        *counter += 1;
    }
}
