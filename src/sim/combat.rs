//! Hit resolution
//!
//! Both the player's beam and walker melee work the same way: ask the backend
//! what a probe touches, keep the nearest hit, and apply a health delta to the
//! actor behind it unless it is immune.

use std::cmp::Ordering;

use glam::Vec3;

use super::actor::{Beam, EntityRef};
use super::backend::{Backend, HitTarget, Probe, ProbeHit, layers};
use super::state::GameState;
use crate::heading_to_forward;

/// What a resolved probe did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Nothing was hit
    Miss,
    /// The nearest hit was level geometry or an actor no longer in play
    Blocked { point: Vec3 },
    /// The nearest hit was an actor that ignores damage
    Immune { target: EntityRef, point: Vec3 },
    Damaged { target: EntityRef, point: Vec3 },
}

impl Resolution {
    /// The probe struck an actor, whether or not it took damage
    pub fn landed(&self) -> bool {
        matches!(self, Resolution::Immune { .. } | Resolution::Damaged { .. })
    }

    pub fn point(&self) -> Option<Vec3> {
        match *self {
            Resolution::Miss => None,
            Resolution::Blocked { point }
            | Resolution::Immune { point, .. }
            | Resolution::Damaged { point, .. } => Some(point),
        }
    }
}

/// Nearest hit; equal distances keep the backend's order
pub fn nearest(mut hits: Vec<ProbeHit>) -> Option<ProbeHit> {
    hits.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
    hits.into_iter().next()
}

/// Apply `delta` to whatever is nearest in `hits`
pub fn apply_nearest(state: &mut GameState, hits: Vec<ProbeHit>, delta: f32) -> Resolution {
    let Some(hit) = nearest(hits) else {
        return Resolution::Miss;
    };
    let point = hit.point;

    let HitTarget::Collider(handle) = hit.target else {
        return Resolution::Blocked { point };
    };
    let Some(target) = state.lookup(handle) else {
        return Resolution::Blocked { point };
    };
    let Some(actor) = state.actor_mut(target) else {
        return Resolution::Blocked { point };
    };

    if actor.is_immune() {
        Resolution::Immune { target, point }
    } else {
        actor.on_damage(delta);
        Resolution::Damaged { target, point }
    }
}

/// Query the backend with `probe` and apply `delta` to the nearest actor
pub fn resolve<B: Backend>(
    state: &mut GameState,
    backend: &mut B,
    probe: &Probe,
    delta: f32,
) -> Resolution {
    let hits = backend.query_collisions(probe);
    apply_nearest(state, hits, delta)
}

/// One frame of the player's beam along their facing
pub fn fire_beam<B: Backend>(state: &mut GameState, backend: &mut B, dt: f32) -> Resolution {
    let origin = state.player.entity.pos;
    let dir = heading_to_forward(state.player.heading).extend(0.0);
    let probe = Probe::ray(origin, dir, layers::TARGET);
    let delta = -state.tuning.player.beam_damage_per_second * dt;

    let resolution = resolve(state, backend, &probe, delta);
    state.player.beam = resolution.point().map(|end| Beam {
        end,
        scored: matches!(resolution, Resolution::Damaged { .. }),
    });
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::backend::ProbeShape;
    use crate::sim::entity::ColliderHandle;
    use crate::sim::test_support::ScriptedBackend;
    use crate::tuning::Tuning;

    fn hit(target: HitTarget, distance: f32) -> ProbeHit {
        ProbeHit {
            target,
            distance,
            point: Vec3::new(distance, 0.0, 0.0),
        }
    }

    fn started() -> (GameState, ScriptedBackend) {
        let mut tuning = Tuning::default();
        tuning.trap.traps_per_side = 1;
        let mut state = GameState::new(11, tuning);
        let mut backend = ScriptedBackend::default();
        state.start_game(&mut backend);
        (state, backend)
    }

    #[test]
    fn nearest_sorts_by_distance() {
        let hits = vec![
            hit(HitTarget::Collider(ColliderHandle(4)), 3.0),
            hit(HitTarget::Static, 1.0),
            hit(HitTarget::Collider(ColliderHandle(2)), 2.0),
        ];
        assert_eq!(nearest(hits).unwrap().target, HitTarget::Static);
    }

    #[test]
    fn nearest_ties_keep_arrival_order() {
        let hits = vec![
            hit(HitTarget::Collider(ColliderHandle(9)), 2.0),
            hit(HitTarget::Collider(ColliderHandle(3)), 2.0),
            hit(HitTarget::Collider(ColliderHandle(5)), 2.0),
        ];
        assert_eq!(
            nearest(hits).unwrap().target,
            HitTarget::Collider(ColliderHandle(9))
        );
    }

    #[test]
    fn empty_result_is_a_miss() {
        let (mut state, _) = started();
        assert_eq!(apply_nearest(&mut state, Vec::new(), -1.0), Resolution::Miss);
        assert!(!Resolution::Miss.landed());
    }

    #[test]
    fn walls_shield_actors_behind_them() {
        let (mut state, mut backend) = started();
        let id = state.try_spawn_walker(&mut backend).unwrap();
        let handle = state.enemy(id).unwrap().entity.collider;

        let hits = vec![
            hit(HitTarget::Collider(handle), 4.0),
            hit(HitTarget::Static, 2.5),
        ];
        let res = apply_nearest(&mut state, hits, -1.0);
        assert!(matches!(res, Resolution::Blocked { .. }));
        assert_eq!(state.enemy(id).unwrap().entity.health, 3.0);
    }

    #[test]
    fn damages_the_nearest_actor_only() {
        let (mut state, mut backend) = started();
        let near = state.try_spawn_walker(&mut backend).unwrap();
        let far = state.try_spawn_walker(&mut backend).unwrap();
        let near_handle = state.enemy(near).unwrap().entity.collider;
        let far_handle = state.enemy(far).unwrap().entity.collider;

        let hits = vec![
            hit(HitTarget::Collider(far_handle), 5.0),
            hit(HitTarget::Collider(near_handle), 1.0),
        ];
        let res = apply_nearest(&mut state, hits, -1.5);

        assert_eq!(
            res,
            Resolution::Damaged {
                target: EntityRef::Enemy(near),
                point: Vec3::new(1.0, 0.0, 0.0),
            }
        );
        assert_eq!(state.enemy(near).unwrap().entity.health, 1.5);
        assert_eq!(state.enemy(far).unwrap().entity.health, 3.0);
    }

    #[test]
    fn traps_absorb_hits() {
        let (mut state, _) = started();
        let trap = &state.traps[0];
        let (trap_id, handle) = (trap.id(), trap.entity.collider);

        let res = apply_nearest(&mut state, vec![hit(HitTarget::Collider(handle), 1.0)], -50.0);
        assert_eq!(
            res,
            Resolution::Immune {
                target: EntityRef::Trap(trap_id),
                point: Vec3::new(1.0, 0.0, 0.0),
            }
        );
        assert!(res.landed());
        assert_eq!(state.traps[0].entity.health, 100.0);
    }

    #[test]
    fn unknown_collider_is_blocked() {
        let (mut state, _) = started();
        let res = apply_nearest(
            &mut state,
            vec![hit(HitTarget::Collider(ColliderHandle(999)), 1.0)],
            -1.0,
        );
        assert!(matches!(res, Resolution::Blocked { .. }));
    }

    #[test]
    fn beam_scales_with_dt_and_follows_heading() {
        let (mut state, mut backend) = started();
        let id = state.try_spawn_walker(&mut backend).unwrap();
        let handle = state.enemy(id).unwrap().entity.collider;
        state.player.heading = -90.0; // facing +X

        backend.hits.push_back(vec![hit(HitTarget::Collider(handle), 3.0)]);
        let res = fire_beam(&mut state, &mut backend, 0.1);

        assert!(matches!(res, Resolution::Damaged { .. }));
        assert!((state.enemy(id).unwrap().entity.health - 2.5).abs() < 1e-5);
        let beam = state.player.beam.unwrap();
        assert!(beam.scored);
        assert_eq!(beam.end, Vec3::new(3.0, 0.0, 0.0));

        let probe = backend.queries.last().unwrap();
        assert_eq!(probe.mask, layers::TARGET);
        let ProbeShape::Ray { origin, dir } = probe.shape else {
            panic!("beam must be a ray");
        };
        assert_eq!(origin, Vec3::ZERO);
        assert!((dir - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn beam_into_nothing_is_hidden() {
        let (mut state, mut backend) = started();
        assert_eq!(fire_beam(&mut state, &mut backend, 0.016), Resolution::Miss);
        assert!(state.player.beam.is_none());
    }
}
