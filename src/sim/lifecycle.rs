//! Dead walkers linger until the backend finishes their death presentation

use super::actor::Enemy;
use super::backend::Backend;
use super::entity::EntityId;

/// A walker whose death presentation is playing
#[derive(Debug, Clone)]
pub struct Dying {
    pub enemy: Enemy,
    /// Seconds since death
    pub elapsed: f32,
}

/// Hand a freshly killed walker to the backend's death presentation
pub fn begin_dying<B: Backend>(mut enemy: Enemy, backend: &mut B) -> Dying {
    enemy.entity.vel = glam::Vec3::ZERO;
    enemy.entity.walking = false;
    backend.begin_death_presentation(enemy.entity.collider);
    Dying {
        enemy,
        elapsed: 0.0,
    }
}

/// Release every dying walker whose presentation has finished.
///
/// With a `timeout`, a presentation that runs longer is released anyway.
/// Returns the ids released this call.
pub fn reap<B: Backend>(
    dying: &mut Vec<Dying>,
    backend: &mut B,
    dt: f32,
    timeout: Option<f32>,
) -> Vec<EntityId> {
    let mut released = Vec::new();
    dying.retain_mut(|d| {
        d.elapsed += dt;
        let handle = d.enemy.entity.collider;
        let complete = backend.is_death_presentation_complete(handle);
        let expired = timeout.is_some_and(|limit| d.elapsed >= limit);
        if !complete && !expired {
            return true;
        }
        if !complete {
            log::warn!(
                "Death presentation for enemy {} still running after {:.2}s; releasing",
                d.enemy.id().0,
                d.elapsed
            );
        }
        backend.release_presentation(handle);
        released.push(d.enemy.id());
        false
    });
    released
}
