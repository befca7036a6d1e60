//! Recording backend for unit tests

use std::collections::{BTreeSet, VecDeque};

use glam::Vec3;

use super::backend::{ActorKind, Backend, Contact, Effect, Probe, ProbeHit};
use super::entity::ColliderHandle;

/// Records every call and answers queries from scripted queues.
///
/// Death presentations finish only for handles in `death_complete`; spawn
/// presentations are finished unless the handle is in `spawning`.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    pub spawned: Vec<(ColliderHandle, ActorKind, Vec3)>,
    pub released: Vec<ColliderHandle>,
    pub deaths_started: Vec<ColliderHandle>,
    pub death_complete: BTreeSet<ColliderHandle>,
    pub spawning: BTreeSet<ColliderHandle>,
    pub queries: Vec<Probe>,
    /// One entry popped per query; an empty queue means no hits
    pub hits: VecDeque<Vec<ProbeHit>>,
    /// Handed out on the next `drain_contacts`
    pub contacts: Vec<Contact>,
    pub effects: Vec<(ColliderHandle, Effect)>,
}

impl Backend for ScriptedBackend {
    fn spawn_presentation(&mut self, handle: ColliderHandle, kind: ActorKind, pos: Vec3) {
        self.spawned.push((handle, kind, pos));
    }

    fn release_presentation(&mut self, handle: ColliderHandle) {
        self.released.push(handle);
    }

    fn begin_death_presentation(&mut self, handle: ColliderHandle) {
        self.deaths_started.push(handle);
    }

    fn is_spawn_presentation_complete(&self, handle: ColliderHandle) -> bool {
        !self.spawning.contains(&handle)
    }

    fn is_death_presentation_complete(&self, handle: ColliderHandle) -> bool {
        self.death_complete.contains(&handle)
    }

    fn query_collisions(&mut self, probe: &Probe) -> Vec<ProbeHit> {
        self.queries.push(*probe);
        self.hits.pop_front().unwrap_or_default()
    }

    fn drain_contacts(&mut self) -> Vec<Contact> {
        std::mem::take(&mut self.contacts)
    }

    fn effect(&mut self, handle: ColliderHandle, effect: Effect) {
        self.effects.push((handle, effect));
    }
}
