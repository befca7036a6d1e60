//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay engine-agnostic:
//! - Everything the engine does goes through the [`Backend`] trait
//! - Seeded RNG only
//! - Stable iteration order (insertion order, ids allocated monotonically)
//! - No rendering, audio or input device dependencies

pub mod actor;
pub mod ai;
pub mod backend;
pub mod combat;
pub mod entity;
pub mod lifecycle;
pub mod state;
pub mod tick;

#[cfg(test)]
pub(crate) mod test_support;

pub use actor::{Actor, AttackState, Beam, Enemy, EnemyPolicy, EntityRef, Player, SlideAxis};
pub use backend::{ActorKind, Backend, Contact, Effect, HitTarget, Probe, ProbeHit, ProbeShape};
pub use combat::Resolution;
pub use entity::{ColliderHandle, Entity, EntityId};
pub use lifecycle::Dying;
pub use state::{Difficulty, GameEvent, GamePhase, GameState};
pub use tick::{FrameInput, tick};
