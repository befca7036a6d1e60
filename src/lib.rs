//! Endless Horde - simulation core of a top-down arena shooter
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (entities, AI, combat, spawning, lifecycle)
//! - `platform`: Headless stand-in for the host engine, plus the autopilot
//! - `tuning`: Data-driven game balance
//! - `highscores`: Local leaderboard
//! - `logging`: env_logger setup for the runner binary

pub mod error;
pub mod highscores;
pub mod logging;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use error::StorageError;
pub use highscores::HighScores;
pub use tuning::Tuning;

use glam::{Vec2, Vec3};

/// Arena geometry constants
pub mod consts {
    /// Walls sit on the lines x = ±8 and y = ±8
    pub const ARENA_HALF_EXTENT: f32 = 8.0;
    /// Wall thickness (radius of the wall tubes)
    pub const WALL_RADIUS: f32 = 0.2;
    /// Every actor collides as a sphere of this radius
    pub const COLLIDER_RADIUS: f32 = 0.3;

    /// Spawn points and traps are laid out on the lines x = ±7 and y = ±7
    pub const SPAWN_LINE: f32 = 7.0;
    pub const SPAWN_POINTS_PER_WALL: usize = 5;

    /// Distance between candidate trap slots along a wall
    pub const TRAP_SLOT_SPACING: f32 = 0.4;
    /// Slots this close to the wall's midpoint are never used
    pub const TRAP_SLOT_CLEARANCE: f32 = 1.0;
}

/// Project a world position or direction onto the ground plane.
#[inline]
pub fn planar(v: Vec3) -> Vec2 {
    v.truncate()
}

/// Heading in degrees for a ground-plane direction.
///
/// Zero faces +Y; positive angles turn counter-clockwise. A zero vector yields
/// a zero heading.
#[inline]
pub fn heading_toward(dir: Vec2) -> f32 {
    if dir.length_squared() <= f32::EPSILON {
        return 0.0;
    }
    Vec2::Y.perp_dot(dir).atan2(Vec2::Y.dot(dir)).to_degrees()
}

/// Unit forward vector on the ground plane for a heading in degrees
#[inline]
pub fn heading_to_forward(heading: f32) -> Vec2 {
    let radians = heading.to_radians();
    Vec2::new(-radians.sin(), radians.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_zero_faces_positive_y() {
        assert!(heading_toward(Vec2::new(0.0, 3.0)).abs() < 1e-4);
    }

    #[test]
    fn heading_is_counter_clockwise() {
        assert!((heading_toward(Vec2::new(-1.0, 0.0)) - 90.0).abs() < 1e-4);
        assert!((heading_toward(Vec2::new(1.0, 0.0)) + 90.0).abs() < 1e-4);
    }

    #[test]
    fn heading_round_trips_through_forward() {
        let dir = Vec2::new(0.6, -0.8);
        let forward = heading_to_forward(heading_toward(dir));
        assert!((forward - dir).length() < 1e-4);
    }

    #[test]
    fn heading_of_zero_vector_is_zero() {
        assert_eq!(heading_toward(Vec2::ZERO), 0.0);
    }
}
