//! Collision geometry for the headless backend
//!
//! Actors are spheres of one radius, the arena is a square bounded by four
//! wall tubes. Everything the probes need is a ray/sphere or ray/plane test.

use glam::Vec3;

use crate::consts::{ARENA_HALF_EXTENT, COLLIDER_RADIUS, WALL_RADIUS};

/// Inner face of every wall
pub const WALL_FACE: f32 = ARENA_HALF_EXTENT - WALL_RADIUS;

/// Furthest a body center may go along either axis
pub const BODY_LIMIT: f32 = WALL_FACE - COLLIDER_RADIUS;

/// Slack for "resting against" checks
const TOUCH_EPSILON: f32 = 1e-4;

/// One of the four arena walls
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Wall {
    East,
    West,
    North,
    South,
}

impl Wall {
    pub const ALL: [Wall; 4] = [Wall::East, Wall::West, Wall::North, Wall::South];

    /// Outward normal of the wall's inner face
    pub fn normal(self) -> Vec3 {
        match self {
            Wall::East => Vec3::X,
            Wall::West => Vec3::NEG_X,
            Wall::North => Vec3::Y,
            Wall::South => Vec3::NEG_Y,
        }
    }
}

/// Signed distance from `p` to a sphere's surface
#[inline]
pub fn sd_sphere(p: Vec3, center: Vec3, radius: f32) -> f32 {
    (p - center).length() - radius
}

/// Distance along a unit `dir` to where the ray enters the sphere.
///
/// A ray starting inside the sphere hits it at distance zero.
pub fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let to_center = center - origin;
    let c = to_center.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }

    let b = to_center.dot(dir);
    if b <= 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    Some(b - discriminant.sqrt())
}

/// Distance along a unit `dir` to the nearest wall face, and which wall
pub fn ray_walls(origin: Vec3, dir: Vec3) -> Option<(f32, Wall)> {
    Wall::ALL
        .into_iter()
        .filter_map(|wall| {
            let normal = wall.normal();
            let approach = dir.dot(normal);
            if approach <= 0.0 {
                return None;
            }
            let t = (WALL_FACE - origin.dot(normal)).max(0.0) / approach;
            Some((t, wall))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
}

/// Keep a body center inside the arena
pub fn clamp_to_arena(pos: Vec3) -> Vec3 {
    Vec3::new(
        pos.x.clamp(-BODY_LIMIT, BODY_LIMIT),
        pos.y.clamp(-BODY_LIMIT, BODY_LIMIT),
        pos.z,
    )
}

/// Walls a body at `pos` is resting against
pub fn touching_walls(pos: Vec3) -> impl Iterator<Item = Wall> {
    Wall::ALL
        .into_iter()
        .filter(move |wall| pos.dot(wall.normal()) >= BODY_LIMIT - TOUCH_EPSILON)
}

/// Whether two bodies overlap
#[inline]
pub fn bodies_touch(a: Vec3, b: Vec3) -> bool {
    sd_sphere(a, b, 2.0 * COLLIDER_RADIUS) < 0.0
}
