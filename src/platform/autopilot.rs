//! Demo-mode player
//!
//! Picks the closest walker, aims at it and holds the beam. Backs off when a
//! walker gets close and steps out of any trap's lane.

use glam::Vec2;

use crate::planar;
use crate::sim::{FrameInput, GameState};

/// Walkers closer than this make the autopilot retreat
const RETREAT_DISTANCE: f32 = 2.0;
/// Stay this far from the center when nothing is pressing
const HOME_RADIUS: f32 = 3.0;
/// Extra margin kept outside a trap's detection lane
const LANE_MARGIN: f32 = 0.3;
/// Axis deadzone when turning a direction into key presses
const DEADZONE: f32 = 0.2;

/// Input for the next frame
pub fn autopilot(state: &GameState) -> FrameInput {
    let me = planar(state.player.entity.pos);

    let target = state
        .enemies
        .iter()
        .filter(|e| !e.spawning)
        .map(|e| planar(e.entity.pos))
        .min_by(|a, b| a.distance_squared(me).total_cmp(&b.distance_squared(me)));

    let mut steer = Vec2::ZERO;
    match target {
        Some(pos) if pos.distance(me) < RETREAT_DISTANCE => steer += me - pos,
        _ if me.length() > HOME_RADIUS => steer -= me,
        _ => {}
    }

    let band = state.tuning.trap.detection_band + LANE_MARGIN;
    for trap in &state.traps {
        let Some(brain) = trap.trap_brain() else {
            continue;
        };
        let offset = state.player.entity.pos - trap.entity.pos;
        let across = brain.axis.across(offset);
        if across.abs() < band {
            // push sideways out of the lane
            let across_unit = Vec2::ONE - brain.axis.unit().truncate();
            let away = across_unit * across.signum();
            steer += away * band;
        }
    }

    let mut input = press_toward(steer);
    if let Some(pos) = target {
        input.aim = Some(pos);
        input.shoot = true;
    }
    input
}

fn press_toward(dir: Vec2) -> FrameInput {
    FrameInput {
        up: dir.y > DEADZONE,
        down: dir.y < -DEADZONE,
        left: dir.x < -DEADZONE,
        right: dir.x > DEADZONE,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SlideAxis;
    use crate::sim::test_support::ScriptedBackend;
    use crate::tuning::Tuning;
    use glam::Vec3;

    fn started() -> (GameState, ScriptedBackend) {
        let mut tuning = Tuning::default();
        tuning.trap.traps_per_side = 0;
        let mut state = GameState::new(8, tuning);
        let mut backend = ScriptedBackend::default();
        state.start_game(&mut backend);
        (state, backend)
    }

    #[test]
    fn test_idle_when_alone_at_home() {
        let (state, _) = started();
        assert_eq!(autopilot(&state), FrameInput::default());
    }

    #[test]
    fn test_aims_and_fires_at_closest_walker() {
        let (mut state, mut backend) = started();
        for pos in [Vec3::new(5.0, 5.0, 0.0), Vec3::new(-3.0, 0.0, 0.0)] {
            let id = state.try_spawn_walker(&mut backend).unwrap();
            let w = state.enemies.iter_mut().find(|e| e.id() == id).unwrap();
            w.entity.pos = pos;
            w.spawning = false;
        }
        let input = autopilot(&state);
        assert!(input.shoot);
        assert_eq!(input.aim, Some(Vec2::new(-3.0, 0.0)));
        assert!(!input.left && !input.right);
    }

    #[test]
    fn test_retreats_from_close_walker() {
        let (mut state, mut backend) = started();
        let id = state.try_spawn_walker(&mut backend).unwrap();
        let w = state.enemies.iter_mut().find(|e| e.id() == id).unwrap();
        w.entity.pos = Vec3::new(1.0, 0.0, 0.0);
        w.spawning = false;

        let input = autopilot(&state);
        assert!(input.left);
        assert!(!input.right);
    }

    #[test]
    fn test_steps_out_of_trap_lane() {
        let (mut state, mut backend) = started();
        state.add_trap(Vec3::new(7.0, 0.2, 0.0), SlideAxis::X, &mut backend);

        let input = autopilot(&state);
        // trap lane is y = 0.2; the player at the origin moves down out of it
        assert!(input.down);
        assert!(!input.up);
    }
}
