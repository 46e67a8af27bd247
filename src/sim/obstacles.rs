//! Flying obstacles
//!
//! Obstacles spawn just off the right edge of the viewport and drift left
//! while following a waveform. Position is a pure function of the time since
//! spawn, so replays with the same seed and timestamps line up exactly.

use std::f32::consts::{FRAC_2_PI, TAU};

use glam::Vec2;
use rand::Rng;

use super::foes;
use super::geom::circle_rect_overlap;
use super::level::Level;
use super::state::{Obstacle, ObstaclePattern, Session};
use crate::consts::DEATH_MARGIN;
use crate::tuning::ObstacleTuning;

/// Highest spawn line, in pixels from the top of the level
const SPAWN_TOP: f32 = 80.0;
/// Clearance kept between the spawn band and the floor
const FLOOR_CLEARANCE: f32 = 120.0;
/// Spawn distance past the right edge of the viewport
const SPAWN_AHEAD: f32 = 60.0;

pub fn update(
    s: &mut Session,
    tuning: &ObstacleTuning,
    viewport: Vec2,
    level: &Level,
    now_ms: f64,
) {
    maybe_spawn(s, tuning, viewport, level, now_ms);

    for obstacle in s.obstacles.iter_mut() {
        obstacle.pos = position_at(obstacle, tuning, now_ms);
    }

    let body = s.player.rect();
    let hit = s
        .obstacles
        .iter()
        .position(|o| circle_rect_overlap(o.pos, o.radius, &body));
    if let Some(i) = hit {
        let obstacle = s.obstacles.remove(i);
        foes::hurt(s, obstacle.pos, now_ms);
    }

    let min_x = s.camera.x - DEATH_MARGIN;
    let (min_y, max_y) = (-DEATH_MARGIN, level.height + DEATH_MARGIN);
    s.obstacles
        .retain(|o| o.pos.x + o.radius >= min_x && (min_y..=max_y).contains(&o.pos.y));
}

fn maybe_spawn(
    s: &mut Session,
    tuning: &ObstacleTuning,
    viewport: Vec2,
    level: &Level,
    now_ms: f64,
) {
    let full = s.obstacles.len() as u32 >= tuning.max_active;
    if full || now_ms - s.last_obstacle_ms < tuning.spawn_interval_ms {
        return;
    }

    let mut rng = s.rng_state.next_rng();
    let lowest = (level.ground_top() - FLOOR_CLEARANCE).max(SPAWN_TOP);
    let y = if lowest > SPAWN_TOP { rng.random_range(SPAWN_TOP..lowest) } else { SPAWN_TOP };
    let pattern = match rng.random_range(0..3u8) {
        0 => ObstaclePattern::Sine,
        1 => ObstaclePattern::ZigZag,
        _ => ObstaclePattern::Orbit,
    };

    let origin = Vec2::new(s.camera.x + viewport.x + SPAWN_AHEAD, y);
    let id = s.next_entity_id();
    s.obstacles.push(Obstacle {
        id,
        pattern,
        origin,
        pos: origin,
        radius: tuning.radius,
        spawn_ms: now_ms,
    });
    s.last_obstacle_ms = now_ms;
    log::debug!("Spawned {:?} obstacle {} at y {:.0}", pattern, id, y);
}

/// Obstacle center at `now_ms`
pub fn position_at(obstacle: &Obstacle, tuning: &ObstacleTuning, now_ms: f64) -> Vec2 {
    let t = ((now_ms - obstacle.spawn_ms) / 1000.0).max(0.0) as f32;
    let phase = TAU * tuning.frequency * t;
    let amp = tuning.amplitude;
    let drift = Vec2::new(obstacle.origin.x - tuning.speed * t, obstacle.origin.y);

    match obstacle.pattern {
        ObstaclePattern::Sine => drift + Vec2::new(0.0, amp * phase.sin()),
        ObstaclePattern::ZigZag => drift + Vec2::new(0.0, amp * FRAC_2_PI * phase.sin().asin()),
        // Starts on the origin, then circles it laterally and vertically
        ObstaclePattern::Orbit => {
            drift + Vec2::new(0.5 * amp * (phase.cos() - 1.0), 0.5 * amp * phase.sin())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::START_LIVES;
    use crate::sim::level;
    use crate::sim::tick::{TickInput, tick};
    use crate::tuning::Tuning;

    const VIEWPORT: Vec2 = Vec2::new(960.0, 540.0);

    fn enabled() -> ObstacleTuning {
        Tuning::default().with_obstacles().obstacles
    }

    fn obstacle(pattern: ObstaclePattern, origin: Vec2, spawn_ms: f64) -> Obstacle {
        Obstacle { id: 1, pattern, origin, pos: origin, radius: 12.0, spawn_ms }
    }

    fn run(s: &mut Session, tuning: &ObstacleTuning, from_ms: f64, to_ms: f64, step_ms: f64) {
        let lvl = level::level(s.level_index).unwrap();
        let mut now = from_ms;
        while now <= to_ms {
            update(s, tuning, VIEWPORT, lvl, now);
            now += step_ms;
        }
    }

    #[test]
    fn test_spawns_are_deterministic() {
        let tuning = enabled();
        let mut a = Session::new(1, 0.0);
        let mut b = Session::new(1, 0.0);
        run(&mut a, &tuning, 0.0, 6000.0, 50.0);
        run(&mut b, &tuning, 0.0, 6000.0, 50.0);

        assert!(!a.obstacles.is_empty());
        assert_eq!(
            serde_json::to_string(&a.obstacles).unwrap(),
            serde_json::to_string(&b.obstacles).unwrap()
        );
    }

    #[test]
    fn test_active_cap_and_interval() {
        let tuning = ObstacleTuning { spawn_interval_ms: 400.0, max_active: 2, ..enabled() };
        let mut s = Session::new(0, 0.0);

        run(&mut s, &tuning, 0.0, 300.0, 100.0);
        assert!(s.obstacles.is_empty());

        run(&mut s, &tuning, 400.0, 3000.0, 100.0);
        assert_eq!(s.obstacles.len(), 2);
        assert!(s.obstacles.iter().all(|o| o.pos.x > s.player.pos.x));
    }

    #[test]
    fn test_spawn_band_stays_above_floor() {
        let tuning = ObstacleTuning { spawn_interval_ms: 400.0, max_active: 16, ..enabled() };
        let mut s = Session::new(2, 0.0);
        let floor = level::level(2).unwrap().ground_top();
        let lvl = level::level(2).unwrap();

        for i in 1..=16 {
            update(&mut s, &tuning, VIEWPORT, lvl, i as f64 * 400.0);
            let newest = s.obstacles.last().unwrap();
            assert!(newest.origin.y >= SPAWN_TOP);
            assert!(newest.origin.y <= floor - FLOOR_CLEARANCE);
            assert_eq!(newest.origin.x, s.camera.x + VIEWPORT.x + SPAWN_AHEAD);
        }
    }

    #[test]
    fn test_waveforms() {
        let tuning = ObstacleTuning { frequency: 1.0, amplitude: 40.0, speed: 100.0, ..enabled() };
        let origin = Vec2::new(500.0, 200.0);

        for pattern in [ObstaclePattern::Sine, ObstaclePattern::ZigZag, ObstaclePattern::Orbit] {
            let o = obstacle(pattern, origin, 1000.0);
            assert!(position_at(&o, &tuning, 1000.0).distance(origin) < 1e-3);
        }

        // Quarter period: both bobbing patterns peak
        let sine = obstacle(ObstaclePattern::Sine, origin, 0.0);
        let zig = obstacle(ObstaclePattern::ZigZag, origin, 0.0);
        assert!((position_at(&sine, &tuning, 250.0).y - 240.0).abs() < 1e-2);
        assert!((position_at(&zig, &tuning, 250.0).y - 240.0).abs() < 0.05);
        assert!((position_at(&sine, &tuning, 250.0).x - 475.0).abs() < 1e-2);

        // Eighth period: the zig-zag is linear, the sine is not
        assert!((position_at(&zig, &tuning, 125.0).y - 220.0).abs() < 1e-2);
        assert!(position_at(&sine, &tuning, 125.0).y > 225.0);

        // Half period: orbit is a full amplitude to the left of the drift line
        let orbit = obstacle(ObstaclePattern::Orbit, origin, 0.0);
        let p = position_at(&orbit, &tuning, 500.0);
        assert!((p.x - (origin.x - 50.0 - 40.0)).abs() < 1e-2);
        assert!((p.y - origin.y).abs() < 1e-2);
    }

    #[test]
    fn test_overlap_hurts_and_removes() {
        let tuning = enabled();
        let mut s = Session::new(0, 0.0);
        s.last_obstacle_ms = 1000.0;
        let center = s.player.center();
        s.obstacles.push(obstacle(ObstaclePattern::Sine, center, 1000.0));

        update(&mut s, &tuning, VIEWPORT, level::level(0).unwrap(), 1000.0);
        assert!(s.obstacles.is_empty());
        assert_eq!(s.lives, START_LIVES - 1);
    }

    #[test]
    fn test_far_obstacles_are_culled() {
        let tuning = enabled();
        let mut s = Session::new(0, 0.0);
        s.last_obstacle_ms = 0.0;
        s.obstacles.push(obstacle(ObstaclePattern::Sine, Vec2::new(-1000.0, 200.0), 0.0));
        s.obstacles.push(obstacle(ObstaclePattern::Sine, Vec2::new(700.0, 2000.0), 0.0));

        update(&mut s, &tuning, VIEWPORT, level::level(0).unwrap(), 10.0);
        assert!(s.obstacles.is_empty());
        assert_eq!(s.lives, START_LIVES);
    }

    #[test]
    fn test_disabled_tuning_clears_obstacles() {
        let mut s = Session::new(0, 0.0);
        s.obstacles.push(obstacle(ObstaclePattern::Orbit, Vec2::new(700.0, 200.0), 0.0));
        let s = tick(&s, &TickInput::default(), 16.0);
        assert!(s.obstacles.is_empty());
    }
}
