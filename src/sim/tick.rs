//! Fixed timestep simulation tick
//!
//! Advances a session by exactly one physics step. Stages run in a fixed
//! order and each one works on what the previous stage left behind:
//! player movement first, then pickups, props, foes, obstacles, and finally
//! the derived values (efficiency, exit, camera).

use glam::Vec2;

use super::foes;
use super::geom::{
    Axis, Rect, circle_rect_overlap, is_grounded, overlaps_any, rects_overlap, sweep_axis,
};
use super::level::{self, CollectibleKind, Level};
use super::obstacles;
use super::props;
use super::state::{GameEvent, Player, Session};
use crate::clamp_span;
use crate::consts::*;
use crate::tuning::Tuning;

/// Single-shot inputs, cleared by the driver after one consumed step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeEvents {
    /// Jump pressed since the last consumed step
    pub jump: bool,
    /// Pick up / release / open the nearest prop
    pub interact: bool,
    /// Cycle the nearest prop's color
    pub recolor: bool,
    /// Cycle the nearest prop's material
    pub rematerial: bool,
}

impl EdgeEvents {
    pub fn any(&self) -> bool {
        self.jump || self.interact || self.recolor || self.rematerial
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Input for a single tick (deterministic)
#[derive(Debug, Clone)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Jump button held (glide); a rising edge also counts as a press
    pub jump: bool,
    /// Down / crouch held
    pub down: bool,
    pub run: bool,
    pub edges: EdgeEvents,
    pub tuning: Tuning,
    /// Viewport size, for camera framing and obstacle spawn distance
    pub viewport: Vec2,
    /// Sub-step length in seconds
    pub dt: f32,
}

impl Default for TickInput {
    fn default() -> Self {
        Self {
            left: false,
            right: false,
            jump: false,
            down: false,
            run: false,
            edges: EdgeEvents::default(),
            tuning: Tuning::default(),
            viewport: Vec2::new(960.0, 540.0),
            dt: SIM_DT,
        }
    }
}

/// Advance the session by one fixed timestep
///
/// The input session is left untouched; the returned value is the next state.
/// A fatal fall with lives remaining returns a brand new session for the
/// same level.
pub fn tick(session: &Session, input: &TickInput, now_ms: f64) -> Session {
    let mut s = session.clone();
    s.events.clear();
    s.clock.now_ms = now_ms;

    // Paused or finished: clock and timers only
    if s.paused || s.is_terminal() {
        expire_timed(&mut s, now_ms);
        return s;
    }

    let Some(level) = level::level(s.level_index) else {
        log::warn!("Session references unknown level {}", s.level_index);
        return s;
    };

    let dt = input.dt.max(0.0);
    s.clock.elapsed_ms += dt as f64 * 1000.0;
    let solids = s.platforms.clone();

    // --- PLAYER ---
    update_crouch(&mut s.player, input, &solids);
    apply_horizontal_intent(&mut s.player, input, now_ms, dt);
    apply_jump(&mut s, input);
    integrate_vertical(&mut s.player, input, now_ms, dt);
    move_horizontal(&mut s.player, &solids, dt);
    move_vertical(&mut s.player, &solids, now_ms, dt);

    if let Some(respawned) = apply_world_bounds(&mut s, level, input.viewport, now_ms) {
        return respawned;
    }
    if s.game_over {
        expire_timed(&mut s, now_ms);
        return s;
    }

    // --- WORLD ---
    collect_pickups(&mut s, now_ms);
    props::update(&mut s, input, &solids, level, dt);
    foes::update(&mut s, level, &solids, now_ms, dt);
    if input.tuning.obstacles.enabled {
        obstacles::update(&mut s, &input.tuning.obstacles, input.viewport, level, now_ms);
    } else {
        s.obstacles.clear();
    }

    // --- DERIVED ---
    s.efficiency = efficiency(&s);
    check_exit(&mut s, level, now_ms);
    update_camera(&mut s, level, input.viewport);
    expire_timed(&mut s, now_ms);

    s
}

/// Shrink the hitbox while crouching; only stand up where there is headroom
fn update_crouch(player: &mut Player, input: &TickInput, solids: &[Rect]) {
    let shrink = PLAYER_HEIGHT - PLAYER_CROUCH_HEIGHT;

    if input.down && player.on_ground && !player.crouching {
        // Feet stay where they are
        player.pos.y += shrink;
        player.size.y = PLAYER_CROUCH_HEIGHT;
        player.crouching = true;
    } else if !input.down && player.crouching {
        let standing = Rect::new(player.pos.x, player.pos.y - shrink, player.size.x, PLAYER_HEIGHT);
        if !overlaps_any(&standing, solids) {
            player.pos.y -= shrink;
            player.size.y = PLAYER_HEIGHT;
            player.crouching = false;
        }
    }
}

#[inline]
fn approach(current: f32, target: f32, step: f32) -> f32 {
    if current < target {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}

fn apply_horizontal_intent(player: &mut Player, input: &TickInput, now_ms: f64, dt: f32) {
    let dir = match (input.left, input.right) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    };

    let mut top_speed = BASE_SPEED;
    if input.run {
        top_speed *= RUN_MULTIPLIER;
    }
    if player.speed_active(now_ms) {
        top_speed *= SPEED_BUFF_MULTIPLIER;
    }
    if player.crouching {
        top_speed *= CROUCH_SPEED_MULTIPLIER;
    }

    if dir != 0.0 {
        player.facing = dir;
        // Reversing uses the faster deceleration rate
        let rate = if player.vel.x * dir < 0.0 { DECEL } else { ACCEL };
        player.vel.x = approach(player.vel.x, dir * top_speed, rate * dt);
    } else {
        player.vel.x = approach(player.vel.x, 0.0, DECEL * dt);
    }

    player.vel.x = player.vel.x.clamp(-top_speed, top_speed);
}

fn apply_jump(s: &mut Session, input: &TickInput) {
    let player = &mut s.player;
    let pressed = input.edges.jump || (input.jump && !player.jump_held);
    player.jump_held = input.jump;
    if !pressed {
        return;
    }

    if player.on_ground {
        player.on_ground = false;
    } else if player.air_jumps > 0 {
        player.air_jumps -= 1;
    } else {
        return;
    }

    player.vel.y = -JUMP_VELOCITY;
    player.jumps_used += 1;
    s.events.push(GameEvent::Jumped);
}

fn integrate_vertical(player: &mut Player, input: &TickInput, now_ms: f64, dt: f32) {
    let gliding = player.glide_active(now_ms) && input.jump && player.vel.y > 0.0;
    let scale = if gliding { GLIDE_GRAVITY_SCALE } else { 1.0 };
    let max_fall = if gliding { GLIDE_MAX_FALL_SPEED } else { MAX_FALL_SPEED };

    player.vel.y += GRAVITY * player.gravity_scale * scale * dt;
    player.vel.y = player.vel.y.clamp(-MAX_RISE_SPEED, max_fall);
}

/// Horizontal move with stair stepping
fn move_horizontal(player: &mut Player, solids: &[Rect], dt: f32) {
    let dx = player.vel.x * dt;
    if dx == 0.0 {
        return;
    }

    let start = player.rect();
    let mut rect = start;
    let hit = sweep_axis(&mut rect, solids, Axis::X, dx);

    if hit.hit {
        let mut stepped = false;
        if player.on_ground && !player.crouching {
            let mut raised = start.translated(Vec2::new(dx, -STEP_HEIGHT));
            if !overlaps_any(&raised, solids) {
                // Settle onto the step top
                sweep_axis(&mut raised, solids, Axis::Y, STEP_HEIGHT);
                rect = raised;
                stepped = true;
            }
        }
        if !stepped {
            player.vel.x = 0.0;
        }
    }

    player.pos = rect.pos();
}

fn move_vertical(player: &mut Player, solids: &[Rect], now_ms: f64, dt: f32) {
    let mut rect = player.rect();
    let hit = sweep_axis(&mut rect, solids, Axis::Y, player.vel.y * dt);
    player.pos = rect.pos();

    if hit.ground {
        player.vel.y = 0.0;
        player.on_ground = true;
        player.air_jumps = player.air_jump_allowance(now_ms);
    } else if hit.ceiling {
        player.vel.y = player.vel.y.max(0.0);
        player.on_ground = false;
    } else {
        // No contact event this step; reconfirm resting contact
        player.on_ground = player.vel.y >= 0.0 && is_grounded(&rect, solids);
        if player.on_ground {
            player.vel.y = 0.0;
            player.air_jumps = player.air_jump_allowance(now_ms);
        }
    }
}

/// Clamp to the level and handle the death plane
///
/// Returns a replacement session when a fall costs a life but lives remain.
fn apply_world_bounds(
    s: &mut Session,
    level: &Level,
    viewport: Vec2,
    now_ms: f64,
) -> Option<Session> {
    let max_x = (level.width - s.player.size.x).max(0.0);
    if s.player.pos.x < 0.0 || s.player.pos.x > max_x {
        s.player.pos.x = s.player.pos.x.clamp(0.0, max_x);
        s.player.vel.x = 0.0;
    }

    if s.player.pos.y <= level.height + DEATH_MARGIN {
        return None;
    }

    s.lives = s.lives.saturating_sub(1);
    s.player.shield = 0;
    s.events.push(GameEvent::LifeLost);

    if s.lives == 0 {
        s.game_over = true;
        s.events.push(GameEvent::GameOver);
        log::info!("Game over on level {} (fell)", s.level_index);
        return None;
    }

    log::info!("Fell out of level {}, {} lives left", s.level_index, s.lives);
    let mut next = Session::carry_over(s.level_index, now_ms, s.lives, s.total_score);
    next.show_message(format!("Watch your step! Lives left: {}", next.lives), now_ms);
    next.events.push(GameEvent::LifeLost);
    update_camera(&mut next, level, viewport);
    Some(next)
}

fn collect_pickups(s: &mut Session, now_ms: f64) {
    let body = s.player.rect();
    let picked: Vec<usize> = s
        .collectibles
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.taken && circle_rect_overlap(c.pos, COLLECT_RADIUS, &body))
        .map(|(i, _)| i)
        .collect();

    for i in picked {
        s.collectibles[i].taken = true;
        let kind = s.collectibles[i].kind;
        let pos = s.collectibles[i].pos;

        s.combo = match s.last_pickup_ms {
            Some(last) if now_ms - last <= COMBO_WINDOW_MS => (s.combo + 1).min(COMBO_CAP),
            _ => 1,
        };
        s.last_pickup_ms = Some(now_ms);

        let points = kind.base_score() * s.combo as u64;
        s.score += points;
        s.eco_boost = (s.eco_boost + ECO_BOOST_PER_PICKUP).min(ECO_BOOST_CAP);
        apply_buff(s, kind, now_ms);

        let label = if s.combo > 1 {
            format!("{} +{} x{}", kind.glyph(), points, s.combo)
        } else {
            format!("{} +{}", kind.glyph(), points)
        };
        s.push_effect(label, pos, now_ms);
        s.events.push(GameEvent::Collected(kind));
    }
}

fn apply_buff(s: &mut Session, kind: CollectibleKind, now_ms: f64) {
    let player = &mut s.player;
    match kind {
        CollectibleKind::Seed => {}
        CollectibleKind::Droplet => player.speed_until = now_ms + SPEED_BUFF_MS,
        CollectibleKind::Leaf => player.glide_until = now_ms + GLIDE_BUFF_MS,
        CollectibleKind::Feather => {
            player.double_jump_until = now_ms + DOUBLE_JUMP_BUFF_MS;
            player.air_jumps = player.air_jumps.max(BUFFED_AIR_JUMPS);
        }
        CollectibleKind::Acorn => player.shield = (player.shield + 1).min(MAX_SHIELD),
        CollectibleKind::Heart => {
            if s.lives < MAX_LIVES {
                s.lives += 1;
            } else {
                player.shield = (player.shield + 1).min(MAX_SHIELD);
            }
        }
    }
}

/// Efficiency score (0-100)
///
/// Rewards collection and defeats; time, hits and excess jumping cost points.
pub fn efficiency(s: &Session) -> f32 {
    let player = &s.player;
    let collected = s.collected_count() as f32;
    let extra_jumps = player.jumps_used.saturating_sub(12) as f32;

    let raw = 100.0 + s.eco_boost + 5.0 * collected + 2.0 * player.defeats as f32
        - 1.4 * s.clock.elapsed_secs()
        - 18.0 * player.hits as f32
        - 0.4 * extra_jumps;

    raw.clamp(0.0, 100.0)
}

/// Exit opens once every required pickup is taken and no boss remains
pub fn exit_unlocked(s: &Session) -> bool {
    s.requirements_met() && s.boss.is_none()
}

fn check_exit(s: &mut Session, level: &Level, now_ms: f64) {
    if s.game_over || !rects_overlap(&s.player.rect(), &level.exit) {
        return;
    }

    if !exit_unlocked(s) {
        let text = if s.requirements_met() {
            "Defeat the smog titan to open the exit"
        } else {
            "Gather every seed to open the exit"
        };
        if s.show_message(text, now_ms) {
            s.events.push(GameEvent::ExitBlocked);
        }
        return;
    }

    if s.efficiency >= level.min_efficiency {
        s.completed = true;
        s.total_score += s.score;
        s.won = s.level_index + 1 >= level::level_count();
        s.events.push(GameEvent::LevelComplete);
        log::info!(
            "Level {} complete: score {}, efficiency {:.0}%, total {}",
            level.name,
            s.score,
            s.efficiency,
            s.total_score
        );
    } else {
        let text = format!(
            "Efficiency {:.0}% is below the {:.0}% goal",
            s.efficiency, level.min_efficiency
        );
        if s.show_message(text, now_ms) {
            s.events.push(GameEvent::ExitBlocked);
        }
    }
}

fn update_camera(s: &mut Session, level: &Level, viewport: Vec2) {
    let target = s.player.center() - viewport / 2.0;
    s.camera = Vec2::new(
        clamp_span(target.x, 0.0, level.width - viewport.x),
        clamp_span(target.y, 0.0, level.height - viewport.y),
    );
}

fn expire_timed(s: &mut Session, now_ms: f64) {
    if s.message.as_ref().is_some_and(|m| now_ms >= m.until_ms) {
        s.message = None;
    }
    s.effects.retain(|e| now_ms < e.until_ms);
}
