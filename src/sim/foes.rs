//! Hazards, hostiles, the boss and its pollutant projectiles
//!
//! Everything that can hurt the player goes through [`hurt`], which owns the
//! cooldown, shield and life bookkeeping.

use glam::Vec2;

use super::geom::{
    Axis, Rect, circle_rect_overlap, is_grounded, overlaps_any, rects_overlap, sweep_axis,
};
use super::level::Level;
use super::state::{Boss, GameEvent, Player, Pollutant, Session};
use crate::consts::*;

/// Hazards, pollutants, hostiles and the boss, in that order
pub fn update(s: &mut Session, level: &Level, solids: &[Rect], now_ms: f64, dt: f32) {
    check_hazards(s, now_ms);
    if s.game_over {
        return;
    }

    update_pollutants(s, level, solids, now_ms, dt);
    if s.game_over {
        return;
    }

    // A stomp bounce must not turn the next contact this step into a hit
    let incoming_vy = s.player.vel.y;
    update_hostiles(s, level, solids, incoming_vy, now_ms, dt);
    if s.game_over {
        return;
    }

    update_boss(s, level, incoming_vy, now_ms, dt);
}

/// Apply one hit from something at `source`
///
/// Returns false when the hit lands inside the cooldown and is ignored.
pub fn hurt(s: &mut Session, source: Vec2, now_ms: f64) -> bool {
    let player = &mut s.player;
    if player
        .last_hurt_ms
        .is_some_and(|last| now_ms - last < HURT_COOLDOWN_MS)
    {
        return false;
    }
    player.last_hurt_ms = Some(now_ms);

    if player.shield > 0 {
        player.shield -= 1;
        s.events.push(GameEvent::ShieldBlocked);
        return true;
    }

    player.hits += 1;
    let away = if player.center().x >= source.x { 1.0 } else { -1.0 };
    player.vel = Vec2::new(away * KNOCKBACK_X, -KNOCKBACK_Y) / player.mass;
    player.on_ground = false;

    s.lives = s.lives.saturating_sub(1);
    s.events.push(GameEvent::Hurt);

    if s.lives == 0 {
        s.game_over = true;
        s.events.push(GameEvent::GameOver);
        log::info!("Game over on level {} (hurt)", s.level_index);
    }
    true
}

fn check_hazards(s: &mut Session, now_ms: f64) {
    let body = s.player.rect();
    let source = s.hazards.iter().find(|h| rects_overlap(&body, h)).map(|h| h.center());
    if let Some(source) = source {
        hurt(s, source, now_ms);
    }
}

fn update_pollutants(s: &mut Session, level: &Level, solids: &[Rect], now_ms: f64, dt: f32) {
    let body = s.player.rect();
    let bounds = Rect::new(
        -DEATH_MARGIN,
        -DEATH_MARGIN,
        level.width + 2.0 * DEATH_MARGIN,
        level.height + 2.0 * DEATH_MARGIN,
    );
    let mut hit_from = None;

    s.pollutants.retain_mut(|p| {
        p.pos += p.vel * dt;
        if now_ms - p.spawn_ms > POLLUTANT_TTL_MS || !bounds.contains(p.pos) {
            return false;
        }
        if solids.iter().any(|solid| circle_rect_overlap(p.pos, p.radius, solid)) {
            return false;
        }
        if circle_rect_overlap(p.pos, p.radius, &body) {
            hit_from.get_or_insert(p.pos);
            return false;
        }
        true
    });

    if let Some(source) = hit_from {
        hurt(s, source, now_ms);
    }
}

/// Falling at `vy` onto the top edge of `target`
fn is_stomp(body: &Rect, vy: f32, target: &Rect, dt: f32) -> bool {
    vy > 0.0 && body.bottom() - target.y <= STOMP_TOLERANCE + vy * dt
}

/// Put the player on top of `top` and launch them upward
fn bounce(player: &mut Player, top: f32) {
    player.pos.y = top - player.size.y;
    player.vel.y = -STOMP_BOUNCE;
    player.on_ground = false;
}

fn update_hostiles(
    s: &mut Session,
    level: &Level,
    solids: &[Rect],
    incoming_vy: f32,
    now_ms: f64,
    dt: f32,
) {
    for hostile in s.hostiles.iter_mut().filter(|h| h.alive) {
        hostile.vel.x = hostile.dir * HOSTILE_SPEED * hostile.kind.pace();
        hostile.vel.y = (hostile.vel.y + GRAVITY * dt).min(MAX_FALL_SPEED);

        let mut rect = hostile.rect();
        let side = sweep_axis(&mut rect, solids, Axis::X, hostile.vel.x * dt);
        let vertical = sweep_axis(&mut rect, solids, Axis::Y, hostile.vel.y * dt);
        if vertical.hit {
            hostile.vel.y = 0.0;
        }

        let mut reverse = side.hit;
        let max_x = (level.width - rect.w).max(0.0);
        if rect.x <= 0.0 || rect.x >= max_x {
            rect.x = rect.x.clamp(0.0, max_x);
            reverse = true;
        }

        // Turn around instead of walking off a ledge
        if !reverse && (vertical.ground || is_grounded(&rect, solids)) {
            let front = if hostile.dir > 0.0 { rect.right() } else { rect.x - 2.0 };
            let footing = Rect::new(front, rect.bottom(), 2.0, 4.0);
            reverse = !overlaps_any(&footing, solids);
        }

        if reverse {
            hostile.dir = -hostile.dir;
        }
        hostile.pos = rect.pos();

        if hostile.pos.y > level.height + DEATH_MARGIN {
            hostile.alive = false;
        }
    }

    for i in 0..s.hostiles.len() {
        if !s.hostiles[i].alive {
            continue;
        }
        let target = s.hostiles[i].rect();
        if !rects_overlap(&s.player.rect(), &target) {
            continue;
        }

        if is_stomp(&s.player.rect(), incoming_vy, &target, dt) {
            s.hostiles[i].alive = false;
            bounce(&mut s.player, target.y);
            s.player.defeats += 1;
            s.score += HOSTILE_SCORE;
            s.push_effect(format!("+{}", HOSTILE_SCORE), target.center(), now_ms);
            s.events.push(GameEvent::HostileDefeated);
        } else {
            hurt(s, target.center(), now_ms);
            if s.game_over {
                return;
            }
        }
    }
}

fn update_boss(s: &mut Session, level: &Level, incoming_vy: f32, now_ms: f64, dt: f32) {
    let Some(mut boss) = s.boss.take() else {
        return;
    };

    patrol_boss(&mut boss, level, dt);

    if rects_overlap(&s.player.rect(), &boss.rect) {
        if is_stomp(&s.player.rect(), incoming_vy, &boss.rect, dt) {
            bounce(&mut s.player, boss.rect.y);
            if !s.requirements_met() {
                s.show_message("The smog titan shrugs it off. Gather every seed first!", now_ms);
            } else if now_ms >= boss.invuln_until {
                boss.hp = boss.hp.saturating_sub(1);
                boss.invuln_until = now_ms + BOSS_INVULN_MS;
                s.push_effect(format!("{}/{}", boss.hp, boss.max_hp), boss.rect.center(), now_ms);
                s.events.push(GameEvent::BossHit);
            }
        } else {
            hurt(s, boss.rect.center(), now_ms);
        }
    }

    if boss.hp == 0 {
        s.player.defeats += 1;
        s.score += BOSS_SCORE;
        s.pollutants.clear();
        s.push_effect(format!("+{}", BOSS_SCORE), boss.rect.center(), now_ms);
        s.events.push(GameEvent::BossDefeated);
        log::info!("Boss defeated on level {}", level.name);
        return;
    }

    if s.requirements_met() && now_ms >= boss.next_attack_ms {
        boss.next_attack_ms = now_ms + BOSS_ATTACK_COOLDOWN_MS;
        let origin = boss.rect.center();
        let aim = (s.player.center() - origin).normalize_or_zero();
        let aim = if aim == Vec2::ZERO { Vec2::new(-boss.dir.signum(), 0.0) } else { aim };
        let id = s.next_entity_id();
        s.pollutants.push(Pollutant {
            id,
            pos: origin,
            vel: aim * POLLUTANT_SPEED,
            radius: POLLUTANT_RADIUS,
            spawn_ms: now_ms,
        });
    }

    s.boss = Some(boss);
}

fn patrol_boss(boss: &mut Boss, level: &Level, dt: f32) {
    let min_x = (boss.home_x - boss.patrol).max(0.0);
    let max_x = (boss.home_x + boss.patrol).min(level.width - boss.rect.w).max(min_x);

    boss.rect.x += boss.dir * BOSS_SPEED * dt;
    if boss.rect.x <= min_x {
        boss.rect.x = min_x;
        boss.dir = 1.0;
    } else if boss.rect.x >= max_x {
        boss.rect.x = max_x;
        boss.dir = -1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level;
    use crate::sim::tick::exit_unlocked;

    fn canal() -> (Session, &'static Level) {
        (Session::new(1, 0.0), level::level(1).unwrap())
    }

    fn refinery() -> (Session, &'static Level) {
        (Session::new(2, 0.0), level::level(2).unwrap())
    }

    fn take_required(s: &mut Session) {
        for c in s.collectibles.iter_mut().filter(|c| c.required) {
            c.taken = true;
        }
    }

    fn step(s: &mut Session, level: &Level, now_ms: f64) {
        let solids = s.platforms.clone();
        update(s, level, &solids, now_ms, SIM_DT);
    }

    /// Player falling with feet just inside the top of `target`
    fn drop_onto(s: &mut Session, target: Rect) {
        s.player.pos = Vec2::new(target.x + 4.0, target.y + 4.0 - s.player.size.y);
        s.player.vel = Vec2::new(0.0, 300.0);
    }

    #[test]
    fn test_hurt_respects_cooldown() {
        let (mut s, _) = canal();
        let source = s.player.center() + Vec2::X;

        assert!(hurt(&mut s, source, 1000.0));
        assert_eq!(s.lives, START_LIVES - 1);
        assert_eq!(s.player.hits, 1);

        assert!(!hurt(&mut s, source, 1000.0 + HURT_COOLDOWN_MS / 2.0));
        assert_eq!(s.lives, START_LIVES - 1);

        assert!(hurt(&mut s, source, 1000.0 + HURT_COOLDOWN_MS));
        assert_eq!(s.lives, START_LIVES - 2);
    }

    #[test]
    fn test_shield_absorbs_hit() {
        let (mut s, _) = canal();
        s.player.shield = 1;
        let source = s.player.center();

        assert!(hurt(&mut s, source, 0.0));
        assert_eq!(s.lives, START_LIVES);
        assert_eq!(s.player.shield, 0);
        assert_eq!(s.player.hits, 0);
        assert!(s.events.contains(&GameEvent::ShieldBlocked));
        assert!(!s.events.contains(&GameEvent::Hurt));
    }

    #[test]
    fn test_knockback_pushes_away_from_source() {
        let (mut s, _) = canal();
        let source = s.player.center() + Vec2::new(20.0, 0.0);
        hurt(&mut s, source, 0.0);
        assert!(s.player.vel.x < 0.0);
        assert!(s.player.vel.y < 0.0);
    }

    #[test]
    fn test_last_life_hit_is_terminal() {
        let (mut s, _) = canal();
        s.lives = 1;
        let source = s.player.center();
        hurt(&mut s, source, 0.0);
        assert!(s.game_over);
        assert!(s.events.contains(&GameEvent::GameOver));
    }

    #[test]
    fn test_hazard_overlap_hurts() {
        let (mut s, lvl) = canal();
        let hazard = s.hazards[0];
        s.player.pos = Vec2::new(hazard.x + 10.0, 640.0 - PLAYER_HEIGHT);
        step(&mut s, lvl, 100.0);
        assert_eq!(s.lives, START_LIVES - 1);
        assert!(s.events.contains(&GameEvent::Hurt));
    }

    #[test]
    fn test_stomp_defeats_hostile() {
        let (mut s, lvl) = canal();
        let target = s.hostiles[0].rect();
        drop_onto(&mut s, target);

        step(&mut s, lvl, 100.0);
        assert!(!s.hostiles[0].alive);
        assert_eq!(s.score, HOSTILE_SCORE);
        assert_eq!(s.player.defeats, 1);
        assert_eq!(s.player.vel.y, -STOMP_BOUNCE);
        assert_eq!(s.lives, START_LIVES);
        assert!(s.events.contains(&GameEvent::HostileDefeated));

        // Defeated hostiles stay put
        let pos = s.hostiles[0].pos;
        step(&mut s, lvl, 200.0);
        assert_eq!(s.hostiles[0].pos, pos);
    }

    #[test]
    fn test_stomp_across_two_hostiles_defeats_both() {
        let (mut s, lvl) = canal();
        // Second hostile just behind the first, its top slightly higher
        let mut twin = s.hostiles[0].clone();
        twin.id = s.next_entity_id();
        twin.pos += Vec2::new(10.0, -2.0);
        s.hostiles[1] = twin;

        let target = s.hostiles[0].rect();
        drop_onto(&mut s, target);
        step(&mut s, lvl, 100.0);

        assert!(!s.hostiles[0].alive);
        assert!(!s.hostiles[1].alive);
        assert_eq!(s.player.defeats, 2);
        assert_eq!(s.score, 2 * HOSTILE_SCORE);
        assert_eq!(s.lives, START_LIVES);
        assert_eq!(s.player.hits, 0);
        assert_eq!(s.player.vel.y, -STOMP_BOUNCE);
    }

    #[test]
    fn test_side_contact_with_hostile_hurts() {
        let (mut s, lvl) = canal();
        let target = s.hostiles[0].rect();
        s.player.pos = Vec2::new(target.x + 2.0, 640.0 - PLAYER_HEIGHT);
        s.player.vel = Vec2::ZERO;

        step(&mut s, lvl, 100.0);
        assert!(s.hostiles[0].alive);
        assert_eq!(s.lives, START_LIVES - 1);
    }

    #[test]
    fn test_hostile_reverses_at_wall() {
        let (mut s, lvl) = canal();
        s.hostiles.truncate(1);
        s.hostiles[0].pos.x = 322.0;
        s.hostiles[0].dir = -1.0;
        let mut solids = s.platforms.clone();
        solids.push(Rect::new(300.0, 0.0, 20.0, 640.0));

        for i in 0..10 {
            update(&mut s, lvl, &solids, i as f64 * 16.0, SIM_DT);
        }
        assert_eq!(s.hostiles[0].dir, 1.0);
        assert!(s.hostiles[0].pos.x >= 320.0);
    }

    #[test]
    fn test_hostile_turns_at_ledge() {
        let (mut s, lvl) = canal();
        s.hostiles.truncate(1);
        // First floor segment ends at x = 900
        s.hostiles[0].pos.x = 870.0;
        s.hostiles[0].dir = 1.0;

        step(&mut s, lvl, 16.0);
        assert_eq!(s.hostiles[0].dir, -1.0);
        assert!(s.hostiles[0].alive);
    }

    #[test]
    fn test_boss_ignores_stomp_until_seeds_taken() {
        let (mut s, lvl) = refinery();
        let boss = s.boss.as_ref().unwrap().rect;
        drop_onto(&mut s, boss);

        step(&mut s, lvl, 100.0);
        let boss = s.boss.as_ref().unwrap();
        assert_eq!(boss.hp, boss.max_hp);
        assert!(s.player.vel.y < 0.0);
        assert!(s.message.as_ref().is_some_and(|m| m.text.contains("seed")));
        assert!(s.pollutants.is_empty());
    }

    #[test]
    fn test_boss_stomp_damages_then_invulnerable() {
        let (mut s, lvl) = refinery();
        take_required(&mut s);

        let boss = s.boss.as_ref().unwrap().rect;
        drop_onto(&mut s, boss);
        step(&mut s, lvl, 100.0);
        assert_eq!(s.boss.as_ref().unwrap().hp, 2);
        assert!(s.events.contains(&GameEvent::BossHit));

        let boss = s.boss.as_ref().unwrap().rect;
        drop_onto(&mut s, boss);
        step(&mut s, lvl, 100.0 + BOSS_INVULN_MS / 2.0);
        assert_eq!(s.boss.as_ref().unwrap().hp, 2);
    }

    #[test]
    fn test_boss_defeat_removes_boss_and_unlocks_exit() {
        let (mut s, lvl) = refinery();
        take_required(&mut s);
        s.boss.as_mut().unwrap().hp = 1;
        s.pollutants.push(Pollutant {
            id: 999,
            pos: Vec2::new(10.0, 10.0),
            vel: Vec2::ZERO,
            radius: POLLUTANT_RADIUS,
            spawn_ms: 0.0,
        });

        let boss = s.boss.as_ref().unwrap().rect;
        drop_onto(&mut s, boss);
        step(&mut s, lvl, 100.0);

        assert!(s.boss.is_none());
        assert_eq!(s.score, BOSS_SCORE);
        assert_eq!(s.player.defeats, 1);
        assert!(s.pollutants.is_empty());
        assert!(s.events.contains(&GameEvent::BossDefeated));
        assert!(exit_unlocked(&s));
    }

    #[test]
    fn test_boss_emits_pollutants_once_requirements_met() {
        let (mut s, lvl) = refinery();
        let now = BOSS_ATTACK_COOLDOWN_MS + 1.0;

        step(&mut s, lvl, now);
        assert!(s.pollutants.is_empty());

        take_required(&mut s);
        step(&mut s, lvl, now);
        assert_eq!(s.pollutants.len(), 1);
        // Player spawns left of the boss
        assert!(s.pollutants[0].vel.x < 0.0);

        step(&mut s, lvl, now + 16.0);
        assert_eq!(s.pollutants.len(), 1);
    }

    #[test]
    fn test_pollutant_hits_player_and_vanishes() {
        let (mut s, lvl) = canal();
        let id = s.next_entity_id();
        s.pollutants.push(Pollutant {
            id,
            pos: s.player.center(),
            vel: Vec2::ZERO,
            radius: POLLUTANT_RADIUS,
            spawn_ms: 0.0,
        });

        step(&mut s, lvl, 100.0);
        assert!(s.pollutants.is_empty());
        assert_eq!(s.lives, START_LIVES - 1);
    }

    #[test]
    fn test_pollutant_expires() {
        let (mut s, lvl) = canal();
        s.pollutants.push(Pollutant {
            id: 500,
            pos: Vec2::new(1500.0, 100.0),
            vel: Vec2::ZERO,
            radius: POLLUTANT_RADIUS,
            spawn_ms: 0.0,
        });

        step(&mut s, lvl, POLLUTANT_TTL_MS - 1.0);
        assert_eq!(s.pollutants.len(), 1);
        step(&mut s, lvl, POLLUTANT_TTL_MS + 1.0);
        assert!(s.pollutants.is_empty());
    }
}
