//! Prop ("mobi") interaction and physics
//!
//! Props are secondary bodies: they fall, bounce and slide against the same
//! solids as the player, can be nudged by walking into them, and may be
//! carried, opened, recolored or re-materialed through edge inputs.

use glam::Vec2;

use super::geom::{Axis, Rect, is_grounded, rects_overlap, resolve_axis, sweep_axis};
use super::level::Level;
use super::state::{GameEvent, Player, Prop, Session};
use super::tick::TickInput;
use crate::consts::*;
use crate::tuning::PropTuning;

/// Number of recolor palette entries
pub const PALETTE_SIZE: u8 = 6;

/// Handle prop edge inputs, then integrate every free prop
pub fn update(s: &mut Session, input: &TickInput, solids: &[Rect], level: &Level, dt: f32) {
    // A held id that no longer resolves means nothing is held
    if s.held_prop.is_some() && s.held().is_none() {
        s.held_prop = None;
    }

    handle_edges(s, input);
    carry_held(s);

    let tuning = input.tuning.props;
    let player = s.player.clone();
    for prop in s.props.iter_mut() {
        if !prop.movable || Some(prop.id) == s.held_prop {
            continue;
        }
        integrate(prop, &player, solids, &tuning, dt);

        // Lost props come back to the player
        if prop.pos.y > level.height + DEATH_MARGIN {
            prop.pos = Vec2::new(
                player.center().x + player.facing * (player.size.x / 2.0 + 8.0) - prop.size.x / 2.0,
                player.pos.y - prop.size.y - 8.0,
            );
            prop.vel = Vec2::ZERO;
            prop.resting = false;
        }
    }
}

/// Index of the closest prop within reach of the player, ignoring the held one
pub fn nearest_prop(s: &Session) -> Option<usize> {
    let center = s.player.center();
    s.props
        .iter()
        .enumerate()
        .filter(|(_, p)| Some(p.id) != s.held_prop)
        .map(|(i, p)| (i, p.center().distance(center)))
        .filter(|(_, d)| *d <= PROP_REACH)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

fn held_index(s: &Session) -> Option<usize> {
    let id = s.held_prop?;
    s.props.iter().position(|p| p.id == id)
}

fn handle_edges(s: &mut Session, input: &TickInput) {
    let edges = input.edges;
    if !edges.any() {
        return;
    }

    // Recolor and re-material act on the carried prop first
    let target = held_index(s).or_else(|| nearest_prop(s));
    if let Some(i) = target {
        if edges.recolor {
            s.props[i].color = (s.props[i].color + 1) % PALETTE_SIZE;
        }
        if edges.rematerial {
            s.props[i].material = s.props[i].material.next();
        }
    }

    if !edges.interact {
        return;
    }

    if let Some(i) = held_index(s) {
        release(&mut s.props[i], &s.player);
        s.held_prop = None;
        s.events.push(GameEvent::PropReleased);
        return;
    }

    let Some(i) = nearest_prop(s) else {
        return;
    };
    let prop = &mut s.props[i];
    if prop.portable {
        prop.vel = Vec2::ZERO;
        prop.resting = false;
        s.held_prop = Some(prop.id);
        s.events.push(GameEvent::PropPickedUp);
    } else if prop.openable {
        prop.open = !prop.open;
        s.events.push(GameEvent::PropToggled);
    }
}

/// Throw velocity follows the player's facing and current speed
fn release(prop: &mut Prop, player: &Player) {
    prop.vel = Vec2::new(
        player.facing * (THROW_SPEED + player.vel.x.abs() * 0.5),
        player.vel.y.min(0.0) - THROW_LIFT,
    );
    prop.resting = false;
}

/// Keep the carried prop beside the player on the facing side
fn carry_held(s: &mut Session) {
    let Some(i) = held_index(s) else {
        return;
    };
    let player = &s.player;
    let prop = &mut s.props[i];
    let x = if player.facing >= 0.0 {
        player.pos.x + player.size.x + 4.0
    } else {
        player.pos.x - 4.0 - prop.size.x
    };
    prop.pos = Vec2::new(x, player.pos.y + player.size.y * 0.35 - prop.size.y / 2.0);
    prop.vel = Vec2::ZERO;
}

fn integrate(prop: &mut Prop, player: &Player, solids: &[Rect], tuning: &PropTuning, dt: f32) {
    let restitution = (tuning.restitution * prop.material.bounciness()).min(0.95);
    let friction = tuning.friction * prop.material.grip();

    prop.vel.y = (prop.vel.y + tuning.gravity * dt).min(MAX_FALL_SPEED);

    // Walking into a prop shoves it along
    let reach = Rect::new(player.pos.x - 2.0, player.pos.y, player.size.x + 4.0, player.size.y);
    if player.vel.x != 0.0 && rects_overlap(&reach, &prop.rect()) {
        let toward = (prop.center().x - player.center().x) * player.vel.x > 0.0;
        if toward {
            let shove = player.vel.x * PROP_NUDGE * (player.mass / prop.material.mass());
            prop.vel.x = (prop.vel.x + shove).clamp(-player.vel.x.abs(), player.vel.x.abs());
        }
    }

    let mut rect = prop.rect();
    if sweep_axis(&mut rect, solids, Axis::X, prop.vel.x * dt).hit {
        prop.vel.x = 0.0;
    }

    let impact = prop.vel.y;
    let hit = sweep_axis(&mut rect, solids, Axis::Y, prop.vel.y * dt);
    if hit.ground {
        if impact > PROP_BOUNCE_THRESHOLD {
            prop.vel.y = -impact * restitution;
            prop.resting = false;
        } else {
            prop.vel.y = 0.0;
            prop.resting = true;
        }
    } else if hit.ceiling {
        prop.vel.y = prop.vel.y.max(0.0);
        prop.resting = false;
    } else {
        prop.resting = prop.vel.y >= 0.0 && is_grounded(&rect, solids);
    }

    if prop.resting {
        prop.vel.x *= (1.0 - friction * dt).max(0.0);
        if prop.vel.x.abs() < 1.0 {
            prop.vel.x = 0.0;
        }
    }

    // Thrown into a wall-adjacent spot: make sure it ends clear
    resolve_axis(&mut rect, solids, Axis::X, 0.0);
    prop.pos = rect.pos();
}
