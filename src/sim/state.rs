//! Session state and core simulation types
//!
//! Everything one level attempt needs between steps lives in `Session`.
//! A session is a plain value: the step function clones it, advances the
//! copy, and hands the new value back to the driver.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::level::{self, CollectibleKind, HostileKind, Level, PropKind, PropMaterial};
use crate::consts::*;

/// Simulation clock (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Clock {
    /// Timestamp the session was created at
    pub start_ms: f64,
    /// Latest timestamp handed to the step function
    pub now_ms: f64,
    /// Unpaused simulated time
    pub elapsed_ms: f64,
}

impl Clock {
    pub fn elapsed_secs(&self) -> f32 {
        (self.elapsed_ms / 1000.0) as f32
    }
}

/// The player body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left of the hitbox
    pub pos: Vec2,
    pub vel: Vec2,
    /// Hitbox size (height shrinks while crouching)
    pub size: Vec2,
    pub mass: f32,
    pub gravity_scale: f32,
    pub crouching: bool,
    /// +1 facing right, -1 facing left
    pub facing: f32,
    pub on_ground: bool,
    pub air_jumps: u8,
    /// Buff expiry timestamps (ms)
    pub speed_until: f64,
    pub glide_until: f64,
    pub double_jump_until: f64,
    /// Shield charges, each absorbs one hit
    pub shield: u8,
    /// Hits that cost a life
    pub hits: u32,
    pub defeats: u32,
    pub jumps_used: u32,
    pub last_hurt_ms: Option<f64>,
    /// Jump button state on the previous step (for edge detection)
    pub jump_held: bool,
}

impl Player {
    pub fn new(spawn: Vec2) -> Self {
        Self {
            pos: spawn,
            vel: Vec2::ZERO,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            mass: PLAYER_MASS,
            gravity_scale: 1.0,
            crouching: false,
            facing: 1.0,
            on_ground: false,
            air_jumps: BASE_AIR_JUMPS,
            speed_until: 0.0,
            glide_until: 0.0,
            double_jump_until: 0.0,
            shield: 0,
            hits: 0,
            defeats: 0,
            jumps_used: 0,
            last_hurt_ms: None,
            jump_held: false,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn speed_active(&self, now_ms: f64) -> bool {
        now_ms < self.speed_until
    }

    pub fn glide_active(&self, now_ms: f64) -> bool {
        now_ms < self.glide_until
    }

    pub fn double_jump_active(&self, now_ms: f64) -> bool {
        now_ms < self.double_jump_until
    }

    /// Air jumps granted on landing
    pub fn air_jump_allowance(&self, now_ms: f64) -> u8 {
        if self.double_jump_active(now_ms) {
            BUFFED_AIR_JUMPS
        } else {
            BASE_AIR_JUMPS
        }
    }
}

/// A collectible instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub kind: CollectibleKind,
    /// Disc center
    pub pos: Vec2,
    pub required: bool,
    /// Never reverts once set
    pub taken: bool,
}

/// A patrolling hostile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hostile {
    pub id: u32,
    pub kind: HostileKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    /// Patrol direction (+1 / -1)
    pub dir: f32,
    pub alive: bool,
}

impl Hostile {
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }
}

/// The level boss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub rect: Rect,
    pub hp: u8,
    pub max_hp: u8,
    pub dir: f32,
    pub home_x: f32,
    pub patrol: f32,
    /// Stomps before this timestamp do no damage
    pub invuln_until: f64,
    /// Next pollutant volley
    pub next_attack_ms: f64,
}

/// Flying obstacle motion patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstaclePattern {
    /// Vertical sine bob
    Sine,
    /// Triangle-wave zig-zag
    ZigZag,
    /// Circular orbit around a drifting center
    Orbit,
}

/// A flying obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub pattern: ObstaclePattern,
    /// Center at spawn time
    pub origin: Vec2,
    /// Current center
    pub pos: Vec2,
    pub radius: f32,
    pub spawn_ms: f64,
}

/// A physically simulated prop ("mobi")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prop {
    pub id: u32,
    pub kind: PropKind,
    pub material: PropMaterial,
    /// Palette index, cycled by the recolor input
    pub color: u8,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub movable: bool,
    pub portable: bool,
    pub openable: bool,
    pub open: bool,
    pub resting: bool,
}

impl Prop {
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }
}

/// A boss projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pollutant {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub spawn_ms: f64,
}

/// Transient UI message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub until_ms: f64,
}

/// Floating feedback text (presentation animates it from `born_ms`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Effect {
    pub text: String,
    pub pos: Vec2,
    pub born_ms: f64,
    pub until_ms: f64,
}

/// Events emitted during one step (for audio/HUD collaborators)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped,
    Collected(CollectibleKind),
    Hurt,
    ShieldBlocked,
    HostileDefeated,
    BossHit,
    BossDefeated,
    PropPickedUp,
    PropReleased,
    PropToggled,
    LifeLost,
    ExitBlocked,
    LevelComplete,
    GameOver,
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    /// Fresh generator for the next draw sequence
    pub fn next_rng(&mut self) -> Pcg32 {
        self.stream += 1;
        Pcg32::seed_from_u64(self.seed ^ self.stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
}

/// Complete per-attempt state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub level_index: usize,
    pub clock: Clock,
    pub paused: bool,
    pub completed: bool,
    /// Final level completed
    pub won: bool,
    pub game_over: bool,
    pub player: Player,
    pub platforms: Vec<Rect>,
    pub hazards: Vec<Rect>,
    pub collectibles: Vec<Collectible>,
    pub hostiles: Vec<Hostile>,
    pub boss: Option<Boss>,
    pub obstacles: Vec<Obstacle>,
    pub props: Vec<Prop>,
    /// Id of the carried prop
    pub held_prop: Option<u32>,
    pub pollutants: Vec<Pollutant>,
    /// Top-left of the viewport in level space
    pub camera: Vec2,
    pub lives: u8,
    /// 0-100
    pub efficiency: f32,
    /// Score earned in this level
    pub score: u64,
    /// Score banked from completed levels
    pub total_score: u64,
    pub combo: u32,
    pub last_pickup_ms: Option<f64>,
    /// Capped bonus term fed into efficiency
    pub eco_boost: f32,
    pub message: Option<Message>,
    pub effects: Vec<Effect>,
    /// Events from the latest step only
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    pub rng_state: RngState,
    pub last_obstacle_ms: f64,
    next_id: u32,
}

impl Session {
    /// Fresh session for a level, starting at `start_ms`
    ///
    /// An out-of-range index falls back to the last catalog level.
    pub fn new(level_index: usize, start_ms: f64) -> Self {
        Self::carry_over(level_index, start_ms, START_LIVES, 0)
    }

    /// Fresh session that keeps lives and banked score from a previous one
    pub fn carry_over(level_index: usize, start_ms: f64, lives: u8, total_score: u64) -> Self {
        let (index, lvl) = level::level_or_final(level_index);
        Self::from_level(index, lvl, start_ms, lives, total_score)
    }

    fn from_level(index: usize, lvl: &Level, start_ms: f64, lives: u8, total_score: u64) -> Self {
        let mut session = Self {
            level_index: index,
            clock: Clock { start_ms, now_ms: start_ms, elapsed_ms: 0.0 },
            paused: false,
            completed: false,
            won: false,
            game_over: lives == 0,
            player: Player::new(lvl.spawn),
            platforms: lvl.platforms.iter().map(|p| p.rect).collect(),
            hazards: lvl.hazards.clone(),
            collectibles: Vec::with_capacity(lvl.collectibles.len()),
            hostiles: Vec::with_capacity(lvl.hostiles.len()),
            boss: None,
            obstacles: Vec::new(),
            props: Vec::with_capacity(lvl.props.len()),
            held_prop: None,
            pollutants: Vec::new(),
            camera: Vec2::ZERO,
            lives,
            efficiency: 100.0,
            score: 0,
            total_score,
            combo: 0,
            last_pickup_ms: None,
            eco_boost: 0.0,
            message: None,
            effects: Vec::new(),
            events: Vec::new(),
            rng_state: RngState::new(0x5EED_0000 + lvl.id as u64),
            last_obstacle_ms: start_ms,
            next_id: 1,
        };

        for spec in &lvl.collectibles {
            let id = session.next_entity_id();
            session.collectibles.push(Collectible {
                id,
                kind: spec.kind,
                pos: spec.pos,
                required: spec.required,
                taken: false,
            });
        }

        for spec in &lvl.hostiles {
            let id = session.next_entity_id();
            session.hostiles.push(Hostile {
                id,
                kind: spec.kind,
                pos: spec.pos,
                vel: Vec2::ZERO,
                size: spec.kind.size(),
                dir: -1.0,
                alive: true,
            });
        }

        for spec in &lvl.props {
            let id = session.next_entity_id();
            session.props.push(Prop {
                id,
                kind: spec.kind,
                material: spec.material,
                color: 0,
                pos: spec.pos,
                vel: Vec2::ZERO,
                size: spec.kind.size(),
                movable: spec.movable,
                portable: spec.portable,
                openable: spec.openable,
                open: false,
                resting: false,
            });
        }

        session.boss = lvl.boss.map(|spec| Boss {
            rect: spec.rect,
            hp: spec.hp,
            max_hp: spec.hp,
            dir: -1.0,
            home_x: spec.rect.x,
            patrol: spec.patrol,
            invuln_until: start_ms,
            next_attack_ms: start_ms + BOSS_ATTACK_COOLDOWN_MS,
        });

        session
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Completed, won or out of lives
    pub fn is_terminal(&self) -> bool {
        self.completed || self.won || self.game_over
    }

    /// Every required collectible has been taken
    pub fn requirements_met(&self) -> bool {
        self.collectibles.iter().filter(|c| c.required).all(|c| c.taken)
    }

    pub fn collected_count(&self) -> usize {
        self.collectibles.iter().filter(|c| c.taken).count()
    }

    /// The held prop, if the stored id still resolves
    pub fn held(&self) -> Option<&Prop> {
        self.held_prop.and_then(|id| self.props.iter().find(|p| p.id == id))
    }

    /// Show a transient message; returns false if the same text is already up
    pub fn show_message(&mut self, text: impl Into<String>, now_ms: f64) -> bool {
        let text = text.into();
        let fresh = self.message.as_ref().is_none_or(|m| m.text != text);
        self.message = Some(Message { text, until_ms: now_ms + MESSAGE_MS });
        fresh
    }

    pub fn push_effect(&mut self, text: impl Into<String>, pos: Vec2, now_ms: f64) {
        self.effects.push(Effect {
            text: text.into(),
            pos,
            born_ms: now_ms,
            until_ms: now_ms + EFFECT_MS,
        });
    }
}
