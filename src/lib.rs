//! Eco Platformer - deterministic core of a 2D platform game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (geometry, levels, session state, tick)
//! - `driver`: Fixed-timestep accumulator and level status machine
//! - `hud`: Read-only presentation snapshot of a session
//! - `tuning`: Data-driven obstacle and prop balance

pub mod driver;
pub mod hud;
pub mod sim;
pub mod tuning;

pub use driver::{Driver, Edge, GameStatus, ProgressSink};
pub use hud::HudSnapshot;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Player hitbox
    pub const PLAYER_WIDTH: f32 = 28.0;
    pub const PLAYER_HEIGHT: f32 = 44.0;
    pub const PLAYER_CROUCH_HEIGHT: f32 = 28.0;
    pub const PLAYER_MASS: f32 = 1.0;

    /// Horizontal movement (pixels/s, pixels/s²)
    pub const BASE_SPEED: f32 = 220.0;
    pub const RUN_MULTIPLIER: f32 = 1.45;
    pub const SPEED_BUFF_MULTIPLIER: f32 = 1.35;
    pub const CROUCH_SPEED_MULTIPLIER: f32 = 0.5;
    pub const ACCEL: f32 = 1800.0;
    /// Deceleration is faster than acceleration for snappy stops
    pub const DECEL: f32 = 2600.0;

    /// Vertical movement (y grows downward)
    pub const GRAVITY: f32 = 1800.0;
    pub const GLIDE_GRAVITY_SCALE: f32 = 0.3;
    pub const JUMP_VELOCITY: f32 = 620.0;
    pub const MAX_RISE_SPEED: f32 = 900.0;
    pub const MAX_FALL_SPEED: f32 = 900.0;
    pub const GLIDE_MAX_FALL_SPEED: f32 = 160.0;
    /// Air jumps available without / with the double-jump buff
    pub const BASE_AIR_JUMPS: u8 = 0;
    pub const BUFFED_AIR_JUMPS: u8 = 1;

    /// Highest ledge the player walks up without jumping
    pub const STEP_HEIGHT: f32 = 14.0;
    /// Rest-contact tolerance for grounded checks
    pub const GROUND_EPSILON: f32 = 1.5;
    /// Largest displacement resolved in one collision chunk
    pub const SWEEP_STEP: f32 = 8.0;
    /// Distance below the level before a fall costs a life
    pub const DEATH_MARGIN: f32 = 200.0;

    /// Lives at session start
    pub const START_LIVES: u8 = 3;
    pub const MAX_LIVES: u8 = 5;
    pub const MAX_SHIELD: u8 = 3;

    /// Pickups
    pub const COLLECT_RADIUS: f32 = 18.0;
    pub const COMBO_WINDOW_MS: f64 = 1600.0;
    pub const COMBO_CAP: u32 = 5;
    pub const ECO_BOOST_PER_PICKUP: f32 = 1.5;
    pub const ECO_BOOST_CAP: f32 = 12.0;
    pub const SPEED_BUFF_MS: f64 = 6000.0;
    pub const GLIDE_BUFF_MS: f64 = 8000.0;
    pub const DOUBLE_JUMP_BUFF_MS: f64 = 10000.0;

    /// Damage
    pub const HURT_COOLDOWN_MS: f64 = 900.0;
    pub const KNOCKBACK_X: f32 = 280.0;
    pub const KNOCKBACK_Y: f32 = 360.0;

    /// Hostiles
    pub const HOSTILE_SPEED: f32 = 70.0;
    pub const STOMP_TOLERANCE: f32 = 14.0;
    pub const STOMP_BOUNCE: f32 = 480.0;
    pub const HOSTILE_SCORE: u64 = 50;

    /// Boss
    pub const BOSS_SPEED: f32 = 55.0;
    pub const BOSS_INVULN_MS: f64 = 800.0;
    pub const BOSS_ATTACK_COOLDOWN_MS: f64 = 2200.0;
    pub const BOSS_SCORE: u64 = 250;
    pub const POLLUTANT_SPEED: f32 = 240.0;
    pub const POLLUTANT_RADIUS: f32 = 9.0;
    pub const POLLUTANT_TTL_MS: f64 = 6000.0;

    /// Props
    pub const PROP_REACH: f32 = 64.0;
    pub const PROP_BOUNCE_THRESHOLD: f32 = 220.0;
    pub const PROP_NUDGE: f32 = 0.35;
    pub const THROW_SPEED: f32 = 260.0;
    pub const THROW_LIFT: f32 = 240.0;

    /// UI timings
    pub const MESSAGE_MS: f64 = 2200.0;
    pub const EFFECT_MS: f64 = 900.0;
}

/// Clamp helper that tolerates an inverted range (returns `min`)
#[inline]
pub fn clamp_span(value: f32, min: f32, max: f32) -> f32 {
    if max < min { min } else { value.clamp(min, max) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_span_inverted_range() {
        assert_eq!(clamp_span(50.0, 0.0, 100.0), 50.0);
        assert_eq!(clamp_span(-5.0, 0.0, 100.0), 0.0);
        // Level narrower than the viewport
        assert_eq!(clamp_span(300.0, 0.0, -200.0), 0.0);
    }
}
