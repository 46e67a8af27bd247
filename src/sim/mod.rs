//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (catalog order)
//! - No rendering, audio or platform dependencies

pub mod foes;
pub mod geom;
pub mod level;
pub mod obstacles;
pub mod props;
pub mod state;
pub mod tick;

pub use geom::{
    Axis, AxisHit, Rect, circle_rect_overlap, is_grounded, rects_overlap, resolve_axis,
    sweep_axis,
};
pub use level::{CollectibleKind, Level, PropMaterial, level, level_count};
pub use state::{
    Boss, Collectible, Effect, GameEvent, Hostile, Message, Obstacle, ObstaclePattern, Player,
    Pollutant, Prop, Session,
};
pub use tick::{EdgeEvents, TickInput, efficiency, exit_unlocked, tick};
