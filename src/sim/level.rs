//! Compiled-in level catalog
//!
//! Levels are authored data, never loaded at runtime. Coordinates are in
//! pixels with the origin at the top-left of the level and y growing
//! downward. Catalog order is play order: the last entry is the final level.

use std::sync::LazyLock;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;

/// Collectible types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectibleKind {
    /// Plain score pickup, usually the required kind
    Seed,
    /// Temporary run-speed buff
    Droplet,
    /// Temporary glide buff
    Leaf,
    /// Temporary double-jump buff
    Feather,
    /// One shield charge
    Acorn,
    /// Extra life, or a shield charge when lives are full
    Heart,
}

impl CollectibleKind {
    /// Glyph shown in floating feedback
    pub fn glyph(&self) -> &'static str {
        match self {
            CollectibleKind::Seed => "🌱",
            CollectibleKind::Droplet => "💧",
            CollectibleKind::Leaf => "🍃",
            CollectibleKind::Feather => "🪶",
            CollectibleKind::Acorn => "🌰",
            CollectibleKind::Heart => "❤",
        }
    }

    /// Score before the combo multiplier
    pub fn base_score(&self) -> u64 {
        match self {
            CollectibleKind::Seed => 10,
            CollectibleKind::Heart => 30,
            _ => 15,
        }
    }
}

/// Hostile types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostileKind {
    Beetle,
    SmogBlob,
}

impl HostileKind {
    pub fn size(&self) -> Vec2 {
        match self {
            HostileKind::Beetle => Vec2::new(32.0, 24.0),
            HostileKind::SmogBlob => Vec2::new(36.0, 36.0),
        }
    }

    /// Patrol speed multiplier
    pub fn pace(&self) -> f32 {
        match self {
            HostileKind::Beetle => 1.0,
            HostileKind::SmogBlob => 0.7,
        }
    }
}

/// Prop ("mobi") types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropKind {
    Crate,
    Barrel,
    Chest,
    Planter,
}

impl PropKind {
    pub fn size(&self) -> Vec2 {
        match self {
            PropKind::Crate => Vec2::new(36.0, 36.0),
            PropKind::Barrel => Vec2::new(30.0, 40.0),
            PropKind::Chest => Vec2::new(44.0, 32.0),
            PropKind::Planter => Vec2::new(28.0, 24.0),
        }
    }
}

/// Prop materials, cycled by the re-material input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropMaterial {
    Wood,
    Metal,
    Rubber,
    Glass,
}

impl PropMaterial {
    pub fn next(&self) -> Self {
        match self {
            PropMaterial::Wood => PropMaterial::Metal,
            PropMaterial::Metal => PropMaterial::Rubber,
            PropMaterial::Rubber => PropMaterial::Glass,
            PropMaterial::Glass => PropMaterial::Wood,
        }
    }

    pub fn mass(&self) -> f32 {
        match self {
            PropMaterial::Wood => 1.0,
            PropMaterial::Metal => 2.5,
            PropMaterial::Rubber => 0.8,
            PropMaterial::Glass => 1.2,
        }
    }

    /// Scales the tuned restitution
    pub fn bounciness(&self) -> f32 {
        match self {
            PropMaterial::Wood => 0.6,
            PropMaterial::Metal => 0.3,
            PropMaterial::Rubber => 1.6,
            PropMaterial::Glass => 0.9,
        }
    }

    /// Scales the tuned resting friction
    pub fn grip(&self) -> f32 {
        match self {
            PropMaterial::Wood => 1.0,
            PropMaterial::Metal => 0.7,
            PropMaterial::Rubber => 1.8,
            PropMaterial::Glass => 0.4,
        }
    }
}

/// A solid platform
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PlatformSpec {
    pub rect: Rect,
    /// Part of the level floor (used to bound obstacle spawn heights)
    pub ground: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CollectibleSpec {
    /// Disc center
    pub pos: Vec2,
    pub kind: CollectibleKind,
    /// Must be taken before the exit unlocks
    pub required: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct HostileSpec {
    /// Top-left spawn position
    pub pos: Vec2,
    pub kind: HostileKind,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PropSpec {
    /// Top-left spawn position
    pub pos: Vec2,
    pub kind: PropKind,
    pub material: PropMaterial,
    pub movable: bool,
    pub portable: bool,
    pub openable: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BossSpec {
    pub rect: Rect,
    pub hp: u8,
    /// Half-width of the patrol band around the spawn x
    pub patrol: f32,
}

/// Immutable per-level data
#[derive(Debug, Clone, Serialize)]
pub struct Level {
    pub id: u32,
    pub name: &'static str,
    pub width: f32,
    pub height: f32,
    /// Efficiency (0-100) needed to leave through the exit
    pub min_efficiency: f32,
    /// Player top-left on entry
    pub spawn: Vec2,
    pub platforms: Vec<PlatformSpec>,
    pub hazards: Vec<Rect>,
    pub collectibles: Vec<CollectibleSpec>,
    pub hostiles: Vec<HostileSpec>,
    pub props: Vec<PropSpec>,
    pub boss: Option<BossSpec>,
    pub exit: Rect,
}

impl Level {
    /// Highest top edge among ground-tagged platforms (falls back to the level height)
    pub fn ground_top(&self) -> f32 {
        self.platforms
            .iter()
            .filter(|p| p.ground)
            .map(|p| p.rect.y)
            .fold(self.height, f32::min)
    }

    pub fn required_count(&self) -> usize {
        self.collectibles.iter().filter(|c| c.required).count()
    }
}

static LEVELS: LazyLock<Vec<Level>> =
    LazyLock::new(|| vec![sprout_meadow(), smog_canal(), refinery_core()]);

/// Look up a level by catalog index
pub fn level(index: usize) -> Option<&'static Level> {
    LEVELS.get(index)
}

pub fn level_count() -> usize {
    LEVELS.len()
}

/// Look up a level, falling back to the final level for an unknown index
pub fn level_or_final(index: usize) -> (usize, &'static Level) {
    match LEVELS.get(index) {
        Some(lvl) => (index, lvl),
        None => {
            let last = LEVELS.len() - 1;
            log::warn!("Level index {} out of range, using final level {}", index, last);
            (last, &LEVELS[last])
        }
    }
}

fn ground(x: f32, w: f32) -> PlatformSpec {
    PlatformSpec { rect: Rect::new(x, 640.0, w, 80.0), ground: true }
}

fn ledge(x: f32, y: f32, w: f32, h: f32) -> PlatformSpec {
    PlatformSpec { rect: Rect::new(x, y, w, h), ground: false }
}

fn pickup(x: f32, y: f32, kind: CollectibleKind, required: bool) -> CollectibleSpec {
    CollectibleSpec { pos: Vec2::new(x, y), kind, required }
}

fn seed(x: f32, y: f32) -> CollectibleSpec {
    pickup(x, y, CollectibleKind::Seed, true)
}

fn hostile(x: f32, kind: HostileKind) -> HostileSpec {
    let size = kind.size();
    HostileSpec { pos: Vec2::new(x, 640.0 - size.y), kind }
}

fn prop(
    x: f32,
    kind: PropKind,
    material: PropMaterial,
    portable: bool,
    openable: bool,
) -> PropSpec {
    let size = kind.size();
    PropSpec {
        pos: Vec2::new(x, 640.0 - size.y),
        kind,
        material,
        movable: !openable,
        portable,
        openable,
    }
}

/// Tutorial: no enemies, one stair step, a crate to carry
fn sprout_meadow() -> Level {
    Level {
        id: 1,
        name: "Sprout Meadow",
        width: 2400.0,
        height: 720.0,
        min_efficiency: 35.0,
        spawn: Vec2::new(80.0, 560.0),
        platforms: vec![
            ground(0.0, 2400.0),
            ledge(600.0, 626.0, 160.0, 14.0),
            ledge(900.0, 540.0, 200.0, 20.0),
            ledge(1250.0, 470.0, 200.0, 20.0),
            ledge(1600.0, 560.0, 180.0, 20.0),
        ],
        hazards: Vec::new(),
        collectibles: vec![
            seed(300.0, 615.0),
            seed(1000.0, 510.0),
            seed(1350.0, 440.0),
            pickup(700.0, 600.0, CollectibleKind::Droplet, false),
            pickup(1690.0, 530.0, CollectibleKind::Leaf, false),
            pickup(2000.0, 615.0, CollectibleKind::Heart, false),
        ],
        hostiles: Vec::new(),
        props: vec![
            prop(420.0, PropKind::Crate, PropMaterial::Wood, true, false),
            prop(1820.0, PropKind::Chest, PropMaterial::Wood, false, true),
        ],
        boss: None,
        exit: Rect::new(2280.0, 520.0, 60.0, 120.0),
    }
}

/// Gaps in the floor, toxic puddles and patrolling hostiles
fn smog_canal() -> Level {
    Level {
        id: 2,
        name: "Smog Canal",
        width: 3000.0,
        height: 720.0,
        min_efficiency: 40.0,
        spawn: Vec2::new(60.0, 560.0),
        platforms: vec![
            ground(0.0, 900.0),
            ground(1050.0, 1000.0),
            ground(2200.0, 800.0),
            ledge(500.0, 520.0, 160.0, 20.0),
            ledge(1200.0, 500.0, 200.0, 20.0),
            ledge(1600.0, 420.0, 160.0, 20.0),
            ledge(2400.0, 520.0, 180.0, 20.0),
        ],
        hazards: vec![
            Rect::new(700.0, 628.0, 80.0, 12.0),
            Rect::new(1750.0, 628.0, 100.0, 12.0),
            Rect::new(2620.0, 628.0, 60.0, 12.0),
        ],
        collectibles: vec![
            seed(560.0, 490.0),
            seed(1300.0, 470.0),
            seed(1680.0, 390.0),
            seed(2480.0, 490.0),
            pickup(300.0, 615.0, CollectibleKind::Droplet, false),
            pickup(1100.0, 615.0, CollectibleKind::Acorn, false),
            pickup(2300.0, 615.0, CollectibleKind::Feather, false),
        ],
        hostiles: vec![
            hostile(400.0, HostileKind::Beetle),
            hostile(1400.0, HostileKind::SmogBlob),
            hostile(2500.0, HostileKind::Beetle),
        ],
        props: vec![
            prop(200.0, PropKind::Crate, PropMaterial::Metal, true, false),
            prop(1900.0, PropKind::Barrel, PropMaterial::Rubber, true, false),
            prop(2760.0, PropKind::Chest, PropMaterial::Metal, false, true),
        ],
        boss: None,
        exit: Rect::new(2880.0, 520.0, 60.0, 120.0),
    }
}

/// Final level: the boss only becomes vulnerable once every seed is gathered
fn refinery_core() -> Level {
    Level {
        id: 3,
        name: "Refinery Core",
        width: 2200.0,
        height: 720.0,
        min_efficiency: 30.0,
        spawn: Vec2::new(60.0, 560.0),
        platforms: vec![
            ground(0.0, 2200.0),
            ledge(300.0, 520.0, 160.0, 20.0),
            ledge(700.0, 440.0, 160.0, 20.0),
            ledge(1100.0, 520.0, 160.0, 20.0),
        ],
        hazards: vec![Rect::new(520.0, 628.0, 80.0, 12.0)],
        collectibles: vec![
            seed(380.0, 490.0),
            seed(780.0, 410.0),
            seed(1180.0, 490.0),
            pickup(200.0, 615.0, CollectibleKind::Acorn, false),
            pickup(1000.0, 615.0, CollectibleKind::Feather, false),
        ],
        hostiles: vec![hostile(900.0, HostileKind::Beetle)],
        props: vec![prop(160.0, PropKind::Planter, PropMaterial::Glass, true, false)],
        boss: Some(BossSpec { rect: Rect::new(1500.0, 520.0, 120.0, 120.0), hp: 3, patrol: 180.0 }),
        exit: Rect::new(2080.0, 520.0, 60.0, 120.0),
    }
}
