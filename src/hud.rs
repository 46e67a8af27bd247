//! Read-only HUD snapshot
//!
//! Presentation layers read this instead of reaching into the session.

use serde::Serialize;

use crate::sim::{Session, exit_unlocked, level};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub level_index: usize,
    pub level_name: String,
    pub lives: u8,
    pub shield: u8,
    pub score: u64,
    pub total_score: u64,
    pub combo: u32,
    /// 0-100
    pub efficiency: f32,
    pub efficiency_goal: f32,
    pub required_taken: usize,
    pub required_total: usize,
    pub exit_unlocked: bool,
    /// Remaining boss hit points, if a boss is alive
    pub boss_hp: Option<u8>,
    /// Milliseconds left on each buff (0 when inactive)
    pub speed_ms: f64,
    pub glide_ms: f64,
    pub double_jump_ms: f64,
    pub holding_prop: bool,
    pub message: Option<String>,
    pub elapsed_secs: f32,
}

impl HudSnapshot {
    pub fn from_session(s: &Session) -> Self {
        let now = s.clock.now_ms;
        let remaining = |until: f64| (until - now).max(0.0);
        let lvl = level(s.level_index);
        let required = s.collectibles.iter().filter(|c| c.required);

        Self {
            level_index: s.level_index,
            level_name: lvl.map_or_else(String::new, |l| l.name.to_string()),
            lives: s.lives,
            shield: s.player.shield,
            score: s.score,
            total_score: s.total_score,
            combo: s.combo,
            efficiency: s.efficiency,
            efficiency_goal: lvl.map_or(0.0, |l| l.min_efficiency),
            required_taken: required.clone().filter(|c| c.taken).count(),
            required_total: required.count(),
            exit_unlocked: exit_unlocked(s),
            boss_hp: s.boss.as_ref().map(|b| b.hp),
            speed_ms: remaining(s.player.speed_until),
            glide_ms: remaining(s.player.glide_until),
            double_jump_ms: remaining(s.player.double_jump_until),
            holding_prop: s.held().is_some(),
            message: s.message.as_ref().map(|m| m.text.clone()),
            elapsed_secs: s.clock.elapsed_secs(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
