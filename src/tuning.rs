//! Data-driven balance for optional systems
//!
//! Tuning travels with every input snapshot so a collaborator can flip
//! flying obstacles on or soften prop physics without touching the core.
//! Every field has a documented range; `clamped()` pulls out-of-range
//! values back in.

use serde::{Deserialize, Serialize};

/// Flying obstacle spawner settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleTuning {
    /// Spawn obstacles at all
    pub enabled: bool,
    /// Milliseconds between spawns (400 - 20000)
    pub spawn_interval_ms: f64,
    /// Obstacles alive at once (0 - 16)
    pub max_active: u32,
    /// Leftward drift in pixels/s (20 - 600)
    pub speed: f32,
    /// Waveform amplitude in pixels (0 - 200)
    pub amplitude: f32,
    /// Waveform frequency in Hz (0.05 - 4)
    pub frequency: f32,
    /// Collision radius in pixels (4 - 40)
    pub radius: f32,
}

impl Default for ObstacleTuning {
    fn default() -> Self {
        Self {
            enabled: false,
            spawn_interval_ms: 2500.0,
            max_active: 4,
            speed: 140.0,
            amplitude: 48.0,
            frequency: 0.8,
            radius: 13.0,
        }
    }
}

/// Prop physics settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropTuning {
    /// Downward acceleration in pixels/s² (0 - 4000)
    pub gravity: f32,
    /// Resting friction, fraction of speed lost per second (0 - 30)
    pub friction: f32,
    /// Bounce kept on hard landings (0 - 0.95)
    pub restitution: f32,
}

impl Default for PropTuning {
    fn default() -> Self {
        Self {
            gravity: 1500.0,
            friction: 6.0,
            restitution: 0.45,
        }
    }
}

/// All tunable values
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub obstacles: ObstacleTuning,
    pub props: PropTuning,
}

impl Tuning {
    /// Parse tuning from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Self = serde_json::from_str(json)?;
        Ok(tuning.clamped())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Copy with every field pulled into its documented range
    pub fn clamped(&self) -> Self {
        let o = &self.obstacles;
        let p = &self.props;
        Self {
            obstacles: ObstacleTuning {
                enabled: o.enabled,
                spawn_interval_ms: o.spawn_interval_ms.clamp(400.0, 20000.0),
                max_active: o.max_active.min(16),
                speed: o.speed.clamp(20.0, 600.0),
                amplitude: o.amplitude.clamp(0.0, 200.0),
                frequency: o.frequency.clamp(0.05, 4.0),
                radius: o.radius.clamp(4.0, 40.0),
            },
            props: PropTuning {
                gravity: p.gravity.clamp(0.0, 4000.0),
                friction: p.friction.clamp(0.0, 30.0),
                restitution: p.restitution.clamp(0.0, 0.95),
            },
        }
    }

    /// Same tuning with flying obstacles switched on
    pub fn with_obstacles(mut self) -> Self {
        self.obstacles.enabled = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_in_range() {
        let tuning = Tuning::default();
        assert_eq!(tuning, tuning.clamped());
        assert!(!tuning.obstacles.enabled);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "obstacles": { "enabled": true, "max_active": 2 } }"#;
        let tuning = Tuning::from_json(json).unwrap();
        assert!(tuning.obstacles.enabled);
        assert_eq!(tuning.obstacles.max_active, 2);
        assert_eq!(tuning.props, PropTuning::default());
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let json = r#"{ "props": { "restitution": 3.0, "gravity": -10.0 } }"#;
        let tuning = Tuning::from_json(json).unwrap();
        assert_eq!(tuning.props.restitution, 0.95);
        assert_eq!(tuning.props.gravity, 0.0);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Tuning::from_json("{ not json").is_err());
    }

    #[test]
    fn test_to_json_names_sections() {
        let json = Tuning::default().with_obstacles().to_json().unwrap();
        assert!(json.contains("\"obstacles\""));
        assert!(json.contains("\"restitution\""));
    }
}
