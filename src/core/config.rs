//! Battle configuration.
//!
//! `BattleConfig` holds the tunables that vary per encounter or per game
//! (seed, durations, AI thresholds, pacing). Combat kernel constants live in
//! [`crate::combat`] and are not configurable.
//!
//! Configs can be built in code with `with_*` builders or loaded from TOML:
//!
//! ```
//! use press_turn::core::BattleConfig;
//!
//! let config = BattleConfig::from_toml_str("seed = 7\nis_boss_battle = true").unwrap();
//! assert_eq!(config.seed, 7);
//! assert!(config.is_boss_battle);
//! assert_eq!(config.ailment_duration, 3);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Per-battle configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Seed for every roll in the battle.
    pub seed: u64,

    /// Turns an inflicted ailment lasts before wearing off.
    pub ailment_duration: u8,

    /// Turns a buff or debuff stage lasts after its last change.
    pub buff_duration: u8,

    /// Turns a broken affinity lasts.
    pub break_duration: u8,

    /// HP ratio below which the AI considers an ally in crisis.
    pub crisis_hp_ratio: f64,

    /// Accuracy of a basic attack.
    pub basic_attack_accuracy: u32,

    /// Accuracy of a physical skill that declares none.
    pub physical_accuracy: u32,

    /// Accuracy of a magical skill that declares none.
    pub magic_accuracy: u32,

    /// Boss battles cannot be escaped.
    pub is_boss_battle: bool,

    /// Maximum number of phases before the battle ends in a stalemate.
    pub phase_limit: Option<u32>,

    /// Pause after narrated lines, handed to the IO adapter.
    pub message_delay_ms: u64,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            ailment_duration: 3,
            buff_duration: 3,
            break_duration: 3,
            crisis_hp_ratio: 0.35,
            basic_attack_accuracy: 90,
            physical_accuracy: 85,
            magic_accuracy: 95,
            is_boss_battle: false,
            phase_limit: Some(500),
            message_delay_ms: 600,
        }
    }
}

impl BattleConfig {
    /// Create a config with the given seed and default tunables.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse a config from TOML. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that would break the battle loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.crisis_hp_ratio) {
            return Err(ConfigError::Invalid {
                field: "crisis_hp_ratio",
                reason: format!("{} is outside 0..=1", self.crisis_hp_ratio),
            });
        }
        for (field, value) in [
            ("basic_attack_accuracy", self.basic_attack_accuracy),
            ("physical_accuracy", self.physical_accuracy),
            ("magic_accuracy", self.magic_accuracy),
        ] {
            if value > 100 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is above 100"),
                });
            }
        }
        if self.ailment_duration == 0 {
            return Err(ConfigError::Invalid {
                field: "ailment_duration",
                reason: "must be at least 1".into(),
            });
        }
        if self.phase_limit == Some(0) {
            return Err(ConfigError::Invalid {
                field: "phase_limit",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Set the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Mark as a boss battle (no escape).
    #[must_use]
    pub fn boss(mut self) -> Self {
        self.is_boss_battle = true;
        self
    }

    /// Set ailment duration.
    #[must_use]
    pub fn with_ailment_duration(mut self, turns: u8) -> Self {
        self.ailment_duration = turns;
        self
    }

    /// Set buff duration.
    #[must_use]
    pub fn with_buff_duration(mut self, turns: u8) -> Self {
        self.buff_duration = turns;
        self
    }

    /// Set the AI crisis threshold.
    #[must_use]
    pub fn with_crisis_hp_ratio(mut self, ratio: f64) -> Self {
        self.crisis_hp_ratio = ratio;
        self
    }

    /// Set the phase limit (`None` for unlimited).
    #[must_use]
    pub fn with_phase_limit(mut self, limit: Option<u32>) -> Self {
        self.phase_limit = limit;
        self
    }

    /// Set the narration delay.
    #[must_use]
    pub fn with_message_delay(mut self, millis: u64) -> Self {
        self.message_delay_ms = millis;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = BattleConfig::default();
        assert_eq!(config.ailment_duration, 3);
        assert_eq!(config.basic_attack_accuracy, 90);
        assert_eq!(config.physical_accuracy, 85);
        assert_eq!(config.magic_accuracy, 95);
        assert!((config.crisis_hp_ratio - 0.35).abs() < f64::EPSILON);
        assert!(!config.is_boss_battle);
    }

    #[test]
    fn test_builders() {
        let config = BattleConfig::new(5)
            .boss()
            .with_buff_duration(4)
            .with_phase_limit(None)
            .with_message_delay(0);

        assert_eq!(config.seed, 5);
        assert!(config.is_boss_battle);
        assert_eq!(config.buff_duration, 4);
        assert_eq!(config.phase_limit, None);
        assert_eq!(config.message_delay_ms, 0);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = BattleConfig::from_toml_str("seed = 11\ncrisis_hp_ratio = 0.5").unwrap();
        assert_eq!(config.seed, 11);
        assert!((config.crisis_hp_ratio - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.break_duration, 3);
    }

    #[test]
    fn test_from_toml_rejects_bad_ratio() {
        let err = BattleConfig::from_toml_str("crisis_hp_ratio = 2.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "crisis_hp_ratio", .. }));
    }

    #[test]
    fn test_from_toml_rejects_bad_syntax() {
        let err = BattleConfig::from_toml_str("seed = ").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_serde_json_roundtrip() {
        let config = BattleConfig::new(99).boss();
        let json = serde_json::to_string(&config).unwrap();
        let back: BattleConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
