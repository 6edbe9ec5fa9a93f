//! Game configuration loaded from TOML, plus per-run runtime flags
//!
//! Nothing here is global: every mechanism and behaviour receives a
//! [`SimulationContext`] built from these values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SkirmishError};
use crate::core::types::Timestamp;

/// Logging and filesystem settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default `tracing` filter level when `RUST_LOG` is not set
    pub logging_level: String,
    /// Directory for generated presentation assets
    pub cache_dir_path: PathBuf,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            logging_level: "error".into(),
            cache_dir_path: PathBuf::from("cache"),
        }
    }
}

/// Cycle pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Seconds per simulation cycle
    pub cycle_duration: f64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            cycle_duration: 0.5,
        }
    }
}

impl CoreConfig {
    pub fn cycles_per_second(&self) -> f64 {
        1.0 / self.cycle_duration
    }
}

/// Perception reconciliation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookAroundConfig {
    /// Seconds between two eligible runs
    pub frequency: f64,
}

impl Default for LookAroundConfig {
    fn default() -> Self {
        Self { frequency: 1.0 }
    }
}

/// Firing decisions
///
/// The probabilities are tuning knobs, not game rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngageConfig {
    /// Seconds between two eligible runs
    pub frequency: f64,
    /// Chance that a shot kills its target
    pub kill_probability: f64,
    /// Chance that an able shooter holds fire this time
    pub abstain_probability: f64,
}

impl Default for EngageConfig {
    fn default() -> Self {
        Self {
            frequency: 2.0,
            kill_probability: 0.25,
            abstain_probability: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviourConfig {
    pub look_around: LookAroundConfig,
    pub engage: EngageConfig,
}

/// Complete game configuration (`config.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub global: GlobalConfig,
    pub core: CoreConfig,
    pub game: BehaviourConfig,
}

impl GameConfig {
    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(content)
            .map_err(|e| SkirmishError::Config(format!("Failed to parse config TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            SkirmishError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !self.core.cycle_duration.is_finite() || self.core.cycle_duration <= 0.0 {
            return Err(SkirmishError::Config(format!(
                "core.cycle_duration must be positive and finite, got {}",
                self.core.cycle_duration
            )));
        }

        for (name, frequency) in [
            ("game.look_around.frequency", self.game.look_around.frequency),
            ("game.engage.frequency", self.game.engage.frequency),
        ] {
            if !frequency.is_finite() || frequency < 0.0 {
                return Err(SkirmishError::Config(format!(
                    "{} must be finite and not negative, got {}",
                    name, frequency
                )));
            }
        }

        for (name, probability) in [
            ("game.engage.kill_probability", self.game.engage.kill_probability),
            ("game.engage.abstain_probability", self.game.engage.abstain_probability),
        ] {
            if !(0.0..=1.0).contains(&probability) {
                return Err(SkirmishError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, probability
                )));
            }
        }

        Ok(())
    }
}

/// Per-run flags set by the launcher
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Troop placement/editing: perception and combat are suspended
    pub placement_mode: bool,
    pub state_save_dir: PathBuf,
    pub map_dir_path: PathBuf,
}

/// Immutable view handed to every mechanism and behaviour call
#[derive(Debug, Clone, Copy)]
pub struct SimulationContext<'a> {
    pub config: &'a GameConfig,
    pub runtime: &'a RuntimeConfig,
    /// Clock reading at decision time
    pub now: Timestamp,
}

impl<'a> SimulationContext<'a> {
    pub fn new(config: &'a GameConfig, runtime: &'a RuntimeConfig, now: Timestamp) -> Self {
        Self {
            config,
            runtime,
            now,
        }
    }

    pub fn placement_mode(&self) -> bool {
        self.runtime.placement_mode
    }

    /// Same configuration, later clock reading
    pub fn at(&self, now: Timestamp) -> Self {
        Self { now, ..*self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = GameConfig::default();
        assert_eq!(config.game.engage.kill_probability, 0.25);
        assert_eq!(config.game.engage.abstain_probability, 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
            [game.look_around]
            frequency = 0.2
            "#,
        )
        .unwrap();

        assert_eq!(config.game.look_around.frequency, 0.2);
        assert_eq!(config.game.engage.frequency, 2.0);
        assert_eq!(config.core.cycle_duration, 0.5);
    }

    #[test]
    fn test_cycles_per_second() {
        let config = GameConfig::from_toml_str("[core]\ncycle_duration = 0.25\n").unwrap();
        assert_eq!(config.core.cycles_per_second(), 4.0);
    }

    #[test]
    fn test_invalid_probability_rejected() {
        let result = GameConfig::from_toml_str("[game.engage]\nkill_probability = 1.5\n");
        assert!(matches!(result, Err(SkirmishError::Config(_))));
    }

    #[test]
    fn test_zero_cycle_duration_rejected() {
        let result = GameConfig::from_toml_str("[core]\ncycle_duration = 0.0\n");
        assert!(matches!(result, Err(SkirmishError::Config(_))));
    }

    #[test]
    fn test_non_finite_values_rejected() {
        for content in [
            "[core]\ncycle_duration = inf\n",
            "[core]\ncycle_duration = nan\n",
            "[game.look_around]\nfrequency = inf\n",
            "[game.look_around]\nfrequency = nan\n",
            "[game.engage]\nfrequency = inf\n",
            "[game.engage]\nfrequency = nan\n",
            "[game.engage]\nkill_probability = nan\n",
        ] {
            let result = GameConfig::from_toml_str(content);
            assert!(
                matches!(result, Err(SkirmishError::Config(_))),
                "accepted {:?}",
                content
            );
        }
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let result = GameConfig::from_toml_str("[core\n");
        assert!(matches!(result, Err(SkirmishError::Config(_))));
    }

    #[test]
    fn test_context_at() {
        let config = GameConfig::default();
        let runtime = RuntimeConfig {
            placement_mode: true,
            ..Default::default()
        };
        let ctx = SimulationContext::new(&config, &runtime, 1.0);
        let later = ctx.at(5.0);
        assert_eq!(later.now, 5.0);
        assert!(later.placement_mode());
    }
}
