//! Heist tuning: countdown policy and puzzle pacing
//!
//! Loaded once at startup (JSON, missing fields fall back to defaults) and
//! validated before any heist starts.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Timer policy and engine delays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeistSettings {
    // === Countdown ===
    /// Base seconds granted per layer
    pub seconds_per_layer: u32,
    /// Extra buffer seconds granted per layer
    pub buffer_seconds_per_layer: u32,
    /// Seconds added when a layer is solved (clamped to the starting total)
    pub solve_bonus_seconds: u32,

    // === Memory ===
    /// Pause before a matching pair locks in
    pub memory_match_delay_ms: u32,
    /// Pause before a mismatched pair flips back
    pub memory_mismatch_delay_ms: u32,

    // === Pattern ===
    /// Time between revealing successive path nodes
    pub pattern_step_interval_ms: u32,

    // === Cracker ===
    /// How long the secret is shown after running out of attempts
    pub cracker_reset_delay_ms: u32,
}

impl Default for HeistSettings {
    fn default() -> Self {
        Self {
            seconds_per_layer: 30,
            buffer_seconds_per_layer: 10,
            solve_bonus_seconds: 10,

            memory_match_delay_ms: 400,
            memory_mismatch_delay_ms: 800,

            pattern_step_interval_ms: 500,

            cracker_reset_delay_ms: 2000,
        }
    }
}

impl HeistSettings {
    /// Countdown length for a mission with `layers` puzzle layers
    pub fn total_seconds(&self, layers: usize) -> Result<u32, ConfigError> {
        let overflow = || ConfigError::CountdownOverflow { layers };
        let count = u32::try_from(layers).map_err(|_| overflow())?;
        self.seconds_per_layer
            .checked_add(self.buffer_seconds_per_layer)
            .and_then(|per_layer| per_layer.checked_mul(count))
            .ok_or_else(overflow)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let check = |field: &'static str, value: u32, min: u32| {
            if value < min {
                Err(ConfigError::SettingTooSmall { field, min, value })
            } else {
                Ok(())
            }
        };
        check("seconds_per_layer", self.seconds_per_layer, 1)?;
        check("pattern_step_interval_ms", self.pattern_step_interval_ms, 1)?;
        check("memory_mismatch_delay_ms", self.memory_mismatch_delay_ms, 1)?;
        check("cracker_reset_delay_ms", self.cracker_reset_delay_ms, 1)?;
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded heist settings from {}", path.display());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timer_policy() {
        let settings = HeistSettings::default();
        assert_eq!(settings.total_seconds(1).unwrap(), 40);
        assert_eq!(settings.total_seconds(3).unwrap(), 120);
        assert_eq!(settings.total_seconds(0).unwrap(), 0);
    }

    #[test]
    fn test_huge_timer_overflow_is_an_error() {
        let settings = HeistSettings::from_json(r#"{ "seconds_per_layer": 3000000000 }"#).unwrap();
        assert_eq!(settings.total_seconds(1).unwrap(), 3_000_000_010);
        assert!(matches!(
            settings.total_seconds(2),
            Err(ConfigError::CountdownOverflow { layers: 2 })
        ));

        let settings = HeistSettings {
            seconds_per_layer: u32::MAX,
            buffer_seconds_per_layer: 1,
            ..HeistSettings::default()
        };
        assert!(settings.total_seconds(1).is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = HeistSettings::from_json(r#"{ "solve_bonus_seconds": 5 }"#).unwrap();
        assert_eq!(settings.solve_bonus_seconds, 5);
        assert_eq!(settings.seconds_per_layer, 30);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let err = HeistSettings::from_json(r#"{ "seconds_per_layer": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::SettingTooSmall { field: "seconds_per_layer", .. }
        ));
        assert!(matches!(HeistSettings::from_json("{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = HeistSettings::load_from_path("/nonexistent/lockpicker.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
