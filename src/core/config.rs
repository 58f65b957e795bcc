//! Cooking configuration.
//!
//! Every field has a default, so an empty TOML file (or no file at all) gives
//! the stock behaviour. Values are checked by [`CookConfig::validate`] after
//! loading.

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;

/// Tunables for random generation, ingestion, export and the real-time loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookConfig {
    /// Steps applied by a random cook.
    pub iterations: usize,
    /// Scales randomly drawn parameters toward "no change" (0.0) or full range (1.0).
    pub strength: f64,
    /// Noise magnitude used when `-noise` has no explicit amount.
    pub noise_amount: i64,
    /// Inclusive step-count range for light recipes.
    pub light_steps: [usize; 2],
    /// Ingested images wider than this are scaled down to it.
    pub max_dimension: u32,
    /// JPEG quality (1-100) for exported artifacts.
    pub export_quality: u8,
    /// Contrast value applied to a live frame whose recipe failed.
    pub fallback_contrast: i64,
    /// Letterbox fill colour.
    pub background: [u8; 4],
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for CookConfig {
    fn default() -> Self {
        Self {
            iterations: 5,
            strength: 1.0,
            noise_amount: 60,
            light_steps: [4, 7],
            max_dimension: 800,
            export_quality: 92,
            fallback_contrast: 40,
            background: [17, 17, 17, 255],
            seed: None,
        }
    }
}

impl CookConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Read {
            path: path.display().to_string(),
            error,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.strength) {
            return Err(ConfigError::Invalid {
                field: "strength",
                reason: format!("{} is outside 0.0..=1.0", self.strength),
            });
        }
        let [low, high] = self.light_steps;
        if low == 0 || low > high {
            return Err(ConfigError::Invalid {
                field: "light_steps",
                reason: format!("[{low}, {high}] must be a non-empty range starting at 1 or more"),
            });
        }
        if self.max_dimension == 0 {
            return Err(ConfigError::Invalid {
                field: "max_dimension",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(1..=100).contains(&self.export_quality) {
            return Err(ConfigError::Invalid {
                field: "export_quality",
                reason: format!("{} is outside 1..=100", self.export_quality),
            });
        }
        if self.noise_amount < 0 {
            return Err(ConfigError::Invalid {
                field: "noise_amount",
                reason: "must not be negative".to_string(),
            });
        }
        Ok(())
    }

    /// Set the strength multiplier.
    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }

    /// Set the random cook length.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set a fixed seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// `light_steps` as a range. An inverted pair is read low to high so the
    /// range is never empty.
    pub fn light_step_range(&self) -> RangeInclusive<usize> {
        let [a, b] = self.light_steps;
        a.min(b)..=a.max(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CookConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.light_step_range(), 4..=7);
        assert_eq!(config.noise_amount, 60);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CookConfig::from_toml_str("iterations = 9\nseed = 42\n").unwrap();
        assert_eq!(config.iterations, 9);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.export_quality, 92);
    }

    #[test]
    fn test_invalid_strength_rejected() {
        let err = CookConfig::from_toml_str("strength = 1.5").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "strength", .. }));
    }

    #[test]
    fn test_inverted_light_steps_rejected() {
        let err = CookConfig::from_toml_str("light_steps = [7, 4]").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "light_steps", .. }));
    }

    #[test]
    fn test_inverted_light_step_range_is_ordered() {
        let config = CookConfig {
            light_steps: [7, 4],
            ..CookConfig::default()
        };
        assert_eq!(config.light_step_range(), 4..=7);
    }

    #[test]
    fn test_load_missing_file() {
        let err = CookConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
