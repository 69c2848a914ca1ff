//! Game configuration.
//!
//! Every field has a default taken from the tuned values of the game, so a JSON
//! config only needs to list what it overrides.

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of columns (>= 2).
    pub width: usize,
    /// Number of rows (>= 2).
    pub height: usize,
    /// Number of piece colors (>= 2).
    pub color_count: usize,

    /// Points per matched piece.
    pub score_multiplier: u32,
    /// A bomb is spawned every time the score crosses another multiple of this.
    pub bomb_interval: u32,
    /// Turns a freshly spawned bomb survives.
    pub bomb_counter: u32,

    /// Falling speed of moved/spawned pieces in world units per second.
    pub move_speed: f32,
    /// Blow animation speed (1 / duration in seconds).
    pub blow_speed: f32,
    /// Tuple rotation speed in degrees per second.
    pub rotate_speed: f32,
    /// Pause between spotting a match and removing it, in seconds.
    pub match_delay: f32,

    /// Fixed RNG seed for reproducible games.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 8,
            height: 9,
            color_count: 5,
            score_multiplier: 5,
            bomb_interval: 1000,
            bomb_counter: 8,
            move_speed: 7.5,
            blow_speed: 2.0,
            rotate_speed: 700.0,
            match_delay: 0.5,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).inspect_err(|e| {
            error!("Failed to parse game config: {}", e);
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the grid/palette constraints. Logged and returned on failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let result = validate_dimensions(self.width, self.height, self.color_count);
        if let Err(e) = &result {
            error!("Invalid game config: {}", e);
        }
        result
    }
}

pub(crate) fn validate_dimensions(
    width: usize,
    height: usize,
    color_count: usize,
) -> Result<(), ConfigError> {
    if width < 2 || height < 2 {
        return Err(ConfigError::GridTooSmall { width, height });
    }
    if color_count < 2 {
        return Err(ConfigError::TooFewColors(color_count));
    }
    if color_count > u8::MAX as usize {
        return Err(ConfigError::TooManyColors(color_count));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json_str(r#"{ "width": 6, "seed": 42 }"#).unwrap();
        assert_eq!(config.width, 6);
        assert_eq!(config.height, GameConfig::default().height);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_rejects_small_grid() {
        let err = GameConfig::from_json_str(r#"{ "width": 1 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::GridTooSmall { width: 1, .. }));
    }

    #[test]
    fn test_rejects_single_color() {
        let config = GameConfig {
            color_count: 1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::TooFewColors(1))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = GameConfig::from_json_str("{ width: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
