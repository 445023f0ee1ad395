//! Game scheduling configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Game scheduling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    /// Seconds between consecutive draws of a running game
    #[serde(default = "default_draw_interval")]
    pub draw_interval_secs: u64,

    /// Maximum number of game rows kept before trimming
    #[serde(default = "default_retention_cap")]
    pub retention_cap: u64,
}

impl GameConfig {
    /// Get the draw interval as Duration
    pub fn draw_interval(&self) -> Duration {
        Duration::from_secs(self.draw_interval_secs)
    }

    /// Validate game configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.draw_interval_secs == 0 {
            return Err(ValidationError::InvalidDrawInterval);
        }
        if self.retention_cap == 0 {
            return Err(ValidationError::InvalidRetentionCap);
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            draw_interval_secs: default_draw_interval(),
            retention_cap: default_retention_cap(),
        }
    }
}

fn default_draw_interval() -> u64 {
    10
}

fn default_retention_cap() -> u64 {
    200
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_config_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.draw_interval_secs, 10);
        assert_eq!(config.retention_cap, 200);
    }

    #[test]
    fn test_validation_rejects_zero_interval() {
        let config = GameConfig {
            draw_interval_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_cap() {
        let config = GameConfig {
            retention_cap: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_draw_interval_duration() {
        let config = GameConfig {
            draw_interval_secs: 5,
            ..Default::default()
        };
        assert_eq!(config.draw_interval(), Duration::from_secs(5));
    }
}
