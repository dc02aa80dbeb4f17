//! Playback configuration

use std::time::Duration;

use super::PlaybackError;

/// Default interval between automatic advances
pub const DEFAULT_SPEED_MS: u64 = 1000;

/// Tunable playback parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackConfig {
    /// Milliseconds between automatic advances (must be > 0)
    pub speed_ms: u64,

    /// Rewind to the first step when `play` is called at the last one
    pub auto_rewind: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed_ms: DEFAULT_SPEED_MS,
            auto_rewind: true,
        }
    }
}

impl PlaybackConfig {
    /// Set the tick interval
    pub fn with_speed_ms(mut self, speed_ms: u64) -> Self {
        self.speed_ms = speed_ms;
        self
    }

    /// Enable or disable rewinding on `play` at the end
    pub fn with_auto_rewind(mut self, enabled: bool) -> Self {
        self.auto_rewind = enabled;
        self
    }

    /// Reject a zero interval
    pub fn validate(&self) -> Result<(), PlaybackError> {
        if self.speed_ms == 0 {
            return Err(PlaybackError::InvalidSpeed(self.speed_ms));
        }
        Ok(())
    }

    /// Tick interval as a `Duration`
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.speed_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.speed_ms, DEFAULT_SPEED_MS);
        assert!(config.auto_rewind);
        assert!(config.validate().is_ok());
        assert_eq!(config.interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_zero_speed_rejected() {
        let config = PlaybackConfig::default().with_speed_ms(0);
        assert_eq!(config.validate(), Err(PlaybackError::InvalidSpeed(0)));
    }
}
