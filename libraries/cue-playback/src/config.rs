//! Controller timing configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tick intervals used by every [`PlaybackController`](crate::PlaybackController)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Envelope recompute interval while fading (milliseconds)
    #[serde(default = "default_fade_tick_ms")]
    pub fade_tick_ms: u64,

    /// Position extrapolation interval for external sources (milliseconds)
    #[serde(default = "default_position_tick_ms")]
    pub position_tick_ms: u64,
}

fn default_fade_tick_ms() -> u64 {
    20
}

fn default_position_tick_ms() -> u64 {
    50
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            fade_tick_ms: default_fade_tick_ms(),
            position_tick_ms: default_position_tick_ms(),
        }
    }
}

impl ControllerConfig {
    /// Fade tick interval (never zero)
    pub fn fade_tick(&self) -> Duration {
        Duration::from_millis(self.fade_tick_ms.max(1))
    }

    /// Position tick interval (never zero)
    pub fn position_tick(&self) -> Duration {
        Duration::from_millis(self.position_tick_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.fade_tick(), Duration::from_millis(20));
        assert_eq!(config.position_tick(), Duration::from_millis(50));
    }

    #[test]
    fn zero_interval_is_bumped() {
        let config = ControllerConfig {
            fade_tick_ms: 0,
            position_tick_ms: 0,
        };
        assert_eq!(config.fade_tick(), Duration::from_millis(1));
        assert_eq!(config.position_tick(), Duration::from_millis(1));
    }
}
