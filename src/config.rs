//! Game tuning. The defaults are the reference game; change them only on purpose.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::Amount;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Seconds counted down before each round takes off.
    pub countdown_secs: u32,
    /// Cadence of multiplier growth while flying.
    pub flight_tick_ms: u64,
    /// Pause between a crash and the next countdown.
    pub crash_delay_ms: u64,
    /// Per-tick growth is `1% * rate` of the current multiplier.
    pub growth_rate: f64,
    pub instant_crash_probability: f64,
    /// Inclusive lower bound of a regular crash point.
    pub crash_min: f64,
    /// Exclusive upper bound of a regular crash point.
    pub crash_max: f64,
    pub history_capacity: usize,
    pub starting_balance: Amount,
    pub default_bet: Amount,
    pub min_bet: Amount,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            countdown_secs: 5,
            flight_tick_ms: 60,
            crash_delay_ms: 3_000,
            growth_rate: 0.15,
            instant_crash_probability: 0.10,
            crash_min: 1.01,
            crash_max: 9.01,
            history_capacity: 20,
            starting_balance: Amount::from_whole(1_000),
            default_bet: Amount::from_whole(10),
            min_bet: Amount::from_whole(1),
        }
    }
}

impl GameConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = std::fs::read(path)?;
        let config: GameConfig = serde_json::from_slice(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.countdown_secs == 0 {
            return invalid("countdown_secs must be positive");
        }
        if self.flight_tick_ms == 0 || self.crash_delay_ms == 0 {
            return invalid("flight_tick_ms and crash_delay_ms must be positive");
        }
        if !(self.growth_rate > 0.0 && self.growth_rate.is_finite()) {
            return invalid("growth_rate must be positive");
        }
        if !(0.0..=1.0).contains(&self.instant_crash_probability) {
            return invalid("instant_crash_probability must be within [0, 1]");
        }
        if !(self.crash_min >= 1.0 && self.crash_min < self.crash_max) {
            return invalid("crash range must satisfy 1.0 <= crash_min < crash_max");
        }
        // Crash points are drawn on the hundredths grid, which must be non-empty.
        if (self.crash_min * 100.0).round() >= (self.crash_max * 100.0).round() {
            return invalid("crash range is narrower than 0.01");
        }
        if self.history_capacity == 0 {
            return invalid("history_capacity must be positive");
        }
        if !self.min_bet.is_positive() || self.default_bet < self.min_bet {
            return invalid("min_bet must be positive and default_bet at least min_bet");
        }
        if self.starting_balance.is_negative() {
            return invalid("starting_balance must not be negative");
        }
        Ok(())
    }

    pub fn countdown_tick(&self) -> Duration {
        Duration::from_secs(1)
    }

    pub fn flight_tick(&self) -> Duration {
        Duration::from_millis(self.flight_tick_ms)
    }

    pub fn crash_delay(&self) -> Duration {
        Duration::from_millis(self.crash_delay_ms)
    }
}
