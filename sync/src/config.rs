//! Configuration for the simulated sync layer.

use std::env;
use std::time::Duration;

/// Sync layer configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Lower bound of simulated round-trip latency
    pub latency_min: Duration,
    /// Upper bound of simulated round-trip latency
    pub latency_max: Duration,
    /// Probability that a save attempt fails transiently
    pub failure_rate: f64,
    /// Delay before the bundled seed data is returned
    pub seed_delay: Duration,
    /// How long an optimistic save can be undone (milliseconds)
    pub undo_window_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            latency_min: Duration::from_millis(400),
            latency_max: Duration::from_millis(900),
            failure_rate: 0.15,
            seed_delay: Duration::from_millis(100),
            undo_window_ms: shelf_engine::DEFAULT_UNDO_WINDOW_MS,
        }
    }
}

impl SyncConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let latency_min = millis_var("SHELF_LATENCY_MIN_MS")?.unwrap_or(defaults.latency_min);
        let latency_max = millis_var("SHELF_LATENCY_MAX_MS")?.unwrap_or(defaults.latency_max);

        let failure_rate = match env::var("SHELF_FAILURE_RATE") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SHELF_FAILURE_RATE", raw))?,
            Err(_) => defaults.failure_rate,
        };

        let seed_delay = millis_var("SHELF_SEED_DELAY_MS")?.unwrap_or(defaults.seed_delay);
        let undo_window_ms = u64_var("SHELF_UNDO_WINDOW_MS")?.unwrap_or(defaults.undo_window_ms);

        let config = Self {
            latency_min,
            latency_max,
            failure_rate,
            seed_delay,
            undo_window_ms,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(ConfigError::FailureRateOutOfRange(self.failure_rate));
        }
        if self.latency_min > self.latency_max {
            return Err(ConfigError::InvertedLatency);
        }
        Ok(())
    }
}

fn u64_var(key: &'static str) -> Result<Option<u64>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        Err(_) => Ok(None),
    }
}

fn millis_var(key: &'static str) -> Result<Option<Duration>, ConfigError> {
    Ok(u64_var(key)?.map(Duration::from_millis))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),

    #[error("Failure rate must be within 0.0..=1.0, got {0}")]
    FailureRateOutOfRange(f64),

    #[error("SHELF_LATENCY_MIN_MS must not exceed SHELF_LATENCY_MAX_MS")]
    InvertedLatency,
}
