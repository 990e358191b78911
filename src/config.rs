// Copyright (c) 2025 - Cowboy AI, Inc.
//! Runtime configuration for reactive sequences

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{ReactiveError, ReactiveResult};

/// Configuration shared by delay providers, the name generator service and
/// the step verifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactiveConfig {
    /// Upper bound (inclusive) for random per-element delays, in milliseconds
    pub max_random_delay_ms: u64,
    /// Maximum number of inner sequences `flat_map` polls at once (`None` = unbounded)
    pub flat_map_concurrency: Option<usize>,
    /// How long a step verifier waits for the terminal signal, in milliseconds
    pub verify_timeout_ms: u64,
}

impl Default for ReactiveConfig {
    fn default() -> Self {
        Self {
            max_random_delay_ms: 2000,
            flat_map_concurrency: None,
            verify_timeout_ms: 10_000,
        }
    }
}

impl ReactiveConfig {
    /// Load configuration from environment variables
    ///
    /// Unset variables keep their default value; malformed values are
    /// configuration errors.
    pub fn from_env() -> ReactiveResult<Self> {
        let defaults = Self::default();

        let max_random_delay_ms = env_parse("REACTIVE_MAX_DELAY_MS")?
            .unwrap_or(defaults.max_random_delay_ms);
        let flat_map_concurrency =
            env_parse("REACTIVE_FLAT_MAP_CONCURRENCY")?.or(defaults.flat_map_concurrency);
        let verify_timeout_ms = env_parse("REACTIVE_VERIFY_TIMEOUT_MS")?
            .unwrap_or(defaults.verify_timeout_ms);

        let config = Self {
            max_random_delay_ms,
            flat_map_concurrency,
            verify_timeout_ms,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a JSON document; missing fields take defaults
    pub fn from_json(json: &str) -> ReactiveResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values no sequence can run with
    pub fn validate(&self) -> ReactiveResult<()> {
        if self.flat_map_concurrency == Some(0) {
            return Err(ReactiveError::Configuration(
                "flat_map_concurrency must be at least 1".to_string(),
            ));
        }
        if self.verify_timeout_ms == 0 {
            return Err(ReactiveError::Configuration(
                "verify_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Upper bound for random per-element delays
    pub fn max_random_delay(&self) -> Duration {
        Duration::from_millis(self.max_random_delay_ms)
    }

    /// Step verifier timeout
    pub fn verify_timeout(&self) -> Duration {
        Duration::from_millis(self.verify_timeout_ms)
    }
}

fn env_parse<V: std::str::FromStr>(key: &str) -> ReactiveResult<Option<V>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ReactiveError::Configuration(format!("{key} has invalid value {raw:?}"))),
        Err(_) => Ok(None),
    }
}
