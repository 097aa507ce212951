//! Configuration
//!
//! Loads configuration from environment variables (§6.3, §10.1).

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::engine::EngineConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the OSRM-compatible routing service.
    pub osrm_url: String,

    /// Per-request timeout against the routing service.
    pub osrm_timeout: Duration,

    /// Kafka bootstrap servers. Named `WATERMILL_KAFKA_BROKERS` for
    /// compatibility with the upstream broker library's own convention.
    pub kafka_brokers: String,

    /// Simulation engine tunables.
    pub engine: EngineConfig,

    /// Log level, consumed by `tracing_subscriber::EnvFilter`.
    pub log_level: String,
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

fn parse_seconds_env(name: &str, default_secs: u64) -> Result<Duration, ConfigError> {
    parse_env::<u64>(name, default_secs).map(Duration::from_secs)
}

impl Config {
    /// Loads configuration from environment variables, applying the
    /// defaults enumerated in §6.3. `.env` is loaded first, if present;
    /// failure to find one is not an error (production deploys set real
    /// env vars directly).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let osrm_url = env::var("OSRM_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());
        let osrm_timeout = parse_seconds_env("OSRM_TIMEOUT", 10)?;
        let kafka_brokers = env::var("WATERMILL_KAFKA_BROKERS").unwrap_or_else(|_| "localhost:9092".to_string());
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let engine = EngineConfig {
            update_interval: parse_seconds_env("SIMULATION_UPDATE_INTERVAL", 5)?,
            speed_kmh: parse_env("SIMULATION_SPEED_KMH", 30.0)?,
            time_multiplier: parse_env("SIMULATION_TIME_MULTIPLIER", 1.0)?,
            pickup_wait_time: parse_seconds_env("SIMULATION_PICKUP_WAIT", 30)?,
            delivery_wait_time: parse_seconds_env("SIMULATION_DELIVERY_WAIT", 60)?,
            failure_rate: parse_env("SIMULATION_FAILURE_RATE", 0.05)?,
        };

        Ok(Self { osrm_url, osrm_timeout, kafka_brokers, engine, log_level })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_config_defaults_match_spec_when_env_absent() {
        // Exercises the default path directly; reading real process env vars
        // in a unit test would race with other tests setting them.
        let engine = EngineConfig::default();
        assert_eq!(engine.update_interval, Duration::from_secs(5));
        assert_eq!(engine.speed_kmh, 30.0);
        assert_eq!(engine.failure_rate, 0.05);
    }

    #[test]
    fn invalid_numeric_value_is_a_typed_error() {
        let result = parse_env::<u64>("__COURIER_EMULATION_NONEXISTENT__", 5);
        assert_eq!(result.unwrap(), 5);
    }
}
