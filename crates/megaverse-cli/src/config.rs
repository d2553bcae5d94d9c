//! Environment-based configuration

use std::env;
use std::time::Duration;

use thiserror::Error;

use megaverse_api::DEFAULT_BASE_URL;
use megaverse_engine::DEFAULT_CONCURRENCY;

/// Runtime configuration, sourced from the environment
#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,
    pub candidate_id: String,
    pub concurrency: usize,
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Floor between one worker's successive calls; zero disables
    pub pacing: Duration,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {detail}")]
    Invalid {
        name: &'static str,
        detail: String,
    },
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// `CANDIDATE_ID` is required; `MEGAVERSE_BASE_URL`,
    /// `MEGAVERSE_CONCURRENCY`, `MEGAVERSE_MAX_ATTEMPTS`,
    /// `MEGAVERSE_BASE_DELAY`, and `MEGAVERSE_PACING` (humantime,
    /// e.g. "500ms") fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let candidate_id =
            env::var("CANDIDATE_ID").map_err(|_| ConfigError::Missing("CANDIDATE_ID"))?;
        let base_url =
            env::var("MEGAVERSE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let concurrency = parse_var("MEGAVERSE_CONCURRENCY", DEFAULT_CONCURRENCY)?;
        let max_attempts = parse_var("MEGAVERSE_MAX_ATTEMPTS", 3)?;
        let base_delay = duration_var("MEGAVERSE_BASE_DELAY", Duration::from_secs(1))?;
        let pacing = duration_var("MEGAVERSE_PACING", Duration::ZERO)?;

        Ok(Config {
            base_url,
            candidate_id,
            concurrency,
            max_attempts,
            base_delay,
            pacing,
        })
    }
}

fn duration_var(name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    match env::var(name) {
        Ok(text) => humantime::parse_duration(&text).map_err(|e| ConfigError::Invalid {
            name,
            detail: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn parse_var<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(text) => text.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            detail: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for name in [
            "CANDIDATE_ID",
            "MEGAVERSE_BASE_URL",
            "MEGAVERSE_CONCURRENCY",
            "MEGAVERSE_MAX_ATTEMPTS",
            "MEGAVERSE_BASE_DELAY",
            "MEGAVERSE_PACING",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn test_candidate_id_is_required() {
        clear_env();
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("CANDIDATE_ID")));
    }

    #[test]
    #[serial]
    fn test_defaults_apply() {
        clear_env();
        env::set_var("CANDIDATE_ID", "cand-1");

        let config = Config::from_env().unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.base_delay, Duration::from_secs(1));
        assert_eq!(config.pacing, Duration::ZERO);
    }

    #[test]
    #[serial]
    fn test_overrides_parse() {
        clear_env();
        env::set_var("CANDIDATE_ID", "cand-1");
        env::set_var("MEGAVERSE_BASE_URL", "http://localhost:9999");
        env::set_var("MEGAVERSE_CONCURRENCY", "8");
        env::set_var("MEGAVERSE_MAX_ATTEMPTS", "5");
        env::set_var("MEGAVERSE_BASE_DELAY", "250ms");
        env::set_var("MEGAVERSE_PACING", "100ms");

        let config = Config::from_env().unwrap();
        assert_eq!(config.base_url, "http://localhost:9999");
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.base_delay, Duration::from_millis(250));
        assert_eq!(config.pacing, Duration::from_millis(100));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_bad_duration_is_rejected() {
        clear_env();
        env::set_var("CANDIDATE_ID", "cand-1");
        env::set_var("MEGAVERSE_BASE_DELAY", "soon");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                name: "MEGAVERSE_BASE_DELAY",
                ..
            }
        ));
        clear_env();
    }
}
