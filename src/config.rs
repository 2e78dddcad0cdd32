use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;

use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub session_file: PathBuf,
    pub request_timeout: Duration,

    // Cache staleness for employee list/detail queries
    pub employee_stale: Duration,

    pub currency_symbol: String,

    pub log_dir: PathBuf,
    pub log_level: tracing::Level,
}

impl Config {
    /// Config with defaults for everything except the backend URL
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            session_file: PathBuf::from(".hrm-admin/session.json"),
            request_timeout: Duration::from_secs(100),
            employee_stale: Duration::from_secs(5 * 60),
            currency_symbol: "₱".to_string(),
            log_dir: PathBuf::from("logs"),
            log_level: tracing::Level::INFO,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("API_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("API_BASE_URL"))?;
        let mut config = Self::new(api_base_url.trim());

        if let Some(path) = lookup("SESSION_FILE") {
            config.session_file = PathBuf::from(path);
        }
        config.request_timeout =
            Duration::from_secs(parse_var(&lookup, "REQUEST_TIMEOUT_SECS", 100u64)?);
        config.employee_stale =
            Duration::from_secs(parse_var(&lookup, "EMPLOYEE_STALE_SECS", 300u64)?);

        if let Some(symbol) = lookup("CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }
        if let Some(dir) = lookup("LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }
        config.log_level = parse_var(&lookup, "LOG_LEVEL", tracing::Level::INFO)?;

        Ok(config)
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value: value.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
