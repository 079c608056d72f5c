use crate::domain::Credentials;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_HOST: &str = "https://api.switch-bot.com";
pub const DEFAULT_CACHE_PATH: &str = "workflow/device-list.json";
pub const DEVICE_CACHE_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

const TOKEN_VAR: &str = "OPEN_TOKEN";
const SECRET_VAR: &str = "SECRET";
const API_HOST_VAR: &str = "SBCTL_API_HOST";
const CACHE_PATH_VAR: &str = "SBCTL_CACHE_PATH";
const LOG_FORMAT_VAR: &str = "SBCTL_LOG_FORMAT";

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set\nHint: export OPEN_TOKEN and SECRET from the app's developer options.")]
    MissingVar(&'static str),
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub credentials: Credentials,
    pub api_host: String,
    pub cache_path: PathBuf,
    pub cache_max_age: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let token = non_empty(TOKEN_VAR).ok_or(ConfigError::MissingVar(TOKEN_VAR))?;
        let secret = non_empty(SECRET_VAR).ok_or(ConfigError::MissingVar(SECRET_VAR))?;

        let api_host = non_empty(API_HOST_VAR)
            .map(|host| host.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_HOST.to_string());
        let cache_path = non_empty(CACHE_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH));

        Ok(Self {
            credentials: Credentials::new(token, secret),
            api_host,
            cache_path,
            cache_max_age: DEVICE_CACHE_MAX_AGE,
        })
    }
}

/// Whether logs should be emitted as JSON lines (`SBCTL_LOG_FORMAT=json`).
pub fn log_json_from_env() -> bool {
    std::env::var(LOG_FORMAT_VAR).is_ok_and(|value| value.eq_ignore_ascii_case("json"))
}
