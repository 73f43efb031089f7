//! Environment configuration.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone)]
pub struct Config {
    /// Absent means the in-memory store is used.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub port: u16,
    /// Shared password clients send as a bearer token.
    pub password: String,
    pub currency: String,
    pub confirmation_display: Duration,
    pub image_dir: PathBuf,
    pub image_base_url: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url.as_ref().map(|_| "[redacted]"))
            .field("db_max_connections", &self.db_max_connections)
            .field("port", &self.port)
            .field("password", &"[redacted]")
            .field("currency", &self.currency)
            .field("confirmation_display", &self.confirmation_display)
            .field("image_dir", &self.image_dir)
            .field("image_base_url", &self.image_base_url)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let password = get("POS_PASSWORD").filter(|p| !p.is_empty()).ok_or(ConfigError::Missing("POS_PASSWORD"))?;
        let confirmation_ms: u64 = parse(&get, "CONFIRMATION_DISPLAY_MS", 2000)?;
        Ok(Self {
            database_url: get("DATABASE_URL").filter(|u| !u.is_empty()),
            db_max_connections: parse(&get, "DB_MAX_CONNECTIONS", 10)?,
            port: parse(&get, "PORT", 8083)?,
            password,
            currency: get("CURRENCY").unwrap_or_else(|| "BRL".to_string()),
            confirmation_display: Duration::from_millis(confirmation_ms),
            image_dir: get("IMAGE_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("./images")),
            image_base_url: get("IMAGE_BASE_URL").unwrap_or_else(|| "/images".to_string()),
        })
    }
}

fn parse<T: std::str::FromStr>(get: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match get(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }),
    }
}
