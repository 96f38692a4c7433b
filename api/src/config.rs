use std::env;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Rate limit for the batch registration method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub per_second: u64,
    pub burst: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Create the groups table on startup if it is missing
    pub auto_migrate: bool,
    /// `None` disables rate limiting of AddGroups
    pub add_groups_rate_limit: Option<RateLimit>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from any variable source
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => database_url_from_parts(&lookup)?,
        };

        let per_second = parse_or(&lookup, "ADD_GROUPS_PER_SECOND", 2u64)?;
        let burst = parse_or(&lookup, "ADD_GROUPS_BURST", 5u32)?;
        let add_groups_rate_limit =
            (per_second > 0 && burst > 0).then_some(RateLimit { per_second, burst });

        Ok(Self {
            database_url,
            port: parse_or(&lookup, "PORT", 8990)?,
            auto_migrate: parse_or(&lookup, "AUTO_MIGRATE", true)?,
            add_groups_rate_limit,
        })
    }
}

/// Assemble a PostgreSQL URL from `DB_*` variables
fn database_url_from_parts(
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    let host = lookup("DB_HOST").ok_or(ConfigError::Missing("DATABASE_URL or DB_HOST"))?;
    let port = lookup("DB_PORT").unwrap_or_else(|| "5432".to_string());
    let user = lookup("DB_USER").ok_or(ConfigError::Missing("DB_USER"))?;
    let password = lookup("DB_PASSWORD").unwrap_or_default();
    let name = lookup("DB_NAME").ok_or(ConfigError::Missing("DB_NAME"))?;

    Ok(format!(
        "postgres://{}:{}@{}:{}/{}",
        user, password, host, port, name
    ))
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
