//! Service configuration loaded from environment variables.

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// Path of the SQLite database file.
    pub database_path: PathBuf,
    pub max_connections: u32,
    /// Fixed seed for reviewer selection. Random when unset.
    pub reviewer_seed: Option<u64>,
    /// How many times a pull request update is attempted before a version
    /// conflict is reported to the caller.
    pub max_update_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::from([0, 0, 0, 0]),
            port: 8080,
            database_path: PathBuf::from("pr-reviewer.db"),
            max_connections: 5,
            reviewer_seed: None,
            max_update_attempts: 3,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_addr = parse_or("BIND_ADDR", get("BIND_ADDR"), defaults.bind_addr)?;
        let port = parse_or("PORT", get("PORT"), defaults.port)?;
        let database_path = get("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);
        let max_connections = parse_or(
            "DATABASE_MAX_CONNECTIONS",
            get("DATABASE_MAX_CONNECTIONS"),
            defaults.max_connections,
        )?;
        let reviewer_seed = get("REVIEWER_SEED")
            .map(|v| parse("REVIEWER_SEED", v))
            .transpose()?;
        let max_update_attempts = parse_or(
            "MAX_UPDATE_ATTEMPTS",
            get("MAX_UPDATE_ATTEMPTS"),
            defaults.max_update_attempts,
        )?;

        if max_update_attempts == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_UPDATE_ATTEMPTS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                name: "DATABASE_MAX_CONNECTIONS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(Self {
            bind_addr,
            port,
            database_path,
            max_connections,
            reviewer_seed,
            max_update_attempts,
        })
    }
}

fn parse<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
        value,
    })
}

fn parse_or<T>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(value) => parse(name, value),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_update_attempts, 3);
        assert!(config.reviewer_seed.is_none());
        assert_eq!(config.database_path, PathBuf::from("pr-reviewer.db"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("BIND_ADDR", "127.0.0.1"),
            ("DATABASE_PATH", "/tmp/reviews.db"),
            ("REVIEWER_SEED", "42"),
            ("MAX_UPDATE_ATTEMPTS", "5"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.bind_addr, IpAddr::from([127, 0, 0, 1]));
        assert_eq!(config.database_path, PathBuf::from("/tmp/reviews.db"));
        assert_eq!(config.reviewer_seed, Some(42));
        assert_eq!(config.max_update_attempts, 5);
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = config_from(&[("PORT", "  "), ("REVIEWER_SEED", "")]).unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.reviewer_seed.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().starts_with("PORT has an invalid value"));

        assert!(config_from(&[("MAX_UPDATE_ATTEMPTS", "0")]).is_err());
    }
}
