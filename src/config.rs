use anyhow::Context;
use std::{env, path::PathBuf, str::FromStr};

use crate::models::slots::SlotGrid;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_DATABASE_URL: &str = "guidance.db";
pub const DEFAULT_LOGIN_TTL_SECS: i64 = 3600;
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

/// Server settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind: String,
    pub login_ttl_secs: i64,
    pub slot_grid: SlotGrid,
    pub static_dir: Option<PathBuf>,
    pub bootstrap_admin: Option<BootstrapAdmin>,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind: DEFAULT_BIND.to_string(),
            login_ttl_secs: DEFAULT_LOGIN_TTL_SECS,
            slot_grid: SlotGrid::default(),
            static_dir: None,
            bootstrap_admin: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let login_ttl_secs = parse_or(get("LOGIN_TTL_SECS"), "LOGIN_TTL_SECS", defaults.login_ttl_secs)?;
        if login_ttl_secs <= 0 {
            anyhow::bail!("LOGIN_TTL_SECS must be positive");
        }

        let slot_minutes = parse_or(get("SLOT_MINUTES"), "SLOT_MINUTES", defaults.slot_grid.minutes)?;
        let slot_grid = SlotGrid::parse(
            get("SLOT_START").as_deref().unwrap_or("08:00"),
            get("SLOT_END").as_deref().unwrap_or("17:00"),
            slot_minutes,
        )
        .context("Invalid slot configuration")?;

        let bootstrap_admin = match (get("ADMIN_USERNAME"), get("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(BootstrapAdmin { username, password }),
            (None, None) => None,
            _ => anyhow::bail!("ADMIN_USERNAME and ADMIN_PASSWORD must be set together"),
        };

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            bind: get("BIND_ADDR").unwrap_or(defaults.bind),
            login_ttl_secs,
            slot_grid,
            static_dir: get("STATIC_DIR").map(PathBuf::from),
            bootstrap_admin,
            log_filter: get("LOG_FILTER").unwrap_or(defaults.log_filter),
        })
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T> {
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid value for {}: '{}'", key, value)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.login_ttl_secs, 3600);
        assert_eq!(config.slot_grid, SlotGrid::default());
        assert!(config.bootstrap_admin.is_none());
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("BIND_ADDR", "0.0.0.0:9000"),
            ("LOGIN_TTL_SECS", "60"),
            ("SLOT_START", "09:00"),
            ("SLOT_END", "12:00"),
            ("SLOT_MINUTES", "30"),
            ("ADMIN_USERNAME", "counselor"),
            ("ADMIN_PASSWORD", "changeme"),
        ])
        .unwrap();
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.login_ttl_secs, 60);
        assert_eq!(config.slot_grid.start_times().len(), 6);
        assert_eq!(
            config.bootstrap_admin.map(|admin| admin.username),
            Some("counselor".to_string())
        );
    }

    #[test]
    fn invalid_values_fail_startup() {
        assert!(config_from(&[("LOGIN_TTL_SECS", "soon")]).is_err());
        assert!(config_from(&[("LOGIN_TTL_SECS", "0")]).is_err());
        assert!(config_from(&[("SLOT_START", "18:00")]).is_err());
        assert!(config_from(&[("ADMIN_USERNAME", "counselor")]).is_err());
    }
}
