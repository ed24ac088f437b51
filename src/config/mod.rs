//! Process configuration, read from the environment (and `.env` via dotenvy).

use std::net::SocketAddr;
use std::str::FromStr;

use ipnet::IpNet;
use thiserror::Error;

use crate::store::UniquenessScope;

pub mod database;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    MySql,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "mysql" => Ok(Self::MySql),
            other => Err(format!("unknown store backend `{other}` (expected memory or mysql)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsConfig {
    Disabled,
    AnyOrigin,
    Origins(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitConfig {
    /// Tokens refilled per second.
    pub rps: f64,
    /// Bucket capacity.
    pub burst: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            rps: 100.0,
            burst: 200.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub unique_phone: bool,
    pub cors: CorsConfig,
    pub rate_limit: RateLimitConfig,
    pub trusted_proxies: Vec<IpNet>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3002,
            store: StoreBackend::Memory,
            database_url: None,
            database_max_connections: 5,
            unique_phone: false,
            cors: CorsConfig::Disabled,
            rate_limit: RateLimitConfig::default(),
            trusted_proxies: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("APP_HOST").unwrap_or(defaults.host);
        let port = parse_or("APP_PORT", var("APP_PORT"), defaults.port)?;
        let store = parse_or("STORE_BACKEND", var("STORE_BACKEND"), defaults.store)?;
        let database_url = var("DATABASE_URL");
        if store == StoreBackend::MySql && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        let database_max_connections = parse_or(
            "DATABASE_MAX_CONNECTIONS",
            var("DATABASE_MAX_CONNECTIONS"),
            defaults.database_max_connections,
        )?;
        let unique_phone = parse_flag("UNIQUE_PHONE", var("UNIQUE_PHONE"))?.unwrap_or(false);

        let enable_cors = parse_flag("ENABLE_CORS", var("ENABLE_CORS"))?.unwrap_or(false);
        let cors = match var("CORS_ALLOWED_ORIGINS") {
            Some(list) if list.trim() == "*" => CorsConfig::AnyOrigin,
            Some(list) => CorsConfig::Origins(
                list.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            None if enable_cors => CorsConfig::AnyOrigin,
            None => CorsConfig::Disabled,
        };

        let rps: f64 = parse_or("RATE_LIMIT_RPS", var("RATE_LIMIT_RPS"), defaults.rate_limit.rps)?;
        let burst: f64 = parse_or("RATE_LIMIT_BURST", var("RATE_LIMIT_BURST"), rps * 2.0)?;
        // NaN fails every comparison, so finiteness is checked explicitly.
        if !rps.is_finite() || !burst.is_finite() || rps <= 0.0 || burst < 1.0 {
            return Err(ConfigError::Invalid {
                key: "RATE_LIMIT_RPS",
                value: format!("{rps}/{burst}"),
                reason: "rate must be positive and burst at least 1".to_string(),
            });
        }

        let trusted_proxies = match var("TRUSTED_PROXIES") {
            Some(raw) => parse_proxies(&raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            host,
            port,
            store,
            database_url,
            database_max_connections,
            unique_phone,
            cors,
            rate_limit: RateLimitConfig { rps, burst },
            trusted_proxies,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            key: "APP_HOST",
            value: raw,
            reason: e.to_string(),
        })
    }

    pub fn uniqueness_scope(&self) -> UniquenessScope {
        UniquenessScope::from_unique_phone(self.unique_phone)
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

fn parse_flag(key: &'static str, raw: Option<String>) -> Result<Option<bool>, ConfigError> {
    let Some(value) = raw else {
        return Ok(None);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::Invalid {
            key,
            value,
            reason: "expected true or false".to_string(),
        }),
    }
}

fn parse_proxies(raw: &str) -> Result<Vec<IpNet>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            IpNet::from_str(s).map_err(|e| ConfigError::Invalid {
                key: "TRUSTED_PROXIES",
                value: s.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}
