//! Application settings loaded from environment variables.

use std::env;
use std::time::Duration;

use thiserror::Error;

use super::constants::{
    DEFAULT_ACCESS_TOKEN_TTL_SECS, DEFAULT_DB_HOST, DEFAULT_DB_MAX_CONNECTIONS,
    DEFAULT_DB_MIN_CONNECTIONS, DEFAULT_DB_NAME, DEFAULT_DB_PORT, DEFAULT_DB_USER,
    DEFAULT_REFRESH_TOKEN_TTL_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT, MAX_TOKEN_TTL_SECS, MIN_JWT_SECRET_LENGTH,
};

/// Startup configuration errors. Any of these aborts the process.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Signing material and lifetimes for the token service.
#[derive(Clone)]
pub struct TokenSettings {
    access_secret: String,
    refresh_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("access_secret", &"[REDACTED]")
            .field("refresh_secret", &"[REDACTED]")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish()
    }
}

impl TokenSettings {
    /// Build token settings, enforcing distinct secrets of sufficient length.
    pub fn new(
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
        access_ttl_secs: i64,
        refresh_ttl_secs: i64,
    ) -> Result<Self, ConfigError> {
        let access_secret = access_secret.into();
        let refresh_secret = refresh_secret.into();

        check_secret("ACCESS_SECRET", &access_secret)?;
        check_secret("REFRESH_SECRET", &refresh_secret)?;

        if access_secret == refresh_secret {
            return Err(ConfigError::Invalid {
                var: "REFRESH_SECRET",
                reason: "must differ from ACCESS_SECRET".to_string(),
            });
        }
        check_ttl("ACCESS_TOKEN_TTL_SECS", access_ttl_secs)?;
        check_ttl("REFRESH_TOKEN_TTL_SECS", refresh_ttl_secs)?;

        Ok(Self {
            access_secret,
            refresh_secret,
            access_ttl_secs,
            refresh_ttl_secs,
        })
    }

    pub fn access_secret_bytes(&self) -> &[u8] {
        self.access_secret.as_bytes()
    }

    pub fn refresh_secret_bytes(&self) -> &[u8] {
        self.refresh_secret.as_bytes()
    }
}

fn check_secret(var: &'static str, secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::Invalid {
            var,
            reason: format!("must be at least {} characters long", MIN_JWT_SECRET_LENGTH),
        });
    }
    Ok(())
}

fn check_ttl(var: &'static str, ttl_secs: i64) -> Result<(), ConfigError> {
    if ttl_secs <= 0 {
        return Err(ConfigError::Invalid {
            var,
            reason: "must be positive".to_string(),
        });
    }
    if ttl_secs > MAX_TOKEN_TTL_SECS {
        return Err(ConfigError::Invalid {
            var,
            reason: format!("must not exceed {} seconds", MAX_TOKEN_TTL_SECS),
        });
    }
    Ok(())
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub tokens: TokenSettings,
    pub server_host: String,
    pub server_port: u16,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("tokens", &self.tokens)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment (and `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    /// Fails when either signing secret is absent or unusable, or when a
    /// numeric setting does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_secret = lookup("ACCESS_SECRET").ok_or(ConfigError::Missing("ACCESS_SECRET"))?;
        let refresh_secret =
            lookup("REFRESH_SECRET").ok_or(ConfigError::Missing("REFRESH_SECRET"))?;

        let tokens = TokenSettings::new(
            access_secret,
            refresh_secret,
            parse_or(&lookup, "ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TOKEN_TTL_SECS)?,
            parse_or(&lookup, "REFRESH_TOKEN_TTL_SECS", DEFAULT_REFRESH_TOKEN_TTL_SECS)?,
        )?;

        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => {
                let host = lookup("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string());
                let port: u16 = parse_or(&lookup, "DB_PORT", DEFAULT_DB_PORT)?;
                let user = lookup("DB_USER").unwrap_or_else(|| DEFAULT_DB_USER.to_string());
                let password = lookup("DB_PASSWORD").unwrap_or_default();
                let name = lookup("DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string());
                format!("postgres://{}:{}@{}:{}/{}", user, password, host, port, name)
            }
        };

        let request_timeout_secs: u64 =
            parse_or(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        if request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "REQUEST_TIMEOUT_SECS",
                reason: "must be positive".to_string(),
            });
        }

        Ok(Self {
            database_url,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            db_min_connections: parse_or(&lookup, "DB_MIN_CONNECTIONS", DEFAULT_DB_MIN_CONNECTIONS)?,
            tokens,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            server_port: parse_or(&lookup, "PORT", DEFAULT_SERVER_PORT)?,
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
