//! Runtime configuration read from the process environment.
//!
//! Values are looked up through a closure so that the same parsing runs
//! against `std::env` in the binary and against plain maps in tests.

use std::fmt;

use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt as subscriber_fmt};
use url::Url;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Connection parameters for the patient database.
#[derive(Clone, PartialEq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Full connection URL; takes precedence over the individual fields.
    pub url_override: Option<String>,
}

impl DatabaseConfig {
    /// Build from `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`
    /// and `DATABASE_URL`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            host: lookup("DB_HOST").unwrap_or_else(|| "localhost".into()),
            port: parse_port(&lookup, "DB_PORT", 5432)?,
            user: lookup("DB_USER").unwrap_or_else(|| "postgres".into()),
            password: lookup("DB_PASSWORD").unwrap_or_default(),
            database: lookup("DB_NAME").unwrap_or_else(|| "patient".into()),
            url_override: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
        })
    }

    /// Connection URL understood by `PgConnection::establish`.
    ///
    /// User and password are percent-encoded.
    pub fn database_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = &self.url_override {
            return Ok(url.clone());
        }

        let mut url = Url::parse(&format!(
            "postgres://{}:{}/{}",
            self.host, self.port, self.database
        ))
        .map_err(|e| ConfigError::InvalidValue {
            field: "DB_HOST",
            reason: e.to_string(),
        })?;

        let invalid = |field| ConfigError::InvalidValue {
            field,
            reason: "cannot be set on this URL".into(),
        };
        url.set_username(&self.user).map_err(|_| invalid("DB_USER"))?;
        if !self.password.is_empty() {
            url.set_password(Some(&self.password))
                .map_err(|_| invalid("DB_PASSWORD"))?;
        }
        Ok(url.into())
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("url_override", &self.url_override.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// HTTP bind address.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            host: lookup("APP_HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port: parse_port(&lookup, "APP_PORT", 8080)?,
        })
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            level: lookup("LOG_LEVEL").unwrap_or(defaults.level),
            format: lookup("LOG_FORMAT").unwrap_or(defaults.format),
        }
    }

    /// Initialize the tracing subscriber with this logging configuration.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                subscriber_fmt().json().with_env_filter(filter).init();
            }
            _ => {
                subscriber_fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

/// Everything the binary needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            database: DatabaseConfig::from_lookup(&lookup)?,
            server: ServerConfig::from_lookup(&lookup)?,
            logging: LoggingConfig::from_lookup(&lookup),
        })
    }
}

fn parse_port<F>(lookup: &F, field: &'static str, default: u16) -> Result<u16, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(field) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                field,
                reason: format!("'{raw}' is not a port number ({e})"),
            }),
    }
}
