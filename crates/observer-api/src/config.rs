//! Server configuration from environment variables.
//!
//! | Variable                  | Default                          |
//! |---------------------------|----------------------------------|
//! | `DATABASE_URL`            | `postgres://localhost/observer`  |
//! | `HOST`                    | `0.0.0.0`                        |
//! | `PORT`                    | `3000`                           |
//! | `DB_MAX_CONNECTIONS`      | `10`                             |
//! | `DB_MIN_CONNECTIONS`      | `1`                              |
//! | `DB_CONNECT_TIMEOUT_SECS` | `30`                             |
//! | `DB_IDLE_TIMEOUT_SECS`    | `600` (`0` disables)             |
//! | `DB_MAX_LIFETIME_SECS`    | `1800` (`0` disables)            |
//! | `REQUEST_TIMEOUT_SECS`    | `30` (`0` disables)              |
//! | `STEP_LOG_SINK`           | `tracing` (`tracing` or `file`)  |
//! | `STEP_LOG_PATH`           | `observer-steps.jsonl`           |
//! | `RUN_MIGRATIONS`          | `true`                           |
//! | `LOG_FORMAT`              | `text` (`text` or `json`)        |
//! | `LOG_FILE`                | unset (stdout)                   |
//! | `LOG_ANSI`                | auto-detected                    |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use observer_db::pool::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_MAX_CONNECTIONS,
    DEFAULT_MAX_LIFETIME_SECS, DEFAULT_MIN_CONNECTIONS,
};
use observer_db::PoolConfig;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/observer";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_STEP_LOG_PATH: &str = "observer-steps.jsonl";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a number, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must be one of {expected}, got '{value}'")]
    InvalidChoice {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Where finished request logs are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepLogTarget {
    Tracing,
    File(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Process-wide `tracing` output settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub file: Option<PathBuf>,
    pub ansi: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    /// `None` keeps idle connections open.
    pub idle_timeout: Option<Duration>,
    /// `None` never recycles a connection by age.
    pub max_lifetime: Option<Duration>,
    /// `None` when request deadlines are disabled.
    pub request_timeout: Option<Duration>,
    pub step_log: StepLogTarget,
    pub run_migrations: bool,
    pub logging: LogConfig,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let request_timeout_secs: u64 = parse_or(
            &lookup,
            "REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        let step_log = match lookup("STEP_LOG_SINK").as_deref().map(str::trim) {
            None | Some("") | Some("tracing") => StepLogTarget::Tracing,
            Some("file") => StepLogTarget::File(PathBuf::from(
                lookup("STEP_LOG_PATH").unwrap_or_else(|| DEFAULT_STEP_LOG_PATH.to_string()),
            )),
            Some(other) => {
                return Err(ConfigError::InvalidChoice {
                    var: "STEP_LOG_SINK",
                    value: other.to_string(),
                    expected: "'tracing', 'file'",
                })
            }
        };

        let format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidChoice {
                    var: "LOG_FORMAT",
                    value: other.to_string(),
                    expected: "'text', 'json'",
                })
            }
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            min_connections: parse_or(&lookup, "DB_MIN_CONNECTIONS", DEFAULT_MIN_CONNECTIONS)?,
            connect_timeout: Duration::from_secs(parse_or(
                &lookup,
                "DB_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?),
            idle_timeout: seconds_or_disabled(parse_or(
                &lookup,
                "DB_IDLE_TIMEOUT_SECS",
                DEFAULT_IDLE_TIMEOUT_SECS,
            )?),
            max_lifetime: seconds_or_disabled(parse_or(
                &lookup,
                "DB_MAX_LIFETIME_SECS",
                DEFAULT_MAX_LIFETIME_SECS,
            )?),
            request_timeout: seconds_or_disabled(request_timeout_secs),
            step_log,
            run_migrations: lookup("RUN_MIGRATIONS")
                .map(|v| is_truthy(&v))
                .unwrap_or(true),
            logging: LogConfig {
                format,
                file: lookup("LOG_FILE").filter(|v| !v.is_empty()).map(PathBuf::from),
                ansi: lookup("LOG_ANSI").map(|v| is_truthy(&v)),
            },
        })
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(self.connect_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) if value.trim().is_empty() => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
    }
}

/// `0` turns the limit off.
fn seconds_or_disabled(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim(), "true" | "1" | "yes")
}
