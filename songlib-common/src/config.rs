//! Configuration loading
//!
//! Values come from the process environment, seeded at startup from a local
//! environment file. The resulting [`Config`] is built once and handed to
//! collaborators by reference.

use crate::{Error, Result};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
const DEFAULT_SERVER_PORT: u16 = 8000;
const DEFAULT_SONG_INFO_URL: &str = "http://server:8000/info";
const DEFAULT_SONG_INFO_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DB_ACQUIRE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_DB_STATEMENT_TIMEOUT_MS: u64 = 5000;

/// PostgreSQL connection settings
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
    /// Upper bound on pooled connections
    pub max_connections: u32,
    /// How long a request may wait for a pooled connection
    pub acquire_timeout: Duration,
    /// Server-side `statement_timeout` applied to every session
    pub statement_timeout: Duration,
}

impl DbConfig {
    /// Connection descriptor for sqlx
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.dbname)
            .ssl_mode(PgSslMode::Disable)
            .options([(
                "statement_timeout",
                self.statement_timeout.as_millis().to_string(),
            )])
    }
}

/// Redacted DSN, safe for logs
impl fmt::Display for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "host={} user={} password=*** dbname={} port={} sslmode=disable",
            self.host, self.user, self.dbname, self.port
        )
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &"***")
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("statement_timeout", &self.statement_timeout)
            .finish()
    }
}

/// Service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db: DbConfig,
    pub server_host: String,
    pub server_port: u16,
    /// Endpoint of the external song-info provider
    pub song_info_url: String,
    pub song_info_timeout: Duration,
    /// Upper bound on a whole HTTP request
    pub request_timeout: Duration,
}

impl Config {
    /// Load the environment file into the process environment, then read the
    /// configuration from it.
    ///
    /// A missing or unreadable file is an error. Variables already present in
    /// the process environment take precedence over the file.
    pub fn load(env_file: &Path) -> Result<Self> {
        dotenvy::from_path(env_file).map_err(|e| {
            Error::Config(format!(
                "Failed to load environment file {}: {}",
                env_file.display(),
                e
            ))
        })?;
        info!("Loaded environment file: {}", env_file.display());

        Self::from_env()
    }

    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db = DbConfig {
            host: required(&lookup, "POSTGRES_HOST")?,
            port: required_parsed(&lookup, "POSTGRES_PORT")?,
            dbname: required(&lookup, "POSTGRES_DB")?,
            user: required(&lookup, "POSTGRES_USER")?,
            password: required(&lookup, "POSTGRES_PASSWORD")?,
            max_connections: optional(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            acquire_timeout: Duration::from_secs(optional(
                &lookup,
                "DB_ACQUIRE_TIMEOUT_SECS",
                DEFAULT_DB_ACQUIRE_TIMEOUT_SECS,
            )?),
            statement_timeout: Duration::from_millis(optional(
                &lookup,
                "DB_STATEMENT_TIMEOUT_MS",
                DEFAULT_DB_STATEMENT_TIMEOUT_MS,
            )?),
        };

        Ok(Self {
            db,
            server_host: optional(&lookup, "SERVER_HOST", DEFAULT_SERVER_HOST.to_string())?,
            server_port: optional(&lookup, "SERVER_PORT", DEFAULT_SERVER_PORT)?,
            song_info_url: optional(&lookup, "SONG_INFO_URL", DEFAULT_SONG_INFO_URL.to_string())?,
            song_info_timeout: Duration::from_secs(optional(
                &lookup,
                "SONG_INFO_TIMEOUT_SECS",
                DEFAULT_SONG_INFO_TIMEOUT_SECS,
            )?),
            request_timeout: Duration::from_secs(optional(
                &lookup,
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
        })
    }

    /// `host:port` the HTTP server binds to
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).ok_or_else(|| Error::Config(format!("{} is not set", key)))
}

fn required_parsed<F, T>(lookup: &F, key: &str) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = required(lookup, key)?;
    parse_value(key, &raw)
}

/// Unset or blank values fall back to `default`
fn optional<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => parse_value(key, &raw),
        _ => Ok(default),
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} has an invalid value: '{}'", key, raw)))
}
