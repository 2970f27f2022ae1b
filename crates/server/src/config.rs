// Server configuration.
//
// Every setting is resolved once at startup from environment variables and
// threaded through as an explicit value. Nothing downstream re-reads the
// environment.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::db::pool::{is_valid_database_url, PoolConfig};

const DEV_AUTH_SECRET: &str = "folio_local_development_auth_secret_32_chars";
const DEV_WORKSPACE_SECRET: &str = "folio_local_development_workspace_secret_32c";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Which repository backend the server runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageMode {
    Postgres { database_url: String },
    Memory,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set to a non-development value in production")]
    DevelopmentSecretInProduction(&'static str),
    #[error("FOLIO_DATABASE_URL is required in production")]
    MissingDatabaseUrl,
}

/// Core server configuration.
///
/// Constructed via [`ServerConfig::from_env`] which reads environment
/// variables and falls back to development defaults.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address (host:port).
    pub listen_addr: SocketAddr,
    pub environment: Environment,
    /// Secret for caller identity tokens.
    pub auth_secret: String,
    /// Secret for workspace-scoped tokens.
    pub workspace_secret: String,
    /// PostgreSQL connection string. Absent or malformed selects the in-memory store.
    pub database_url: Option<String>,
    /// Comma-separated CORS origins (or `"*"` for any).
    pub cors_origins: Option<String>,
    /// Log filter directive (e.g. `info`, `folio_server=debug`).
    pub log_filter: String,
    pub log_format: LogFormat,
    pub pool: PoolConfig,
}

impl ServerConfig {
    /// Parse configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `FOLIO_HOST` | `0.0.0.0` |
    /// | `FOLIO_PORT` | `8080` |
    /// | `FOLIO_ENV` | `development` |
    /// | `FOLIO_AUTH_SECRET` | dev-only placeholder |
    /// | `FOLIO_WORKSPACE_SECRET` | dev-only placeholder |
    /// | `FOLIO_DATABASE_URL` | *(none, in-memory store)* |
    /// | `FOLIO_CORS_ORIGINS` | *(none, localhost defaults)* |
    /// | `FOLIO_LOG_FILTER` | `info` |
    /// | `FOLIO_LOG_FORMAT` | `pretty` (`json` in production) |
    /// | `FOLIO_DB_MIN_CONNECTIONS` | `1` |
    /// | `FOLIO_DB_MAX_CONNECTIONS` | `5` |
    /// | `FOLIO_DB_ACQUIRE_TIMEOUT_SECS` | `15` |
    /// | `FOLIO_DB_IDLE_TIMEOUT_SECS` | `120` |
    pub fn from_env() -> Self {
        Self::from_env_fn(|key| std::env::var(key))
    }

    /// Testable constructor that accepts an environment lookup function.
    pub(crate) fn from_env_fn<F>(env: F) -> Self
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let host = env("FOLIO_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = parse_or(&env, "FOLIO_PORT", 8080);
        let listen_addr = format!("{host}:{port}")
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], port)));

        let environment = match env("FOLIO_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        let auth_secret = env("FOLIO_AUTH_SECRET").unwrap_or_else(|_| DEV_AUTH_SECRET.into());
        let workspace_secret =
            env("FOLIO_WORKSPACE_SECRET").unwrap_or_else(|_| DEV_WORKSPACE_SECRET.into());

        let database_url = env("FOLIO_DATABASE_URL").ok().filter(|value| !value.trim().is_empty());
        let cors_origins = env("FOLIO_CORS_ORIGINS").ok();
        let log_filter = env("FOLIO_LOG_FILTER").unwrap_or_else(|_| "info".into());
        let log_format = match env("FOLIO_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("pretty") => LogFormat::Pretty,
            _ if environment == Environment::Production => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let defaults = PoolConfig::default();
        let pool = PoolConfig {
            min_connections: parse_or(&env, "FOLIO_DB_MIN_CONNECTIONS", defaults.min_connections),
            max_connections: parse_or(&env, "FOLIO_DB_MAX_CONNECTIONS", defaults.max_connections),
            acquire_timeout: Duration::from_secs(parse_or(
                &env,
                "FOLIO_DB_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout.as_secs(),
            )),
            idle_timeout: Duration::from_secs(parse_or(
                &env,
                "FOLIO_DB_IDLE_TIMEOUT_SECS",
                defaults.idle_timeout.as_secs(),
            )),
            require_tls: environment == Environment::Production,
        };

        Self {
            listen_addr,
            environment,
            auth_secret,
            workspace_secret,
            database_url,
            cors_origins,
            log_filter,
            log_format,
            pool,
        }
    }

    /// Resolve the storage backend. A missing or malformed URL falls back to memory.
    pub fn storage_mode(&self) -> StorageMode {
        match self.database_url.as_deref() {
            Some(url) if is_valid_database_url(url) => {
                StorageMode::Postgres { database_url: url.to_owned() }
            }
            _ => StorageMode::Memory,
        }
    }

    /// Reject settings that are only acceptable for local development.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment != Environment::Production {
            return Ok(());
        }
        if self.auth_secret == DEV_AUTH_SECRET {
            return Err(ConfigError::DevelopmentSecretInProduction("FOLIO_AUTH_SECRET"));
        }
        if self.workspace_secret == DEV_WORKSPACE_SECRET {
            return Err(ConfigError::DevelopmentSecretInProduction("FOLIO_WORKSPACE_SECRET"));
        }
        if self.storage_mode() == StorageMode::Memory {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        Ok(())
    }

    pub fn is_dev_auth_secret(&self) -> bool {
        self.auth_secret == DEV_AUTH_SECRET
    }
}

fn parse_or<F, T>(env: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: std::str::FromStr,
{
    env(key).ok().and_then(|value| value.parse().ok()).unwrap_or(default)
}
