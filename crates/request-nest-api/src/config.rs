//! Runtime configuration read from `REQUEST_NEST_*` environment variables.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use request_nest_capture::domain::capture::{CaptureLimits, DEFAULT_MAX_BODY_SIZE};

use crate::error::AppError;

const PREFIX: &str = "REQUEST_NEST_";

/// Settings consumed by request handlers.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Public base URL used to render ingest URLs, without trailing `/`.
    pub base_url: String,
    /// Bearer token required by the Admin API.
    pub admin_token: String,
    /// Limits enforced on captured requests.
    pub capture_limits: CaptureLimits,
    /// Bound on pool acquisition and on each store operation.
    pub db_timeout: Duration,
}

/// Full server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// `PostgreSQL` connection string.
    pub database_url: String,
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Maximum pooled connections.
    pub db_max_connections: u32,
    /// Whether embedded migrations run at startup.
    pub run_migrations: bool,
    /// OTLP/gRPC collector endpoint; span export is off when unset.
    pub otlp_endpoint: Option<String>,
    /// Handler-facing settings.
    pub api: ApiSettings,
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` naming the first missing or invalid
    /// variable.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a full variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` naming the first missing or invalid
    /// variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{PREFIX}{name}")).filter(|v| !v.is_empty());

        let database_url = var("DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL").filter(|v| !v.is_empty()))
            .ok_or_else(|| {
                AppError::Config(format!("{PREFIX}DATABASE_URL environment variable must be set"))
            })?;
        let admin_token = var("ADMIN_TOKEN").ok_or_else(|| {
            AppError::Config(format!("{PREFIX}ADMIN_TOKEN environment variable must be set"))
        })?;

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let port = parse_or(&var, "PORT", 8000_u16)?;
        let base_url = var("BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_owned();
        let max_body_size = parse_or(&var, "MAX_BODY_SIZE", DEFAULT_MAX_BODY_SIZE)?;
        let db_timeout_ms = parse_or(&var, "DB_TIMEOUT_MS", 5_000_u64)?;
        if db_timeout_ms == 0 {
            return Err(AppError::Config(format!(
                "{PREFIX}DB_TIMEOUT_MS must be greater than zero"
            )));
        }
        let db_max_connections = parse_or(&var, "DB_MAX_CONNECTIONS", 20_u32)?;
        let run_migrations = parse_or(&var, "RUN_MIGRATIONS", true)?;
        let otlp_endpoint = lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.is_empty());

        Ok(Self {
            database_url,
            host,
            port,
            db_max_connections,
            run_migrations,
            otlp_endpoint,
            api: ApiSettings {
                base_url,
                admin_token,
                capture_limits: CaptureLimits { max_body_size },
                db_timeout: Duration::from_millis(db_timeout_ms),
            },
        })
    }

    /// Socket address the server binds to.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if host and port do not form an address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn parse_or<T, V>(var: &V, name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    V: Fn(&str) -> Option<String>,
{
    match var(name) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("{PREFIX}{name} is invalid ({raw:?}): {e}"))),
    }
}
