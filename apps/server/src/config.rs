//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. A `.env` file in the working directory is read first, if one
//! exists; variables already set in the environment win.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use kensai_db::DbConfig;

/// Server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Interface to listen on
    pub bind_addr: IpAddr,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// How long a request waits for a pooled connection
    pub db_acquire_timeout: Duration,

    /// Allow any origin, method and header (the frontend is served elsewhere)
    pub cors_allow_any: bool,
}

impl ServerConfig {
    /// Load configuration from `.env` and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is normal outside development.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        Ok(ServerConfig {
            bind_addr: parse(&var("KENSAI_BIND_ADDR", "0.0.0.0"), "KENSAI_BIND_ADDR")?,

            port: parse(&var("KENSAI_PORT", "8000"), "KENSAI_PORT")?,

            database_path: PathBuf::from(var("KENSAI_DATABASE_PATH", "kensai.db")),

            db_max_connections: match parse(
                &var("KENSAI_DB_MAX_CONNECTIONS", "5"),
                "KENSAI_DB_MAX_CONNECTIONS",
            )? {
                0 => return Err(ConfigError::InvalidValue("KENSAI_DB_MAX_CONNECTIONS".to_string())),
                n => n,
            },

            db_acquire_timeout: Duration::from_secs(parse(
                &var("KENSAI_DB_ACQUIRE_TIMEOUT_SECS", "30"),
                "KENSAI_DB_ACQUIRE_TIMEOUT_SECS",
            )?),

            cors_allow_any: parse_bool(&var("KENSAI_CORS_ALLOW_ANY", "true"), "KENSAI_CORS_ALLOW_ANY")?,
        })
    }

    /// Address the listener binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    /// Pool settings for [`kensai_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone())
            .max_connections(self.db_max_connections)
            .connect_timeout(self.db_acquire_timeout)
    }
}

fn parse<T: std::str::FromStr>(value: &str, name: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name.to_string()))
}

fn parse_bool(value: &str, name: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue(name.to_string())),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8000");
        assert_eq!(config.database_path, PathBuf::from("kensai.db"));
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.db_acquire_timeout, Duration::from_secs(30));
        assert!(config.cors_allow_any);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("KENSAI_BIND_ADDR", "127.0.0.1"),
            ("KENSAI_PORT", "9090"),
            ("KENSAI_DATABASE_PATH", "/var/lib/kensai/data.db"),
            ("KENSAI_DB_MAX_CONNECTIONS", "12"),
            ("KENSAI_DB_ACQUIRE_TIMEOUT_SECS", "3"),
            ("KENSAI_CORS_ALLOW_ANY", "false"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9090");
        assert!(!config.cors_allow_any);

        let db = config.db_config();
        assert_eq!(db.max_connections, 12);
        assert_eq!(db.connect_timeout, Duration::from_secs(3));
        assert_eq!(db.database_path, PathBuf::from("/var/lib/kensai/data.db"));
    }

    #[test]
    fn test_invalid_values() {
        for (name, value) in [
            ("KENSAI_PORT", "eighty"),
            ("KENSAI_BIND_ADDR", "localhost:80"),
            ("KENSAI_DB_MAX_CONNECTIONS", "0"),
            ("KENSAI_DB_ACQUIRE_TIMEOUT_SECS", "-1"),
            ("KENSAI_CORS_ALLOW_ANY", "maybe"),
        ] {
            let err = load(&[(name, value)]).unwrap_err();
            assert!(
                matches!(&err, ConfigError::InvalidValue(n) if n == name),
                "{name}={value} gave {err}"
            );
        }
    }
}
