//! Session settings for a gate run.
//!
//! # Security
//! `ConnectionConfig` holds no password. The password stays inside the
//! connection string handed to the driver.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound for the pool size.
pub const MAX_POOL_CONNECTIONS: u32 = 100;
/// Upper bound for the per-statement timeout.
pub const MAX_STATEMENT_TIMEOUT: Duration = Duration::from_secs(300);

/// Where to connect and how every session of the run behaves.
///
/// # Example
/// ```rust
/// use dqgate_core::adapters::ConnectionConfig;
///
/// let config = ConnectionConfig::new("localhost".to_string())
///     .with_port(5432)
///     .with_database("warehouse".to_string())
///     .with_username("dq".to_string());
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.to_string(), "localhost:5432/warehouse");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Server host
    pub host: String,
    /// Server port, driver default when absent
    pub port: Option<u16>,
    /// Database name
    pub database: Option<String>,
    /// Role name (never displayed)
    pub username: Option<String>,
    /// Time allowed to obtain a session
    pub connect_timeout: Duration,
    /// `statement_timeout` applied to every session
    pub query_timeout: Duration,
    /// `lock_timeout` applied to every session
    pub lock_timeout: Duration,
    /// Pool size; the rules issue one query at a time
    pub max_connections: u32,
    /// Open every transaction read-only
    pub read_only: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: None,
            database: None,
            username: None,
            connect_timeout: Duration::from_secs(30),
            query_timeout: Duration::from_secs(60),
            lock_timeout: Duration::from_secs(30),
            max_connections: 2,
            read_only: true,
        }
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        if let Some(database) = &self.database {
            write!(f, "/{}", database)?;
        }
        Ok(())
    }
}

impl ConnectionConfig {
    /// Creates a config for `host` with the run defaults.
    pub fn new(host: String) -> Self {
        Self {
            host,
            ..Default::default()
        }
    }

    /// Builder method to set port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Builder method to set database.
    pub fn with_database(mut self, database: String) -> Self {
        self.database = Some(database);
        self
    }

    /// Builder method to set username.
    pub fn with_username(mut self, username: String) -> Self {
        self.username = Some(username);
        self
    }

    /// Checks bounds on the host, port, pool and timeouts.
    ///
    /// # Errors
    /// Returns a configuration error naming the first offending setting.
    pub fn validate(&self) -> crate::Result<()> {
        use crate::error::DqError;

        if self.host.trim().is_empty() {
            return Err(DqError::configuration("host cannot be empty"));
        }
        if self.port == Some(0) {
            return Err(DqError::configuration("port must be greater than 0"));
        }
        if !(1..=MAX_POOL_CONNECTIONS).contains(&self.max_connections) {
            return Err(DqError::configuration(format!(
                "max_connections must be between 1 and {}",
                MAX_POOL_CONNECTIONS
            )));
        }
        if self.connect_timeout.is_zero() {
            return Err(DqError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }
        if self.query_timeout < Duration::from_secs(1)
            || self.query_timeout > MAX_STATEMENT_TIMEOUT
        {
            return Err(DqError::configuration(format!(
                "query_timeout must be between 1 and {} seconds",
                MAX_STATEMENT_TIMEOUT.as_secs()
            )));
        }
        if self.lock_timeout.is_zero() {
            return Err(DqError::configuration("lock_timeout must be greater than 0"));
        }
        Ok(())
    }

    /// `application_name` reported to the server.
    pub fn application_name() -> String {
        format!("dqgate-{}", env!("CARGO_PKG_VERSION"))
    }

    /// Statements run on every new session, in order.
    ///
    /// Sessions are pinned to UTC so timestamp maxima and the freshness
    /// threshold are compared in the same zone.
    pub fn session_statements(&self) -> Vec<String> {
        let mut statements = vec![
            format!(
                "SET statement_timeout = {}",
                self.query_timeout.as_millis()
            ),
            format!("SET lock_timeout = {}", self.lock_timeout.as_millis()),
            format!("SET application_name = '{}'", Self::application_name()),
        ];
        if self.read_only {
            statements.push("SET default_transaction_read_only = on".to_string());
        }
        statements.push("SET timezone = 'UTC'".to_string());
        statements
    }
}
