//! PostgreSQL connection pool management and validation.
//!
//! # Security Features
//! - Validates connection string format and parameters
//! - Enforces connection limits and statement timeouts
//! - Forces read-only, UTC sessions on every pooled connection

use super::{ConnectionConfig, PostgresSource};
use crate::adapters::config::{MAX_POOL_CONNECTIONS, MAX_STATEMENT_TIMEOUT};
use crate::Result;
use crate::error::DqError;
use sqlx::PgPool;
use std::time::Duration;
use url::Url;

impl PostgresSource {
    /// Creates a new PostgreSQL source from a connection URL.
    ///
    /// The pool connects lazily; the first query (normally
    /// `test_connection`) surfaces connectivity problems.
    ///
    /// # Errors
    /// Returns error if the connection string is malformed or unsafe.
    pub async fn new(connection_string: &str) -> Result<Self> {
        let config = Self::parse_connection_config(connection_string)?;
        let pool = Self::create_connection_pool(connection_string, &config)?;
        Ok(Self { pool, config })
    }

    /// Closes the connection pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Parses a connection string into a credential-free configuration.
    ///
    /// Recognized query parameters: `connect_timeout` (seconds, 1-300),
    /// `statement_timeout` (milliseconds, 1-300000) and `pool_max_conns`
    /// (1-100). Anything else is left for the driver.
    ///
    /// # Errors
    /// Returns error if connection string is malformed or contains unsafe parameters
    pub fn parse_connection_config(connection_string: &str) -> Result<ConnectionConfig> {
        Self::validate_connection_string(connection_string)?;

        let url = Url::parse(connection_string).map_err(|e| {
            DqError::configuration(format!("Invalid PostgreSQL connection string format: {}", e))
        })?;

        let mut config = ConnectionConfig::new(url.host_str().unwrap_or("localhost").to_string());

        match url.port() {
            Some(0) => {
                return Err(DqError::configuration(
                    "Invalid port number: must be greater than 0",
                ));
            }
            Some(port) => config = config.with_port(port),
            None => config = config.with_port(5432),
        }

        let database = url.path().trim_start_matches('/');
        if !database.is_empty() {
            validate_pg_name(database, "Database name")?;
            config = config.with_database(database.to_string());
        }

        let username = url.username();
        if !username.is_empty() {
            validate_pg_name(username, "Username")?;
            config = config.with_username(username.to_string());
        }

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "connect_timeout" => {
                    if let Ok(timeout_secs) = value.parse::<u64>()
                        && timeout_secs > 0
                        && timeout_secs <= 300
                    {
                        config.connect_timeout = Duration::from_secs(timeout_secs);
                    }
                }
                "statement_timeout" => {
                    if let Ok(timeout_ms) = value.parse::<u64>()
                        && timeout_ms >= 1000
                    {
                        config.query_timeout =
                            Duration::from_millis(timeout_ms).min(MAX_STATEMENT_TIMEOUT);
                    }
                }
                "pool_max_conns" => {
                    if let Ok(max_conns) = value.parse::<u32>()
                        && (1..=MAX_POOL_CONNECTIONS).contains(&max_conns)
                    {
                        config.max_connections = max_conns;
                    }
                }
                _ => {}
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Creates a lazily connected pool whose sessions are read-only and UTC.
    pub(crate) fn create_connection_pool(
        connection_string: &str,
        config: &ConnectionConfig,
    ) -> Result<PgPool> {
        use sqlx::Executor;

        Self::validate_connection_string(connection_string)?;

        let statements = config.session_statements();

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections.min(MAX_POOL_CONNECTIONS))
            .min_connections(0)
            .acquire_timeout(config.connect_timeout)
            .test_before_acquire(true)
            .after_connect(move |conn, _meta| {
                let statements = statements.clone();
                Box::pin(async move {
                    for statement in &statements {
                        conn.execute(statement.as_str()).await?;
                    }
                    Ok(())
                })
            })
            .connect_lazy(connection_string)
            .map_err(|e| DqError::Connection {
                context: format!(
                    "Failed to create PostgreSQL connection pool to {}",
                    crate::adapters::redact_database_url(connection_string)
                ),
                source: Box::new(e),
            })?;

        Ok(pool)
    }

    /// Validates connection string format and security requirements.
    ///
    /// # Errors
    /// Returns error if connection string is invalid or unsafe
    pub fn validate_connection_string(connection_string: &str) -> Result<()> {
        let url = Url::parse(connection_string).map_err(|e| {
            DqError::configuration(format!("Invalid PostgreSQL connection string format: {}", e))
        })?;

        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(DqError::configuration(
                "Connection string must use postgres:// or postgresql:// scheme",
            ));
        }

        if url.host_str().is_none() {
            return Err(DqError::configuration(
                "Connection string must specify a host",
            ));
        }

        for (key, value) in url.query_pairs() {
            if key == "statement_timeout"
                && let Ok(timeout_ms) = value.parse::<u64>()
                && Duration::from_millis(timeout_ms) > MAX_STATEMENT_TIMEOUT
            {
                return Err(DqError::configuration(format!(
                    "statement_timeout should not exceed {} seconds",
                    MAX_STATEMENT_TIMEOUT.as_secs()
                )));
            }
        }

        Ok(())
    }
}

/// Checks a database or role name against PostgreSQL identifier rules.
fn validate_pg_name(name: &str, what: &str) -> Result<()> {
    if name.len() > 63 {
        return Err(DqError::configuration(format!(
            "{} too long: maximum 63 characters",
            what
        )));
    }

    let starts_ok = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !starts_ok {
        return Err(DqError::configuration(format!(
            "{} must start with a letter or underscore",
            what
        )));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    {
        return Err(DqError::configuration(format!(
            "{} contains invalid characters (only letters, digits, underscores, and dollar signs allowed)",
            what
        )));
    }

    Ok(())
}
