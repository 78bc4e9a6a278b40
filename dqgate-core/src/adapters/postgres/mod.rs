//! PostgreSQL data source.
//!
//! # Module Structure
//! - `connection`: URL validation, configuration parsing and pool setup
//! - `catalog`: Column metadata from `information_schema`
//! - `aggregates`: Counts, duplicate groups and maxima used by the rules
//!
//! # Security Guarantees
//! - Sessions are read-only and pinned to UTC
//! - Identifiers are quoted, values are bound
//! - Connection strings are sanitized in error messages

mod aggregates;
mod catalog;
mod connection;

#[cfg(test)]
mod tests;

use super::{ConnectionConfig, DataSource, DuplicateScan, SourceKind};
use crate::Result;
use crate::models::{ColumnDescriptor, TableRef};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

pub use aggregates::{
    count_non_null_sql, count_rows_sql, duplicate_group_count_sql, duplicate_groups_sql,
    max_date_sql, max_timestamp_sql,
};

/// PostgreSQL data source backed by a small connection pool.
pub struct PostgresSource {
    pub pool: PgPool,
    pub config: ConnectionConfig,
}

impl std::fmt::Debug for PostgresSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresSource")
            .field("config", &self.config)
            .field("pool_size", &self.pool.size())
            .field("pool_idle", &self.pool.num_idle())
            .finish()
    }
}

#[async_trait]
impl DataSource for PostgresSource {
    async fn test_connection(&self) -> Result<()> {
        let connectivity_result: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(crate::error::DqError::connection_failed)?;

        if connectivity_result != 1 {
            return Err(crate::error::DqError::configuration(
                "Basic connectivity test failed: unexpected result",
            ));
        }

        tracing::debug!("Connected to {}", self.config);
        Ok(())
    }

    async fn table_columns(&self, table: &TableRef) -> Result<Vec<ColumnDescriptor>> {
        catalog::fetch_columns(&self.pool, table).await
    }

    async fn row_count(&self, table: &TableRef) -> Result<u64> {
        aggregates::row_count(&self.pool, table).await
    }

    async fn non_null_count(&self, table: &TableRef, column: &str) -> Result<u64> {
        aggregates::non_null_count(&self.pool, table, column).await
    }

    async fn duplicate_groups(
        &self,
        table: &TableRef,
        key_columns: &[String],
        limit: usize,
    ) -> Result<DuplicateScan> {
        aggregates::duplicate_groups(&self.pool, table, key_columns, limit).await
    }

    async fn max_timestamp(
        &self,
        table: &TableRef,
        column: &str,
    ) -> Result<Option<DateTime<Utc>>> {
        aggregates::max_timestamp(&self.pool, table, column).await
    }

    async fn max_date(&self, table: &TableRef, column: &str) -> Result<Option<NaiveDate>> {
        aggregates::max_date(&self.pool, table, column).await
    }

    fn source_kind(&self) -> SourceKind {
        SourceKind::PostgreSQL
    }
}
