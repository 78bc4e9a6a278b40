//! Helper utilities for the PostgreSQL adapter.
//!
//! Keeps row decoding and driver error classification in one place so every
//! query reports failures with the same shape.

use crate::models::TableRef;
use crate::{Result, error::DqError};
use sqlx::{Row, postgres::PgRow};

/// SQLSTATE for insufficient_privilege.
const SQLSTATE_INSUFFICIENT_PRIVILEGE: &str = "42501";
/// SQLSTATE for undefined_table.
const SQLSTATE_UNDEFINED_TABLE: &str = "42P01";
/// SQLSTATE for invalid_schema_name.
const SQLSTATE_INVALID_SCHEMA: &str = "3F000";

/// Extension trait for extracting typed values from database rows
/// with consistent error handling.
///
/// # Example
/// ```rust,ignore
/// use dqgate_core::adapters::helpers::RowExt;
///
/// let name: String = row.get_field("column_name", Some("mai.events"))?;
/// ```
pub trait RowExt {
    /// Extracts a typed field by name with table context in the error.
    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>;

    /// Extracts a typed field by position with table context in the error.
    fn get_index<'r, T>(&'r self, index: usize, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>;
}

impl RowExt for PgRow {
    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
    {
        self.try_get(field_name)
            .map_err(|e| DqError::parse_field(field_name, table_context, e))
    }

    fn get_index<'r, T>(&'r self, index: usize, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
    {
        self.try_get(index)
            .map_err(|e| DqError::parse_field(&format!("#{}", index), table_context, e))
    }
}

/// Classifies a driver error raised while running `purpose` against `table`.
///
/// Missing relations become schema lookup errors, permission problems become
/// privilege errors, everything else is a query error that names the
/// purpose and the table.
pub fn classify_query_error(error: sqlx::Error, table: &TableRef, purpose: &str) -> DqError {
    if let sqlx::Error::Database(db_err) = &error {
        match db_err.code().as_deref() {
            Some(SQLSTATE_INSUFFICIENT_PRIVILEGE) => {
                return DqError::insufficient_privileges(format!(
                    "SELECT on {} (needed to {})",
                    table, purpose
                ));
            }
            Some(SQLSTATE_UNDEFINED_TABLE | SQLSTATE_INVALID_SCHEMA) => {
                return DqError::schema_lookup(
                    &table.schema,
                    &table.table,
                    format!("relation disappeared while trying to {}", purpose),
                );
            }
            _ => {}
        }
    }

    match error {
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
            DqError::connection_failed(error)
        }
        other => DqError::query_failed(format!("Failed to {} on {}", purpose, table), other),
    }
}
