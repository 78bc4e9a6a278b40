//! Aggregate queries backing the quality rules.
//!
//! Every statement is built from quoted identifiers only. The one value that
//! varies at runtime, the duplicate group limit, is bound as a parameter.

use super::DuplicateScan;
use crate::Result;
use crate::adapters::helpers::{RowExt, classify_query_error};
use crate::error::DqError;
use crate::models::{TableRef, quote_identifier};
use crate::quality::DuplicateGroup;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

/// `SELECT COUNT(*)` over the whole table.
pub fn count_rows_sql(table: &TableRef) -> String {
    format!("SELECT COUNT(*) FROM {}", table.quoted())
}

/// Counts non-NULL values of one column.
pub fn count_non_null_sql(table: &TableRef, column: &str) -> String {
    format!(
        "SELECT COUNT({}) FROM {}",
        quote_identifier(column),
        table.quoted()
    )
}

/// Duplicate groups for a key, largest first. Key values are rendered as
/// text so any column type can be reported; `$1` is the group limit.
///
/// Ties are ordered by the key text in byte order with NULLs last, the same
/// order the in-memory source produces.
pub fn duplicate_groups_sql(table: &TableRef, key_columns: &[String]) -> String {
    let quoted: Vec<String> = key_columns.iter().map(|c| quote_identifier(c)).collect();
    let projection = quoted
        .iter()
        .map(|c| format!("{}::text", c))
        .collect::<Vec<_>>()
        .join(", ");
    let tie_break = quoted
        .iter()
        .map(|c| format!("{}::text COLLATE \"C\" NULLS LAST", c))
        .collect::<Vec<_>>()
        .join(", ");
    let group_by = quoted.join(", ");

    format!(
        "SELECT {projection}, COUNT(*) AS dup_count FROM {table} \
         GROUP BY {group_by} HAVING COUNT(*) > 1 \
         ORDER BY dup_count DESC, {tie_break} LIMIT $1",
        table = table.quoted(),
    )
}

/// Number of duplicate groups for a key, without any limit.
pub fn duplicate_group_count_sql(table: &TableRef, key_columns: &[String]) -> String {
    let group_by = key_columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "SELECT COUNT(*) FROM (SELECT 1 FROM {} GROUP BY {} HAVING COUNT(*) > 1) AS dup_groups",
        table.quoted(),
        group_by
    )
}

/// Column maximum read back as `timestamptz`. Date columns become midnight
/// in the session time zone, which is pinned to UTC.
pub fn max_timestamp_sql(table: &TableRef, column: &str) -> String {
    format!(
        "SELECT MAX({})::timestamptz FROM {}",
        quote_identifier(column),
        table.quoted()
    )
}

/// Column maximum read back as a calendar date.
pub fn max_date_sql(table: &TableRef, column: &str) -> String {
    format!(
        "SELECT MAX({})::date FROM {}",
        quote_identifier(column),
        table.quoted()
    )
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

pub(crate) async fn row_count(pool: &PgPool, table: &TableRef) -> Result<u64> {
    let sql = count_rows_sql(table);
    tracing::debug!(sql = %sql, "Counting rows");

    let count: i64 = sqlx::query_scalar(&sql)
        .fetch_one(pool)
        .await
        .map_err(|e| classify_query_error(e, table, "count rows"))?;

    Ok(to_count(count))
}

pub(crate) async fn non_null_count(pool: &PgPool, table: &TableRef, column: &str) -> Result<u64> {
    let sql = count_non_null_sql(table, column);
    tracing::debug!(sql = %sql, "Counting non-null values");

    let count: i64 = sqlx::query_scalar(&sql)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            classify_query_error(e, table, &format!("count non-null values of '{}'", column))
        })?;

    Ok(to_count(count))
}

pub(crate) async fn duplicate_groups(
    pool: &PgPool,
    table: &TableRef,
    key_columns: &[String],
    limit: usize,
) -> Result<DuplicateScan> {
    if key_columns.is_empty() {
        return Err(DqError::configuration(
            "Uniqueness check requires at least one key column",
        ));
    }

    let purpose = format!("group by ({})", key_columns.join(", "));

    let count_sql = duplicate_group_count_sql(table, key_columns);
    tracing::debug!(sql = %count_sql, "Counting duplicate groups");
    let total: i64 = sqlx::query_scalar(&count_sql)
        .fetch_one(pool)
        .await
        .map_err(|e| classify_query_error(e, table, &purpose))?;

    let groups_sql = duplicate_groups_sql(table, key_columns);
    tracing::debug!(sql = %groups_sql, limit, "Fetching duplicate groups");
    let rows = sqlx::query(&groups_sql)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(pool)
        .await
        .map_err(|e| classify_query_error(e, table, &purpose))?;

    let context = table.to_string();
    let mut groups = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut key_values = Vec::with_capacity(key_columns.len());
        for index in 0..key_columns.len() {
            let value: Option<String> = row.get_index(index, Some(&context))?;
            key_values.push(value);
        }
        let dup_count: i64 = row.get_field("dup_count", Some(&context))?;
        groups.push(DuplicateGroup {
            key_values,
            dup_count: to_count(dup_count),
        });
    }

    Ok(DuplicateScan {
        groups,
        total_groups: to_count(total),
    })
}

pub(crate) async fn max_timestamp(
    pool: &PgPool,
    table: &TableRef,
    column: &str,
) -> Result<Option<DateTime<Utc>>> {
    let sql = max_timestamp_sql(table, column);
    tracing::debug!(sql = %sql, "Reading timestamp maximum");

    sqlx::query_scalar::<_, Option<DateTime<Utc>>>(&sql)
        .fetch_one(pool)
        .await
        .map_err(|e| classify_query_error(e, table, &format!("read MAX({})", column)))
}

pub(crate) async fn max_date(
    pool: &PgPool,
    table: &TableRef,
    column: &str,
) -> Result<Option<NaiveDate>> {
    let sql = max_date_sql(table, column);
    tracing::debug!(sql = %sql, "Reading date maximum");

    sqlx::query_scalar::<_, Option<NaiveDate>>(&sql)
        .fetch_one(pool)
        .await
        .map_err(|e| classify_query_error(e, table, &format!("read MAX({})", column)))
}
