//! Column metadata lookup via `information_schema`.

use crate::Result;
use crate::adapters::helpers::{RowExt, classify_query_error};
use crate::models::{ColumnDescriptor, TableRef};
use sqlx::PgPool;

/// Catalog query; schema and table are bound, never interpolated.
const COLUMNS_QUERY: &str = r#"
    SELECT
        column_name::text AS column_name,
        data_type::text AS data_type
    FROM information_schema.columns
    WHERE table_schema = $1
      AND table_name = $2
    ORDER BY ordinal_position
"#;

/// Fetches the columns of `table` in physical order.
///
/// An empty result means the table is missing or not visible to the role;
/// the caller decides how to report that.
pub(crate) async fn fetch_columns(pool: &PgPool, table: &TableRef) -> Result<Vec<ColumnDescriptor>> {
    tracing::debug!("Fetching column metadata for {}", table);

    let rows = sqlx::query(COLUMNS_QUERY)
        .bind(&table.schema)
        .bind(&table.table)
        .fetch_all(pool)
        .await
        .map_err(|e| classify_query_error(e, table, "read column metadata"))?;

    let context = table.to_string();
    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        let name: String = row.get_field("column_name", Some(&context))?;
        let data_type: String = row.get_field("data_type", Some(&context))?;
        columns.push(ColumnDescriptor::new(name, data_type));
    }

    tracing::debug!("Found {} columns in {}", columns.len(), table);
    Ok(columns)
}
