//! Schema Inspector.
//!
//! Reads the ordered column list of the table under evaluation. This is the
//! only metadata the rules get; the recency rules classify columns from it
//! by name pattern.

use crate::Result;
use crate::adapters::DataSource;
use crate::error::DqError;
use crate::models::{ColumnDescriptor, TableRef};

/// Returns the columns of `table` in physical order.
///
/// # Errors
/// Returns `DqError::SchemaLookup` when the catalog knows no columns for
/// the table (it does not exist or is not visible), and passes through any
/// connection or query error from the source.
pub async fn inspect_table(
    source: &dyn DataSource,
    table: &TableRef,
) -> Result<Vec<ColumnDescriptor>> {
    let columns = source.table_columns(table).await?;

    if columns.is_empty() {
        return Err(DqError::schema_lookup(
            &table.schema,
            &table.table,
            "table not found or has no visible columns",
        ));
    }

    tracing::info!("Inspected {}: {} columns", table, columns.len());
    for column in &columns {
        tracing::trace!("  {} ({})", column.name, column.data_type);
    }

    Ok(columns)
}
