//! In-memory table snapshots.
//!
//! `MemorySource` answers the same questions as a database source from rows
//! held in memory. The engine and the report are exercised against it in
//! tests, and library users can evaluate data that never lived in a server.

use super::{DataSource, DuplicateScan, SourceKind};
use crate::Result;
use crate::error::DqError;
use crate::models::{ColumnDescriptor, TableRef};
use crate::quality::DuplicateGroup;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;

/// A single cell of an in-memory row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellValue {
    /// SQL NULL
    Null,
    /// Integer value
    Integer(i64),
    /// Text value
    Text(String),
    /// Calendar date
    Date(NaiveDate),
    /// UTC instant
    Timestamp(DateTime<Utc>),
}

impl CellValue {
    /// Returns true for `CellValue::Null`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text form used in duplicate key evidence, `None` for NULL.
    pub fn as_key_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Integer(v) => Some(v.to_string()),
            Self::Text(v) => Some(v.clone()),
            Self::Date(v) => Some(v.to_string()),
            Self::Timestamp(v) => Some(v.to_rfc3339()),
        }
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Columns plus rows of one table.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    /// Column metadata in physical order
    pub columns: Vec<ColumnDescriptor>,
    /// Rows, each with one cell per column
    pub rows: Vec<Vec<CellValue>>,
}

impl MemoryTable {
    /// Creates an empty table with the given columns.
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builder method to append a row.
    ///
    /// # Errors
    /// Returns error if the row width does not match the column count
    pub fn with_row(mut self, row: Vec<CellValue>) -> Result<Self> {
        if row.len() != self.columns.len() {
            return Err(DqError::configuration(format!(
                "row has {} cells but table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(self)
    }

    fn column_index(&self, table: &TableRef, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name == column)
            .ok_or_else(|| {
                DqError::query_failed(
                    format!("Failed to read column '{}' on {}", column, table),
                    std::io::Error::new(std::io::ErrorKind::NotFound, "column does not exist"),
                )
            })
    }

    fn values<'a>(
        &'a self,
        table: &TableRef,
        column: &str,
    ) -> Result<impl Iterator<Item = &'a CellValue>> {
        let index = self.column_index(table, column)?;
        Ok(self.rows.iter().filter_map(move |row| row.get(index)))
    }
}

/// Data source over in-memory tables.
#[derive(Debug, Clone)]
pub struct MemorySource {
    tables: HashMap<TableRef, MemoryTable>,
    reachable: bool,
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySource {
    /// Creates a reachable source with no tables.
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
            reachable: true,
        }
    }

    /// Creates a source whose connectivity check always fails.
    pub fn unreachable() -> Self {
        Self {
            tables: HashMap::new(),
            reachable: false,
        }
    }

    /// Builder method to register a table.
    pub fn with_table(mut self, table: TableRef, data: MemoryTable) -> Self {
        self.tables.insert(table, data);
        self
    }

    fn table(&self, table: &TableRef) -> Result<&MemoryTable> {
        self.tables.get(table).ok_or_else(|| {
            DqError::schema_lookup(&table.schema, &table.table, "table not found")
        })
    }
}

fn to_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Key order used for tied duplicate groups: byte order, NULL last.
fn compare_keys(a: &[Option<String>], b: &[Option<String>]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => x.cmp(y),
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
        })
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn incomparable(table: &TableRef, column: &str, value: &CellValue) -> DqError {
    DqError::query_failed(
        format!("Failed to read MAX({}) on {}", column, table),
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("value {:?} is not a date or timestamp", value),
        ),
    )
}

#[async_trait]
impl DataSource for MemorySource {
    async fn test_connection(&self) -> Result<()> {
        if self.reachable {
            Ok(())
        } else {
            Err(DqError::connection_failed(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "in-memory source marked unreachable",
            )))
        }
    }

    async fn table_columns(&self, table: &TableRef) -> Result<Vec<ColumnDescriptor>> {
        Ok(self
            .tables
            .get(table)
            .map(|t| t.columns.clone())
            .unwrap_or_default())
    }

    async fn row_count(&self, table: &TableRef) -> Result<u64> {
        Ok(to_u64(self.table(table)?.rows.len()))
    }

    async fn non_null_count(&self, table: &TableRef, column: &str) -> Result<u64> {
        let count = self
            .table(table)?
            .values(table, column)?
            .filter(|v| !v.is_null())
            .count();
        Ok(to_u64(count))
    }

    async fn duplicate_groups(
        &self,
        table: &TableRef,
        key_columns: &[String],
        limit: usize,
    ) -> Result<DuplicateScan> {
        if key_columns.is_empty() {
            return Err(DqError::configuration(
                "Uniqueness check requires at least one key column",
            ));
        }

        let data = self.table(table)?;
        let indexes = key_columns
            .iter()
            .map(|c| data.column_index(table, c))
            .collect::<Result<Vec<_>>>()?;

        let mut counts: HashMap<Vec<Option<String>>, u64> = HashMap::new();
        for row in &data.rows {
            let key: Vec<Option<String>> = indexes
                .iter()
                .map(|&i| row.get(i).and_then(CellValue::as_key_text))
                .collect();
            let count = counts.entry(key).or_insert(0);
            *count = count.saturating_add(1);
        }

        let mut groups: Vec<DuplicateGroup> = counts
            .into_iter()
            .filter(|(_, dup_count)| *dup_count > 1)
            .map(|(key_values, dup_count)| DuplicateGroup {
                key_values,
                dup_count,
            })
            .collect();
        groups.sort_by(|a, b| {
            b.dup_count
                .cmp(&a.dup_count)
                .then_with(|| compare_keys(&a.key_values, &b.key_values))
        });

        let total_groups = to_u64(groups.len());
        groups.truncate(limit);

        Ok(DuplicateScan {
            groups,
            total_groups,
        })
    }

    async fn max_timestamp(
        &self,
        table: &TableRef,
        column: &str,
    ) -> Result<Option<DateTime<Utc>>> {
        let mut max: Option<DateTime<Utc>> = None;
        for value in self.table(table)?.values(table, column)? {
            let instant = match value {
                CellValue::Null => continue,
                CellValue::Timestamp(ts) => *ts,
                CellValue::Date(d) => d.and_time(chrono::NaiveTime::MIN).and_utc(),
                other => return Err(incomparable(table, column, other)),
            };
            max = max.max(Some(instant));
        }
        Ok(max)
    }

    async fn max_date(&self, table: &TableRef, column: &str) -> Result<Option<NaiveDate>> {
        let mut max: Option<NaiveDate> = None;
        for value in self.table(table)?.values(table, column)? {
            let date = match value {
                CellValue::Null => continue,
                CellValue::Date(d) => *d,
                CellValue::Timestamp(ts) => ts.date_naive(),
                other => return Err(incomparable(table, column, other)),
            };
            max = max.max(Some(date));
        }
        Ok(max)
    }

    fn source_kind(&self) -> SourceKind {
        SourceKind::Memory
    }
}
