//! Table and column models shared by the inspector, the rules and the renderer.
//!
//! Nothing in here carries connection details; these types are safe to log,
//! serialize and render.

use serde::{Deserialize, Serialize};

/// The single table a run evaluates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    /// Schema (namespace) name, e.g. `public`
    pub schema: String,
    /// Table name
    pub table: String,
}

impl TableRef {
    /// Creates a new table reference.
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Returns the schema-qualified, quoted identifier for use in SQL text.
    ///
    /// ```rust
    /// use dqgate_core::TableRef;
    ///
    /// let table = TableRef::new("mai", "table");
    /// assert_eq!(table.quoted(), r#""mai"."table""#);
    /// ```
    pub fn quoted(&self) -> String {
        format!(
            "{}.{}",
            quote_identifier(&self.schema),
            quote_identifier(&self.table)
        )
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Quotes an SQL identifier, doubling any embedded double quote.
///
/// Identifiers cannot be bound as query parameters, so every schema, table
/// and column name that reaches SQL text goes through here.
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// One column of the table as reported by the metadata catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name exactly as stored in the catalog
    pub name: String,
    /// Catalog data type, e.g. `timestamp with time zone`
    pub data_type: String,
}

impl ColumnDescriptor {
    /// Creates a new column descriptor.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Naming-convention classes used to pick columns for the recency rules.
///
/// Matching is a case-insensitive substring search on the column name. A
/// column such as `update_date` is a date column but not a timestamp column;
/// no type inference is layered on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnPattern {
    /// Timestamp-with-timezone freshness columns (`*dttm*`)
    Timestamp,
    /// Calendar-date staleness columns (`*date*`)
    Date,
}

impl ColumnPattern {
    /// The lowercase substring this pattern searches for.
    pub const fn needle(self) -> &'static str {
        match self {
            Self::Timestamp => "dttm",
            Self::Date => "date",
        }
    }

    /// Returns true if `column_name` belongs to this class.
    pub fn matches(self, column_name: &str) -> bool {
        column_name.to_lowercase().contains(self.needle())
    }

    /// Returns the names of matching columns, in catalog order.
    pub fn select(self, columns: &[ColumnDescriptor]) -> Vec<String> {
        columns
            .iter()
            .filter(|c| self.matches(&c.name))
            .map(|c| c.name.clone())
            .collect()
    }
}

impl std::fmt::Display for ColumnPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "*{}*", self.needle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<ColumnDescriptor> {
        names
            .iter()
            .map(|n| ColumnDescriptor::new(*n, "text"))
            .collect()
    }

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        assert_eq!(quote_identifier("col1"), "\"col1\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_table_ref_display_is_unquoted() {
        let table = TableRef::new("mai", "events");
        assert_eq!(table.to_string(), "mai.events");
        assert_eq!(table.quoted(), "\"mai\".\"events\"");
    }

    #[test]
    fn test_pattern_matching_is_case_insensitive() {
        assert!(ColumnPattern::Timestamp.matches("LOAD_DTTM"));
        assert!(ColumnPattern::Timestamp.matches("event_dttm"));
        assert!(ColumnPattern::Date.matches("Event_Date"));
        assert!(!ColumnPattern::Timestamp.matches("event_date"));
    }

    #[test]
    fn test_update_date_is_date_but_not_timestamp() {
        assert!(ColumnPattern::Date.matches("update_date"));
        assert!(!ColumnPattern::Timestamp.matches("update_date"));
    }

    #[test]
    fn test_select_preserves_catalog_order() {
        let cols = columns(&["col1", "load_dttm", "event_date", "event_dttm"]);
        assert_eq!(
            ColumnPattern::Timestamp.select(&cols),
            vec!["load_dttm".to_string(), "event_dttm".to_string()]
        );
        assert_eq!(
            ColumnPattern::Date.select(&cols),
            vec!["event_date".to_string()]
        );
    }

    #[test]
    fn test_pattern_display() {
        assert_eq!(ColumnPattern::Timestamp.to_string(), "*dttm*");
        assert_eq!(ColumnPattern::Date.to_string(), "*date*");
    }
}
