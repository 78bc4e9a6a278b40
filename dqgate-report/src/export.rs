//! Machine-readable exports of the summary.
//!
//! `notnull.csv` carries the per-column null statistics and
//! `duplicates.csv` the duplicate key groups (header only when there are
//! none). Both are built in memory and written by the renderer.

use dqgate_core::quality::DuplicateGroup;
use dqgate_core::{DqError, Evidence, QualitySummary, Result, RuleId};

/// Header of the null statistics export.
pub const NOTNULL_HEADER: [&str; 4] = ["column", "nulls", "total", "null_pct"];

fn csv_error(file: &str, error: csv::Error) -> DqError {
    DqError::render_failed(format!("Failed to build {}", file), error)
}

fn finish(file: &str, writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| DqError::io(format!("Failed to flush {}", file), e.into_error()))
}

/// Builds `notnull.csv`: one row per checked column.
///
/// # Errors
/// Returns `DqError::Render` if a record cannot be encoded.
pub fn notnull_csv(summary: &QualitySummary) -> Result<Vec<u8>> {
    const FILE: &str = "notnull.csv";

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(NOTNULL_HEADER)
        .map_err(|e| csv_error(FILE, e))?;

    if let Some(Evidence::NullStats { columns, .. }) =
        summary.result(RuleId::NotNull).map(|r| &r.evidence)
    {
        for stats in columns {
            writer
                .write_record([
                    stats.column.clone(),
                    stats.null_count.to_string(),
                    stats.total.to_string(),
                    stats.null_pct.to_string(),
                ])
                .map_err(|e| csv_error(FILE, e))?;
        }
    }

    finish(FILE, writer)
}

/// Builds `duplicates.csv`: key columns plus `dup_count`, NULL keys as
/// empty fields.
///
/// # Errors
/// Returns `DqError::Render` if a record cannot be encoded.
pub fn duplicates_csv(summary: &QualitySummary) -> Result<Vec<u8>> {
    const FILE: &str = "duplicates.csv";

    let no_groups: &[DuplicateGroup] = &[];
    let evidence = summary.result(RuleId::Uniqueness).map(|r| &r.evidence);
    let (key_columns, groups) = match evidence {
        Some(Evidence::Duplicates {
            key_columns,
            groups,
            ..
        }) => (key_columns.as_slice(), groups.as_slice()),
        _ => (summary.metadata.unique_keys.as_slice(), no_groups),
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    let header = key_columns
        .iter()
        .map(String::as_str)
        .chain(std::iter::once("dup_count"));
    writer
        .write_record(header)
        .map_err(|e| csv_error(FILE, e))?;

    for group in groups {
        let record = group
            .key_values
            .iter()
            .map(|v| v.clone().unwrap_or_default())
            .chain(std::iter::once(group.dup_count.to_string()));
        writer
            .write_record(record)
            .map_err(|e| csv_error(FILE, e))?;
    }

    finish(FILE, writer)
}

/// Serializes the whole summary as pretty JSON.
///
/// # Errors
/// Returns `DqError::Serialization` if serialization fails.
pub fn summary_json(summary: &QualitySummary) -> Result<String> {
    serde_json::to_string_pretty(summary).map_err(|e| DqError::Serialization {
        context: format!("Failed to serialize summary for {}", summary.table_name()),
        source: e,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::summary_with;
    use chrono::Utc;
    use dqgate_core::quality::ColumnNullStats;
    use dqgate_core::{NullPolicy, RuleResult};

    fn summary(results: Vec<RuleResult>) -> QualitySummary {
        summary_with(results, &["col1", "col2"], Utc::now())
    }

    #[test]
    fn test_notnull_csv_rows() {
        let result = RuleResult::new(
            RuleId::NotNull,
            false,
            Evidence::NullStats {
                policy: NullPolicy::Strict,
                columns: vec![
                    ColumnNullStats::from_counts("col1", 4, 4, NullPolicy::Strict),
                    ColumnNullStats::from_counts("col2", 3, 4, NullPolicy::Strict),
                ],
            },
        );
        let csv = String::from_utf8(notnull_csv(&summary(vec![result])).unwrap()).unwrap();
        assert_eq!(
            csv,
            "column,nulls,total,null_pct\ncol1,0,4,0\ncol2,1,4,0.25\n"
        );
    }

    #[test]
    fn test_duplicates_csv_null_keys_are_empty() {
        let result = RuleResult::new(
            RuleId::Uniqueness,
            false,
            Evidence::Duplicates {
                key_columns: vec!["col1".to_string(), "col2".to_string()],
                groups: vec![DuplicateGroup {
                    key_values: vec![Some("7".to_string()), None],
                    dup_count: 2,
                }],
                total_groups: 1,
            },
        );
        let csv = String::from_utf8(duplicates_csv(&summary(vec![result])).unwrap()).unwrap();
        assert_eq!(csv, "col1,col2,dup_count\n7,,2\n");
    }

    #[test]
    fn test_duplicates_csv_header_only_without_duplicates() {
        let csv = String::from_utf8(duplicates_csv(&summary(Vec::new())).unwrap()).unwrap();
        assert_eq!(csv, "col1,col2,dup_count\n");
    }

    #[test]
    fn test_summary_json_round_trips() {
        let summary = summary(Vec::new());
        let json = summary_json(&summary).unwrap();
        let parsed: QualitySummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, summary);
    }
}
