//! Rule result models.
//!
//! These types are the whole interface between the rules, the aggregator and
//! the report renderer. They carry counts, column names, key values of
//! duplicate groups and column maxima; nothing here references the data
//! source.

use super::config::NullPolicy;
use crate::models::ColumnPattern;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on duplicate groups carried as evidence.
///
/// Bounds the report size only. The uniqueness verdict is computed from the
/// uncapped group count.
pub const DUPLICATE_EVIDENCE_LIMIT: usize = 100;

/// Reason reported when no column matches a recency pattern.
pub const NO_QUALIFYING_COLUMNS: &str = "no qualifying columns";

/// Identifier of a quality rule.
///
/// The derived ordering is the fixed report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    /// At least one `*dttm*` column exists
    NamingConvention,
    /// Configured columns have no (or few enough) NULLs
    NotNull,
    /// No duplicate key tuples
    Uniqueness,
    /// A timestamp column was written recently
    Freshness,
    /// A date column is recent or in the current month
    Staleness,
}

impl RuleId {
    /// Every rule, in report order.
    pub const ALL: [Self; 5] = [
        Self::NamingConvention,
        Self::NotNull,
        Self::Uniqueness,
        Self::Freshness,
        Self::Staleness,
    ];

    /// Stable machine-readable identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NamingConvention => "naming_convention",
            Self::NotNull => "not_null",
            Self::Uniqueness => "uniqueness",
            Self::Freshness => "freshness",
            Self::Staleness => "staleness",
        }
    }

    /// Human-readable section title.
    pub const fn title(self) -> &'static str {
        match self {
            Self::NamingConvention => "Naming convention (*dttm* columns)",
            Self::NotNull => "Not-null check",
            Self::Uniqueness => "Uniqueness",
            Self::Freshness => "Freshness by timestamp (*dttm*)",
            Self::Staleness => "Staleness by date (*date*)",
        }
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Null statistics for one checked column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnNullStats {
    /// Column name
    pub column: String,
    /// Rows where the column is NULL
    pub null_count: u64,
    /// Rows in the table
    pub total: u64,
    /// `null_count / total`, 0.0 for an empty table
    pub null_pct: f64,
    /// Whether the column satisfies the null policy
    pub within_limit: bool,
}

impl ColumnNullStats {
    /// Derives the statistics from a non-NULL count.
    pub fn from_counts(
        column: impl Into<String>,
        non_null: u64,
        total: u64,
        policy: NullPolicy,
    ) -> Self {
        let column = column.into();
        if non_null > total {
            tracing::warn!(
                "Non-null count ({}) exceeds row count ({}) for column '{}'",
                non_null,
                total,
                column
            );
        }

        let null_count = total.saturating_sub(non_null);
        // An empty table is vacuously compliant
        let null_pct = if total == 0 {
            0.0
        } else {
            null_count as f64 / total as f64
        };

        Self {
            column,
            null_count,
            total,
            null_pct,
            within_limit: policy.allows(null_count, null_pct),
        }
    }
}

/// One group of rows sharing the same key tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Key values in key-column order, as text; `None` is SQL NULL
    pub key_values: Vec<Option<String>>,
    /// Number of rows in the group (always > 1)
    pub dup_count: u64,
}

/// Maximum value observed in one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMax<T> {
    /// Column name
    pub column: String,
    /// Column maximum, `None` when every value is NULL
    pub max: Option<T>,
}

impl<T> ColumnMax<T> {
    /// Creates a new column maximum.
    pub fn new(column: impl Into<String>, max: Option<T>) -> Self {
        Self {
            column: column.into(),
            max,
        }
    }
}

/// Rule-specific diagnostic data attached to a verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Evidence {
    /// Column names matching a naming pattern
    MatchedColumns {
        pattern: ColumnPattern,
        columns: Vec<String>,
    },
    /// Per-column null statistics
    NullStats {
        policy: NullPolicy,
        columns: Vec<ColumnNullStats>,
    },
    /// Duplicate key groups, capped at `DUPLICATE_EVIDENCE_LIMIT`
    Duplicates {
        key_columns: Vec<String>,
        groups: Vec<DuplicateGroup>,
        total_groups: u64,
    },
    /// Timestamp maxima against a UTC threshold
    Freshness {
        lookback_days: u32,
        threshold: DateTime<Utc>,
        columns: Vec<ColumnMax<DateTime<Utc>>>,
    },
    /// Date maxima against a threshold date and the current month
    Staleness {
        lookback_days: u32,
        today: NaiveDate,
        threshold_date: NaiveDate,
        month_start: NaiveDate,
        columns: Vec<ColumnMax<NaiveDate>>,
    },
    /// No column matched the rule's pattern
    NoQualifyingColumns {
        pattern: ColumnPattern,
        reason: String,
    },
}

impl Evidence {
    /// Evidence for a recency rule that found no candidate columns.
    pub fn no_qualifying_columns(pattern: ColumnPattern) -> Self {
        Self::NoQualifyingColumns {
            pattern,
            reason: NO_QUALIFYING_COLUMNS.to_string(),
        }
    }
}

/// Verdict of one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    /// Which rule produced this result
    pub rule_id: RuleId,
    /// Whether the rule passed
    pub passed: bool,
    /// Supporting diagnostics
    pub evidence: Evidence,
}

impl RuleResult {
    /// Creates a new rule result.
    pub fn new(rule_id: RuleId, passed: bool, evidence: Evidence) -> Self {
        Self {
            rule_id,
            passed,
            evidence,
        }
    }
}
