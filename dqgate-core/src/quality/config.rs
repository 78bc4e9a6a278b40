//! Quality rule configuration.
//!
//! Which columns the not-null check covers, which columns form the
//! uniqueness key, how NULLs are judged and how far back the recency rules
//! look. Defaults follow the event-table naming convention
//! (`col1, col2, event_dttm, load_dttm, event_date`).

use crate::error::DqError;
use crate::models::{ColumnDescriptor, TableRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Columns checked for NULLs when none are configured.
pub const DEFAULT_NULL_COLUMNS: [&str; 5] = ["col1", "col2", "event_dttm", "load_dttm", "event_date"];

/// Uniqueness key used when none is configured.
pub const DEFAULT_UNIQUE_KEYS: [&str; 3] = ["col1", "col2", "event_date"];

/// Default recency window in whole days.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 2;

/// Default tolerated NULL fraction in threshold mode.
pub const DEFAULT_NULL_THRESHOLD: f64 = 0.05;

/// How the not-null rule judges a column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum NullPolicy {
    /// Any NULL fails the column
    #[default]
    Strict,
    /// Fails only when the NULL fraction exceeds `max_null_pct`
    Threshold { max_null_pct: f64 },
}

impl NullPolicy {
    /// Returns true if a column with these statistics passes.
    pub fn allows(&self, null_count: u64, null_pct: f64) -> bool {
        match self {
            Self::Strict => null_count == 0,
            Self::Threshold { max_null_pct } => null_pct <= *max_null_pct,
        }
    }

    /// Tolerated NULL fraction (0.0 in strict mode).
    pub const fn max_null_pct(&self) -> f64 {
        match self {
            Self::Strict => 0.0,
            Self::Threshold { max_null_pct } => *max_null_pct,
        }
    }
}

impl std::fmt::Display for NullPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict (no NULLs allowed)"),
            Self::Threshold { max_null_pct } => {
                write!(f, "threshold (at most {:.2}% NULLs)", max_null_pct * 100.0)
            }
        }
    }
}

/// Validation errors for quality configuration.
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("null threshold must be between 0.0 and 1.0, got {0}")]
    InvalidNullThreshold(f64),
    #[error("lookback window must be at least 1 day")]
    InvalidLookback,
    #[error("empty column name in {0}")]
    EmptyColumnName(&'static str),
    #[error("column '{0}' is listed more than once in the uniqueness key")]
    RepeatedKeyColumn(String),
}

impl From<ConfigValidationError> for DqError {
    fn from(error: ConfigValidationError) -> Self {
        Self::configuration(error.to_string())
    }
}

/// Quality rule configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Columns subject to the not-null check
    pub null_columns: Vec<String>,
    /// Ordered columns forming the uniqueness key; empty disables grouping
    pub unique_keys: Vec<String>,
    /// Null evaluation policy
    pub null_policy: NullPolicy,
    /// Recency window for freshness and staleness, in whole days
    pub lookback_days: u32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            null_columns: DEFAULT_NULL_COLUMNS.iter().map(ToString::to_string).collect(),
            unique_keys: DEFAULT_UNIQUE_KEYS.iter().map(ToString::to_string).collect(),
            null_policy: NullPolicy::Strict,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

impl QualityConfig {
    /// Creates a new quality config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the columns checked for NULLs.
    pub fn with_null_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the uniqueness key.
    pub fn with_unique_keys<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique_keys = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to use strict null evaluation.
    pub fn with_strict_nulls(mut self) -> Self {
        self.null_policy = NullPolicy::Strict;
        self
    }

    /// Builder method to use thresholded null evaluation.
    pub fn with_null_threshold(mut self, threshold: f64) -> Self {
        let max_null_pct = if threshold.is_nan() {
            tracing::warn!(
                "null threshold NaN replaced with default {}",
                DEFAULT_NULL_THRESHOLD
            );
            DEFAULT_NULL_THRESHOLD
        } else {
            if !(0.0..=1.0).contains(&threshold) {
                tracing::warn!(
                    "null threshold {} clamped to valid range [0.0, 1.0]",
                    threshold
                );
            }
            threshold.clamp(0.0, 1.0)
        };
        self.null_policy = NullPolicy::Threshold { max_null_pct };
        self
    }

    /// Builder method to set the recency window.
    pub fn with_lookback_days(mut self, days: u32) -> Self {
        if days == 0 {
            tracing::warn!("lookback window 0 clamped to 1 day");
        }
        self.lookback_days = days.max(1);
        self
    }

    /// Validates the configuration on its own.
    ///
    /// Returns an error if a threshold or window is out of range or a
    /// column list contains an empty or repeated name.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if let NullPolicy::Threshold { max_null_pct } = self.null_policy
            && !(0.0..=1.0).contains(&max_null_pct)
        {
            return Err(ConfigValidationError::InvalidNullThreshold(max_null_pct));
        }
        if self.lookback_days == 0 {
            return Err(ConfigValidationError::InvalidLookback);
        }
        if self.null_columns.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigValidationError::EmptyColumnName("not-null columns"));
        }
        if self.unique_keys.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigValidationError::EmptyColumnName("uniqueness key"));
        }
        for (index, key) in self.unique_keys.iter().enumerate() {
            if self.unique_keys[..index].contains(key) {
                return Err(ConfigValidationError::RepeatedKeyColumn(key.clone()));
            }
        }
        Ok(())
    }

    /// Checks that every configured column exists in the inspected table.
    ///
    /// Names are compared exactly, as the catalog stores them.
    ///
    /// # Errors
    /// Returns a configuration error naming the first missing column
    pub fn validate_against(
        &self,
        table: &TableRef,
        columns: &[ColumnDescriptor],
    ) -> crate::Result<()> {
        let exists = |name: &str| columns.iter().any(|c| c.name == name);

        if let Some(missing) = self.null_columns.iter().find(|c| !exists(c)) {
            return Err(DqError::configuration(format!(
                "not-null column '{}' does not exist in {}",
                missing, table
            )));
        }
        if let Some(missing) = self.unique_keys.iter().find(|c| !exists(c)) {
            return Err(DqError::configuration(format!(
                "uniqueness key column '{}' does not exist in {}",
                missing, table
            )));
        }
        Ok(())
    }
}
