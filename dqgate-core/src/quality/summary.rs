//! Aggregator.
//!
//! Combines rule results into one verdict. Pure; no I/O.

use super::models::{RuleId, RuleResult};
use crate::Result;
use crate::error::DqError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Context carried alongside the verdict for the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryMetadata {
    /// Schema of the evaluated table
    pub schema: String,
    /// Evaluated table
    pub table: String,
    /// Configured uniqueness key columns
    pub unique_keys: Vec<String>,
    /// Directory the report artifacts are written to
    pub output_dir: PathBuf,
    /// Instant the rules were evaluated at
    pub evaluated_at: DateTime<Utc>,
}

/// Verdict of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitySummary {
    /// One result per rule, in report order
    pub results: BTreeMap<RuleId, RuleResult>,
    /// True iff every result passed
    pub overall_passed: bool,
    /// Run context
    pub metadata: SummaryMetadata,
}

impl QualitySummary {
    /// Builds the summary from rule results.
    ///
    /// `overall_passed` is the logical AND of every result; there is no
    /// weighting and no partial credit.
    ///
    /// # Errors
    /// Returns a configuration error if any rule in [`RuleId::ALL`] has no
    /// result.
    pub fn aggregate(
        results: impl IntoIterator<Item = RuleResult>,
        metadata: SummaryMetadata,
    ) -> Result<Self> {
        let mut by_rule = BTreeMap::new();
        for result in results {
            if let Some(previous) = by_rule.insert(result.rule_id, result) {
                tracing::warn!(
                    "Rule {} reported more than once, keeping the last result",
                    previous.rule_id
                );
            }
        }

        let missing: Vec<String> = RuleId::ALL
            .iter()
            .filter(|id| !by_rule.contains_key(*id))
            .map(ToString::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(DqError::configuration(format!(
                "No result for rule(s) {} on {}.{}",
                missing.join(", "),
                metadata.schema,
                metadata.table
            )));
        }

        let overall_passed = by_rule.values().all(|r: &RuleResult| r.passed);

        Ok(Self {
            results: by_rule,
            overall_passed,
            metadata,
        })
    }

    /// Result of one rule, if it ran.
    pub fn result(&self, rule_id: RuleId) -> Option<&RuleResult> {
        self.results.get(&rule_id)
    }

    /// Rules that did not pass, in report order.
    pub fn failed_rules(&self) -> Vec<RuleId> {
        self.results
            .values()
            .filter(|r| !r.passed)
            .map(|r| r.rule_id)
            .collect()
    }

    /// `schema.table` of the evaluated table.
    pub fn table_name(&self) -> String {
        format!("{}.{}", self.metadata.schema, self.metadata.table)
    }
}
