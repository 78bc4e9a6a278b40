//! Summary builders for unit tests.

#![allow(clippy::unwrap_used)]

use chrono::{DateTime, Utc};
use dqgate_core::{
    ColumnPattern, Evidence, NullPolicy, QualitySummary, RuleId, RuleResult, SummaryMetadata,
};
use std::path::PathBuf;

/// Passing result with empty evidence for `rule_id`.
fn filler(rule_id: RuleId, unique_keys: &[String]) -> RuleResult {
    let evidence = match rule_id {
        RuleId::NamingConvention => Evidence::MatchedColumns {
            pattern: ColumnPattern::Timestamp,
            columns: vec!["load_dttm".to_string()],
        },
        RuleId::NotNull => Evidence::NullStats {
            policy: NullPolicy::Strict,
            columns: Vec::new(),
        },
        RuleId::Uniqueness => Evidence::Duplicates {
            key_columns: unique_keys.to_vec(),
            groups: Vec::new(),
            total_groups: 0,
        },
        RuleId::Freshness => Evidence::no_qualifying_columns(ColumnPattern::Timestamp),
        RuleId::Staleness => Evidence::no_qualifying_columns(ColumnPattern::Date),
    };
    RuleResult::new(rule_id, true, evidence)
}

/// Summary of `mai.events` holding `results`, with every other rule passing.
pub(crate) fn summary_with(
    results: Vec<RuleResult>,
    unique_keys: &[&str],
    evaluated_at: DateTime<Utc>,
) -> QualitySummary {
    let unique_keys: Vec<String> = unique_keys.iter().map(ToString::to_string).collect();
    let missing: Vec<RuleResult> = RuleId::ALL
        .into_iter()
        .filter(|id| !results.iter().any(|r| r.rule_id == *id))
        .map(|id| filler(id, &unique_keys))
        .collect();

    QualitySummary::aggregate(
        results.into_iter().chain(missing),
        SummaryMetadata {
            schema: "mai".to_string(),
            table: "events".to_string(),
            unique_keys,
            output_dir: PathBuf::from("artifacts"),
            evaluated_at,
        },
    )
    .unwrap()
}
