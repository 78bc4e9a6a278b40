//! Not-null rate check.
//!
//! For each configured column `null_count = total - COUNT(column)` and
//! `null_pct = null_count / total`, with `null_pct = 0` on an empty table.

use super::config::NullPolicy;
use super::models::{ColumnNullStats, Evidence, RuleId, RuleResult};
use super::rule::{QualityRule, RuleContext};
use crate::Result;
use async_trait::async_trait;

/// Checks configured columns against a null policy.
#[derive(Debug, Clone)]
pub struct NotNullRule {
    columns: Vec<String>,
    policy: NullPolicy,
}

impl NotNullRule {
    /// Creates a new not-null rule.
    pub fn new(columns: Vec<String>, policy: NullPolicy) -> Self {
        Self { columns, policy }
    }
}

#[async_trait]
impl QualityRule for NotNullRule {
    fn id(&self) -> RuleId {
        RuleId::NotNull
    }

    async fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<RuleResult> {
        let mut stats = Vec::with_capacity(self.columns.len());

        if !self.columns.is_empty() {
            let total = ctx.source.row_count(ctx.table).await?;
            for column in &self.columns {
                let non_null = ctx.source.non_null_count(ctx.table, column).await?;
                let column_stats =
                    ColumnNullStats::from_counts(column.as_str(), non_null, total, self.policy);
                tracing::debug!(
                    "{}: {} NULLs of {} rows ({:.4})",
                    column,
                    column_stats.null_count,
                    total,
                    column_stats.null_pct
                );
                stats.push(column_stats);
            }
        }

        let passed = stats.iter().all(|s| s.within_limit);
        Ok(RuleResult::new(
            self.id(),
            passed,
            Evidence::NullStats {
                policy: self.policy,
                columns: stats,
            },
        ))
    }
}
