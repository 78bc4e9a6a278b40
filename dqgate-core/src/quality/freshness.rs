//! Freshness by recency timestamp.
//!
//! Looks at every `*dttm*` column and passes when at least one maximum is
//! no older than `now - lookback_days`, compared in UTC. A table without
//! any `*dttm*` column fails: no freshness signal is not the same as a
//! fresh one.

use super::models::{ColumnMax, Evidence, RuleId, RuleResult};
use super::rule::{QualityRule, RuleContext};
use crate::Result;
use crate::error::DqError;
use crate::models::ColumnPattern;
use async_trait::async_trait;
use chrono::TimeDelta;

/// Passes when some timestamp column was written within the window.
#[derive(Debug, Clone, Copy)]
pub struct FreshnessRule {
    lookback_days: u32,
}

impl FreshnessRule {
    /// Creates a new freshness rule.
    pub fn new(lookback_days: u32) -> Self {
        Self { lookback_days }
    }
}

#[async_trait]
impl QualityRule for FreshnessRule {
    fn id(&self) -> RuleId {
        RuleId::Freshness
    }

    async fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<RuleResult> {
        let pattern = ColumnPattern::Timestamp;
        let candidates = ctx.columns_matching(pattern);
        if candidates.is_empty() {
            tracing::info!("No {} columns in {}, freshness cannot be shown", pattern, ctx.table);
            return Ok(RuleResult::new(
                self.id(),
                false,
                Evidence::no_qualifying_columns(pattern),
            ));
        }

        let threshold = ctx
            .now
            .checked_sub_signed(TimeDelta::days(i64::from(self.lookback_days)))
            .ok_or_else(|| {
                DqError::configuration(format!(
                    "lookback window of {} days is out of range",
                    self.lookback_days
                ))
            })?;

        let mut columns = Vec::with_capacity(candidates.len());
        for column in candidates {
            let max = ctx.source.max_timestamp(ctx.table, &column).await?;
            tracing::debug!("MAX({}) = {:?}", column, max);
            columns.push(ColumnMax::new(column, max));
        }

        let passed = columns
            .iter()
            .any(|c| c.max.is_some_and(|max| max >= threshold));

        Ok(RuleResult::new(
            self.id(),
            passed,
            Evidence::Freshness {
                lookback_days: self.lookback_days,
                threshold,
                columns,
            },
        ))
    }
}
