//! Naming-convention presence check.

use super::models::{Evidence, RuleId, RuleResult};
use super::rule::{QualityRule, RuleContext};
use crate::Result;
use crate::models::ColumnPattern;
use async_trait::async_trait;

/// Passes when at least one column name contains `dttm`.
///
/// Metadata only; no rows are read.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamingConventionRule;

#[async_trait]
impl QualityRule for NamingConventionRule {
    fn id(&self) -> RuleId {
        RuleId::NamingConvention
    }

    async fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<RuleResult> {
        let pattern = ColumnPattern::Timestamp;
        let columns = ctx.columns_matching(pattern);
        tracing::debug!("{} columns matching {}: {:?}", columns.len(), pattern, columns);

        Ok(RuleResult::new(
            self.id(),
            !columns.is_empty(),
            Evidence::MatchedColumns { pattern, columns },
        ))
    }
}
