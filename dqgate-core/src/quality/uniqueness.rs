//! Key uniqueness check.
//!
//! Groups rows by the configured key tuple. The verdict uses the uncapped
//! number of duplicate groups; the evidence keeps at most
//! `DUPLICATE_EVIDENCE_LIMIT` of them, largest first.

use super::models::{DUPLICATE_EVIDENCE_LIMIT, Evidence, RuleId, RuleResult};
use super::rule::{QualityRule, RuleContext};
use crate::Result;
use crate::adapters::DuplicateScan;
use async_trait::async_trait;

/// Fails when any key tuple occurs more than once.
#[derive(Debug, Clone)]
pub struct UniquenessRule {
    key_columns: Vec<String>,
    evidence_limit: usize,
}

impl UniquenessRule {
    /// Creates a new uniqueness rule over `key_columns`.
    pub fn new(key_columns: Vec<String>) -> Self {
        Self {
            key_columns,
            evidence_limit: DUPLICATE_EVIDENCE_LIMIT,
        }
    }

    /// Builder method to override the evidence cap.
    pub fn with_evidence_limit(mut self, limit: usize) -> Self {
        self.evidence_limit = limit;
        self
    }
}

#[async_trait]
impl QualityRule for UniquenessRule {
    fn id(&self) -> RuleId {
        RuleId::Uniqueness
    }

    async fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<RuleResult> {
        // No key, nothing to group by
        let scan = if self.key_columns.is_empty() {
            DuplicateScan::default()
        } else {
            ctx.source
                .duplicate_groups(ctx.table, &self.key_columns, self.evidence_limit)
                .await?
        };

        if scan.total_groups > 0 {
            tracing::info!(
                "{} duplicate groups for key ({}) in {}",
                scan.total_groups,
                self.key_columns.join(", "),
                ctx.table
            );
        }

        let passed = scan.total_groups == 0 && scan.groups.is_empty();
        Ok(RuleResult::new(
            self.id(),
            passed,
            Evidence::Duplicates {
                key_columns: self.key_columns.clone(),
                groups: scan.groups,
                total_groups: scan.total_groups,
            },
        ))
    }
}
