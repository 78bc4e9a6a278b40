//! The rule abstraction.

use super::models::{RuleId, RuleResult};
use crate::Result;
use crate::adapters::DataSource;
use crate::models::{ColumnDescriptor, ColumnPattern, TableRef};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

/// Everything a rule may look at while evaluating.
///
/// The column list is the Schema Inspector's output and is shared read-only
/// by every rule of a run.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    /// Table under evaluation
    pub table: &'a TableRef,
    /// Inspected columns in physical order
    pub columns: &'a [ColumnDescriptor],
    /// Aggregate access to the table
    pub source: &'a dyn DataSource,
    /// Evaluation instant
    pub now: DateTime<Utc>,
}

impl<'a> RuleContext<'a> {
    /// Creates a new rule context.
    pub fn new(
        table: &'a TableRef,
        columns: &'a [ColumnDescriptor],
        source: &'a dyn DataSource,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            table,
            columns,
            source,
            now,
        }
    }

    /// Calendar date of `now` in UTC.
    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    /// Names of the inspected columns matching `pattern`.
    pub fn columns_matching(&self, pattern: ColumnPattern) -> Vec<String> {
        pattern.select(self.columns)
    }
}

impl std::fmt::Debug for RuleContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleContext")
            .field("table", &self.table)
            .field("columns", &self.columns.len())
            .field("source", &self.source.source_kind())
            .field("now", &self.now)
            .finish()
    }
}

/// A single quality check.
///
/// A failing check is a normal outcome and is returned as a `RuleResult`
/// with `passed = false`. `Err` is reserved for queries that could not run.
#[async_trait]
pub trait QualityRule: Send + Sync {
    /// Identifier of this rule.
    fn id(&self) -> RuleId;

    /// Evaluates the rule against the table in `ctx`.
    async fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<RuleResult>;
}
