//! Staleness by recency date.
//!
//! Looks at every `*date*` column. A maximum passes when it is on or after
//! `today - lookback_days`, or when it falls between the first of the
//! current month and today. The month clause lets monthly-cadence tables
//! pass without daily rows. A table without any `*date*` column passes.

use super::models::{ColumnMax, Evidence, RuleId, RuleResult};
use super::rule::{QualityRule, RuleContext};
use crate::Result;
use crate::error::DqError;
use crate::models::ColumnPattern;
use async_trait::async_trait;
use chrono::{Datelike, Days, NaiveDate};

/// Passes when some date column is recent or in the current month.
#[derive(Debug, Clone, Copy)]
pub struct StalenessRule {
    lookback_days: u32,
}

impl StalenessRule {
    /// Creates a new staleness rule.
    pub fn new(lookback_days: u32) -> Self {
        Self { lookback_days }
    }
}

/// Window boundaries derived from today's date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DateWindow {
    today: NaiveDate,
    threshold_date: NaiveDate,
    month_start: NaiveDate,
}

impl DateWindow {
    fn new(today: NaiveDate, lookback_days: u32) -> Result<Self> {
        let threshold_date = today
            .checked_sub_days(Days::new(u64::from(lookback_days)))
            .ok_or_else(|| {
                DqError::configuration(format!(
                    "lookback window of {} days is out of range",
                    lookback_days
                ))
            })?;
        let month_start = today.with_day(1).unwrap_or(today);
        Ok(Self {
            today,
            threshold_date,
            month_start,
        })
    }

    fn accepts(&self, max: NaiveDate) -> bool {
        max >= self.threshold_date || (max >= self.month_start && max <= self.today)
    }
}

#[async_trait]
impl QualityRule for StalenessRule {
    fn id(&self) -> RuleId {
        RuleId::Staleness
    }

    async fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<RuleResult> {
        let pattern = ColumnPattern::Date;
        let candidates = ctx.columns_matching(pattern);
        if candidates.is_empty() {
            tracing::debug!("No {} columns in {}, staleness passes", pattern, ctx.table);
            return Ok(RuleResult::new(
                self.id(),
                true,
                Evidence::no_qualifying_columns(pattern),
            ));
        }

        let window = DateWindow::new(ctx.today(), self.lookback_days)?;

        let mut columns = Vec::with_capacity(candidates.len());
        for column in candidates {
            let max = ctx.source.max_date(ctx.table, &column).await?;
            tracing::debug!("MAX({}) = {:?}", column, max);
            columns.push(ColumnMax::new(column, max));
        }

        let passed = columns
            .iter()
            .any(|c| c.max.is_some_and(|max| window.accepts(max)));

        Ok(RuleResult::new(
            self.id(),
            passed,
            Evidence::Staleness {
                lookback_days: self.lookback_days,
                today: window.today,
                threshold_date: window.threshold_date,
                month_start: window.month_start,
                columns,
            },
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::adapters::{CellValue, MemorySource, MemoryTable};
    use crate::models::{ColumnDescriptor, TableRef};
    use chrono::{DateTime, TimeZone, Utc};

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 8, 30, 0).unwrap()
    }

    async fn evaluate(columns: Vec<ColumnDescriptor>, rows: Vec<Vec<CellValue>>) -> RuleResult {
        let table = TableRef::new("mai", "events");
        let mut data = MemoryTable::new(columns.clone());
        for r in rows {
            data = data.with_row(r).unwrap();
        }
        let source = MemorySource::new().with_table(table.clone(), data);
        let ctx = RuleContext::new(&table, &columns, &source, now());
        StalenessRule::new(2).evaluate(&ctx).await.unwrap()
    }

    fn event_date() -> Vec<ColumnDescriptor> {
        vec![ColumnDescriptor::new("event_date", "date")]
    }

    #[test]
    fn test_window_boundaries() {
        let window = DateWindow::new(date(5, 20), 2).unwrap();
        assert_eq!(window.threshold_date, date(5, 18));
        assert_eq!(window.month_start, date(5, 1));

        assert!(window.accepts(date(5, 18)));
        assert!(window.accepts(date(5, 3)));
        assert!(window.accepts(date(5, 1)));
        assert!(!window.accepts(date(4, 30)));
    }

    #[test]
    fn test_future_dates_pass_through_lookback() {
        let window = DateWindow::new(date(5, 20), 2).unwrap();
        assert!(window.accepts(date(6, 2)));
    }

    #[test]
    fn test_window_crosses_month_boundary() {
        let window = DateWindow::new(date(5, 1), 2).unwrap();
        assert_eq!(window.threshold_date, date(4, 29));
        assert!(window.accepts(date(4, 29)));
        assert!(!window.accepts(date(4, 28)));
    }

    #[tokio::test]
    async fn test_third_of_month_passes_after_lookback() {
        let result = evaluate(event_date(), vec![vec![date(5, 3).into()]]).await;
        assert!(result.passed);

        let Evidence::Staleness {
            today,
            threshold_date,
            month_start,
            columns,
            ..
        } = result.evidence
        else {
            panic!("unexpected evidence");
        };
        assert_eq!(today, date(5, 20));
        assert_eq!(threshold_date, date(5, 18));
        assert_eq!(month_start, date(5, 1));
        assert_eq!(columns[0].max, Some(date(5, 3)));
    }

    #[tokio::test]
    async fn test_previous_month_fails() {
        let result = evaluate(event_date(), vec![vec![date(4, 10).into()]]).await;
        assert!(!result.passed);
    }

    #[tokio::test]
    async fn test_no_qualifying_columns_passes() {
        let columns = vec![ColumnDescriptor::new("load_dttm", "timestamp with time zone")];
        let result = evaluate(columns, Vec::new()).await;
        assert!(result.passed);
        assert_eq!(
            result.evidence,
            Evidence::no_qualifying_columns(ColumnPattern::Date)
        );
    }

    #[tokio::test]
    async fn test_update_date_counts_as_date_column() {
        let columns = vec![
            ColumnDescriptor::new("event_date", "date"),
            ColumnDescriptor::new("update_date", "date"),
        ];
        let rows = vec![vec![date(1, 1).into(), date(5, 19).into()]];
        let result = evaluate(columns, rows).await;
        assert!(result.passed);
    }
}
