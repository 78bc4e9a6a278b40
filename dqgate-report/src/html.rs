//! HTML rendering of a quality summary.
//!
//! The summary is flattened into plain view models (notes plus an optional
//! table per rule) so the template stays free of evidence logic. All values
//! are escaped by askama.

use askama::Template;
use chrono::{DateTime, NaiveDate, Utc};
use dqgate_core::quality::{ColumnMax, ColumnNullStats, DuplicateGroup, NullPolicy};
use dqgate_core::{DqError, Evidence, QualitySummary, Result, RuleResult};

/// One table cell; NULL is rendered distinctly from empty text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CellView {
    pub(crate) text: String,
    pub(crate) is_null: bool,
}

impl CellView {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_null: false,
        }
    }

    fn null() -> Self {
        Self {
            text: String::new(),
            is_null: true,
        }
    }

    fn optional(value: Option<String>) -> Self {
        value.map_or_else(Self::null, Self::text)
    }
}

/// One rule's section of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SectionView {
    pub(crate) anchor: &'static str,
    pub(crate) title: &'static str,
    pub(crate) passed: bool,
    pub(crate) notes: Vec<String>,
    pub(crate) headers: Vec<String>,
    pub(crate) rows: Vec<Vec<CellView>>,
}

impl SectionView {
    /// Whether the section renders a table.
    pub(crate) fn has_table(&self) -> bool {
        !self.headers.is_empty() && !self.rows.is_empty()
    }
}

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate<'a> {
    table_name: &'a str,
    evaluated_at: String,
    sections: Vec<SectionView>,
    overall_passed: bool,
}

fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn format_pct(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

fn days(n: u32) -> String {
    if n == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", n)
    }
}

fn null_stats_rows(columns: &[ColumnNullStats]) -> Vec<Vec<CellView>> {
    columns
        .iter()
        .map(|c| {
            vec![
                CellView::text(&c.column),
                CellView::text(c.null_count.to_string()),
                CellView::text(c.total.to_string()),
                CellView::text(format_pct(c.null_pct)),
                CellView::text(if c.within_limit { "ok" } else { "violation" }),
            ]
        })
        .collect()
}

fn duplicate_rows(groups: &[DuplicateGroup]) -> Vec<Vec<CellView>> {
    groups
        .iter()
        .map(|g| {
            g.key_values
                .iter()
                .cloned()
                .map(CellView::optional)
                .chain(std::iter::once(CellView::text(g.dup_count.to_string())))
                .collect()
        })
        .collect()
}

fn max_rows<T>(columns: &[ColumnMax<T>], format: impl Fn(&T) -> String) -> Vec<Vec<CellView>> {
    columns
        .iter()
        .map(|c| {
            vec![
                CellView::text(&c.column),
                CellView::optional(c.max.as_ref().map(&format)),
            ]
        })
        .collect()
}

fn policy_note(policy: &NullPolicy) -> String {
    format!("Mode: {}.", policy)
}

/// Builds the section for one rule result.
pub(crate) fn section(result: &RuleResult) -> SectionView {
    let mut view = SectionView {
        anchor: result.rule_id.as_str(),
        title: result.rule_id.title(),
        passed: result.passed,
        notes: Vec::new(),
        headers: Vec::new(),
        rows: Vec::new(),
    };

    match &result.evidence {
        Evidence::MatchedColumns { pattern, columns } => {
            if columns.is_empty() {
                view.notes
                    .push(format!("No column name matches {}.", pattern));
            } else {
                view.notes.push(format!(
                    "Columns matching {}: {}.",
                    pattern,
                    columns.join(", ")
                ));
            }
        }
        Evidence::NullStats { policy, columns } => {
            view.notes.push(policy_note(policy));
            if columns.is_empty() {
                view.notes.push("No columns configured for the not-null check.".to_string());
            } else {
                view.headers = ["column", "nulls", "total", "null_pct", "status"]
                    .map(String::from)
                    .to_vec();
                view.rows = null_stats_rows(columns);
            }
        }
        Evidence::Duplicates {
            key_columns,
            groups,
            total_groups,
        } => {
            if key_columns.is_empty() {
                view.notes
                    .push("No key columns configured; nothing to group by.".to_string());
            } else {
                view.notes
                    .push(format!("Key columns: {}.", key_columns.join(", ")));
            }

            if groups.is_empty() && *total_groups == 0 {
                view.notes.push("No duplicates found.".to_string());
            } else {
                let shown = u64::try_from(groups.len()).unwrap_or(u64::MAX);
                if shown < *total_groups {
                    view.notes.push(format!(
                        "Showing {} of {} duplicate groups.",
                        shown, total_groups
                    ));
                } else {
                    view.notes
                        .push(format!("{} duplicate groups found.", total_groups));
                }
                view.headers = key_columns
                    .iter()
                    .cloned()
                    .chain(std::iter::once("dup_count".to_string()))
                    .collect();
                view.rows = duplicate_rows(groups);
            }
        }
        Evidence::Freshness {
            lookback_days,
            threshold,
            columns,
        } => {
            view.notes.push(format!(
                "Lookback: {}. Threshold (UTC): {}.",
                days(*lookback_days),
                format_instant(threshold)
            ));
            view.headers = ["column", "max (UTC)"].map(String::from).to_vec();
            view.rows = max_rows(columns, format_instant);
        }
        Evidence::Staleness {
            lookback_days,
            today,
            threshold_date,
            month_start,
            columns,
        } => {
            view.notes.push(format!(
                "Lookback: {}. Threshold date: {}. Month start: {}. Today (UTC): {}.",
                days(*lookback_days),
                threshold_date,
                month_start,
                today
            ));
            view.headers = ["column", "max"].map(String::from).to_vec();
            view.rows = max_rows(columns, NaiveDate::to_string);
        }
        Evidence::NoQualifyingColumns { pattern, reason } => {
            view.notes
                .push(format!("No columns match {}: {}.", pattern, reason));
        }
    }

    view
}

/// Renders the full HTML document.
///
/// # Errors
/// Returns `DqError::Render` if the template fails to render.
pub fn render_html(summary: &QualitySummary) -> Result<String> {
    let table_name = summary.table_name();
    let template = ReportTemplate {
        table_name: &table_name,
        evaluated_at: format_instant(&summary.metadata.evaluated_at),
        sections: summary.results.values().map(section).collect(),
        overall_passed: summary.overall_passed,
    };

    template
        .render()
        .map_err(|e| DqError::render_failed(format!("Failed to render HTML report for {}", table_name), e))
}
