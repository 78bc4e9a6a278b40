//! Quality analyzer facade.
//!
//! This module provides the `QualityAnalyzer` that inspects the table,
//! checks the configuration against it, runs every rule in report order and
//! aggregates the results.

use crate::Result;
use crate::adapters::DataSource;
use crate::models::TableRef;
use crate::schema::inspect_table;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

use super::completeness::NotNullRule;
use super::config::QualityConfig;
use super::freshness::FreshnessRule;
use super::models::{RuleId, RuleResult};
use super::naming::NamingConventionRule;
use super::rule::{QualityRule, RuleContext};
use super::staleness::StalenessRule;
use super::summary::{QualitySummary, SummaryMetadata};
use super::uniqueness::UniquenessRule;

/// Default directory for report artifacts.
pub const DEFAULT_OUTPUT_DIR: &str = "artifacts";

/// Runs the rule set against one table.
///
/// # Example
///
/// ```rust,ignore
/// use dqgate_core::{QualityAnalyzer, QualityConfig, TableRef, create_source};
///
/// let source = create_source(&database_url).await?;
/// let analyzer = QualityAnalyzer::new(QualityConfig::default());
/// let summary = analyzer.analyze(source.as_ref(), &TableRef::new("mai", "events")).await?;
/// println!("overall: {}", summary.overall_passed);
/// ```
pub struct QualityAnalyzer {
    config: QualityConfig,
    output_dir: PathBuf,
    rules: Vec<Box<dyn QualityRule>>,
}

impl std::fmt::Debug for QualityAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QualityAnalyzer")
            .field("config", &self.config)
            .field("output_dir", &self.output_dir)
            .field("rules", &self.rule_ids())
            .finish()
    }
}

impl QualityAnalyzer {
    /// Creates an analyzer running the five standard rules.
    pub fn new(config: QualityConfig) -> Self {
        let rules: Vec<Box<dyn QualityRule>> = vec![
            Box::new(NamingConventionRule),
            Box::new(NotNullRule::new(
                config.null_columns.clone(),
                config.null_policy,
            )),
            Box::new(UniquenessRule::new(config.unique_keys.clone())),
            Box::new(FreshnessRule::new(config.lookback_days)),
            Box::new(StalenessRule::new(config.lookback_days)),
        ];

        Self {
            config,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            rules,
        }
    }

    /// Creates an analyzer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(QualityConfig::default())
    }

    /// Builder method to set the artifact directory recorded in the summary.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Builder method to replace the rule with the same id, or add a new one.
    pub fn with_rule(mut self, rule: Box<dyn QualityRule>) -> Self {
        let id = rule.id();
        self.rules.retain(|r| r.id() != id);
        self.rules.push(rule);
        self.rules.sort_by_key(|r| r.id());
        self
    }

    /// Returns a reference to the analyzer configuration.
    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Identifiers of the configured rules, in evaluation order.
    pub fn rule_ids(&self) -> Vec<RuleId> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Evaluates every rule against `table` as of now.
    ///
    /// # Errors
    /// Any configuration, connection, catalog or query error aborts the run;
    /// no partial summary is produced.
    pub async fn analyze(
        &self,
        source: &dyn DataSource,
        table: &TableRef,
    ) -> Result<QualitySummary> {
        self.analyze_at(source, table, Utc::now()).await
    }

    /// Evaluates every rule against `table` as of `now`.
    ///
    /// # Errors
    /// See [`QualityAnalyzer::analyze`].
    pub async fn analyze_at(
        &self,
        source: &dyn DataSource,
        table: &TableRef,
        now: DateTime<Utc>,
    ) -> Result<QualitySummary> {
        self.config.validate()?;

        tracing::info!("Connecting to {} source", source.source_kind());
        source.test_connection().await?;

        let columns = inspect_table(source, table).await?;
        self.config.validate_against(table, &columns)?;

        let ctx = RuleContext::new(table, &columns, source, now);
        let mut results: Vec<RuleResult> = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            let result = rule.evaluate(&ctx).await?;
            tracing::info!(
                "Rule {}: {}",
                result.rule_id,
                if result.passed { "PASS" } else { "FAIL" }
            );
            results.push(result);
        }

        let summary = QualitySummary::aggregate(
            results,
            SummaryMetadata {
                schema: table.schema.clone(),
                table: table.table.clone(),
                unique_keys: self.config.unique_keys.clone(),
                output_dir: self.output_dir.clone(),
                evaluated_at: now,
            },
        )?;

        tracing::info!(
            "Evaluated {} rules on {}: {}",
            summary.results.len(),
            table,
            if summary.overall_passed { "PASS" } else { "FAIL" }
        );

        Ok(summary)
    }
}
