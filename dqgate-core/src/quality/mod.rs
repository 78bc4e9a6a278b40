//! Data quality rules and aggregation.
//!
//! This module provides the five rules a table is gated on:
//! - **Naming convention**: at least one `*dttm*` column exists
//! - **Not-null**: configured columns have no (or few enough) NULLs
//! - **Uniqueness**: no key tuple occurs twice
//! - **Freshness**: some `*dttm*` column was written within the window
//! - **Staleness**: some `*date*` column is recent or in the current month
//!
//! Rules share the `QualityRule` trait and are run by `QualityAnalyzer`,
//! which aggregates them into a `QualitySummary`.
//!
//! # Security Guarantees
//! - Rules never build SQL; identifiers are quoted by the data source
//! - Evidence carries counts, column names, duplicate key values and maxima
//! - A failing rule is a verdict, not an error
//!
//! # Example
//! ```rust,ignore
//! use dqgate_core::quality::{QualityAnalyzer, QualityConfig};
//!
//! let analyzer = QualityAnalyzer::new(QualityConfig::default());
//! let summary = analyzer.analyze(source.as_ref(), &table).await?;
//! println!("overall: {}", if summary.overall_passed { "PASS" } else { "FAIL" });
//! ```

mod analyzer;
mod completeness;
mod config;
mod freshness;
mod models;
mod naming;
mod rule;
mod staleness;
mod summary;
mod uniqueness;

// Re-export public API
pub use analyzer::{DEFAULT_OUTPUT_DIR, QualityAnalyzer};
pub use completeness::NotNullRule;
pub use config::{
    ConfigValidationError, DEFAULT_LOOKBACK_DAYS, DEFAULT_NULL_COLUMNS, DEFAULT_NULL_THRESHOLD,
    DEFAULT_UNIQUE_KEYS, NullPolicy, QualityConfig,
};
pub use freshness::FreshnessRule;
pub use models::{
    ColumnMax, ColumnNullStats, DUPLICATE_EVIDENCE_LIMIT, DuplicateGroup, Evidence,
    NO_QUALIFYING_COLUMNS, RuleId, RuleResult,
};
pub use naming::NamingConventionRule;
pub use rule::{QualityRule, RuleContext};
pub use staleness::StalenessRule;
pub use summary::{QualitySummary, SummaryMetadata};
pub use uniqueness::UniquenessRule;
