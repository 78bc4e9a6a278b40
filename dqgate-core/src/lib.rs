//! Core rule evaluation engine for dqgate.
//!
//! This crate holds everything that makes a decision about a table: the
//! data source abstraction, the schema inspector, the five quality rules and
//! the aggregator that folds their outcomes into a single verdict. Rendering
//! and the command-line surface live in sibling crates.
//!
//! # Guarantees
//! - All database operations are read-only
//! - Credentials are never stored in models or included in error messages
//! - Runs are stateless: nothing is cached between evaluations
//!
//! # Architecture
//! - Repository pattern for data access (`DataSource`)
//! - One `QualityRule` implementation per check, evaluated sequentially
//! - Quality failures are values (`RuleResult::passed`), never errors

pub mod adapters;
pub mod error;
pub mod logging;
pub mod models;
pub mod quality;
pub mod schema;

// Re-export commonly used types
pub use adapters::{ConnectionConfig, DataSource, create_source};
pub use error::{DqError, Result};
pub use logging::init_logging;
pub use models::{ColumnDescriptor, ColumnPattern, TableRef};
pub use quality::{
    Evidence, NullPolicy, QualityAnalyzer, QualityConfig, QualitySummary, RuleId, RuleResult,
    SummaryMetadata,
};
pub use schema::inspect_table;
