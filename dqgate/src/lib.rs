//! Command-line surface for dqgate.
//!
//! This module exposes argument parsing, credential loading and run
//! orchestration so they can be tested without spawning the binary.
//! The process exit contract lives in main.rs.

pub mod check;

pub use check::{
    CheckOutcome, EXIT_FATAL, EXIT_PASS, EXIT_QUALITY_FAIL, evaluate, evaluate_at, run_check,
    status_line,
};

use clap::{Args, Parser, ValueEnum};
use dqgate_core::quality::{DEFAULT_LOOKBACK_DAYS, DEFAULT_NULL_THRESHOLD, DEFAULT_OUTPUT_DIR};
use dqgate_core::{DqError, QualityConfig, Result, TableRef};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI argument structure
#[derive(Debug, Parser)]
#[command(name = "dqgate")]
#[command(about = "Data quality gate for a single database table")]
#[command(version)]
#[command(long_about = "
dqgate - Data quality gate for one table

Runs five checks against a live table and writes an HTML report plus CSV
exports:
- Naming convention: at least one *dttm* column exists
- Not-null: configured columns contain no NULLs (or stay under a threshold)
- Uniqueness: no two rows share the configured key
- Freshness: some *dttm* column has a value inside the lookback window
- Staleness: some *date* column reaches the lookback window or the current month

EXIT CODES:
  0  every check passed
  1  at least one check failed
  2  the run could not complete (connection, missing table, bad configuration)

EXAMPLES:
  DATABASE_URL=postgres://dq@localhost/warehouse dqgate --schema mai --table events
  dqgate --database-url-file ./db.url --table events --null-mode threshold --null-threshold 0.01
")]
pub struct Cli {
    /// Logging flags
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Database connection URL
    #[arg(
        long,
        env = "DATABASE_URL",
        hide_env_values = true,
        help = "Database connection string (credentials will be sanitized in logs)"
    )]
    pub database_url: Option<String>,

    /// Path to file containing database URL
    #[arg(
        long,
        value_name = "FILE",
        help = "Read the connection string from a file when no URL is given"
    )]
    pub database_url_file: Option<PathBuf>,

    /// Schema of the table under evaluation
    #[arg(long, env = "DQ_SCHEMA", default_value = "public")]
    pub schema: String,

    /// Table under evaluation
    #[arg(long, env = "DQ_TABLE")]
    pub table: String,

    /// Columns checked for NULLs
    #[arg(
        long,
        value_name = "COLUMNS",
        default_value = "col1,col2,event_dttm,load_dttm,event_date",
        help = "Comma-separated columns checked for NULLs"
    )]
    pub null_columns: String,

    /// Uniqueness key
    #[arg(
        long,
        value_name = "COLUMNS",
        default_value = "col1,col2,event_date",
        help = "Comma-separated uniqueness key (empty to skip grouping)"
    )]
    pub unique_keys: String,

    /// Null-check mode
    #[arg(long, value_enum, default_value_t = NullModeArg::Strict)]
    pub null_mode: NullModeArg,

    /// Maximum NULL fraction in threshold mode
    #[arg(
        long,
        value_name = "FRACTION",
        value_parser = parse_fraction,
        help = "Maximum NULL fraction per column in threshold mode (0.0 to 1.0, default 0.05)"
    )]
    pub null_threshold: Option<f64>,

    /// Recency window in days
    #[arg(
        long,
        value_name = "DAYS",
        default_value_t = DEFAULT_LOOKBACK_DAYS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub lookback_days: u32,

    /// Output directory for report artifacts
    #[arg(long, env = "DQ_OUTDIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub outdir: PathBuf,

    /// Also write summary.json
    #[arg(long, help = "Also write the summary as summary.json")]
    pub json: bool,
}

/// Verbosity flags shared by every invocation
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all logging except errors")]
    pub quiet: bool,
}

/// Null-check mode as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NullModeArg {
    /// Any NULL fails the column
    Strict,
    /// NULL fraction must not exceed `--null-threshold`
    Threshold,
}

impl Cli {
    /// The table under evaluation.
    ///
    /// # Errors
    /// Returns a configuration error if the schema or table name is blank.
    pub fn table_ref(&self) -> Result<TableRef> {
        if self.schema.trim().is_empty() {
            return Err(DqError::configuration("--schema must not be empty"));
        }
        if self.table.trim().is_empty() {
            return Err(DqError::configuration("--table must not be empty"));
        }
        Ok(TableRef::new(self.schema.as_str(), self.table.as_str()))
    }

    /// `--null-threshold` value that strict mode ignores, if one was given.
    pub fn ignored_null_threshold(&self) -> Option<f64> {
        match self.null_mode {
            NullModeArg::Strict => self.null_threshold,
            NullModeArg::Threshold => None,
        }
    }

    /// Quality configuration assembled from the flags.
    pub fn quality_config(&self) -> QualityConfig {
        let config = QualityConfig::new()
            .with_null_columns(parse_column_list(&self.null_columns))
            .with_unique_keys(parse_column_list(&self.unique_keys))
            .with_lookback_days(self.lookback_days);

        if let Some(threshold) = self.ignored_null_threshold() {
            tracing::warn!(
                "--null-threshold {} ignored: --null-mode is strict (use --null-mode threshold)",
                threshold
            );
        }

        match self.null_mode {
            NullModeArg::Strict => config.with_strict_nulls(),
            NullModeArg::Threshold => config.with_null_threshold(
                self.null_threshold.unwrap_or(DEFAULT_NULL_THRESHOLD),
            ),
        }
    }
}

/// Splits a comma-separated column list, dropping blank entries.
pub fn parse_column_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_fraction(value: &str) -> std::result::Result<f64, String> {
    let fraction: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if (0.0..=1.0).contains(&fraction) {
        Ok(fraction)
    } else {
        Err(format!("{} is outside the valid range [0.0, 1.0]", fraction))
    }
}

/// Where the connection string came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// `--database-url` or the `DATABASE_URL` environment variable
    Argument,
    /// Read from `--database-url-file`
    File(PathBuf),
}

/// Get database connection URL from secure sources
///
/// The flag (or `DATABASE_URL`) wins over the file.
///
/// # Security
///
/// Error messages never contain the URL itself.
///
/// # Errors
///
/// Returns a configuration error if no URL is available, the file cannot be
/// read, or the URL is malformed.
pub fn get_database_url(
    database_url: Option<&str>,
    database_url_file: Option<&Path>,
) -> Result<(String, CredentialSource)> {
    if let Some(url) = database_url.map(str::trim).filter(|u| !u.is_empty()) {
        if validate_database_url(url) {
            return Ok((url.to_string(), CredentialSource::Argument));
        }
        return Err(DqError::configuration(
            "Invalid database URL format in --database-url / DATABASE_URL (expected postgres://host/db)",
        ));
    }

    if let Some(file_path) = database_url_file {
        let contents = fs::read_to_string(file_path).map_err(|e| {
            DqError::configuration(format!(
                "Failed to read database URL file {}: {}",
                file_path.display(),
                e
            ))
        })?;
        let url = contents.trim();
        if validate_database_url(url) {
            return Ok((url.to_string(), CredentialSource::File(file_path.to_path_buf())));
        }
        return Err(DqError::configuration(format!(
            "Invalid database URL format in file: {}",
            file_path.display()
        )));
    }

    Err(DqError::configuration(
        "Database connection information required. Set DATABASE_URL environment variable or use --database-url-file.",
    ))
}

/// Validate database URL format without exposing credentials
#[must_use]
pub fn validate_database_url(url: &str) -> bool {
    if url.trim().is_empty() {
        return false;
    }

    url::Url::parse(url).is_ok_and(|parsed| {
        matches!(
            parsed.scheme().to_lowercase().as_str(),
            "postgres" | "postgresql"
        ) && parsed.host_str().is_some_and(|h| !h.is_empty())
    })
}
