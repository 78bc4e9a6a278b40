//! One gate run: connect, evaluate, render.
//!
//! Fatal problems surface as `DqError` before any artifact is written.
//! A failing rule is not an error; it only changes the exit code.

use chrono::{DateTime, Utc};
use dqgate_core::{
    DataSource, QualityAnalyzer, QualityConfig, QualitySummary, Result, TableRef, create_source,
    error::redact_database_url,
};
use dqgate_report::{ReportArtifacts, ReportRenderer};
use tracing::{error, info, warn};

use crate::{Cli, CredentialSource, get_database_url};

/// Exit code when every rule passed.
pub const EXIT_PASS: u8 = 0;
/// Exit code when at least one rule failed.
pub const EXIT_QUALITY_FAIL: u8 = 1;
/// Exit code when the run could not complete.
pub const EXIT_FATAL: u8 = 2;

/// Final status line printed on stdout.
pub const fn status_line(passed: bool) -> &'static str {
    if passed {
        "DQ OVERALL: PASS"
    } else {
        "DQ OVERALL: FAIL"
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    /// Aggregated rule results
    pub summary: QualitySummary,
    /// Files written by the renderer
    pub artifacts: ReportArtifacts,
}

impl CheckOutcome {
    /// Overall verdict.
    pub const fn passed(&self) -> bool {
        self.summary.overall_passed
    }

    /// Process exit code for this outcome.
    pub const fn exit_code(&self) -> u8 {
        if self.passed() {
            EXIT_PASS
        } else {
            EXIT_QUALITY_FAIL
        }
    }
}

/// Runs the gate as configured on the command line.
///
/// # Errors
/// Returns an error for missing credentials, connection failures, missing
/// tables or columns, query failures and unwritable output.
pub async fn run_check(cli: &Cli) -> Result<CheckOutcome> {
    let (database_url, credential_source) =
        get_database_url(cli.database_url.as_deref(), cli.database_url_file.as_deref())?;
    match &credential_source {
        CredentialSource::Argument => info!("Database URL loaded from argument or environment"),
        CredentialSource::File(path) => info!("Database URL loaded from file: {}", path.display()),
    }

    let table = cli.table_ref()?;
    let config = cli.quality_config();
    let renderer = ReportRenderer::new(&cli.outdir).with_json(cli.json);

    info!("Target: {}", redact_database_url(&database_url));
    info!("Table: {}", table);
    info!("Output: {}", renderer.output_dir().display());

    let source = create_source(&database_url).await.map_err(|e| {
        error!("Failed to create data source: {}", e);
        e
    })?;

    evaluate(source.as_ref(), &table, config, &renderer).await
}

/// Evaluates `table` on an existing source and renders the report.
///
/// # Errors
/// Returns any analyzer or renderer error; nothing is written when the
/// analyzer fails.
pub async fn evaluate(
    source: &dyn DataSource,
    table: &TableRef,
    config: QualityConfig,
    renderer: &ReportRenderer,
) -> Result<CheckOutcome> {
    evaluate_at(source, table, config, renderer, Utc::now()).await
}

/// Same as [`evaluate`] with a fixed evaluation instant.
///
/// # Errors
/// See [`evaluate`].
pub async fn evaluate_at(
    source: &dyn DataSource,
    table: &TableRef,
    config: QualityConfig,
    renderer: &ReportRenderer,
    now: DateTime<Utc>,
) -> Result<CheckOutcome> {
    let analyzer = QualityAnalyzer::new(config).with_output_dir(renderer.output_dir());
    let summary = analyzer.analyze_at(source, table, now).await.map_err(|e| {
        error!("Evaluation of {} failed: {}", table, e);
        e
    })?;

    for rule in summary.failed_rules() {
        warn!("Rule failed: {}", rule.title());
    }

    let artifacts = renderer.render(&summary).await?;
    info!(
        "Evaluation of {} completed: {}",
        table,
        if summary.overall_passed { "PASS" } else { "FAIL" }
    );

    Ok(CheckOutcome { summary, artifacts })
}
