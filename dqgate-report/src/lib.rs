//! Report Renderer for dqgate.
//!
//! Turns a `QualitySummary` into artifacts in one output directory:
//! - `report.html`: one section per rule with a PASS/FAIL badge, then the
//!   overall banner
//! - `notnull.csv`: per-column null statistics
//! - `duplicates.csv`: duplicate key groups
//! - `summary.json`: the serialized summary (optional)
//!
//! The renderer makes no decisions; it reproduces the summary as is.
//!
//! # Security
//! Artifacts contain column names, counts, maxima and duplicate key values.
//! Connection details never reach the summary, so they cannot reach a file.

mod export;
mod html;
#[cfg(test)]
mod test_support;

pub use export::{NOTNULL_HEADER, duplicates_csv, notnull_csv, summary_json};
pub use html::render_html;

use dqgate_core::{DqError, QualitySummary, Result};
use std::path::{Path, PathBuf};

/// HTML report file name.
pub const REPORT_FILE: &str = "report.html";
/// Null statistics export file name.
pub const NOTNULL_FILE: &str = "notnull.csv";
/// Duplicate groups export file name.
pub const DUPLICATES_FILE: &str = "duplicates.csv";
/// JSON summary file name.
pub const SUMMARY_FILE: &str = "summary.json";

/// Paths written by one render, plus the verdict they describe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifacts {
    /// HTML report
    pub html: PathBuf,
    /// Null statistics CSV
    pub notnull_csv: PathBuf,
    /// Duplicate groups CSV
    pub duplicates_csv: PathBuf,
    /// JSON summary, when requested
    pub summary_json: Option<PathBuf>,
    /// Overall verdict of the rendered summary
    pub overall_passed: bool,
}

/// Writes report artifacts into a directory.
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    output_dir: PathBuf,
    write_json: bool,
}

impl ReportRenderer {
    /// Creates a renderer writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            write_json: false,
        }
    }

    /// Builder method to also write `summary.json`.
    pub fn with_json(mut self, write_json: bool) -> Self {
        self.write_json = write_json;
        self
    }

    /// Directory the artifacts are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Renders every artifact, creating the output directory if needed.
    ///
    /// All content is built before the first file is written, so a
    /// rendering failure leaves no partial report behind.
    ///
    /// # Errors
    /// Returns `DqError::Render` or `DqError::Serialization` if content cannot
    /// be produced and `DqError::Io` if a file cannot be written.
    pub async fn render(&self, summary: &QualitySummary) -> Result<ReportArtifacts> {
        let html = render_html(summary)?;
        let notnull = notnull_csv(summary)?;
        let duplicates = duplicates_csv(summary)?;
        let json = if self.write_json {
            Some(summary_json(summary)?)
        } else {
            None
        };

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| {
                DqError::io(
                    format!("Failed to create output directory {}", self.output_dir.display()),
                    e,
                )
            })?;

        let artifacts = ReportArtifacts {
            html: self.output_dir.join(REPORT_FILE),
            notnull_csv: self.output_dir.join(NOTNULL_FILE),
            duplicates_csv: self.output_dir.join(DUPLICATES_FILE),
            summary_json: json.as_ref().map(|_| self.output_dir.join(SUMMARY_FILE)),
            overall_passed: summary.overall_passed,
        };

        write_file(&artifacts.html, html.as_bytes()).await?;
        write_file(&artifacts.notnull_csv, &notnull).await?;
        write_file(&artifacts.duplicates_csv, &duplicates).await?;
        if let (Some(path), Some(json)) = (&artifacts.summary_json, &json) {
            write_file(path, json.as_bytes()).await?;
        }

        tracing::info!("Report written to {}", artifacts.html.display());
        Ok(artifacts)
    }
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| DqError::Io {
            context: format!("Failed to write to {}", path.display()),
            source: e,
        })?;
    tracing::debug!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}
