//! Data quality gate.
//!
//! This binary evaluates one table, writes the report artifacts and exits
//! with a code a calling pipeline can gate on.
//!
//! # Guarantees
//! - Read-only database sessions
//! - No credentials stored or logged
//! - The last stdout line is `DQ OVERALL: PASS` or `DQ OVERALL: FAIL`

use clap::Parser;
use dqgate::{Cli, EXIT_FATAL, run_check, status_line};
use dqgate_core::init_logging;
use std::process::ExitCode;
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.global.verbose, cli.global.quiet) {
        eprintln!("DQ ERROR: {}", e);
        return ExitCode::from(EXIT_FATAL);
    }

    match run_check(&cli).await {
        Ok(outcome) => {
            println!("Report: {}", outcome.artifacts.html.display());
            println!("{}", status_line(outcome.passed()));
            ExitCode::from(outcome.exit_code())
        }
        Err(e) => {
            error!("Run aborted: {}", e);
            eprintln!("DQ ERROR: {}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}
