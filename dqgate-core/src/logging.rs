//! Logging bootstrap for the dqgate binary.
//!
//! Everything goes to stderr; stdout is reserved for the report path and the
//! `DQ OVERALL` status line. The dqgate crates log at the level chosen by
//! `-v`/`-q`; dependencies such as sqlx stay at `warn` unless `-vv` asks
//! for everything. `RUST_LOG` replaces the whole filter when set.

use crate::Result;
use crate::error::DqError;
use tracing::Level;
use tracing_subscriber::EnvFilter;

const DQGATE_TARGETS: [&str; 3] = ["dqgate", "dqgate_core", "dqgate_report"];

/// Level for the verbosity flags: `-q` ERROR, none INFO, `-v` DEBUG,
/// `-vv` and up TRACE.
pub fn level_for(verbose: u8, quiet: bool) -> Level {
    match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    }
}

/// Filter directives used when `RUST_LOG` is unset.
pub fn default_directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    if level == "trace" {
        return level;
    }
    let dependencies = if level == "error" { "error" } else { "warn" };
    std::iter::once(dependencies.to_string())
        .chain(
            DQGATE_TARGETS
                .iter()
                .map(|target| format!("{}={}", target, level)),
        )
        .collect::<Vec<_>>()
        .join(",")
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

/// Installs the global stderr subscriber.
///
/// # Errors
/// Returns a configuration error if a subscriber is already installed.
///
/// # Example
/// ```rust,no_run
/// use dqgate_core::logging::init_logging;
///
/// // -v
/// init_logging(1, false)?;
/// # Ok::<(), dqgate_core::DqError>(())
/// ```
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(level_for(verbose, quiet)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| DqError::configuration(format!("Failed to initialize logging: {}", e)))
}
