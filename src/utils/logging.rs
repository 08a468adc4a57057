//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the SolrUndertow launcher.

use std::path::Path;

use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{PublishedProperty, ServerSettings, ValidationReport};
use crate::utils::errors::{Result, SolrUndertowError};

const LOG_FILE_PREFIX: &str = "solr-undertow";

/// Keeps the background log writer alive; drop it at shutdown
pub struct LoggingGuard {
    _file_writer: Option<WorkerGuard>,
}

/// Where the rolling log file goes, if anywhere
pub enum FileOutput {
    Enabled(RollingFileAppender),
    /// The directory exists but the appender could not open its file
    Unavailable(String),
    Disabled,
}

/// Build the rolling appender for `dir`.
///
/// Never fails: an unusable directory degrades to stdout-only logging so the
/// validator still gets to report it.
pub fn file_output(dir: Option<&Path>) -> FileOutput {
    let Some(dir) = dir else {
        return FileOutput::Disabled;
    };
    match RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(dir)
    {
        Ok(appender) => FileOutput::Enabled(appender),
        Err(e) => FileOutput::Unavailable(e.to_string()),
    }
}

/// Initialize logging based on configuration.
///
/// `RUST_LOG` takes precedence over the configured level. A daily rolling
/// log file is written only when the configured log directory exists and
/// accepts the file.
pub fn init_logging(settings: &ServerSettings) -> Result<LoggingGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .map_err(|e| SolrUndertowError::Logging(e.to_string()))?;

    let log_dir = settings.logging_dir();
    let (file_layer, guard, unavailable) = match file_output(log_dir) {
        FileOutput::Enabled(appender) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(non_blocking)),
                Some(guard),
                None,
            )
        }
        FileOutput::Unavailable(reason) => (None, None, Some(reason)),
        FileOutput::Disabled => (None, None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stdout))
        .with(file_layer)
        .try_init()
        .map_err(|e| SolrUndertowError::Logging(e.to_string()))?;

    if let Some(reason) = unavailable {
        warn!(
            log_dir = ?log_dir,
            reason = %reason,
            "Log file unavailable, logging to stdout only"
        );
    }
    info!(
        level = %settings.log_level,
        log_dir = ?log_dir,
        "Logging initialized"
    );
    Ok(LoggingGuard { _file_writer: guard })
}

/// Log a startup phase transition
pub fn log_startup_phase(phase: &str, detail: Option<&str>) {
    info!(phase = phase, detail = detail, "Startup phase");
}

/// Log the properties written for legacy readers
pub fn log_published_properties(published: &[PublishedProperty]) {
    for property in published {
        info!(
            key = %property.key,
            value = %property.value,
            "System property published"
        );
    }
}

/// Log the outcome of the validation pass
pub fn log_validation_outcome(report: &ValidationReport) {
    if report.is_valid() {
        info!("Configuration validated successfully");
    } else {
        error!(
            error_count = report.errors().len(),
            "Configuration is not valid"
        );
    }
}
