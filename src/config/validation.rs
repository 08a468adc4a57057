//! Configuration validation module
//!
//! Structural checks run once at startup over the projected settings.
//! Every check runs regardless of earlier failures; the caller receives the
//! full list and decides whether to abort.

use std::path::{Path, PathBuf};

use rustix::fs::{access, Access};
use thiserror::Error;
use tracing::{error, info};

use super::ServerSettings;
use crate::utils::helpers::absolute_path;

/// A single failed startup check
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{name}: exactPaths AND/OR pathSuffixes is required in request limit")]
    EmptyRequestLimit { name: String },

    #[error("{label} dir does not exist: {}", .path.display())]
    DirMissing { label: &'static str, path: PathBuf },

    #[error("{label} dir must be writable by current user: {}", .path.display())]
    DirNotWritable { label: &'static str, path: PathBuf },

    #[error("{label} does not exist: {}", .path.display())]
    PathMissing { label: &'static str, path: PathBuf },

    #[error("{label} must be readable by current user: {}", .path.display())]
    PathNotReadable { label: &'static str, path: PathBuf },
}

/// Outcome of a validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<ValidationError>,
}

impl ValidationReport {
    /// True iff no check failed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    fn record(&mut self, err: ValidationError) {
        error!("{}", err);
        self.errors.push(err);
    }
}

/// Validate policies and the filesystem layout
pub fn validate_settings(settings: &ServerSettings) -> ValidationReport {
    info!("Validating server configuration");
    let mut report = ValidationReport::default();

    for policy in &settings.request_limiters {
        if let Err(err) = policy.validate() {
            report.record(err);
        }
    }

    exists_is_writable(&mut report, "solrHome", &settings.solr_home);
    exists_is_writable(&mut report, "solrLogs", &settings.solr_logs);
    exists_is_writable(&mut report, "tempDir", &settings.temp_dir);
    exists_is_readable(&mut report, "solrWarFile", &settings.solr_war_file);

    if let Some(lib_ext_dir) = &settings.lib_ext_dir {
        exists_is_readable(&mut report, "libExtDir", lib_ext_dir);
    }

    report
}

fn exists_is_writable(report: &mut ValidationReport, label: &'static str, dir: &Path) {
    let path = absolute_path(dir);
    if !dir.exists() {
        report.record(ValidationError::DirMissing { label, path: path.clone() });
    }
    if !is_writable_dir(dir) {
        report.record(ValidationError::DirNotWritable { label, path });
    }
}

fn exists_is_readable(report: &mut ValidationReport, label: &'static str, target: &Path) {
    let path = absolute_path(target);
    if !target.exists() {
        report.record(ValidationError::PathMissing { label, path: path.clone() });
    }
    if !is_readable(target) {
        report.record(ValidationError::PathNotReadable { label, path });
    }
}

/// Permission query for the current user, no files are created
fn is_writable_dir(dir: &Path) -> bool {
    dir.is_dir() && access(dir, Access::WRITE_OK).is_ok()
}

fn is_readable(target: &Path) -> bool {
    access(target, Access::READ_OK).is_ok()
}
