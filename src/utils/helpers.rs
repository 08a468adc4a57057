//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::path::{Path, PathBuf};

use crate::utils::errors::{Result, SolrUndertowError};

/// Absolute form of a path, without touching the filesystem.
///
/// Falls back to the path as given when the working directory is unknown.
pub fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Display form of [`absolute_path`]
pub fn display_absolute(path: &Path) -> String {
    absolute_path(path).display().to_string()
}

/// Split a `key=value` command line property
pub fn parse_property(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| SolrUndertowError::InvalidArgument(format!("expected KEY=VALUE, got '{raw}'")))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(SolrUndertowError::InvalidArgument(format!("empty property name in '{raw}'")));
    }
    Ok((key.to_string(), value.to_string()))
}
