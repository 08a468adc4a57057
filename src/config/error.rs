//! Configuration errors
//!
//! These are raised eagerly while layers are read, merged, resolved or
//! projected into typed settings. Any of them aborts startup.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read configuration file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("{path}: malformed reference in value '{value}'")]
    MalformedReference { path: String, value: String },

    #[error("{path}: could not resolve substitution ${{{reference}}}")]
    UnresolvedReference { path: String, reference: String },

    #[error("{path}: ${{{reference}}} is a table or list and cannot be part of a string")]
    UnsupportedConcatenation { path: String, reference: String },

    #[error("cycle detected while resolving ${{{0}}}")]
    CyclicReference(String),

    #[error("no configuration setting found for key '{0}'")]
    MissingPath(String),

    #[error("{path} has type {found} rather than {expected}")]
    WrongType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{path} value {value} is out of range: {reason}")]
    OutOfRange {
        path: String,
        value: i64,
        reason: &'static str,
    },

    #[error("request limit '{name}' is listed in activeRequestLimits but requestLimits.{name} is not defined")]
    MissingRequestLimit { name: String },
}
