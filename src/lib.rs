//! SolrUndertow
//!
//! Startup configuration core for a Solr server process: layered resolution
//! of settings, write-back to legacy system properties, typed settings with
//! request limit policies, and aggregated validation of the filesystem layout.

#![allow(non_snake_case)]

pub mod config;
pub mod utils;

// Re-export commonly used types
pub use config::{load, LoadedConfig, ServerSettings, RequestLimitPolicy, ValidationReport};
pub use utils::errors::{SolrUndertowError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
