//! Configuration management module
//!
//! Startup configuration is resolved once, in this order:
//!
//! ```text
//! legacy names (jetty.port, solr.solr.home, ...)  → layers::collect_overrides
//! overrides > system properties > environment > file > defaults
//!                                                 → resolver (merge + ${refs})
//! ResolvedConfig                                  → publisher (one-shot write-back)
//! ResolvedConfig                                  → ServerSettings + RequestLimitPolicy
//! ServerSettings                                  → validation (aggregated)
//! ServerSettings + ResolvedConfig                 → report
//! ```

pub mod error;
pub mod keys;
pub mod layers;
pub mod properties;
pub mod publisher;
pub mod report;
pub mod request_limits;
pub mod resolver;
pub mod settings;
pub mod validation;
pub mod value;

use std::path::{Path, PathBuf};

pub use error::ConfigError;
pub use layers::{ConfigLayer, LayerKind};
pub use properties::{ProcessInputs, PropertySink, SystemProperties};
pub use publisher::{publish, PublishedProperty};
pub use request_limits::RequestLimitPolicy;
pub use resolver::{LayeredResolver, ResolvedConfig};
pub use settings::ServerSettings;
pub use validation::{ValidationError, ValidationReport};

/// Everything produced by a successful load
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_file: PathBuf,
    pub resolved: ResolvedConfig,
    pub published: Vec<PublishedProperty>,
    pub settings: ServerSettings,
}

impl LoadedConfig {
    pub fn validate(&self) -> ValidationReport {
        self.settings.validate()
    }

    pub fn report(&self) {
        report::report(&self.config_file, &self.settings, &self.resolved);
    }
}

/// Resolve, publish to the process system properties, then project.
///
/// Must complete before anything that reads the legacy properties starts.
pub fn load(config_file: &Path) -> Result<LoadedConfig, ConfigError> {
    load_with(config_file, &ProcessInputs::capture(), &mut SystemProperties)
}

/// [`load`] with explicit inputs and property sink
pub fn load_with<S>(config_file: &Path, inputs: &ProcessInputs, sink: &mut S) -> Result<LoadedConfig, ConfigError>
where
    S: PropertySink + ?Sized,
{
    let resolved = resolver::resolve(config_file, inputs)?;
    let published = publish(&resolved, sink)?;
    let settings = ServerSettings::from_config(&resolved)?;

    Ok(LoadedConfig {
        config_file: config_file.to_path_buf(),
        resolved,
        published,
        settings,
    })
}
