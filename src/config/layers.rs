//! Configuration layers
//!
//! A layer is one ranked source of settings. The resolver folds layers from
//! the highest rank down, so the first layer defining a path wins.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use super::keys::{self, OVERRIDE_MAPPINGS};
use super::properties::ProcessInputs;
use super::value::{self, ConfigTable, ConfigValue};
use super::ConfigError;

const REFERENCE_DEFAULTS: &str = include_str!("../../resources/reference.toml");

/// Where a layer came from; declaration order is precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayerKind {
    Overrides,
    SystemProperties,
    Environment,
    File,
    Defaults,
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerKind::Overrides => write!(f, "legacy overrides"),
            LayerKind::SystemProperties => write!(f, "system properties"),
            LayerKind::Environment => write!(f, "environment"),
            LayerKind::File => write!(f, "configuration file"),
            LayerKind::Defaults => write!(f, "bundled defaults"),
        }
    }
}

/// A named, ranked set of settings
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigLayer {
    kind: LayerKind,
    name: String,
    table: ConfigTable,
}

impl ConfigLayer {
    pub fn new(kind: LayerKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            table: ConfigTable::new(),
        }
    }

    /// Build a layer from flat `dotted.key = value` pairs.
    ///
    /// Values are taken literally; references are never expanded in them.
    /// Keys with empty path segments cannot be addressed and are skipped.
    pub fn from_pairs<'a, I>(kind: LayerKind, name: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut layer = Self::new(kind, name);
        for (key, raw) in pairs {
            if !layer.set(key, ConfigValue::String(raw.clone())) {
                debug!(layer = %layer.kind, key = %key, "Skipping key that is not a valid path");
            }
        }
        layer
    }

    /// Parse a TOML document into a layer
    pub fn from_toml_str(kind: LayerKind, name: impl Into<String>, text: &str) -> Result<Self, ConfigError> {
        let name = name.into();
        let parsed: toml::Table = text.parse().map_err(|source| ConfigError::Parse {
            origin: name.clone(),
            source,
        })?;
        let table = value::table_from_toml("", parsed)?;
        Ok(Self { kind, name, table })
    }

    /// Read and parse the user configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(LayerKind::File, path.display().to_string(), &text)
    }

    /// Defaults compiled into the binary
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::from_toml_str(LayerKind::Defaults, "reference.toml", REFERENCE_DEFAULTS)
    }

    /// Raw system properties as a layer
    pub fn system_properties(properties: &BTreeMap<String, String>) -> Self {
        Self::from_pairs(LayerKind::SystemProperties, "system properties", properties)
    }

    /// Raw environment variables as a layer
    pub fn environment(environment: &BTreeMap<String, String>) -> Self {
        Self::from_pairs(LayerKind::Environment, "environment", environment)
    }

    /// Store a value at a dotted path; `false` if the path is not valid
    pub fn set(&mut self, path: &str, value: ConfigValue) -> bool {
        match value::split_path(path) {
            Some(segments) => {
                value::insert_path(&mut self.table, &segments, value);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, path: &str) -> Option<&ConfigValue> {
        value::lookup(&self.table, path)
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn into_table(self) -> ConfigTable {
        self.table
    }
}

/// Stage legacy external names under their canonical paths.
///
/// Each legacy name is looked up as a system property, then as an
/// environment variable. Non-empty hits are staged. The presence of the
/// legacy `zkRun` flag, whatever its value, stages `zkRun = true`.
pub fn collect_overrides(inputs: &ProcessInputs) -> ConfigLayer {
    let mut layer = ConfigLayer::new(LayerKind::Overrides, "legacy overrides");

    for mapping in OVERRIDE_MAPPINGS {
        if let Some(raw) = inputs.lookup(mapping.external).filter(|raw| !raw.is_empty()) {
            debug!(external = mapping.external, canonical = mapping.canonical, "Staging legacy override");
            layer.set(&mapping.canonical_path(), ConfigValue::String(raw.to_string()));
        }
    }

    if inputs.lookup(keys::SYS_PROP_ZK_RUN).is_some() {
        debug!("Legacy zkRun flag present, staging zkRun = true");
        layer.set(&keys::canonical_path(keys::ZK_RUN), ConfigValue::Boolean(true));
    }

    layer
}
