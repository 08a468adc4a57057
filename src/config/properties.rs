//! Process-wide system properties and the inputs captured from them
//!
//! System properties are a flat, process-wide string namespace shared with
//! the embedded server. They are seeded from `-D key=value` arguments and
//! written back once by the publisher after resolution.

use std::collections::BTreeMap;
use std::sync::{LazyLock, PoisonError, RwLock};

static SYSTEM_PROPERTIES: LazyLock<RwLock<BTreeMap<String, String>>> =
    LazyLock::new(|| RwLock::new(BTreeMap::new()));

/// Handle on the process-wide system property namespace
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProperties;

impl SystemProperties {
    /// Read a property
    pub fn get(key: &str) -> Option<String> {
        SYSTEM_PROPERTIES
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Set a property, returning the previous value
    pub fn set(key: &str, value: &str) -> Option<String> {
        SYSTEM_PROPERTIES
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string())
    }

    /// Remove a property, returning the previous value
    pub fn remove(key: &str) -> Option<String> {
        SYSTEM_PROPERTIES
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    /// Copy of every property currently set
    pub fn snapshot() -> BTreeMap<String, String> {
        SYSTEM_PROPERTIES
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Destination for published properties
pub trait PropertySink {
    fn set_property(&mut self, key: &str, value: &str);
}

impl PropertySink for SystemProperties {
    fn set_property(&mut self, key: &str, value: &str) {
        SystemProperties::set(key, value);
    }
}

impl PropertySink for BTreeMap<String, String> {
    fn set_property(&mut self, key: &str, value: &str) {
        self.insert(key.to_string(), value.to_string());
    }
}

/// Snapshot of the raw process sources consulted during resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessInputs {
    pub properties: BTreeMap<String, String>,
    pub environment: BTreeMap<String, String>,
}

impl ProcessInputs {
    /// Capture current system properties and environment variables.
    ///
    /// Environment entries that are not valid UTF-8 are skipped.
    pub fn capture() -> Self {
        let environment = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();

        Self {
            properties: SystemProperties::snapshot(),
            environment,
        }
    }

    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.environment.insert(key.to_string(), value.to_string());
        self
    }

    /// System property first, then environment variable
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.properties
            .get(key)
            .or_else(|| self.environment.get(key))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_lookup_prefers_properties() {
        let inputs = ProcessInputs::default()
            .with_env("jetty.port", "1111")
            .with_property("jetty.port", "2222")
            .with_env("zkHost", "zk:2181");

        assert_eq!(inputs.lookup("jetty.port"), Some("2222"));
        assert_eq!(inputs.lookup("zkHost"), Some("zk:2181"));
        assert_eq!(inputs.lookup("missing"), None);
    }

    #[test]
    #[serial]
    fn test_system_properties_roundtrip_into_capture() {
        SystemProperties::set("solr.undertow.test.capture", "yes");
        let inputs = ProcessInputs::capture();
        assert_eq!(inputs.properties.get("solr.undertow.test.capture").map(String::as_str), Some("yes"));
        assert_eq!(SystemProperties::remove("solr.undertow.test.capture").as_deref(), Some("yes"));
        assert_eq!(SystemProperties::get("solr.undertow.test.capture"), None);
    }
}
