//! One-shot publication of settled values to the legacy property namespace
//!
//! Anything started after this point that reads `jetty.port`, `solr.solr.home`
//! and friends observes the values this process actually resolved, whichever
//! layer supplied them.

use super::keys::{self, OVERRIDE_MAPPINGS};
use super::properties::PropertySink;
use super::resolver::ResolvedConfig;
use super::ConfigError;

/// A single property write performed by [`publish`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedProperty {
    pub key: String,
    pub value: String,
}

impl PublishedProperty {
    fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// Compute every write first, then apply them, so a failing lookup leaves
/// the sink untouched.
pub fn publish<S>(resolved: &ResolvedConfig, sink: &mut S) -> Result<Vec<PublishedProperty>, ConfigError>
where
    S: PropertySink + ?Sized,
{
    let mut writes = Vec::with_capacity(OVERRIDE_MAPPINGS.len() + 2);

    for mapping in OVERRIDE_MAPPINGS {
        let value = resolved.get_string(&mapping.canonical_path())?;
        let value = value.trim();
        if !value.is_empty() {
            writes.push(PublishedProperty::new(mapping.external, value));
        }
    }

    if resolved.get_bool(&keys::canonical_path(keys::ZK_RUN))? {
        writes.push(PublishedProperty::new(keys::SYS_PROP_ZK_RUN, "true"));
    }

    writes.push(PublishedProperty::new(keys::LOGGING_PROVIDER_PROPERTY, keys::LOGGING_PROVIDER));

    for write in &writes {
        sink.set_property(&write.key, &write.value);
    }

    Ok(writes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::layers::{ConfigLayer, LayerKind};
    use crate::config::resolver::LayeredResolver;
    use std::collections::BTreeMap;

    fn resolved(file: &str) -> ResolvedConfig {
        LayeredResolver::new()
            .with_layer(ConfigLayer::from_toml_str(LayerKind::File, "test.toml", file).unwrap())
            .with_layer(ConfigLayer::defaults().unwrap())
            .resolve()
            .unwrap()
    }

    #[test]
    fn test_publishes_canonical_values() {
        let config = resolved("[solr.undertow]\nhttpClusterPort = 8983\nsolrHome = \"  /srv/solr  \"\nzkHost = \"   \"");
        let mut sink = BTreeMap::new();

        let writes = publish(&config, &mut sink).unwrap();

        assert_eq!(sink.get("jetty.port").map(String::as_str), Some("8983"));
        assert_eq!(sink.get("solr.solr.home").map(String::as_str), Some("/srv/solr"));
        assert_eq!(sink.get("hostContext").map(String::as_str), Some("/"));
        assert!(!sink.contains_key("zkHost"));
        assert!(!sink.contains_key("zkRun"));
        assert_eq!(sink.get("org.jboss.logging.provider").map(String::as_str), Some("slf4j"));
        assert_eq!(writes.len(), sink.len());
    }

    #[test]
    fn test_zk_run_marker() {
        let config = resolved("[solr.undertow]\nzkRun = true");
        let mut sink = BTreeMap::new();
        publish(&config, &mut sink).unwrap();
        assert_eq!(sink.get("zkRun").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_failed_lookup_writes_nothing() {
        let config = LayeredResolver::new()
            .with_layer(ConfigLayer::from_toml_str(LayerKind::File, "test.toml", "[solr.undertow]\nhttpClusterPort = 1").unwrap())
            .resolve()
            .unwrap();
        let mut sink = BTreeMap::new();

        assert!(publish(&config, &mut sink).is_err());
        assert!(sink.is_empty());
    }
}
