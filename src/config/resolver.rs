//! Layered resolution
//!
//! Layers are merged highest precedence first with fallback to the lower
//! ones, then every `${path}` reference in the merged tree is replaced by
//! the value it points at. The result is an immutable [`ResolvedConfig`].

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use super::layers::{self, ConfigLayer};
use super::properties::ProcessInputs;
use super::value::{self, ConfigTable, ConfigValue, Segment};
use super::ConfigError;

/// Collects layers and merges them in precedence order
#[derive(Debug, Default)]
pub struct LayeredResolver {
    layers: Vec<ConfigLayer>,
}

impl LayeredResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer; its rank comes from its kind, not from call order
    pub fn with_layer(mut self, layer: ConfigLayer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Standard layer stack for a process start
    pub fn for_process(config_file: &Path, inputs: &ProcessInputs) -> Result<Self, ConfigError> {
        Ok(Self::new()
            .with_layer(layers::collect_overrides(inputs))
            .with_layer(ConfigLayer::system_properties(&inputs.properties))
            .with_layer(ConfigLayer::environment(&inputs.environment))
            .with_layer(ConfigLayer::from_file(config_file)?)
            .with_layer(ConfigLayer::defaults()?))
    }

    /// Merge all layers and resolve references
    pub fn resolve(mut self) -> Result<ResolvedConfig, ConfigError> {
        self.layers.sort_by_key(ConfigLayer::kind);

        let mut merged = ConfigTable::new();
        for layer in self.layers {
            debug!(layer = %layer.kind(), name = layer.name(), "Merging configuration layer");
            value::merge_with_fallback(&mut merged, layer.into_table());
        }

        let root = ReferenceResolver::new(&merged).resolve_table("", &merged)?;
        Ok(ResolvedConfig {
            prefix: String::new(),
            root,
        })
    }
}

/// Resolve the configuration for this process from a file and captured inputs
pub fn resolve(config_file: &Path, inputs: &ProcessInputs) -> Result<ResolvedConfig, ConfigError> {
    LayeredResolver::for_process(config_file, inputs)?.resolve()
}

struct ReferenceResolver<'a> {
    root: &'a ConfigTable,
    in_progress: Vec<String>,
    cache: HashMap<String, Option<ConfigValue>>,
}

impl<'a> ReferenceResolver<'a> {
    fn new(root: &'a ConfigTable) -> Self {
        Self {
            root,
            in_progress: Vec::new(),
            cache: HashMap::new(),
        }
    }

    fn resolve_table(&mut self, prefix: &str, table: &'a ConfigTable) -> Result<ConfigTable, ConfigError> {
        let mut resolved = ConfigTable::new();
        for (key, raw) in table {
            let path = value::join_path(prefix, key);
            if let Some(value) = self.resolve_value(&path, raw)? {
                resolved.insert(key.clone(), value);
            }
        }
        Ok(resolved)
    }

    /// `None` when the value was a lone optional reference to nothing
    fn resolve_value(&mut self, path: &str, raw: &'a ConfigValue) -> Result<Option<ConfigValue>, ConfigError> {
        match raw {
            ConfigValue::Table(table) => Ok(Some(ConfigValue::Table(self.resolve_table(path, table)?))),
            ConfigValue::List(items) => {
                let mut resolved = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    if let Some(value) = self.resolve_value(&format!("{path}[{index}]"), item)? {
                        resolved.push(value);
                    }
                }
                Ok(Some(ConfigValue::List(resolved)))
            }
            ConfigValue::Template(segments) => self.resolve_template(path, segments),
            scalar => Ok(Some(scalar.clone())),
        }
    }

    fn resolve_template(&mut self, path: &str, segments: &[Segment]) -> Result<Option<ConfigValue>, ConfigError> {
        if let [Segment::Reference { path: target, optional }] = segments {
            return match self.lookup(target)? {
                Some(value) => Ok(Some(value)),
                None if *optional => Ok(None),
                None => Err(ConfigError::UnresolvedReference {
                    path: path.to_string(),
                    reference: target.clone(),
                }),
            };
        }

        let mut text = String::new();
        for segment in segments {
            match segment {
                Segment::Literal(literal) => text.push_str(literal),
                Segment::Reference { path: target, optional } => match self.lookup(target)? {
                    Some(value) => {
                        let piece = value.scalar_string().ok_or_else(|| ConfigError::UnsupportedConcatenation {
                            path: path.to_string(),
                            reference: target.clone(),
                        })?;
                        text.push_str(&piece);
                    }
                    None if *optional => {}
                    None => {
                        return Err(ConfigError::UnresolvedReference {
                            path: path.to_string(),
                            reference: target.clone(),
                        })
                    }
                },
            }
        }
        Ok(Some(ConfigValue::String(text)))
    }

    /// Fully resolved value at `target`, memoized
    fn lookup(&mut self, target: &str) -> Result<Option<ConfigValue>, ConfigError> {
        if let Some(hit) = self.cache.get(target) {
            return Ok(hit.clone());
        }
        if self.in_progress.iter().any(|p| p == target) {
            return Err(ConfigError::CyclicReference(target.to_string()));
        }

        self.in_progress.push(target.to_string());
        let result = self.lookup_uncached(target);
        self.in_progress.pop();

        let value = result?;
        self.cache.insert(target.to_string(), value.clone());
        Ok(value)
    }

    fn lookup_uncached(&mut self, target: &str) -> Result<Option<ConfigValue>, ConfigError> {
        let Some(segments) = value::split_path(target) else {
            return Ok(None);
        };

        let mut table: &'a ConfigTable = self.root;
        for (index, segment) in segments.iter().enumerate() {
            let Some(raw) = table.get(*segment) else {
                return Ok(None);
            };
            let here = segments[..=index].join(".");
            if index + 1 == segments.len() {
                return self.resolve_value(&here, raw);
            }
            match raw {
                ConfigValue::Table(inner) => table = inner,
                ConfigValue::Template(_) => {
                    // the intermediate node is itself a reference; descend into what it resolves to
                    let resolved = self.lookup(&here)?;
                    return Ok(resolved.and_then(|value| value.get_path(&segments[index + 1..]).cloned()));
                }
                _ => return Ok(None),
            }
        }
        Ok(None)
    }
}

/// Immutable, fully resolved configuration tree with typed accessors.
///
/// Paths passed to accessors are relative to this tree; error messages
/// always carry the full path from the root.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    prefix: String,
    root: ConfigTable,
}

impl ResolvedConfig {
    pub fn has_path(&self, path: &str) -> bool {
        value::lookup(&self.root, path).is_some()
    }

    pub fn get_value(&self, path: &str) -> Result<&ConfigValue, ConfigError> {
        value::lookup(&self.root, path).ok_or_else(|| ConfigError::MissingPath(self.full_path(path)))
    }

    pub fn get_string(&self, path: &str) -> Result<String, ConfigError> {
        let value = self.get_value(path)?;
        value
            .scalar_string()
            .ok_or_else(|| self.wrong_type(path, "string", value))
    }

    pub fn get_int(&self, path: &str) -> Result<i64, ConfigError> {
        let value = self.get_value(path)?;
        match value {
            ConfigValue::Integer(i) => Ok(*i),
            ConfigValue::Float(f) if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 => {
                Ok(*f as i64)
            }
            ConfigValue::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| self.wrong_type(path, "integer", value)),
            other => Err(self.wrong_type(path, "integer", other)),
        }
    }

    pub fn get_bool(&self, path: &str) -> Result<bool, ConfigError> {
        let value = self.get_value(path)?;
        match value {
            ConfigValue::Boolean(b) => Ok(*b),
            ConfigValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" => Ok(true),
                "false" | "no" | "off" => Ok(false),
                _ => Err(self.wrong_type(path, "boolean", value)),
            },
            other => Err(self.wrong_type(path, "boolean", other)),
        }
    }

    pub fn get_string_list(&self, path: &str) -> Result<Vec<String>, ConfigError> {
        let value = self.get_value(path)?;
        match value {
            ConfigValue::List(items) => items
                .iter()
                .map(|item| item.scalar_string().ok_or_else(|| self.wrong_type(path, "list of strings", value)))
                .collect(),
            other => Err(self.wrong_type(path, "list", other)),
        }
    }

    /// Sub-tree rooted at `path`
    pub fn get_config(&self, path: &str) -> Result<ResolvedConfig, ConfigError> {
        match self.get_value(path)? {
            ConfigValue::Table(table) => Ok(ResolvedConfig {
                prefix: self.full_path(path),
                root: table.clone(),
            }),
            other => Err(self.wrong_type(path, "table", other)),
        }
    }

    /// Full unredacted dump of the tree, for diagnostics
    pub fn render(&self) -> String {
        let json = value::table_to_json(&self.root);
        serde_json::to_string_pretty(&json).unwrap_or_else(|_| format!("{:?}", self.root))
    }

    fn full_path(&self, path: &str) -> String {
        value::join_path(&self.prefix, path)
    }

    fn wrong_type(&self, path: &str, expected: &'static str, found: &ConfigValue) -> ConfigError {
        ConfigError::WrongType {
            path: self.full_path(path),
            expected,
            found: found.type_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::layers::LayerKind;
    use assert_matches::assert_matches;

    fn file_layer(text: &str) -> ConfigLayer {
        ConfigLayer::from_toml_str(LayerKind::File, "test.toml", text).unwrap()
    }

    fn resolve_file(text: &str) -> Result<ResolvedConfig, ConfigError> {
        LayeredResolver::new().with_layer(file_layer(text)).resolve()
    }

    #[test]
    fn test_precedence_follows_layer_kind() {
        let mut env = ConfigLayer::new(LayerKind::Environment, "env");
        env.set("solr.undertow.httpHost", ConfigValue::String("from-env".into()));
        let mut overrides = ConfigLayer::new(LayerKind::Overrides, "overrides");
        overrides.set("solr.undertow.zkHost", ConfigValue::String("from-overrides".into()));

        let resolved = LayeredResolver::new()
            .with_layer(file_layer(
                "[solr.undertow]\nhttpHost = \"from-file\"\nzkHost = \"from-file\"\nsolrVersion = \"5\"",
            ))
            .with_layer(env)
            .with_layer(overrides)
            .resolve()
            .unwrap();

        assert_eq!(resolved.get_string("solr.undertow.httpHost").unwrap(), "from-env");
        assert_eq!(resolved.get_string("solr.undertow.zkHost").unwrap(), "from-overrides");
        assert_eq!(resolved.get_string("solr.undertow.solrVersion").unwrap(), "5");
    }

    #[test]
    fn test_references_see_merged_values() {
        let mut env = ConfigLayer::new(LayerKind::Environment, "env");
        env.set("app.version", ConfigValue::String("9.1".into()));

        let resolved = LayeredResolver::new()
            .with_layer(file_layer("[app]\nversion = \"1.0\"\nwar = \"solr-${app.version}.war\"\nalias = \"${app.war}\""))
            .with_layer(env)
            .resolve()
            .unwrap();

        assert_eq!(resolved.get_string("app.war").unwrap(), "solr-9.1.war");
        assert_eq!(resolved.get_string("app.alias").unwrap(), "solr-9.1.war");
    }

    #[test]
    fn test_whole_value_reference_keeps_type() {
        let resolved = resolve_file("[a]\nport = 8983\nlist = [\"x\", \"y\"]\n[b]\nport = \"${a.port}\"\nlist = \"${a.list}\"").unwrap();
        assert_eq!(resolved.get_value("b.port").unwrap(), &ConfigValue::Integer(8983));
        assert_eq!(resolved.get_string_list("b.list").unwrap(), vec!["x", "y"]);
    }

    #[test]
    fn test_optional_reference() {
        let resolved = resolve_file("[a]\ngone = \"${?nowhere}\"\nsuffix = \"x${?nowhere}y\"").unwrap();
        assert!(!resolved.has_path("a.gone"));
        assert_eq!(resolved.get_string("a.suffix").unwrap(), "xy");
    }

    #[test]
    fn test_unresolved_reference_fails() {
        let err = resolve_file("[a]\nb = \"${missing.path}\"").unwrap_err();
        assert_matches!(err, ConfigError::UnresolvedReference { ref path, ref reference } if path == "a.b" && reference == "missing.path");
    }

    #[test]
    fn test_reference_cycle_fails() {
        let err = resolve_file("[a]\nb = \"${a.c}\"\nc = \"${a.b}\"").unwrap_err();
        assert_matches!(err, ConfigError::CyclicReference(_));
    }

    #[test]
    fn test_table_concatenation_fails() {
        let err = resolve_file("[a]\nb = \"x-${c}\"\n[c]\nd = 1").unwrap_err();
        assert_matches!(err, ConfigError::UnsupportedConcatenation { .. });
    }

    #[test]
    fn test_reference_through_referenced_table() {
        let resolved = resolve_file("[base]\nport = 1\n[alias]\ntarget = \"${base}\"\n[use]\nport = \"${alias.target.port}\"").unwrap();
        assert_eq!(resolved.get_int("use.port").unwrap(), 1);
    }

    #[test]
    fn test_typed_accessors_coerce_strings() {
        let mut props = ConfigLayer::new(LayerKind::SystemProperties, "props");
        props.set("s.port", ConfigValue::String(" 8983 ".into()));
        props.set("s.flag", ConfigValue::String("yes".into()));
        let resolved = LayeredResolver::new().with_layer(props).resolve().unwrap();

        assert_eq!(resolved.get_int("s.port").unwrap(), 8983);
        assert!(resolved.get_bool("s.flag").unwrap());
        assert_matches!(resolved.get_string_list("s.port"), Err(ConfigError::WrongType { .. }));
    }

    #[test]
    fn test_missing_path_names_full_path() {
        let resolved = resolve_file("[solr.undertow.requestLimits.perCore]\nexactPaths = []").unwrap();
        let sub = resolved.get_config("solr.undertow.requestLimits.perCore").unwrap();
        assert_matches!(
            sub.get_int("concurrentRequestLimit"),
            Err(ConfigError::MissingPath(ref p)) if p == "solr.undertow.requestLimits.perCore.concurrentRequestLimit"
        );
    }

    #[test]
    fn test_render_contains_values() {
        let resolved = resolve_file("[a]\nb = \"hello\"").unwrap();
        let dump = resolved.render();
        assert!(dump.contains("\"b\": \"hello\""));
    }
}
