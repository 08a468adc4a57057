//! Configuration value tree
//!
//! Every layer is parsed into the same tree shape so that layers can be
//! merged key by key. Strings read from configuration documents may carry
//! `${path}` references; those are kept as [`ConfigValue::Template`] until
//! the resolver replaces them.

use std::collections::BTreeMap;

use super::ConfigError;

/// A table of configuration values keyed by a single path segment
pub type ConfigTable = BTreeMap<String, ConfigValue>;

/// A single node of the configuration tree
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    List(Vec<ConfigValue>),
    Table(ConfigTable),
    /// A string that still contains references to other paths
    Template(Vec<Segment>),
}

/// Piece of a templated string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Reference { path: String, optional: bool },
}

impl ConfigValue {
    /// Human readable type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::String(_) => "string",
            ConfigValue::Integer(_) => "integer",
            ConfigValue::Float(_) => "float",
            ConfigValue::Boolean(_) => "boolean",
            ConfigValue::List(_) => "list",
            ConfigValue::Table(_) => "table",
            ConfigValue::Template(_) => "unresolved reference",
        }
    }

    /// Render a scalar as a string, `None` for lists, tables and templates
    pub fn scalar_string(&self) -> Option<String> {
        match self {
            ConfigValue::String(s) => Some(s.clone()),
            ConfigValue::Integer(i) => Some(i.to_string()),
            ConfigValue::Float(f) => Some(f.to_string()),
            ConfigValue::Boolean(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Descend into nested tables following `segments`
    pub fn get_path(&self, segments: &[&str]) -> Option<&ConfigValue> {
        let mut current = self;
        for segment in segments {
            match current {
                ConfigValue::Table(table) => current = table.get(*segment)?,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Convert into a JSON value for diagnostic rendering
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ConfigValue::String(s) => serde_json::Value::String(s.clone()),
            ConfigValue::Integer(i) => serde_json::Value::from(*i),
            ConfigValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(f.to_string())),
            ConfigValue::Boolean(b) => serde_json::Value::Bool(*b),
            ConfigValue::List(items) => {
                serde_json::Value::Array(items.iter().map(ConfigValue::to_json).collect())
            }
            ConfigValue::Table(table) => table_to_json(table),
            ConfigValue::Template(segments) => serde_json::Value::String(render_template(segments)),
        }
    }
}

/// Convert a table into a JSON object
pub fn table_to_json(table: &ConfigTable) -> serde_json::Value {
    serde_json::Value::Object(
        table
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect(),
    )
}

/// Split a dotted path into segments; `None` if any segment is empty
pub fn split_path(path: &str) -> Option<Vec<&str>> {
    let segments: Vec<&str> = path.split('.').map(str::trim).collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        None
    } else {
        Some(segments)
    }
}

/// Find the value stored at a dotted path
pub fn lookup<'a>(table: &'a ConfigTable, path: &str) -> Option<&'a ConfigValue> {
    let segments = split_path(path)?;
    let (first, rest) = segments.split_first()?;
    table.get(*first)?.get_path(rest)
}

/// Store `value` at `segments`, creating intermediate tables.
///
/// A table already present at the target is kept when the incoming value is
/// a scalar, so `a.b=1` and `a=2` from a flat source always yield `a.b`.
pub fn insert_path(table: &mut ConfigTable, segments: &[&str], value: ConfigValue) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };

    if rest.is_empty() {
        let keeps_table = matches!(table.get(*first), Some(ConfigValue::Table(_)))
            && !matches!(value, ConfigValue::Table(_));
        if !keeps_table {
            table.insert((*first).to_string(), value);
        }
        return;
    }

    let entry = table
        .entry((*first).to_string())
        .or_insert_with(|| ConfigValue::Table(ConfigTable::new()));
    if !matches!(entry, ConfigValue::Table(_)) {
        *entry = ConfigValue::Table(ConfigTable::new());
    }
    if let ConfigValue::Table(inner) = entry {
        insert_path(inner, rest, value);
    }
}

/// Fold `fallback` underneath `preferred`.
///
/// Keys missing from `preferred` are taken from `fallback`; when both sides
/// hold a table the tables are merged recursively, otherwise `preferred` wins.
pub fn merge_with_fallback(preferred: &mut ConfigTable, fallback: ConfigTable) {
    for (key, lower) in fallback {
        match preferred.get_mut(&key) {
            None => {
                preferred.insert(key, lower);
            }
            Some(ConfigValue::Table(upper)) => {
                if let ConfigValue::Table(lower) = lower {
                    merge_with_fallback(upper, lower);
                }
            }
            Some(_) => {}
        }
    }
}

/// Convert a parsed TOML table, turning `${...}` strings into templates
pub fn table_from_toml(prefix: &str, table: toml::Table) -> Result<ConfigTable, ConfigError> {
    table
        .into_iter()
        .map(|(key, value)| {
            let path = join_path(prefix, &key);
            value_from_toml(&path, value).map(|value| (key, value))
        })
        .collect()
}

fn value_from_toml(path: &str, value: toml::Value) -> Result<ConfigValue, ConfigError> {
    Ok(match value {
        toml::Value::String(s) => parse_template(path, s)?,
        toml::Value::Integer(i) => ConfigValue::Integer(i),
        toml::Value::Float(f) => ConfigValue::Float(f),
        toml::Value::Boolean(b) => ConfigValue::Boolean(b),
        toml::Value::Datetime(d) => ConfigValue::String(d.to_string()),
        toml::Value::Array(items) => ConfigValue::List(
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| value_from_toml(&format!("{path}[{index}]"), item))
                .collect::<Result<_, _>>()?,
        ),
        toml::Value::Table(table) => ConfigValue::Table(table_from_toml(path, table)?),
    })
}

/// Parse `${path}` and `${?path}` references out of a string
pub fn parse_template(path: &str, raw: String) -> Result<ConfigValue, ConfigError> {
    if !raw.contains("${") {
        return Ok(ConfigValue::String(raw));
    }

    let malformed = || ConfigError::MalformedReference {
        path: path.to_string(),
        value: raw.clone(),
    };

    let mut segments = Vec::new();
    let mut rest = raw.as_str();
    while let Some(start) = rest.find("${") {
        if start > 0 {
            segments.push(Segment::Literal(rest[..start].to_string()));
        }
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or_else(malformed)?;
        let inner = after[..end].trim();
        let (optional, target) = match inner.strip_prefix('?') {
            Some(target) => (true, target.trim()),
            None => (false, inner),
        };
        if split_path(target).is_none() {
            return Err(malformed());
        }
        segments.push(Segment::Reference {
            path: target.to_string(),
            optional,
        });
        rest = &after[end + 1..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest.to_string()));
    }

    Ok(ConfigValue::Template(segments))
}

fn render_template(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Literal(text) => text.clone(),
            Segment::Reference { path, optional: false } => format!("${{{path}}}"),
            Segment::Reference { path, optional: true } => format!("${{?{path}}}"),
        })
        .collect()
}

/// Join a prefix and a key into a dotted path
pub fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
