//! Server settings
//!
//! Typed projection of the `solr.undertow` namespace of a resolved
//! configuration. Building the settings also builds every active request
//! limit policy, so a missing policy block fails here rather than during
//! validation.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::keys;
use super::request_limits::RequestLimitPolicy;
use super::resolver::ResolvedConfig;
use super::validation::{self, ValidationReport};
use super::ConfigError;

/// Settings consumed by the server at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSettings {
    pub http_cluster_port: u16,
    pub http_host: String,
    pub http_io_threads: u32,
    pub http_worker_threads: u32,
    pub active_request_limits: Vec<String>,
    /// One policy per distinct active name, in first-listed order
    pub request_limiters: Vec<RequestLimitPolicy>,
    pub zk_run: bool,
    pub zk_host: String,
    pub solr_home: PathBuf,
    pub solr_logs: PathBuf,
    pub temp_dir: PathBuf,
    pub solr_version: String,
    pub solr_war_file: PathBuf,
    pub lib_ext_dir: Option<PathBuf>,
    pub solr_context_path: String,
    pub log_level: String,
}

impl ServerSettings {
    /// Project typed settings out of a resolved configuration
    pub fn from_config(resolved: &ResolvedConfig) -> Result<Self, ConfigError> {
        let cfg = resolved.get_config(keys::CONFIG_PREFIX)?;

        let active_request_limits = cfg.get_string_list(keys::ACTIVE_REQUEST_LIMITS)?;
        let request_limiters = build_request_limiters(&cfg, &active_request_limits)?;

        let lib_ext_dir = cfg.get_string(keys::LIB_EXT_DIR)?;
        let lib_ext_dir = lib_ext_dir.trim();

        Ok(Self {
            http_cluster_port: port(&cfg, keys::HTTP_CLUSTER_PORT)?,
            http_host: cfg.get_string(keys::HTTP_HOST)?,
            http_io_threads: thread_count(cfg.get_int(keys::HTTP_IO_THREADS)?),
            http_worker_threads: thread_count(cfg.get_int(keys::HTTP_WORKER_THREADS)?),
            active_request_limits,
            request_limiters,
            zk_run: cfg.get_bool(keys::ZK_RUN)?,
            zk_host: cfg.get_string(keys::ZK_HOST)?,
            solr_home: PathBuf::from(cfg.get_string(keys::SOLR_HOME)?),
            solr_logs: PathBuf::from(cfg.get_string(keys::SOLR_LOGS)?),
            temp_dir: PathBuf::from(cfg.get_string(keys::TEMP_DIR)?),
            solr_version: cfg.get_string(keys::SOLR_VERSION)?,
            solr_war_file: PathBuf::from(cfg.get_string(keys::SOLR_WAR_FILE)?),
            lib_ext_dir: (!lib_ext_dir.is_empty()).then(|| PathBuf::from(lib_ext_dir)),
            solr_context_path: context_path(&cfg.get_string(keys::SOLR_CONTEXT_PATH)?),
            log_level: cfg.get_string(keys::LOG_LEVEL)?,
        })
    }

    /// Run the aggregated startup checks
    pub fn validate(&self) -> ValidationReport {
        validation::validate_settings(self)
    }

    pub fn has_lib_ext_dir(&self) -> bool {
        self.lib_ext_dir.is_some()
    }

    /// Whether the configured log directory can receive log files
    pub fn has_logging_dir(&self) -> bool {
        self.solr_logs.is_dir()
    }

    pub fn logging_dir(&self) -> Option<&Path> {
        self.has_logging_dir().then_some(self.solr_logs.as_path())
    }

    pub fn request_limiter(&self, name: &str) -> Option<&RequestLimitPolicy> {
        self.request_limiters.iter().find(|policy| policy.name == name)
    }
}

fn build_request_limiters(cfg: &ResolvedConfig, names: &[String]) -> Result<Vec<RequestLimitPolicy>, ConfigError> {
    let mut policies: Vec<RequestLimitPolicy> = Vec::with_capacity(names.len());
    if names.is_empty() {
        return Ok(policies);
    }

    let blocks = if cfg.has_path(keys::REQUEST_LIMITS) {
        Some(cfg.get_config(keys::REQUEST_LIMITS)?)
    } else {
        None
    };

    for name in names {
        if policies.iter().any(|policy| &policy.name == name) {
            continue;
        }
        let block = match &blocks {
            Some(blocks) if blocks.has_path(name) => blocks.get_config(name)?,
            _ => return Err(ConfigError::MissingRequestLimit { name: name.clone() }),
        };
        policies.push(RequestLimitPolicy::from_config(name, &block)?);
    }

    Ok(policies)
}

fn port(cfg: &ResolvedConfig, key: &str) -> Result<u16, ConfigError> {
    let value = cfg.get_int(key)?;
    u16::try_from(value).map_err(|_| ConfigError::OutOfRange {
        path: keys::canonical_path(key),
        value,
        reason: "a port must be between 0 and 65535",
    })
}

/// Negative thread counts mean "let the server decide", i.e. 0
pub fn thread_count(raw: i64) -> u32 {
    u32::try_from(raw.max(0)).unwrap_or(u32::MAX)
}

/// Trimmed context path, `/` when blank
pub fn context_path(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
