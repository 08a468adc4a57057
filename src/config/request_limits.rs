//! Named request limit policies
//!
//! Each active limiter name maps to a block under
//! `solr.undertow.requestLimits.<name>` describing which request paths it
//! covers and how many requests may run or wait at once.

use std::collections::BTreeSet;

use serde::Serialize;

use super::resolver::ResolvedConfig;
use super::validation::ValidationError;
use super::ConfigError;

/// Sentinel for "no ceiling enforced"
pub const UNLIMITED: i64 = -1;

const EXACT_PATHS: &str = "exactPaths";
const PATH_SUFFIXES: &str = "pathSuffixes";
const CONCURRENT_REQUEST_LIMIT: &str = "concurrentRequestLimit";
const MAX_QUEUED_REQUEST_LIMIT: &str = "maxQueuedRequestLimit";

/// Limiting rules for one group of routes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestLimitPolicy {
    pub name: String,
    pub exact_paths: BTreeSet<String>,
    pub path_suffixes: BTreeSet<String>,
    /// [`UNLIMITED`] or a hard ceiling, where 0 rejects everything
    pub concurrent_request_limit: i64,
    /// [`UNLIMITED`] or a hard ceiling, where 0 queues nothing
    pub max_queued_request_limit: i64,
}

impl RequestLimitPolicy {
    /// Build a policy from its block.
    ///
    /// Both path sets may be absent; both ceilings are required.
    pub fn from_config(name: &str, block: &ResolvedConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            name: name.to_string(),
            exact_paths: optional_set(block, EXACT_PATHS)?,
            path_suffixes: optional_set(block, PATH_SUFFIXES)?,
            concurrent_request_limit: clamp_ceiling(block.get_int(CONCURRENT_REQUEST_LIMIT)?),
            max_queued_request_limit: clamp_ceiling(block.get_int(MAX_QUEUED_REQUEST_LIMIT)?),
        })
    }

    /// A policy must match at least one path
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.exact_paths.is_empty() && self.path_suffixes.is_empty() {
            return Err(ValidationError::EmptyRequestLimit {
                name: self.name.clone(),
            });
        }
        Ok(())
    }

    pub fn is_concurrency_unlimited(&self) -> bool {
        self.concurrent_request_limit == UNLIMITED
    }

    pub fn is_queue_unlimited(&self) -> bool {
        self.max_queued_request_limit == UNLIMITED
    }

    /// Ordered label/value pairs for the startup report
    pub fn report_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            (EXACT_PATHS, join(&self.exact_paths)),
            (PATH_SUFFIXES, join(&self.path_suffixes)),
            (CONCURRENT_REQUEST_LIMIT, describe_ceiling(self.concurrent_request_limit)),
            (MAX_QUEUED_REQUEST_LIMIT, describe_ceiling(self.max_queued_request_limit)),
        ]
    }
}

/// Any negative ceiling means unlimited
pub fn clamp_ceiling(raw: i64) -> i64 {
    raw.max(UNLIMITED)
}

fn describe_ceiling(ceiling: i64) -> String {
    if ceiling == UNLIMITED {
        "unlimited".to_string()
    } else {
        ceiling.to_string()
    }
}

fn optional_set(block: &ResolvedConfig, path: &str) -> Result<BTreeSet<String>, ConfigError> {
    if block.has_path(path) {
        Ok(block.get_string_list(path)?.into_iter().collect())
    } else {
        Ok(BTreeSet::new())
    }
}

fn join(set: &BTreeSet<String>) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::layers::{ConfigLayer, LayerKind};
    use crate::config::resolver::LayeredResolver;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    fn block(body: &str) -> ResolvedConfig {
        LayeredResolver::new()
            .with_layer(ConfigLayer::from_toml_str(LayerKind::File, "test.toml", body).unwrap())
            .resolve()
            .unwrap()
    }

    #[test]
    fn test_ceilings_clamp_to_sentinel() {
        let cfg = block("exactPaths = [\"/select\"]\nconcurrentRequestLimit = -10\nmaxQueuedRequestLimit = 0");
        let policy = RequestLimitPolicy::from_config("perCore", &cfg).unwrap();

        assert_eq!(policy.concurrent_request_limit, -1);
        assert!(policy.is_concurrency_unlimited());
        assert_eq!(policy.max_queued_request_limit, 0);
        assert!(!policy.is_queue_unlimited());
    }

    #[test]
    fn test_zero_concurrency_is_kept() {
        let cfg = block("pathSuffixes = [\"/update\"]\nconcurrentRequestLimit = 0\nmaxQueuedRequestLimit = 5");
        let policy = RequestLimitPolicy::from_config("updates", &cfg).unwrap();
        assert_eq!(policy.concurrent_request_limit, 0);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_absent_paths_default_empty_and_fail_validation() {
        let cfg = block("concurrentRequestLimit = 1\nmaxQueuedRequestLimit = 1");
        let policy = RequestLimitPolicy::from_config("empty", &cfg).unwrap();

        assert!(policy.exact_paths.is_empty());
        assert!(policy.path_suffixes.is_empty());
        let err = policy.validate().unwrap_err();
        assert_eq!(err, ValidationError::EmptyRequestLimit { name: "empty".into() });
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_missing_ceiling_is_config_error() {
        let cfg = block("exactPaths = [\"/select\"]\nmaxQueuedRequestLimit = 1");
        assert_matches!(
            RequestLimitPolicy::from_config("perCore", &cfg),
            Err(ConfigError::MissingPath(ref p)) if p == "concurrentRequestLimit"
        );
    }

    #[test]
    fn test_report_fields() {
        let cfg = block("exactPaths = [\"/b\", \"/a\"]\nconcurrentRequestLimit = -3\nmaxQueuedRequestLimit = 7");
        let policy = RequestLimitPolicy::from_config("p", &cfg).unwrap();
        let fields = policy.report_fields();
        assert_eq!(fields[0], ("exactPaths", "/a,/b".to_string()));
        assert_eq!(fields[2], ("concurrentRequestLimit", "unlimited".to_string()));
        assert_eq!(fields[3], ("maxQueuedRequestLimit", "7".to_string()));
    }

    proptest! {
        #[test]
        fn clamp_never_goes_below_sentinel(raw in any::<i64>()) {
            let clamped = clamp_ceiling(raw);
            prop_assert!(clamped >= UNLIMITED);
            if raw >= 0 {
                prop_assert_eq!(clamped, raw);
            } else {
                prop_assert_eq!(clamped, UNLIMITED);
            }
        }
    }
}
