//! Canonical setting names and the legacy names that shadow them

/// Namespace holding every canonical setting
pub const CONFIG_PREFIX: &str = "solr.undertow";

pub const HTTP_CLUSTER_PORT: &str = "httpClusterPort";
pub const HTTP_HOST: &str = "httpHost";
pub const HTTP_IO_THREADS: &str = "httpIoThreads";
pub const HTTP_WORKER_THREADS: &str = "httpWorkerThreads";
pub const ACTIVE_REQUEST_LIMITS: &str = "activeRequestLimits";
pub const REQUEST_LIMITS: &str = "requestLimits";
pub const ZK_RUN: &str = "zkRun";
pub const ZK_HOST: &str = "zkHost";
pub const SOLR_HOME: &str = "solrHome";
pub const SOLR_LOGS: &str = "solrLogs";
pub const TEMP_DIR: &str = "tempDir";
pub const SOLR_VERSION: &str = "solrVersion";
pub const SOLR_WAR_FILE: &str = "solrWarFile";
pub const LIB_EXT_DIR: &str = "libExtDir";
pub const SOLR_CONTEXT_PATH: &str = "solrContextPath";
pub const LOG_LEVEL: &str = "logLevel";

/// Legacy flag asking the server to run an embedded ZooKeeper
pub const SYS_PROP_ZK_RUN: &str = "zkRun";

/// Logging bridge selection read by the embedded server
pub const LOGGING_PROVIDER_PROPERTY: &str = "org.jboss.logging.provider";
pub const LOGGING_PROVIDER: &str = "slf4j";

/// Pairs a legacy external name with the canonical setting it shadows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverrideMapping {
    pub external: &'static str,
    pub canonical: &'static str,
}

impl OverrideMapping {
    /// Full dotted path of the canonical setting
    pub fn canonical_path(&self) -> String {
        canonical_path(self.canonical)
    }
}

/// Legacy names kept in sync with canonical settings, in iteration order
pub const OVERRIDE_MAPPINGS: &[OverrideMapping] = &[
    OverrideMapping { external: "jetty.port", canonical: HTTP_CLUSTER_PORT },
    OverrideMapping { external: "zkHost", canonical: ZK_HOST },
    OverrideMapping { external: "solr.log", canonical: SOLR_LOGS },
    OverrideMapping { external: "hostContext", canonical: SOLR_CONTEXT_PATH },
    OverrideMapping { external: "solr.solr.home", canonical: SOLR_HOME },
];

/// Prefix a setting name with the canonical namespace
pub fn canonical_path(key: &str) -> String {
    format!("{CONFIG_PREFIX}.{key}")
}
