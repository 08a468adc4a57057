//! Startup report of the effective configuration

use std::path::Path;

use tracing::{debug, info, Level};

use super::resolver::ResolvedConfig;
use super::settings::ServerSettings;
use crate::utils::helpers::display_absolute;

type Field = (&'static str, fn(&ServerSettings) -> Option<String>);

const CLUSTER_AND_NETWORK: &[Field] = &[
    ("zkRun", |s: &ServerSettings| Some(s.zk_run.to_string())),
    ("zkHost", |s: &ServerSettings| Some(s.zk_host.clone())),
    ("httpClusterPort", |s: &ServerSettings| Some(s.http_cluster_port.to_string())),
    ("httpHost", |s: &ServerSettings| Some(s.http_host.clone())),
    ("httpIoThreads", |s: &ServerSettings| Some(s.http_io_threads.to_string())),
    ("httpWorkerThreads", |s: &ServerSettings| Some(s.http_worker_threads.to_string())),
    ("activeRequestLimits", |s: &ServerSettings| Some(s.active_request_limits.join(","))),
];

const FILESYSTEM: &[Field] = &[
    ("solrHome", |s: &ServerSettings| Some(display_absolute(&s.solr_home))),
    ("solrLogs", |s: &ServerSettings| Some(display_absolute(&s.solr_logs))),
    ("tempDir", |s: &ServerSettings| Some(display_absolute(&s.temp_dir))),
    ("solrVersion", |s: &ServerSettings| Some(s.solr_version.clone())),
    ("solrWarFile", |s: &ServerSettings| Some(display_absolute(&s.solr_war_file))),
    ("solrContextPath", |s: &ServerSettings| Some(s.solr_context_path.clone())),
    ("logLevel", |s: &ServerSettings| Some(s.log_level.clone())),
    ("libExtDir", |s: &ServerSettings| s.lib_ext_dir.as_deref().map(display_absolute)),
];

/// Every reported line, in print order
pub fn report_lines(settings: &ServerSettings) -> Vec<String> {
    let render = |fields: &[Field]| -> Vec<String> {
        fields
            .iter()
            .filter_map(|(label, value)| value(settings).map(|value| format!("  {label}: {value}")))
            .collect()
    };

    let mut lines = render(CLUSTER_AND_NETWORK);
    for policy in &settings.request_limiters {
        lines.push(format!("  {} >>", policy.name));
        lines.extend(
            policy
                .report_fields()
                .into_iter()
                .map(|(label, value)| format!("    {label}: {value}")),
        );
    }
    lines.extend(render(FILESYSTEM));
    lines
}

/// Log the effective settings, plus the full tree at debug level
pub fn report(config_file: &Path, settings: &ServerSettings, resolved: &ResolvedConfig) {
    info!("=== [ Config File settings from: {} ] ===", display_absolute(config_file));
    for line in report_lines(settings) {
        info!("{}", line);
    }
    if tracing::enabled!(Level::DEBUG) {
        debug!("<<<< CONFIGURATION FILE TRACE >>>>");
        debug!("{}", resolved.render());
    }
    info!("=== [ END CONFIG ] ===");
}
