//! SolrUndertow
//!
//! Main application entry point: resolves, publishes and validates the
//! startup configuration, then reports it.

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use SolrUndertow::{
    config::{self, SystemProperties},
    utils::{helpers::parse_property, logging},
    SolrUndertowError,
};

#[derive(Parser, Debug)]
#[command(name = "solr-undertow", version, about = "Resolve and validate Solr server startup configuration")]
struct Cli {
    /// Configuration file (TOML)
    config: PathBuf,

    /// System property, repeatable: -D jetty.port=8983
    #[arg(short = 'D', value_name = "KEY=VALUE", value_parser = parse_property)]
    properties: Vec<(String, String)>,

    /// Print the typed settings as JSON after validation
    #[arg(long)]
    dump_settings: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    for (key, value) in &cli.properties {
        SystemProperties::set(key, value);
    }

    let loaded = config::load(&cli.config)?;
    let _guard = logging::init_logging(&loaded.settings)?;

    info!("Starting {}", SolrUndertow::info());
    logging::log_published_properties(&loaded.published);

    logging::log_startup_phase("validate", Some(&cli.config.display().to_string()));
    let report = loaded.validate();
    logging::log_validation_outcome(&report);

    loaded.report();

    if cli.dump_settings {
        println!("{}", serde_json::to_string_pretty(&loaded.settings)?);
    }

    if !report.is_valid() {
        let err = SolrUndertowError::ValidationFailed(report.errors().len());
        error!(severity = %err.severity(), "{}", err);
        return Err(err.into());
    }

    logging::log_startup_phase("ready", None);
    Ok(())
}
