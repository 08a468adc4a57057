//! Temporary server layout for testing
//!
//! Creates a home/logs/tmp directory set and an application archive inside
//! a temp dir, and writes configuration files pointing at them.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

use tempfile::TempDir;

static INIT: Once = Once::new();

/// Initialize test environment
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt::try_init();
    });
}

/// A complete, valid filesystem layout in a temp dir
pub struct TestLayout {
    pub temp_dir: TempDir,
}

impl TestLayout {
    pub fn new() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        init_test_env();
        Self::without_tracing()
    }

    /// Same layout, leaving the global subscriber for the test to install
    pub fn without_tracing() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let temp_dir = tempfile::tempdir()?;
        for dir in ["home", "logs", "tmp", "lib"] {
            fs::create_dir_all(temp_dir.path().join(dir))?;
        }
        fs::write(temp_dir.path().join("solr.war"), b"war")?;

        Ok(Self { temp_dir })
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// `[solr.undertow]` block pointing every directory into the layout
    pub fn base_config(&self) -> String {
        format!(
            r#"
[solr.undertow]
solrHome = "{home}"
solrLogs = "{logs}"
tempDir = "{tmp}"
solrWarFile = "{war}"
"#,
            home = self.path("home").display(),
            logs = self.path("logs").display(),
            tmp = self.path("tmp").display(),
            war = self.path("solr.war").display(),
        )
    }

    /// Write the base config followed by `extra` and return its path
    pub fn write_config(&self, extra: &str) -> PathBuf {
        self.write_raw_config(&format!("{}{}", self.base_config(), extra))
    }

    /// Write a config file verbatim
    pub fn write_raw_config(&self, body: &str) -> PathBuf {
        let path = self.path("solr-undertow.toml");
        fs::write(&path, body).expect("Failed to write test config");
        path
    }
}
