//! Logging setup when the rolling log file cannot be opened
//!
//! Runs in its own test binary: it installs the global subscriber.

mod helpers;

use std::collections::BTreeMap;
use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

use helpers::*;
use SolrUndertow::config::{self, ProcessInputs};
use SolrUndertow::utils::logging;

/// `YYYY-MM-DD` (UTC) for a day count since the epoch
fn civil_date(days: i64) -> String {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    format!("{year:04}-{month:02}-{day:02}")
}

#[test]
fn test_civil_date() {
    assert_eq!(civil_date(0), "1970-01-01");
    assert_eq!(civil_date(19_723), "2024-01-01");
    assert_eq!(civil_date(11_016), "2000-02-29");
}

#[test]
fn test_unopenable_log_file_falls_back_to_stdout() {
    let layout = TestLayout::without_tracing().unwrap();
    let today = (SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() / 86_400) as i64;
    for day in today - 1..=today + 1 {
        let blocker = layout.path("logs").join(format!("solr-undertow.{}.log", civil_date(day)));
        fs::create_dir(blocker).unwrap();
    }

    let config_file = layout.write_config("");
    let loaded = config::load_with(&config_file, &ProcessInputs::default(), &mut BTreeMap::new()).unwrap();
    assert!(loaded.settings.logging_dir().is_some());

    let guard = logging::init_logging(&loaded.settings);
    assert!(guard.is_ok(), "{:?}", guard.err());

    let report = loaded.validate();
    assert!(report.is_valid(), "{:?}", report.messages());
}
