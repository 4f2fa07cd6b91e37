//! End-to-end checks of the service layer against real configuration and
//! SQLite files.

use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use powerbill_cli::app;
use powerbill_cli::config::{AppConfig, ConfigFile, Overrides};
use powerbill_core::BillingMonth;
use powerbill_core::db::DbConfig;
use rust_decimal_macros::dec;

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("powerbill.toml")
}

fn month(s: &str) -> BillingMonth {
    s.parse().expect("valid billing month")
}

/// A database file under the system temp dir, removed on drop.
struct TempDb(PathBuf);

impl TempDb {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("powerbill-{}-{}.db", name, std::process::id()));
        let _ = std::fs::remove_file(&path);
        Self(path)
    }

    fn config(&self) -> DbConfig {
        DbConfig {
            backend: "sqlite".to_string(),
            connection_string: self.0.display().to_string(),
        }
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

#[test]
fn test_fixture_config_resolves() {
    let file = ConfigFile::load(&fixture_path()).expect("fixture should parse");

    let config = AppConfig::resolve(file, Overrides::default());

    assert_eq!(config.database.connection_string, ":memory:");
    assert_eq!(config.log_level.as_deref(), Some("powerbill_core=debug,info"));
    assert_eq!(config.log_file, None);
}

#[tokio::test]
async fn test_fixture_config_opens_repository() {
    let file = ConfigFile::load(&fixture_path()).unwrap();
    let config = AppConfig::resolve(file, Overrides::default());

    let repo = app::open_repository(&config.database)
        .await
        .expect("in-memory repository");
    let report = app::load_history(&*repo, None).await.unwrap();

    assert_eq!(report.totals.months, 0);
}

#[tokio::test]
async fn test_records_survive_reopening_the_file() {
    let db = TempDb::new("reopen");

    {
        let repo = app::open_repository(&db.config()).await.unwrap();
        app::submit_usage(&*repo, dec!(350), month("2025-01")).await.unwrap();
        app::submit_usage(&*repo, dec!(500), month("2025-08")).await.unwrap();
    }

    let repo = app::open_repository(&db.config()).await.unwrap();
    let report = app::load_history(&*repo, Some(2025)).await.unwrap();

    assert_eq!(report.totals.months, 2);
    assert_eq!(report.totals.bill, 65700 + 103300);
    assert_eq!(report.totals.usage_kwh, dec!(850));
}

#[tokio::test]
async fn test_reopening_keeps_one_record_per_month() {
    let db = TempDb::new("upsert");

    {
        let repo = app::open_repository(&db.config()).await.unwrap();
        app::submit_usage(&*repo, dec!(250), month("2025-07")).await.unwrap();
    }
    let repo = app::open_repository(&db.config()).await.unwrap();
    let record = app::submit_usage(&*repo, dec!(450), month("2025-07")).await.unwrap();

    let report = app::load_history(&*repo, None).await.unwrap();
    assert_eq!(record.bill, 79350);
    assert_eq!(report.months.len(), 1);
    assert_eq!(report.months[0].bill, 79350);
}
