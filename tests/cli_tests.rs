//! CLI integration tests.

mod harness;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use harness::config::{write_config, MINIMAL_TOML};
use harness::db::TempDb;
use vesselwatch::port::outbound::store::VesselStore;
use vesselwatch::testkit::domain::full_record;

fn vesselwatch() -> Command {
    let mut cmd = cargo_bin_cmd!("vesselwatch");
    cmd.env_remove("AISSTREAM_API_KEY");
    cmd
}

#[test]
fn help_lists_commands() {
    vesselwatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("vessels"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn version_flag() {
    vesselwatch()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vesselwatch"));
}

#[test]
fn config_validate_accepts_minimal_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "config.toml", MINIMAL_TOML);

    vesselwatch()
        .args(["--color", "never", "config", "validate", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"));
}

#[test]
fn config_validate_reports_missing_api_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "config.toml", "[ingest]\nbatch_size = 10\n");

    vesselwatch()
        .args(["config", "validate", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("feed.api_key"));
}

#[test]
fn config_show_prints_regions() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "config.toml", MINIMAL_TOML);

    vesselwatch()
        .args(["--color", "never", "config", "show", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("gibraltar"))
        .stdout(predicate::str::contains("(set)"));
}

#[test]
fn vessels_summarizes_stored_records() {
    let db = TempDb::create();
    db.open()
        .save_batch(&[full_record(353_136_000)])
        .expect("seed database");
    let config = write_config(db.dir(), "config.toml", "");

    vesselwatch()
        .args(["--json", "vessels", "--limit", "5", "--config"])
        .arg(&config)
        .arg("--database")
        .arg(db.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""label":"Total","value":"1""#))
        .stdout(predicate::str::contains(r#""label":"Tankers","value":"1""#))
        .stdout(predicate::str::contains("EXAMPLE TANKER"));
}

#[test]
fn missing_config_fails_with_read_error() {
    vesselwatch()
        .args(["config", "validate", "--config", "/nonexistent/vesselwatch.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}
