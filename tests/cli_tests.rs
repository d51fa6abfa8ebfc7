use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn check_config_accepts_a_valid_file() {
    let file = write_config(
        "[cluster]\napi_url = \"https://cluster.example.com\"\n\n\
         [resync]\ninterval_secs = 60\n",
    );

    Command::cargo_bin("deckhand")
        .unwrap()
        .args(["--config"])
        .arg(file.path())
        .arg("check-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("configuration OK"))
        .stdout(predicate::str::contains("no-op"))
        .stdout(predicate::str::contains("resync interval: 60s"));
}

#[test]
fn check_config_reports_event_stream_consumer() {
    let file = write_config(
        "[cluster]\napi_url = \"https://cluster.example.com\"\n\n\
         [event_stream]\nws_url = \"wss://events.example.com/specs\"\n",
    );

    Command::cargo_bin("deckhand")
        .unwrap()
        .args(["--config"])
        .arg(file.path())
        .arg("check-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("event-stream"));
}

#[test]
fn missing_config_file_fails_with_an_error() {
    Command::cargo_bin("deckhand")
        .unwrap()
        .args(["--config", "/nonexistent/deckhand.toml", "check-config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn invalid_config_fails_with_the_offending_field() {
    let file = write_config("[cluster]\napi_url = \"not a url\"\n");

    Command::cargo_bin("deckhand")
        .unwrap()
        .args(["--config"])
        .arg(file.path())
        .arg("check-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cluster.api_url"));
}
