use assert_cmd::prelude::*;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::tempdir;

fn cargo_bin() -> Command {
    Command::cargo_bin("httpsnap").expect("binary exists")
}

#[test]
fn displays_help() {
    let mut cmd = cargo_bin();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Single-shot HTTP client"));
}

#[test]
fn displays_version() {
    let mut cmd = cargo_bin();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn executes_simple_request() {
    let temp = tempdir().unwrap();
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/ping").header("x-trace", "abc");
        then.status(200)
            .header("content-type", "application/json")
            .body("{\"ok\":true}");
    });

    let mut cmd = cargo_bin();
    cmd.current_dir(temp.path());
    cmd.args(["get", &server.url("/ping"), "-H", "X-Trace: abc", "--preview", "16"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("GET"))
        .stdout(predicate::str::contains("200 OK"))
        .stdout(predicate::str::contains("{\"ok\":true}"));

    mock.assert();
}

#[test]
fn applies_profile_from_config_file() {
    let temp = tempdir().unwrap();
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/items")
            .header("user-agent", "profile-agent/1.0")
            .header("content-type", "application/json")
            .body("{}");
        then.status(201);
    });

    std::fs::write(
        temp.path().join("httpsnap.json"),
        r#"{
  "userAgent": "root-agent/1.0",
  "profiles": {
    "ci": {"userAgent": "profile-agent/1.0", "contentType": "application/json"}
  }
}"#,
    )
    .unwrap();

    let mut cmd = cargo_bin();
    cmd.current_dir(temp.path());
    cmd.args(["POST", &server.url("/items"), "-P", "ci", "--data", "{}"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("201 Created"));

    mock.assert();
}

#[test]
fn fails_with_malformed_proxy() {
    let temp = tempdir().unwrap();
    let mut cmd = cargo_bin();
    cmd.current_dir(temp.path());
    cmd.args(["GET", "http://127.0.0.1:9/", "--proxy", "http://[::1"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid proxy URL"));
}

#[test]
fn errors_when_profile_requested_without_config() {
    let temp = tempdir().unwrap();
    let mut cmd = cargo_bin();
    cmd.current_dir(temp.path());
    cmd.args(["GET", "http://127.0.0.1:9/", "-P", "missing"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no httpsnap.json found"));
}
