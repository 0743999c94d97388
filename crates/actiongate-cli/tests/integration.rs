#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn actiongate(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("actiongate").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env_remove("ACTIONGATE_CONFIG")
        .env("ACTIONGATE_LOG_DIR", dir.path().join("logs"));
    cmd
}

fn write_config(dir: &TempDir, yaml: &str) -> PathBuf {
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, yaml).unwrap();
    path
}

const VALID: &str = r#"
token: s3cret
port: 5055
items:
  - {type: openfile, id: 1, path: /usr/bin/viewer}
  - {type: runcommand, id: 1, command: echo, args: hi}
  - {type: handleprogram, id: editor, path: /usr/bin/editor, process_name: editor}
  - {type: launchrocket, id: 9}
"#;

const DUPLICATES: &str = r#"
token: s3cret
items:
  - {type: openfile, id: a, path: /x}
  - {type: openfile, id: a, path: /y}
  - {type: runcommand, id: b, command: ls}
  - {type: runcommand, id: b, command: pwd}
"#;

// ---------------------------------------------------------------------------
// actiongate check
// ---------------------------------------------------------------------------

#[test]
fn check_accepts_valid_config() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, VALID);
    actiongate(&dir)
        .arg("check")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 route(s), 1 item(s) skipped"))
        .stdout(predicate::str::contains("skipped launchrocket/9: unknown type 'launchrocket'"));
}

#[test]
fn check_reports_every_duplicate() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, DUPLICATES);
    actiongate(&dir)
        .args(["check", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("openfile/a"))
        .stderr(predicate::str::contains("runcommand/b"));
}

#[test]
fn check_fails_on_missing_config() {
    let dir = TempDir::new().unwrap();
    actiongate(&dir)
        .args(["check", "--config"])
        .arg(dir.path().join("absent.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("config error"));
}

#[test]
fn config_path_can_come_from_env() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, VALID);
    actiongate(&dir)
        .env("ACTIONGATE_CONFIG", &config)
        .arg("check")
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// actiongate routes
// ---------------------------------------------------------------------------

#[test]
fn routes_lists_expanded_table() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, VALID);
    actiongate(&dir)
        .args(["routes", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("/openfile/1"))
        .stdout(predicate::str::contains("/runcommand/1"))
        .stdout(predicate::str::contains("/openfile/editor"))
        .stdout(predicate::str::contains("/killprocess/editor"))
        .stdout(predicate::str::contains("launchrocket").not());
}

#[test]
fn routes_json_is_parseable() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, VALID);
    let output = actiongate(&dir)
        .args(["routes", "--json", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let endpoints: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["endpoint"].as_str().unwrap())
        .collect();
    assert_eq!(
        endpoints,
        vec!["openfile_1", "runcommand_1", "openfile_editor", "killprocess_editor"]
    );
}

// ---------------------------------------------------------------------------
// actiongate serve
// ---------------------------------------------------------------------------

#[test]
fn serve_refuses_to_start_with_duplicates() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, DUPLICATES);
    actiongate(&dir)
        .args(["serve", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .code(1);

    let log = std::fs::read_to_string(dir.path().join("logs/log.txt")).unwrap();
    assert!(log.contains("duplicate action identities"));
}

#[test]
fn serve_exits_cleanly_when_port_is_taken() {
    let dir = TempDir::new().unwrap();
    let held = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = held.local_addr().unwrap().port();
    let config = write_config(
        &dir,
        &format!("token: s3cret\nhost: 127.0.0.1\nport: {port}\nitems: []\n"),
    );

    actiongate(&dir)
        .args(["serve", "--config"])
        .arg(&config)
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .success();

    let log = std::fs::read_to_string(dir.path().join("logs/log.txt")).unwrap();
    assert!(log.contains("port unavailable"));
    drop(held);
}
