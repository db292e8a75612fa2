//! Tests for the `crosswalk` binary
//!
//! Every command runs with `CROSSWALK_TEST_MODE` so the user's config file is
//! never read, and with a database under a temp dir.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn db_path(&self) -> PathBuf {
        self.dir.path().join("crosswalk.db")
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("crosswalk").unwrap();
        cmd.env("CROSSWALK_TEST_MODE", "1")
            .env("CROSSWALK_DATABASE_PATH", self.db_path())
            .env_remove("CROSSWALK_DESTINATION_URL")
            .env_remove("CROSSWALK_AUTHORITATIVE_SOURCE")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1")
            .arg("--log-level")
            .arg("off");
        cmd
    }
}

fn student_envelope(id: u64, full_name: &str, source: &str) -> String {
    json!({
        "entity": "Student",
        "operation": "CREATE",
        "source": source,
        "data": json!({"id": id, "full_name": full_name, "status_loans": "SETTLED"}).to_string(),
        "timestamp": "2024-01-01T10:00:00"
    })
    .to_string()
}

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).unwrap()
}

/// Run a blocking command without stalling the mock server's runtime
async fn run(mut cmd: Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

async fn destination(status: u16, body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&server)
        .await;
    server
}

// ============================================================================
// route
// ============================================================================

#[test]
fn test_route_prints_forward_decision() {
    let ws = Workspace::new();
    let file = ws.write("event.json", &student_envelope(1, "Pedro Santos Oliveira", "ACADEMIC"));

    let output = ws
        .cmd()
        .arg("--destination-url")
        .arg("http://library.test/api")
        .arg("route")
        .arg(&file)
        .output()
        .unwrap();
    assert!(output.status.success());

    let decision = stdout_json(&output.stdout);
    assert_eq!(decision["forward"], true);
    assert_eq!(decision["verb"], "POST");
    assert_eq!(decision["address"], "http://library.test/api/users");
    assert_eq!(decision["payload"]["first_name"], "Pedro");
    assert_eq!(decision["payload"]["last_name"], "Santos Oliveira");
    assert_eq!(decision["payload"]["enrollment_status"], "ACTIVE");
}

#[test]
fn test_route_skips_non_authoritative_source() {
    let ws = Workspace::new();
    let file = ws.write("event.json", &student_envelope(1, "Ana Costa", "LIBRARY"));

    let output = ws.cmd().arg("route").arg(&file).output().unwrap();
    assert!(output.status.success());

    let decision = stdout_json(&output.stdout);
    assert_eq!(decision["forward"], false);
    assert!(decision["skip_reason"].as_str().unwrap().contains("LIBRARY"));
}

#[test]
fn test_route_honors_authoritative_source_env() {
    let ws = Workspace::new();
    let file = ws.write("event.json", &student_envelope(1, "Ana Costa", "LIBRARY"));

    let output = ws
        .cmd()
        .env("CROSSWALK_AUTHORITATIVE_SOURCE", "LIBRARY")
        .arg("route")
        .arg(&file)
        .output()
        .unwrap();
    assert_eq!(stdout_json(&output.stdout)["forward"], true);
}

#[test]
fn test_route_rejects_unknown_operation() {
    let ws = Workspace::new();
    let file = ws.write(
        "event.json",
        r#"{"entity":"Student","operation":"MERGE","source":"ACADEMIC","data":"{}"}"#,
    );

    ws.cmd()
        .arg("route")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to decode envelope"));
}

// ============================================================================
// process / lookup / list
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_process_records_correlation_and_lookup_reports_it() {
    let server = destination(201, r#"{"id":"abc123"}"#).await;
    let ws = Workspace::new();
    let file = ws.write("event.json", &student_envelope(1, "Pedro Santos Oliveira", "ACADEMIC"));

    let mut cmd = ws.cmd();
    cmd.arg("--destination-url").arg(server.uri()).arg("process").arg(&file);
    let output = run(cmd).await;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Forwarded:"));
    assert!(stdout.contains("Correlated:"));
    assert!(stdout.contains("abc123"));

    let mut cmd = ws.cmd();
    cmd.args(["lookup", "--entity", "Student", "--source-id", "1", "--format", "json"]);
    let output = run(cmd).await;
    assert!(output.status.success());

    let report = stdout_json(&output.stdout);
    assert_eq!(report["status"], "complete");
    assert_eq!(report["correlations"].as_array().unwrap().len(), 1);
    assert_eq!(report["correlations"][0]["destination_id"], "abc123");
    assert_eq!(report["correlations"][0]["source_id"], "1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_process_without_destination_id_records_nothing() {
    let server = destination(200, r#"{"status":"queued"}"#).await;
    let ws = Workspace::new();
    let file = ws.write("event.json", &student_envelope(5, "Ana Costa", "ACADEMIC"));

    let mut cmd = ws.cmd();
    cmd.arg("--destination-url").arg(server.uri()).arg("process").arg(&file);
    let output = run(cmd).await;
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Not correlated:"));

    let mut cmd = ws.cmd();
    cmd.args(["list", "--format", "json"]);
    let output = run(cmd).await;
    assert_eq!(stdout_json(&output.stdout), json!([]));
}

#[test]
fn test_process_reports_unreachable_destination() {
    let ws = Workspace::new();
    let file = ws.write("event.json", &student_envelope(1, "Ana Costa", "ACADEMIC"));

    ws.cmd()
        .arg("--destination-url")
        .arg("http://127.0.0.1:9")
        .arg("process")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Event processing failed"));
}

#[test]
fn test_lookup_unknown_record_is_not_an_error() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["lookup", "--entity", "Student", "--source-id", "404"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not yet synchronized"));
}

#[test]
fn test_list_empty_database() {
    let ws = Workspace::new();

    ws.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No correlations recorded"));
}

// ============================================================================
// listen
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_listen_relays_input_file() {
    let server = destination(201, r#"{"id":"dest-1"}"#).await;
    let ws = Workspace::new();
    let input = [
        student_envelope(1, "Pedro Santos Oliveira", "ACADEMIC"),
        String::new(),
        student_envelope(2, "Ana Costa", "LIBRARY"),
        "not json".to_string(),
    ]
    .join("\n");
    let file = ws.write("events.jsonl", &input);

    let mut cmd = ws.cmd();
    cmd.arg("--destination-url")
        .arg(server.uri())
        .arg("listen")
        .arg("--input")
        .arg(&file)
        .arg("--json");
    let output = run(cmd).await;
    assert!(output.status.success());

    let summary = stdout_json(&output.stdout);
    assert_eq!(summary["received"], 3);
    assert_eq!(summary["forwarded"], 1);
    assert_eq!(summary["skipped"], 1);
    assert_eq!(summary["failed"], 1);
    assert_eq!(summary["correlations_recorded"], 1);
}

#[test]
fn test_listen_reads_stdin() {
    let ws = Workspace::new();

    ws.cmd()
        .arg("listen")
        .write_stdin(format!("{}\n", student_envelope(1, "Ana Costa", "LIBRARY")))
        .assert()
        .success()
        .stdout(predicate::str::contains("Relay finished"))
        .stdout(predicate::str::is_match(r"Skipped:\s+1").unwrap());
}

// ============================================================================
// config
// ============================================================================

#[test]
fn test_config_init_creates_file() {
    let ws = Workspace::new();
    let config_path = ws.dir.path().join("config").join("crosswalk.toml");

    ws.cmd()
        .args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config file at"));

    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[destination]"));
    assert!(content.contains("base_url"));
}

#[test]
fn test_config_init_keeps_existing_file_without_force() {
    let ws = Workspace::new();
    let config_path = ws.write("crosswalk.toml", "existing content");

    ws.cmd()
        .args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Config file already exists"))
        .stdout(predicate::str::contains("--force"));
    assert_eq!(fs::read_to_string(&config_path).unwrap(), "existing content");

    ws.cmd()
        .args(["config", "init", "--force", "--path"])
        .arg(&config_path)
        .assert()
        .success();
    assert_ne!(fs::read_to_string(&config_path).unwrap(), "existing content");
}

#[test]
fn test_config_show_applies_precedence() {
    let ws = Workspace::new();
    let config_path = ws.write(
        "crosswalk.toml",
        "[destination]\nbase_url = \"http://from-file:8080\"\n\n[channel]\nname = \"from-file\"\n",
    );

    let output = ws
        .cmd()
        .env("CROSSWALK_CHANNEL", "from-env")
        .arg("--config")
        .arg(&config_path)
        .arg("--destination-url")
        .arg("http://from-flag:9090")
        .args(["config", "show", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let shown = stdout_json(&output.stdout);
    assert_eq!(shown["destination"]["base_url"], "http://from-flag:9090");
    assert_eq!(shown["channel"]["name"], "from-env");
    assert_eq!(
        Path::new(shown["storage"]["database_path"].as_str().unwrap()),
        ws.db_path()
    );
}

#[test]
fn test_invalid_config_is_reported() {
    let ws = Workspace::new();

    ws.cmd()
        .arg("--destination-url")
        .arg("ftp://library")
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base_url"));
}
