//! CLI integration tests for the hookflow command-line interface.
//!
//! These tests verify:
//! - Help text and argument parsing
//! - Context management against a temporary config directory
//! - Form validation that fails before any request is sent
//! - A few commands end to end against a mock server

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Nothing listens here; tests using it must fail before connecting.
const UNREACHABLE: &str = "http://127.0.0.1:9/api";

/// Get a command for the hookflow binary with an isolated config dir.
fn hookflow(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hookflow").unwrap();
    cmd.env("HOOKFLOW_CONFIG_DIR", config_dir)
        .env_remove("HOOKFLOW_SERVER_URL");
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_displays() {
    let dir = TempDir::new().unwrap();
    hookflow(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("hookflow"))
        .stdout(predicate::str::contains("webhook events"));
}

#[test]
fn test_version_displays() {
    let dir = TempDir::new().unwrap();
    hookflow(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hookflow"));
}

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    hookflow(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("events"))
        .stdout(predicate::str::contains("sequences"))
        .stdout(predicate::str::contains("executions"))
        .stdout(predicate::str::contains("actions"))
        .stdout(predicate::str::contains("workflows"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_events_help_lists_test_and_import() {
    let dir = TempDir::new().unwrap();
    hookflow(dir.path())
        .args(["events", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("test"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("duplicate"));
}

#[test]
fn test_global_flags_accepted() {
    let dir = TempDir::new().unwrap();
    hookflow(dir.path())
        .args(["--verbose", "--json", "--server", UNREACHABLE, "--context", "x", "--help"])
        .assert()
        .success();
}

// ─────────────────────────────────────────────────────────────────────────────
// Invalid Arguments
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_unknown_subcommand_fails() {
    let dir = TempDir::new().unwrap();
    hookflow(dir.path())
        .arg("deploy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_bad_execution_status_rejected() {
    let dir = TempDir::new().unwrap();
    hookflow(dir.path())
        .args(["executions", "list", "--status", "exploded"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown execution status"));
}

#[test]
fn test_non_numeric_id_rejected() {
    let dir = TempDir::new().unwrap();
    hookflow(dir.path())
        .args(["events", "show", "abc"])
        .assert()
        .failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Contexts
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_context_lifecycle() {
    let dir = TempDir::new().unwrap();

    hookflow(dir.path())
        .args(["config", "current-context"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No current context set"));

    hookflow(dir.path())
        .args(["config", "set-context", "local", "--server", "http://localhost:8000/api/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Context \"local\" created."))
        .stdout(predicate::str::contains("set as current context"));

    hookflow(dir.path())
        .args(["config", "set-context", "prod", "--server", "https://hooks.example.com/api/", "--timeout", "5"])
        .assert()
        .success();

    hookflow(dir.path())
        .args(["config", "use-context", "prod"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Switched to context \"prod\"."));

    hookflow(dir.path())
        .args(["config", "get-contexts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("local"))
        .stdout(predicate::str::contains("*         prod"));

    hookflow(dir.path())
        .args(["config", "delete-context", "prod"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No current context"));

    assert!(dir.path().join("client.yaml").exists());
}

#[test]
fn test_new_context_requires_server() {
    let dir = TempDir::new().unwrap();
    hookflow(dir.path())
        .args(["config", "set-context", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--server is required"));
}

#[test]
fn test_unknown_context_flag_fails() {
    let dir = TempDir::new().unwrap();
    hookflow(dir.path())
        .args(["--context", "missing", "events", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("context 'missing' not found"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Local Validation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_event_create_requires_name() {
    let dir = TempDir::new().unwrap();
    hookflow(dir.path())
        .args(["--server", UNREACHABLE, "events", "create", "--description", "no name"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Event name is required"));
}

#[test]
fn test_action_create_rejects_invalid_body() {
    let dir = TempDir::new().unwrap();
    hookflow(dir.path())
        .args([
            "--server",
            UNREACHABLE,
            "actions",
            "create",
            "--connector",
            "3",
            "--name",
            "Notify",
            "--body",
            "{not json",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON in Request Body"));
}

#[test]
fn test_import_rejects_malformed_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("broken.json");
    std::fs::write(&file, "{ nope").unwrap();

    hookflow(dir.path())
        .args(["--server", UNREACHABLE, "events", "import"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON format"));
}

#[test]
fn test_step2_requires_documents_unless_completing() {
    let dir = TempDir::new().unwrap();
    hookflow(dir.path())
        .args(["--server", UNREACHABLE, "workflows", "runs", "step2", "11"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--documents is required"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Against a Mock Server
// ─────────────────────────────────────────────────────────────────────────────

async fn run_blocking(mut cmd: Command) -> assert_cmd::assert::Assert {
    tokio::task::spawn_blocking(move || cmd.assert()).await.unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_events_list_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Order Created", "event_type": "custom", "status": "active"}
        ])))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut cmd = hookflow(dir.path());
    cmd.args(["--server", &format!("{}/api", server.uri()), "events", "list"]);

    run_blocking(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Order Created"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_inactive_sequence_cannot_execute() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sequences/5/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5, "name": "Fulfilment", "status": "inactive", "trigger_events": [1]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/sequences/5/execute/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut cmd = hookflow(dir.path());
    cmd.args(["--server", &format!("{}/api", server.uri()), "sequences", "execute", "5"]);

    run_blocking(cmd)
        .await
        .failure()
        .stderr(predicate::str::contains("Sequence must be active to execute"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_event_test_once_without_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events/42/test-endpoint/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "test_endpoint": "http://localhost:8000/api/events/42/test/"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events/42/sample-payload/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sample_payload": {}})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events/42/test-payload/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "No payload"})))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut cmd = hookflow(dir.path());
    cmd.args([
        "--server",
        &format!("{}/api", server.uri()),
        "events",
        "test",
        "42",
        "--once",
        "--interval-ms",
        "250",
    ]);

    run_blocking(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Test endpoint: http://localhost:8000/api/events/42/test/"))
        .stdout(predicate::str::contains("No payload received yet"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_proceed_reports_rule_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/workflow-executions/11/proceed_to_step2/"))
        .and(body_json(json!({"customer_id": "CUST123"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "error": "Failed to proceed to Step 2 - Rule execution failures detected",
            "rule_errors": [
                "Rule 'KYC': Customer is blocked",
                "Rule 'Stamp': Stamp amount must be at least 100"
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut cmd = hookflow(dir.path());
    cmd.args([
        "--server",
        &format!("{}/api", server.uri()),
        "workflows",
        "runs",
        "step1",
        "11",
        "--customer-id",
        "CUST123",
        "--proceed",
    ]);

    run_blocking(cmd).await.failure().stderr(predicate::str::contains(
        "Rule validation failed: Rule 'KYC': Customer is blocked, Rule 'Stamp': Stamp amount must be at least 100",
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_workflow_run_starts_execution() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/workflows/2/create_execution/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 11, "workflow": 2, "workflow_name": "Invoice Processing",
            "status": "in_progress", "current_step": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut cmd = hookflow(dir.path());
    cmd.args(["--server", &format!("{}/api", server.uri()), "workflows", "run", "2"]);

    run_blocking(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Execution 11 started at step 1"))
        .stdout(predicate::str::contains("Invoice Processing - Execution 11"));
}
