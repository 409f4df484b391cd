//! Integration tests for the `fwdctl` CLI binary.
//!
//! Argument parsing, help output, shell completions and error handling run
//! offline; the panel-bound tests point the binary at a wiremock server.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `fwdctl` binary with env isolation.
///
/// Clears all `FWDCTL_*` env vars and points config directories at
/// `home` so tests never touch the user's real configuration.
fn fwdctl_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("fwdctl");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("FWDCTL_PROFILE")
        .env_remove("FWDCTL_PANEL")
        .env_remove("FWDCTL_OUTPUT")
        .env_remove("FWDCTL_INSECURE")
        .env_remove("FWDCTL_TIMEOUT")
        .write_stdin("");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn write_config(home: &Path, toml: &str) {
    let dir = home.join("fwdctl");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), toml).unwrap();
}

async fn mount_local_view(server: &MockServer, rules: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/get_rules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rules))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/check_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "运行中" })))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = fwdctl_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = tempfile::tempdir().unwrap();
    fwdctl_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("port-forwarding")
            .and(predicate::str::contains("rules"))
            .and(predicate::str::contains("service"))
            .and(predicate::str::contains("nodes")),
    );
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    fwdctl_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fwdctl"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let home = tempfile::tempdir().unwrap();
    fwdctl_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    fwdctl_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Offline error cases ─────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let home = tempfile::tempdir().unwrap();
    let output = fwdctl_cmd(home.path()).arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_node_and_local_conflict() {
    let home = tempfile::tempdir().unwrap();
    fwdctl_cmd(home.path())
        .args(["--node", "1", "--local", "rules", "list"])
        .assert()
        .code(2);
}

#[test]
fn test_rules_list_without_config() {
    let home = tempfile::tempdir().unwrap();
    fwdctl_cmd(home.path())
        .args(["rules", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("fwdctl config init"));
}

#[test]
fn test_invalid_panel_url() {
    let home = tempfile::tempdir().unwrap();
    fwdctl_cmd(home.path())
        .args(["--panel", "not a url", "rules", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("panel"));
}

#[test]
fn test_unreadable_batch_file() {
    let home = tempfile::tempdir().unwrap();
    fwdctl_cmd(home.path())
        .args([
            "--panel",
            "http://127.0.0.1:9",
            "rules",
            "batch",
            "/nonexistent/rules.txt",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn test_delete_requires_yes_without_terminal() {
    let home = tempfile::tempdir().unwrap();
    fwdctl_cmd(home.path())
        .args(["--panel", "http://127.0.0.1:9", "rules", "delete", "0.0.0.0:80"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn test_unreachable_panel_is_connection_error() {
    let home = tempfile::tempdir().unwrap();
    fwdctl_cmd(home.path())
        .args([
            "--panel",
            "http://127.0.0.1:9",
            "--timeout",
            "2",
            "rules",
            "list",
        ])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("Could not reach the panel"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_profiles_and_use() {
    let home = tempfile::tempdir().unwrap();
    write_config(
        home.path(),
        "default_profile = \"home\"\n\n\
         [profiles.home]\npanel = \"http://10.0.0.1:8080\"\n\n\
         [profiles.lab]\npanel = \"http://10.0.0.2:8080\"\nnode = 1\n",
    );

    fwdctl_cmd(home.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("home *").and(predicate::str::contains("lab")));

    fwdctl_cmd(home.path())
        .args(["config", "use", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    fwdctl_cmd(home.path())
        .args(["config", "use", "lab"])
        .assert()
        .success();

    let saved = std::fs::read_to_string(home.path().join("fwdctl/config.toml")).unwrap();
    assert!(saved.contains("default_profile = \"lab\""), "{saved}");
}

#[test]
fn test_config_show_json() {
    let home = tempfile::tempdir().unwrap();
    write_config(home.path(), "[profiles.home]\npanel = \"http://10.0.0.1:8080\"\n");

    let output = fwdctl_cmd(home.path())
        .args(["-o", "json", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["profiles"]["home"]["panel"], "http://10.0.0.1:8080");
    assert_eq!(value["defaults"]["page_size"], 10);
}

// ── Against a mocked panel ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_rules_list_json() {
    let server = MockServer::start().await;
    mount_local_view(
        &server,
        json!({
            "rules": [
                { "listen": "0.0.0.0:8080", "remote": "1.2.3.4:443" },
                { "Listen": "0.0.0.0:9000", "Remote": "[::1]:22" }
            ],
            "total": 2
        }),
    )
    .await;

    let home = tempfile::tempdir().unwrap();
    let output = fwdctl_cmd(home.path())
        .args(["--panel", &server.uri(), "-o", "json", "rules", "list"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["number"], 1);
    assert_eq!(value[0]["listen"], "0.0.0.0:8080");
    assert_eq!(value[1]["remote"], "[::1]:22");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rules_add_conflict_exits_with_conflict_code() {
    let server = MockServer::start().await;
    mount_local_view(
        &server,
        json!({ "rules": [{ "listen": "0.0.0.0:8080", "remote": "a:1" }], "total": 1 }),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/add_rule"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    fwdctl_cmd(home.path())
        .args(["--panel", &server.uri(), "rules", "add", "8080", "b", "2"])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("8080"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rules_add_with_failed_restart_is_partial() {
    let server = MockServer::start().await;
    mount_local_view(&server, json!({ "rules": [], "total": 0 })).await;
    Mock::given(method("POST"))
        .and(path("/add_rule"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/restart_service"))
        .respond_with(ResponseTemplate::new(500).set_body_string("systemctl failed"))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    fwdctl_cmd(home.path())
        .args(["--panel", &server.uri(), "rules", "add", "8080", "1.2.3.4", "443"])
        .assert()
        .code(9)
        .stderr(predicate::str::contains("Rule added, but"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_batch_from_stdin_reports_failed_lines() {
    let server = MockServer::start().await;
    mount_local_view(&server, json!({ "rules": [], "total": 0 })).await;
    Mock::given(method("POST"))
        .and(path("/add_rule"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/restart_service"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    fwdctl_cmd(home.path())
        .args(["--panel", &server.uri(), "rules", "batch", "-"])
        .write_stdin("9001,a,1\nnot a rule\n9003:b:2\n")
        .assert()
        .code(9)
        .stderr(
            predicate::str::contains("2 rule(s) added, 1 line(s) failed")
                .and(predicate::str::contains("line 2")),
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_node_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/nodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "nodes": [] })))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    fwdctl_cmd(home.path())
        .args(["--panel", &server.uri(), "--node", "3", "service", "status"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("nodes list"));
}
