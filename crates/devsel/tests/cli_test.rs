//! Integration tests for the `devsel` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! rule evaluation end to end, and error exit codes.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

const T7_PRO: &str = r#"{
    "deviceType": "T7",
    "typeStr": "T7",
    "specialText": " Pro",
    "wifiStatus": 1,
    "wifiStatusStr": "Associated",
    "wifiRSSIStr": "-40dBm",
    "wifiRSSIImgName": "rssi-4",
    "wifiIPAddress": "192.168.1.207"
}"#;

const WIFI_CONNECTION: &str = r#"{
    "isEnabled": true,
    "alreadyOpen": false,
    "notSearchableWarning": true,
    "typeStr": "WiFi"
}"#;

const BADGE_RULES: &str = r#"
[[rule]]
attribute = "button_badge"
target = "device"
tree = { attr = "wifiStatus", when_true = "on", when_false = "off" }
"#;

/// Build a [`Command`] for the `devsel` binary with env isolation.
///
/// Clears all `DEVSEL_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn devsel_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("devsel");
    cmd.env("HOME", "/tmp/devsel-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/devsel-cli-test-nonexistent")
        .env_remove("DEVSEL_CONFIG")
        .env_remove("DEVSEL_OUTPUT")
        .env_remove("DEVSEL_RULES_FILE")
        .env_remove("DEVSEL_RULES_BUILTIN")
        .env_remove("RUST_LOG");
    cmd
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Device + connection fixtures for a T7-Pro on WiFi.
fn fixtures() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let device = write(&dir, "device.json", T7_PRO);
    let connection = write(&dir, "connection.json", WIFI_CONNECTION);
    (dir, device, connection)
}

fn apply_args<'a>(device: &'a Path, connection: &'a Path) -> [&'a std::ffi::OsStr; 5] {
    [
        "apply".as_ref(),
        "--device".as_ref(),
        device.as_os_str(),
        "--connection".as_ref(),
        connection.as_os_str(),
    ]
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = devsel_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    devsel_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("apply")
            .and(predicate::str::contains("rules"))
            .and(predicate::str::contains("completions")),
    );
}

#[test]
fn test_version_flag() {
    devsel_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("devsel"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    devsel_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    devsel_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Apply ───────────────────────────────────────────────────────────

#[test]
fn test_apply_plain_lists_assignments_in_rule_order() {
    let (_dir, device, connection) = fixtures();
    devsel_cmd()
        .args(apply_args(&device, &connection))
        .args(["--output", "plain"])
        .assert()
        .success()
        .stdout(concat!(
            "device.button_image=<img title=\"Signal Strength is -40dBm\" class=\"wifiRSSIImage\" src=\"static/img/rssi-4.png\">\n",
            "connection.button_class=btn-warning\n",
            "device.displayWifiIPAddress=192.168.1.207\n",
            "connection.button_title=Connect to T7 Pro using WiFi however, scan failed\n",
        ));
}

#[test]
fn test_apply_state_writes_onto_both_roots() {
    let (_dir, device, connection) = fixtures();
    let output = devsel_cmd()
        .args(apply_args(&device, &connection))
        .args(["--state", "-o", "json-compact"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let state: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(state["device"]["displayWifiIPAddress"], "192.168.1.207");
    assert_eq!(state["device"]["typeStr"], "T7");
    assert_eq!(state["connection"]["button_class"], "btn-warning");
    assert!(state["connection"].get("button_state").is_none());
    assert!(state["device"].get("connection").is_none());
}

#[test]
fn test_apply_reads_device_from_stdin() {
    devsel_cmd()
        .args(["apply", "--device", "-", "-o", "plain"])
        .write_stdin(r#"{ "wifiStatus": 0, "deviceType": "T7", "specialText": "" }"#)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("connection.button_state=disabled")
                .and(predicate::str::contains("device.displayWifiIPAddress=0.0.0.0"))
                .and(predicate::str::contains(
                    "connection.button_title=Unable to connect to T7 via WiFi",
                )),
        );
}

#[test]
fn test_apply_table_output() {
    let (_dir, device, connection) = fixtures();
    devsel_cmd()
        .args(apply_args(&device, &connection))
        .args(["--color", "never"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Attribute")
                .and(predicate::str::contains("button_title"))
                .and(predicate::str::contains("btn-warning")),
        );
}

#[test]
fn test_output_format_from_environment() {
    let (_dir, device, connection) = fixtures();
    devsel_cmd()
        .env("DEVSEL_OUTPUT", "plain")
        .args(apply_args(&device, &connection))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("device.button_image="));
}

#[test]
fn test_quiet_suppresses_output() {
    let (_dir, device, connection) = fixtures();
    devsel_cmd()
        .args(apply_args(&device, &connection))
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

// ── Rules ───────────────────────────────────────────────────────────

#[test]
fn test_rules_lists_builtins_in_order() {
    devsel_cmd()
        .args(["rules", "-o", "plain"])
        .assert()
        .success()
        .stdout(concat!(
            "0 connection.button_state\n",
            "1 connection.button_state\n",
            "2 device.button_image\n",
            "3 connection.button_class\n",
            "4 device.displayWifiIPAddress\n",
            "5 connection.button_title\n",
        ));
}

#[test]
fn test_rule_file_replaces_builtins() {
    let dir = TempDir::new().unwrap();
    let rules = write(&dir, "rules.toml", BADGE_RULES);
    let device = write(&dir, "device.json", r#"{ "wifiStatus": true }"#);

    devsel_cmd()
        .arg("--no-builtin")
        .arg("--rules")
        .arg(&rules)
        .args(["rules", "-o", "plain"])
        .assert()
        .success()
        .stdout("0 device.button_badge\n");

    devsel_cmd()
        .arg("--no-builtin")
        .arg("--rules")
        .arg(&rules)
        .args(["apply", "-o", "plain", "--device"])
        .arg(&device)
        .assert()
        .success()
        .stdout("device.button_badge=on\n");
}

#[test]
fn test_config_file_selects_rules() {
    let dir = TempDir::new().unwrap();
    let rules = write(&dir, "rules.json", r#"{ "rule": [] }"#);
    let config = write(
        &dir,
        "config.toml",
        &format!(
            "output = \"plain\"\n[rules]\nbuiltin = false\nfile = {:?}\n",
            rules.display().to_string()
        ),
    );

    devsel_cmd()
        .arg("--config")
        .arg(&config)
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_without_file_renders_defaults() {
    devsel_cmd().args(["config", "show"]).assert().success().stdout(
        predicate::str::contains("output = \"table\"")
            .and(predicate::str::contains("builtin = true")),
    );
}

#[test]
fn test_config_show_reflects_flags() {
    devsel_cmd()
        .args(["--no-builtin", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("builtin = false"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = devsel_cmd().arg("foobar").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("foobar"), "{text}");
}

#[test]
fn test_invalid_output_format() {
    let output = devsel_cmd()
        .args(["--output", "invalid", "rules"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_invalid_output_in_environment_is_a_config_error() {
    devsel_cmd()
        .env("DEVSEL_OUTPUT", "html")
        .arg("rules")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("output"));
}

#[test]
fn test_unresolved_placeholder_fails_the_pass() {
    let dir = TempDir::new().unwrap();
    let device = write(&dir, "device.json", r#"{ "wifiStatus": 1 }"#);

    devsel_cmd()
        .args(["apply", "--device"])
        .arg(&device)
        .assert()
        .code(5)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("displayWifiIPAddress"));
}

#[test]
fn test_non_object_state_is_an_input_error() {
    let dir = TempDir::new().unwrap();
    let device = write(&dir, "device.json", "[]");

    devsel_cmd()
        .args(["apply", "--device"])
        .arg(&device)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("array"));
}

#[test]
fn test_missing_state_file_is_an_input_error() {
    devsel_cmd()
        .args(["apply", "--device", "/nonexistent/devsel/device.json"])
        .assert()
        .code(4);
}

#[test]
fn test_malformed_rule_file_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let rules = write(&dir, "rules.toml", "[[rule]]\nattribute = 1\n");

    devsel_cmd()
        .arg("--rules")
        .arg(&rules)
        .arg("rules")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("rules.toml"));
}
