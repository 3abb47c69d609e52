//! Integration tests for the `omevlan` CLI binary.
//!
//! These cover argument parsing, help output, shell completions, and the
//! error paths that must trigger before any request reaches an appliance.
#![allow(clippy::unwrap_used)]

use std::net::TcpListener;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `omevlan` binary with env isolation.
///
/// Clears all `OMEVLAN_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn omevlan_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("omevlan");
    cmd.env("HOME", "/tmp/omevlan-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/omevlan-cli-test-nonexistent")
        .env_remove("OMEVLAN_PROFILE")
        .env_remove("OMEVLAN_HOSTNAME")
        .env_remove("OMEVLAN_PORT")
        .env_remove("OMEVLAN_USERNAME")
        .env_remove("OMEVLAN_PASSWORD")
        .env_remove("OMEVLAN_OUTPUT")
        .env_remove("OMEVLAN_INSECURE")
        .env_remove("OMEVLAN_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn declaration_file(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("vlans.yaml");
    std::fs::write(&path, contents).unwrap();
    path
}

/// A local port with nothing listening on it.
fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = omevlan_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    omevlan_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("OpenManage Enterprise")
            .and(predicate::str::contains("apply"))
            .and(predicate::str::contains("plan"))
            .and(predicate::str::contains("show"))
            .and(predicate::str::contains("networks")),
    );
}

#[test]
fn test_version_flag() {
    omevlan_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("omevlan"));
}

#[test]
fn test_apply_help_lists_inline_options() {
    omevlan_cmd().args(["apply", "--help"]).assert().success().stdout(
        predicate::str::contains("--untagged")
            .and(predicate::str::contains("--tagged-name"))
            .and(predicate::str::contains("--clear-tagged"))
            .and(predicate::str::contains("--file")),
    );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    omevlan_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    omevlan_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Argument errors ─────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = omevlan_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_malformed_port_assignment() {
    omevlan_cmd()
        .args(["apply", "--untagged", "one=100"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid port"));
}

#[test]
fn test_template_selectors_conflict() {
    omevlan_cmd()
        .args(["plan", "--template-name", "web", "--template-id", "12"])
        .assert()
        .code(2);
}

// ── Declaration errors (no appliance involved) ──────────────────────

#[test]
fn test_empty_declaration_is_rejected() {
    omevlan_cmd()
        .args(["apply", "--template-id", "12", "--nic", "NIC in Mezzanine 1A"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Either tagged_networks"));
}

#[test]
fn test_mutually_exclusive_untagged_fails_before_connecting() {
    let dir = tempfile::tempdir().unwrap();
    let path = declaration_file(
        &dir,
        "template_name: web\n\
         nic_identifier: NIC in Mezzanine 1A\n\
         untagged_networks:\n  - port: 1\n    untagged_network_id: 100\n    untagged_network_name: vlan2\n",
    );

    // No hostname is configured: reaching the connection step would fail
    // with a different error.
    omevlan_cmd()
        .args(["apply", "-f", path.to_str().unwrap()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("mutually"));
}

#[test]
fn test_repeated_untagged_port_is_rejected() {
    omevlan_cmd()
        .args([
            "apply",
            "--template-id",
            "12",
            "--nic",
            "NIC in Mezzanine 1A",
            "--untagged",
            "1=100",
            "--untagged-name",
            "1=vlan3",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("port 1 is repeated"));
}

#[test]
fn test_missing_nic_is_reported() {
    omevlan_cmd()
        .args(["plan", "--template-id", "12", "--untagged", "1=100"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nic_identifier"));
}

#[test]
fn test_show_requires_nic() {
    omevlan_cmd()
        .args(["show", "--template-id", "12"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--nic"));
}

// ── Connection setup ────────────────────────────────────────────────

#[test]
fn test_apply_without_hostname() {
    omevlan_cmd()
        .args([
            "apply",
            "--template-id",
            "12",
            "--nic",
            "NIC in Mezzanine 1A",
            "--untagged",
            "1=0",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No appliance hostname"));
}

#[test]
fn test_networks_without_hostname() {
    omevlan_cmd()
        .arg("networks")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No appliance hostname"));
}

#[test]
fn test_unreachable_appliance_is_not_a_failure() {
    let port = closed_port().to_string();
    let output = omevlan_cmd()
        .args([
            "--hostname",
            "127.0.0.1",
            "--port",
            &port,
            "--username",
            "admin",
            "--password",
            "secret",
            "--timeout",
            "5",
            "-o",
            "json",
            "apply",
            "--template-id",
            "12",
            "--nic",
            "NIC in Mezzanine 1A",
            "--tagged",
            "1=100,101",
        ])
        .output()
        .unwrap();

    assert_eq!(
        output.status.code(),
        Some(0),
        "{}",
        combined_output(&output)
    );
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["unreachable"], true);
    assert_eq!(report["changed"], false);
    assert!(report["plan"].is_null());
}

#[test]
fn test_show_unreachable_is_a_connection_error() {
    let port = closed_port().to_string();
    omevlan_cmd()
        .args([
            "--hostname",
            "127.0.0.1",
            "--port",
            &port,
            "-u",
            "admin",
            "--password",
            "secret",
            "show",
            "--template-id",
            "12",
            "--nic",
            "NIC in Mezzanine 1A",
        ])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("Could not connect"));
}
