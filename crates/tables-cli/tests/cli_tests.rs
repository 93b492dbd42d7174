// SPDX-License-Identifier: MIT OR Apache-2.0
//! Integration tests for the `tables` CLI binary.

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;
use std::path::{Path, PathBuf};

fn tables() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("tables").expect("binary `tables` should be built");
    for var in [
        "TABLES_ERROR_CODE_HEADER",
        "TABLES_VALIDATE_NAMES",
        "TABLES_BACKENDS",
        "TABLES_LOG_LEVEL",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).expect("write fixture");
    path
}

// ── Help & version ──────────────────────────────────────────────────

#[test]
fn help_flag_prints_usage() {
    tables()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Table-service error diagnostics"))
        .stdout(contains("explain"))
        .stdout(contains("check-name"));
}

#[test]
fn version_flag_prints_version() {
    tables()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

// ── explain ─────────────────────────────────────────────────────────

#[test]
fn explain_conflict_as_text() {
    let tmp = tempfile::tempdir().unwrap();
    let file = write(
        tmp.path(),
        "conflict.json",
        r#"{
            "status": 409,
            "headers": {"Content-Type": "application/json"},
            "body": {"odata.error": {"code": "TableAlreadyExists", "message": {"lang": "en-US", "value": "The table specified already exists."}}}
        }"#,
    );
    tables()
        .arg("explain")
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("kind:      already_exists"))
        .stdout(contains("ErrorCode:TableAlreadyExists"))
        .stdout(contains("retryable: false"));
}

#[test]
fn explain_naming_failure_with_table() {
    let tmp = tempfile::tempdir().unwrap();
    let file = write(
        tmp.path(),
        "bad_name.json",
        r#"{
            "status": 400,
            "headers": {"Content-Type": "application/xml", "x-ms-error-code": "InvalidResourceName"},
            "body": "<?xml version=\"1.0\" encoding=\"utf-8\"?><Error><Code>InvalidResourceName</Code><Message>The specifed resource name contains invalid characters.</Message></Error>"
        }"#,
    );
    tables()
        .args(["explain", "--table", "bad-name"])
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("kind:      naming_validation"))
        .stdout(contains("Storage table names must be alphanumeric"));
}

#[test]
fn explain_transaction_as_json() {
    let tmp = tempfile::tempdir().unwrap();
    let file = write(
        tmp.path(),
        "batch.json",
        r#"{"status": 409, "body": {"odata.error": {"code": "EntityAlreadyExists", "message": {"value": "3:Entity already exists."}}}}"#,
    );
    let out = tables()
        .args(["explain", "--transaction", "--json"])
        .arg(&file)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["kind"], "transaction");
    assert_eq!(v["index"], 3);
    assert_eq!(v["error_code"], "EntityAlreadyExists");
}

#[test]
fn explain_rejects_table_with_transaction() {
    let tmp = tempfile::tempdir().unwrap();
    let file = write(tmp.path(), "f.json", r#"{"status": 400}"#);
    tables()
        .args(["explain", "--transaction", "--table", "t"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(contains("--table has no effect"));
}

#[test]
fn explain_missing_file_fails() {
    tables()
        .args(["explain", "/nonexistent/fixture.json"])
        .assert()
        .failure()
        .stderr(contains("read fixture"));
}

#[test]
fn explain_uses_config_header() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = write(tmp.path(), "tables.toml", "error_code_header = \"x-gateway-code\"\n");
    let file = write(
        tmp.path(),
        "f.json",
        r#"{"status": 404, "headers": {"x-gateway-code": "EntityNotFound"}}"#,
    );
    tables()
        .args(["explain", "--config"])
        .arg(&cfg)
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("kind:      not_found"));
}

#[test]
fn invalid_config_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = write(tmp.path(), "tables.toml", "log_level = \"chatty\"\n");
    tables()
        .args(["codes", "--config"])
        .arg(&cfg)
        .assert()
        .failure()
        .stderr(contains("validate config"));
}

// ── check-name ──────────────────────────────────────────────────────

#[test]
fn check_name_ok() {
    tables()
        .args(["check-name", "people", "--backend", "storage"])
        .assert()
        .success()
        .stdout(contains("ok:"));
}

#[test]
fn check_name_violation_exits_one() {
    tables()
        .args(["check-name", "1people", "--backend", "storage"])
        .assert()
        .code(1)
        .stdout(contains("cannot begin with a number"));
}

#[test]
fn check_name_infers_cosmos_from_endpoint() {
    tables()
        .args([
            "check-name",
            "orders 2024",
            "--endpoint",
            "https://acct.table.cosmos.azure.com:443/",
        ])
        .assert()
        .success()
        .stdout(contains("cosmos"));
}

#[test]
fn check_name_requires_a_target() {
    tables().args(["check-name", "people"]).assert().failure();
}

// ── codes & schema ──────────────────────────────────────────────────

#[test]
fn codes_lists_everything() {
    tables()
        .arg("codes")
        .assert()
        .success()
        .stdout(contains("ServerBusy").and(contains("UpdateConditionNotSatisfied")));
}

#[test]
fn codes_filter_by_kind() {
    tables()
        .args(["codes", "--kind", "auth-failure"])
        .assert()
        .success()
        .stdout(contains("AuthenticationFailed"))
        .stdout(contains("InvalidAuthenticationInfo"))
        .stdout(contains("TableNotFound").not());
}

#[test]
fn schema_prints_json() {
    let out = tables().arg("schema").assert().success().get_output().stdout.clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert!(v["properties"]["backends"].is_object());
}
