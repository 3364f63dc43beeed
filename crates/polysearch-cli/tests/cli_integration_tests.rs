//! CLI integration tests for polysearch
//!
//! Tests the polysearch CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CATALOG: &str = r#"
[[objects]]
name = "invoice"
class = "app.invoice"
contexts = ["user", "organization"]
fields = [
    { field = "number" },
    { field = "notes", searchable = false },
]

[[objects]]
name = "customer"
class = "app.customer"
fields = [{ field = "name" }]

[[objects]]
name = "invoice_line"
class = "app.invoice_line"
fields = [{ field = "label" }]

[[permissions]]
class = "app.invoice_line"
master = "app.invoice"
"#;

const INVOICES: &str = r#"[
    {"id": "1", "data": {"number": "INV-001", "notes": "widget", "amount": 10}},
    {"id": "2", "data": {"number": "WIDGET-42", "amount": 120, "status": "paid"}},
    {"id": "3", "data": {"number": "INV-003", "amount": 50}}
]"#;

const CUSTOMERS: &str = r#"[
    {"id": "c1", "data": {"name": "Widget Co"}},
    {"id": "c2", "data": {"name": "Zoë Ltd"}}
]"#;

/// Isolated config directory, catalog and database
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("catalog.toml"), CATALOG).unwrap();
        fs::write(dir.path().join("invoices.json"), INVOICES).unwrap();
        fs::write(dir.path().join("customers.json"), CUSTOMERS).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn database(&self) -> PathBuf {
        self.path().join("search.db")
    }

    /// Command with config dir, catalog and database pointing into the workspace
    #[allow(deprecated)]
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("polysearch").unwrap();
        cmd.env("POLYSEARCH_CONFIG_DIR", self.path())
            .arg("--catalog")
            .arg(self.path().join("catalog.toml"))
            .arg("--database")
            .arg(self.database());
        cmd
    }

    fn seeded() -> Self {
        let ws = Self::new();
        ws.cmd()
            .args(["import", "app.invoice"])
            .arg(ws.path().join("invoices.json"))
            .assert()
            .success()
            .stdout(predicate::str::contains("Imported 3 record(s)"));
        ws.cmd()
            .args(["import", "app.customer"])
            .arg(ws.path().join("customers.json"))
            .assert()
            .success();
        ws
    }
}

#[test]
fn test_objects_lists_eligible_types() {
    let ws = Workspace::new();

    ws.cmd()
        .arg("objects")
        .assert()
        .success()
        .stdout(predicate::str::contains("invoice"))
        .stdout(predicate::str::contains("app.customer"))
        .stdout(predicate::str::contains("invoice_line").not());
}

#[test]
fn test_objects_organization_context() {
    let ws = Workspace::new();

    let output = ws
        .cmd()
        .args(["objects", "--organization", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let objects: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        objects,
        serde_json::json!([{"name": "invoice", "class": "app.invoice"}])
    );
}

#[test]
fn test_search_all_objects() {
    let ws = Workspace::seeded();

    let output = ws
        .cmd()
        .args(["search", "widget", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let results: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(results["total"], 2);
    assert_eq!(results["objects"][0]["name"], "invoice");
    assert_eq!(results["objects"][0]["total"], 1);
    assert_eq!(results["objects"][0]["items"][0]["id"], "2");
    assert_eq!(results["objects"][1]["name"], "customer");
    assert_eq!(results["objects"][1]["total"], 1);
}

#[test]
fn test_search_text_output() {
    let ws = Workspace::seeded();

    ws.cmd()
        .args(["search", "zoe", "-o", "customer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("customer (1 found, page 1/1"))
        .stdout(predicate::str::contains("Zoë Ltd"));
}

#[test]
fn test_empty_query_returns_nothing() {
    let ws = Workspace::seeded();

    let output = ws
        .cmd()
        .args(["search", "", "-o", "invoice", "--format", "json", "--limit", "7"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let results: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let invoice = &results["objects"][0];
    assert_eq!(invoice["total"], 0);
    assert_eq!(invoice["page"], 1);
    assert_eq!(invoice["pages"], 1);
    assert_eq!(invoice["limit"], 7);
    assert_eq!(invoice["items"], serde_json::json!([]));
}

#[test]
fn test_show_with_filter() {
    let ws = Workspace::seeded();

    let output = ws
        .cmd()
        .args([
            "show", "invoice", "inv", "--filter", "amount>=20", "--sort", "amount:desc",
            "--format", "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["name"], "invoice");
    assert_eq!(result["total"], 1);
    assert_eq!(result["items"][0]["id"], "3");
}

#[test]
fn test_show_unknown_object_fails() {
    let ws = Workspace::seeded();

    ws.cmd()
        .args(["show", "Ghost", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"Ghost\" object doesn't exist"));
}

#[test]
fn test_invalid_filter_fails() {
    let ws = Workspace::seeded();

    ws.cmd()
        .args(["show", "invoice", "x", "--filter", "amount"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid filter"));
}

#[test]
fn test_missing_catalog_fails() {
    let ws = Workspace::new();

    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("polysearch").unwrap();
    cmd.env("POLYSEARCH_CONFIG_DIR", ws.path())
        .args(["--catalog"])
        .arg(ws.path().join("absent.toml"))
        .arg("objects")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Catalog error"));
}

#[test]
fn test_config_set_and_get() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["config", "set", "search.default_limit", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set search.default_limit = 5"));

    ws.cmd()
        .args(["config", "get", "search.default_limit"])
        .assert()
        .success()
        .stdout(predicate::str::diff("5\n"));

    ws.cmd()
        .args(["config", "set", "search.default_limit", "0"])
        .assert()
        .failure();

    ws.cmd()
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("search.view_permission = perm:view"));
}

#[test]
fn test_config_default_limit_applies_to_search() {
    let ws = Workspace::seeded();

    ws.cmd()
        .args(["config", "set", "search.default_limit", "1"])
        .assert()
        .success();

    let output = ws
        .cmd()
        .args(["search", "inv", "--format", "json"])
        .output()
        .unwrap();
    let results: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let invoice = &results["objects"][0];
    assert_eq!(invoice["total"], 2);
    assert_eq!(invoice["limit"], 1);
    assert_eq!(invoice["pages"], 2);
    assert_eq!(invoice["items"].as_array().unwrap().len(), 1);
    assert_eq!(results["objects"][1]["total"], 0);
}
