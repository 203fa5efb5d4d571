//! End-to-end tests for the catalog-export binary
//!
//! The binary is run against a wiremock catalog with all configuration
//! passed through flags and `CATALOG_*` variables.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

async fn mock_catalog() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/menu.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 10, "name": "Garden", "childs": [
                {"id": 11, "name": "Tools", "shard": "garden1", "query": "cat=11"},
                {"id": 12, "name": "Seeds", "shard": "garden2", "query": "cat=12"}
            ]}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/catalog/garden1/v4/filters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"filters": [
                {"name": "Category", "items": [{"id": 110, "name": "Shovels", "depth": 3}]}
            ]}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/catalog/garden2/v4/filters"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .mount(&server)
        .await;

    server
}

fn export_cmd(server: &MockServer, output: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("catalog-export").unwrap();
    cmd.env("LOG_FORMAT", "json")
        .env("LOG_OUTPUT", "console")
        .env("CATALOG_FILTERS_URL", format!("{}/catalog", server.uri()))
        .arg("--catalog-url")
        .arg(format!("{}/menu.json", server.uri()))
        .arg("--output")
        .arg(output.path())
        .arg("--no-progress");
    cmd
}

#[tokio::test(flavor = "multi_thread")]
async fn test_export_writes_sheets() {
    let server = mock_catalog().await;
    let output = TempDir::new().unwrap();

    export_cmd(&server, &output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Parsing top-level category"))
        .stdout(predicate::str::contains("Amount of queries: 2"));

    let sheet = std::fs::read_to_string(output.path().join("Garden.csv")).unwrap();
    let mut lines: Vec<&str> = sheet.lines().collect();
    assert_eq!(lines.remove(0), "ID,Name,Depth,Parent");
    lines.sort_unstable();
    assert_eq!(lines, vec!["10,Garden,1,0", "11,Tools,2,10", "110,Shovels,3,11", "12,Seeds,2,10"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_catalog_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/menu.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let output = TempDir::new().unwrap();

    export_cmd(&server, &output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("404"));

    assert!(std::fs::read_dir(output.path()).unwrap().next().is_none());
}

#[test]
fn test_invalid_timeout_rejected() {
    let mut cmd = Command::cargo_bin("catalog-export").unwrap();
    cmd.arg("--timeout").arg("0").arg("--no-progress");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("timeout"));
}
