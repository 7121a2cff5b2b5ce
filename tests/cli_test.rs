use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Matcher, Server};
use std::fs;
use tempfile::tempdir;

fn scriptmarket(url: &str) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("scriptmarket"));
    cmd.env_remove("SCRIPTMARKET_TOKEN")
        .arg("--api-url")
        .arg(url)
        .arg("--retry-delay-ms")
        .arg("10");
    cmd
}

#[test]
fn test_scripts_list_prints_catalog() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("GET", "/scripts")
        .match_query(Matcher::UrlEncoded("search".into(), "tempest".into()))
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id": "s1", "title": "The Tempest", "genre": "comedy"}]"#)
        .create();

    scriptmarket(&url)
        .args(["scripts", "list", "--search", "tempest"])
        .assert()
        .success()
        .stdout(predicates::str::contains("The Tempest"));

    mock.assert();
}

#[test]
fn test_token_from_environment_is_sent() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("GET", "/users/profile")
        .match_header("authorization", "Bearer env-token")
        .with_status(200)
        .with_body(r#"{"id": "u1", "displayName": "Ana"}"#)
        .create();

    scriptmarket(&url)
        .env("SCRIPTMARKET_TOKEN", "env-token")
        .arg("profile")
        .assert()
        .success()
        .stdout(predicates::str::contains("Ana"));

    mock.assert();
}

#[test]
fn test_client_error_exits_with_server_message() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("GET", "/scripts/bad")
        .with_status(400)
        .with_body(r#"{"error": {"message": "Invalid request"}}"#)
        .expect(1)
        .create();

    scriptmarket(&url)
        .args(["scripts", "show", "bad"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Invalid request"));

    mock.assert();
}

#[test]
fn test_server_error_is_retried_before_failing() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("GET", "/payments/history")
        .with_status(503)
        .expect(2)
        .create();

    scriptmarket(&url)
        .args(["--max-attempts", "2", "payments", "history"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("HTTP 503"));

    mock.assert();
}

#[test]
fn test_upload_reads_file_and_sends_csrf_token() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("hamlet.pdf");
    fs::write(&file, "%PDF-1.4 to be or not to be").unwrap();

    let mut server = Server::new();
    let url = server.url();

    let csrf = server
        .mock("GET", "/csrf-token")
        .with_status(200)
        .with_body(r#"{"token": "abc"}"#)
        .expect(1)
        .create();
    let upload = server
        .mock("POST", "/scripts/s1/upload")
        .match_header("x-csrf-token", "abc")
        .match_body(Matcher::Regex("to be or not to be".to_string()))
        .with_status(200)
        .with_body(r#"{"url": "https://cdn.test/hamlet.pdf"}"#)
        .create();

    scriptmarket(&url)
        .args(["scripts", "upload", "s1"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicates::str::contains("https://cdn.test/hamlet.pdf"));

    csrf.assert();
    upload.assert();
}

#[test]
fn test_upload_missing_file_fails_before_any_request() {
    let dir = tempdir().unwrap();
    let mut server = Server::new();
    let url = server.url();

    let any = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create();

    scriptmarket(&url)
        .args(["scripts", "upload", "s1"])
        .arg(dir.path().join("missing.pdf"))
        .assert()
        .failure()
        .stderr(predicates::str::contains("Failed to read"));

    any.assert();
}
