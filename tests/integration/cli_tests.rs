use httpmock::prelude::*;
use predicates::prelude::*;
use serde_json::Value;

use crate::fixture::{CliFixture, demo_tree, skill_list};

/// Nothing listens on the discard port, so any request would fail.
const UNREACHABLE: &str = "http://127.0.0.1:9";

#[test]
fn help_lists_commands() {
    let fixture = CliFixture::new(UNREACHABLE);
    fixture
        .skc()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("browse"));
}

#[test]
fn version_matches_package() {
    let fixture = CliFixture::new(UNREACHABLE);
    fixture
        .skc()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn list_json_reports_skills() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/system/skills");
        then.status(200).json_body(skill_list());
    });
    let fixture = CliFixture::new(&server.base_url());

    let output = fixture
        .skc()
        .args(["--json", "list"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["data"]["count"], 2);
    assert_eq!(json["data"]["skills"][0]["slug"], "demo");
}

#[test]
fn base_url_flag_overrides_config() {
    let server = MockServer::start();
    let list = server.mock(|when, then| {
        when.method(GET).path("/api/system/skills");
        then.status(200).json_body(skill_list());
    });
    let fixture = CliFixture::new(UNREACHABLE);

    fixture
        .skc()
        .args(["--base-url", &server.base_url(), "list", "--filter", "help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("helper"))
        .stdout(predicate::str::contains("demo").not());
    list.assert();
}

#[test]
fn tree_prints_nested_paths() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/system/skills");
        then.status(200).json_body(skill_list());
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/system/skills/demo/tree");
        then.status(200).json_body(demo_tree());
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/system/skills/demo/file")
            .query_param("path", "SKILL.md");
        then.status(200).json_body(crate::fixture::ok(serde_json::json!({
            "content": crate::fixture::MANIFEST
        })));
    });
    let fixture = CliFixture::new(&server.base_url());

    fixture
        .skc()
        .args(["tree", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scripts/"))
        .stdout(predicate::str::contains("    run.sh"));
}

#[test]
fn removing_the_manifest_is_refused_offline() {
    let fixture = CliFixture::new(UNREACHABLE);
    let output = fixture
        .skc()
        .args(["--json", "rm", "demo", "SKILL.md", "--yes"])
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();

    let json: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["status"]["error"]["code"], "POLICY_REFUSED");
}

#[test]
fn delete_without_yes_asks_for_confirmation() {
    let fixture = CliFixture::new(UNREACHABLE);
    let output = fixture
        .skc()
        .args(["--json", "delete", "demo"])
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();

    let json: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["status"]["error"]["code"], "CONFIRMATION_REQUIRED");
    assert_eq!(json["status"]["error"]["numeric_code"], 802);
}

#[test]
fn human_errors_go_to_stderr() {
    let fixture = CliFixture::new(UNREACHABLE);
    fixture
        .skc()
        .args(["rm", "demo", "  "])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("must not be empty"));
}

#[test]
fn browse_refuses_json_mode() {
    let fixture = CliFixture::new(UNREACHABLE);
    fixture.skc().args(["--json", "browse"]).assert().failure();
}
