use std::path::PathBuf;

use assert_cmd::Command;
use httpmock::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

pub const MANIFEST: &str = "---\nname: demo\ndescription: Demo skill\n---\n# Demo\n";

/// A temp config file pointing `skc` at a mock server.
pub struct CliFixture {
    pub temp_dir: TempDir,
    pub config_path: PathBuf,
}

impl CliFixture {
    pub fn new(base_url: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            format!("[service]\nbase_url = \"{base_url}\"\ntimeout_secs = 5\n"),
        )
        .unwrap();
        Self {
            temp_dir,
            config_path,
        }
    }

    pub fn skc(&self) -> Command {
        let mut cmd = Command::cargo_bin("skc").unwrap();
        for key in [
            "SKC_CONFIG",
            "SKC_BASE_URL",
            "SKC_TOKEN",
            "SKC_TIMEOUT_SECS",
            "SKC_OUTPUT_FORMAT",
            "SKC_NOTICE_CAPACITY",
            "SKC_AUTO_EXPAND",
            "RUST_LOG",
        ] {
            cmd.env_remove(key);
        }
        cmd.env("NO_COLOR", "1")
            .arg("--config")
            .arg(&self.config_path);
        cmd
    }
}

pub fn ok(data: Value) -> Value {
    json!({ "success": true, "data": data })
}

pub fn skill_list() -> Value {
    ok(json!([
        { "slug": "demo", "name": "demo", "description": "Demo skill", "tool_dependencies": ["git"] },
        { "slug": "helper", "name": "helper", "description": "Helps" }
    ]))
}

pub fn demo_tree() -> Value {
    ok(json!([
        { "path": "SKILL.md", "name": "SKILL.md", "is_dir": false },
        {
            "path": "scripts",
            "name": "scripts",
            "is_dir": true,
            "children": [
                { "path": "scripts/run.sh", "name": "run.sh", "is_dir": false }
            ]
        }
    ]))
}

/// Mocks the list, tree and manifest routes of the `demo` skill.
pub async fn mount_demo(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/system/skills");
            then.status(200).json_body(skill_list());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/system/skills/demo/tree");
            then.status(200).json_body(demo_tree());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/system/skills/demo/file")
                .query_param("path", "SKILL.md");
            then.status(200)
                .json_body(ok(json!({ "path": "SKILL.md", "content": MANIFEST })));
        })
        .await;
}
