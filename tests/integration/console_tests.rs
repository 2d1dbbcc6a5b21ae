use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use skill_console::ConsoleError;
use skill_console::console::{Console, ConsoleOptions};
use skill_console::service::HttpSkillService;

use crate::fixture::{MANIFEST, mount_demo, ok};

fn console(server: &MockServer) -> Console {
    let service = HttpSkillService::new(&server.base_url(), Duration::from_secs(5), None).unwrap();
    Console::new(Arc::new(service), ConsoleOptions::default())
}

#[tokio::test]
async fn select_loads_tree_and_manifest_over_http() {
    let server = MockServer::start_async().await;
    mount_demo(&server).await;
    let console = console(&server);

    console.select_skill_by_slug("demo").await.unwrap();

    console.read(|s| {
        assert_eq!(s.active_slug(), Some("demo"));
        assert_eq!(s.editing.saved(), MANIFEST);
        assert!(s.expansion.is_expanded("scripts"));
        assert!(!s.loading.tree && !s.loading.file);
    });
}

#[tokio::test]
async fn saving_a_script_puts_the_draft() {
    let server = MockServer::start_async().await;
    mount_demo(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/system/skills/demo/file")
                .query_param("path", "scripts/run.sh");
            then.status(200)
                .json_body(ok(json!({ "content": "echo hi\n" })));
        })
        .await;
    let put = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/api/system/skills/demo/file")
                .json_body(json!({ "path": "scripts/run.sh", "content": "echo bye\n" }));
            then.status(200).json_body(ok(json!(null)));
        })
        .await;
    let console = console(&server);
    console.select_skill_by_slug("demo").await.unwrap();
    console.open_path("scripts/run.sh").await.unwrap();

    assert!(console.update_draft("echo bye\n"));
    console.commit_save().await.unwrap();

    put.assert_async().await;
    assert!(!console.read(|s| s.is_dirty()));
}

#[tokio::test]
async fn service_rejection_surfaces_the_detail() {
    let server = MockServer::start_async().await;
    mount_demo(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/system/skills/demo/file");
            then.status(400).json_body(json!({ "detail": "target already exists" }));
        })
        .await;
    let console = console(&server);
    console.select_skill_by_slug("demo").await.unwrap();

    let err = console.create_node("scripts", true, None).await.unwrap_err();

    assert!(
        matches!(err, ConsoleError::Service { status: 400, ref message } if message == "target already exists")
    );
    assert!(
        console.read(|s| s.latest_notice().is_some_and(|n| n.message.contains("target already exists")))
    );
}

#[tokio::test]
async fn manifest_delete_never_reaches_the_server() {
    let server = MockServer::start_async().await;
    mount_demo(&server).await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/api/system/skills/demo/file");
            then.status(200).json_body(ok(json!(null)));
        })
        .await;
    let console = console(&server);
    console.select_skill_by_slug("demo").await.unwrap();

    assert!(console.prepare_delete_node("SKILL.md").is_err());
    delete.assert_hits_async(0).await;
}
