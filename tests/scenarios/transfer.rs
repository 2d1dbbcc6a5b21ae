use skill_console::ConsoleError;
use skill_console::service::mock::MockOperation;
use skill_console::service::{ArchiveUpload, ExportPayload};
use skill_console::test_utils::{ConfigFixture, DEMO_SLUG, console_over, demo_manifest, demo_service};
use skill_console::transfer::FileDownloadSink;

fn upload(file_name: &str) -> ArchiveUpload {
    ArchiveUpload {
        file_name: file_name.to_string(),
        bytes: b"PK\x03\x04".to_vec(),
    }
}

#[tokio::test]
async fn imported_skill_is_listed_and_selected() {
    let service = demo_service();
    let console = console_over(&service);
    console.mount().await.unwrap();
    let manifest = demo_manifest("new-one");
    service.register_archive(
        "new-one.zip",
        &[
            ("new-one/SKILL.md", manifest.as_str()),
            ("new-one/notes.md", "notes\n"),
        ],
    );

    let result = console.import_archive(upload("new-one.zip")).await.unwrap();

    assert_eq!(result.slug, "new-one");
    console.read(|s| {
        assert!(s.find_skill("new-one").is_some());
        assert_eq!(s.active_slug(), Some("new-one"));
        assert_eq!(s.editing.selected_path(), "SKILL.md");
        assert!(s.editing.saved().contains("name: new-one"));
    });
}

#[tokio::test]
async fn conflicting_import_gets_a_fresh_slug() {
    let service = demo_service();
    let console = console_over(&service);
    let manifest = demo_manifest(DEMO_SLUG);
    service.register_archive("copy.zip", &[("SKILL.md", manifest.as_str())]);

    let result = console.import_archive(upload("copy.zip")).await.unwrap();

    assert_eq!(result.slug, "demo-v2");
    assert!(
        service
            .file_content("demo-v2", "SKILL.md")
            .is_some_and(|content| content.contains("name: demo-v2"))
    );
}

#[tokio::test]
async fn non_zip_upload_is_refused_locally() {
    let service = demo_service();
    let console = console_over(&service);

    let err = console.import_archive(upload("skill.tar.gz")).await.unwrap_err();

    assert!(matches!(err, ConsoleError::Refused(_)));
    assert_eq!(service.call_count(MockOperation::ImportSkillZip), 0);
}

#[tokio::test]
async fn rejected_archive_leaves_state_alone() {
    let service = demo_service();
    let console = console_over(&service);
    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();
    service.register_archive("empty.zip", &[("notes.md", "no manifest")]);

    let err = console.import_archive(upload("empty.zip")).await.unwrap_err();

    assert!(matches!(err, ConsoleError::Service { status: 400, .. }));
    assert_eq!(console.read(|s| s.active_slug().map(str::to_string)).as_deref(), Some(DEMO_SLUG));
}

#[tokio::test]
async fn export_writes_archive_under_server_filename() {
    let service = demo_service();
    let console = console_over(&service);
    let fixture = ConfigFixture::new();
    let sink = FileDownloadSink::new(fixture.root.clone());
    service.set_export(
        DEMO_SLUG,
        ExportPayload {
            bytes: b"PK\x03\x04zip".to_vec(),
            content_disposition: Some("attachment; filename=\"demo-2026.zip\"".into()),
        },
    );

    let exported = console.export_skill(DEMO_SLUG, &sink).await.unwrap();

    assert_eq!(exported.file_name, "demo-2026.zip");
    assert_eq!(exported.size, 7);
    assert_eq!(std::fs::read(fixture.root.join("demo-2026.zip")).unwrap(), b"PK\x03\x04zip");
    assert_eq!(sink.pending(), 0);
}

#[tokio::test]
async fn export_of_selected_skill_falls_back_to_slug_name() {
    let service = demo_service();
    let console = console_over(&service);
    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();
    let fixture = ConfigFixture::new();
    let sink = FileDownloadSink::new(fixture.root.clone());
    service.set_export(
        DEMO_SLUG,
        ExportPayload {
            bytes: vec![1, 2, 3],
            content_disposition: None,
        },
    );

    let exported = console.export_selected(&sink).await.unwrap();

    assert_eq!(exported.file_name, "demo.zip");
    assert!(fixture.root.join("demo.zip").exists());
}
