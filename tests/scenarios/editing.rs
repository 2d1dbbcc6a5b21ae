use std::time::Duration;

use skill_console::ConsoleError;
use skill_console::service::mock::{ErrorInjection, MockErrorKind, MockOperation};
use skill_console::session::NoticeLevel;
use skill_console::test_utils::{DEMO_SLUG, console_over, demo_manifest, demo_service};

#[tokio::test]
async fn saving_a_plain_file_does_not_refresh_the_list() {
    let service = demo_service();
    let console = console_over(&service);
    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();
    console.open_path("src/main.py").await.unwrap();
    service.clear_calls();

    assert!(console.update_draft("print('bye')\n"));
    assert!(console.read(|s| s.is_dirty()));

    console.commit_save().await.unwrap();

    assert!(!console.read(|s| s.is_dirty()));
    assert_eq!(
        service.file_content(DEMO_SLUG, "src/main.py").as_deref(),
        Some("print('bye')\n")
    );
    assert_eq!(service.call_count(MockOperation::UpdateSkillFile), 1);
    assert_eq!(service.call_count(MockOperation::ListSkills), 0);
}

#[tokio::test]
async fn saving_the_manifest_refreshes_the_list_once() {
    let service = demo_service();
    let console = console_over(&service);
    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();
    service.clear_calls();

    let edited = format!("{}\nMore notes.\n", demo_manifest(DEMO_SLUG));
    console.update_draft(&edited);
    console.commit_save().await.unwrap();

    assert_eq!(service.call_count(MockOperation::ListSkills), 1);
    console.read(|s| {
        assert!(!s.is_dirty());
        assert_eq!(s.editing.saved(), edited);
    });
}

#[tokio::test]
async fn mismatched_manifest_name_warns_and_surfaces_rejection() {
    let service = demo_service();
    let console = console_over(&service);
    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();
    console.drain_notices();

    console.update_draft(&demo_manifest("renamed"));
    let err = console.commit_save().await.unwrap_err();

    assert!(matches!(err, ConsoleError::Service { status: 400, .. }));
    let levels: Vec<NoticeLevel> = console.drain_notices().iter().map(|n| n.level).collect();
    assert_eq!(levels, vec![NoticeLevel::Warn, NoticeLevel::Error]);
    assert!(console.read(|s| s.is_dirty()));
}

#[tokio::test]
async fn failed_save_is_not_optimistic() {
    let service = demo_service();
    let console = console_over(&service);
    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();
    console.open_path("src/main.py").await.unwrap();
    service.inject_error(ErrorInjection::Once(
        MockOperation::UpdateSkillFile,
        MockErrorKind::Unavailable,
    ));

    console.update_draft("changed");
    assert!(console.commit_save().await.is_err());

    console.read(|s| {
        assert!(s.is_dirty());
        assert_eq!(s.editing.saved(), "print('hello')\n");
        assert!(!s.loading.saving);
        assert_eq!(s.latest_notice().unwrap().level, NoticeLevel::Error);
    });
    assert_eq!(
        service.file_content(DEMO_SLUG, "src/main.py").as_deref(),
        Some("print('hello')\n")
    );
}

#[tokio::test]
async fn navigating_away_discards_unsaved_edits() {
    let service = demo_service();
    let console = console_over(&service);
    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();
    console.open_path("src/main.py").await.unwrap();
    console.update_draft("unsaved");

    console.open_path("docs/usage.md").await.unwrap();
    console.open_path("src/main.py").await.unwrap();

    assert_eq!(service.call_count(MockOperation::UpdateSkillFile), 0);
    console.read(|s| {
        assert_eq!(s.editing.draft(), "print('hello')\n");
        assert!(!s.is_dirty());
    });
}

#[tokio::test]
async fn saving_without_changes_is_refused_locally() {
    let service = demo_service();
    let console = console_over(&service);
    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();
    service.clear_calls();

    let err = console.commit_save().await.unwrap_err();
    assert!(err.is_policy_refusal());

    console.select_node("docs", true).await.unwrap();
    let err = console.commit_save().await.unwrap_err();
    assert!(err.is_policy_refusal());
    assert_eq!(service.call_count(MockOperation::UpdateSkillFile), 0);
}

#[tokio::test]
async fn file_cannot_be_edited_or_saved_before_its_content_arrives() {
    let service = demo_service();
    let console = console_over(&service);
    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();

    let gate = service.gate_file(DEMO_SLUG, "src/main.py");
    let opening = console.select_node("src/main.py", false);
    tokio::pin!(opening);
    let blocked = tokio::time::timeout(Duration::from_millis(20), &mut opening).await;
    assert!(blocked.is_err());
    service.clear_calls();

    assert!(!console.update_draft("typed while loading"));
    assert!(!console.read(|s| s.can_save()));
    let err = console.commit_save().await.unwrap_err();
    assert!(err.is_policy_refusal());
    assert_eq!(service.call_count(MockOperation::UpdateSkillFile), 0);

    gate.release();
    opening.await.unwrap();

    assert_eq!(
        service.file_content(DEMO_SLUG, "src/main.py").as_deref(),
        Some("print('hello')\n")
    );
    console.read(|s| {
        assert_eq!(s.editing.draft(), "print('hello')\n");
        assert!(!s.is_dirty());
    });
    assert!(console.update_draft("print('bye')\n"));
    assert!(console.read(|s| s.can_save()));
}
