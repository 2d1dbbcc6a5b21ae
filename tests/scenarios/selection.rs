use std::time::Duration;

use skill_console::ConsoleError;
use skill_console::service::mock::{ErrorInjection, MockErrorKind, MockOperation};
use skill_console::test_utils::{DEMO_SLUG, console_over, demo_service};
use skill_console::tree;

#[tokio::test]
async fn mount_loads_skills_and_options() {
    let service = demo_service();
    let console = console_over(&service);

    console.mount().await.unwrap();

    let (count, tools) = console.read(|s| (s.skills.len(), s.dependency_options.tools.clone()));
    assert_eq!(count, 2);
    assert_eq!(tools, vec!["git".to_string(), "jq".to_string()]);
    assert_eq!(service.call_count(MockOperation::ListSkills), 1);
    assert_eq!(service.call_count(MockOperation::GetDependencyOptions), 1);
}

#[tokio::test]
async fn selecting_a_skill_loads_tree_and_manifest() {
    let service = demo_service();
    let console = console_over(&service);

    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();

    console.read(|s| {
        assert_eq!(s.active_slug(), Some(DEMO_SLUG));
        assert!(tree::contains(&s.tree, "src/main.py"));
        assert!(s.expansion.is_expanded("src"));
        assert_eq!(s.editing.selected_path(), "SKILL.md");
        assert!(s.editing.saved().contains("name: demo"));
        assert!(!s.is_dirty());
    });
}

#[tokio::test]
async fn skill_without_manifest_opens_with_nothing_selected() {
    let service = demo_service();
    service.remove_file(DEMO_SLUG, "SKILL.md");
    let console = console_over(&service);

    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();

    let notices = console.drain_notices();
    console.read(|s| {
        assert_eq!(s.active_slug(), Some(DEMO_SLUG));
        assert!(!s.editing.has_selection());
    });
    assert!(notices.is_empty(), "missing manifest must not be reported: {notices:?}");
}

#[tokio::test]
async fn unknown_slug_is_reported() {
    let service = demo_service();
    let console = console_over(&service);

    let err = console.select_skill_by_slug("missing").await.unwrap_err();
    assert!(matches!(err, ConsoleError::SkillNotFound(slug) if slug == "missing"));
}

#[tokio::test]
async fn later_selection_wins_over_slow_earlier_one() {
    let service = demo_service();
    let console = console_over(&service);
    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();

    let gate = service.gate_file(DEMO_SLUG, "src/main.py");
    let slow = console.select_node("src/main.py", false);
    tokio::pin!(slow);

    // Drive the first selection until it blocks on the held read.
    let blocked = tokio::time::timeout(Duration::from_millis(20), &mut slow).await;
    assert!(blocked.is_err());

    console.select_node("docs/usage.md", false).await.unwrap();
    gate.release();
    slow.await.unwrap();

    console.read(|s| {
        assert_eq!(s.editing.selected_path(), "docs/usage.md");
        assert_eq!(s.editing.saved(), "# Usage\n");
        assert!(!s.loading.file);
    });
}

#[tokio::test]
async fn directory_selection_sends_no_request() {
    let service = demo_service();
    let console = console_over(&service);
    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();
    service.clear_calls();

    console.select_node("docs", true).await.unwrap();

    assert_eq!(service.total_calls(), 0);
    console.read(|s| {
        assert!(s.editing.selected_is_dir());
        assert!(!s.editing.has_file());
    });
}

#[tokio::test]
async fn failed_file_load_keeps_selection_and_reports() {
    let service = demo_service();
    let console = console_over(&service);
    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();
    service.inject_error(ErrorInjection::Once(
        MockOperation::GetSkillFile,
        MockErrorKind::Unavailable,
    ));

    let err = console.select_node("src/main.py", false).await.unwrap_err();
    assert!(matches!(err, ConsoleError::Service { status: 503, .. }));

    console.read(|s| {
        assert_eq!(s.editing.selected_path(), "src/main.py");
        assert_eq!(s.editing.draft(), "");
        assert!(!s.loading.file);
    });
}
